//! Deterministic ranking of filtered candidates.

use emergency_dispatch_models::Candidate;

/// Sorts `candidates` nearest first, breaking distance ties by ascending
/// responder ID, and keeps at most `top_k`.
///
/// An empty input yields an empty ranking, the "no coverage" outcome.
#[must_use]
pub fn rank(mut candidates: Vec<Candidate>, top_k: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.responder.id.cmp(&b.responder.id))
    });
    candidates.truncate(top_k);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::responder;
    use emergency_incident_models::ResponderCategory;

    fn candidate(id: i64, distance_km: f64) -> Candidate {
        Candidate {
            responder: responder(id, ResponderCategory::Police, 0.0, 0.0, Some("tok")),
            distance_km,
        }
    }

    fn ids(ranked: &[Candidate]) -> Vec<i64> {
        ranked.iter().map(|c| c.responder.id).collect()
    }

    #[test]
    fn sorts_nearest_first() {
        let ranked = rank(
            vec![candidate(1, 12.0), candidate(2, 0.4), candidate(3, 3.5)],
            10,
        );
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn ties_break_by_responder_id() {
        let ranked = rank(
            vec![candidate(9, 1.0), candidate(4, 1.0), candidate(7, 0.5)],
            10,
        );
        assert_eq!(ids(&ranked), vec![7, 4, 9]);
    }

    #[test]
    fn truncates_to_top_k() {
        let ranked = rank(
            (1..=6).map(|i| candidate(i, 7.0 - f64::from(i32::try_from(i).unwrap()))).collect(),
            3,
        );
        assert_eq!(ids(&ranked), vec![6, 5, 4]);
        assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn ranking_is_independent_of_input_order() {
        let forward = rank(
            vec![candidate(1, 2.0), candidate(2, 2.0), candidate(3, 1.0)],
            3,
        );
        let reversed = rank(
            vec![candidate(3, 1.0), candidate(2, 2.0), candidate(1, 2.0)],
            3,
        );
        assert_eq!(ids(&forward), ids(&reversed));
    }

    #[test]
    fn empty_input_ranks_empty() {
        assert!(rank(Vec::new(), 3).is_empty());
    }
}
