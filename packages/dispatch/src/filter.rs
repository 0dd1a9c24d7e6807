//! Candidate filtering by capability and service radius.

use emergency_dispatch_models::Candidate;
use emergency_geo::Coordinates;
use emergency_incident_models::{IncidentCategory, Responder};

/// Returns the responders that can handle `category` and are within
/// `max_radius_km` of `location`, paired with their distance.
///
/// The radius bound is inclusive. Responders without coordinates are
/// treated as out of range. Input order is preserved.
#[must_use]
pub fn filter_candidates(
    category: IncidentCategory,
    location: Coordinates,
    responders: &[Responder],
    max_radius_km: f64,
) -> Vec<Candidate> {
    responders
        .iter()
        .filter(|r| r.category.handles(category))
        .filter_map(|r| {
            let distance_km = r.location?.distance_km(&location);
            (distance_km <= max_radius_km).then(|| Candidate {
                responder: r.clone(),
                distance_km,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{km_north, responder};
    use emergency_incident_models::ResponderCategory;

    const ORIGIN: Coordinates = Coordinates::new_unchecked(-8.152_865, 113.722_956);

    fn at_km(id: i64, category: ResponderCategory, km: f64) -> Responder {
        responder(
            id,
            category,
            ORIGIN.latitude + km_north(km),
            ORIGIN.longitude,
            Some("tok"),
        )
    }

    #[test]
    fn keeps_only_mapped_capability() {
        let responders = vec![
            at_km(1, ResponderCategory::FireSuppression, 0.4),
            at_km(2, ResponderCategory::Hospital, 0.1),
            at_km(3, ResponderCategory::Police, 0.2),
        ];

        let candidates = filter_candidates(IncidentCategory::Fire, ORIGIN, &responders, 50.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].responder.id, 1);

        let candidates = filter_candidates(IncidentCategory::Crime, ORIGIN, &responders, 50.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].responder.category, ResponderCategory::Police);
    }

    #[test]
    fn every_candidate_has_the_required_capability() {
        let responders: Vec<Responder> = ResponderCategory::all()
            .iter()
            .enumerate()
            .map(|(i, c)| at_km(i64::try_from(i).unwrap(), *c, 1.0))
            .collect();

        for category in IncidentCategory::all() {
            let candidates = filter_candidates(*category, ORIGIN, &responders, 50.0);
            if let Some(required) = category.required_capability() {
                assert!(!candidates.is_empty());
                assert!(candidates.iter().all(|c| c.responder.category == required));
            }
        }
    }

    #[test]
    fn unmapped_category_matches_every_field_unit() {
        let responders = vec![
            at_km(1, ResponderCategory::FireSuppression, 1.0),
            at_km(2, ResponderCategory::Hospital, 1.0),
            at_km(3, ResponderCategory::Police, 1.0),
            at_km(4, ResponderCategory::Admin, 1.0),
        ];

        let candidates = filter_candidates(IncidentCategory::Other, ORIGIN, &responders, 50.0);
        let ids: Vec<i64> = candidates.iter().map(|c| c.responder.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn excludes_responders_beyond_radius() {
        let responders = vec![
            at_km(1, ResponderCategory::Hospital, 4.0),
            at_km(2, ResponderCategory::Hospital, 6.0),
        ];

        let candidates = filter_candidates(IncidentCategory::Medical, ORIGIN, &responders, 5.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].responder.id, 1);
        assert!((candidates[0].distance_km - 4.0).abs() < 1e-3);
    }

    #[test]
    fn responder_at_incident_location_is_in_range() {
        let responders = vec![at_km(1, ResponderCategory::Hospital, 0.0)];
        let candidates = filter_candidates(IncidentCategory::Medical, ORIGIN, &responders, 0.0);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].distance_km.abs() < f64::EPSILON);
    }

    #[test]
    fn responder_without_coordinates_is_out_of_range() {
        let mut unlocated = at_km(1, ResponderCategory::Police, 0.0);
        unlocated.location = None;
        let responders = vec![unlocated, at_km(2, ResponderCategory::Police, 1.0)];

        let candidates =
            filter_candidates(IncidentCategory::TrafficAccident, ORIGIN, &responders, 50.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].responder.id, 2);
    }

    #[test]
    fn empty_snapshot_yields_no_candidates() {
        assert!(filter_candidates(IncidentCategory::Fire, ORIGIN, &[], 50.0).is_empty());
    }
}
