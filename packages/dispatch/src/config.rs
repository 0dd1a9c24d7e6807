//! Dispatch tuning parameters.
//!
//! Defaults can be replaced from a TOML document and then overridden per
//! key from the environment:
//!
//! | Key | Env var | Default |
//! |---|---|---|
//! | `max_radius_km` | `DISPATCH_MAX_RADIUS_KM` | `50.0` |
//! | `top_k` | `DISPATCH_TOP_K` | `3` |
//! | `notify_timeout_ms` | `DISPATCH_NOTIFY_TIMEOUT_MS` | `10000` |

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum service radius in kilometers.
pub const DEFAULT_MAX_RADIUS_KM: f64 = 50.0;

/// Default number of ranked candidates kept per dispatch.
pub const DEFAULT_TOP_K: usize = 3;

/// Default deadline for the notification fan-out, in milliseconds.
pub const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 10_000;

/// Errors from loading or validating a [`DispatchConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("Failed to parse dispatch config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside its allowed range.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The offending key.
        key: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// Tunable parameters of the dispatch pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Responders farther than this from the incident are out of range.
    pub max_radius_km: f64,
    /// Maximum number of ranked candidates to keep and notify.
    pub top_k: usize,
    /// Deadline for the whole notification fan-out.
    pub notify_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_radius_km: DEFAULT_MAX_RADIUS_KM,
            top_k: DEFAULT_TOP_K,
            notify_timeout_ms: DEFAULT_NOTIFY_TIMEOUT_MS,
        }
    }
}

impl DispatchConfig {
    /// Parses a config from TOML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed or a value is
    /// out of range.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from the defaults plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Applies `DISPATCH_*` environment overrides on top of `self`.
    ///
    /// Unparseable values are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the resulting config is out of range.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies `DISPATCH_*` overrides read through `lookup` on top of `self`.
    ///
    /// Unparseable values are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the resulting config is out of range.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(radius) = parse_override(&lookup, "DISPATCH_MAX_RADIUS_KM") {
            self.max_radius_km = radius;
        }
        if let Some(top_k) = parse_override(&lookup, "DISPATCH_TOP_K") {
            self.top_k = top_k;
        }
        if let Some(timeout) = parse_override(&lookup, "DISPATCH_NOTIFY_TIMEOUT_MS") {
            self.notify_timeout_ms = timeout;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a non-positive radius, a
    /// zero `top_k`, or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_radius_km.is_finite() || self.max_radius_km <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "max_radius_km",
                message: format!("expected a positive distance, got {}", self.max_radius_km),
            });
        }
        if self.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "top_k",
                message: "must be at least 1".to_string(),
            });
        }
        if self.notify_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "notify_timeout_ms",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The notification fan-out deadline.
    #[must_use]
    pub const fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}

fn parse_override<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    raw.trim().parse().map_or_else(
        |_| {
            log::warn!("Ignoring unparseable {key}={raw:?}");
            None
        },
        Some,
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DispatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k, 3);
        assert!((config.max_radius_km - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.notify_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = DispatchConfig::from_toml_str("max_radius_km = 15.5\n").unwrap();
        assert!((config.max_radius_km - 15.5).abs() < f64::EPSILON);
        assert_eq!(config.top_k, DEFAULT_TOP_K);
        assert_eq!(config.notify_timeout_ms, DEFAULT_NOTIFY_TIMEOUT_MS);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            DispatchConfig::from_toml_str("top_k = 0"),
            Err(ConfigError::InvalidValue { key: "top_k", .. })
        ));
        assert!(matches!(
            DispatchConfig::from_toml_str("max_radius_km = -1.0"),
            Err(ConfigError::InvalidValue {
                key: "max_radius_km",
                ..
            })
        ));
        assert!(matches!(
            DispatchConfig::from_toml_str("notify_timeout_ms = 0"),
            Err(ConfigError::InvalidValue {
                key: "notify_timeout_ms",
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            DispatchConfig::from_toml_str("top_k = \"three\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn overrides_apply_and_skip_unparseable_values() {
        let vars = BTreeMap::from([
            ("DISPATCH_TOP_K", " 5 "),
            ("DISPATCH_MAX_RADIUS_KM", "not-a-number"),
        ]);

        let config = DispatchConfig::default()
            .with_overrides_from(|key| vars.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.top_k, 5);
        assert!((config.max_radius_km - DEFAULT_MAX_RADIUS_KM).abs() < f64::EPSILON);
        assert_eq!(config.notify_timeout_ms, DEFAULT_NOTIFY_TIMEOUT_MS);
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let result = DispatchConfig::default().with_overrides_from(|key| {
            (key == "DISPATCH_NOTIFY_TIMEOUT_MS").then(|| "0".to_string())
        });

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "notify_timeout_ms",
                ..
            })
        ));
    }
}
