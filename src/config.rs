//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Tunables for [`BattleEngine`](crate::BattleEngine).
///
/// Missing fields fall back to their defaults when deserializing, so hosts
/// can load a partial JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Divisor turning the absolute score gap into the delta compared
    /// against the random draw.
    pub delta_scale: f64,
}

impl BattleConfig {
    /// Divisor used by the reference scoring rules.
    pub const DEFAULT_DELTA_SCALE: f64 = 100.0;

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NonPositiveScale` if `delta_scale` is zero,
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.delta_scale.is_finite() && self.delta_scale > 0.0 {
            Ok(())
        } else {
            Err(ValidationError::NonPositiveScale {
                value: self.delta_scale,
            })
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            delta_scale: Self::DEFAULT_DELTA_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = BattleConfig::default();
        assert!((config.delta_scale - 100.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BattleConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BattleConfig::default());

        let config: BattleConfig = serde_json::from_str(r#"{"delta_scale": 50.0}"#).unwrap();
        assert!((config.delta_scale - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = BattleConfig { delta_scale: bad };
            assert!(matches!(
                config.validate(),
                Err(ValidationError::NonPositiveScale { .. })
            ));
        }
    }
}
