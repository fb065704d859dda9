use crate::core::models::ids::ParticleIndex;
use crate::core::models::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RestraintError {
    #[error("Invalid parameter '{parameter}' for restraint '{restraint}': {reason}")]
    InvalidParameter {
        restraint: String,
        parameter: &'static str,
        reason: String,
    },

    #[error("Restraint '{restraint}' references {particle}, which no longer exists")]
    DanglingReference {
        restraint: String,
        particle: ParticleIndex,
    },

    #[error("Model access failed: {0}")]
    Model(#[from] ModelError),
}

/// Accepts finite, non-negative values such as force constants and distances.
pub(crate) fn check_non_negative(
    restraint: &str,
    parameter: &'static str,
    value: f64,
) -> Result<f64, RestraintError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(RestraintError::InvalidParameter {
            restraint: restraint.to_string(),
            parameter,
            reason: format!("expected a finite, non-negative value, got {}", value),
        })
    }
}

pub(crate) fn check_finite(
    restraint: &str,
    parameter: &'static str,
    value: f64,
) -> Result<f64, RestraintError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RestraintError::InvalidParameter {
            restraint: restraint.to_string(),
            parameter,
            reason: format!("expected a finite value, got {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_non_negative_accepts_zero_and_positive() {
        assert_eq!(check_non_negative("r", "k", 0.0), Ok(0.0));
        assert_eq!(check_non_negative("r", "k", 10.0), Ok(10.0));
    }

    #[test]
    fn check_non_negative_rejects_negative_nan_and_infinite() {
        for value in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_non_negative("r", "k", value),
                Err(RestraintError::InvalidParameter { parameter: "k", .. })
            ));
        }
    }

    #[test]
    fn check_finite_accepts_negative_values() {
        assert_eq!(check_finite("r", "weight", -2.0), Ok(-2.0));
        assert!(check_finite("r", "weight", f64::NEG_INFINITY).is_err());
    }
}
