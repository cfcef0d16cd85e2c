/*
 * Error Module
 *
 * Precondition violations in the steering engine are reported through
 * SteerError instead of letting NaNs leak into agent state.
 */

use thiserror::Error;

use crate::vector3::Vector3;

/// Errors raised when a steering operation or configuration is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SteerError {
    /// Mass must be finite and strictly positive.
    #[error("mass must be finite and positive, got {0}")]
    InvalidMass(f32),

    /// A speed or force limit was negative or not finite.
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidLimit { name: &'static str, value: f32 },

    /// Time steps must be finite and non-negative.
    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f32),

    /// An input vector contained NaN or infinity.
    #[error("{name} is not finite: {value}")]
    NonFiniteVector { name: &'static str, value: Vector3 },

    /// A flock parameter failed validation.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SteerError {
    pub fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Checks a limit value, naming it in the error.
    pub fn check_limit(name: &'static str, value: f32) -> Result<f32, Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(Self::InvalidLimit { name, value })
        }
    }

    pub fn check_vector(name: &'static str, value: Vector3) -> Result<Vector3, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFiniteVector { name, value })
        }
    }
}
