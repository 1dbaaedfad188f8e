//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors produced while validating core values (configs, coordinates).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{what} must be finite, got {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },
}

impl CoreError {
    /// Reject NaN / infinite values.
    pub fn check_finite(what: &'static str, value: f64) -> CoreResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CoreError::NonFinite { what, value })
        }
    }

    /// Reject values that are not finite and strictly positive.
    pub fn check_positive(what: &'static str, value: f64) -> CoreResult<f64> {
        Self::check_finite(what, value)?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(CoreError::NonPositive { what, value })
        }
    }
}

/// Shorthand result type for `ped-core`.
pub type CoreResult<T> = Result<T, CoreError>;
