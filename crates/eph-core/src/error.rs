//! Framework error type.
//!
//! Sub-crates may define their own error enums and convert `EphError` into
//! them via `From` impls.  Numerical degeneracies are never errors: they are
//! guarded at the division site and must not reach this type.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `eph-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum EphError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EphError {
    /// Shorthand for building a [`EphError::Config`] from anything printable.
    pub fn config(msg: impl Into<String>) -> Self {
        EphError::Config(msg.into())
    }
}

/// Shorthand result type for all `eph-*` crates.
pub type EphResult<T> = Result<T, EphError>;

/// Fail with a configuration error unless `value` is finite and `> 0`.
pub fn ensure_positive(what: &str, value: f64) -> EphResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EphError::config(format!("{what} must be positive and finite, got {value}")))
    }
}

/// Fail with a configuration error unless `value` is finite and `>= 0`.
pub fn ensure_non_negative(what: &str, value: f64) -> EphResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EphError::config(format!("{what} must be non-negative and finite, got {value}")))
    }
}
