//! Cross-cutting error types for Jurist.
//!
//! Remote-call errors (`AuthError`) live in `jurist-auth` and configuration
//! errors in `jurist-config`. The CLI converges everything on `anyhow`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Data failed validation (unknown enum value, malformed field).
    #[error("Validation error: {0}")]
    Validation(String),
}
