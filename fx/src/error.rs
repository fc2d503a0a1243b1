//! FX widget error types.

use thiserror::Error;

/// Errors that can occur in the conversion core.
///
/// None of these reach the user as a hard failure: callers map them to a
/// placeholder display value or to fallback rate data.
#[derive(Debug, Error)]
pub enum FxError {
    /// Amount text could not be read as a number.
    #[error("Not a number: {0:?}")]
    NotANumber(String),

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
