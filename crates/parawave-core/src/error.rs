//! Error types for the wave solver.

use thiserror::Error;

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

/// Errors that can occur while configuring or stepping a solver engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// A caller supplied a non-positive or non-finite value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Stepping or querying an engine before `configure`.
    #[error("Engine not configured: call configure() first")]
    NotConfigured,

    /// Internal consistency violation (e.g. buffer shape mismatch).
    #[error("Invalid solver state: {0}")]
    InvalidState(String),

    /// The requested backend is not compiled in or not usable on this host.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SolverError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create an invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a backend unavailable error.
    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true for errors caused by bad caller input.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidParameter(_) | Self::NotConfigured | Self::Config(_))
    }
}

/// Reject values that are not strictly positive and finite.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SolverError::invalid_parameter(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}
