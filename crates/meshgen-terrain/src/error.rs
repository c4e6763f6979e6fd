//! Parameter validation errors.

/// Errors raised when noise or bias parameters cannot be clamped into a usable range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    /// Noise scale must be strictly positive.
    #[error("noise scale must be positive, got {0}")]
    NonPositiveScale(f64),

    /// A parameter was NaN or infinite.
    #[error("parameter `{name}` must be finite, got {value}")]
    NonFinite {
        /// Parameter name as exposed to callers.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Reject NaN and infinities for the named parameter.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64, ParameterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError::NonFinite { name, value })
    }
}
