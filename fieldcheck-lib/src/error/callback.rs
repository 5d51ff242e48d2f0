//! Custom and remote callback error types

/// Errors raised by custom or remote validator callbacks.
///
/// A callback error is never a validation failure: it means the callback
/// itself is broken and is escalated to a
/// [`ConfigurationError`](super::ConfigurationError).
#[derive(Debug, Clone, thiserror::Error)]
pub enum CallbackError {
    /// The callback failed while running.
    #[error("{0}")]
    Failed(String),

    /// No callback is registered under the name.
    #[error("no callback registered as '{0}'")]
    NotRegistered(String),

    /// The callback produced something that is neither a boolean nor a
    /// `{ valid, message }` object.
    #[error("unsupported result shape: {0}")]
    UnsupportedResult(String),
}

impl CallbackError {
    /// Creates a new failure with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
