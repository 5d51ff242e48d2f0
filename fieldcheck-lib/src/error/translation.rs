//! Translation error types

/// Errors returned by a [`Translator`](crate::translate::Translator).
#[derive(Debug, Clone, thiserror::Error)]
pub enum TranslationError {
    /// No template is registered for the key.
    #[error("No translation for key '{key}'")]
    MissingKey { key: String },

    /// The translation backend failed.
    #[error("Translation backend failed: {0}")]
    Backend(String),
}

impl TranslationError {
    /// Creates a new missing key error.
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }
}
