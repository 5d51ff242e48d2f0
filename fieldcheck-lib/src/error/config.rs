//! Configuration error types

use super::CallbackError;
use super::TranslationError;

/// Fatal setup or integration errors.
///
/// These are raised at the point of failure and never recovered from by the
/// engine itself. Rule-string problems surface synchronously when a field is
/// registered; callback and translation problems surface when they occur.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigurationError {
    /// A rule expecting two comma-separated bounds got something else.
    #[error("Rule '{rule}' expects exactly two bounds, use the syntax '{expected}'")]
    MalformedRange { rule: String, expected: String },

    /// The `pattern=/.../flags` or `regex:...:=...:regex` clause is malformed.
    #[error("Malformed literal regex clause: {reason}")]
    MalformedLiteralRegex { reason: String },

    /// A `pattern`/`regex` rule appears without a literal regex clause.
    #[error("Rule '{rule}' requires a literal regex, e.g. 'pattern=/^[a-z]+$/i'")]
    MissingLiteralRegex { rule: String },

    /// The rule keyword is not in the catalog.
    #[error("Unknown validation rule '{rule}'")]
    UnknownRule { rule: String },

    /// The rule got the wrong number of parameters.
    #[error("Rule '{rule}' expects {expected} parameter(s), got {actual}")]
    ParamCount {
        rule: String,
        expected: &'static str,
        actual: usize,
    },

    /// A bound could not be interpreted for the rule.
    #[error("Rule '{rule}' has an invalid bound '{value}': {reason}")]
    InvalidBound {
        rule: String,
        value: String,
        reason: &'static str,
    },

    /// A built or literal pattern failed to compile.
    #[error("Rule '{rule}' produced an invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// A custom/remote rule names a callback that is not registered.
    #[error("Rule '{rule}' refers to unregistered callback '{callback}'")]
    MissingCallback { rule: String, callback: String },

    /// A custom/remote callback failed or returned an unsupported shape.
    #[error("Callback '{callback}' for field '{field}' failed: {source}")]
    CallbackFailed {
        field: String,
        callback: String,
        #[source]
        source: CallbackError,
    },

    /// A message key could not be translated and no alternate text exists.
    #[error("Cannot translate message '{key}': {source}")]
    Translation {
        key: String,
        #[source]
        source: TranslationError,
    },

    /// A summary update was attempted without a field identifier.
    #[error("Validation summary entries require a field name")]
    MissingFieldName,

    /// The operation referenced a field that is not registered.
    #[error("Field '{field}' is not registered")]
    UnknownField { field: String },
}

impl ConfigurationError {
    /// Creates a new malformed range error.
    pub fn malformed_range(rule: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MalformedRange {
            rule: rule.into(),
            expected: expected.into(),
        }
    }

    /// Creates a new malformed literal regex error.
    pub fn malformed_literal(reason: impl Into<String>) -> Self {
        Self::MalformedLiteralRegex {
            reason: reason.into(),
        }
    }

    /// Creates a new unknown rule error.
    pub fn unknown_rule(rule: impl Into<String>) -> Self {
        Self::UnknownRule { rule: rule.into() }
    }

    /// Creates a new invalid bound error.
    pub fn invalid_bound(rule: impl Into<String>, value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidBound {
            rule: rule.into(),
            value: value.into(),
            reason,
        }
    }

    /// Creates a new unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }
}
