//! Engine and field configuration

use std::time::Duration;

use serde::Deserialize;

use crate::state::RequireCount;

/// Default inactivity delay before a changed value is evaluated.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Global engine configuration.
///
/// Every field option without its own value falls back to these defaults.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use fieldcheck_lib::config::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_debounce(Duration::from_millis(300))
///     .with_message_separator(" / ");
/// assert_eq!(config.debounce, Duration::from_millis(300));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Inactivity delay before evaluation.
    ///
    /// Default: 1 second
    #[serde(with = "millis", alias = "typingLimit")]
    pub debounce: Duration,

    /// Separator placed between the messages of failed validators.
    ///
    /// Default: a single space
    pub message_separator: String,

    /// Whether empty values of non-required fields are still validated.
    ///
    /// Default: false
    pub validate_on_empty: bool,

    /// How many validators must pass for a field to be valid.
    ///
    /// Default: all
    pub valid_require_how_many: RequireCount,

    /// Whether fields start touched, so their errors show right away.
    ///
    /// Default: false
    pub pre_validate_form_elements: bool,

    /// Whether only the last failing validator's message is kept.
    ///
    /// Default: false
    pub display_only_last_error_msg: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            message_separator: " ".to_string(),
            validate_on_empty: false,
            valid_require_how_many: RequireCount::All,
            pre_validate_form_elements: false,
            display_only_last_error_msg: false,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the message separator.
    pub fn with_message_separator(mut self, separator: impl Into<String>) -> Self {
        self.message_separator = separator.into();
        self
    }

    /// Sets the default for validating empty values.
    pub fn with_validate_on_empty(mut self, enabled: bool) -> Self {
        self.validate_on_empty = enabled;
        self
    }

    /// Sets the default require count.
    pub fn with_require_count(mut self, count: RequireCount) -> Self {
        self.valid_require_how_many = count;
        self
    }

    /// Makes registered fields start touched.
    pub fn with_pre_validation(mut self, enabled: bool) -> Self {
        self.pre_validate_form_elements = enabled;
        self
    }

    /// Keeps only the last failing validator's message.
    pub fn with_only_last_message(mut self, enabled: bool) -> Self {
        self.display_only_last_error_msg = enabled;
        self
    }
}

/// Input shape of a field, which decides how value changes are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Typed input, evaluated after the debounce delay.
    #[default]
    Text,
    /// Option list or toggle, evaluated immediately.
    Choice,
}

/// Per-field options. Unset options fall back to [`EngineConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldOptions {
    /// Inactivity delay before evaluation.
    #[serde(with = "opt_millis", alias = "typingLimit")]
    pub debounce: Option<Duration>,

    /// Whether an empty value is validated even if the field is optional.
    pub validate_on_empty: Option<bool>,

    /// How many validators must pass.
    pub valid_require_how_many: Option<RequireCount>,

    /// Name shown in summaries instead of the field name.
    pub friendly_name: Option<String>,

    /// Where a renderer should place the message. Stored, never interpreted.
    pub validation_error_to: Option<String>,

    /// Input shape.
    pub kind: FieldKind,
}

impl FieldOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = Some(debounce);
        self
    }

    /// Sets whether empty values are validated.
    pub fn with_validate_on_empty(mut self, enabled: bool) -> Self {
        self.validate_on_empty = Some(enabled);
        self
    }

    /// Sets the require count.
    pub fn with_require_count(mut self, count: RequireCount) -> Self {
        self.valid_require_how_many = Some(count);
        self
    }

    /// Sets the friendly name.
    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    /// Sets the message placement target.
    pub fn with_error_target(mut self, target: impl Into<String>) -> Self {
        self.validation_error_to = Some(target.into());
        self
    }

    /// Sets the input shape.
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Effective delay for value changes: zero for choice fields.
    pub fn effective_debounce(&self, config: &EngineConfig) -> Duration {
        match self.kind {
            FieldKind::Choice => Duration::ZERO,
            FieldKind::Text => self.debounce.unwrap_or(config.debounce),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod opt_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.debounce, Duration::from_secs(1));
        assert_eq!(config.message_separator, " ");
        assert_eq!(config.valid_require_how_many, RequireCount::All);
    }

    #[test]
    fn test_engine_config_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"debounce": 250, "messageSeparator": "<br>", "validRequireHowMany": "one"}"#)
                .unwrap();
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.message_separator, "<br>");
        assert_eq!(config.valid_require_how_many, RequireCount::One);
        assert!(!config.display_only_last_error_msg);
    }

    #[test]
    fn test_field_options_json() {
        let options: FieldOptions = serde_json::from_str(
            r#"{"typingLimit": 50, "friendlyName": "E-mail", "validRequireHowMany": "2", "kind": "choice"}"#,
        )
        .unwrap();
        assert_eq!(options.debounce, Some(Duration::from_millis(50)));
        assert_eq!(options.friendly_name.as_deref(), Some("E-mail"));
        assert_eq!(options.valid_require_how_many, Some(RequireCount::AtLeast(2)));
        assert_eq!(options.effective_debounce(&EngineConfig::default()), Duration::ZERO);
    }

    #[test]
    fn test_effective_debounce_fallback() {
        let config = EngineConfig::default().with_debounce(Duration::from_millis(10));
        assert_eq!(FieldOptions::new().effective_debounce(&config), Duration::from_millis(10));
        let own = FieldOptions::new().with_debounce(Duration::from_millis(3));
        assert_eq!(own.effective_debounce(&config), Duration::from_millis(3));
    }
}
