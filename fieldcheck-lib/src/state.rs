//! Per-field validation state.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::catalog::{self, CompiledRules};
use crate::config::{EngineConfig, FieldOptions};
use crate::error::ConfigurationError;
use crate::validator::{MatchTarget, ValidatorSpec};

/// Lifecycle of a field's validation.
///
/// ```text
/// Untouched -> Pending -> Valid | Invalid -> Pending -> ...
///                 \-> AwaitingRemote -> Valid | Invalid
/// any state -> Cancelled (disabled, unregistered, rules cleared)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FieldStatus {
    /// No user activity yet; validity is tracked but not displayed.
    #[default]
    Untouched,
    /// A debounced evaluation is scheduled.
    Pending,
    /// Synchronous validators ran; custom or remote results are outstanding.
    AwaitingRemote,
    Valid,
    Invalid,
    /// Validation is switched off for the field.
    Cancelled,
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Untouched => "untouched",
            Self::Pending => "pending",
            Self::AwaitingRemote => "awaiting remote",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// How many validators of a chain must pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RequireCountRepr")]
pub enum RequireCount {
    /// Every validator.
    #[default]
    All,
    /// Any single validator.
    One,
    /// At least this many; clamped to the chain length.
    AtLeast(usize),
}

impl RequireCount {
    /// Number of passes that makes a chain of `total` validators valid.
    pub fn target(self, total: usize) -> usize {
        match self {
            Self::All => total,
            Self::One => total.min(1),
            Self::AtLeast(n) => total.min(n),
        }
    }
}

impl TryFrom<&str> for RequireCount {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "all" => Ok(Self::All),
            "one" => Ok(Self::One),
            other => other
                .parse::<usize>()
                .map_err(|_| format!("expected \"all\", \"one\" or a number, got \"{other}\""))
                .and_then(Self::try_from),
        }
    }
}

impl TryFrom<usize> for RequireCount {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Err("require count must be at least 1".to_string()),
            1 => Ok(Self::One),
            n => Ok(Self::AtLeast(n)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequireCountRepr {
    Number(usize),
    Text(String),
}

impl TryFrom<RequireCountRepr> for RequireCount {
    type Error = String;

    fn try_from(value: RequireCountRepr) -> Result<Self, Self::Error> {
        match value {
            RequireCountRepr::Number(n) => Self::try_from(n),
            RequireCountRepr::Text(text) => Self::try_from(text.as_str()),
        }
    }
}

/// Everything the engine knows about one registered field.
///
/// Created when the field registers its rule string, rebuilt when the rule
/// string changes, and dropped when the field unregisters.
#[derive(Debug, Clone)]
pub struct FieldValidationState {
    pub(crate) name: String,
    pub(crate) form: Option<String>,
    pub(crate) rules: String,
    pub(crate) validators: Arc<[ValidatorSpec]>,
    pub(crate) field_required: bool,
    pub(crate) validate_on_empty: bool,
    pub(crate) debounce: Duration,
    pub(crate) require_count: RequireCount,
    pub(crate) friendly_name: Option<String>,
    pub(crate) error_target: Option<String>,
    pub(crate) last_value: Option<String>,
    pub(crate) is_valid: bool,
    pub(crate) message: String,
    pub(crate) status: FieldStatus,
    pub(crate) touched: bool,
    pub(crate) disabled: bool,
    pub(crate) pending_generation: Option<u64>,
}

impl FieldValidationState {
    /// Builds the state of a field from already compiled rules.
    pub fn new(
        name: impl Into<String>,
        rules: impl Into<String>,
        compiled: CompiledRules,
        options: &FieldOptions,
        config: &EngineConfig,
    ) -> Self {
        Self {
            name: name.into(),
            form: None,
            rules: rules.into(),
            validators: compiled.validators.into(),
            field_required: compiled.field_required,
            validate_on_empty: options.validate_on_empty.unwrap_or(config.validate_on_empty),
            debounce: options.effective_debounce(config),
            require_count: options
                .valid_require_how_many
                .unwrap_or(config.valid_require_how_many),
            friendly_name: options.friendly_name.clone(),
            error_target: options.validation_error_to.clone(),
            last_value: None,
            is_valid: true,
            message: String::new(),
            status: FieldStatus::Untouched,
            touched: config.pre_validate_form_elements,
            disabled: false,
            pending_generation: None,
        }
    }

    /// Compiles `rules` and builds the state with default options.
    ///
    /// # Example
    ///
    /// ```
    /// use fieldcheck_lib::state::FieldValidationState;
    ///
    /// let state = FieldValidationState::from_rules("age", "required|between:1,99").unwrap();
    /// assert!(state.is_field_required());
    /// assert_eq!(state.validators().len(), 2);
    /// ```
    pub fn from_rules(name: impl Into<String>, rules: &str) -> Result<Self, ConfigurationError> {
        let compiled = catalog::compile(rules)?;
        Ok(Self::new(name, rules, compiled, &FieldOptions::default(), &EngineConfig::default()))
    }

    /// Replaces the validators after the rule string changed.
    pub(crate) fn replace_rules(&mut self, rules: impl Into<String>, compiled: CompiledRules) {
        self.rules = rules.into();
        self.validators = compiled.validators.into();
        self.field_required = compiled.field_required;
    }

    /// Marks the field valid with no message.
    pub(crate) fn mark_valid(&mut self) {
        self.is_valid = true;
        self.message.clear();
    }

    /// Sets the displayed status, keeping untouched fields untouched.
    pub(crate) fn show(&mut self, status: FieldStatus) {
        if self.touched || !matches!(status, FieldStatus::Valid | FieldStatus::Invalid | FieldStatus::AwaitingRemote)
        {
            self.status = status;
        }
    }

    /// Sets validity and message after an evaluation.
    pub(crate) fn record(&mut self, valid: bool, message: String) {
        self.is_valid = valid;
        self.message = message;
        self.show(if valid { FieldStatus::Valid } else { FieldStatus::Invalid });
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the form the field belongs to.
    pub fn form(&self) -> Option<&str> {
        self.form.as_deref()
    }

    /// Returns the rule string the validators were built from.
    pub fn rules(&self) -> &str {
        &self.rules
    }

    /// Returns the validators in declaration order.
    pub fn validators(&self) -> &[ValidatorSpec] {
        &self.validators
    }

    /// Fields referenced by matching validators.
    pub fn match_targets(&self) -> impl Iterator<Item = &MatchTarget> {
        self.validators.iter().filter_map(ValidatorSpec::target)
    }

    /// Returns `true` if the chain contains `required`.
    pub fn is_field_required(&self) -> bool {
        self.field_required
    }

    /// Returns `true` if empty values are validated anyway.
    pub fn validates_on_empty(&self) -> bool {
        self.validate_on_empty
    }

    /// Returns the debounce delay for value changes.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Returns the require count.
    pub fn require_count(&self) -> RequireCount {
        self.require_count
    }

    /// Returns the name used in summaries.
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns the value of the last evaluation.
    pub fn last_value(&self) -> Option<&str> {
        self.last_value.as_deref()
    }

    /// Returns the validity of the last evaluation.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Returns `true` once validation has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == FieldStatus::Cancelled
    }

    /// Returns `true` while the field is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the composed message of the last evaluation.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the lifecycle status.
    pub fn status(&self) -> FieldStatus {
        self.status
    }

    /// Generation of the outstanding custom or remote check, if any.
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_count_target() {
        assert_eq!(RequireCount::All.target(3), 3);
        assert_eq!(RequireCount::One.target(3), 1);
        assert_eq!(RequireCount::One.target(0), 0);
        assert_eq!(RequireCount::AtLeast(5).target(3), 3);
    }

    #[test]
    fn test_require_count_parse() {
        assert_eq!(RequireCount::try_from("all"), Ok(RequireCount::All));
        assert_eq!(RequireCount::try_from("one"), Ok(RequireCount::One));
        assert_eq!(RequireCount::try_from(" 3 "), Ok(RequireCount::AtLeast(3)));
        assert!(RequireCount::try_from("0").is_err());
        assert!(RequireCount::try_from("some").is_err());

        let parsed: Vec<RequireCount> = serde_json::from_str(r#"["all", 2, "1"]"#).unwrap();
        assert_eq!(parsed, vec![RequireCount::All, RequireCount::AtLeast(2), RequireCount::One]);
    }

    #[test]
    fn test_untouched_hides_status() {
        let mut state = FieldValidationState::from_rules("name", "required").unwrap();
        state.record(false, "Field is required.".to_string());
        assert_eq!(state.status(), FieldStatus::Untouched);
        assert!(!state.is_valid());

        state.touched = true;
        state.record(false, "Field is required.".to_string());
        assert_eq!(state.status(), FieldStatus::Invalid);
    }

    #[test]
    fn test_display_name() {
        let mut state = FieldValidationState::from_rules("email", "email").unwrap();
        assert_eq!(state.display_name(), "email");
        state.friendly_name = Some("E-mail".to_string());
        assert_eq!(state.display_name(), "E-mail");
    }
}
