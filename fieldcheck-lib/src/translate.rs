//! Message translation.
//!
//! The engine never stores message text itself: every failing validator
//! contributes a message key, which a [`Translator`] turns into text. The
//! built-in [`MessageTable`] carries the English defaults; applications with
//! their own localization plug in a different implementation.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::TranslationError;
use crate::validator::DateFormat;

/// Placeholder token replaced, in order, by a validator's parameters.
pub const PLACEHOLDER: &str = ":param";

/// Resolves message keys to display text.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Resolves `key`, substituting `params` into its placeholders.
    async fn resolve(&self, key: &str, params: &[String]) -> Result<String, TranslationError>;
}

/// Replaces each `:param` token in `template` with the next parameter.
///
/// Tokens beyond the number of parameters are left as they are.
///
/// # Example
///
/// ```
/// use fieldcheck_lib::translate::fill_placeholders;
///
/// let text = fill_placeholders("Between :param and :param.", &["1".into(), "5".into()]);
/// assert_eq!(text, "Between 1 and 5.");
/// ```
pub fn fill_placeholders(template: &str, params: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut params = params.iter();
    while let Some(idx) = rest.find(PLACEHOLDER) {
        let Some(param) = params.next() else {
            break;
        };
        out.push_str(&rest[..idx]);
        out.push_str(param);
        rest = &rest[idx + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    out
}

const ENGLISH: &[(&str, &str)] = &[
    ("INVALID_ACCEPTED", "Must be accepted."),
    ("INVALID_ALPHA", "May only contain letters."),
    ("INVALID_ALPHA_SPACE", "May only contain letters and spaces."),
    ("INVALID_ALPHA_NUM", "May only contain letters and numbers."),
    ("INVALID_ALPHA_NUM_SPACE", "May only contain letters, numbers and spaces."),
    ("INVALID_ALPHA_DASH", "May only contain letters, numbers and dashes."),
    ("INVALID_ALPHA_DASH_SPACE", "May only contain letters, numbers, dashes and spaces."),
    ("INVALID_BETWEEN_CHAR", "Text must be between :param and :param characters in length."),
    ("INVALID_BETWEEN_NUM", "Needs to be a numeric value, between :param and :param."),
    ("INVALID_BOOLEAN", "May only contain a true or false value."),
    ("INVALID_CREDIT_CARD", "Must be a valid credit card number."),
    ("INVALID_CUSTOM", "Failed custom validation."),
    ("INVALID_DIGITS", "Must be :param digits."),
    ("INVALID_DIGITS_BETWEEN", "Must be between :param and :param digits."),
    ("INVALID_EMAIL", "Must be a valid email address."),
    ("INVALID_EXACT_LEN", "Must have a length of exactly :param characters."),
    ("INVALID_EXACT_NUM", "Must be exactly :param."),
    ("INVALID_FLOAT", "May only contain a positive float value (integer excluded)."),
    ("INVALID_FLOAT_SIGNED", "May only contain a positive or negative float value (integer excluded)."),
    ("INVALID_IBAN", "Must be a valid IBAN."),
    ("INVALID_IN_LIST", "Must be a choice inside this list: (:param)."),
    ("INVALID_INPUT_DIFFERENT", "Field must be different from specified field \":param\"."),
    ("INVALID_INPUT_MATCH", "Confirmation field does not match specified field \":param\"."),
    ("INVALID_INTEGER", "Must be a positive integer."),
    ("INVALID_INTEGER_SIGNED", "Must be a positive or negative integer."),
    ("INVALID_IPV4", "Must be a valid IP (IPV4)."),
    ("INVALID_IPV6", "Must be a valid IP (IPV6)."),
    ("INVALID_MAX_CHAR", "May not be greater than :param characters."),
    ("INVALID_MAX_NUM", "Needs to be a numeric value, equal to, or lower than :param."),
    ("INVALID_MIN_CHAR", "Must be at least :param characters."),
    ("INVALID_MIN_NUM", "Needs to be a numeric value, equal to, or higher than :param."),
    ("INVALID_NOT_IN_LIST", "Must be a choice outside this list: (:param)."),
    ("INVALID_NUMERIC", "Must be a positive number."),
    ("INVALID_NUMERIC_SIGNED", "Must be a positive or negative number."),
    ("INVALID_PATTERN", "Must be following this format: :param."),
    ("INVALID_PHONE", "Must be a valid phone number."),
    ("INVALID_REMOTE", "Failed remote validation."),
    ("INVALID_REQUIRED", "Field is required."),
    ("INVALID_TIME", "Must be a valid time format (hh:mm) OR (hh:mm:ss)."),
    ("INVALID_URL", "Must be a valid URL."),
];

/// A key-to-template table, usable as a [`Translator`].
///
/// # Example
///
/// ```
/// use fieldcheck_lib::translate::MessageTable;
///
/// let table = MessageTable::english().with_message("INVALID_REQUIRED", "Please fill this in.");
/// assert_eq!(table.template("INVALID_REQUIRED"), Some("Please fill this in."));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageTable {
    templates: HashMap<String, String>,
}

impl MessageTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding the English defaults for every rule.
    pub fn english() -> Self {
        let mut templates: HashMap<String, String> = ENGLISH
            .iter()
            .map(|(key, text)| (key.to_string(), text.to_string()))
            .collect();

        for format in DateFormat::ALL {
            let stem = format.rule_stem().to_uppercase();
            let desc = format.description();
            templates.insert(format!("INVALID_{stem}"), format!("Must be a valid date format ({desc})."));
            templates.insert(
                format!("INVALID_{stem}_MIN"),
                format!("Needs to be a valid date format ({desc}), equal to, or after :param."),
            );
            templates.insert(
                format!("INVALID_{stem}_MAX"),
                format!("Needs to be a valid date format ({desc}), equal to, or before :param."),
            );
            templates.insert(
                format!("INVALID_{stem}_BETWEEN"),
                format!("Needs to be a valid date format ({desc}) between :param and :param."),
            );
        }

        Self { templates }
    }

    /// Loads templates from a JSON object of `key -> template`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let templates: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { templates })
    }

    /// Adds or replaces one template.
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }

    /// Merges `other` into this table, `other` winning on conflicts.
    pub fn merge(mut self, other: MessageTable) -> Self {
        self.templates.extend(other.templates);
        self
    }

    /// Returns the raw template for `key`.
    pub fn template(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Returns the number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` if the table has no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[async_trait]
impl Translator for MessageTable {
    async fn resolve(&self, key: &str, params: &[String]) -> Result<String, TranslationError> {
        self.template(key)
            .map(|template| fill_placeholders(template, params))
            .ok_or_else(|| TranslationError::missing(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_in_order() {
        let params = vec!["1".to_string(), "5".to_string()];
        assert_eq!(fill_placeholders(":param-:param", &params), "1-5");
    }

    #[test]
    fn test_fill_missing_params() {
        assert_eq!(fill_placeholders("a :param b :param", &["x".into()]), "a x b :param");
        assert_eq!(fill_placeholders("no tokens", &["x".into()]), "no tokens");
    }

    #[tokio::test]
    async fn test_english_covers_dates() {
        let table = MessageTable::english();
        let text = table
            .resolve("INVALID_DATE_ISO_MIN", &["2012-05-25".into()])
            .await
            .unwrap();
        assert!(text.contains("yyyy-mm-dd"));
        assert!(text.contains("2012-05-25"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let err = MessageTable::new().resolve("NOPE", &[]).await.unwrap_err();
        assert!(matches!(err, TranslationError::MissingKey { key } if key == "NOPE"));
    }

    #[test]
    fn test_from_json() {
        let table = MessageTable::from_json(r#"{"INVALID_REQUIRED": "Obligatoire."}"#).unwrap();
        assert_eq!(table.template("INVALID_REQUIRED"), Some("Obligatoire."));
        assert_eq!(table.len(), 1);
    }
}
