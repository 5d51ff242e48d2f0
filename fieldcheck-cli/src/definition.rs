//! JSON form definitions.

use std::collections::HashMap;

use fieldcheck_lib::translate::MessageTable;
use fieldcheck_lib::{EngineConfig, FieldOptions, FieldRegistration};
use serde::Deserialize;

/// A set of fields with their rules and values.
///
/// ```json
/// {
///   "config": { "messageSeparator": " " },
///   "messages": { "INVALID_REQUIRED": "Please fill this in." },
///   "fields": [
///     { "name": "email", "form": "signup", "rules": "required|email", "value": "jane@example.com" }
///   ]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default)]
    pub config: EngineConfig,
    /// Overrides of the English message templates.
    #[serde(default)]
    pub messages: HashMap<String, String>,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub form: Option<String>,
    pub rules: String,
    #[serde(default)]
    pub options: FieldOptions,
    #[serde(default)]
    pub value: Option<String>,
}

impl FormDefinition {
    /// English messages with this definition's overrides applied.
    pub fn message_table(&self) -> MessageTable {
        self.messages
            .iter()
            .fold(MessageTable::english(), |table, (key, template)| {
                table.with_message(key, template)
            })
    }
}

impl From<FieldDefinition> for FieldRegistration {
    fn from(def: FieldDefinition) -> Self {
        FieldRegistration {
            name: def.name,
            form: def.form,
            rules: def.rules,
            options: def.options,
            value: def.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definition() {
        let def: FormDefinition = serde_json::from_str(
            r#"{
                "messages": {"INVALID_REQUIRED": "Needed."},
                "fields": [
                    {"name": "email", "form": "signup", "rules": "required|email", "options": {"friendlyName": "E-mail"}},
                    {"name": "age", "rules": "int", "value": "42"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(def.fields.len(), 2);
        assert_eq!(def.message_table().template("INVALID_REQUIRED"), Some("Needed."));
        assert_eq!(def.message_table().template("INVALID_EMAIL"), Some("Must be a valid email address."));

        let age: FieldRegistration = def.fields.into_iter().nth(1).unwrap().into();
        assert_eq!(age.value.as_deref(), Some("42"));
        assert!(age.form.is_none());
    }
}
