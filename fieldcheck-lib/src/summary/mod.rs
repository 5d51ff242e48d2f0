//! Validation summary.
//!
//! Holds one entry per currently invalid field, in first-failure order.
//! Entries are projected per form on demand.

mod forms;

pub use forms::FormRegistry;

use serde::Serialize;

use crate::error::ConfigurationError;

/// One invalid field as shown in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummaryEntry {
    pub field_name: String,
    pub form_name: Option<String>,
    pub friendly_name: String,
    pub message: String,
}

impl ValidationSummaryEntry {
    /// Creates an entry whose friendly name is the field name.
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            friendly_name: field_name.clone(),
            field_name,
            form_name: None,
            message: message.into(),
        }
    }

    /// Sets the form.
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form_name = Some(form.into());
        self
    }

    /// Sets the friendly name.
    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = name.into();
        self
    }
}

/// The current error entries of every field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    entries: Vec<ValidationSummaryEntry>,
}

impl ValidationSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`, or replaces the field's existing entry in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingFieldName`] if the entry has no
    /// field name.
    ///
    /// # Example
    ///
    /// ```
    /// use fieldcheck_lib::summary::{ValidationSummary, ValidationSummaryEntry};
    ///
    /// let mut summary = ValidationSummary::new();
    /// summary.add(ValidationSummaryEntry::new("email", "Must be a valid email address.")).unwrap();
    /// summary.add(ValidationSummaryEntry::new("email", "Field is required.")).unwrap();
    /// assert_eq!(summary.len(), 1);
    /// assert!(summary.add(ValidationSummaryEntry::new("", "x")).is_err());
    /// ```
    pub fn add(&mut self, entry: ValidationSummaryEntry) -> Result<(), ConfigurationError> {
        if entry.field_name.is_empty() {
            return Err(ConfigurationError::MissingFieldName);
        }
        match self.entries.iter_mut().find(|e| e.field_name == entry.field_name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    /// Removes the entry of `field`.
    pub fn remove(&mut self, field: &str) -> Option<ValidationSummaryEntry> {
        let idx = self.entries.iter().position(|e| e.field_name == field)?;
        Some(self.entries.remove(idx))
    }

    /// Entries of `form`.
    pub fn by_form(&self, form: &str) -> Vec<&ValidationSummaryEntry> {
        self.entries
            .iter()
            .filter(|e| e.form_name.as_deref() == Some(form))
            .collect()
    }

    /// Removes every entry of `form`. Returns how many were removed.
    pub fn clear_form(&mut self, form: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.form_name.as_deref() != Some(form));
        before - self.entries.len()
    }

    /// Entry of `field`.
    pub fn get(&self, field: &str) -> Option<&ValidationSummaryEntry> {
        self.entries.iter().find(|e| e.field_name == field)
    }

    /// Every entry, in first-failure order.
    pub fn entries(&self) -> &[ValidationSummaryEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no field is invalid.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
