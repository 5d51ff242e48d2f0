//! Field value access.

use std::collections::HashMap;

/// Read access to the latest known value of any field.
///
/// Matching validators use this to compare against the value of the field
/// they reference. Reads are snapshots; a later change to the referenced
/// field re-triggers the dependent evaluation.
pub trait FieldValueSource: Send + Sync {
    /// Returns the current value of `field`, or `None` if it has none.
    fn current(&self, field: &str) -> Option<String>;
}

impl FieldValueSource for HashMap<String, String> {
    fn current(&self, field: &str) -> Option<String> {
        self.get(field).cloned()
    }
}

/// Latest values of the registered fields.
///
/// A field that was never set, or was cleared, has no value. That is
/// distinct from an empty string: only a missing value fails `required`
/// without running its pattern.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    values: HashMap<String, String>,
}

impl ValueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, returning the previous one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(field.into(), value.into())
    }

    /// Removes the value of `field`, returning it.
    pub fn clear(&mut self, field: &str) -> Option<String> {
        self.values.remove(field)
    }

    /// Returns the value of `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Copies the values of the given fields into a standalone map.
    pub fn subset<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
        fields
            .into_iter()
            .filter_map(|field| self.values.get(field).map(|value| (field.to_string(), value.clone())))
            .collect()
    }

    /// Returns the number of fields holding a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no field holds a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FieldValueSource for ValueStore {
    fn current(&self, field: &str) -> Option<String> {
        self.values.get(field).cloned()
    }
}
