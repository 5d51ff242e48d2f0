//! Form membership

use std::collections::HashMap;

/// Which fields belong to which form, in registration order.
#[derive(Debug, Clone, Default)]
pub struct FormRegistry {
    forms: Vec<(String, Vec<String>)>,
    field_forms: HashMap<String, String>,
}

impl FormRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `field` to `form`, moving it out of any previous form.
    pub fn insert(&mut self, form: &str, field: &str) {
        if self.field_forms.get(field).is_some_and(|current| current == form) {
            return;
        }
        self.remove_field(field);
        match self.forms.iter_mut().find(|(name, _)| name == form) {
            Some((_, fields)) => fields.push(field.to_string()),
            None => self.forms.push((form.to_string(), vec![field.to_string()])),
        }
        self.field_forms.insert(field.to_string(), form.to_string());
    }

    /// Removes `field` from its form. Empty forms are dropped.
    pub fn remove_field(&mut self, field: &str) -> Option<String> {
        let form = self.field_forms.remove(field)?;
        if let Some(idx) = self.forms.iter().position(|(name, _)| *name == form) {
            self.forms[idx].1.retain(|f| f != field);
            if self.forms[idx].1.is_empty() {
                self.forms.remove(idx);
            }
        }
        Some(form)
    }

    /// Fields of `form`.
    pub fn fields(&self, form: &str) -> &[String] {
        self.forms
            .iter()
            .find(|(name, _)| name == form)
            .map(|(_, fields)| fields.as_slice())
            .unwrap_or_default()
    }

    /// Form of `field`.
    pub fn form_of(&self, field: &str) -> Option<&str> {
        self.field_forms.get(field).map(String::as_str)
    }

    /// Names of all forms.
    pub fn forms(&self) -> impl Iterator<Item = &str> {
        self.forms.iter().map(|(name, _)| name.as_str())
    }

    /// Returns `true` if `form` has at least one field.
    pub fn contains(&self, form: &str) -> bool {
        self.forms.iter().any(|(name, _)| name == form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let mut forms = FormRegistry::new();
        forms.insert("signup", "email");
        forms.insert("signup", "password");
        forms.insert("login", "user");

        assert_eq!(forms.fields("signup"), ["email", "password"]);
        assert_eq!(forms.form_of("user"), Some("login"));
        assert_eq!(forms.forms().collect::<Vec<_>>(), vec!["signup", "login"]);
        assert!(forms.fields("nope").is_empty());
    }

    #[test]
    fn test_move_and_remove() {
        let mut forms = FormRegistry::new();
        forms.insert("a", "x");
        forms.insert("b", "x");
        assert!(!forms.contains("a"));
        assert_eq!(forms.fields("b"), ["x"]);

        assert_eq!(forms.remove_field("x").as_deref(), Some("b"));
        assert!(!forms.contains("b"));
        assert_eq!(forms.remove_field("x"), None);
    }
}
