//! Cross-field dependencies.
//!
//! A field with a `match` or `different` rule depends on the field it
//! compares against. When the source field changes, every dependent is
//! re-evaluated at once, whatever its own debounce delay.

use crate::validator::Operator;

/// One dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// Field owning the matching validator.
    pub dependent: String,
    /// Field it compares against.
    pub source: String,
    pub operator: Operator,
}

/// Dependency edges between fields, in registration order.
#[derive(Debug, Clone, Default)]
pub struct CrossFieldRegistry {
    edges: Vec<DependencyEdge>,
}

impl CrossFieldRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `dependent` compares against `source`. Registering the
    /// same edge again only refreshes its operator.
    pub fn register_dependency(&mut self, dependent: &str, source: &str, operator: Operator) {
        if let Some(edge) = self
            .edges
            .iter_mut()
            .find(|edge| edge.dependent == dependent && edge.source == source)
        {
            edge.operator = operator;
            return;
        }
        self.edges.push(DependencyEdge {
            dependent: dependent.to_string(),
            source: source.to_string(),
            operator,
        });
    }

    /// Fields to re-evaluate when `source` changes.
    pub fn dependents_of(&self, source: &str) -> Vec<String> {
        let mut dependents: Vec<String> = Vec::new();
        for edge in self.edges.iter().filter(|edge| edge.source == source) {
            if !dependents.contains(&edge.dependent) {
                dependents.push(edge.dependent.clone());
            }
        }
        dependents
    }

    /// Fields `dependent` compares against.
    pub fn sources_of(&self, dependent: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| edge.dependent == dependent)
            .map(|edge| edge.source.as_str())
            .collect()
    }

    /// Drops every edge owned by `dependent`. Returns how many were dropped.
    pub fn remove_dependent(&mut self, dependent: &str) -> usize {
        let before = self.edges.len();
        self.edges.retain(|edge| edge.dependent != dependent);
        before - self.edges.len()
    }

    /// Returns every edge.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CrossFieldRegistry::new();
        registry.register_dependency("confirm", "password", Operator::Eq);
        registry.register_dependency("nickname", "password", Operator::Ne);
        registry.register_dependency("confirm", "password", Operator::Eq);

        assert_eq!(registry.edges().len(), 2);
        assert_eq!(registry.dependents_of("password"), vec!["confirm", "nickname"]);
        assert_eq!(registry.sources_of("confirm"), vec!["password"]);
        assert!(registry.dependents_of("confirm").is_empty());
    }

    #[test]
    fn test_refresh_operator() {
        let mut registry = CrossFieldRegistry::new();
        registry.register_dependency("b", "a", Operator::Eq);
        registry.register_dependency("b", "a", Operator::Ne);
        assert_eq!(registry.edges()[0].operator, Operator::Ne);
    }

    #[test]
    fn test_remove_dependent() {
        let mut registry = CrossFieldRegistry::new();
        registry.register_dependency("b", "a", Operator::Eq);
        registry.register_dependency("c", "a", Operator::Eq);
        assert_eq!(registry.remove_dependent("b"), 1);
        assert_eq!(registry.dependents_of("a"), vec!["c"]);
    }
}
