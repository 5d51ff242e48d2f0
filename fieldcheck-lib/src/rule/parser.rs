//! Rule-chain splitting.

use super::literal::{self, LiteralRegex};
use super::{ALT_MARKER, LIST_SEPARATOR, PARAM_SEPARATOR, REQUIRED, RULE_SEPARATOR};
use crate::catalog;
use crate::error::ConfigurationError;

/// One clause of a rule chain, before catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRule {
    /// Rule keyword as written.
    pub name: String,
    /// Comma-separated parameters.
    pub params: Vec<String>,
    /// Alternate message text (`:alt=...`), verbatim.
    pub alt_text: Option<String>,
}

impl RawRule {
    /// Creates a rule with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            alt_text: None,
        }
    }
}

/// Result of parsing a rule string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRules {
    /// Clauses in declaration order.
    pub rules: Vec<RawRule>,
    /// The extracted literal regex, if the string carried one.
    pub literal: Option<LiteralRegex>,
    /// Whether the chain contains the `required` keyword.
    pub field_required: bool,
}

/// Parses a rule string into raw clauses.
///
/// Unknown rule names are accepted here; the catalog rejects them when the
/// clauses are resolved. Range rules with anything other than two bounds are
/// rejected immediately.
///
/// # Example
///
/// ```
/// use fieldcheck_lib::rule::parse;
///
/// let parsed = parse("alpha|min_len:2|required").unwrap();
/// assert_eq!(parsed.rules.len(), 3);
/// assert_eq!(parsed.rules[1].params, vec!["2".to_string()]);
/// assert!(parsed.field_required);
/// ```
pub fn parse(rules: &str) -> Result<ParsedRules, ConfigurationError> {
    let (remaining, literal) = literal::extract(rules)?;

    let mut parsed = Vec::new();
    for clause in remaining.split(RULE_SEPARATOR).map(str::trim) {
        if clause.is_empty() {
            continue;
        }
        let rule = parse_clause(clause);
        check_range(&rule)?;
        parsed.push(rule);
    }

    let field_required = parsed.iter().any(|rule| rule.name == REQUIRED);
    Ok(ParsedRules {
        rules: parsed,
        literal,
        field_required,
    })
}

fn parse_clause(clause: &str) -> RawRule {
    let (head, alt_text) = match find_alt(clause) {
        Some(idx) => {
            let head = clause[..idx].strip_suffix(PARAM_SEPARATOR).unwrap_or(&clause[..idx]);
            (head, Some(clause[idx + ALT_MARKER.len()..].to_string()))
        }
        None => (clause, None),
    };

    let (name, params) = match head.split_once(PARAM_SEPARATOR) {
        Some((name, params)) => (name, split_params(params)),
        None => (head, Vec::new()),
    };

    RawRule {
        name: name.trim().to_string(),
        params,
        alt_text,
    }
}

/// Finds the alternate-text marker. It must follow a parameter separator,
/// or start the clause, so a parameter value merely containing `alt=` is
/// left alone.
fn find_alt(clause: &str) -> Option<usize> {
    if clause.starts_with(ALT_MARKER) {
        return Some(0);
    }
    let mut offset = 0;
    while let Some(i) = clause[offset..].find(ALT_MARKER) {
        let at = offset + i;
        if clause[..at].ends_with(PARAM_SEPARATOR) {
            return Some(at);
        }
        offset = at + ALT_MARKER.len();
    }
    None
}

fn split_params(params: &str) -> Vec<String> {
    params
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn check_range(rule: &RawRule) -> Result<(), ConfigurationError> {
    if let Some(expected) = catalog::range_syntax(&rule.name) {
        if rule.params.len() != 2 {
            return Err(ConfigurationError::malformed_range(&rule.name, expected));
        }
    }
    Ok(())
}
