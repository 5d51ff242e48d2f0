//! Resolved validators.
//!
//! A [`ValidatorSpec`] is what one clause of a rule chain turns into once the
//! catalog has resolved it. Specs are immutable; a changed rule string
//! produces a fresh set.

mod date;

pub use date::{DateFormat, DateOrder, DateParts, YearDigits};

use regex::Regex;

/// Evaluation strategy of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    /// Case-insensitive pattern match.
    Regex,
    /// Numeric comparison against one or two bounds.
    ConditionalNumber,
    /// Calendar comparison against one or two bounds.
    ConditionalDate,
    /// Comparison against another field's current value.
    Matching,
    /// Named callback, resolved asynchronously.
    Custom,
    /// Named remote callback, resolved asynchronously.
    Remote,
    /// Length or numeric check, decided by the value's shape.
    AutoDetect,
}

impl ValidatorKind {
    /// Returns `true` for kinds resolved through the async coordinator.
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Custom | Self::Remote)
    }
}

/// Relational operator used by conditional and matching validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    /// Evaluates `lhs <op> rhs`.
    pub fn holds<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }

    /// Returns the operator as a symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One comparison of a conditional validator: `value <operator> bound`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub operator: Operator,
    pub bound: String,
}

impl Condition {
    /// Creates a new condition.
    pub fn new(operator: Operator, bound: impl Into<String>) -> Self {
        Self {
            operator,
            bound: bound.into(),
        }
    }
}

/// The field a matching validator compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTarget {
    /// Name of the referenced field.
    pub field: String,
    /// Label used in messages; defaults to the field name.
    pub label: String,
    /// `Eq` for match rules, `Ne` for different rules.
    pub operator: Operator,
}

/// The two concrete shapes of an auto-detect validator.
#[derive(Debug, Clone)]
pub(crate) struct AutoAlternatives {
    /// Absent when a bound is not a character count.
    pub length: Option<ValidatorSpec>,
    pub numeric: ValidatorSpec,
}

/// A resolved, immutable validator.
#[derive(Debug, Clone)]
pub struct ValidatorSpec {
    pub(crate) rule_name: String,
    pub(crate) kind: ValidatorKind,
    pub(crate) pattern: Option<Regex>,
    pub(crate) negated: bool,
    pub(crate) required: bool,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) date_format: Option<DateFormat>,
    pub(crate) message_key: String,
    pub(crate) params: Vec<String>,
    pub(crate) alt_text: Option<String>,
    pub(crate) target: Option<MatchTarget>,
    pub(crate) callback: Option<String>,
    pub(crate) auto: Option<Box<AutoAlternatives>>,
}

impl ValidatorSpec {
    pub(crate) fn new(rule_name: impl Into<String>, kind: ValidatorKind, message_key: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            kind,
            pattern: None,
            negated: false,
            required: false,
            conditions: Vec::new(),
            date_format: None,
            message_key: message_key.into(),
            params: Vec::new(),
            alt_text: None,
            target: None,
            callback: None,
            auto: None,
        }
    }

    pub(crate) fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub(crate) fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    pub(crate) fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The normalized rule keyword this spec was built from.
    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    /// The evaluation strategy.
    pub fn kind(&self) -> ValidatorKind {
        self.kind
    }

    /// The compiled pattern, for regex and date validators.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Whether a pattern match means failure (`not_in`).
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Whether this is the reserved `required` validator.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// One or two comparisons for conditional validators.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The date style tag for date validators.
    pub fn date_format(&self) -> Option<DateFormat> {
        self.date_format
    }

    /// Key passed to the translator when this validator fails.
    pub fn message_key(&self) -> &str {
        &self.message_key
    }

    /// Values substituted into the message placeholders.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Alternate message text, replacing the translated message.
    pub fn alt_text(&self) -> Option<&str> {
        self.alt_text.as_deref()
    }

    /// The referenced field for matching validators.
    pub fn target(&self) -> Option<&MatchTarget> {
        self.target.as_ref()
    }

    /// Callback name for custom and remote validators.
    pub fn callback(&self) -> Option<&str> {
        self.callback.as_deref()
    }

    // -------------------------------------------------------------------------
    // Checks
    // -------------------------------------------------------------------------

    /// Runs the pattern against `value`. A `None` value never satisfies the
    /// `required` validator.
    pub(crate) fn check_pattern(&self, value: Option<&str>) -> bool {
        if self.required && value.is_none() {
            return false;
        }
        let Some(pattern) = &self.pattern else {
            return true;
        };
        pattern.is_match(value.unwrap_or_default()) != self.negated
    }

    /// Compares `value` numerically against every condition.
    pub(crate) fn check_number(&self, value: &str) -> bool {
        let Some(number) = parse_number(value) else {
            return false;
        };
        self.conditions.iter().all(|condition| {
            parse_number(&condition.bound).is_some_and(|bound| condition.operator.holds(&number, &bound))
        })
    }

    /// Checks the date format, then compares the decomposed instants.
    pub(crate) fn check_date(&self, value: &str) -> bool {
        if !self.check_pattern(Some(value)) {
            return false;
        }
        let Some(format) = self.date_format else {
            return false;
        };
        let Some(instant) = format.instant(value) else {
            return false;
        };
        self.conditions.iter().all(|condition| {
            format
                .instant(&condition.bound)
                .is_some_and(|bound| condition.operator.holds(&instant, &bound))
        })
    }

    /// Picks the concrete shape of an auto-detect validator for `value`:
    /// numeric when the value parses as a number, length otherwise.
    pub(crate) fn resolve_auto(&self, value: &str) -> Option<&ValidatorSpec> {
        let auto = self.auto.as_deref()?;
        if parse_number(value).is_some() {
            return Some(&auto.numeric);
        }
        Some(auto.length.as_ref().unwrap_or(&auto.numeric))
    }
}

/// Parses a finite floating point number, ignoring surrounding whitespace.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_holds() {
        assert!(Operator::Ge.holds(&5.0, &5.0));
        assert!(!Operator::Gt.holds(&5.0, &5.0));
        assert!(Operator::Ne.holds("a", "b"));
        assert!(Operator::Eq.holds("a", "a"));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_between_number() {
        let spec = ValidatorSpec::new("between_num", ValidatorKind::ConditionalNumber, "INVALID_BETWEEN_NUM")
            .with_conditions(vec![Condition::new(Operator::Ge, "1"), Condition::new(Operator::Le, "10")]);
        assert!(spec.check_number("1"));
        assert!(spec.check_number("10"));
        assert!(!spec.check_number("10.5"));
        assert!(!spec.check_number("abc"));
    }
}
