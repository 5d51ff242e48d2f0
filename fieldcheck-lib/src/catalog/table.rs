//! The rule keyword table.

use super::patterns;
use crate::validator::{DateFormat, Operator};

/// Which bound(s) a length or numeric rule carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    Exact,
    Min,
    Max,
    Between,
}

impl Bound {
    /// Number of parameters the bound needs.
    pub fn arity(self) -> usize {
        match self {
            Self::Between => 2,
            _ => 1,
        }
    }
}

/// How a keyword turns into a validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Template {
    Required,
    Fixed(&'static str),
    Length(Bound),
    Number(Bound),
    Auto(Bound),
    Digits,
    DigitsBetween,
    List { negated: bool },
    Matching(Operator),
    Custom,
    Remote,
    Literal,
}

/// One row of the table.
#[derive(Debug)]
pub(crate) struct RuleEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub template: Template,
    pub message_key: &'static str,
}

const fn entry(
    name: &'static str,
    aliases: &'static [&'static str],
    template: Template,
    message_key: &'static str,
) -> RuleEntry {
    RuleEntry {
        name,
        aliases,
        template,
        message_key,
    }
}

/// Message keys of the numeric shape of each auto-detect rule; the length
/// shape uses the entry's own key.
pub(crate) fn auto_numeric_key(bound: Bound) -> &'static str {
    match bound {
        Bound::Exact => "INVALID_EXACT_NUM",
        Bound::Min => "INVALID_MIN_NUM",
        Bound::Max => "INVALID_MAX_NUM",
        Bound::Between => "INVALID_BETWEEN_NUM",
    }
}

pub(crate) static RULES: &[RuleEntry] = &[
    entry("required", &[], Template::Required, "INVALID_REQUIRED"),
    entry("accepted", &[], Template::Fixed(patterns::ACCEPTED), "INVALID_ACCEPTED"),
    // Character classes
    entry("alpha", &[], Template::Fixed(patterns::ALPHA), "INVALID_ALPHA"),
    entry("alpha_spaces", &["alpha_space"], Template::Fixed(patterns::ALPHA_SPACES), "INVALID_ALPHA_SPACE"),
    entry("alpha_num", &[], Template::Fixed(patterns::ALPHA_NUM), "INVALID_ALPHA_NUM"),
    entry(
        "alpha_num_spaces",
        &["alpha_num_space"],
        Template::Fixed(patterns::ALPHA_NUM_SPACES),
        "INVALID_ALPHA_NUM_SPACE",
    ),
    entry("alpha_dash", &[], Template::Fixed(patterns::ALPHA_DASH), "INVALID_ALPHA_DASH"),
    entry(
        "alpha_dash_spaces",
        &["alpha_dash_space"],
        Template::Fixed(patterns::ALPHA_DASH_SPACES),
        "INVALID_ALPHA_DASH_SPACE",
    ),
    // Lengths
    entry("exact_len", &[], Template::Length(Bound::Exact), "INVALID_EXACT_LEN"),
    entry("min_len", &[], Template::Length(Bound::Min), "INVALID_MIN_CHAR"),
    entry("max_len", &[], Template::Length(Bound::Max), "INVALID_MAX_CHAR"),
    entry("between_len", &[], Template::Length(Bound::Between), "INVALID_BETWEEN_CHAR"),
    // Numeric ranges
    entry("min_num", &[], Template::Number(Bound::Min), "INVALID_MIN_NUM"),
    entry("max_num", &[], Template::Number(Bound::Max), "INVALID_MAX_NUM"),
    entry("between_num", &[], Template::Number(Bound::Between), "INVALID_BETWEEN_NUM"),
    // Length or number, decided by the value
    entry("size", &[], Template::Auto(Bound::Exact), "INVALID_EXACT_LEN"),
    entry("min", &[], Template::Auto(Bound::Min), "INVALID_MIN_CHAR"),
    entry("max", &[], Template::Auto(Bound::Max), "INVALID_MAX_CHAR"),
    entry("between", &["range"], Template::Auto(Bound::Between), "INVALID_BETWEEN_CHAR"),
    // Formats
    entry("boolean", &[], Template::Fixed(patterns::BOOLEAN), "INVALID_BOOLEAN"),
    entry("credit_card", &[], Template::Fixed(patterns::CREDIT_CARD), "INVALID_CREDIT_CARD"),
    entry("email", &["email_address"], Template::Fixed(patterns::EMAIL), "INVALID_EMAIL"),
    entry("iban", &[], Template::Fixed(patterns::IBAN), "INVALID_IBAN"),
    entry("phone", &[], Template::Fixed(patterns::PHONE), "INVALID_PHONE"),
    entry("time", &[], Template::Fixed(patterns::TIME), "INVALID_TIME"),
    entry("url", &[], Template::Fixed(patterns::URL), "INVALID_URL"),
    entry("ipv4", &["ip"], Template::Fixed(patterns::IPV4), "INVALID_IPV4"),
    entry("ipv6", &[], Template::Fixed(patterns::IPV6), "INVALID_IPV6"),
    entry("int", &["integer"], Template::Fixed(patterns::INTEGER), "INVALID_INTEGER"),
    entry(
        "int_signed",
        &["integer_signed"],
        Template::Fixed(patterns::INTEGER_SIGNED),
        "INVALID_INTEGER_SIGNED",
    ),
    entry("float", &[], Template::Fixed(patterns::FLOAT), "INVALID_FLOAT"),
    entry("float_signed", &[], Template::Fixed(patterns::FLOAT_SIGNED), "INVALID_FLOAT_SIGNED"),
    entry("numeric", &[], Template::Fixed(patterns::NUMERIC), "INVALID_NUMERIC"),
    entry(
        "numeric_signed",
        &[],
        Template::Fixed(patterns::NUMERIC_SIGNED),
        "INVALID_NUMERIC_SIGNED",
    ),
    entry("digits", &[], Template::Digits, "INVALID_DIGITS"),
    entry("digits_between", &[], Template::DigitsBetween, "INVALID_DIGITS_BETWEEN"),
    // Lists
    entry("in", &["in_list"], Template::List { negated: false }, "INVALID_IN_LIST"),
    entry("not_in", &["not_in_list"], Template::List { negated: true }, "INVALID_NOT_IN_LIST"),
    // Cross-field
    entry("match", &["same", "match_input"], Template::Matching(Operator::Eq), "INVALID_INPUT_MATCH"),
    entry(
        "different",
        &["different_input"],
        Template::Matching(Operator::Ne),
        "INVALID_INPUT_DIFFERENT",
    ),
    // Escape hatches
    entry("custom", &["javascript"], Template::Custom, "INVALID_CUSTOM"),
    entry("remote", &[], Template::Remote, "INVALID_REMOTE"),
    entry("pattern", &["regex"], Template::Literal, "INVALID_PATTERN"),
];

/// Looks up a normalized keyword.
pub(crate) fn lookup(name: &str) -> Option<&'static RuleEntry> {
    RULES
        .iter()
        .find(|entry| entry.name == name || entry.aliases.contains(&name))
}

/// Decodes `date_<style>[_<bound>]` keywords.
pub(crate) fn lookup_date(name: &str) -> Option<(DateFormat, Option<Bound>)> {
    let (stem, bound) = if let Some(stem) = name.strip_suffix("_between") {
        (stem, Some(Bound::Between))
    } else if let Some(stem) = name.strip_suffix("_min") {
        (stem, Some(Bound::Min))
    } else if let Some(stem) = name.strip_suffix("_max") {
        (stem, Some(Bound::Max))
    } else {
        (name, None)
    };
    DateFormat::ALL
        .into_iter()
        .find(|format| format.rule_stem() == stem)
        .map(|format| (format, bound))
}

/// Message key of a date rule, e.g. `INVALID_DATE_EURO_LONG_MIN`.
pub(crate) fn date_message_key(format: DateFormat, bound: Option<Bound>) -> String {
    let suffix = match bound {
        None | Some(Bound::Exact) => "",
        Some(Bound::Min) => "_MIN",
        Some(Bound::Max) => "_MAX",
        Some(Bound::Between) => "_BETWEEN",
    };
    format!("INVALID_{}{}", format.rule_stem().to_uppercase(), suffix)
}
