//! Validator catalog.
//!
//! Maps rule keywords and their parameters to [`ValidatorSpec`]s. Keywords
//! are case-sensitive but may be written in camelCase or snake_case:
//! `minLen` and `min_len` are the same rule.
//!
//! All parameter checking happens here, at registration time. A rule string
//! that resolves successfully never raises a configuration error during
//! evaluation.

mod builder;
mod patterns;
mod table;

use builder::{PatternBuilder, PatternFlags};
use table::{Bound, RuleEntry, Template};

use crate::error::ConfigurationError;
use crate::rule::{self, LiteralRegex, RawRule};
use crate::validator::{AutoAlternatives, Condition, DateFormat, MatchTarget, Operator, ValidatorKind, ValidatorSpec};

/// The resolved validators of one rule string.
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    /// Validators in declaration order.
    pub validators: Vec<ValidatorSpec>,
    /// Whether the chain contains `required`.
    pub field_required: bool,
}

impl CompiledRules {
    /// Fields referenced by matching validators.
    pub fn match_targets(&self) -> impl Iterator<Item = &MatchTarget> {
        self.validators.iter().filter_map(ValidatorSpec::target)
    }

    /// Callback names used by custom and remote validators.
    pub fn callbacks(&self) -> impl Iterator<Item = (&ValidatorSpec, &str)> {
        self.validators
            .iter()
            .filter_map(|spec| spec.callback().map(|callback| (spec, callback)))
    }
}

/// Parses and resolves a complete rule string.
///
/// # Example
///
/// ```
/// use fieldcheck_lib::catalog;
/// use fieldcheck_lib::validator::ValidatorKind;
///
/// let compiled = catalog::compile("required|betweenLen:1,5").unwrap();
/// assert!(compiled.field_required);
/// assert_eq!(compiled.validators[1].kind(), ValidatorKind::Regex);
/// assert!(catalog::compile("no_such_rule").is_err());
/// ```
pub fn compile(rules: &str) -> Result<CompiledRules, ConfigurationError> {
    let parsed = rule::parse(rules)?;
    let validators = parsed
        .rules
        .iter()
        .map(|raw| resolve(raw, parsed.literal.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CompiledRules {
        validators,
        field_required: parsed.field_required,
    })
}

/// Converts a camelCase keyword to snake_case. A leading capital is kept,
/// so keywords stay case-sensitive.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            if !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Returns the expected syntax if `name` is a rule taking exactly two
/// comma-separated bounds.
pub fn range_syntax(name: &str) -> Option<String> {
    let normalized = normalize(name);
    if let Some(entry) = table::lookup(&normalized) {
        return match entry.template {
            Template::Length(Bound::Between)
            | Template::Number(Bound::Between)
            | Template::Auto(Bound::Between)
            | Template::DigitsBetween => Some(format!("{name}:min,max")),
            _ => None,
        };
    }
    match table::lookup_date(&normalized) {
        Some((format, Some(Bound::Between))) => {
            Some(format!("{name}:{0},{0}", format.description()))
        }
        _ => None,
    }
}

/// Resolves one raw clause into a validator.
pub fn resolve(rule: &RawRule, literal: Option<&LiteralRegex>) -> Result<ValidatorSpec, ConfigurationError> {
    let name = normalize(&rule.name);
    let mut spec = if let Some(entry) = table::lookup(&name) {
        build(entry, rule, literal)?
    } else if let Some((format, bound)) = table::lookup_date(&name) {
        build_date(&name, format, bound, &rule.params)?
    } else {
        return Err(ConfigurationError::unknown_rule(&rule.name));
    };
    if spec.alt_text.is_none() {
        spec.alt_text = rule.alt_text.clone();
    }
    Ok(spec)
}

fn expect_params(rule: &str, params: &[String], expected: &'static str, ok: bool) -> Result<(), ConfigurationError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigurationError::ParamCount {
            rule: rule.to_string(),
            expected,
            actual: params.len(),
        })
    }
}

fn expect_bound(rule: &str, params: &[String], bound: Bound) -> Result<(), ConfigurationError> {
    let expected = if bound.arity() == 2 { "2" } else { "1" };
    expect_params(rule, params, expected, params.len() == bound.arity())
}

fn build(entry: &RuleEntry, rule: &RawRule, literal: Option<&LiteralRegex>) -> Result<ValidatorSpec, ConfigurationError> {
    let name = entry.name;
    let params = &rule.params;
    let builder = PatternBuilder::new(name);

    let spec = match entry.template {
        Template::Required => {
            expect_params(name, params, "0", params.is_empty())?;
            let mut spec = ValidatorSpec::new(name, ValidatorKind::Regex, entry.message_key)
                .with_pattern(builder.compile(patterns::REQUIRED)?);
            spec.required = true;
            spec
        }
        Template::Fixed(pattern) => {
            expect_params(name, params, "0", params.is_empty())?;
            ValidatorSpec::new(name, ValidatorKind::Regex, entry.message_key).with_pattern(builder.compile(pattern)?)
        }
        Template::Length(bound) => {
            expect_bound(name, params, bound)?;
            length_spec(name, entry.message_key, bound, params)?
        }
        Template::Number(bound) => {
            expect_bound(name, params, bound)?;
            number_spec(name, entry.message_key, bound, params)?
        }
        Template::Auto(bound) => {
            expect_bound(name, params, bound)?;
            let numeric = number_spec(name, table::auto_numeric_key(bound), bound, params)?;
            let counts_ok = params.iter().all(|p| builder.count(p).is_ok());
            let length = if counts_ok {
                Some(length_spec(name, entry.message_key, bound, params)?)
            } else {
                None
            };
            let mut spec =
                ValidatorSpec::new(name, ValidatorKind::AutoDetect, entry.message_key).with_params(params.clone());
            spec.auto = Some(Box::new(AutoAlternatives { length, numeric }));
            spec
        }
        Template::Digits => {
            expect_params(name, params, "1", params.len() == 1)?;
            let n = builder.count(&params[0])?;
            ValidatorSpec::new(name, ValidatorKind::Regex, entry.message_key)
                .with_pattern(builder.compile(&builder.digits(n, n))?)
                .with_params(params.clone())
        }
        Template::DigitsBetween => {
            expect_params(name, params, "2", params.len() == 2)?;
            let (lo, hi) = builder.count_range(&params[0], &params[1])?;
            ValidatorSpec::new(name, ValidatorKind::Regex, entry.message_key)
                .with_pattern(builder.compile(&builder.digits(lo, hi))?)
                .with_params(params.clone())
        }
        Template::List { negated } => {
            expect_params(name, params, "at least 1", !params.is_empty())?;
            let mut spec = ValidatorSpec::new(name, ValidatorKind::Regex, entry.message_key)
                .with_pattern(builder.compile(&builder.list(params))?)
                .with_params(vec![params.join(", ")]);
            spec.negated = negated;
            spec
        }
        Template::Matching(operator) => {
            expect_params(name, params, "1 or 2", matches!(params.len(), 1 | 2))?;
            let field = params[0].clone();
            let label = params.get(1).cloned().unwrap_or_else(|| field.clone());
            let mut spec =
                ValidatorSpec::new(name, ValidatorKind::Matching, entry.message_key).with_params(vec![label.clone()]);
            spec.target = Some(MatchTarget { field, label, operator });
            spec
        }
        Template::Custom | Template::Remote => {
            expect_params(name, params, "1", params.len() == 1)?;
            let kind = if entry.template == Template::Custom {
                ValidatorKind::Custom
            } else {
                ValidatorKind::Remote
            };
            let mut spec = ValidatorSpec::new(name, kind, entry.message_key);
            spec.callback = Some(params[0].clone());
            spec
        }
        Template::Literal => {
            expect_params(name, params, "0", params.is_empty())?;
            let literal = literal.ok_or_else(|| ConfigurationError::MissingLiteralRegex {
                rule: rule.name.clone(),
            })?;
            let flags = PatternFlags {
                multi_line: literal.has_flag('m'),
                dot_all: literal.has_flag('s'),
            };
            let mut spec = ValidatorSpec::new(name, ValidatorKind::Regex, entry.message_key)
                .with_pattern(builder.compile_with(&literal.pattern, flags)?)
                .with_params(vec![literal.pattern.clone()]);
            spec.alt_text = literal.alt_text.clone();
            spec
        }
    };
    Ok(spec)
}

fn length_spec(name: &str, key: &str, bound: Bound, params: &[String]) -> Result<ValidatorSpec, ConfigurationError> {
    let builder = PatternBuilder::new(name);
    let pattern = match bound {
        Bound::Exact => {
            let n = builder.count(&params[0])?;
            builder.length(n, Some(n))
        }
        Bound::Min => builder.length(builder.count(&params[0])?, None),
        Bound::Max => builder.length(0, Some(builder.count(&params[0])?)),
        Bound::Between => {
            let (lo, hi) = builder.count_range(&params[0], &params[1])?;
            builder.length(lo, Some(hi))
        }
    };
    Ok(ValidatorSpec::new(name, ValidatorKind::Regex, key)
        .with_pattern(builder.compile(&pattern)?)
        .with_params(params.to_vec()))
}

fn number_spec(name: &str, key: &str, bound: Bound, params: &[String]) -> Result<ValidatorSpec, ConfigurationError> {
    let builder = PatternBuilder::new(name);
    let conditions = match bound {
        Bound::Exact => vec![Condition::new(Operator::Eq, builder.number(&params[0])?)],
        Bound::Min => vec![Condition::new(Operator::Ge, builder.number(&params[0])?)],
        Bound::Max => vec![Condition::new(Operator::Le, builder.number(&params[0])?)],
        Bound::Between => between(builder.number(&params[0])?, builder.number(&params[1])?),
    };
    Ok(ValidatorSpec::new(name, ValidatorKind::ConditionalNumber, key)
        .with_conditions(conditions)
        .with_params(params.to_vec()))
}

fn build_date(
    name: &str,
    format: DateFormat,
    bound: Option<Bound>,
    params: &[String],
) -> Result<ValidatorSpec, ConfigurationError> {
    let builder = PatternBuilder::new(name);
    let conditions = match bound {
        None => {
            expect_params(name, params, "0", params.is_empty())?;
            Vec::new()
        }
        Some(bound) => {
            expect_bound(name, params, bound)?;
            match bound {
                Bound::Exact => vec![Condition::new(Operator::Eq, builder.date(&params[0], format)?)],
                Bound::Min => vec![Condition::new(Operator::Ge, builder.date(&params[0], format)?)],
                Bound::Max => vec![Condition::new(Operator::Le, builder.date(&params[0], format)?)],
                Bound::Between => between(builder.date(&params[0], format)?, builder.date(&params[1], format)?),
            }
        }
    };
    let mut spec = ValidatorSpec::new(name, ValidatorKind::ConditionalDate, table::date_message_key(format, bound))
        .with_pattern(builder.compile(&format.pattern())?)
        .with_conditions(conditions)
        .with_params(params.to_vec());
    spec.date_format = Some(format);
    Ok(spec)
}

fn between(min: String, max: String) -> Vec<Condition> {
    vec![Condition::new(Operator::Ge, min), Condition::new(Operator::Le, max)]
}
