//! Safe construction of parameterized patterns.
//!
//! User-supplied bounds and list items never reach a pattern unchecked:
//! numeric bounds are parsed first and list items are escaped.

use regex::{Regex, RegexBuilder};

use crate::error::ConfigurationError;
use crate::validator::{DateFormat, parse_number};

/// Builds and compiles patterns on behalf of one rule.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PatternBuilder<'a> {
    rule: &'a str,
}

/// Regex options derived from literal regex flags.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PatternFlags {
    pub multi_line: bool,
    pub dot_all: bool,
}

impl<'a> PatternBuilder<'a> {
    pub fn new(rule: &'a str) -> Self {
        Self { rule }
    }

    /// Parses a character-count or digit-count bound.
    pub fn count(&self, raw: &str) -> Result<usize, ConfigurationError> {
        raw.trim()
            .parse::<usize>()
            .map_err(|_| ConfigurationError::invalid_bound(self.rule, raw, "expected a non-negative integer"))
    }

    /// Parses two count bounds and checks their order.
    pub fn count_range(&self, min: &str, max: &str) -> Result<(usize, usize), ConfigurationError> {
        let (lo, hi) = (self.count(min)?, self.count(max)?);
        if lo > hi {
            return Err(ConfigurationError::invalid_bound(self.rule, max, "upper bound is below lower bound"));
        }
        Ok((lo, hi))
    }

    /// Checks that a numeric bound parses as a finite number.
    pub fn number(&self, raw: &str) -> Result<String, ConfigurationError> {
        parse_number(raw)
            .map(|_| raw.trim().to_string())
            .ok_or_else(|| ConfigurationError::invalid_bound(self.rule, raw, "expected a number"))
    }

    /// Checks that a date bound decomposes under `format`.
    pub fn date(&self, raw: &str, format: DateFormat) -> Result<String, ConfigurationError> {
        format
            .instant(raw)
            .map(|_| raw.trim().to_string())
            .ok_or_else(|| ConfigurationError::invalid_bound(self.rule, raw, "expected a date in the rule's format"))
    }

    /// `.{min,max}` over the whole value, line breaks included.
    pub fn length(&self, min: usize, max: Option<usize>) -> String {
        match max {
            Some(max) if max == min => format!("(?s)^.{{{min}}}$"),
            Some(max) => format!("(?s)^.{{{min},{max}}}$"),
            None => format!("(?s)^.{{{min},}}$"),
        }
    }

    /// `\d{min,max}` over the whole value.
    pub fn digits(&self, min: usize, max: usize) -> String {
        if min == max {
            format!(r"^\d{{{min}}}$")
        } else {
            format!(r"^\d{{{min},{max}}}$")
        }
    }

    /// Alternation of escaped list items.
    pub fn list(&self, items: &[String]) -> String {
        let options: Vec<String> = items.iter().map(|item| regex::escape(item)).collect();
        format!("^(?:{})$", options.join("|"))
    }

    /// Compiles `pattern` case-insensitively.
    pub fn compile(&self, pattern: &str) -> Result<Regex, ConfigurationError> {
        self.compile_with(pattern, PatternFlags::default())
    }

    /// Compiles `pattern` case-insensitively with extra flags.
    pub fn compile_with(&self, pattern: &str, flags: PatternFlags) -> Result<Regex, ConfigurationError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .build()
            .map_err(|source| ConfigurationError::InvalidPattern {
                rule: self.rule.to_string(),
                source,
            })
    }
}
