//! Extraction of the embedded literal regex clause.
//!
//! A literal regex may contain the rule separator, so it has to be lifted out
//! of the rule string before the string is split into clauses. Two spellings
//! are accepted:
//!
//! - `pattern=/<expr>/<flags>` (or `regex=/<expr>/<flags>`), optionally
//!   followed by `:alt=<text>`
//! - the deprecated `regex:<text>:=<expr>:regex`

use super::{ALT_MARKER, LITERAL_SENTINEL, PARAM_SEPARATOR, RULE_SEPARATOR};
use crate::error::ConfigurationError;

const MODERN_PREFIXES: [&str; 2] = ["pattern=/", "regex=/"];
const DEPRECATED_PREFIX: &str = "regex:";
const DEPRECATED_ASSIGN: &str = ":=";
const DEPRECATED_SUFFIX: &str = ":regex";
const FLAGS: &str = "gimsuy";

/// A literal regex lifted out of a rule string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRegex {
    /// The pattern source, without delimiters.
    pub pattern: String,
    /// Flags that followed the closing delimiter.
    pub flags: String,
    /// Alternate message text attached to the clause.
    pub alt_text: Option<String>,
}

impl LiteralRegex {
    /// Returns `true` if the flag letter was given.
    pub fn has_flag(&self, flag: char) -> bool {
        self.flags.contains(flag)
    }
}

/// Removes the literal regex clause from `rules`, replacing it with a bare
/// sentinel token.
pub(crate) fn extract(rules: &str) -> Result<(String, Option<LiteralRegex>), ConfigurationError> {
    let found = match find_modern(rules) {
        Some((start, prefix)) => Some(extract_modern(rules, start, prefix)?),
        None => match find_clause_start(rules, DEPRECATED_PREFIX, 0) {
            Some(start) => Some(extract_deprecated(rules, start)?),
            None => None,
        },
    };

    let Some((start, end, literal)) = found else {
        return Ok((rules.to_string(), None));
    };

    let tail = &rules[end..];
    if find_modern(tail).is_some() || find_clause_start(tail, DEPRECATED_PREFIX, 0).is_some() {
        return Err(ConfigurationError::malformed_literal(
            "only one literal regex clause is supported per field",
        ));
    }

    let mut remaining = String::with_capacity(rules.len());
    remaining.push_str(&rules[..start]);
    remaining.push_str(LITERAL_SENTINEL);
    remaining.push_str(tail);
    Ok((remaining, Some(literal)))
}

/// Finds `needle` at the start of a clause (string start or right after a
/// rule separator).
fn find_clause_start(rules: &str, needle: &str, from: usize) -> Option<usize> {
    let mut offset = from;
    while let Some(idx) = rules[offset..].find(needle) {
        let at = offset + idx;
        let at_clause_start = rules[..at]
            .trim_end()
            .chars()
            .next_back()
            .is_none_or(|c| c == RULE_SEPARATOR);
        if at_clause_start {
            return Some(at);
        }
        offset = at + needle.len();
    }
    None
}

fn find_modern(rules: &str) -> Option<(usize, &'static str)> {
    MODERN_PREFIXES
        .iter()
        .filter_map(|prefix| find_clause_start(rules, prefix, 0).map(|at| (at, *prefix)))
        .min_by_key(|(at, _)| *at)
}

/// What follows the flags of the closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    End,
    Separator,
    Alt,
}

fn extract_modern(
    rules: &str,
    start: usize,
    prefix: &str,
) -> Result<(usize, usize, LiteralRegex), ConfigurationError> {
    let body_start = start + prefix.len();
    let body = &rules[body_start..];

    let mut chosen: Option<(usize, usize, Terminator)> = None;
    for (idx, c) in body.char_indices() {
        if c != '/' || idx == 0 {
            continue;
        }
        let after = &body[idx + 1..];
        let flags_len = after.chars().take_while(|f| FLAGS.contains(*f)).count();
        let rest = &after[flags_len..];
        let terminator = if rest.is_empty() {
            Terminator::End
        } else if rest.starts_with(RULE_SEPARATOR) {
            Terminator::Separator
        } else if rest.starts_with(PARAM_SEPARATOR) && rest[1..].starts_with(ALT_MARKER) {
            Terminator::Alt
        } else {
            continue;
        };
        chosen = Some((idx, flags_len, terminator));
        break;
    }

    let Some((close, flags_len, terminator)) = chosen else {
        return Err(ConfigurationError::malformed_literal(format!(
            "missing closing '/' in '{}'",
            &rules[start..]
        )));
    };

    let pattern = body[..close].to_string();
    let flags_start = close + 1;
    let flags = body[flags_start..flags_start + flags_len].to_string();
    let mut end = body_start + flags_start + flags_len;

    let alt_text = if terminator == Terminator::Alt {
        let alt_start = end + 1 + ALT_MARKER.len();
        let alt_end = rules[alt_start..]
            .find(RULE_SEPARATOR)
            .map_or(rules.len(), |i| alt_start + i);
        end = alt_end;
        Some(rules[alt_start..alt_end].to_string())
    } else {
        None
    };

    Ok((
        start,
        end,
        LiteralRegex {
            pattern,
            flags,
            alt_text,
        },
    ))
}

fn extract_deprecated(rules: &str, start: usize) -> Result<(usize, usize, LiteralRegex), ConfigurationError> {
    let text_start = start + DEPRECATED_PREFIX.len();
    let assign = rules[text_start..]
        .find(DEPRECATED_ASSIGN)
        .map(|i| text_start + i)
        .ok_or_else(|| ConfigurationError::malformed_literal("deprecated regex clause is missing ':='"))?;
    let pattern_start = assign + DEPRECATED_ASSIGN.len();

    let mut search = pattern_start;
    let close = loop {
        let Some(i) = rules[search..].find(DEPRECATED_SUFFIX) else {
            return Err(ConfigurationError::malformed_literal(
                "deprecated regex clause is missing the closing ':regex'",
            ));
        };
        let at = search + i;
        let after = &rules[at + DEPRECATED_SUFFIX.len()..];
        if after.is_empty() || after.starts_with(RULE_SEPARATOR) {
            break at;
        }
        search = at + DEPRECATED_SUFFIX.len();
    };

    let pattern = &rules[pattern_start..close];
    if pattern.is_empty() {
        return Err(ConfigurationError::malformed_literal("empty regex in deprecated clause"));
    }
    let text = rules[text_start..assign].trim();

    Ok((
        start,
        close + DEPRECATED_SUFFIX.len(),
        LiteralRegex {
            pattern: pattern.to_string(),
            flags: String::new(),
            alt_text: (!text.is_empty()).then(|| text.to_string()),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_literal() {
        let (rest, literal) = extract("required|min_len:2").unwrap();
        assert_eq!(rest, "required|min_len:2");
        assert!(literal.is_none());
    }

    #[test]
    fn test_literal_containing_separator() {
        let (rest, literal) = extract("required|pattern=/^(a|b)+$/i|max_len:5").unwrap();
        assert_eq!(rest, "required|pattern|max_len:5");
        let literal = literal.unwrap();
        assert_eq!(literal.pattern, "^(a|b)+$");
        assert_eq!(literal.flags, "i");
        assert!(literal.alt_text.is_none());
    }

    #[test]
    fn test_literal_with_alt_text() {
        let (rest, literal) = extract("pattern=/^\\d{3}-\\d{4}$/:alt=Use 555-1234|required").unwrap();
        assert_eq!(rest, "pattern|required");
        let literal = literal.unwrap();
        assert_eq!(literal.pattern, "^\\d{3}-\\d{4}$");
        assert_eq!(literal.alt_text.as_deref(), Some("Use 555-1234"));
    }

    #[test]
    fn test_literal_containing_slash() {
        let (rest, literal) = extract("pattern=/^\\d+/\\d+$/").unwrap();
        assert_eq!(rest, "pattern");
        assert_eq!(literal.unwrap().pattern, "^\\d+/\\d+$");
    }

    #[test]
    fn test_deprecated_form() {
        let (rest, literal) = extract("required|regex:Only letters:=^[a-z]+$:regex").unwrap();
        assert_eq!(rest, "required|pattern");
        let literal = literal.unwrap();
        assert_eq!(literal.pattern, "^[a-z]+$");
        assert_eq!(literal.alt_text.as_deref(), Some("Only letters"));
    }

    #[test]
    fn test_unterminated_literal() {
        let err = extract("pattern=/abc").unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedLiteralRegex { .. }));
    }

    #[test]
    fn test_two_literals_rejected() {
        let err = extract("pattern=/a/|pattern=/b/").unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedLiteralRegex { .. }));
    }

    #[test]
    fn test_prefix_inside_clause_is_ignored() {
        let (rest, literal) = extract("in:xpattern=/,y").unwrap();
        assert_eq!(rest, "in:xpattern=/,y");
        assert!(literal.is_none());
    }
}
