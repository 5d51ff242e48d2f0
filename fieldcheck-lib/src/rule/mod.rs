//! Rule-string parsing.
//!
//! A rule string is a pipe-delimited chain of clauses such as
//! `alpha|min_len:2|required`. Parsing only splits the chain into raw
//! clauses; turning a clause into an executable validator is the job of the
//! [`catalog`](crate::catalog).

mod literal;
mod parser;

pub use literal::LiteralRegex;
pub use parser::{ParsedRules, RawRule, parse};

/// Separator between clauses of a rule chain.
pub const RULE_SEPARATOR: char = '|';

/// Separator between a rule name and its parameters.
pub const PARAM_SEPARATOR: char = ':';

/// Separator between individual parameters.
pub const LIST_SEPARATOR: char = ',';

/// Marker introducing alternate message text.
pub const ALT_MARKER: &str = "alt=";

/// Reserved keyword that makes a field required.
pub const REQUIRED: &str = "required";

/// Token left in place of an extracted literal regex clause.
pub(crate) const LITERAL_SENTINEL: &str = "pattern";
