//! Evaluation results

use crate::validator::{MatchTarget, ValidatorKind};

/// A custom or remote validator that still has to run.
#[derive(Debug, Clone)]
pub struct PendingCheck {
    /// Position of the validator in the chain.
    pub index: usize,
    pub kind: ValidatorKind,
    /// Registered callback name.
    pub callback: String,
    pub message_key: String,
    pub params: Vec<String>,
    pub alt_text: Option<String>,
}

/// Result of running a chain's synchronous validators.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Validity as far as the synchronous validators can tell. A chain with
    /// outstanding checks is provisionally invalid.
    pub valid: bool,
    /// Composed messages of the failed synchronous validators.
    pub message: String,
    /// Individual messages, in chain order.
    pub messages: Vec<String>,
    /// Number of validators that passed.
    pub passes: usize,
    /// Passes needed for the chain to be valid.
    pub target: usize,
    /// Checks to hand to the async coordinator.
    pub pending: Vec<PendingCheck>,
    /// Fields read by matching validators.
    pub dependencies: Vec<MatchTarget>,
    /// The empty-value short circuit applied; no validator ran.
    pub skipped: bool,
}

impl Evaluation {
    /// A valid result where no validator ran.
    pub(crate) fn skipped() -> Self {
        Self {
            valid: true,
            skipped: true,
            ..Self::default()
        }
    }

    /// Returns `true` if custom or remote checks are outstanding.
    pub fn is_awaiting(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Combined result of the custom and remote checks of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsyncVerdict {
    /// Number of checks that passed.
    pub passes: usize,
    /// Messages of the failed checks, in chain order.
    pub messages: Vec<String>,
}

/// Final validity and message of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub valid: bool,
    pub message: String,
}
