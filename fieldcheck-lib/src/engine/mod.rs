//! Validation engine.
//!
//! Evaluates a field's validator chain against a value. The engine is pure:
//! it reads the field state and the values of referenced fields and returns
//! an [`Evaluation`]. Applying the result to the summary is the caller's job.

mod message;
mod outcome;

pub use outcome::{AsyncVerdict, Evaluation, PendingCheck, Settled};

use std::sync::Arc;

use futures::future::join_all;
use log::debug;

use crate::config::EngineConfig;
use crate::custom::{BoxFuture, CallbackRequest, CustomValidatorRegistry};
use crate::error::ConfigurationError;
use crate::state::FieldValidationState;
use crate::translate::{MessageTable, Translator};
use crate::validator::{ValidatorKind, ValidatorSpec};
use crate::value::FieldValueSource;

/// Evaluates validator chains and composes their messages.
#[derive(Clone)]
pub struct ValidationEngine {
    translator: Arc<dyn Translator>,
    separator: String,
    only_last: bool,
}

impl ValidationEngine {
    /// Creates an engine using `translator` for messages.
    pub fn new(translator: Arc<dyn Translator>, config: &EngineConfig) -> Self {
        Self {
            translator,
            separator: config.message_separator.clone(),
            only_last: config.display_only_last_error_msg,
        }
    }

    /// Creates an engine with the English messages and default settings.
    pub fn english() -> Self {
        Self::new(Arc::new(MessageTable::english()), &EngineConfig::default())
    }

    /// Returns the translator.
    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Runs the synchronous validators of `state` against `value`.
    ///
    /// Custom and remote validators are not run; they come back as
    /// [`PendingCheck`]s for [`resolve_pending`](Self::resolve_pending).
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use fieldcheck_lib::engine::ValidationEngine;
    /// use fieldcheck_lib::state::FieldValidationState;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let engine = ValidationEngine::english();
    /// let state = FieldValidationState::from_rules("code", "betweenLen:1,5").unwrap();
    /// let values: HashMap<String, String> = HashMap::new();
    ///
    /// let ok = engine.evaluate(&state, Some("12345"), &values).await.unwrap();
    /// assert!(ok.valid);
    /// let too_long = engine.evaluate(&state, Some("123456"), &values).await.unwrap();
    /// assert!(!too_long.valid);
    /// assert!(too_long.message.contains('1') && too_long.message.contains('5'));
    /// # }
    /// ```
    pub async fn evaluate(
        &self,
        state: &FieldValidationState,
        value: Option<&str>,
        values: &dyn FieldValueSource,
    ) -> Result<Evaluation, ConfigurationError> {
        let text = value.unwrap_or_default();
        if state.is_disabled() {
            return Ok(Evaluation::skipped());
        }
        if !state.is_field_required() && !state.validates_on_empty() && text.is_empty() {
            debug!("Skipping empty optional field {}", state.name());
            return Ok(Evaluation::skipped());
        }

        let validators = state.validators();
        let mut eval = Evaluation {
            target: state.require_count().target(validators.len()),
            ..Evaluation::default()
        };

        for (index, spec) in validators.iter().enumerate() {
            let (passed, failed_spec) = match spec.kind() {
                ValidatorKind::Custom | ValidatorKind::Remote => {
                    if let Some(callback) = spec.callback() {
                        eval.pending.push(PendingCheck {
                            index,
                            kind: spec.kind(),
                            callback: callback.to_string(),
                            message_key: spec.message_key().to_string(),
                            params: spec.params().to_vec(),
                            alt_text: spec.alt_text().map(str::to_string),
                        });
                    }
                    continue;
                }
                ValidatorKind::Matching => {
                    let passed = match spec.target() {
                        Some(target) => {
                            eval.dependencies.push(target.clone());
                            let other = values.current(&target.field).unwrap_or_default();
                            target.operator.holds(text, other.as_str())
                        }
                        None => true,
                    };
                    (passed, spec)
                }
                ValidatorKind::AutoDetect => match spec.resolve_auto(text) {
                    Some(concrete) => (check(concrete, value), concrete),
                    None => (true, spec),
                },
                _ => (check(spec, value), spec),
            };

            if passed {
                eval.passes += 1;
                if eval.passes >= eval.target {
                    break;
                }
            } else {
                let message = message::resolve(
                    self.translator.as_ref(),
                    failed_spec.message_key(),
                    failed_spec.params(),
                    spec.alt_text(),
                )
                .await?;
                eval.messages.push(message);
            }
        }

        eval.valid = eval.passes >= eval.target;
        if eval.valid {
            eval.messages.clear();
            eval.pending.clear();
        }
        eval.message = message::compose(&eval.messages, &self.separator, self.only_last);
        debug!(
            "Evaluated {}: {} of {} passed, {} pending",
            state.name(),
            eval.passes,
            eval.target,
            eval.pending.len()
        );
        Ok(eval)
    }

    /// Runs the outstanding custom and remote checks of one evaluation
    /// concurrently.
    ///
    /// A failing check without a message of its own gets the rule's
    /// alternate text or default message. A callback error is fatal.
    pub fn resolve_pending(
        &self,
        field: &str,
        checks: Vec<PendingCheck>,
        value: Option<&str>,
        registry: &CustomValidatorRegistry,
    ) -> BoxFuture<'static, Result<AsyncVerdict, ConfigurationError>> {
        let translator = Arc::clone(&self.translator);
        let registry = registry.clone();
        let field = field.to_string();
        let value = value.unwrap_or_default().to_string();

        Box::pin(async move {
            let runs = checks.iter().map(|check| {
                let request = CallbackRequest {
                    field: field.clone(),
                    value: value.clone(),
                };
                registry.invoke(&check.callback, request)
            });
            let outcomes = join_all(runs).await;

            let mut verdict = AsyncVerdict::default();
            for (check, outcome) in checks.iter().zip(outcomes) {
                let outcome = outcome.map_err(|source| ConfigurationError::CallbackFailed {
                    field: field.clone(),
                    callback: check.callback.clone(),
                    source,
                })?;
                if outcome.valid {
                    verdict.passes += 1;
                    continue;
                }
                let text = match outcome.message {
                    Some(message) if !message.is_empty() => message,
                    _ => {
                        message::resolve(
                            translator.as_ref(),
                            &check.message_key,
                            &check.params,
                            check.alt_text.as_deref(),
                        )
                        .await?
                    }
                };
                verdict.messages.push(text);
            }
            Ok(verdict)
        })
    }

    /// Combines the synchronous result with the async verdict.
    pub fn settle(&self, eval: &Evaluation, verdict: &AsyncVerdict) -> Settled {
        let valid = eval.passes + verdict.passes >= eval.target;
        if valid {
            return Settled {
                valid,
                message: String::new(),
            };
        }
        let messages: Vec<String> = eval.messages.iter().chain(&verdict.messages).cloned().collect();
        Settled {
            valid,
            message: message::compose(&messages, &self.separator, self.only_last),
        }
    }
}

/// Runs a pattern, numeric, or date validator.
fn check(spec: &ValidatorSpec, value: Option<&str>) -> bool {
    let text = value.unwrap_or_default();
    match spec.kind() {
        ValidatorKind::ConditionalNumber => spec.check_number(text),
        ValidatorKind::ConditionalDate => spec.check_date(text),
        _ => spec.check_pattern(value),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::custom::CustomOutcome;
    use crate::state::RequireCount;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    async fn run(rules: &str, value: Option<&str>) -> Evaluation {
        let state = FieldValidationState::from_rules("f", rules).unwrap();
        ValidationEngine::english()
            .evaluate(&state, value, &values(&[]))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_optional_skips() {
        let eval = run("alpha|min_len:3", Some("")).await;
        assert!(eval.valid);
        assert!(eval.skipped);

        let eval = run("alpha|min_len:3", None).await;
        assert!(eval.valid);
    }

    #[tokio::test]
    async fn test_validate_on_empty() {
        let mut state = FieldValidationState::from_rules("f", "min_len:3").unwrap();
        state.validate_on_empty = true;
        let eval = ValidationEngine::english()
            .evaluate(&state, Some(""), &values(&[]))
            .await
            .unwrap();
        assert!(!eval.valid);
        assert_eq!(eval.message, "Must be at least 3 characters.");
    }

    #[tokio::test]
    async fn test_required_missing_and_blank() {
        assert!(!run("required", None).await.valid);
        assert!(!run("required", Some("   ")).await.valid);
        assert!(run("required", Some("x")).await.valid);
    }

    #[tokio::test]
    async fn test_messages_joined_in_order() {
        let eval = run("alpha|min_len:5", Some("ab1")).await;
        assert!(!eval.valid);
        assert_eq!(
            eval.message,
            "May only contain letters. Must be at least 5 characters."
        );
    }

    #[tokio::test]
    async fn test_only_last_message() {
        let engine = ValidationEngine::new(
            Arc::new(MessageTable::english()),
            &EngineConfig::default().with_only_last_message(true),
        );
        let state = FieldValidationState::from_rules("f", "alpha|min_len:5").unwrap();
        let eval = engine.evaluate(&state, Some("ab1"), &values(&[])).await.unwrap();
        assert_eq!(eval.message, "Must be at least 5 characters.");
    }

    #[tokio::test]
    async fn test_require_one() {
        let mut state = FieldValidationState::from_rules("f", "email|int").unwrap();
        state.require_count = RequireCount::One;
        let engine = ValidationEngine::english();
        let eval = engine.evaluate(&state, Some("42"), &values(&[])).await.unwrap();
        assert!(eval.valid);
        assert!(eval.message.is_empty());

        let eval = engine.evaluate(&state, Some("nope"), &values(&[])).await.unwrap();
        assert!(!eval.valid);
        assert_eq!(eval.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_require_at_least_two() {
        let mut state = FieldValidationState::from_rules("f", "email|int|min_len:3").unwrap();
        state.require_count = RequireCount::AtLeast(2);
        let engine = ValidationEngine::english();

        let eval = engine.evaluate(&state, Some("1234"), &values(&[])).await.unwrap();
        assert!(eval.valid);
        assert!(eval.message.is_empty());
        assert!(eval.messages.is_empty());

        let eval = engine.evaluate(&state, Some("12"), &values(&[])).await.unwrap();
        assert!(!eval.valid);
        assert_eq!(eval.passes, 1);
        assert_eq!(
            eval.message,
            "Must be a valid email address. Must be at least 3 characters."
        );
    }

    #[tokio::test]
    async fn test_number_bounds() {
        assert!(run("between_num:1,10", Some("10")).await.valid);
        assert!(!run("between_num:1,10", Some("10.5")).await.valid);
        assert!(!run("min_num:0", Some("abc")).await.valid);
    }

    #[tokio::test]
    async fn test_date_min_compares_instants() {
        assert!(run("dateIsoMin:2012-05-25", Some("2012-05-25")).await.valid);
        assert!(run("dateIsoMin:2012-05-25", Some("2012-5-25")).await.valid);
        assert!(!run("dateIsoMin:2012-05-25", Some("2012-05-24")).await.valid);
    }

    #[tokio::test]
    async fn test_auto_detect() {
        let eval = run("between:2,4", Some("3")).await;
        assert!(eval.valid);
        let eval = run("between:2,4", Some("12")).await;
        assert!(!eval.valid);
        assert_eq!(eval.message, "Needs to be a numeric value, between 2 and 4.");
        let eval = run("between:2,4", Some("abcdef")).await;
        assert_eq!(eval.message, "Text must be between 2 and 4 characters in length.");
    }

    #[tokio::test]
    async fn test_matching_reads_other_field() {
        let state = FieldValidationState::from_rules("b", "match:a,Password").unwrap();
        let engine = ValidationEngine::english();

        let eval = engine.evaluate(&state, Some("x"), &values(&[("a", "x")])).await.unwrap();
        assert!(eval.valid);
        assert_eq!(eval.dependencies[0].field, "a");

        let eval = engine.evaluate(&state, Some("x"), &values(&[("a", "y")])).await.unwrap();
        assert!(!eval.valid);
        assert!(eval.message.contains("Password"));
    }

    #[tokio::test]
    async fn test_alt_text_replaces_message() {
        let eval = run("min_len:3:alt=Too short!", Some("a")).await;
        assert_eq!(eval.message, "Too short!");
    }

    #[tokio::test]
    async fn test_idempotent() {
        let first = run("alpha|between_len:2,3", Some("a1b2")).await;
        let second = run("alpha|between_len:2,3", Some("a1b2")).await;
        assert_eq!(first.valid, second.valid);
        assert_eq!(first.message, second.message);
    }

    #[tokio::test]
    async fn test_disabled_is_valid() {
        let mut state = FieldValidationState::from_rules("f", "required").unwrap();
        state.disabled = true;
        let eval = ValidationEngine::english()
            .evaluate(&state, None, &values(&[]))
            .await
            .unwrap();
        assert!(eval.valid);
    }

    #[tokio::test]
    async fn test_pending_and_settle() {
        let registry = CustomValidatorRegistry::new();
        registry.register_sync("never", |_| Ok(CustomOutcome::from(false)));
        registry.register_sync("taken", |_| Ok(CustomOutcome::invalid("Already taken")));

        let engine = ValidationEngine::english();
        let state = FieldValidationState::from_rules("user", "required|custom:never|remote:taken").unwrap();
        let eval = engine.evaluate(&state, Some("bob"), &values(&[])).await.unwrap();
        assert!(!eval.valid);
        assert!(eval.is_awaiting());
        assert!(eval.message.is_empty());

        let verdict = engine
            .resolve_pending("user", eval.pending.clone(), Some("bob"), &registry)
            .await
            .unwrap();
        assert_eq!(verdict.passes, 0);
        let settled = engine.settle(&eval, &verdict);
        assert!(!settled.valid);
        assert_eq!(settled.message, "Failed custom validation. Already taken");
    }

    #[tokio::test]
    async fn test_callback_failure_is_fatal() {
        let registry = CustomValidatorRegistry::new();
        let engine = ValidationEngine::english();
        let state = FieldValidationState::from_rules("user", "custom:gone").unwrap();
        let eval = engine.evaluate(&state, Some("bob"), &values(&[])).await.unwrap();
        let err = engine
            .resolve_pending("user", eval.pending, Some("bob"), &registry)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::CallbackFailed { callback, .. } if callback == "gone"));
    }
}
