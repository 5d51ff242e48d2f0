//! The validation context.
//!
//! [`ValidationContext`] owns every registry the engine needs: field states,
//! values, forms, the summary and cross-field dependencies. Nothing is
//! global; two contexts never see each other's fields.
//!
//! The context is a cheap handle. Debounce timers and async validations
//! hold clones of it and call back into it when they fire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, error};

use crate::catalog::{self, CompiledRules};
use crate::config::{EngineConfig, FieldOptions};
use crate::custom::CustomValidatorRegistry;
use crate::dependency::CrossFieldRegistry;
use crate::engine::{AsyncVerdict, Evaluation, ValidationEngine};
use crate::error::ConfigurationError;
use crate::runtime::{AsyncValidationCoordinator, DebounceScheduler, lock};
use crate::state::{FieldStatus, FieldValidationState};
use crate::summary::{FormRegistry, ValidationSummary, ValidationSummaryEntry};
use crate::translate::{MessageTable, Translator};
use crate::value::ValueStore;

// =============================================================================
// Inputs and outputs
// =============================================================================

/// A field to register.
///
/// # Example
///
/// ```
/// use fieldcheck_lib::config::FieldOptions;
/// use fieldcheck_lib::context::FieldRegistration;
///
/// let field = FieldRegistration::new("email", "required|email")
///     .with_form("signup")
///     .with_options(FieldOptions::new().with_friendly_name("E-mail"))
///     .with_value("jane@example.com");
/// assert_eq!(field.form.as_deref(), Some("signup"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldRegistration {
    pub name: String,
    pub form: Option<String>,
    pub rules: String,
    pub options: FieldOptions,
    /// Pre-filled value, validated right away.
    pub value: Option<String>,
}

impl FieldRegistration {
    /// Creates a registration for `name` with the rule string `rules`.
    pub fn new(name: impl Into<String>, rules: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: rules.into(),
            ..Self::default()
        }
    }

    /// Sets the enclosing form.
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    /// Sets the field options.
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the pre-filled value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Snapshot of one field, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReport {
    pub name: String,
    pub form: Option<String>,
    pub status: FieldStatus,
    pub is_valid: bool,
    pub message: String,
    /// Whether the message should be displayed yet.
    pub touched: bool,
    pub disabled: bool,
    pub friendly_name: String,
    pub error_target: Option<String>,
    pub value: Option<String>,
}

/// What [`ValidationContext::reset_form`] does besides clearing errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetOptions {
    /// Clear the value of every field of the form.
    pub empty_values: bool,
    /// Unregister every field of the form.
    pub remove_validators: bool,
}

impl ResetOptions {
    /// Also clears values.
    pub fn with_empty_values(mut self) -> Self {
        self.empty_values = true;
        self
    }

    /// Also unregisters the fields.
    pub fn with_remove_validators(mut self) -> Self {
        self.remove_validators = true;
        self
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ValidationContext`].
#[derive(Default)]
pub struct ContextBuilder {
    config: EngineConfig,
    translator: Option<Arc<dyn Translator>>,
    custom: CustomValidatorRegistry,
}

impl ContextBuilder {
    /// Sets the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `translator` for every message.
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Uses a message table for every message.
    pub fn with_messages(self, messages: MessageTable) -> Self {
        self.with_translator(Arc::new(messages))
    }

    /// Shares an existing callback registry.
    pub fn with_custom_validators(mut self, registry: CustomValidatorRegistry) -> Self {
        self.custom = registry;
        self
    }

    /// Builds the context. Without a translator the English table is used.
    pub fn build(self) -> ValidationContext {
        let translator = self
            .translator
            .unwrap_or_else(|| Arc::new(MessageTable::english()));
        let engine = ValidationEngine::new(translator, &self.config);
        ValidationContext {
            inner: Arc::new(ContextInner {
                config: self.config,
                engine,
                custom: self.custom,
                scheduler: DebounceScheduler::new(),
                coordinator: AsyncValidationCoordinator::new(),
                state: Mutex::new(ContextState::default()),
                errors: Mutex::new(Vec::new()),
            }),
        }
    }
}

// =============================================================================
// Context
// =============================================================================

/// Owner of all validation state.
///
/// # Example
///
/// ```
/// use fieldcheck_lib::context::{FieldRegistration, ValidationContext};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), fieldcheck_lib::error::ConfigurationError> {
/// let ctx = ValidationContext::new();
/// ctx.register_field(FieldRegistration::new("name", "required|alpha").with_form("signup"))
///     .await?;
///
/// assert!(!ctx.check_form_validity("signup").await?);
/// ctx.set_value("name", "").await?;
/// let report = ctx.validate_field("name").await?;
/// assert_eq!(report.message, "Field is required. May only contain letters.");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ValidationContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: EngineConfig,
    engine: ValidationEngine,
    custom: CustomValidatorRegistry,
    scheduler: DebounceScheduler,
    coordinator: AsyncValidationCoordinator,
    /// Never held across an await. When the coordinator's generation lock is
    /// needed too, it is taken first.
    state: Mutex<ContextState>,
    errors: Mutex<Vec<ConfigurationError>>,
}

#[derive(Default)]
struct ContextState {
    fields: HashMap<String, FieldValidationState>,
    values: ValueStore,
    forms: FormRegistry,
    summary: ValidationSummary,
    dependencies: CrossFieldRegistry,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationContext {
    /// Creates a context with default configuration and English messages.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a context.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Returns the engine.
    pub fn engine(&self) -> &ValidationEngine {
        &self.inner.engine
    }

    /// Returns the callback registry used by custom and remote rules.
    pub fn custom_validators(&self) -> &CustomValidatorRegistry {
        &self.inner.custom
    }

    fn state(&self) -> MutexGuard<'_, ContextState> {
        lock(&self.inner.state)
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Registers a field and validates its current value silently.
    ///
    /// The rule string is parsed and resolved first; any problem with it is
    /// returned before anything is registered. Registering a name again
    /// replaces the earlier field.
    pub async fn register_field(&self, registration: FieldRegistration) -> Result<(), ConfigurationError> {
        if registration.name.is_empty() {
            return Err(ConfigurationError::MissingFieldName);
        }
        let compiled = self.compile(&registration.rules)?;

        if self.is_registered(&registration.name) {
            self.unregister_field(&registration.name);
        }

        let name = registration.name.clone();
        let mut state = FieldValidationState::new(
            &registration.name,
            &registration.rules,
            compiled,
            &registration.options,
            &self.inner.config,
        );
        state.form = registration.form.clone();
        if state.validators().is_empty() {
            state.status = FieldStatus::Cancelled;
        }

        {
            let mut st = self.state();
            for target in state.match_targets() {
                st.dependencies
                    .register_dependency(&name, &target.field, target.operator);
            }
            if let Some(form) = &registration.form {
                st.forms.insert(form, &name);
            }
            if let Some(value) = registration.value {
                st.values.set(&name, value);
            }
            st.fields.insert(name.clone(), state);
        }
        debug!("Registered field {name} with rules '{}'", registration.rules);

        self.run_evaluation(&name).await
    }

    /// Replaces the rule string of a field and re-validates it.
    ///
    /// An empty rule string cancels validation of the field.
    pub async fn set_rules(&self, field: &str, rules: &str) -> Result<(), ConfigurationError> {
        let compiled = self.compile(rules)?;
        if !self.is_registered(field) {
            return Err(ConfigurationError::unknown_field(field));
        }

        let cleared = compiled.validators.is_empty();
        if cleared {
            self.inner.scheduler.cancel(field);
            self.inner.coordinator.invalidate(field);
        }

        {
            let mut st = self.state();
            let ContextState {
                fields,
                summary,
                dependencies,
                ..
            } = &mut *st;
            let state = fields
                .get_mut(field)
                .ok_or_else(|| ConfigurationError::unknown_field(field))?;
            state.replace_rules(rules, compiled);

            dependencies.remove_dependent(field);
            for target in state.match_targets() {
                dependencies.register_dependency(field, &target.field, target.operator);
            }

            if cleared {
                state.status = FieldStatus::Cancelled;
                state.pending_generation = None;
                state.mark_valid();
                summary.remove(field);
            } else if state.status == FieldStatus::Cancelled && !state.disabled {
                state.status = resumed_status(state);
            }
        }

        if cleared {
            debug!("Cleared rules of {field}");
            return Ok(());
        }
        self.run_evaluation(field).await
    }

    /// Unregisters a field, cancelling everything pending for it.
    ///
    /// Returns `false` if the field was not registered.
    pub fn unregister_field(&self, field: &str) -> bool {
        self.inner.scheduler.cancel(field);
        self.inner.coordinator.forget(field);

        let mut st = self.state();
        if st.fields.remove(field).is_none() {
            return false;
        }
        st.summary.remove(field);
        st.forms.remove_field(field);
        st.dependencies.remove_dependent(field);
        st.values.clear(field);
        debug!("Unregistered field {field}");
        true
    }

    /// Returns `true` if `field` is registered.
    pub fn is_registered(&self, field: &str) -> bool {
        self.state().fields.contains_key(field)
    }

    /// Names of the fields of `form`, in registration order.
    pub fn fields_of(&self, form: &str) -> Vec<String> {
        self.state().forms.fields(form).to_vec()
    }

    /// Names of every form.
    pub fn forms(&self) -> Vec<String> {
        self.state().forms.forms().map(str::to_string).collect()
    }

    fn compile(&self, rules: &str) -> Result<CompiledRules, ConfigurationError> {
        let compiled = catalog::compile(rules)?;
        for (spec, callback) in compiled.callbacks() {
            if !self.inner.custom.contains(callback) {
                return Err(ConfigurationError::MissingCallback {
                    rule: spec.rule_name().to_string(),
                    callback: callback.to_string(),
                });
            }
        }
        Ok(compiled)
    }

    // -------------------------------------------------------------------------
    // Values
    // -------------------------------------------------------------------------

    /// Records a new value for `field`.
    ///
    /// The field is evaluated after its debounce delay; fields that compare
    /// against it are re-evaluated at once.
    pub async fn set_value(&self, field: &str, value: impl Into<String>) -> Result<(), ConfigurationError> {
        self.change_value(field, Some(value.into())).await
    }

    /// Removes the value of `field`, as if it had never been set.
    pub async fn clear_value(&self, field: &str) -> Result<(), ConfigurationError> {
        self.change_value(field, None).await
    }

    /// Returns the current value of `field`.
    pub fn value(&self, field: &str) -> Option<String> {
        self.state().values.get(field).map(str::to_string)
    }

    async fn change_value(&self, field: &str, value: Option<String>) -> Result<(), ConfigurationError> {
        let (delay, active, dependents) = {
            let mut st = self.state();
            let state = st
                .fields
                .get_mut(field)
                .ok_or_else(|| ConfigurationError::unknown_field(field))?;
            state.touched = true;
            let active = state.status != FieldStatus::Cancelled;
            if active {
                state.status = FieldStatus::Pending;
            }
            let delay = state.debounce();
            match value {
                Some(value) => st.values.set(field, value),
                None => st.values.clear(field),
            };
            (delay, active, st.dependencies.dependents_of(field))
        };

        if active {
            self.schedule(field, delay).await;
        }
        for dependent in dependents {
            self.schedule(&dependent, Duration::ZERO).await;
        }
        Ok(())
    }

    async fn schedule(&self, field: &str, delay: Duration) {
        let ctx = self.clone();
        let name = field.to_string();
        self.inner
            .scheduler
            .schedule(field, delay, async move { ctx.run_in_background(&name).await })
            .await;
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    async fn run_in_background(&self, field: &str) {
        if let Err(err) = self.run_evaluation(field).await {
            self.push_error(err);
        }
    }

    fn push_error(&self, err: ConfigurationError) {
        error!("{err}");
        lock(&self.inner.errors).push(err);
    }

    /// Drains the configuration errors raised by background evaluations.
    pub fn take_errors(&self) -> Vec<ConfigurationError> {
        std::mem::take(&mut *lock(&self.inner.errors))
    }

    async fn run_evaluation(&self, field: &str) -> Result<(), ConfigurationError> {
        let generation = self.inner.coordinator.begin(field);
        let snapshot = {
            let st = self.state();
            st.fields.get(field).map(|state| {
                let value = st.values.get(field).map(str::to_string);
                let sources = st.values.subset(state.match_targets().map(|t| t.field.as_str()));
                (state.clone(), value, sources)
            })
        };
        let Some((state, value, sources)) = snapshot else {
            self.inner.coordinator.forget(field);
            return Ok(());
        };

        let eval = match self.inner.engine.evaluate(&state, value.as_deref(), &sources).await {
            Ok(eval) => eval,
            Err(err) => {
                let failed = self.inner.coordinator.apply_if_current(field, generation, || {
                    self.apply_failure(field, value.as_deref())
                });
                if let Some(Err(summary_err)) = failed {
                    self.push_error(summary_err);
                }
                return Err(err);
            }
        };

        let applied = self.inner.coordinator.apply_if_current(field, generation, || {
            self.apply_evaluation(field, value.as_deref(), &eval, generation)
        });
        match applied {
            None | Some(Ok(false)) => return Ok(()),
            Some(Err(err)) => return Err(err),
            Some(Ok(true)) => {}
        }

        if eval.is_awaiting() {
            let future = self.inner.engine.resolve_pending(
                field,
                eval.pending.clone(),
                value.as_deref(),
                &self.inner.custom,
            );
            let ctx = self.clone();
            let name = field.to_string();
            self.inner.coordinator.spawn(field, generation, future, move |result| {
                ctx.apply_verdict(&name, &eval, result)
            });
        }
        Ok(())
    }

    /// Stores an evaluation. Returns `true` if async checks should follow.
    fn apply_evaluation(
        &self,
        field: &str,
        value: Option<&str>,
        eval: &Evaluation,
        generation: u64,
    ) -> Result<bool, ConfigurationError> {
        let mut st = self.state();
        let ContextState {
            fields,
            summary,
            dependencies,
            ..
        } = &mut *st;
        let Some(state) = fields.get_mut(field) else {
            return Ok(false);
        };
        state.last_value = value.map(str::to_string);
        for target in &eval.dependencies {
            dependencies.register_dependency(field, &target.field, target.operator);
        }

        if state.disabled || state.validators().is_empty() {
            state.pending_generation = None;
            state.mark_valid();
            summary.remove(field);
            return Ok(false);
        }

        if eval.is_awaiting() {
            state.is_valid = false;
            state.message = eval.message.clone();
            state.pending_generation = Some(generation);
            state.show(FieldStatus::AwaitingRemote);
        } else {
            state.pending_generation = None;
            state.record(eval.valid, eval.message.clone());
        }
        sync_summary(summary, state)?;
        Ok(eval.is_awaiting())
    }

    /// Marks a field whose evaluation could not complete as invalid.
    fn apply_failure(&self, field: &str, value: Option<&str>) -> Result<(), ConfigurationError> {
        let mut st = self.state();
        let ContextState { fields, summary, .. } = &mut *st;
        let Some(state) = fields.get_mut(field) else {
            return Ok(());
        };
        state.last_value = value.map(str::to_string);
        state.pending_generation = None;
        state.record(false, String::new());
        sync_summary(summary, state)
    }

    fn apply_verdict(&self, field: &str, eval: &Evaluation, result: Result<AsyncVerdict, ConfigurationError>) {
        let (valid, message, failure) = match result {
            Ok(verdict) => {
                let settled = self.inner.engine.settle(eval, &verdict);
                (settled.valid, settled.message, None)
            }
            Err(err) => (false, eval.message.clone(), Some(err)),
        };

        let synced = {
            let mut st = self.state();
            let ContextState { fields, summary, .. } = &mut *st;
            match fields.get_mut(field) {
                Some(state) => {
                    state.pending_generation = None;
                    state.record(valid, message);
                    debug!("Applied async result for {field}: valid={valid}");
                    sync_summary(summary, state)
                }
                None => Ok(()),
            }
        };

        if let Some(err) = failure {
            self.push_error(err);
        }
        if let Err(err) = synced {
            self.push_error(err);
        }
    }

    /// Evaluates `field` now, cancelling its pending debounce, and marks it
    /// touched.
    pub async fn validate_field(&self, field: &str) -> Result<FieldReport, ConfigurationError> {
        {
            let mut st = self.state();
            let state = st
                .fields
                .get_mut(field)
                .ok_or_else(|| ConfigurationError::unknown_field(field))?;
            state.touched = true;
        }
        self.inner.scheduler.cancel(field);
        self.run_evaluation(field).await?;
        self.field_report(field)
            .ok_or_else(|| ConfigurationError::unknown_field(field))
    }

    /// Disables or re-enables validation of `field`.
    ///
    /// A disabled field is valid and has no summary entry. Re-enabling it
    /// evaluates it at once.
    pub async fn set_disabled(&self, field: &str, disabled: bool) -> Result<(), ConfigurationError> {
        if !self.is_registered(field) {
            return Err(ConfigurationError::unknown_field(field));
        }
        if disabled {
            self.inner.scheduler.cancel(field);
            self.inner.coordinator.invalidate(field);
        }

        {
            let mut st = self.state();
            let ContextState { fields, summary, .. } = &mut *st;
            let state = fields
                .get_mut(field)
                .ok_or_else(|| ConfigurationError::unknown_field(field))?;
            state.disabled = disabled;
            if disabled {
                state.status = FieldStatus::Cancelled;
                state.pending_generation = None;
                state.mark_valid();
                summary.remove(field);
            } else if !state.validators().is_empty() {
                state.status = resumed_status(state);
            }
        }

        if disabled {
            debug!("Disabled field {field}");
            return Ok(());
        }
        self.run_evaluation(field).await
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Snapshot of one field.
    pub fn field_report(&self, field: &str) -> Option<FieldReport> {
        let st = self.state();
        let state = st.fields.get(field)?;
        Some(FieldReport {
            name: state.name().to_string(),
            form: state.form.clone(),
            status: state.status(),
            is_valid: state.is_valid(),
            message: state.message().to_string(),
            touched: state.touched,
            disabled: state.disabled,
            friendly_name: state.display_name().to_string(),
            error_target: state.error_target.clone(),
            value: st.values.get(field).map(str::to_string),
        })
    }

    /// Every summary entry, in first-failure order.
    pub fn summary(&self) -> Vec<ValidationSummaryEntry> {
        self.state().summary.entries().to_vec()
    }

    /// Summary entries of `form`.
    pub fn summary_by_form(&self, form: &str) -> Vec<ValidationSummaryEntry> {
        self.state().summary.by_form(form).into_iter().cloned().collect()
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    /// Returns `true` if every field of `form` is valid.
    ///
    /// Pending debounced evaluations of the form run first. Invalid fields
    /// are marked touched so their messages display.
    pub async fn check_form_validity(&self, form: &str) -> Result<bool, ConfigurationError> {
        let fields = self.fields_of(form);
        for field in &fields {
            if self.inner.scheduler.cancel(field) {
                self.run_evaluation(field).await?;
            }
        }

        let mut st = self.state();
        let mut valid = true;
        for field in &fields {
            let Some(state) = st.fields.get_mut(field) else {
                continue;
            };
            if state.is_valid() {
                continue;
            }
            valid = false;
            state.touched = true;
            let status = if state.pending_generation.is_some() {
                FieldStatus::AwaitingRemote
            } else {
                FieldStatus::Invalid
            };
            state.show(status);
        }
        debug!("Form {form} valid: {valid}");
        Ok(valid)
    }

    /// Clears the errors of `form` and returns its fields to untouched.
    ///
    /// Kept fields are validated again silently, so the summary reflects
    /// their values afterwards.
    pub async fn reset_form(&self, form: &str, options: ResetOptions) -> Result<(), ConfigurationError> {
        let fields = self.fields_of(form);
        if options.remove_validators {
            for field in &fields {
                self.unregister_field(field);
            }
            self.state().summary.clear_form(form);
            debug!("Removed {} field(s) of form {form}", fields.len());
            return Ok(());
        }

        for field in &fields {
            self.inner.scheduler.cancel(field);
            self.inner.coordinator.invalidate(field);
        }
        {
            let mut st = self.state();
            st.summary.clear_form(form);
            for field in &fields {
                if options.empty_values {
                    st.values.clear(field);
                }
                let touched = self.inner.config.pre_validate_form_elements;
                if let Some(state) = st.fields.get_mut(field) {
                    state.touched = touched;
                    state.pending_generation = None;
                    state.mark_valid();
                    if state.status != FieldStatus::Cancelled {
                        state.status = FieldStatus::Untouched;
                    }
                }
            }
        }
        debug!("Reset form {form}");

        for field in &fields {
            self.run_evaluation(field).await?;
        }
        Ok(())
    }
}

/// Status of a field whose validation resumes after a cancellation.
fn resumed_status(state: &FieldValidationState) -> FieldStatus {
    if state.touched {
        FieldStatus::Pending
    } else {
        FieldStatus::Untouched
    }
}

/// Keeps the summary entry of `state` in line with its validity.
fn sync_summary(summary: &mut ValidationSummary, state: &FieldValidationState) -> Result<(), ConfigurationError> {
    if state.is_valid() {
        summary.remove(state.name());
        return Ok(());
    }
    let mut entry = ValidationSummaryEntry::new(state.name(), state.message())
        .with_friendly_name(state.display_name());
    entry.form_name = state.form.clone();
    summary.add(entry)
}
