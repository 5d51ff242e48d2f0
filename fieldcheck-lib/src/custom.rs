//! Custom and remote validator callbacks.
//!
//! Rules such as `custom:checkUser` or `remote:isAvailable` name a callback
//! that must be registered on the [`CustomValidatorRegistry`] before the
//! field using it registers. Callbacks are typed handles; rule strings never
//! carry code.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::error::CallbackError;

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a callback is asked to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRequest {
    /// Field being validated.
    pub field: String,
    /// Current value, empty when the field has none.
    pub value: String,
}

/// Result of a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomOutcome {
    pub valid: bool,
    /// Message to show when invalid; the rule's alternate text or default
    /// message is used when absent.
    pub message: Option<String>,
}

impl CustomOutcome {
    /// A passing outcome.
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    /// A failing outcome with its own message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    /// Interprets a loosely typed result: a boolean, or an object with a
    /// boolean `valid` (or `isValid`) and an optional string `message`.
    ///
    /// # Example
    ///
    /// ```
    /// use fieldcheck_lib::custom::CustomOutcome;
    /// use serde_json::json;
    ///
    /// let outcome = CustomOutcome::from_json(&json!({"isValid": false, "message": "Taken"})).unwrap();
    /// assert_eq!(outcome, CustomOutcome::invalid("Taken"));
    /// assert!(CustomOutcome::from_json(&json!("yes")).is_err());
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, CallbackError> {
        match value {
            Value::Bool(valid) => Ok((*valid).into()),
            Value::Object(map) => {
                let valid = map
                    .get("valid")
                    .or_else(|| map.get("isValid"))
                    .and_then(Value::as_bool)
                    .ok_or_else(|| CallbackError::UnsupportedResult(value.to_string()))?;
                let message = match map.get("message") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(message)) => Some(message.clone()),
                    Some(_) => return Err(CallbackError::UnsupportedResult(value.to_string())),
                };
                Ok(Self { valid, message })
            }
            other => Err(CallbackError::UnsupportedResult(other.to_string())),
        }
    }
}

impl From<bool> for CustomOutcome {
    fn from(valid: bool) -> Self {
        Self { valid, message: None }
    }
}

type SyncCallback = Arc<dyn Fn(&CallbackRequest) -> Result<CustomOutcome, CallbackError> + Send + Sync>;
type AsyncCallback =
    Arc<dyn Fn(CallbackRequest) -> BoxFuture<'static, Result<CustomOutcome, CallbackError>> + Send + Sync>;
type JsonCallback = Arc<dyn Fn(&CallbackRequest) -> Result<Value, CallbackError> + Send + Sync>;

/// A registered callback handle.
#[derive(Clone)]
pub enum CustomValidator {
    /// Returns its outcome directly.
    Sync(SyncCallback),
    /// Returns a future of its outcome.
    Async(AsyncCallback),
    /// Returns a loosely typed JSON result, checked on use.
    Json(JsonCallback),
}

impl CustomValidator {
    /// Runs the callback.
    pub async fn call(&self, request: CallbackRequest) -> Result<CustomOutcome, CallbackError> {
        match self {
            Self::Sync(callback) => callback(&request),
            Self::Async(callback) => callback(request).await,
            Self::Json(callback) => CustomOutcome::from_json(&callback(&request)?),
        }
    }
}

impl fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Sync(_) => "Sync",
            Self::Async(_) => "Async",
            Self::Json(_) => "Json",
        };
        f.debug_tuple("CustomValidator").field(&kind).finish()
    }
}

/// Name-to-callback registry shared by every field of a context.
///
/// Cheap to clone; clones share the same callbacks.
///
/// # Example
///
/// ```
/// use fieldcheck_lib::custom::{CustomOutcome, CustomValidatorRegistry};
///
/// let registry = CustomValidatorRegistry::new();
/// registry.register_sync("notAdmin", |req| Ok((req.value != "admin").into()));
/// registry.register_async("available", |req| async move {
///     Ok(CustomOutcome::from(req.value.len() > 3))
/// });
/// assert!(registry.contains("notAdmin"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CustomValidatorRegistry {
    callbacks: Arc<DashMap<String, CustomValidator>>,
}

impl CustomValidatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback handle, replacing any previous one.
    pub fn register(&self, name: impl Into<String>, validator: CustomValidator) {
        self.callbacks.insert(name.into(), validator);
    }

    /// Registers a synchronous callback.
    pub fn register_sync<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(&CallbackRequest) -> Result<CustomOutcome, CallbackError> + Send + Sync + 'static,
    {
        self.register(name, CustomValidator::Sync(Arc::new(callback)));
    }

    /// Registers an asynchronous callback.
    pub fn register_async<F, Fut>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(CallbackRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CustomOutcome, CallbackError>> + Send + 'static,
    {
        self.register(
            name,
            CustomValidator::Async(Arc::new(move |request| Box::pin(callback(request)))),
        );
    }

    /// Registers a callback returning loosely typed JSON.
    pub fn register_json<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(&CallbackRequest) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.register(name, CustomValidator::Json(Arc::new(callback)));
    }

    /// Removes a callback.
    pub fn unregister(&self, name: &str) -> bool {
        self.callbacks.remove(name).is_some()
    }

    /// Returns `true` if a callback is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Returns the callback registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<CustomValidator> {
        self.callbacks.get(name).map(|entry| entry.value().clone())
    }

    /// Looks up and runs a callback.
    pub async fn invoke(&self, name: &str, request: CallbackRequest) -> Result<CustomOutcome, CallbackError> {
        let validator = self
            .lookup(name)
            .ok_or_else(|| CallbackError::NotRegistered(name.to_string()))?;
        validator.call(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: &str) -> CallbackRequest {
        CallbackRequest {
            field: "f".to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_from_json_shapes() {
        assert_eq!(CustomOutcome::from_json(&json!(true)).unwrap(), CustomOutcome::valid());
        assert_eq!(
            CustomOutcome::from_json(&json!({"valid": false})).unwrap(),
            CustomOutcome::from(false)
        );
        assert!(matches!(
            CustomOutcome::from_json(&json!({"message": "x"})),
            Err(CallbackError::UnsupportedResult(_))
        ));
        assert!(CustomOutcome::from_json(&json!(1)).is_err());
        assert!(CustomOutcome::from_json(&json!({"valid": true, "message": 3})).is_err());
    }

    #[tokio::test]
    async fn test_invoke_each_kind() {
        let registry = CustomValidatorRegistry::new();
        registry.register_sync("short", |req| Ok((req.value.len() < 3).into()));
        registry.register_async("long", |req| async move { Ok((req.value.len() > 3).into()) });
        registry.register_json("json", |req| Ok(json!({"valid": req.value == "ok", "message": "Not ok"})));

        assert!(registry.invoke("short", request("ab")).await.unwrap().valid);
        assert!(!registry.invoke("long", request("ab")).await.unwrap().valid);
        let outcome = registry.invoke("json", request("no")).await.unwrap();
        assert_eq!(outcome, CustomOutcome::invalid("Not ok"));
    }

    #[tokio::test]
    async fn test_invoke_missing() {
        let registry = CustomValidatorRegistry::new();
        let err = registry.invoke("nope", request("")).await.unwrap_err();
        assert!(matches!(err, CallbackError::NotRegistered(name) if name == "nope"));
        assert!(!registry.unregister("nope"));
    }

    #[tokio::test]
    async fn test_callback_error_propagates() {
        let registry = CustomValidatorRegistry::new();
        registry.register_sync("broken", |_| Err(CallbackError::failed("boom")));
        let err = registry.invoke("broken", request("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
