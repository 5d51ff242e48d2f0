//! Declarative form field validation
//!
//! Fields carry pipe-delimited rule chains such as `required|alpha|min_len:2`.
//! A [`ValidationContext`] evaluates each chain whenever the field's value
//! changes, after an inactivity delay, and keeps per-form summaries of the
//! fields that are currently invalid.

pub mod catalog;
pub mod config;
pub mod context;
pub mod custom;
pub mod dependency;
pub mod engine;
pub mod error;
pub mod rule;
pub mod runtime;
pub mod state;
pub mod summary;
pub mod translate;
pub mod validator;
pub mod value;

pub use config::{EngineConfig, FieldKind, FieldOptions};
pub use context::{FieldRegistration, FieldReport, ResetOptions, ValidationContext};
pub use error::ConfigurationError;
pub use state::{FieldStatus, RequireCount};
