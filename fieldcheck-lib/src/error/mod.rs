//! Error types

mod callback;
mod config;
mod translation;

pub use callback::*;
pub use config::*;
pub use translation::*;
