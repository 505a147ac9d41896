//! Core error type, configuration, and run deadline for lookout.
//!
//! This crate provides the shared foundation used by every other lookout
//! crate:
//! - [`Error`] — unified error type using `thiserror`
//! - [`Config`] — run configuration bound from TOML and environment
//! - [`Deadline`] — the shared cancellation bound for all external calls

mod config;
mod deadline;
mod error;

pub use config::{Config, LlmConfig, ReviewConfig, ScmConfig, SystemConfig};
pub use deadline::Deadline;
pub use error::Error;

/// A convenience `Result` type for lookout operations.
pub type Result<T> = std::result::Result<T, Error>;
