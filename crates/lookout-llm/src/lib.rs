//! Language-model integration for lookout.
//!
//! Provides the [`LlmDriver`] capability set with one variant per model
//! backend (Gemini), and the [`LlmClient`] facade that applies the run's
//! generation parameters so callers only supply the prompt.

mod client;
mod driver;
pub mod gemini;

pub use client::LlmClient;
pub use driver::{AnyLlmDriver, GenerateRequest, GenerateResponse, LlmDriver};
