//! Review orchestration for lookout.
//!
//! Provides prompt template resolution with a two-tier search path,
//! placeholder rendering against a pull request, and the [`Engine`] that
//! sequences the full flow: resolve prompt, fetch PR, render, generate,
//! post.

mod engine;
pub mod prompt;
pub mod template;

pub use engine::Engine;
