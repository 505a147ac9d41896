//! Source-control host integration for lookout.
//!
//! Provides the host-agnostic [`PullRequest`] record, the [`ScmDriver`]
//! capability set with one variant per host (GitHub, GitLab), and the
//! [`ScmClient`] facade the review engine talks to. Host-specific field
//! mapping and diff-size capping stay inside the drivers.

mod client;
mod driver;
pub mod github;
pub mod gitlab;
mod types;

pub use client::ScmClient;
pub use driver::{AnyScmDriver, ScmDriver};
pub use types::{
    cap_diff, GetPrRequest, GetPrResponse, IssueComment, PostCommentRequest, PullRequest,
    DIFF_TRUNCATION_MARKER,
};
