use chrono::{DateTime, Utc};

/// Marker appended to a raw diff that hit the size cap.
pub const DIFF_TRUNCATION_MARKER: &str = "\n\n... [DIFF TRUNCATED DUE TO SIZE LIMIT] ...";

/// A pull/merge request normalized across hosts.
///
/// Constructed only by a driver; immutable for the duration of one run and
/// never persisted. No host-specific vocabulary leaks into these fields:
/// a GitLab merge request's `iid` arrives as [`PullRequest::number`], its
/// `description` as [`PullRequest::body`].
///
/// # Examples
///
/// ```
/// use lookout_scm::PullRequest;
///
/// let pr = PullRequest {
///     number: 42,
///     title: "feat: add ai review".into(),
///     ..PullRequest::default()
/// };
/// assert_eq!(pr.number, 42);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PullRequest {
    /// Host-internal numeric identity.
    pub id: u64,
    /// The display number the PR is addressed by.
    pub number: u64,
    /// PR title.
    pub title: String,
    /// PR description body.
    pub body: String,
    /// Handle of the PR submitter.
    pub author: String,
    /// Canonical API URL.
    pub url: String,
    /// Browser-facing URL.
    pub html_url: String,
    /// URL the raw diff was fetched from.
    pub diff_url: String,
    /// Unified diff text, capped per [`cap_diff`].
    pub raw_diff: String,
    /// When the PR was opened.
    pub created_at: DateTime<Utc>,
    /// When the PR was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A single review comment to post on a PR.
///
/// `body: None` means "no comment produced"; letting that reach the post
/// step is a caller contract error and is rejected by the client facade.
#[derive(Debug, Clone, Default)]
pub struct IssueComment {
    /// Comment text, if any was produced.
    pub body: Option<String>,
}

/// Driver-agnostic request to fetch one pull request with its diff.
#[derive(Debug, Clone)]
pub struct GetPrRequest {
    /// Repository owner or group.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// PR/MR number to fetch.
    pub number: u64,
    /// Per-call API token.
    pub token: String,
    /// Maximum bytes of diff content to retain (see [`cap_diff`]).
    pub max_diff_size: usize,
}

/// Response carrying the normalized pull request.
#[derive(Debug, Clone)]
pub struct GetPrResponse {
    /// The fetched pull request, `pr.number` matching the requested number.
    pub pr: PullRequest,
}

/// Driver-agnostic request to post one issue comment.
#[derive(Debug, Clone)]
pub struct PostCommentRequest {
    /// Repository owner or group.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// PR/MR number to comment on.
    pub number: u64,
    /// The comment payload.
    pub comment: IssueComment,
    /// Per-call API token.
    pub token: String,
}

/// Apply the diff-size cap shared by every driver.
///
/// A diff shorter than `max_bytes` is returned verbatim. Otherwise the
/// result is exactly the first `max_bytes` bytes of content (floored to a
/// char boundary for non-ASCII input) followed by
/// [`DIFF_TRUNCATION_MARKER`].
///
/// # Examples
///
/// ```
/// use lookout_scm::{cap_diff, DIFF_TRUNCATION_MARKER};
///
/// assert_eq!(cap_diff("short", 100), "short");
/// assert_eq!(
///     cap_diff("0123456789", 4),
///     format!("0123{DIFF_TRUNCATION_MARKER}")
/// );
/// ```
pub fn cap_diff(diff: &str, max_bytes: usize) -> String {
    if diff.len() < max_bytes {
        return diff.to_string();
    }
    let mut end = max_bytes;
    while !diff.is_char_boundary(end) {
        end -= 1;
    }
    let mut capped = diff[..end].to_string();
    capped.push_str(DIFF_TRUNCATION_MARKER);
    capped
}
