use chrono::{DateTime, Utc};
use lookout_core::{Deadline, Error, Result};
use serde::Deserialize;

use crate::driver::ScmDriver;
use crate::types::{cap_diff, GetPrRequest, GetPrResponse, PostCommentRequest, PullRequest};

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "lookout";

/// GitHub driver for fetching pull requests and posting comments.
///
/// Metadata and the raw diff go over plain REST; comment posting goes
/// through octocrab. The diff read is capped, never unbounded.
///
/// # Examples
///
/// ```
/// use lookout_scm::github::GithubDriver;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let driver = GithubDriver::new("ghp_xxxx").unwrap();
/// assert!(GithubDriver::new("").is_err());
/// # }
/// ```
#[derive(Debug)]
pub struct GithubDriver {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    api_base: String,
    token: String,
}

/// Wire shape of `GET /repos/{owner}/{repo}/pulls/{number}`.
#[derive(Deserialize)]
struct GithubPull {
    id: u64,
    number: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<GithubUser>,
    url: String,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    diff_url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct GithubUser {
    login: String,
}

impl GithubDriver {
    /// Create a driver from an API token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is empty, or [`Error::Scm`]
    /// if the underlying clients cannot be built.
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Config(
                "GitHub token is missing. Set GIT_TOKEN or scm.token".into(),
            ));
        }

        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| Error::Scm(format!("failed to create GitHub client: {e}")))?;

        Ok(Self {
            octocrab,
            http: reqwest::Client::new(),
            api_base: GITHUB_API_BASE.to_string(),
            token: token.to_string(),
        })
    }

    /// Point the driver at a different API base (GitHub Enterprise, tests).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Scm`] if the base URI is not valid.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Result<Self> {
        self.api_base = base.into();
        self.octocrab = octocrab::Octocrab::builder()
            .personal_token(self.token.clone())
            .base_uri(self.api_base.as_str())
            .map_err(|e| Error::Scm(format!("invalid GitHub API base: {e}")))?
            .build()
            .map_err(|e| Error::Scm(format!("failed to create GitHub client: {e}")))?;
        Ok(self)
    }

    async fn fetch_metadata(&self, req: &GetPrRequest) -> Result<GithubPull> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_base, req.owner, req.repo, req.number
        );

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", req.token))
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::Scm(format!("failed to get pull request #{}: {e}", req.number)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Scm(format!(
                "failed to get pull request #{} with status: {}",
                req.number,
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Scm(format!("failed to parse pull request response: {e}")))
    }

    async fn fetch_diff(&self, diff_url: &str, token: &str, max_diff_size: usize) -> Result<String> {
        let response = self
            .http
            .get(diff_url)
            .header("Authorization", format!("token {token}"))
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::Scm(format!("failed to get diff: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Scm(format!(
                "failed to get diff with status: {}",
                status.as_u16()
            )));
        }

        // Capped read: stop pulling chunks once the limit is reached.
        let mut buf: Vec<u8> = Vec::new();
        let mut response = response;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Scm(format!("failed to read diff: {e}")))?
        {
            buf.extend_from_slice(&chunk);
            if buf.len() >= max_diff_size {
                break;
            }
        }

        Ok(cap_diff(&String::from_utf8_lossy(&buf), max_diff_size))
    }
}

impl ScmDriver for GithubDriver {
    async fn get_pull_request(
        &self,
        deadline: &Deadline,
        req: GetPrRequest,
    ) -> Result<GetPrResponse> {
        deadline
            .bound(async {
                let pull = self.fetch_metadata(&req).await?;

                let diff_url = pull.diff_url.clone().filter(|u| !u.is_empty()).ok_or_else(
                    || Error::Scm(format!("pull request #{} has no diff URL", req.number)),
                )?;
                let raw_diff = self
                    .fetch_diff(&diff_url, &req.token, req.max_diff_size)
                    .await?;

                tracing::debug!(
                    number = pull.number,
                    diff_bytes = raw_diff.len(),
                    "fetched pull request"
                );

                Ok(GetPrResponse {
                    pr: PullRequest {
                        id: pull.id,
                        number: pull.number,
                        title: pull.title.unwrap_or_default(),
                        body: pull.body.unwrap_or_default(),
                        author: pull.user.map(|u| u.login).unwrap_or_default(),
                        url: pull.url,
                        html_url: pull.html_url.unwrap_or_default(),
                        diff_url,
                        raw_diff,
                        created_at: pull.created_at.unwrap_or_default(),
                        updated_at: pull.updated_at.unwrap_or_default(),
                    },
                })
            })
            .await
    }

    async fn post_issue_comment(
        &self,
        deadline: &Deadline,
        req: PostCommentRequest,
    ) -> Result<()> {
        deadline
            .bound(async {
                let Some(body) = req.comment.body else {
                    return Err(Error::Scm("issue comment has no body".into()));
                };

                let route = format!(
                    "/repos/{}/{}/issues/{}/comments",
                    req.owner, req.repo, req.number
                );
                let payload = serde_json::json!({ "body": body });

                let _response: serde_json::Value = self
                    .octocrab
                    .post(route, Some(&payload))
                    .await
                    .map_err(|e| Error::Scm(format!("failed to post issue comment: {e}")))?;

                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request(max_diff_size: usize) -> GetPrRequest {
        GetPrRequest {
            owner: "owner".into(),
            repo: "repo".into(),
            number: 1,
            token: "fake-token".into(),
            max_diff_size,
        }
    }

    fn pull_json(diff_url: &str) -> String {
        format!(
            r#"{{
                "id": 12345,
                "number": 1,
                "title": "feat: add ai review",
                "body": "This is a test PR",
                "user": {{"login": "reviewer-22"}},
                "url": "https://api.github.com/repos/owner/repo/pulls/1",
                "html_url": "https://github.com/owner/repo/pull/1",
                "diff_url": "{diff_url}",
                "created_at": "2024-01-01T12:00:00Z",
                "updated_at": "2024-01-02T12:00:00Z"
            }}"#
        )
    }

    #[tokio::test]
    async fn get_pull_request_maps_fields() {
        let mut server = mockito::Server::new_async().await;
        let diff = "diff --git a/main.rs b/main.rs\n+println!(\"hello\");";

        let meta = server
            .mock("GET", "/repos/owner/repo/pulls/1")
            .with_status(200)
            .with_body(pull_json(&format!("{}/fake.diff", server.url())))
            .create_async()
            .await;
        let diff_mock = server
            .mock("GET", "/fake.diff")
            .match_header("authorization", "token fake-token")
            .with_status(200)
            .with_body(diff)
            .create_async()
            .await;

        let driver = GithubDriver::new("fake-token")
            .unwrap()
            .with_api_base(server.url())
            .unwrap();
        let resp = driver
            .get_pull_request(&Deadline::unbounded(), request(1024))
            .await
            .unwrap();

        meta.assert_async().await;
        diff_mock.assert_async().await;

        let pr = resp.pr;
        assert_eq!(pr.id, 12345);
        assert_eq!(pr.number, 1);
        assert_eq!(pr.title, "feat: add ai review");
        assert_eq!(pr.body, "This is a test PR");
        assert_eq!(pr.author, "reviewer-22");
        assert_eq!(pr.html_url, "https://github.com/owner/repo/pull/1");
        assert_eq!(pr.raw_diff, diff);
        assert_eq!(pr.created_at.to_rfc3339(), "2024-01-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn oversized_diff_is_capped_with_marker() {
        let mut server = mockito::Server::new_async().await;
        let diff = "a".repeat(500);

        server
            .mock("GET", "/repos/owner/repo/pulls/1")
            .with_status(200)
            .with_body(pull_json(&format!("{}/fake.diff", server.url())))
            .create_async()
            .await;
        server
            .mock("GET", "/fake.diff")
            .with_status(200)
            .with_body(&diff)
            .create_async()
            .await;

        let driver = GithubDriver::new("fake-token")
            .unwrap()
            .with_api_base(server.url())
            .unwrap();
        let resp = driver
            .get_pull_request(&Deadline::unbounded(), request(100))
            .await
            .unwrap();

        let raw = resp.pr.raw_diff;
        assert_eq!(raw.len(), 100 + crate::DIFF_TRUNCATION_MARKER.len());
        assert!(raw.starts_with(&"a".repeat(100)));
        assert!(raw.ends_with(crate::DIFF_TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn metadata_failure_names_the_operation_and_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/owner/repo/pulls/1")
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let driver = GithubDriver::new("fake-token")
            .unwrap()
            .with_api_base(server.url())
            .unwrap();
        let err = driver
            .get_pull_request(&Deadline::unbounded(), request(1024))
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("pull request #1"));
        assert!(msg.contains("404"));
    }

    #[tokio::test]
    async fn diff_failure_is_distinct_from_metadata_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/owner/repo/pulls/1")
            .with_status(200)
            .with_body(pull_json(&format!("{}/fake.diff", server.url())))
            .create_async()
            .await;
        server
            .mock("GET", "/fake.diff")
            .with_status(500)
            .create_async()
            .await;

        let driver = GithubDriver::new("fake-token")
            .unwrap()
            .with_api_base(server.url())
            .unwrap();
        let err = driver
            .get_pull_request(&Deadline::unbounded(), request(1024))
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("failed to get diff with status: 500"));
        assert!(!msg.contains("pull request #1"));
    }

    #[tokio::test]
    async fn expired_deadline_fails_before_any_call() {
        let mut server = mockito::Server::new_async().await;
        let meta = server
            .mock("GET", "/repos/owner/repo/pulls/1")
            .expect(0)
            .create_async()
            .await;

        let driver = GithubDriver::new("fake-token")
            .unwrap()
            .with_api_base(server.url())
            .unwrap();
        let deadline = Deadline::within(Duration::ZERO);
        let err = driver
            .get_pull_request(&deadline, request(1024))
            .await
            .unwrap_err();

        assert!(err.is_deadline_exceeded());
        meta.assert_async().await;
    }

    #[tokio::test]
    async fn post_issue_comment_hits_the_comments_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let post = server
            .mock("POST", "/repos/owner/repo/issues/1/comments")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({"body": "LGTM"}),
            ))
            .with_status(201)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let driver = GithubDriver::new("fake-token")
            .unwrap()
            .with_api_base(server.url())
            .unwrap();
        let req = PostCommentRequest {
            owner: "owner".into(),
            repo: "repo".into(),
            number: 1,
            comment: crate::IssueComment {
                body: Some("LGTM".into()),
            },
            token: "fake-token".into(),
        };

        driver
            .post_issue_comment(&Deadline::unbounded(), req)
            .await
            .unwrap();
        post.assert_async().await;
    }
}
