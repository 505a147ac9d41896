use chrono::{DateTime, Utc};
use lookout_core::{Deadline, Error, Result};
use serde::Deserialize;

use crate::driver::ScmDriver;
use crate::types::{cap_diff, GetPrRequest, GetPrResponse, PostCommentRequest, PullRequest};

const GITLAB_API_BASE: &str = "https://gitlab.com/api/v4";

/// GitLab driver (REST v4) for merge requests.
///
/// Endpoints used:
/// - `GET /projects/:id/merge_requests/:iid`
/// - `GET /projects/:id/merge_requests/:iid/diffs`
/// - `POST /projects/:id/merge_requests/:iid/notes`
///
/// GitLab vocabulary stays inside this file: the MR `iid` becomes
/// [`PullRequest::number`], `description` becomes the body, and the
/// per-file diff list is concatenated before the shared size cap.
#[derive(Debug)]
pub struct GitlabDriver {
    http: reqwest::Client,
    api_base: String,
}

/// Wire shape of `GET /projects/:id/merge_requests/:iid`.
#[derive(Deserialize)]
struct GitlabMr {
    id: u64,
    iid: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<GitlabAuthor>,
    #[serde(default)]
    web_url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct GitlabAuthor {
    username: String,
}

/// One entry of `GET .../diffs`.
#[derive(Deserialize)]
struct GitlabDiff {
    #[serde(default)]
    diff: String,
}

impl GitlabDriver {
    /// Create a driver from an API token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is empty.
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Config(
                "GitLab token is missing. Set GIT_TOKEN or scm.token".into(),
            ));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_base: GITLAB_API_BASE.to_string(),
        })
    }

    /// Point the driver at a self-hosted instance (or a test server).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn project_path(owner: &str, repo: &str) -> String {
        urlencoding::encode(&format!("{owner}/{repo}")).into_owned()
    }

    fn mr_url(&self, req_owner: &str, req_repo: &str, number: u64) -> String {
        format!(
            "{}/projects/{}/merge_requests/{}",
            self.api_base,
            Self::project_path(req_owner, req_repo),
            number
        )
    }
}

impl ScmDriver for GitlabDriver {
    async fn get_pull_request(
        &self,
        deadline: &Deadline,
        req: GetPrRequest,
    ) -> Result<GetPrResponse> {
        deadline
            .bound(async {
                let mr_url = self.mr_url(&req.owner, &req.repo, req.number);

                let response = self
                    .http
                    .get(&mr_url)
                    .header("PRIVATE-TOKEN", &req.token)
                    .send()
                    .await
                    .map_err(|e| Error::Scm(format!("failed to get merge request: {e}")))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(Error::Scm(format!(
                        "failed to get merge request #{} with status: {}",
                        req.number,
                        status.as_u16()
                    )));
                }

                let mr: GitlabMr = response.json().await.map_err(|e| {
                    Error::Scm(format!("failed to parse merge request response: {e}"))
                })?;

                let diffs_url = format!("{mr_url}/diffs");
                let response = self
                    .http
                    .get(&diffs_url)
                    .header("PRIVATE-TOKEN", &req.token)
                    .send()
                    .await
                    .map_err(|e| {
                        Error::Scm(format!(
                            "failed to get diff for merge request #{}: {e}",
                            req.number
                        ))
                    })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(Error::Scm(format!(
                        "failed to get diff for merge request #{} with status: {}",
                        req.number,
                        status.as_u16()
                    )));
                }

                let diffs: Vec<GitlabDiff> = response.json().await.map_err(|e| {
                    Error::Scm(format!("failed to parse merge request diffs: {e}"))
                })?;

                // The multi-part diff list is one logical diff; concatenate
                // before applying the shared cap so truncation behaves the
                // same on every host.
                let mut combined = String::new();
                for d in &diffs {
                    combined.push_str(&d.diff);
                }
                let raw_diff = cap_diff(&combined, req.max_diff_size);

                tracing::debug!(
                    number = mr.iid,
                    parts = diffs.len(),
                    diff_bytes = raw_diff.len(),
                    "fetched merge request"
                );

                let web_url = mr.web_url.unwrap_or_default();
                Ok(GetPrResponse {
                    pr: PullRequest {
                        id: mr.id,
                        number: mr.iid,
                        title: mr.title.unwrap_or_default(),
                        body: mr.description.unwrap_or_default(),
                        author: mr.author.map(|a| a.username).unwrap_or_default(),
                        url: web_url.clone(),
                        html_url: web_url,
                        diff_url: diffs_url,
                        raw_diff,
                        created_at: mr.created_at.unwrap_or_default(),
                        updated_at: mr.updated_at.unwrap_or_default(),
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

                let url = format!("{}/notes", self.mr_url(&req.owner, &req.repo, req.number));
                let response = self
                    .http
                    .post(&url)
                    .header("PRIVATE-TOKEN", &req.token)
                    .json(&serde_json::json!({ "body": body }))
                    .send()
                    .await
                    .map_err(|e| {
                        Error::Scm(format!("failed to create merge request note: {e}"))
                    })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(Error::Scm(format!(
                        "failed to create merge request note with status: {}",
                        status.as_u16()
                    )));
                }

                Ok(())
            })
            .await
    }
}
