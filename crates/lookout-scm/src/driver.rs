use lookout_core::{Deadline, Error, Result, ScmConfig};

use crate::github::GithubDriver;
use crate::gitlab::GitlabDriver;
use crate::types::{GetPrRequest, GetPrResponse, PostCommentRequest};

/// Capability set every source-control host driver implements.
///
/// Drivers hide host quirks entirely: endpoint shapes, pagination,
/// field vocabulary, and diff truncation all stay behind this contract.
/// Every call observes the shared run [`Deadline`].
#[allow(async_fn_in_trait)]
pub trait ScmDriver {
    /// Fetch PR metadata plus its raw diff, capped to the request's limit.
    async fn get_pull_request(
        &self,
        deadline: &Deadline,
        req: GetPrRequest,
    ) -> Result<GetPrResponse>;

    /// Post one comment to the PR's comment/note endpoint.
    async fn post_issue_comment(&self, deadline: &Deadline, req: PostCommentRequest)
        -> Result<()>;
}

/// The host driver selected once at startup, dispatched by enum.
///
/// # Examples
///
/// ```
/// use lookout_core::ScmConfig;
/// use lookout_scm::AnyScmDriver;
///
/// let cfg = ScmConfig {
///     platform: "matrix-forge".into(),
///     token: "tok".into(),
///     ..ScmConfig::default()
/// };
/// let err = AnyScmDriver::from_config(&cfg).unwrap_err();
/// assert!(err.to_string().contains("unsupported SCM platform"));
/// ```
#[derive(Debug)]
pub enum AnyScmDriver {
    /// GitHub REST API v3.
    Github(GithubDriver),
    /// GitLab REST API v4.
    Gitlab(GitlabDriver),
}

impl AnyScmDriver {
    /// Build the driver named by `cfg.platform`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown platform name or a missing
    /// token, so a bad selection fails at startup rather than mid-run.
    pub fn from_config(cfg: &ScmConfig) -> Result<Self> {
        match cfg.platform.as_str() {
            "github" => Ok(Self::Github(GithubDriver::new(&cfg.token)?)),
            "gitlab" => Ok(Self::Gitlab(GitlabDriver::new(&cfg.token)?)),
            other => Err(Error::Config(format!("unsupported SCM platform: {other}"))),
        }
    }
}

impl ScmDriver for AnyScmDriver {
    async fn get_pull_request(
        &self,
        deadline: &Deadline,
        req: GetPrRequest,
    ) -> Result<GetPrResponse> {
        match self {
            Self::Github(d) => d.get_pull_request(deadline, req).await,
            Self::Gitlab(d) => d.get_pull_request(deadline, req).await,
        }
    }

    async fn post_issue_comment(
        &self,
        deadline: &Deadline,
        req: PostCommentRequest,
    ) -> Result<()> {
        match self {
            Self::Github(d) => d.post_issue_comment(deadline, req).await,
            Self::Gitlab(d) => d.post_issue_comment(deadline, req).await,
        }
    }
}
