use lookout_core::{Deadline, Error, Result, ScmConfig};

use crate::driver::ScmDriver;
use crate::types::{GetPrRequest, IssueComment, PostCommentRequest, PullRequest};

/// Host-agnostic facade over the active [`ScmDriver`].
///
/// Adds no logic beyond building requests from the per-run configuration
/// (owner, repo, token, diff cap) and wrapping driver errors with a
/// client-level prefix that distinguishes get from post failures. Driver
/// types never cross this boundary.
pub struct ScmClient<D: ScmDriver> {
    driver: D,
    cfg: ScmConfig,
}

impl<D: ScmDriver> ScmClient<D> {
    /// Wrap `driver` with the run configuration.
    pub fn new(driver: D, cfg: ScmConfig) -> Self {
        Self { driver, cfg }
    }

    /// Fetch one pull request with its capped raw diff.
    ///
    /// # Errors
    ///
    /// Driver errors are wrapped with "failed to get pull request using
    /// SCM driver", preserving the root cause.
    pub async fn get_pull_request(
        &self,
        deadline: &Deadline,
        number: u64,
    ) -> Result<PullRequest> {
        let req = GetPrRequest {
            owner: self.cfg.owner.clone(),
            repo: self.cfg.repo.clone(),
            number,
            token: self.cfg.token.clone(),
            max_diff_size: self.cfg.max_diff_size,
        };

        let resp = self
            .driver
            .get_pull_request(deadline, req)
            .await
            .map_err(|e| e.context("failed to get pull request using SCM driver"))?;

        Ok(resp.pr)
    }

    /// Post one comment on the pull request.
    ///
    /// # Errors
    ///
    /// A comment without a body is rejected before the driver is called;
    /// driver errors are wrapped with "failed to post issue comment using
    /// SCM driver".
    pub async fn post_issue_comment(
        &self,
        deadline: &Deadline,
        number: u64,
        comment: IssueComment,
    ) -> Result<()> {
        if comment.body.is_none() {
            return Err(Error::Scm("issue comment has no body".into()));
        }

        let req = PostCommentRequest {
            owner: self.cfg.owner.clone(),
            repo: self.cfg.repo.clone(),
            number,
            comment,
            token: self.cfg.token.clone(),
        };

        self.driver
            .post_issue_comment(deadline, req)
            .await
            .map_err(|e| e.context("failed to post issue comment using SCM driver"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GetPrResponse;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDriver {
        get_requests: Mutex<Vec<GetPrRequest>>,
        post_requests: Mutex<Vec<PostCommentRequest>>,
        fail_get: bool,
    }

    impl ScmDriver for &RecordingDriver {
        async fn get_pull_request(
            &self,
            _deadline: &Deadline,
            req: GetPrRequest,
        ) -> Result<GetPrResponse> {
            let number = req.number;
            self.get_requests.lock().unwrap().push(req);
            if self.fail_get {
                return Err(Error::Scm("status 502".into()));
            }
            Ok(GetPrResponse {
                pr: PullRequest {
                    number,
                    ..PullRequest::default()
                },
            })
        }

        async fn post_issue_comment(
            &self,
            _deadline: &Deadline,
            req: PostCommentRequest,
        ) -> Result<()> {
            self.post_requests.lock().unwrap().push(req);
            Ok(())
        }
    }

    fn config() -> ScmConfig {
        ScmConfig {
            platform: "github".into(),
            token: "tok-1".into(),
            owner: "owner".into(),
            repo: "repo".into(),
            pr_number: 3,
            max_diff_size: 2048,
        }
    }

    #[tokio::test]
    async fn get_injects_run_configuration_into_the_request() {
        let driver = RecordingDriver::default();
        let client = ScmClient::new(&driver, config());

        let pr = client
            .get_pull_request(&Deadline::unbounded(), 3)
            .await
            .unwrap();
        assert_eq!(pr.number, 3);

        let requests = driver.get_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].owner, "owner");
        assert_eq!(requests[0].repo, "repo");
        assert_eq!(requests[0].token, "tok-1");
        assert_eq!(requests[0].max_diff_size, 2048);
    }

    #[tokio::test]
    async fn get_failure_carries_client_prefix_and_root_cause() {
        let driver = RecordingDriver {
            fail_get: true,
            ..RecordingDriver::default()
        };
        let client = ScmClient::new(&driver, config());

        let err = client
            .get_pull_request(&Deadline::unbounded(), 3)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("failed to get pull request using SCM driver"));
        assert!(msg.contains("status 502"));
        assert!(matches!(err.root_cause(), Error::Scm(_)));
    }

    #[tokio::test]
    async fn post_forwards_the_comment_body() {
        let driver = RecordingDriver::default();
        let client = ScmClient::new(&driver, config());

        client
            .post_issue_comment(
                &Deadline::unbounded(),
                3,
                IssueComment {
                    body: Some("LGTM".into()),
                },
            )
            .await
            .unwrap();

        let requests = driver.post_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].comment.body.as_deref(), Some("LGTM"));
        assert_eq!(requests[0].token, "tok-1");
    }

    #[tokio::test]
    async fn bodyless_comment_never_reaches_the_driver() {
        let driver = RecordingDriver::default();
        let client = ScmClient::new(&driver, config());

        let err = client
            .post_issue_comment(&Deadline::unbounded(), 3, IssueComment::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no body"));
        assert!(driver.post_requests.lock().unwrap().is_empty());
    }
}
