use std::path::Path;

use lookout_core::{Config, Deadline, Error, Result};
use lookout_llm::{LlmClient, LlmDriver};
use lookout_scm::{IssueComment, ScmClient, ScmDriver};

use crate::prompt;
use crate::template;

/// The review orchestrator.
///
/// Owns no state beyond its injected clients and configuration, and runs
/// one strictly linear pass: resolve prompt, load it, fetch the PR,
/// render, generate, post. The first failing stage aborts the rest;
/// nothing is retried. Either all stages complete and exactly one comment
/// is posted, or no comment is posted at all.
pub struct Engine<S: ScmDriver, L: LlmDriver> {
    cfg: Config,
    scm: ScmClient<S>,
    llm: LlmClient<L>,
}

impl<S: ScmDriver, L: LlmDriver> Engine<S, L> {
    /// Compose the engine from its collaborators.
    pub fn new(cfg: Config, scm: ScmClient<S>, llm: LlmClient<L>) -> Self {
        Self { cfg, scm, llm }
    }

    /// Run one full review pass under the shared deadline.
    ///
    /// # Errors
    ///
    /// The first stage failure, wrapped with that stage's context and
    /// preserving the root cause (including cancellation kind).
    pub async fn run(&self, deadline: &Deadline) -> Result<()> {
        let prompt_path = prompt::resolve(
            Path::new(&self.cfg.review.prompt_dir),
            &self.cfg.review.prompt_type,
        )
        .map_err(|e| e.context("prompt resolution failed"))?;

        let template_text = std::fs::read_to_string(&prompt_path).map_err(|e| {
            Error::from(e).context(format!(
                "failed to load prompt file [{}]",
                prompt_path.display()
            ))
        })?;
        tracing::debug!(
            path = %prompt_path.display(),
            bytes = template_text.len(),
            "loaded prompt template"
        );

        let pr = self
            .scm
            .get_pull_request(deadline, self.cfg.scm.pr_number)
            .await
            .map_err(|e| e.context("failed to get pull request"))?;
        tracing::info!(
            number = pr.number,
            title = %pr.title,
            author = %pr.author,
            diff_bytes = pr.raw_diff.len(),
            "pull request fetched"
        );

        let rendered = template::render(&template_text, &pr)
            .map_err(|e| e.context("prompt generation failed"))?;

        let review = self
            .llm
            .generate_content(deadline, &rendered)
            .await
            .map_err(|e| e.context("failed to generate review"))?;

        tracing::info!(
            repo = %self.cfg.scm.repo,
            number = pr.number,
            "posting review comment"
        );
        self.scm
            .post_issue_comment(
                deadline,
                self.cfg.scm.pr_number,
                IssueComment { body: Some(review) },
            )
            .await
            .map_err(|e| e.context("failed to post issue comment"))
    }
}
