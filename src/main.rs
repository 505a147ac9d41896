use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};

use lookout_core::{Config, Deadline};
use lookout_llm::{AnyLlmDriver, LlmClient};
use lookout_review::Engine;
use lookout_scm::{AnyScmDriver, ScmClient};

#[derive(Parser)]
#[command(
    name = "lookout",
    version,
    about = "AI pull-request reviewer",
    long_about = "Lookout fetches a pull request, asks an LLM for a review, and posts\n\
                   the result back as a comment — one linear pass per invocation.\n\n\
                   Configuration layers, highest wins: CLI flags, environment\n\
                   variables (GIT_*, AI_*, REVIEW_*, SYSTEM_*), then the config file.\n\n\
                   Examples:\n  \
                     lookout --owner acme --repo api --pr 42\n  \
                     lookout --config lookout.toml --prompt-type security\n  \
                     GIT_PLATFORM=gitlab lookout --pr 7"
)]
struct Cli {
    /// Path to configuration file (default: lookout.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SCM platform ("github" or "gitlab")
    #[arg(long)]
    platform: Option<String>,

    /// Repository owner or group
    #[arg(long)]
    owner: Option<String>,

    /// Repository name
    #[arg(long)]
    repo: Option<String>,

    /// Pull/merge request number to review
    #[arg(long)]
    pr: Option<u64>,

    /// Prompt template name (resolved as <name>.md)
    #[arg(long)]
    prompt_type: Option<String>,

    /// Directory searched first for prompt templates
    #[arg(long)]
    prompt_dir: Option<String>,

    /// LLM model identifier
    #[arg(long)]
    model: Option<String>,

    /// Wall-clock bound for the whole run, in seconds (0 = unbounded)
    #[arg(long)]
    timeout: Option<u64>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(platform) = &self.platform {
            config.scm.platform = platform.clone();
        }
        if let Some(owner) = &self.owner {
            config.scm.owner = owner.clone();
        }
        if let Some(repo) = &self.repo {
            config.scm.repo = repo.clone();
        }
        if let Some(pr) = self.pr {
            config.scm.pr_number = pr;
        }
        if let Some(prompt_type) = &self.prompt_type {
            config.review.prompt_type = prompt_type.clone();
        }
        if let Some(prompt_dir) = &self.prompt_dir {
            config.review.prompt_dir = prompt_dir.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(timeout) = self.timeout {
            config.system.timeout_secs = timeout;
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => {
            let default_path = Path::new("lookout.toml");
            if default_path.exists() {
                Config::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err("loading lookout.toml")?
            } else {
                Config::default()
            }
        }
    };

    config.apply_env().into_diagnostic()?;
    cli.apply(&mut config);
    if let Err(e) = config.validate() {
        return Err(miette::miette!(
            help = "set the missing fields via flags, env vars, or the config file",
            "{e}"
        ));
    }

    Ok(config)
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.system.log_level);

    let scm_driver = AnyScmDriver::from_config(&config.scm).into_diagnostic()?;
    let llm_driver = AnyLlmDriver::from_config(&config.llm).into_diagnostic()?;
    let scm = ScmClient::new(scm_driver, config.scm.clone());
    let llm = LlmClient::new(llm_driver, config.llm.clone());

    let deadline = match config.system.timeout_secs {
        0 => Deadline::unbounded(),
        secs => Deadline::within(Duration::from_secs(secs)),
    };

    tracing::info!(
        platform = %config.scm.platform,
        owner = %config.scm.owner,
        repo = %config.scm.repo,
        pr = config.scm.pr_number,
        model = %config.llm.model,
        "starting review"
    );

    let engine = Engine::new(config, scm, llm);
    engine.run(&deadline).await.into_diagnostic()?;

    tracing::info!("review completed");
    Ok(())
}
