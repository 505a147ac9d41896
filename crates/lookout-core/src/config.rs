use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Top-level run configuration.
///
/// Supports layered resolution: CLI flags > env vars > config file >
/// defaults. The file and env layers live here; the binary applies CLI
/// flags on top.
///
/// # Examples
///
/// ```
/// use lookout_core::Config;
///
/// let config = Config::default();
/// assert_eq!(config.scm.platform, "github");
/// assert_eq!(config.llm.provider, "gemini");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source-control host settings.
    #[serde(default)]
    pub scm: ScmConfig,
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Review prompt settings.
    #[serde(default)]
    pub review: ReviewConfig,
    /// Process-wide settings.
    #[serde(default)]
    pub system: SystemConfig,
}

impl Config {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use lookout_core::Config;
    ///
    /// let toml = r#"
    /// [scm]
    /// platform = "gitlab"
    /// "#;
    /// let config = Config::from_toml(toml).unwrap();
    /// assert_eq!(config.scm.platform, "gitlab");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Override fields from environment variables.
    ///
    /// Recognized variables mirror the config tree: `GIT_PLATFORM`,
    /// `GIT_TOKEN`, `GIT_REPO_OWNER`, `GIT_REPO_NAME`, `GIT_PR_ID`,
    /// `GIT_MAX_DIFF_SIZE`, `AI_PROVIDER`, `AI_MODEL`, `AI_API_KEY`,
    /// `AI_TEMPERATURE`, `AI_MAX_TOKENS`, `REVIEW_PROMPT_TYPE`,
    /// `REVIEW_PROMPT_DIR`, `REVIEW_LANGUAGE`, `SYSTEM_LOG_LEVEL`,
    /// `SYSTEM_TIMEOUT`. Unset or empty variables leave the current
    /// value in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a numeric variable fails to parse.
    pub fn apply_env(&mut self) -> Result<(), Error> {
        override_str(&mut self.scm.platform, "GIT_PLATFORM");
        override_str(&mut self.scm.token, "GIT_TOKEN");
        override_str(&mut self.scm.owner, "GIT_REPO_OWNER");
        override_str(&mut self.scm.repo, "GIT_REPO_NAME");
        override_parsed(&mut self.scm.pr_number, "GIT_PR_ID")?;
        override_parsed(&mut self.scm.max_diff_size, "GIT_MAX_DIFF_SIZE")?;

        override_str(&mut self.llm.provider, "AI_PROVIDER");
        override_str(&mut self.llm.model, "AI_MODEL");
        override_str(&mut self.llm.api_key, "AI_API_KEY");
        override_parsed(&mut self.llm.temperature, "AI_TEMPERATURE")?;
        override_parsed(&mut self.llm.max_tokens, "AI_MAX_TOKENS")?;

        override_str(&mut self.review.prompt_type, "REVIEW_PROMPT_TYPE");
        override_str(&mut self.review.prompt_dir, "REVIEW_PROMPT_DIR");
        override_str(&mut self.review.language, "REVIEW_LANGUAGE");

        override_str(&mut self.system.log_level, "SYSTEM_LOG_LEVEL");
        override_parsed(&mut self.system.timeout_secs, "SYSTEM_TIMEOUT")?;

        Ok(())
    }

    /// Check that every field the engine requires is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming every missing field.
    ///
    /// # Examples
    ///
    /// ```
    /// use lookout_core::Config;
    ///
    /// let err = Config::default().validate().unwrap_err();
    /// assert!(err.to_string().contains("scm.token"));
    /// ```
    pub fn validate(&self) -> Result<(), Error> {
        let mut missing = Vec::new();
        if self.scm.token.is_empty() {
            missing.push("scm.token");
        }
        if self.scm.owner.is_empty() {
            missing.push("scm.owner");
        }
        if self.scm.repo.is_empty() {
            missing.push("scm.repo");
        }
        if self.scm.pr_number == 0 {
            missing.push("scm.pr_number");
        }
        if self.llm.api_key.is_empty() {
            missing.push("llm.api_key");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "missing required configuration: {}",
                missing.join(", ")
            )))
        }
    }
}

fn override_str(target: &mut String, key: &str) {
    if let Ok(value) = std::env::var(key) {
        if !value.is_empty() {
            *target = value;
        }
    }
}

fn override_parsed<T: FromStr>(target: &mut T, key: &str) -> Result<(), Error> {
    if let Ok(value) = std::env::var(key) {
        if !value.is_empty() {
            *target = value
                .parse()
                .map_err(|_| Error::Config(format!("invalid value for {key}: {value}")))?;
        }
    }
    Ok(())
}

/// Source-control host configuration.
///
/// # Examples
///
/// ```
/// use lookout_core::ScmConfig;
///
/// let config = ScmConfig::default();
/// assert_eq!(config.max_diff_size, 100 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScmConfig {
    /// Host name (`"github"` or `"gitlab"`).
    #[serde(default = "default_platform")]
    pub platform: String,
    /// API token for the host.
    #[serde(default)]
    pub token: String,
    /// Repository owner or group.
    #[serde(default)]
    pub owner: String,
    /// Repository name.
    #[serde(default)]
    pub repo: String,
    /// Pull/merge request number to review.
    #[serde(default)]
    pub pr_number: u64,
    /// Maximum bytes of raw diff retained before truncation (default: 100 KiB).
    #[serde(default = "default_max_diff_size")]
    pub max_diff_size: usize,
}

fn default_platform() -> String {
    "github".into()
}

fn default_max_diff_size() -> usize {
    100 * 1024
}

impl Default for ScmConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            pr_number: 0,
            max_diff_size: default_max_diff_size(),
        }
    }
}

/// LLM provider configuration.
///
/// # Examples
///
/// ```
/// use lookout_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gemini-2.0-flash");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (e.g. `"gemini"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider.
    #[serde(default)]
    pub api_key: String,
    /// Sampling temperature (default: 0.2).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum output tokens per generation (default: 2048).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "gemini".into()
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    2048
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Review prompt configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Name of the prompt template, resolved as `<prompt_type>.md`.
    #[serde(default = "default_prompt_type")]
    pub prompt_type: String,
    /// User-configured directory searched first for prompt templates.
    #[serde(default = "default_prompt_dir")]
    pub prompt_dir: String,
    /// Language the review should be written in.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_prompt_type() -> String {
    "general".into()
}

fn default_prompt_dir() -> String {
    "prompts".into()
}

fn default_language() -> String {
    "en".into()
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            prompt_type: default_prompt_type(),
            prompt_dir: default_prompt_dir(),
            language: default_language(),
        }
    }
}

/// Process-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Log level (`"debug"`, `"info"`, `"warn"`, `"error"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Wall-clock bound for one full run, in seconds (default: 120).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.scm.platform, "github");
        assert_eq!(config.scm.max_diff_size, 100 * 1024);
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.review.prompt_type, "general");
        assert_eq!(config.system.timeout_secs, 120);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[scm]
platform = "gitlab"
token = "glpat-xxx"
owner = "group"
repo = "project"
pr_number = 7
max_diff_size = 4096

[llm]
provider = "gemini"
model = "gemini-2.5-pro"
api_key = "key"
temperature = 0.7
max_tokens = 512

[review]
prompt_type = "security"
prompt_dir = "/srv/prompts"

[system]
log_level = "debug"
timeout_secs = 30
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.scm.platform, "gitlab");
        assert_eq!(config.scm.pr_number, 7);
        assert_eq!(config.scm.max_diff_size, 4096);
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.review.prompt_type, "security");
        assert_eq!(config.system.log_level, "debug");
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.scm.platform, "github");
        assert_eq!(config.llm.model, "gemini-2.0-flash");
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(Config::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn validate_reports_every_missing_field() {
        let err = Config::default().validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("scm.token"));
        assert!(msg.contains("scm.owner"));
        assert!(msg.contains("scm.repo"));
        assert!(msg.contains("scm.pr_number"));
        assert!(msg.contains("llm.api_key"));
    }

    #[test]
    fn validate_accepts_complete_config() {
        let mut config = Config::default();
        config.scm.token = "tok".into();
        config.scm.owner = "owner".into();
        config.scm.repo = "repo".into();
        config.scm.pr_number = 1;
        config.llm.api_key = "key".into();
        assert!(config.validate().is_ok());
    }

    // The only test in this binary that touches these variables, so it can
    // run in parallel with the rest.
    #[test]
    fn env_overrides_apply_on_top_of_defaults() {
        std::env::set_var("GIT_PLATFORM", "gitlab");
        std::env::set_var("GIT_PR_ID", "42");
        std::env::set_var("AI_TEMPERATURE", "0.9");
        std::env::set_var("SYSTEM_TIMEOUT", "15");

        let mut config = Config::default();
        config.apply_env().unwrap();

        assert_eq!(config.scm.platform, "gitlab");
        assert_eq!(config.scm.pr_number, 42);
        assert_eq!(config.llm.temperature, 0.9);
        assert_eq!(config.system.timeout_secs, 15);

        std::env::set_var("GIT_PR_ID", "not-a-number");
        let err = config.apply_env().unwrap_err();
        assert!(err.to_string().contains("GIT_PR_ID"));

        std::env::remove_var("GIT_PLATFORM");
        std::env::remove_var("GIT_PR_ID");
        std::env::remove_var("AI_TEMPERATURE");
        std::env::remove_var("SYSTEM_TIMEOUT");
    }
}
