use std::path::{Path, PathBuf};

use lookout_core::{Error, Result};

/// Environment variable naming the system-default prompt directory
/// (e.g. `/etc/lookout/defaults`). Unset or empty means "no second tier".
pub const SYSTEM_PROMPT_DIR_ENV: &str = "LOOKOUT_SYSTEM_PROMPTS";

/// Resolve the prompt template named `prompt_type` to a path on disk.
///
/// Searches `user_dir` first (explicit user configuration wins), then the
/// directory named by [`SYSTEM_PROMPT_DIR_ENV`].
///
/// # Errors
///
/// Returns [`Error::PromptNotFound`] naming both candidate paths when the
/// file exists in neither tier.
pub fn resolve(user_dir: &Path, prompt_type: &str) -> Result<PathBuf> {
    let system_dir = std::env::var(SYSTEM_PROMPT_DIR_ENV).unwrap_or_default();
    let system_dir = (!system_dir.is_empty()).then(|| PathBuf::from(system_dir));
    resolve_in(user_dir, system_dir.as_deref(), prompt_type)
}

/// [`resolve`] with the search tiers supplied explicitly.
///
/// The tiers are an ordered sequence evaluated front to back,
/// short-circuiting on the first existing match; adding a third tier is a
/// one-line change.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use lookout_review::prompt::resolve_in;
///
/// let err = resolve_in(Path::new("/nonexistent"), None, "general").unwrap_err();
/// assert!(err.to_string().contains("general.md"));
/// ```
pub fn resolve_in(
    user_dir: &Path,
    system_dir: Option<&Path>,
    prompt_type: &str,
) -> Result<PathBuf> {
    let filename = format!("{prompt_type}.md");

    let tiers = [Some(user_dir), system_dir];
    for dir in tiers.into_iter().flatten() {
        let candidate = dir.join(&filename);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(Error::PromptNotFound {
        user_path: user_dir.join(&filename),
        system_dir: system_dir
            .map(|d| d.display().to_string())
            .unwrap_or_default(),
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_prompt(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn user_tier_wins_when_both_exist() {
        let user = tempfile::tempdir().unwrap();
        let system = tempfile::tempdir().unwrap();
        write_prompt(user.path(), "general.md", "user prompt");
        write_prompt(system.path(), "general.md", "system prompt");

        let path = resolve_in(user.path(), Some(system.path()), "general").unwrap();
        assert_eq!(path, user.path().join("general.md"));
    }

    #[test]
    fn system_tier_is_the_fallback() {
        let user = tempfile::tempdir().unwrap();
        let system = tempfile::tempdir().unwrap();
        write_prompt(system.path(), "general.md", "system prompt");

        let path = resolve_in(user.path(), Some(system.path()), "general").unwrap();
        assert_eq!(path, system.path().join("general.md"));
    }

    #[test]
    fn missing_everywhere_names_both_candidates() {
        let user = tempfile::tempdir().unwrap();
        let system = tempfile::tempdir().unwrap();

        let err = resolve_in(user.path(), Some(system.path()), "security").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("security.md"));
        assert!(msg.contains(&user.path().join("security.md").display().to_string()));
        assert!(msg.contains(&system.path().display().to_string()));
    }

    #[test]
    fn absent_system_tier_is_not_an_error_kind() {
        let user = tempfile::tempdir().unwrap();
        write_prompt(user.path(), "general.md", "user prompt");

        let path = resolve_in(user.path(), None, "general").unwrap();
        assert_eq!(path, user.path().join("general.md"));

        let err = resolve_in(user.path(), None, "missing").unwrap_err();
        assert!(matches!(err, Error::PromptNotFound { .. }));
    }

    // The only test in this binary that sets the env var. Uses a template
    // name no other test resolves, so concurrent tests never see this tier.
    #[test]
    fn resolve_reads_the_system_tier_from_the_environment() {
        let user = tempfile::tempdir().unwrap();
        let system = tempfile::tempdir().unwrap();
        write_prompt(system.path(), "env-tier.md", "system prompt");

        std::env::set_var(SYSTEM_PROMPT_DIR_ENV, system.path());
        let path = resolve(user.path(), "env-tier").unwrap();
        std::env::remove_var(SYSTEM_PROMPT_DIR_ENV);

        assert_eq!(path, system.path().join("env-tier.md"));
    }
}
