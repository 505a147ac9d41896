use std::path::PathBuf;

/// Errors that can occur across the lookout platform.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the
/// boundary.
///
/// # Examples
///
/// ```
/// use lookout_core::Error;
///
/// let err = Error::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// SCM host API or transport failure.
    #[error("SCM error: {0}")]
    Scm(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt template syntax or field lookup failure.
    #[error("template error: {0}")]
    Template(String),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A prompt template was found in neither search tier.
    #[error("prompt '{filename}' not found in local [{}] or system [{system_dir}]", .user_path.display())]
    PromptNotFound {
        /// The `<prompt_type>.md` filename that was searched for.
        filename: String,
        /// Candidate path in the user-configured directory.
        user_path: PathBuf,
        /// System-default directory, empty when the tier was unset.
        system_dir: String,
    },

    /// The shared run deadline expired before the operation completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// An error wrapped with the context of the failing stage or boundary.
    #[error("{context}: {source}")]
    Context {
        /// Name of the failing stage or boundary.
        context: String,
        /// The underlying error, preserved in kind.
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with stage or boundary context, preserving the root
    /// cause.
    ///
    /// # Examples
    ///
    /// ```
    /// use lookout_core::Error;
    ///
    /// let err = Error::Scm("status 502".into()).context("failed to get pull request");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "failed to get pull request: SCM error: status 502"
    /// );
    /// ```
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error is the shared deadline expiring, at any wrap depth.
    ///
    /// Lets callers tell "timed out" apart from "host rejected" after the
    /// engine has added stage context.
    ///
    /// # Examples
    ///
    /// ```
    /// use lookout_core::Error;
    ///
    /// let err = Error::DeadlineExceeded.context("failed to generate review");
    /// assert!(err.is_deadline_exceeded());
    /// assert!(!Error::Scm("503".into()).is_deadline_exceeded());
    /// ```
    pub fn is_deadline_exceeded(&self) -> bool {
        match self {
            Error::DeadlineExceeded => true,
            Error::Context { source, .. } => source.is_deadline_exceeded(),
            _ => false,
        }
    }

    /// The innermost error beneath any context wrapping.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
