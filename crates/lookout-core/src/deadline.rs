use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::Error;

/// The shared wall-clock bound for one review run.
///
/// One `Deadline` is created per run and passed through every external
/// call boundary (file reads aside, that is: SCM metadata, SCM diff, LLM
/// generation, comment post). Each call runs under [`Deadline::bound`],
/// so all of them observe the same cancellation signal instead of
/// establishing independent timeouts.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use lookout_core::Deadline;
///
/// let deadline = Deadline::within(Duration::from_secs(30));
/// assert!(!deadline.expired());
/// assert!(!Deadline::unbounded().expired());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn unbounded() -> Self {
        Self { at: None }
    }

    /// A deadline `timeout` from now.
    pub fn within(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    /// Whether the deadline has already passed.
    pub fn expired(&self) -> bool {
        match self.at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }

    /// Run `fut` under this deadline.
    ///
    /// An already-expired deadline fails without polling `fut`, so no
    /// network traffic is started once the run is out of time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeadlineExceeded`] when the deadline passes before
    /// `fut` completes; otherwise the future's own result.
    pub async fn bound<T, F>(&self, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if self.expired() {
            return Err(Error::DeadlineExceeded);
        }
        match self.at {
            Some(at) => match tokio::time::timeout_at(at, fut).await {
                Ok(result) => result,
                Err(_) => Err(Error::DeadlineExceeded),
            },
            None => fut.await,
        }
    }
}
