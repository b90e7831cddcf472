use crate::error::TranslationFailure;
use crate::Result;
use std::future::Future;
use std::time::Duration;

/// Races a request against a wall-clock timeout.
///
/// A zero (or non-finite) timeout disables the race entirely. When the timer
/// wins, the request future is dropped and the caller gets
/// [`TranslationFailure::timed_out`]. When the request wins, the timer is
/// dropped with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeoutRacer {
    timeout: Option<Duration>,
}

impl TimeoutRacer {
    pub fn disabled() -> Self {
        Self { timeout: None }
    }

    /// Build from a timeout in seconds; `0` means no timeout.
    ///
    /// Values too large for a [`Duration`] also disable the race.
    pub fn from_secs(secs: f64) -> Self {
        let timeout = if secs > 0.0 {
            Duration::try_from_secs_f64(secs).ok()
        } else {
            None
        };
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_enabled(&self) -> bool {
        self.timeout.is_some()
    }

    pub async fn race<T, F>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let Some(limit) = self.timeout else {
            return request.await;
        };

        match tokio::time::timeout(limit, request).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = limit.as_millis() as u64, "request timed out");
                Err(TranslationFailure::timed_out().into())
            }
        }
    }
}
