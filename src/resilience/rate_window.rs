use crate::host::{tracing_host, Host};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Call quota: at most `requests` calls per `seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRateLimit")]
pub struct RateLimit {
    requests: u32,
    seconds: f64,
    #[serde(skip_serializing)]
    window: Duration,
}

#[derive(Deserialize)]
struct RawRateLimit {
    requests: u32,
    seconds: f64,
}

impl TryFrom<RawRateLimit> for RateLimit {
    type Error = Error;

    fn try_from(raw: RawRateLimit) -> Result<Self> {
        RateLimit::new(raw.requests, raw.seconds)
    }
}

impl RateLimit {
    pub fn new(requests: u32, seconds: f64) -> Result<Self> {
        if requests == 0 {
            return Err(Error::validation_with_context(
                "rate limit must allow at least one request",
                ErrorContext::new()
                    .with_field_path("rate_limit.requests")
                    .with_source("rate_limit"),
            ));
        }
        let window = match Duration::try_from_secs_f64(seconds) {
            Ok(window) if !window.is_zero() => window,
            _ => {
                return Err(Error::validation_with_context(
                    "rate limit window must be a positive number of seconds",
                    ErrorContext::new()
                        .with_field_path("rate_limit.seconds")
                        .with_details(format!("got {}", seconds))
                        .with_source("rate_limit"),
                ))
            }
        };
        Ok(Self {
            requests,
            seconds,
            window,
        })
    }

    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Bookkeeping for the current quota window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Progress {
    #[default]
    WindowClosed,
    /// `step` counts calls made since `start_time`, plus one.
    WindowOpen { step: u32, start_time: Instant },
}

impl Progress {
    pub fn is_open(&self) -> bool {
        matches!(self, Progress::WindowOpen { .. })
    }

    pub fn step(&self) -> Option<u32> {
        match self {
            Progress::WindowOpen { step, .. } => Some(*step),
            Progress::WindowClosed => None,
        }
    }
}

/// Blocking-wait window limiter.
///
/// Once a window has used up its quota the next caller sleeps until the
/// whole window has elapsed since it opened; the call after that opens a
/// fresh window. The quota check is `step > requests`, so a window admits
/// `requests + 1` calls before throttling.
pub struct RateLimitWindow {
    progress: Mutex<Progress>,
    host: Arc<dyn Host>,
}

impl Default for RateLimitWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitWindow {
    pub fn new() -> Self {
        Self::with_host(tracing_host())
    }

    pub fn with_host(host: Arc<dyn Host>) -> Self {
        Self {
            progress: Mutex::new(Progress::WindowClosed),
            host,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wait (if needed) for permission to make one call.
    ///
    /// Returns how long the caller was held back, `None` if it wasn't.
    pub async fn acquire(&self, limit: &RateLimit) -> Option<Duration> {
        let wait = {
            let mut progress = self.lock();
            match *progress {
                Progress::WindowClosed => {
                    *progress = Progress::WindowOpen {
                        step: 1,
                        start_time: Instant::now(),
                    };
                    tracing::debug!(
                        requests = limit.requests,
                        seconds = limit.seconds,
                        "rate window opened"
                    );
                    None
                }
                Progress::WindowOpen { step, start_time } if step > limit.requests => {
                    let remaining = limit.window().saturating_sub(start_time.elapsed());
                    *progress = Progress::WindowClosed;
                    Some(remaining)
                }
                Progress::WindowOpen { .. } => None,
            }
        };

        if let Some(remaining) = wait {
            tracing::info!(wait_ms = remaining.as_millis() as u64, "rate window exhausted");
            self.host
                .log(&format!("Waiting {}s...", remaining.as_secs_f64()));
            tokio::time::sleep(remaining).await;
        }

        if let Progress::WindowOpen { step, .. } = &mut *self.lock() {
            *step += 1;
        }
        wait
    }

    /// Close the window unconditionally.
    ///
    /// A caller already sleeping in [`acquire`](Self::acquire) keeps sleeping.
    pub fn abort(&self) {
        *self.lock() = Progress::WindowClosed;
    }

    pub fn progress(&self) -> Progress {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    fn limit(requests: u32, seconds: f64) -> RateLimit {
        RateLimit::new(requests, seconds).unwrap()
    }

    #[test]
    fn test_rate_limit_validation() {
        assert!(RateLimit::new(0, 1.0).is_err());
        assert!(RateLimit::new(1, 0.0).is_err());
        assert!(RateLimit::new(1, -2.0).is_err());
        assert!(RateLimit::new(1, f64::NAN).is_err());
        assert!(RateLimit::new(1, f64::INFINITY).is_err());
        assert!(RateLimit::new(1, 1e20).is_err());
        assert!(RateLimit::new(1, 1e-12).is_err());
        let l = limit(5, 2.5);
        assert_eq!(l.requests(), 5);
        assert_eq!(l.window(), Duration::from_millis(2500));
    }

    #[test]
    fn test_rate_limit_deserialize_validates() {
        let l: RateLimit = serde_json::from_str(r#"{"requests":3,"seconds":1}"#).unwrap();
        assert_eq!(l, limit(3, 1.0));
        assert!(serde_json::from_str::<RateLimit>(r#"{"requests":0,"seconds":1}"#).is_err());
        assert!(serde_json::from_str::<RateLimit>(r#"{"requests":1,"seconds":1e20}"#).is_err());
        assert_eq!(
            serde_json::to_value(limit(3, 1.5)).unwrap(),
            serde_json::json!({"requests": 3, "seconds": 1.5})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fourth_call_waits_out_the_window() {
        let host = Arc::new(RecordingHost::new());
        let window = RateLimitWindow::with_host(host.clone());
        let l = limit(3, 1.0);

        assert_eq!(window.acquire(&l).await, None);
        assert_eq!(window.progress().step(), Some(2));
        assert_eq!(window.acquire(&l).await, None);
        assert_eq!(window.acquire(&l).await, None);
        assert_eq!(window.progress().step(), Some(4));

        let started = Instant::now();
        let waited = window.acquire(&l).await;
        assert_eq!(waited, Some(Duration::from_secs(1)));
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(window.progress(), Progress::WindowClosed);
        assert_eq!(host.logs(), vec!["Waiting 1s...".to_string()]);

        // the call after the wait opens a fresh window
        assert_eq!(window.acquire(&l).await, None);
        assert_eq!(window.progress().step(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_is_remaining_window_time() {
        let window = RateLimitWindow::new();
        let l = limit(2, 1.0);

        assert_eq!(window.acquire(&l).await, None);
        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(window.acquire(&l).await, None);
        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(window.acquire(&l).await, Some(Duration::from_millis(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_once_window_elapsed() {
        let window = RateLimitWindow::new();
        let l = limit(2, 1.0);

        window.acquire(&l).await;
        window.acquire(&l).await;
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(window.acquire(&l).await, Some(Duration::ZERO));
        assert!(!window.progress().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_resets_progress() {
        let window = RateLimitWindow::new();
        let l = limit(3, 1.0);

        window.acquire(&l).await;
        window.acquire(&l).await;
        window.acquire(&l).await;
        assert_eq!(window.progress().step(), Some(4));

        window.abort();
        assert_eq!(window.progress(), Progress::WindowClosed);

        // fresh window instead of the throttled fourth call
        assert_eq!(window.acquire(&l).await, None);
        assert_eq!(window.progress().step(), Some(2));
    }
}
