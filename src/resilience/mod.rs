//! Execution guards wrapped around every provider call.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`rate_window`] | N-requests-per-S-seconds window with a blocking wait |
//! | [`timeout`] | Races a request against a wall-clock timeout |
//!
//! ```rust
//! use custom_engine::resilience::{RateLimit, RateLimitWindow};
//!
//! # async fn demo() -> custom_engine::Result<()> {
//! let limit = RateLimit::new(3, 1.0)?;
//! let window = RateLimitWindow::new();
//! window.acquire(&limit).await;
//! # Ok(())
//! # }
//! ```

pub mod rate_window;
pub mod timeout;

pub use rate_window::{Progress, RateLimit, RateLimitWindow};
pub use timeout::TimeoutRacer;
