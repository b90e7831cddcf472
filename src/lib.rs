//! # custom-engine
//!
//! Execution layer for translation engines that talk to a rate-limited,
//! possibly slow provider.
//!
//! ## Overview
//!
//! The provider call itself is delegated to a [`Fetcher`]. Around it this
//! crate enforces the execution discipline a batch translation job needs:
//!
//! - **Batching**: split input rows into provider-sized requests ([`batch`])
//! - **Windowed rate limiting**: N requests per S seconds with a blocking wait ([`resilience::rate_window`])
//! - **Timeouts**: each request raced against a wall-clock timer ([`resilience::timeout`])
//! - **Host lifecycle**: `translate` / `abort` / `init` with callback reporting ([`engine`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use custom_engine::{CustomEngine, EngineOptions, FnCallbacks, FnFetcher, RateLimit};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> custom_engine::Result<()> {
//!     let fetcher = FnFetcher::new(|rows: Vec<String>| async move {
//!         Ok::<_, custom_engine::Error>(rows)
//!     });
//!     let engine = CustomEngine::builder(Arc::new(fetcher))
//!         .with_options(EngineOptions::new().with_api_key("key").with_timeout(10.0))
//!         .with_rate_limit(RateLimit::new(3, 1.0)?)
//!         .with_max_batch_size(25)
//!         .build()?;
//!
//!     let callbacks = FnCallbacks::new()
//!         .on_after_loading(|unit| println!("{}", unit.translation_text))
//!         .on_error(|_, message| eprintln!("{}", message));
//!     engine.translate(vec!["Hello".into()], &callbacks).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`batch`] | Fixed-size chunking and length-budgeted row packing |
//! | [`resilience`] | Rate window and timeout racer |
//! | [`engine`] | Executor, host adapter, options, fetcher trait |
//! | [`host`] | Host log/alert side channels |
//! | [`transport`] | Generic HTTP fetcher |
//! | [`types`] | Translation result types |

pub mod batch;
pub mod engine;
pub mod host;
pub mod resilience;
pub mod transport;
pub mod types;

pub use engine::{
    ApiType, CustomEngine, EngineBuilder, EngineOptions, Fetcher, FnCallbacks, FnFetcher,
    TranslateCallbacks, TranslateOutcome, UnimplementedFetcher,
};
pub use error::{FailureStatus, TranslationFailure};
pub use host::{Host, RecordingHost, TracingHost};
pub use resilience::{Progress, RateLimit, RateLimitWindow, TimeoutRacer};
pub use transport::HttpFetcher;
pub use types::TranslationUnit;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
