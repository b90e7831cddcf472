//! Translation engine runtime.
//!
//! Keep the public surface small: a [`CustomEngine`] built from a
//! [`Fetcher`] via [`EngineBuilder`], driven by the host through
//! `translate` / `abort` / `init`. Implementation details live in
//! `src/engine/`.

pub mod adapter;
pub mod builder;
pub mod callbacks;
pub mod config;
pub mod executor;
pub mod fetcher;

pub use adapter::{CustomEngine, TranslateOutcome, MISSING_API_KEY_ALERT};
pub use builder::EngineBuilder;
pub use callbacks::{FnCallbacks, TranslateCallbacks};
pub use config::{ApiType, EngineOptions, DEFAULT_TARGET_LANGUAGE};
pub use executor::{Batching, RequestExecutor};
pub use fetcher::{Fetcher, FnFetcher, UnimplementedFetcher};
