use super::adapter::CustomEngine;
use super::config::EngineOptions;
use super::executor::{Batching, RequestExecutor};
use super::fetcher::Fetcher;
use crate::batch::{LengthPolicy, RowPacker};
use crate::host::{tracing_host, Host};
use crate::resilience::RateLimit;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;

/// Builder for [`CustomEngine`].
///
/// Rate limiting and batching are off unless configured here or through env:
/// - `ENGINE_RATE_REQUESTS` and `ENGINE_RATE_SECONDS` (both required)
/// - `ENGINE_MAX_BATCH_SIZE`
///
/// [`without_env`](Self::without_env) turns every env fallback off.
pub struct EngineBuilder {
    fetcher: Arc<dyn Fetcher>,
    use_env: bool,
    options: Option<EngineOptions>,
    host: Arc<dyn Host>,
    rate_limit: Option<RateLimit>,
    batching: Option<Batching>,
}

impl EngineBuilder {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            use_env: true,
            options: None,
            host: tracing_host(),
            rate_limit: None,
            batching: None,
        }
    }

    /// Use these options instead of reading `ENGINE_*` variables.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Ignore `ENGINE_*` variables; unset settings take their defaults.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = host;
        self
    }

    pub fn with_rate_limit(mut self, limit: RateLimit) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    /// Provider cap on items per call.
    pub fn with_max_batch_size(mut self, n: usize) -> Self {
        self.batching = Some(Batching::Chunked(n));
        self
    }

    /// Pack rows under a length budget measured by `policy`.
    pub fn with_length_budget(mut self, max_length: usize, policy: Arc<dyn LengthPolicy>) -> Self {
        self.batching = Some(Batching::Packed(RowPacker::new(max_length, policy)));
        self
    }

    pub fn build(self) -> Result<CustomEngine> {
        let options = match self.options {
            Some(options) => options,
            None if self.use_env => EngineOptions::from_env()?,
            None => EngineOptions::new(),
        };

        let rate_limit = match self.rate_limit {
            Some(limit) => Some(limit),
            None if self.use_env => env_rate_limit()?,
            None => None,
        };

        let batching = match self.batching {
            Some(batching) => batching,
            None if self.use_env => env_parse::<usize>("ENGINE_MAX_BATCH_SIZE")?
                .map(Batching::Chunked)
                .unwrap_or_default(),
            None => Batching::default(),
        };
        if let Batching::Chunked(0) = batching {
            return Err(Error::configuration_with_context(
                "max batch size must be at least 1",
                ErrorContext::new().with_field_path("max_batch_size"),
            ));
        }

        let mut executor =
            RequestExecutor::new(self.fetcher, self.host.clone()).with_batching(batching);
        if let Some(limit) = rate_limit {
            executor = executor.with_rate_limit(limit);
        }

        Ok(CustomEngine::from_parts(options, executor, self.host))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            Error::configuration_with_context(
                format!("{} is not valid", name),
                ErrorContext::new()
                    .with_field_path(name)
                    .with_details(e.to_string()),
            )
        }),
        Err(_) => Ok(None),
    }
}

fn env_rate_limit() -> Result<Option<RateLimit>> {
    let requests = env_parse::<u32>("ENGINE_RATE_REQUESTS")?;
    let seconds = env_parse::<f64>("ENGINE_RATE_SECONDS")?;
    match (requests, seconds) {
        (Some(requests), Some(seconds)) => RateLimit::new(requests, seconds).map(Some),
        (None, None) => Ok(None),
        _ => Err(Error::configuration(
            "ENGINE_RATE_REQUESTS and ENGINE_RATE_SECONDS must be set together",
        )),
    }
}
