//! Request executor: runs planned batches through the rate window and the
//! timeout racer, one at a time.

use super::config::EngineOptions;
use super::fetcher::Fetcher;
use crate::batch::{chunk, RowPacker};
use crate::error::TranslationFailure;
use crate::host::Host;
use crate::resilience::{Progress, RateLimit, RateLimitWindow, TimeoutRacer};
use crate::types::TranslationUnit;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// How an input sequence is split into provider calls.
#[derive(Debug, Clone, Default)]
pub enum Batching {
    /// Send everything in one call.
    #[default]
    Whole,
    /// At most this many items per call.
    Chunked(usize),
    /// Length-budgeted packing.
    Packed(RowPacker),
}

pub struct RequestExecutor {
    fetcher: Arc<dyn Fetcher>,
    window: RateLimitWindow,
    rate_limit: Option<RateLimit>,
    batching: Batching,
}

impl RequestExecutor {
    pub fn new(fetcher: Arc<dyn Fetcher>, host: Arc<dyn Host>) -> Self {
        Self {
            fetcher,
            window: RateLimitWindow::with_host(host),
            rate_limit: None,
            batching: Batching::Whole,
        }
    }

    pub fn with_rate_limit(mut self, limit: RateLimit) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    pub fn with_batching(mut self, batching: Batching) -> Self {
        self.batching = batching;
        self
    }

    pub fn rate_limit(&self) -> Option<&RateLimit> {
        self.rate_limit.as_ref()
    }

    pub fn batching(&self) -> &Batching {
        &self.batching
    }

    pub fn progress(&self) -> Progress {
        self.window.progress()
    }

    /// Close the rate window. In-flight work is left to finish on its own.
    pub fn abort(&self) {
        self.window.abort();
    }

    pub fn plan(&self, items: Vec<String>) -> Result<Vec<Vec<String>>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        match &self.batching {
            Batching::Whole => Ok(vec![items]),
            Batching::Chunked(n) => Ok(chunk(items, *n)?.into_batches()),
            Batching::Packed(packer) => packer.pack(items),
        }
    }

    /// Translate `items`, batch by batch, and merge the results in order.
    ///
    /// Stops at the first failing batch.
    pub async fn execute(
        &self,
        items: Vec<String>,
        options: &EngineOptions,
    ) -> Result<TranslationUnit> {
        let batches = self.plan(items)?;
        debug!(batches = batches.len(), "executing translation request");

        let mut units = Vec::with_capacity(batches.len());
        for batch in batches {
            let unit = match &self.rate_limit {
                Some(limit) => self.execute_with_rate_limit(batch, limit, options).await?,
                None => self.build_translation_result(batch, options).await?,
            };
            units.push(unit);
        }

        if units.len() == 1 {
            return Ok(units.remove(0));
        }
        Ok(TranslationUnit::merge(units))
    }

    pub async fn execute_with_rate_limit(
        &self,
        batch: Vec<String>,
        limit: &RateLimit,
        options: &EngineOptions,
    ) -> Result<TranslationUnit> {
        self.window.acquire(limit).await;
        self.build_translation_result(batch, options).await
    }

    /// One provider call, raced against the configured timeout.
    pub async fn build_translation_result(
        &self,
        batch: Vec<String>,
        options: &EngineOptions,
    ) -> Result<TranslationUnit> {
        let racer = TimeoutRacer::from_secs(options.timeout());
        let translation = racer.race(self.fetcher.fetch(&batch, options)).await?;

        if translation.len() != batch.len() {
            return Err(TranslationFailure::new(format!(
                "Provider returned {} translations for {} rows",
                translation.len(),
                batch.len()
            ))
            .with_status("length_mismatch")
            .into());
        }
        Ok(TranslationUnit::new(batch, translation))
    }
}
