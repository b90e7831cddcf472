//! The engine as the host sees it: `translate`, `abort`, `init` and option
//! access, backed by a [`RequestExecutor`].

use super::builder::EngineBuilder;
use super::callbacks::TranslateCallbacks;
use super::config::{ApiType, EngineOptions};
use super::executor::RequestExecutor;
use super::fetcher::Fetcher;
use crate::host::Host;
use crate::resilience::Progress;
use crate::types::TranslationUnit;
use crate::Result;
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tracing::{info, warn};

pub const MISSING_API_KEY_ALERT: &str = "No API key specified!";

/// What a `translate` call ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateOutcome {
    /// `on_after_loading` received this many rows.
    Translated(usize),
    /// `on_error` was called.
    Failed,
    /// No key configured; nothing was sent and no callback fired.
    Aborted,
}

pub struct CustomEngine {
    options: RwLock<EngineOptions>,
    executor: RequestExecutor,
    host: Arc<dyn Host>,
}

impl CustomEngine {
    pub(crate) fn from_parts(
        options: EngineOptions,
        executor: RequestExecutor,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            options: RwLock::new(options),
            executor,
            host,
        }
    }

    pub fn builder(fetcher: Arc<dyn Fetcher>) -> EngineBuilder {
        EngineBuilder::new(fetcher)
    }

    fn read_options(&self) -> RwLockReadGuard<'_, EngineOptions> {
        self.options.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current options.
    pub fn options(&self) -> EngineOptions {
        self.read_options().clone()
    }

    pub fn api_key(&self) -> Option<String> {
        self.read_options().api_key().map(str::to_string)
    }

    pub fn target_language(&self) -> String {
        self.read_options().target_language().to_string()
    }

    pub fn api_type(&self) -> ApiType {
        self.read_options().api_type()
    }

    pub fn timeout(&self) -> f64 {
        self.read_options().timeout()
    }

    pub fn get_option(&self, name: &str) -> Result<Value> {
        self.read_options().get(name)
    }

    pub fn update(&self, option: &str, value: Value) -> Result<()> {
        self.options
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .update(option, value)
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn progress(&self) -> Progress {
        self.executor.progress()
    }

    pub fn init(&self) {
        self.host.init();
    }

    /// Stop the host's job and close the rate window.
    ///
    /// Work already suspended (a fetch, a quota wait) is not interrupted.
    pub fn abort(&self) {
        self.host.abort_translation();
        self.clear();
    }

    fn clear(&self) {
        self.executor.abort();
    }

    /// Run `items` through the executor with the current options.
    pub async fn execute(&self, items: Vec<String>) -> Result<TranslationUnit> {
        let options = self.options();
        self.executor.execute(items, &options).await
    }

    /// Host entry point: translate `items` and report through `callbacks`.
    pub async fn translate<C>(&self, items: Vec<String>, callbacks: &C) -> TranslateOutcome
    where
        C: TranslateCallbacks + ?Sized,
    {
        if self.api_key().is_none() {
            self.host.alert(MISSING_API_KEY_ALERT);
            self.abort();
            return TranslateOutcome::Aborted;
        }

        self.host.log(&format!("\n\nBatch size: {}", items.len()));
        let outcome = match self.execute(items).await {
            Ok(unit) => {
                let rows = unit.len();
                info!(rows, "translation batch loaded");
                callbacks.on_after_loading(unit);
                TranslateOutcome::Translated(rows)
            }
            Err(err) => {
                let failure = err.into_failure();
                if !failure.is_expected() {
                    warn!(error = %failure, "unexpected translation failure");
                    let detail = failure.detail.as_deref().unwrap_or(failure.message.as_str());
                    self.host.log(detail);
                }
                callbacks.on_error(&failure, &failure.message);
                TranslateOutcome::Failed
            }
        };
        callbacks.always();
        outcome
    }
}
