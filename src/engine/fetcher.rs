//! The fetch collaborator: turns a batch of source rows into translations.

use super::config::EngineOptions;
use crate::error::TranslationFailure;
use crate::Result;
use async_trait::async_trait;
use std::future::Future;

/// One provider call for one batch.
///
/// Implementations return exactly one translation per source row, in order.
/// Options are passed in so a fetcher can read the key, target language and
/// account tier the engine is currently configured with.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, items: &[String], options: &EngineOptions) -> Result<Vec<String>>;
}

/// Placeholder for engines that haven't wired a provider yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedFetcher;

#[async_trait]
impl Fetcher for UnimplementedFetcher {
    async fn fetch(&self, _items: &[String], _options: &EngineOptions) -> Result<Vec<String>> {
        Err(TranslationFailure::new("Non implemented method!")
            .with_detail("UnimplementedFetcher::fetch was invoked; supply a Fetcher for this engine")
            .into())
    }
}

/// Fetcher backed by an async closure.
pub struct FnFetcher<F> {
    func: F,
}

impl<F, Fut> FnFetcher<F>
where
    F: Fn(Vec<String>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<String>>> + Send,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> Fetcher for FnFetcher<F>
where
    F: Fn(Vec<String>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<String>>> + Send,
{
    async fn fetch(&self, items: &[String], _options: &EngineOptions) -> Result<Vec<String>> {
        (self.func)(items.to_vec()).await
    }
}
