//! Fallback chain controller
//!
//! Providers are tried strictly one after another. A later provider is only
//! called once the previous one has failed or come back empty, so paid quota
//! is not spent on sources that were not needed. Provider failures are logged
//! and absorbed; when every provider is exhausted the chain answers from the
//! curated sets instead.

use crate::search::curated::CuratedFallback;
use crate::search::error::{ProviderError, SearchError};
use crate::search::providers::ImageProvider;
use crate::search::types::{ImageResult, ImageSource, ProviderPage, ProviderQuery};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Controller state, traced on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Idle,
    TryingProvider(usize),
    Success,
    ExhaustedFallback,
}

/// Which tier of the chain produced the results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Provider at `index` in the chain answered
    Provider { index: usize, source: ImageSource },
    /// Every provider failed or was empty
    Curated,
    /// Every provider failed or was empty and no curated tier was configured
    Exhausted,
}

impl Tier {
    /// Value reported as `searchMethod`
    pub fn search_method(&self) -> String {
        match self {
            Tier::Provider { index: 0, source } => format!("{}-primary", source),
            Tier::Provider { source, .. } => format!("{}-fallback", source),
            Tier::Curated => "curated-fallback".to_string(),
            Tier::Exhausted => "none".to_string(),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.search_method())
    }
}

/// Result of running the chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    pub images: Vec<ImageResult>,
    /// Total reported by the answering provider
    pub total_results: Option<u64>,
    pub tier: Tier,
}

/// What a single provider attempt ended with
#[derive(Debug)]
enum Attempt {
    Answered(ProviderPage),
    Empty,
    Failed(ProviderError),
}

/// Ordered list of providers with a curated last resort
#[derive(Clone)]
pub struct FallbackChain {
    providers: Vec<Arc<dyn ImageProvider>>,
    curated: Option<CuratedFallback>,
    deadline: Duration,
}

impl FallbackChain {
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>, deadline: Duration) -> Self {
        Self {
            providers,
            curated: Some(CuratedFallback::default()),
            deadline,
        }
    }

    /// Replace the curated tier
    pub fn with_curated(mut self, curated: CuratedFallback) -> Self {
        self.curated = Some(curated);
        self
    }

    /// Drop the curated tier: an exhausted chain then yields an empty outcome
    pub fn without_curated(mut self) -> Self {
        self.curated = None;
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn providers(&self) -> &[Arc<dyn ImageProvider>] {
        &self.providers
    }

    /// Time allowed for each provider call
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run the chain for one query.
    ///
    /// Only fails when the curated tier is enabled but has nothing to offer
    /// for a non-empty query.
    pub async fn run(&self, query: &ProviderQuery) -> Result<ChainOutcome, SearchError> {
        let mut state = ChainState::Idle;
        tracing::debug!(query = %query.query, providers = self.providers.len(), state = ?state, "fallback chain start");

        for (index, provider) in self.providers.iter().enumerate() {
            state = ChainState::TryingProvider(index);
            let source = provider.source();
            tracing::debug!(provider = %source, state = ?state, "trying provider");

            match self.attempt(provider.as_ref(), query).await {
                Attempt::Answered(page) => {
                    state = ChainState::Success;
                    tracing::info!(
                        provider = %source,
                        result_count = page.images.len(),
                        state = ?state,
                        "provider answered"
                    );
                    return Ok(ChainOutcome {
                        images: page.images,
                        total_results: page.total_results,
                        tier: Tier::Provider { index, source },
                    });
                }
                Attempt::Empty => {
                    tracing::info!(provider = %source, "provider returned no results, advancing");
                }
                Attempt::Failed(err) => {
                    tracing::warn!(
                        provider = %source,
                        error = %crate::logging::redact_secrets(&err.to_string()),
                        "provider failed, advancing"
                    );
                }
            }
        }

        state = ChainState::ExhaustedFallback;
        tracing::info!(query = %query.query, state = ?state, "all providers exhausted");

        let Some(curated) = &self.curated else {
            return Ok(ChainOutcome {
                images: Vec::new(),
                total_results: Some(0),
                tier: Tier::Exhausted,
            });
        };

        let images = curated.results_for(&query.query);
        if images.is_empty() {
            tracing::error!(
                query = %query.query,
                page = query.page,
                limit = query.limit,
                providers = self.providers.len(),
                "curated fallback produced no results"
            );
            return Err(SearchError::Internal(
                "no provider or curated results available".to_string(),
            ));
        }

        let total = images.len() as u64;
        Ok(ChainOutcome {
            images,
            total_results: Some(total),
            tier: Tier::Curated,
        })
    }

    async fn attempt(&self, provider: &dyn ImageProvider, query: &ProviderQuery) -> Attempt {
        let source = provider.source();
        match tokio::time::timeout(self.deadline, provider.search(query)).await {
            Ok(Ok(page)) if page.is_empty() => Attempt::Empty,
            Ok(Ok(page)) => Attempt::Answered(page),
            Ok(Err(err)) => Attempt::Failed(err),
            Err(_) => Attempt::Failed(ProviderError::Timeout {
                provider: source.as_str(),
                after: self.deadline,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_method_names_tier() {
        let primary = Tier::Provider { index: 0, source: ImageSource::Google };
        let second = Tier::Provider { index: 1, source: ImageSource::Pinterest };
        assert_eq!(primary.search_method(), "google-primary");
        assert_eq!(second.search_method(), "pinterest-fallback");
        assert_eq!(Tier::Curated.search_method(), "curated-fallback");
    }

    #[tokio::test]
    async fn test_empty_chain_goes_straight_to_curated() {
        let chain = FallbackChain::new(Vec::new(), Duration::from_secs(1));
        let q = ProviderQuery::new("suit", 1, 10, crate::search::types::Locale::for_country("NG"));
        let outcome = chain.run(&q).await.unwrap();
        assert_eq!(outcome.tier, Tier::Curated);
        assert_eq!(outcome.images.len(), 3);
        assert_eq!(outcome.total_results, Some(3));
    }

    #[tokio::test]
    async fn test_empty_curated_set_is_internal_error() {
        let chain = FallbackChain::new(Vec::new(), Duration::from_secs(1))
            .with_curated(CuratedFallback::new(Vec::new(), Vec::new()));
        let q = ProviderQuery::new("suit", 1, 10, crate::search::types::Locale::for_country("NG"));
        assert!(matches!(chain.run(&q).await, Err(SearchError::Internal(_))));
    }
}
