use crate::catalog::{StyleRecord, StyleRepository};
use crate::config::settings::{ProviderKind, SearchSettings};
use crate::config::Config;
use crate::logging::redact_secrets;
use crate::search::error::{ProviderError, SearchError};
use crate::search::fallback::{FallbackChain, Tier};
use crate::search::geo::{GeoDatabase, GeoResolver};
use crate::search::paginate;
use crate::search::providers::{GoogleImageProvider, ImageProvider, PinterestProvider};
use crate::search::rank;
use crate::search::types::{
    ImageResult, ImageSource, Locale, ProviderQuery, SearchRequest, SearchResponse,
};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

const SUGGESTION_SUFFIXES: [&str; 6] = ["dress", "outfit", "style", "fashion", "clothing", "wear"];
const MAX_SUGGESTIONS: usize = 5;

/// Health of one configured provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub provider: ImageSource,
    pub available: bool,
    pub message: String,
}

/// Search aggregator: the single entry point for image searches
#[derive(Clone)]
pub struct ImageSearchService {
    chain: FallbackChain,
    catalog_chain: FallbackChain,
    geo: GeoResolver,
    repository: Option<Arc<dyn StyleRepository>>,
    settings: SearchSettings,
}

impl ImageSearchService {
    pub fn new(chain: FallbackChain, geo: GeoResolver) -> Self {
        let settings = SearchSettings::default();
        Self {
            catalog_chain: FallbackChain::new(Vec::new(), settings.provider_timeout()).without_curated(),
            chain,
            geo,
            repository: None,
            settings,
        }
    }

    /// Build adapters, chains and the geo resolver from configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let deadline = config.search.provider_timeout();

        let primary = config
            .search
            .provider_order
            .iter()
            .map(|kind| build_provider(*kind, config))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let secondary = config
            .search
            .catalog_secondary
            .iter()
            .map(|kind| build_provider(*kind, config))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let database = match config.geo.database_path.as_deref() {
            Some(path) => GeoDatabase::load(Path::new(path))
                .with_context(|| format!("Failed to load geo database: {}", path))?,
            None => GeoDatabase::default(),
        };

        tracing::info!(
            providers = ?config.search.provider_order,
            catalog_secondary = ?config.search.catalog_secondary,
            geo_ranges = database.len(),
            "search service configured"
        );

        Ok(Self {
            chain: FallbackChain::new(primary, deadline),
            catalog_chain: FallbackChain::new(secondary, deadline).without_curated(),
            geo: GeoResolver::new(database, config.geo.default_country.clone()),
            repository: None,
            settings: config.search.clone(),
        })
    }

    /// Providers merged with repository results in [`Self::search_catalog`]
    pub fn with_catalog_chain(mut self, chain: FallbackChain) -> Self {
        self.catalog_chain = chain.without_curated();
        self
    }

    pub fn with_repository(mut self, repository: Arc<dyn StyleRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Answer one search request.
    ///
    /// Provider failures never surface here; only an empty query or a
    /// missing curated tier are reported as errors.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let query = validate_query(&request.query)?;
        let page = request.page.max(1);
        let limit = request.limit.clamp(1, self.settings.max_limit.max(1));
        let country = self.geo.resolve(request.client_address.as_deref());

        tracing::info!(query = %query, page, limit, country = %country, "image search");

        let provider_query = ProviderQuery::new(query, page, limit, Locale::for_country(&country));
        let outcome = self.chain.run(&provider_query).await?;

        let mut images = rank::merge([outcome.images]);
        let total_results = match outcome.tier {
            Tier::Provider { .. } => paginate::estimate_total(outcome.total_results, images.len()),
            Tier::Curated | Tier::Exhausted => {
                let total = outcome.total_results.unwrap_or(images.len() as u64);
                // Local answers hold every result, so page them here
                let skip = paginate::offset(page, limit).min(images.len());
                images.drain(..skip);
                total
            }
        };
        images.truncate(limit as usize);

        let pagination = paginate::paginate(total_results, page, limit);
        let search_method = outcome.tier.search_method();

        tracing::info!(
            query = %query,
            result_count = images.len(),
            total_results = pagination.total_results,
            search_method = %search_method,
            "image search complete"
        );

        Ok(SearchResponse {
            images,
            total_results: pagination.total_results,
            current_page: page,
            total_pages: pagination.total_pages,
            has_next_page: pagination.has_next_page,
            query: query.to_string(),
            country,
            search_method,
        })
    }

    /// Catalog styles matching `query` merged with the secondary providers.
    ///
    /// Either side failing is logged and treated as empty.
    pub async fn search_catalog(&self, query: &str) -> Result<Vec<ImageResult>, SearchError> {
        let query = validate_query(query)?;
        let sample = ProviderQuery::new(
            query,
            1,
            self.settings.default_limit,
            Locale::for_country(self.geo.default_country()),
        );

        let (database, secondary) =
            tokio::join!(self.repository_matches(query), self.catalog_chain.run(&sample));

        let secondary = match secondary {
            Ok(outcome) => outcome.images,
            Err(err) => {
                tracing::warn!(error = %err, "secondary catalog providers failed");
                Vec::new()
            }
        };

        let merged = rank::merge([database, secondary]);
        tracing::info!(query = %query, result_count = merged.len(), "catalog search complete");
        Ok(merged)
    }

    async fn repository_matches(&self, query: &str) -> Vec<ImageResult> {
        let Some(repository) = &self.repository else {
            return Vec::new();
        };
        match repository.search(query).await {
            Ok(records) => records.iter().map(StyleRecord::to_image_result).collect(),
            Err(err) => {
                tracing::warn!(error = %err, "style repository search failed");
                Vec::new()
            }
        }
    }

    /// Query every provider in the main chain with a one-result query
    pub async fn provider_status(&self) -> Vec<ProviderStatus> {
        let sample = ProviderQuery::new(
            "fashion",
            1,
            1,
            Locale::for_country(self.geo.default_country()),
        );
        let deadline = self.chain.deadline();

        let checks = self.chain.providers().iter().map(|provider| {
            let sample = &sample;
            async move {
                let source = provider.source();
                let result = tokio::time::timeout(deadline, provider.search(sample))
                    .await
                    .unwrap_or(Err(ProviderError::Timeout {
                        provider: source.as_str(),
                        after: deadline,
                    }));
                status_from(source, result.map(|_| ()))
            }
        });

        futures::future::join_all(checks).await
    }
}

fn status_from(provider: ImageSource, result: Result<(), ProviderError>) -> ProviderStatus {
    let (available, message) = match result {
        Ok(()) => (true, "Operational".to_string()),
        Err(ProviderError::RateLimited { .. }) => (false, "Daily quota exceeded".to_string()),
        Err(ProviderError::Unavailable { reason, .. }) => (false, reason),
        Err(err) => (false, redact_secrets(&err.to_string())),
    };
    ProviderStatus {
        provider,
        available,
        message,
    }
}

fn build_provider(kind: ProviderKind, config: &Config) -> anyhow::Result<Arc<dyn ImageProvider>> {
    let timeout = config.search.provider_timeout();
    Ok(match kind {
        ProviderKind::Google => Arc::new(GoogleImageProvider::new(config.google.clone(), timeout)?),
        ProviderKind::Pinterest => {
            Arc::new(PinterestProvider::new(config.pinterest.clone(), timeout)?)
        }
    })
}

fn validate_query(query: &str) -> Result<&str, SearchError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::InvalidQuery("Search query is required".to_string()));
    }
    Ok(trimmed)
}

/// Query completions offered while typing
pub fn suggestions(query: &str) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    SUGGESTION_SUFFIXES
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|suffix| format!("{} {}", query, suffix))
        .collect()
}
