use crate::config::settings::PinterestSettings;
use crate::search::error::ProviderError;
use crate::search::normalize::{self, RawPayload};
use crate::search::providers::{snippet, ImageProvider};
use crate::search::types::{ImageSource, ProviderPage, ProviderQuery};
use anyhow::Context;
use std::time::Duration;

const PROVIDER: &str = "pinterest";

/// Pinterest pin search, scraped from the public RSS/HTML search page
///
/// Pagination is a plain page number. The page reports no total, so the
/// aggregator estimates one.
pub struct PinterestProvider {
    client: reqwest::Client,
    settings: PinterestSettings,
    timeout: Duration,
}

impl PinterestProvider {
    pub fn new(settings: PinterestSettings, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build Pinterest HTTP client")?;

        Ok(Self {
            client,
            settings,
            timeout,
        })
    }

    pub fn request_params(&self, query: &ProviderQuery) -> Vec<(&'static str, String)> {
        vec![
            ("q", query.query.trim().to_string()),
            ("page", query.page.to_string()),
            ("source_id", "rss".to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl ImageProvider for PinterestProvider {
    fn source(&self) -> ImageSource {
        ImageSource::Pinterest
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        if !self.settings.enabled {
            return Err(ProviderError::Unavailable {
                provider: PROVIDER,
                reason: "disabled in configuration".to_string(),
            });
        }

        tracing::debug!(query = %query.query, page = query.page, "fetching pinterest search page");

        let response = self
            .client
            .get(&self.settings.base_url)
            .header(
                "Accept",
                "application/rss+xml, application/xml, text/xml, text/html",
            )
            .query(&self.request_params(query))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "pinterest search page error");
            return Err(match status.as_u16() {
                429 => ProviderError::RateLimited { provider: PROVIDER },
                code => ProviderError::Http {
                    provider: PROVIDER,
                    status: code,
                    message: snippet(&error_text),
                },
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, self.timeout, e))?;

        tracing::debug!(bytes = body.len(), "pinterest page received");
        Ok(RawPayload::Markup(body))
    }

    async fn search(&self, query: &ProviderQuery) -> Result<ProviderPage, ProviderError> {
        let raw = self.fetch(query).await?;
        let cap = self.settings.max_results.min(query.limit as usize);
        let mut images = normalize::normalize(&raw, self.source(), &query.query, 0);
        images.truncate(cap);

        Ok(ProviderPage {
            images,
            total_results: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::Locale;

    #[tokio::test]
    async fn test_disabled_provider_is_unavailable() {
        let settings = PinterestSettings {
            enabled: false,
            ..PinterestSettings::default()
        };
        let p = PinterestProvider::new(settings, Duration::from_secs(10)).unwrap();
        let q = ProviderQuery::new("ankara", 1, 10, Locale::for_country("NG"));
        assert!(matches!(
            p.fetch(&q).await,
            Err(ProviderError::Unavailable { provider: "pinterest", .. })
        ));
    }

    #[test]
    fn test_request_uses_page_number() {
        let p = PinterestProvider::new(PinterestSettings::default(), Duration::from_secs(10)).unwrap();
        let q = ProviderQuery::new(" kaftan ", 4, 10, Locale::for_country("NG"));
        let params = p.request_params(&q);
        assert!(params.contains(&("q", "kaftan".to_string())));
        assert!(params.contains(&("page", "4".to_string())));
    }
}
