use crate::config::settings::GoogleSettings;
use crate::logging::redact_secrets;
use crate::search::error::ProviderError;
use crate::search::normalize::RawPayload;
use crate::search::paginate;
use crate::search::providers::{snippet, ImageProvider};
use crate::search::types::{ImageSource, ProviderQuery};
use anyhow::Context;
use std::time::Duration;

const PROVIDER: &str = "google";

/// Google returns at most this many items per request
const MAX_PAGE_SIZE: u32 = 10;

/// Google Custom Search JSON API, image search mode
///
/// Pagination is index based: `start` is the 1-based position of the first
/// result and `num` is capped at 10.
pub struct GoogleImageProvider {
    client: reqwest::Client,
    settings: GoogleSettings,
    timeout: Duration,
}

impl GoogleImageProvider {
    pub fn new(settings: GoogleSettings, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Raws-Apparel-Fashion-Search/1.0")
            .build()
            .context("Failed to build Google HTTP client")?;

        if !settings.is_configured() {
            tracing::warn!("google custom search not configured, searches will fall through");
        }

        Ok(Self {
            client,
            settings,
            timeout,
        })
    }

    /// Query parameters for one page, in request order
    pub fn request_params(&self, query: &ProviderQuery) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.settings.api_key.clone()),
            ("cx", self.settings.search_engine_id.clone()),
            ("q", clothing_query(&query.query)),
            ("searchType", "image".to_string()),
            ("imgSize", self.settings.image_size.clone()),
            ("imgType", self.settings.image_type.clone()),
            ("safe", self.settings.safe_search.clone()),
            // Pages advance by `limit` but one request returns at most 10 items,
            // so limits above 10 skip the tail of each page window
            ("start", paginate::start_index(query.page, query.limit).to_string()),
            ("num", query.limit.clamp(1, MAX_PAGE_SIZE).to_string()),
            ("gl", query.locale.country.to_lowercase()),
            ("hl", query.locale.language.clone()),
        ]
    }
}

/// Bias the query toward garments and away from common off-topic matches
pub fn clothing_query(query: &str) -> String {
    format!("{} clothing fashion dress outfit -money -cash -shoes -bag", query.trim())
}

#[async_trait::async_trait]
impl ImageProvider for GoogleImageProvider {
    fn source(&self) -> ImageSource {
        ImageSource::Google
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        if !self.settings.is_configured() {
            return Err(ProviderError::Unavailable {
                provider: PROVIDER,
                reason: "GOOGLE_API_KEY and GOOGLE_SEARCH_ENGINE_ID must be set".to_string(),
            });
        }

        tracing::debug!(
            query = %query.query,
            page = query.page,
            country = %query.locale.country,
            "performing google image search"
        );

        let response = self
            .client
            .get(&self.settings.base_url)
            .header("Accept", "application/json")
            .query(&self.request_params(query))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&error_text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| snippet(&error_text));

            tracing::warn!(
                status = %status,
                error = %redact_secrets(&message),
                "google custom search api error"
            );

            return Err(match status.as_u16() {
                429 => ProviderError::RateLimited { provider: PROVIDER },
                401 | 403 => ProviderError::Unavailable {
                    provider: PROVIDER,
                    reason: format!("access forbidden ({}): {}", status.as_u16(), message),
                },
                code => ProviderError::Http {
                    provider: PROVIDER,
                    status: code,
                    message,
                },
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, self.timeout, e))?;
        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        if json["items"].as_array().map_or(true, |items| items.is_empty()) {
            tracing::debug!(query = %query.query, "google returned no items");
        }

        Ok(RawPayload::Json(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::Locale;

    fn provider(configured: bool) -> GoogleImageProvider {
        let mut settings = GoogleSettings::default();
        if configured {
            settings.api_key = "test-key".into();
            settings.search_engine_id = "test-cx".into();
        }
        GoogleImageProvider::new(settings, Duration::from_secs(10)).unwrap()
    }

    fn param<'a>(params: &'a [(&'static str, String)], name: &str) -> &'a str {
        params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_pagination_translates_to_start_and_num() {
        let p = provider(true);
        let q = ProviderQuery::new("ankara", 3, 20, Locale::for_country("NG"));
        let params = p.request_params(&q);

        assert_eq!(param(&params, "start"), "41");
        assert_eq!(param(&params, "num"), "10");
        assert_eq!(param(&params, "gl"), "ng");
        assert_eq!(param(&params, "searchType"), "image");
        assert!(param(&params, "q").starts_with("ankara clothing fashion"));
    }

    #[test]
    fn test_pages_tile_when_limit_fits_one_request() {
        let p = provider(true);
        let starts: Vec<String> = (1..=3)
            .map(|page| {
                let q = ProviderQuery::new("gown", page, 10, Locale::for_country("NG"));
                param(&p.request_params(&q), "start").to_string()
            })
            .collect();
        assert_eq!(starts, ["1", "11", "21"]);

        let wide = ProviderQuery::new("gown", 2, 20, Locale::for_country("NG"));
        let params = p.request_params(&wide);
        assert_eq!(param(&params, "start"), "21");
        assert_eq!(param(&params, "num"), "10");
    }

    #[test]
    fn test_small_limit_is_passed_through() {
        let p = provider(true);
        let q = ProviderQuery::new("suit", 1, 4, Locale::for_country("gb"));
        let params = p.request_params(&q);
        assert_eq!(param(&params, "start"), "1");
        assert_eq!(param(&params, "num"), "4");
        assert_eq!(param(&params, "gl"), "gb");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_unavailable() {
        let p = provider(false);
        let q = ProviderQuery::new("dress", 1, 10, Locale::for_country("NG"));
        let err = p.fetch(&q).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { provider: "google", .. }));
    }
}
