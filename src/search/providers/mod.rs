pub mod google;
pub mod pinterest;

pub use google::GoogleImageProvider;
pub use pinterest::PinterestProvider;

use crate::search::error::ProviderError;
use crate::search::normalize::{self, RawPayload};
use crate::search::paginate;
use crate::search::types::{ImageSource, ProviderPage, ProviderQuery};

/// Image provider abstraction - one adapter per external source
///
/// An adapter knows how to call its source for a canonical query (including
/// translating 1-based page/limit into its own pagination convention) and
/// returns the raw payload. Normalization into [`crate::search::ImageResult`]
/// happens in [`ImageProvider::search`].
///
/// An empty result set is a successful call with zero items, never an error.
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// Source tag stamped on every result from this provider
    fn source(&self) -> ImageSource;

    /// Call the source and return its raw payload
    async fn fetch(&self, query: &ProviderQuery) -> Result<RawPayload, ProviderError>;

    /// Fetch and normalize one page, capped at `query.limit` results
    async fn search(&self, query: &ProviderQuery) -> Result<ProviderPage, ProviderError> {
        let raw = self.fetch(query).await?;
        let offset = paginate::offset(query.page, query.limit);
        let mut images = normalize::normalize(&raw, self.source(), &query.query, offset);
        images.truncate(query.limit as usize);

        Ok(ProviderPage {
            images,
            total_results: normalize::reported_total(&raw),
        })
    }
}

/// Truncate a response body for log and error messages
pub(crate) fn snippet(body: &str) -> String {
    const MAX: usize = 300;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
