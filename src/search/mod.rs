//! Fashion image search aggregation
//!
//! A request flows through geo resolution, the provider fallback chain,
//! ranking and pagination before it is answered. See [`ImageSearchService`].

pub mod curated;
pub mod error;
pub mod fallback;
pub mod geo;
pub mod normalize;
pub mod paginate;
pub mod providers;
pub mod rank;
pub mod service;
pub mod types;

pub use curated::CuratedFallback;
pub use error::{ProviderError, SearchError};
pub use fallback::{ChainOutcome, FallbackChain, Tier};
pub use geo::{GeoDatabase, GeoResolver};
pub use providers::ImageProvider;
pub use service::{suggestions, ImageSearchService, ProviderStatus};
pub use types::{
    ImageResult, ImageSource, Locale, ProviderPage, ProviderQuery, SearchRequest, SearchResponse,
    Tags,
};
