use serde::{Deserialize, Serialize};
use std::fmt;

/// Width used when a provider does not report image dimensions
pub const PLACEHOLDER_WIDTH: u32 = 400;
/// Height used when a provider does not report image dimensions
pub const PLACEHOLDER_HEIGHT: u32 = 600;

/// Maximum number of tags carried by one result
pub const MAX_TAGS: usize = 8;

/// Where an image result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Local style catalog
    Database,
    /// Google Custom Search (JSON API)
    Google,
    /// Pinterest RSS / HTML scraping
    Pinterest,
    /// Built-in curated sets used when every live provider came back empty
    Curated,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Database => "database",
            ImageSource::Google => "google",
            ImageSource::Pinterest => "pinterest",
            ImageSource::Curated => "curated",
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered set of short tags, capped at [`MAX_TAGS`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a tag. Blank tags, duplicates and anything past the cap are ignored.
    /// Returns true if the tag was added.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        let tag = tag.trim();
        if tag.is_empty() || self.0.len() >= MAX_TAGS || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// Canonical, provider-agnostic image result
///
/// Every adapter normalizes into this shape. All required fields are filled;
/// provider extras are optional and skipped when serializing if absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    /// Unique within one response
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
    pub source: ImageSource,
    pub tags: Tags,
    pub featured: bool,
    pub width: u32,
    pub height: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photographer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<u64>,
}

impl ImageResult {
    /// Create a result with every optional field defaulted.
    /// The thumbnail starts out as the full image URL.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        source: ImageSource,
    ) -> Self {
        let image_url = image_url.into();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            thumbnail_url: image_url.clone(),
            image_url,
            source,
            tags: Tags::new(),
            featured: false,
            width: PLACEHOLDER_WIDTH,
            height: PLACEHOLDER_HEIGHT,
            category: None,
            context_link: None,
            display_link: None,
            original_link: None,
            photographer: None,
            file_format: None,
            byte_size: None,
        }
    }
}

/// Locale derived from the caller's network address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    /// ISO 3166-1 alpha-2, upper-case
    pub country: String,
    pub language: String,
}

impl Locale {
    pub fn for_country(country: impl Into<String>) -> Self {
        Self {
            country: country.into().to_ascii_uppercase(),
            language: "en".to_string(),
        }
    }
}

/// Inbound search request, as handed over by the transport layer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            client_address: None,
            page: default_page(),
            limit: default_limit(),
        }
    }

    pub fn with_client_address(mut self, address: impl Into<String>) -> Self {
        self.client_address = Some(address.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// One page of aggregated search results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub images: Vec<ImageResult>,
    pub total_results: u64,
    pub current_page: u32,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub query: String,
    pub country: String,
    pub search_method: String,
}

/// Canonical parameters handed to a provider adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub query: String,
    /// 1-based
    pub page: u32,
    pub limit: u32,
    pub locale: Locale,
}

impl ProviderQuery {
    pub fn new(query: impl Into<String>, page: u32, limit: u32, locale: Locale) -> Self {
        Self {
            query: query.into(),
            page: page.max(1),
            limit: limit.max(1),
            locale,
        }
    }
}

/// Normalized output of one provider call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderPage {
    pub images: Vec<ImageResult>,
    /// Total matches reported by the provider, if it reports one
    pub total_results: Option<u64>,
}

impl ProviderPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_reject_duplicates_and_cap_at_eight() {
        let mut tags = Tags::new();
        assert!(tags.insert("Fashion"));
        assert!(!tags.insert("Fashion"));
        assert!(!tags.insert("   "));
        for i in 0..20 {
            tags.insert(format!("t{i}"));
        }
        assert_eq!(tags.len(), MAX_TAGS);
        assert_eq!(tags.iter().next(), Some("Fashion"));
    }

    #[test]
    fn image_result_defaults_thumbnail_to_image() {
        let r = ImageResult::new("id-1", "Title", "https://img.example/a.jpg", ImageSource::Google);
        assert_eq!(r.thumbnail_url, r.image_url);
        assert_eq!((r.width, r.height), (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));
        assert!(!r.featured);
    }

    #[test]
    fn image_result_serializes_with_storefront_field_names() {
        let mut r = ImageResult::new("x", "T", "https://img.example/a.jpg", ImageSource::Curated);
        r.tags.insert("Fashion");
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["imageURL"], json!("https://img.example/a.jpg"));
        assert_eq!(value["thumbnailURL"], json!("https://img.example/a.jpg"));
        assert_eq!(value["source"], json!("curated"));
        assert_eq!(value["tags"], json!(["Fashion"]));
        assert!(value.get("contextLink").is_none());
    }

    #[test]
    fn search_request_defaults_page_and_limit() {
        let req: SearchRequest = serde_json::from_value(json!({ "query": "ankara" })).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 20);
        assert!(req.client_address.is_none());
    }
}
