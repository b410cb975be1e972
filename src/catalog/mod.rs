//! Local style catalog
//!
//! The search core only depends on the [`StyleRepository`] and [`ImageHost`]
//! contracts. [`memory::InMemoryStyleRepository`] backs tests and the CLI;
//! production deployments plug in their own storage and image hosting.

pub mod memory;

pub use memory::InMemoryStyleRepository;

use crate::search::types::{ImageResult, ImageSource, Tags};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Uploads larger than this are rejected before reaching the host
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Folder that style images are uploaded into
pub const STYLE_IMAGE_FOLDER: &str = "raws-apparel/styles";

/// A style stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub description: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StyleRecord {
    /// Canonical search result for this style, tagged `database`
    pub fn to_image_result(&self) -> ImageResult {
        let mut result = ImageResult::new(
            format!("style-{}", self.id),
            self.title.clone(),
            self.image_url.clone(),
            ImageSource::Database,
        );
        result.description = self.description.clone();
        result.tags = self.tags.iter().map(String::as_str).collect::<Tags>();
        result.featured = self.featured;
        result.category = Some(self.category.clone());
        result
    }
}

/// Fields supplied when creating or updating a style
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStyle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "imageURL")]
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

impl NewStyle {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty()
            || self.category.trim().is_empty()
            || self.image_url.trim().is_empty()
        {
            return Err(CatalogError::Validation(
                "Title, category, and imageURL are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_id: i64,
    /// Rows removed (0 when the id did not exist)
    pub changes: u64,
}

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Style not found: {0}")]
    NotFound(i64),

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("No image host configured")]
    HostUnavailable,

    /// Failure reported by an `ImageHost` implementation
    #[error("Image host error: {0}")]
    Host(String),
}

/// Style storage contract
#[async_trait::async_trait]
pub trait StyleRepository: Send + Sync {
    /// All styles, newest first
    async fn get_all(&self) -> Result<Vec<StyleRecord>, CatalogError>;

    /// Case-insensitive substring match over title, category, description
    /// and tags; featured first, then newest
    async fn search(&self, term: &str) -> Result<Vec<StyleRecord>, CatalogError>;

    async fn create(&self, style: NewStyle) -> Result<StyleRecord, CatalogError>;

    async fn update(&self, id: i64, style: NewStyle) -> Result<StyleRecord, CatalogError>;

    async fn delete(&self, id: i64) -> Result<DeleteResult, CatalogError>;
}

/// Server-side resize applied by the image host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTransform {
    pub width: u32,
    pub height: u32,
    pub crop: String,
    pub quality: String,
}

impl ImageTransform {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            crop: "fill".to_string(),
            quality: "auto".to_string(),
        }
    }

    /// Size stored on upload
    pub fn upload() -> Self {
        Self::new(800, 1000)
    }

    /// Size served to catalog listings
    pub fn listing() -> Self {
        Self::new(400, 500)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
    pub public_id: String,
    pub transform: ImageTransform,
}

/// Where an uploaded image ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub id: String,
}

/// Image hosting contract
#[async_trait::async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, options: &UploadOptions) -> Result<UploadedImage, CatalogError>;

    /// Delivery URL for a hosted image with a transform applied
    fn url_for(&self, id: &str, transform: &ImageTransform) -> String;
}

/// Catalog operations on top of a repository and an optional image host
#[derive(Clone)]
pub struct StyleCatalog {
    repository: Arc<dyn StyleRepository>,
    host: Option<Arc<dyn ImageHost>>,
}

impl StyleCatalog {
    pub fn new(repository: Arc<dyn StyleRepository>) -> Self {
        Self {
            repository,
            host: None,
        }
    }

    pub fn with_image_host(mut self, host: Arc<dyn ImageHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn repository(&self) -> Arc<dyn StyleRepository> {
        Arc::clone(&self.repository)
    }

    pub async fn list(&self) -> Result<Vec<StyleRecord>, CatalogError> {
        self.repository.get_all().await
    }

    pub async fn create(&self, style: NewStyle) -> Result<StyleRecord, CatalogError> {
        style.validate()?;
        let created = self.repository.create(style).await?;
        tracing::info!(style_id = created.id, title = %created.title, "style created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, style: NewStyle) -> Result<StyleRecord, CatalogError> {
        style.validate()?;
        let updated = self.repository.update(id, style).await?;
        tracing::info!(style_id = id, "style updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<DeleteResult, CatalogError> {
        let result = self.repository.delete(id).await?;
        tracing::info!(style_id = id, changes = result.changes, "style deleted");
        Ok(result)
    }

    /// Validate and upload a style image. Only `image/*` content up to
    /// [`MAX_UPLOAD_BYTES`] is accepted.
    pub async fn upload_style_image(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadedImage, CatalogError> {
        let host = self.host.as_ref().ok_or(CatalogError::HostUnavailable)?;

        if bytes.is_empty() {
            return Err(CatalogError::UploadRejected("No image file provided".to_string()));
        }
        if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(CatalogError::UploadRejected(
                "Only image files are allowed".to_string(),
            ));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(CatalogError::UploadRejected(format!(
                "Image exceeds {} byte limit",
                MAX_UPLOAD_BYTES
            )));
        }

        let options = UploadOptions {
            folder: STYLE_IMAGE_FOLDER.to_string(),
            public_id: format!("style-{}", Utc::now().timestamp_millis()),
            transform: ImageTransform::upload(),
        };

        tracing::info!(bytes = bytes.len(), public_id = %options.public_id, "uploading style image");
        let uploaded = host.upload(bytes, &options).await?;
        tracing::info!(url = %uploaded.url, "style image uploaded");
        Ok(uploaded)
    }

    /// Listing-sized delivery URL for a hosted image
    pub fn listing_url(&self, id: &str) -> Result<String, CatalogError> {
        let host = self.host.as_ref().ok_or(CatalogError::HostUnavailable)?;
        Ok(host.url_for(id, &ImageTransform::listing()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_style_requires_title_category_and_image() {
        let mut style = NewStyle {
            title: "Kaftan".into(),
            category: "Traditional".into(),
            image_url: "https://img.example/k.jpg".into(),
            ..NewStyle::default()
        };
        assert!(style.validate().is_ok());

        style.category = "  ".into();
        assert!(matches!(style.validate(), Err(CatalogError::Validation(_))));
    }

    #[test]
    fn test_record_converts_to_database_result() {
        let now = Utc::now();
        let record = StyleRecord {
            id: 7,
            title: "Royal Agbada".into(),
            category: "Traditional".into(),
            description: "Embroidered".into(),
            image_url: "https://img.example/a.jpg".into(),
            tags: vec!["Traditional".into(), "Traditional".into(), "Formal".into()],
            featured: true,
            created_at: now,
            updated_at: now,
        };

        let result = record.to_image_result();
        assert_eq!(result.id, "style-7");
        assert_eq!(result.source, ImageSource::Database);
        assert!(result.featured);
        assert_eq!(result.tags.len(), 2);
        assert_eq!(result.thumbnail_url, record.image_url);
    }
}
