use super::{CatalogError, DeleteResult, NewStyle, StyleRecord, StyleRepository};
use chrono::Utc;
use std::cmp::Reverse;
use tokio::sync::RwLock;

/// In-memory [`StyleRepository`]
pub struct InMemoryStyleRepository {
    inner: RwLock<Inner>,
}

struct Inner {
    next_id: i64,
    styles: Vec<StyleRecord>,
}

impl InMemoryStyleRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                styles: Vec::new(),
            }),
        }
    }

    /// Repository pre-loaded with the storefront's sample styles
    pub fn with_sample_styles() -> Self {
        let samples = [
            (
                "Royal Agbada",
                "Traditional",
                "Elegant traditional agbada with intricate embroidery",
                "https://images.unsplash.com/photo-1594736797933-d0401ba2fe65?w=400&h=500&fit=crop",
                &["Traditional", "Formal", "Embroidery"][..],
                true,
            ),
            (
                "Executive Suit",
                "Business",
                "Sharp tailored suit perfect for business meetings",
                "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=400&h=500&fit=crop",
                &["Business", "Formal", "Modern"][..],
                true,
            ),
            (
                "Evening Gown",
                "Evening",
                "Stunning evening gown for special occasions",
                "https://images.unsplash.com/photo-1566479179817-c0b5b4b4b1e5?w=400&h=500&fit=crop",
                &["Evening", "Formal", "Elegant"][..],
                false,
            ),
        ];

        let mut inner = Inner {
            next_id: 1,
            styles: Vec::new(),
        };
        for (title, category, description, image_url, tags, featured) in samples {
            inner.insert(NewStyle {
                title: title.to_string(),
                category: category.to_string(),
                description: Some(description.to_string()),
                image_url: image_url.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                featured,
            });
        }

        Self {
            inner: RwLock::new(inner),
        }
    }
}

impl Default for InMemoryStyleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn insert(&mut self, style: NewStyle) -> StyleRecord {
        let now = Utc::now();
        let record = StyleRecord {
            id: self.next_id,
            title: style.title,
            category: style.category,
            description: style.description.unwrap_or_default(),
            image_url: style.image_url,
            tags: style.tags,
            featured: style.featured,
            created_at: now,
            updated_at: now,
        };
        self.next_id += 1;
        self.styles.push(record.clone());
        record
    }
}

fn matches_term(style: &StyleRecord, term: &str) -> bool {
    style.title.to_lowercase().contains(term)
        || style.category.to_lowercase().contains(term)
        || style.description.to_lowercase().contains(term)
        || style.tags.iter().any(|t| t.to_lowercase().contains(term))
}

#[async_trait::async_trait]
impl StyleRepository for InMemoryStyleRepository {
    async fn get_all(&self) -> Result<Vec<StyleRecord>, CatalogError> {
        let inner = self.inner.read().await;
        let mut styles = inner.styles.clone();
        // Newest first; ids break ties between records created in the same instant
        styles.sort_by_key(|s| Reverse((s.created_at, s.id)));
        Ok(styles)
    }

    async fn search(&self, term: &str) -> Result<Vec<StyleRecord>, CatalogError> {
        let term = term.trim().to_lowercase();
        let inner = self.inner.read().await;
        let mut styles: Vec<StyleRecord> = inner
            .styles
            .iter()
            .filter(|s| matches_term(s, &term))
            .cloned()
            .collect();
        styles.sort_by_key(|s| Reverse((s.featured, s.created_at, s.id)));
        Ok(styles)
    }

    async fn create(&self, style: NewStyle) -> Result<StyleRecord, CatalogError> {
        style.validate()?;
        Ok(self.inner.write().await.insert(style))
    }

    async fn update(&self, id: i64, style: NewStyle) -> Result<StyleRecord, CatalogError> {
        style.validate()?;
        let mut inner = self.inner.write().await;
        let record = inner
            .styles
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(CatalogError::NotFound(id))?;

        record.title = style.title;
        record.category = style.category;
        record.description = style.description.unwrap_or_default();
        record.image_url = style.image_url;
        record.tags = style.tags;
        record.featured = style.featured;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> Result<DeleteResult, CatalogError> {
        let mut inner = self.inner.write().await;
        let before = inner.styles.len();
        inner.styles.retain(|s| s.id != id);
        Ok(DeleteResult {
            deleted_id: id,
            changes: (before - inner.styles.len()) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(styles: &[StyleRecord]) -> Vec<&str> {
        styles.iter().map(|s| s.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_sample_styles_newest_first() {
        let repo = InMemoryStyleRepository::with_sample_styles();
        let all = repo.get_all().await.unwrap();
        assert_eq!(titles(&all), ["Evening Gown", "Executive Suit", "Royal Agbada"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_featured_first() {
        let repo = InMemoryStyleRepository::with_sample_styles();

        let formal = repo.search("FORMAL").await.unwrap();
        assert_eq!(titles(&formal), ["Executive Suit", "Royal Agbada", "Evening Gown"]);

        let gown = repo.search("gown").await.unwrap();
        assert_eq!(titles(&gown), ["Evening Gown"]);

        assert!(repo.search("kimono").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let repo = InMemoryStyleRepository::new();
        let created = repo
            .create(NewStyle {
                title: "Kaftan".into(),
                category: "Traditional".into(),
                image_url: "https://img.example/k.jpg".into(),
                tags: vec!["Kaftan".into()],
                ..NewStyle::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.description, "");

        let updated = repo
            .update(
                created.id,
                NewStyle {
                    title: "Silk Kaftan".into(),
                    category: "Traditional".into(),
                    image_url: "https://img.example/k2.jpg".into(),
                    featured: true,
                    ..NewStyle::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Silk Kaftan");
        assert!(updated.featured);
        assert!(updated.updated_at >= created.updated_at);

        assert!(matches!(
            repo.update(99, NewStyle { title: "x".into(), category: "y".into(), image_url: "z".into(), ..NewStyle::default() }).await,
            Err(CatalogError::NotFound(99))
        ));

        assert_eq!(repo.delete(1).await.unwrap().changes, 1);
        assert_eq!(repo.delete(1).await.unwrap().changes, 0);
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let repo = InMemoryStyleRepository::new();
        let err = repo.create(NewStyle::default()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }
}
