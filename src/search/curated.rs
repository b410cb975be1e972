use crate::search::types::{ImageResult, ImageSource, Tags};

/// A single hand-picked inspiration item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedStyle {
    pub title: String,
    pub image_url: String,
    pub description: String,
    pub pinterest_link: String,
}

impl CuratedStyle {
    fn new(title: &str, image_url: &str, description: &str, pinterest_query: &str) -> Self {
        Self {
            title: title.to_string(),
            image_url: image_url.to_string(),
            description: description.to_string(),
            pinterest_link: format!("https://pinterest.com/search/pins/?q={}", pinterest_query),
        }
    }
}

/// Last-resort result sets keyed by query category
///
/// Categories are matched in insertion order against the lower-cased query
/// (substring match); the first hit wins, otherwise the default set is used.
#[derive(Debug, Clone)]
pub struct CuratedFallback {
    categories: Vec<(String, Vec<CuratedStyle>)>,
    default_styles: Vec<CuratedStyle>,
}

impl CuratedFallback {
    pub fn new(categories: Vec<(String, Vec<CuratedStyle>)>, default_styles: Vec<CuratedStyle>) -> Self {
        Self {
            categories,
            default_styles,
        }
    }

    /// Category key and style set used for `query`
    pub fn select(&self, query: &str) -> (&str, &[CuratedStyle]) {
        let lower = query.to_lowercase();
        self.categories
            .iter()
            .find(|(category, _)| lower.contains(category.as_str()))
            .map(|(category, styles)| (category.as_str(), styles.as_slice()))
            .unwrap_or(("default", self.default_styles.as_slice()))
    }

    /// Build the curated results for `query`. Ids are deterministic per
    /// category so repeated fallbacks for the same query are identical.
    pub fn results_for(&self, query: &str) -> Vec<ImageResult> {
        let (category, styles) = self.select(query);
        styles
            .iter()
            .enumerate()
            .map(|(index, style)| {
                let mut result = ImageResult::new(
                    format!("curated-{}-{}", category, index),
                    style.title.clone(),
                    style.image_url.clone(),
                    ImageSource::Curated,
                );
                result.description = style.description.clone();
                result.tags = Tags::from_iter([query, "Fashion", "Pinterest", "Inspiration"]);
                result.category = Some("Fashion Inspiration".to_string());
                result.original_link = Some(style.pinterest_link.clone());
                result
            })
            .collect()
    }
}

impl Default for CuratedFallback {
    fn default() -> Self {
        const GOWN: &str = "https://images.unsplash.com/photo-1583391733956-6c78276477e2?w=400&h=500&fit=crop";
        const SHORT_DRESS: &str = "https://images.unsplash.com/photo-1566479179817-c0b5b4b4b1e5?w=400&h=500&fit=crop";
        const WRAPPER: &str = "https://images.unsplash.com/photo-1594736797933-d0401ba2fe65?w=400&h=500&fit=crop";
        const BUSINESS: &str = "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=400&h=500&fit=crop";
        const WEDDING: &str = "https://images.unsplash.com/photo-1617137984095-74e4e5e3613f?w=400&h=500&fit=crop";
        const SMART: &str = "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=400&h=500&fit=crop";

        let categories = vec![
            (
                "ankara".to_string(),
                vec![
                    CuratedStyle::new(
                        "Stunning Ankara Gown Design",
                        GOWN,
                        "Beautiful ankara long gown with traditional African prints perfect for special occasions",
                        "ankara+gown+african+fashion",
                    ),
                    CuratedStyle::new(
                        "Modern Ankara Short Dress",
                        SHORT_DRESS,
                        "Stylish ankara short dress with contemporary cuts and vibrant patterns",
                        "ankara+short+dress+modern",
                    ),
                    CuratedStyle::new(
                        "Ankara Blouse & Wrapper Set",
                        WRAPPER,
                        "Traditional ankara blouse and wrapper combination with elegant styling",
                        "ankara+blouse+wrapper+set",
                    ),
                ],
            ),
            (
                "dress".to_string(),
                vec![
                    CuratedStyle::new(
                        "Elegant Evening Gown",
                        SHORT_DRESS,
                        "Stunning evening gown perfect for formal events and special occasions",
                        "elegant+evening+gown+formal",
                    ),
                    CuratedStyle::new(
                        "Chic Cocktail Dress",
                        GOWN,
                        "Sophisticated cocktail dress for social gatherings and parties",
                        "cocktail+dress+chic+party",
                    ),
                    CuratedStyle::new(
                        "Casual Day Dress",
                        WRAPPER,
                        "Comfortable and stylish casual dress for everyday elegance",
                        "casual+day+dress+comfortable",
                    ),
                ],
            ),
            (
                "suit".to_string(),
                vec![
                    CuratedStyle::new(
                        "Sharp Business Suit",
                        BUSINESS,
                        "Professional business suit with perfect tailoring for corporate settings",
                        "business+suit+professional+men",
                    ),
                    CuratedStyle::new(
                        "Wedding Suit Elegance",
                        WEDDING,
                        "Elegant wedding suit designed for your most special day",
                        "wedding+suit+groom+elegant",
                    ),
                    CuratedStyle::new(
                        "Smart Casual Suit",
                        SMART,
                        "Versatile smart casual suit for various social occasions",
                        "smart+casual+suit+versatile",
                    ),
                ],
            ),
            (
                "traditional".to_string(),
                vec![
                    CuratedStyle::new(
                        "African Traditional Wear",
                        WRAPPER,
                        "Authentic African traditional clothing with cultural significance",
                        "african+traditional+wear+authentic",
                    ),
                    CuratedStyle::new(
                        "Cultural Heritage Outfit",
                        GOWN,
                        "Beautiful cultural outfit celebrating heritage and tradition",
                        "cultural+heritage+outfit+traditional",
                    ),
                ],
            ),
        ];

        let default_styles = vec![
            CuratedStyle::new(
                "Contemporary Fashion Design",
                SHORT_DRESS,
                "Modern contemporary fashion with sophisticated styling",
                "contemporary+fashion+modern",
            ),
            CuratedStyle::new(
                "Trendy Style Inspiration",
                BUSINESS,
                "Latest fashion trends and style inspiration",
                "trendy+style+fashion+inspiration",
            ),
            CuratedStyle::new(
                "Classic Fashion Elegance",
                WRAPPER,
                "Timeless classic fashion with enduring appeal",
                "classic+fashion+timeless+elegant",
            ),
        ];

        Self::new(categories, default_styles)
    }
}
