use crate::search::types::ImageResult;
use std::collections::HashSet;

/// Merge result lists from several sources.
///
/// The first occurrence of an id wins and later duplicates are dropped. The
/// surviving results are then stably sorted with featured items first; no
/// other reordering happens, so within the featured and non-featured groups
/// source order is preserved.
pub fn merge<I>(sources: I) -> Vec<ImageResult>
where
    I: IntoIterator<Item = Vec<ImageResult>>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<ImageResult> = sources
        .into_iter()
        .flatten()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();

    // sort_by_key is stable
    merged.sort_by_key(|r| !r.featured);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::ImageSource;

    fn item(id: &str, featured: bool, source: ImageSource) -> ImageResult {
        let mut r = ImageResult::new(id, id, format!("https://img.example/{id}.jpg"), source);
        r.featured = featured;
        r
    }

    fn ids(results: &[ImageResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_featured_first_preserving_order() {
        let merged = merge([vec![
            item("a", false, ImageSource::Database),
            item("b", true, ImageSource::Database),
            item("c", false, ImageSource::Database),
        ]]);
        assert_eq!(ids(&merged), ["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first_seen() {
        let mut dup = item("x", true, ImageSource::Pinterest);
        dup.title = "second copy".into();

        let merged = merge([
            vec![item("x", false, ImageSource::Database), item("y", false, ImageSource::Database)],
            vec![dup, item("z", false, ImageSource::Pinterest)],
        ]);

        assert_eq!(ids(&merged), ["x", "y", "z"]);
        assert_eq!(merged[0].source, ImageSource::Database);
        assert_eq!(merged[0].title, "x");
        assert!(!merged[0].featured);
    }

    #[test]
    fn test_empty_sources() {
        assert!(merge(Vec::<Vec<ImageResult>>::new()).is_empty());
        assert!(merge([Vec::new(), Vec::new()]).is_empty());
    }
}
