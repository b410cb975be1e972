/// Page metadata derived from a total result count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total_results: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
}

/// Derive page metadata for a 1-based `page`.
pub fn paginate(total_results: u64, page: u32, limit: u32) -> Pagination {
    let limit = u64::from(limit.max(1));
    let total_pages = total_results.div_ceil(limit);
    Pagination {
        total_results,
        total_pages,
        has_next_page: u64::from(page) < total_pages,
    }
}

/// Total to report when a provider may not have reported one.
///
/// Missing totals are estimated as ten pages of whatever this page held. This
/// is a known over/under-estimate kept for compatibility with the storefront.
/// A reported zero counts as missing.
pub fn estimate_total(reported: Option<u64>, page_len: usize) -> u64 {
    reported
        .filter(|total| *total > 0)
        .unwrap_or(page_len as u64 * 10)
}

/// 1-based start index for index-offset providers
pub fn start_index(page: u32, limit: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(limit) + 1
}

/// Zero-based offset of the first result of `page`
pub fn offset(page: u32, limit: u32) -> usize {
    (page.max(1) as usize - 1) * limit as usize
}
