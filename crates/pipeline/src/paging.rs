//! Page-number arithmetic for the catalog's paginated endpoints.
//!
//! Pages are numbered from 1. The plain listing and the best-of ranking
//! each get their own function so they can evolve independently.
//!
//! Skips are capped at `i64::MAX`, the largest skip the store accepts; a
//! page past the end of the collection is simply empty.

/// Largest skip a store cursor accepts
pub const MAX_SKIP: u64 = i64::MAX as u64;

/// Documents to skip before page `page` of the plain listing.
///
/// Page 1 starts at the first document: `(page - 1) * page_size`.
pub fn list_skip(page: u64, page_size: u32) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(u64::from(page_size))
        .min(MAX_SKIP)
}

/// Documents to skip before page `page` of the best-of ranking.
///
/// Page 1 starts at the top-ranked movie: `(page - 1) * page_size`.
pub fn best_of_skip(page: u64, page_size: u32) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(u64::from(page_size))
        .min(MAX_SKIP)
}
