//! The ranked best-of query.
//!
//! Ranks recent, award-winning, well-rated movies by critic score:
//! 1. Match on rating, awards, audience rating, year and box office
//! 2. Collapse duplicate titles (first-seen values win)
//! 3. Project down to the listing fields
//! 4. Sort by metacritic descending, title ascending to break ties
//! 5. Skip to the requested page
//! 6. Limit to one page

use crate::aggregation_pipeline::AggregationPipeline;
use crate::paging::best_of_skip;
use crate::stages::{BestOfMatch, DedupByTitle, Limit, Projection, Skip, SortBy, SortOrder};

/// Fields returned for each ranked movie
pub const BEST_OF_FIELDS: [&str; 8] = [
    "title",
    "year",
    "rated",
    "poster",
    "fullplot",
    "boxOffice",
    "imdb",
    "metacritic",
];

/// Tunable thresholds for the best-of ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestOfCriteria {
    /// Movies per page
    pub page_size: u32,
    /// Minimum `awards.wins`
    pub min_award_wins: i32,
    /// How many years back from the current year to look
    pub lookback_years: i32,
    /// Optional genre restriction (empty = any genre)
    pub genres: Vec<String>,
}

impl Default for BestOfCriteria {
    fn default() -> Self {
        Self {
            page_size: 20,
            min_award_wins: 10,
            lookback_years: 10,
            genres: Vec::new(),
        }
    }
}

/// Build the best-of pipeline for `page` (1-based), relative to `current_year`.
pub fn best_of_pipeline(criteria: &BestOfCriteria, page: u64, current_year: i32) -> AggregationPipeline {
    let min_year = current_year - criteria.lookback_years;
    tracing::debug!(
        "Building best-of pipeline: page {}, min year {}, min wins {}",
        page,
        min_year,
        criteria.min_award_wins
    );

    AggregationPipeline::new()
        .add_stage(
            BestOfMatch::new(criteria.min_award_wins, min_year)
                .with_genres(criteria.genres.iter().cloned()),
        )
        .add_stage(DedupByTitle::new(BEST_OF_FIELDS))
        .add_stage(Projection::fields(BEST_OF_FIELDS))
        .add_stage(SortBy::descending("metacritic").then("title", SortOrder::Ascending))
        .add_stage(Skip(best_of_skip(page, criteria.page_size)))
        .add_stage(Limit(criteria.page_size))
}
