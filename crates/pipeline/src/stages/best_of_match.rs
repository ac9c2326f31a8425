//! Match stage selecting critically acclaimed, recent, non-family movies.
//!
//! Keeps documents that are well rated on IMDb, have won enough awards,
//! are not rated for general/family audiences, were released within the
//! lookback window and do not carry the placeholder box office value.

use crate::traits::Stage;
use store::{Bson, Document, doc};

/// Ratings excluded from the best-of ranking
pub const EXCLUDED_RATINGS: [&str; 2] = ["G", "PG"];

/// Box office value the dataset uses as a placeholder
pub const PLACEHOLDER_BOX_OFFICE: f64 = 100.0;

/// `$match` stage for the best-of query.
///
/// ## Predicates
/// 1. `imdb.rating` within [min_rating, max_rating]
/// 2. `awards.wins` >= min_award_wins
/// 3. `rated` not in the excluded ratings
/// 4. `year` >= min_year
/// 5. `boxOffice` != the placeholder value
/// 6. optionally, `genres` contains at least one of the given genres
#[derive(Debug, Clone, PartialEq)]
pub struct BestOfMatch {
    pub min_rating: f64,
    pub max_rating: f64,
    pub min_award_wins: i32,
    pub excluded_ratings: Vec<String>,
    pub min_year: i32,
    pub excluded_box_office: f64,
    pub genres: Vec<String>,
}

impl BestOfMatch {
    /// Create a match stage with the standard rating window (7 to 10).
    ///
    /// # Arguments
    /// * `min_award_wins` - Minimum number of award wins (typically 10)
    /// * `min_year` - Earliest release year to keep
    pub fn new(min_award_wins: i32, min_year: i32) -> Self {
        Self {
            min_rating: 7.0,
            max_rating: 10.0,
            min_award_wins,
            excluded_ratings: EXCLUDED_RATINGS.iter().map(|r| r.to_string()).collect(),
            min_year,
            excluded_box_office: PLACEHOLDER_BOX_OFFICE,
            genres: Vec::new(),
        }
    }

    /// Restrict matches to movies in at least one of `genres` (builder pattern).
    pub fn with_genres(mut self, genres: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    /// The filter document without the `$match` wrapper.
    pub fn filter(&self) -> Document {
        let mut filter = doc! {
            "imdb.rating": { "$gte": self.min_rating, "$lte": self.max_rating },
            "awards.wins": { "$gte": self.min_award_wins },
            "rated": { "$nin": strings(&self.excluded_ratings) },
            "year": { "$gte": self.min_year },
            "boxOffice": { "$ne": self.excluded_box_office },
        };
        if !self.genres.is_empty() {
            filter.insert("genres", doc! { "$in": strings(&self.genres) });
        }
        filter
    }
}

fn strings(values: &[String]) -> Bson {
    Bson::Array(values.iter().cloned().map(Bson::String).collect())
}

impl Stage for BestOfMatch {
    fn name(&self) -> &str {
        "BestOfMatch"
    }

    fn to_document(&self) -> Document {
        doc! { "$match": self.filter() }
    }
}
