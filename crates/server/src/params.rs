//! Path-parameter parsing.
//!
//! `GET /api/movies/:segment` serves both single-movie lookups and page
//! listings, so the segment is classified first: anything shaped like an
//! ObjectId is an id, everything else must be a page number.

use store::{MovieId, looks_like_id};

use crate::error::{ApiError, ApiResult};

/// What a bare `/api/movies/:segment` path refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Id(MovieId),
    Page(u64),
}

/// Parse a 1-based page number.
pub fn parse_page(raw: &str) -> ApiResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ApiError::invalid("page numbers start at 1")),
        Ok(page) => Ok(page),
        Err(_) => Err(ApiError::invalid(format!("'{raw}' is not a page number"))),
    }
}

pub fn parse_year(raw: &str) -> ApiResult<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::invalid(format!("'{raw}' is not a year")))
}

pub fn parse_movie_id(raw: &str) -> ApiResult<MovieId> {
    Ok(MovieId::parse(raw.trim())?)
}

pub fn classify_segment(raw: &str) -> ApiResult<Segment> {
    if looks_like_id(raw) {
        return Ok(Segment::Id(parse_movie_id(raw)?));
    }
    parse_page(raw).map(Segment::Page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page("1").unwrap(), 1);
        assert_eq!(parse_page("42").unwrap(), 42);
        assert!(parse_page("0").is_err());
        assert!(parse_page("-1").is_err());
        assert!(parse_page("two").is_err());
        assert!(parse_page("").is_err());
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("1995").unwrap(), 1995);
        assert!(parse_year("1995abc").is_err());
        assert!(parse_year("abc").is_err());
    }

    #[test]
    fn test_classify_segment() {
        let id = "573a1390f29313caabcd4135";
        assert_eq!(
            classify_segment(id).unwrap(),
            Segment::Id(MovieId::parse(id).unwrap())
        );
        assert_eq!(classify_segment("3").unwrap(), Segment::Page(3));

        // Right length, wrong alphabet: neither an id nor a page
        assert!(classify_segment("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
        assert!(classify_segment("not-an-id").is_err());
    }
}
