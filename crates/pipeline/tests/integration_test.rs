//! Integration tests for the best-of pipeline.
//!
//! These tests run the rendered pipeline through the in-memory store
//! against a fixture collection and check the ranking properties.

use std::collections::HashSet;

use pipeline::{best_of_pipeline, BestOfCriteria};
use store::{doc, Bson, Document, DocumentStore, InMemoryStore};

const CURRENT_YEAR: i32 = 2026;

struct Fixture<'a> {
    title: &'a str,
    year: i32,
    rated: &'a str,
    imdb_rating: f64,
    wins: i32,
    metacritic: Option<i32>,
    box_office: f64,
    genres: &'a [&'a str],
}

impl Fixture<'_> {
    fn qualifying(title: &str, metacritic: Option<i32>) -> Fixture<'_> {
        Fixture {
            title,
            year: CURRENT_YEAR - 3,
            rated: "R",
            imdb_rating: 7.8,
            wins: 12,
            metacritic,
            box_office: 250.0,
            genres: &["Drama"],
        }
    }

    fn into_document(self) -> Document {
        let genres: Vec<Bson> = self.genres.iter().map(|g| Bson::from(*g)).collect();
        let poster = format!("https://posters.example/{}.jpg", self.title.replace(' ', "_"));
        let fullplot = format!("The full plot of {}.", self.title);
        let mut movie = doc! {
            "title": self.title,
            "year": self.year,
            "rated": self.rated,
            "genres": genres,
            "poster": poster,
            "fullplot": fullplot,
            "boxOffice": self.box_office,
            "imdb": { "rating": self.imdb_rating, "votes": 1000 },
            "awards": { "wins": self.wins, "nominations": self.wins * 2 },
        };
        if let Some(score) = self.metacritic {
            movie.insert("metacritic", score);
        }
        movie
    }
}

/// 45 qualifying titles plus a set of movies every predicate should reject.
fn fixture_store() -> InMemoryStore {
    let mut movies: Vec<Document> = Vec::new();

    let titles: Vec<String> = (0..45).map(|i| format!("Qualifier {i:02}")).collect();
    for (i, title) in titles.iter().enumerate() {
        // Every seventh movie has no critic score at all
        let metacritic = if i % 7 == 0 { None } else { Some(40 + (i as i32 * 13) % 60) };
        movies.push(Fixture::qualifying(title, metacritic).into_document());
    }

    // Rejected: family ratings, even with perfect critic scores
    movies.push(Fixture { rated: "G", ..Fixture::qualifying("Family Hit", Some(100)) }.into_document());
    movies.push(Fixture { rated: "PG", ..Fixture::qualifying("Kids Classic", Some(99)) }.into_document());
    // Rejected: too old
    movies.push(Fixture { year: CURRENT_YEAR - 25, ..Fixture::qualifying("Old Masterpiece", Some(98)) }.into_document());
    // Rejected: too few awards
    movies.push(Fixture { wins: 2, ..Fixture::qualifying("Overlooked", Some(97)) }.into_document());
    // Rejected: audience rating outside [7, 10]
    movies.push(Fixture { imdb_rating: 6.4, ..Fixture::qualifying("Divisive", Some(96)) }.into_document());
    // Rejected: placeholder box office
    movies.push(Fixture { box_office: 100.0, ..Fixture::qualifying("Placeholder", Some(95)) }.into_document());

    InMemoryStore::with_documents(movies)
}

async fn run_page(store: &InMemoryStore, criteria: &BestOfCriteria, page: u64) -> Vec<Document> {
    let pipeline = best_of_pipeline(criteria, page, CURRENT_YEAR);
    store.aggregate(pipeline.build()).await.unwrap()
}

fn titles(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d.get_str("title").unwrap().to_string())
        .collect()
}

fn metacritic(doc: &Document) -> Option<i32> {
    match doc.get("metacritic") {
        Some(Bson::Int32(n)) => Some(*n),
        _ => None,
    }
}

#[tokio::test]
async fn test_family_ratings_never_appear() {
    let store = fixture_store();
    let criteria = BestOfCriteria::default();

    for page in 1..=3 {
        for movie in run_page(&store, &criteria, page).await {
            let rated = movie.get_str("rated").unwrap();
            assert!(rated != "G" && rated != "PG", "page {page} returned a {rated} movie");
        }
    }
}

#[tokio::test]
async fn test_results_are_ranked_by_metacritic() {
    let store = fixture_store();
    let criteria = BestOfCriteria::default();

    let mut ranked = Vec::new();
    for page in 1..=3 {
        ranked.extend(run_page(&store, &criteria, page).await);
    }
    assert_eq!(ranked.len(), 45);

    for pair in ranked.windows(2) {
        // Missing scores rank below every present score
        assert!(
            metacritic(&pair[0]) >= metacritic(&pair[1]),
            "{:?} ranked above {:?}",
            pair[0],
            pair[1]
        );
    }
    assert!(metacritic(ranked.last().unwrap()).is_none());
}

#[tokio::test]
async fn test_pages_are_bounded_and_disjoint() {
    let store = fixture_store();
    let criteria = BestOfCriteria::default();

    let page1 = run_page(&store, &criteria, 1).await;
    let page2 = run_page(&store, &criteria, 2).await;
    let page3 = run_page(&store, &criteria, 3).await;
    let page4 = run_page(&store, &criteria, 4).await;

    assert_eq!(page1.len(), 20);
    assert_eq!(page2.len(), 20);
    assert_eq!(page3.len(), 5);
    assert!(page4.is_empty());

    let first: HashSet<String> = titles(&page1).into_iter().collect();
    let second: HashSet<String> = titles(&page2).into_iter().collect();
    assert!(first.is_disjoint(&second));
}

#[tokio::test]
async fn test_projection_drops_identifiers_and_unlisted_fields() {
    let store = fixture_store();
    let page = run_page(&store, &BestOfCriteria::default(), 1).await;

    for movie in &page {
        assert!(!movie.contains_key("_id"));
        assert!(!movie.contains_key("awards"));
        assert!(!movie.contains_key("genres"));
        assert!(movie.contains_key("imdb"));
        assert!(movie.contains_key("poster"));
    }
}

#[tokio::test]
async fn test_duplicate_titles_keep_first_seen_values() {
    let store = InMemoryStore::with_documents(vec![
        Fixture::qualifying("Remade", Some(55)).into_document(),
        Fixture::qualifying("Remade", Some(99)).into_document(),
        Fixture::qualifying("Original", Some(70)).into_document(),
    ]);

    let ranked = run_page(&store, &BestOfCriteria::default(), 1).await;
    assert_eq!(titles(&ranked), vec!["Original", "Remade"]);
    assert_eq!(metacritic(&ranked[1]), Some(55));
}

#[tokio::test]
async fn test_award_threshold_and_genres_are_configurable() {
    let store = InMemoryStore::with_documents(vec![
        Fixture { wins: 5, genres: &["Action"], ..Fixture::qualifying("Five Wins Action", Some(80)) }.into_document(),
        Fixture { wins: 5, genres: &["Horror"], ..Fixture::qualifying("Five Wins Horror", Some(85)) }.into_document(),
        Fixture { wins: 3, genres: &["Comedy"], ..Fixture::qualifying("Three Wins Comedy", Some(90)) }.into_document(),
    ]);

    let strict = run_page(&store, &BestOfCriteria::default(), 1).await;
    assert!(strict.is_empty());

    let relaxed = BestOfCriteria {
        min_award_wins: 4,
        ..BestOfCriteria::default()
    };
    let ranked = run_page(&store, &relaxed, 1).await;
    assert_eq!(titles(&ranked), vec!["Five Wins Horror", "Five Wins Action"]);

    let action_or_comedy = BestOfCriteria {
        min_award_wins: 4,
        genres: vec!["Action".into(), "Comedy".into()],
        ..BestOfCriteria::default()
    };
    let ranked = run_page(&store, &action_or_comedy, 1).await;
    assert_eq!(titles(&ranked), vec!["Five Wins Action"]);
}
