//! Benchmarks for in-memory aggregation
//!
//! Run with: cargo bench --package store
//!
//! Builds a synthetic movie collection and runs a match/group/sort/limit
//! pipeline of the shape the catalog's best-of query uses.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use store::query::filter_documents;
use store::{doc, Document};

const RATINGS: [&str; 4] = ["G", "PG", "PG-13", "R"];

fn synthetic_movies(count: i32) -> Vec<Document> {
    (0..count)
        .map(|i| {
            let title = format!("Movie {}", i % (count / 2).max(1));
            let rated = RATINGS[(i % 4) as usize];
            let rating = f64::from(i % 10) + 0.5;
            doc! {
                "title": title,
                "year": 1990 + (i % 35),
                "rated": rated,
                "imdb": { "rating": rating },
                "awards": { "wins": i % 25 },
                "metacritic": (i * 7) % 100,
                "boxOffice": f64::from(i % 500),
            }
        })
        .collect()
}

fn pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": {
            "imdb.rating": { "$gte": 7, "$lte": 10 },
            "awards.wins": { "$gte": 10 },
            "rated": { "$nin": ["G", "PG"] },
            "year": { "$gte": 2015 },
            "boxOffice": { "$ne": 100.0 },
        } },
        doc! { "$group": {
            "_id": "$title",
            "title": { "$first": "$title" },
            "metacritic": { "$first": "$metacritic" },
        } },
        doc! { "$sort": { "metacritic": -1, "title": 1 } },
        doc! { "$limit": 20 },
    ]
}

fn bench_best_of_pipeline(c: &mut Criterion) {
    let movies = synthetic_movies(20_000);
    let stages = pipeline();

    c.bench_function("aggregate_best_of_20k", |b| {
        b.iter(|| {
            let out = store::aggregate::run_pipeline(black_box(movies.clone()), black_box(&stages))
                .unwrap();
            black_box(out)
        })
    });
}

fn bench_match_only(c: &mut Criterion) {
    let movies = synthetic_movies(20_000);
    let filter = doc! { "awards.wins": { "$gte": 10 }, "rated": { "$nin": ["G", "PG"] } };

    c.bench_function("filter_documents_20k", |b| {
        b.iter(|| {
            let out = filter_documents(black_box(movies.clone()), black_box(&filter)).unwrap();
            black_box(out)
        })
    });
}

criterion_group!(benches, bench_best_of_pipeline, bench_match_only);
criterion_main!(benches);
