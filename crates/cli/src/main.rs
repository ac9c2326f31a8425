use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::Rng;
use server::{init_tracing, CatalogArgs, MovieCatalog, StoreArgs};
use std::sync::Arc;
use std::time::{Duration, Instant};
use store::query::as_f64;
use store::{doc, Bson, Document, MovieId};
use tokio::sync::Semaphore;

/// movie-catalog - query and seed the movie catalog from the terminal
#[derive(Parser)]
#[command(name = "movie-catalog")]
#[command(about = "Command-line access to the movie catalog", long_about = None)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    catalog: CatalogArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of movies
    List {
        /// Page number (starting at 1)
        #[arg(long, default_value = "1")]
        page: u64,
    },

    /// Count every movie in the catalog
    All,

    /// Show a single movie by id
    Get {
        /// 24-digit hex movie id
        #[arg(long)]
        id: String,
    },

    /// List movies released in a year
    Year {
        #[arg(long)]
        year: i32,
    },

    /// Show a page of the best-of ranking
    Best {
        /// Page number (starting at 1)
        #[arg(long, default_value = "1")]
        page: u64,
    },

    /// Insert synthetic movies
    Seed {
        /// Number of movies to insert
        #[arg(long, default_value = "100")]
        count: usize,
    },

    /// Run benchmark to test best-of query performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Insert this many synthetic movies first
        #[arg(long, default_value = "0")]
        seed: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = cli
        .catalog
        .into_config()
        .context("Invalid catalog configuration")?;
    let start = Instant::now();
    let store = cli.store.open().await?;
    println!(
        "{} Opened {} store in {:?}",
        "✓".green(),
        store.name(),
        start.elapsed()
    );
    let catalog = Arc::new(MovieCatalog::new(store, config));

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::List { page } => handle_list(&catalog, page).await?,
        Commands::All => handle_all(&catalog).await?,
        Commands::Get { id } => handle_get(&catalog, &id).await?,
        Commands::Year { year } => handle_year(&catalog, year).await?,
        Commands::Best { page } => handle_best(&catalog, page).await?,
        Commands::Seed { count } => handle_seed(&catalog, count).await?,
        Commands::Benchmark {
            requests,
            concurrent,
            seed,
        } => handle_benchmark(catalog, requests, concurrent, seed).await?,
    }

    Ok(())
}

/// Handle the 'list' command
async fn handle_list(catalog: &MovieCatalog, page: u64) -> Result<()> {
    let movies = catalog.list_page(page).await?;
    print_movies(&format!("Movies, page {page}:"), &movies);
    Ok(())
}

/// Handle the 'all' command
async fn handle_all(catalog: &MovieCatalog) -> Result<()> {
    let movies = catalog.list_all().await?;
    println!("{}", format!("{} movies in the catalog", movies.len()).bold().blue());

    let mut by_decade = std::collections::BTreeMap::new();
    for movie in &movies {
        if let Some(year) = movie.get("year").and_then(as_f64) {
            *by_decade.entry((year as i64 / 10) * 10).or_insert(0usize) += 1;
        }
    }
    for (decade, count) in by_decade {
        println!("{}{}s: {}", "• ".green(), decade, count);
    }
    Ok(())
}

/// Handle the 'get' command
async fn handle_get(catalog: &MovieCatalog, id: &str) -> Result<()> {
    let id = MovieId::parse(id)?;
    let movie = catalog
        .get_by_id(id)
        .await?
        .ok_or_else(|| anyhow!("Movie {} not found", id))?;

    println!("{}", text(&movie, "title").bold().blue());
    for field in ["year", "rated", "runtime", "metacritic"] {
        println!("{}{}: {}", "• ".green(), field, text(&movie, field));
    }
    if let Ok(imdb) = movie.get_document("imdb") {
        println!("{}imdb rating: {}", "• ".cyan(), text(imdb, "rating"));
    }
    if let Ok(awards) = movie.get_document("awards") {
        println!("{}award wins: {}", "• ".cyan(), text(awards, "wins"));
    }
    if let Ok(plot) = movie.get_str("fullplot").or_else(|_| movie.get_str("plot")) {
        println!("\n{}", plot);
    }
    Ok(())
}

/// Handle the 'year' command
async fn handle_year(catalog: &MovieCatalog, year: i32) -> Result<()> {
    let movies = catalog.find_by_year(year).await?;
    print_movies(&format!("Movies from {year}:"), &movies);
    Ok(())
}

/// Handle the 'best' command
async fn handle_best(catalog: &MovieCatalog, page: u64) -> Result<()> {
    let movies = catalog.best_of(page).await?;
    println!("{}", format!("Best of, page {page}:").bold().blue());
    let offset = (page - 1) * u64::from(catalog.config().page_size);
    for (i, movie) in movies.iter().enumerate() {
        let rank = offset + i as u64 + 1;
        let imdb = movie
            .get_document("imdb")
            .map(|imdb| text(imdb, "rating"))
            .unwrap_or_else(|_| "?".to_string());
        println!(
            "{}. {} ({}) [{}] - Metacritic: {}, IMDb: {}",
            rank.to_string().green(),
            text(movie, "title"),
            text(movie, "year"),
            text(movie, "rated"),
            text(movie, "metacritic"),
            imdb
        );
    }
    Ok(())
}

/// Handle the 'seed' command
async fn handle_seed(catalog: &MovieCatalog, count: usize) -> Result<()> {
    let start = Instant::now();
    for movie in synthetic_movies(count) {
        catalog.create(movie).await?;
    }
    println!(
        "{} Inserted {} movies in {:?}",
        "✓".green(),
        count,
        start.elapsed()
    );
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: Arc<MovieCatalog>,
    requests: usize,
    concurrent: usize,
    seed: usize,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }
    if seed > 0 {
        handle_seed(&catalog, seed).await?;
    }

    // Spread the requests over the first few best-of pages
    let pages: Vec<u64> = {
        let mut rng = rand::rng();
        (0..requests).map(|_| rng.random_range(1..=5_u64)).collect()
    };

    let limiter = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();
    let mut handles = vec![];
    for page in pages {
        let catalog = catalog.clone();
        let limiter = limiter.clone();
        let handle = tokio::spawn(async move {
            let _permit = limiter.acquire_owned().await?;
            let start = Instant::now();
            catalog.best_of(page).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print a list of movies
fn print_movies(header: &str, movies: &[Document]) {
    println!("{}", header.bold().blue());
    if movies.is_empty() {
        println!("  (none)");
        return;
    }
    for movie in movies {
        let id = match movie.get("_id") {
            Some(Bson::ObjectId(oid)) => oid.to_hex(),
            _ => "-".to_string(),
        };
        println!(
            "{} {} ({})",
            id.dimmed(),
            text(movie, "title"),
            text(movie, "year")
        );
    }
}

/// Display text for a scalar field, "?" when missing.
fn text(document: &Document, field: &str) -> String {
    match document.get(field) {
        Some(Bson::String(s)) => s.clone(),
        Some(Bson::Int32(n)) => n.to_string(),
        Some(Bson::Int64(n)) => n.to_string(),
        Some(Bson::Double(n)) => format!("{n}"),
        Some(Bson::Boolean(b)) => b.to_string(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    }
}

const TITLE_WORDS: [&str; 12] = [
    "Night", "River", "Echo", "Glass", "Iron", "Summer", "Signal", "Harbor", "Paper", "Storm",
    "Orchard", "Frontier",
];
const RATINGS: [&str; 6] = ["G", "PG", "PG-13", "R", "NC-17", "NOT RATED"];
const GENRES: [&str; 8] = [
    "Action", "Comedy", "Drama", "Thriller", "Romance", "Sci-Fi", "Crime", "Animation",
];

/// Random movie documents shaped like the catalog's real data.
fn synthetic_movies(count: usize) -> Vec<Document> {
    let mut rng = rand::rng();
    (0..count)
        .map(|i| {
            let first = TITLE_WORDS[rng.random_range(0..TITLE_WORDS.len())];
            let second = TITLE_WORDS[rng.random_range(0..TITLE_WORDS.len())];
            let title = format!("{first} {second} {i}");
            let year: i32 = rng.random_range(1980..=2025);
            let rated = RATINGS[rng.random_range(0..RATINGS.len())];
            let genre = GENRES[rng.random_range(0..GENRES.len())];
            let rating = f64::from(rng.random_range(30..=95_i32)) / 10.0;
            let votes: i32 = rng.random_range(100..500_000);
            let runtime: i32 = rng.random_range(80..180);
            let wins: i32 = rng.random_range(0..40);
            let metacritic: i32 = rng.random_range(20..=100);
            let box_office = if rng.random_bool(0.1) {
                100.0
            } else {
                f64::from(rng.random_range(1..=900_i32)) * 1_000_000.0
            };
            let plot = format!("{title}, a {} story.", genre.to_lowercase());
            doc! {
                "title": title,
                "year": year,
                "rated": rated,
                "genres": [genre],
                "runtime": runtime,
                "imdb": { "rating": rating, "votes": votes },
                "awards": { "wins": wins },
                "metacritic": metacritic,
                "boxOffice": box_office,
                "fullplot": plot,
            }
        })
        .collect()
}
