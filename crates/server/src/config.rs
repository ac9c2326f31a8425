//! Configuration for the catalog and its store.
//!
//! Every option can come from the command line or the environment (clap's
//! `env` support), so the same binaries run unchanged in containers.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use thiserror::Error;
use tracing::info;

use pipeline::BestOfCriteria;
use store::{DocumentStore, InMemoryStore, MongoStore};

/// Tunables shared by every catalog operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Documents per page for listings, year lookups and the best-of ranking
    pub page_size: u32,
    /// Minimum `awards.wins` for the best-of ranking
    pub min_award_wins: i32,
    /// Best-of ranking only considers movies from the last N years
    pub lookback_years: i32,
    /// Optional genre restriction for the best-of ranking (empty = any)
    pub genres: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            min_award_wins: 10,
            lookback_years: 10,
            genres: Vec::new(),
        }
    }
}

/// Rejected configuration values
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i32 },
}

impl CatalogConfig {
    /// Check that the values make sense before serving any request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.min_award_wins < 0 {
            return Err(ConfigError::Negative {
                field: "min_award_wins",
                value: self.min_award_wins,
            });
        }
        if self.lookback_years < 0 {
            return Err(ConfigError::Negative {
                field: "lookback_years",
                value: self.lookback_years,
            });
        }
        Ok(())
    }

    /// Thresholds for the best-of pipeline
    pub fn best_of_criteria(&self) -> BestOfCriteria {
        BestOfCriteria {
            page_size: self.page_size,
            min_award_wins: self.min_award_wins,
            lookback_years: self.lookback_years,
            genres: self.genres.clone(),
        }
    }
}

/// Command-line / environment options for the catalog.
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Documents per page
    #[arg(long, env = "CATALOG_PAGE_SIZE", default_value_t = 20)]
    pub page_size: u32,

    /// Minimum award wins for the best-of ranking
    #[arg(long, env = "CATALOG_MIN_AWARD_WINS", default_value_t = 10)]
    pub min_award_wins: i32,

    /// Best-of ranking looks back this many years
    #[arg(long, env = "CATALOG_LOOKBACK_YEARS", default_value_t = 10)]
    pub lookback_years: i32,

    /// Restrict the best-of ranking to these genres (comma separated)
    #[arg(long, env = "CATALOG_GENRES", value_delimiter = ',')]
    pub genres: Vec<String>,
}

impl CatalogArgs {
    /// Build and validate the catalog configuration.
    pub fn into_config(self) -> Result<CatalogConfig, ConfigError> {
        let config = CatalogConfig {
            page_size: self.page_size,
            min_award_wins: self.min_award_wins,
            lookback_years: self.lookback_years,
            genres: self.genres,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Command-line / environment options selecting the document store.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    /// Database holding the movies collection
    #[arg(long, env = "MOVIES_DATABASE", default_value = "sample_mflix")]
    pub database: String,

    /// Collection of movie documents
    #[arg(long, env = "MOVIES_COLLECTION", default_value = "movies")]
    pub collection: String,

    /// Use an empty in-memory store instead of MongoDB
    #[arg(long)]
    pub in_memory: bool,
}

impl StoreArgs {
    /// Open the configured store.
    pub async fn open(&self) -> Result<Arc<dyn DocumentStore>> {
        if self.in_memory {
            info!("Using in-memory document store");
            return Ok(Arc::new(InMemoryStore::new()));
        }
        let store = MongoStore::connect(&self.mongo_uri, &self.database, &self.collection)
            .await
            .context("Failed to connect to MongoDB")?;
        info!("Connected to {}", store.namespace());
        Ok(Arc::new(store))
    }
}
