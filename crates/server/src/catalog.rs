//! MovieCatalog - the catalog operations behind every endpoint.
//!
//! Handlers parse requests, the catalog validates what is left and talks to
//! the store. Written against `DocumentStore` so tests and the CLI can run it
//! over `InMemoryStore`.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::{debug, info};

use pipeline::{best_of_pipeline, list_skip};
use store::update::validate_update;
use store::{
    doc, DeleteAck, Document, DocumentStore, FindOptions, InsertAck, MovieId, UpdateAck,
};

use crate::config::CatalogConfig;
use crate::error::{ApiError, ApiResult};

/// A filter/update pair for bulk updates.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkUpdate {
    /// Documents to update
    pub filter: Document,
    /// Update operators to apply to each of them
    pub update: Document,
}

/// The movie catalog.
#[derive(Clone)]
pub struct MovieCatalog {
    store: Arc<dyn DocumentStore>,
    config: CatalogConfig,
    pinned_year: Option<i32>,
}

impl MovieCatalog {
    pub fn new(store: Arc<dyn DocumentStore>, config: CatalogConfig) -> Self {
        info!(
            "Movie catalog ready on {} store (page size {})",
            store.name(),
            config.page_size
        );
        Self {
            store,
            config,
            pinned_year: None,
        }
    }

    /// Evaluate the best-of lookback window against a fixed year instead of
    /// the clock (builder pattern).
    pub fn pinned_to_year(mut self, year: i32) -> Self {
        self.pinned_year = Some(year);
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn current_year(&self) -> i32 {
        self.pinned_year.unwrap_or_else(|| Utc::now().year())
    }

    fn page_window(&self, page: u64) -> ApiResult<FindOptions> {
        if page == 0 {
            return Err(ApiError::invalid("page numbers start at 1"));
        }
        Ok(FindOptions::window(
            list_skip(page, self.config.page_size),
            i64::from(self.config.page_size),
        ))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// One page of movies in the store's natural order.
    pub async fn list_page(&self, page: u64) -> ApiResult<Vec<Document>> {
        let window = self.page_window(page)?;
        let movies = self.store.find(doc! {}, window).await?;
        info!("Listed page {}: {} movies", page, movies.len());
        Ok(movies)
    }

    /// Every movie in the collection.
    pub async fn list_all(&self) -> ApiResult<Vec<Document>> {
        let movies = self.store.find(doc! {}, FindOptions::default()).await?;
        info!("Listed all {} movies", movies.len());
        Ok(movies)
    }

    pub async fn get_by_id(&self, id: MovieId) -> ApiResult<Option<Document>> {
        let movie = self.store.find_one(id.filter()).await?;
        info!("Lookup of {}: found {}", id, movie.is_some());
        Ok(movie)
    }

    /// Movies released in `year`, at most one page of them.
    pub async fn find_by_year(&self, year: i32) -> ApiResult<Vec<Document>> {
        let window = FindOptions::window(0, i64::from(self.config.page_size));
        let movies = self.store.find(doc! { "year": year }, window).await?;
        info!("Found {} movies from {}", movies.len(), year);
        Ok(movies)
    }

    /// One page of the best-of ranking.
    pub async fn best_of(&self, page: u64) -> ApiResult<Vec<Document>> {
        if page == 0 {
            return Err(ApiError::invalid("page numbers start at 1"));
        }
        let pipeline = best_of_pipeline(&self.config.best_of_criteria(), page, self.current_year());
        debug!("Best-of stages: {:?}", pipeline.stage_names());
        let movies = self.store.aggregate(pipeline.build()).await?;
        info!("Best-of page {}: {} movies", page, movies.len());
        Ok(movies)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub async fn create(&self, movie: Document) -> ApiResult<InsertAck> {
        let ack = self.store.insert_one(movie).await?;
        info!("Created movie {}", ack.inserted_id);
        Ok(ack)
    }

    /// Merge `changes` into the movie with the given id.
    ///
    /// `changes` holds plain field values (dotted paths allowed); `_id` is
    /// ignored. No match is not an error: the ack reports zero matches.
    pub async fn update_one(&self, id: MovieId, changes: Document) -> ApiResult<UpdateAck> {
        let update = set_update(changes)?;
        let ack = self.store.update_one(id.filter(), update).await?;
        info!(
            "Updated movie {}: matched {}, modified {}",
            id, ack.matched_count, ack.modified_count
        );
        Ok(ack)
    }

    /// Update every movie matching a filter.
    ///
    /// The update is either plain field values, merged like `update_one`, or
    /// a document made only of `$set`/`$unset` operators, passed through as is.
    /// Other operators are rejected before the store is called.
    pub async fn update_many(&self, request: BulkUpdate) -> ApiResult<UpdateAck> {
        let operators_only =
            !request.update.is_empty() && request.update.keys().all(|key| key.starts_with('$'));
        let update = if operators_only {
            validate_update(&request.update).map_err(|err| ApiError::invalid(err.to_string()))?;
            request.update
        } else {
            set_update(request.update)?
        };
        let ack = self.store.update_many(request.filter, update).await?;
        info!(
            "Bulk update: matched {}, modified {}",
            ack.matched_count, ack.modified_count
        );
        Ok(ack)
    }

    pub async fn delete_one(&self, id: MovieId) -> ApiResult<DeleteAck> {
        let ack = self.store.delete_one(id.filter()).await?;
        info!("Deleted movie {}: {} removed", id, ack.deleted_count);
        Ok(ack)
    }
}

/// Turn a partial movie into a `$set` update.
fn set_update(mut changes: Document) -> ApiResult<Document> {
    changes.remove("_id");
    if changes.is_empty() {
        return Err(ApiError::invalid("update must change at least one field"));
    }
    if let Some(operator) = changes.keys().find(|key| key.starts_with('$')) {
        return Err(ApiError::invalid(format!(
            "field names must not start with '$' (found '{operator}')"
        )));
    }
    Ok(doc! { "$set": changes })
}
