//! HTTP routes for the catalog.
//!
//! ## Routes (all under `/api/movies`)
//!
//! - `GET /`: first page of movies
//! - `GET /all`: every movie
//! - `GET /:segment`: a movie by id (24 hex digits) or a page of movies
//! - `GET /year/:year`: movies released in a year
//! - `GET /best/:page`: a page of the best-of ranking
//! - `POST /`: create a movie from the JSON body
//! - `PUT /:id`: merge the JSON body into one movie
//! - `PUT /`: bulk update, body `{ "filter": {...}, "update": {...} }`
//! - `DELETE /:id`: delete one movie

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::info;

use store::{DeleteAck, InsertAck, UpdateAck};

use crate::catalog::{BulkUpdate, MovieCatalog};
use crate::error::{ApiError, ApiResult};
use crate::json::{document_field, document_from_json, document_to_json, documents_to_json};
use crate::params::{classify_segment, parse_movie_id, parse_page, parse_year, Segment};

type Catalog = State<Arc<MovieCatalog>>;

/// Build the application router.
pub fn router(catalog: Arc<MovieCatalog>) -> Router {
    Router::new()
        .nest("/api/movies", movie_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}

fn movie_routes() -> Router<Arc<MovieCatalog>> {
    Router::new()
        .route(
            "/",
            get(list_first_page).post(create_movie).put(update_movies),
        )
        .route("/all", get(list_all))
        .route("/year/:year", get(find_by_year))
        .route("/best/:page", get(best_of))
        .route(
            "/:segment",
            get(get_segment).put(update_movie).delete(delete_movie),
        )
}

/// Serve the catalog over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve(catalog: Arc<MovieCatalog>, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(catalog)).await
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid(rejection.body_text()))
}

// =============================================================================
// Reads
// =============================================================================

async fn list_first_page(State(catalog): Catalog) -> ApiResult<Json<Value>> {
    Ok(Json(documents_to_json(catalog.list_page(1).await?)))
}

async fn list_all(State(catalog): Catalog) -> ApiResult<Json<Value>> {
    Ok(Json(documents_to_json(catalog.list_all().await?)))
}

async fn get_segment(
    State(catalog): Catalog,
    Path(segment): Path<String>,
) -> ApiResult<Json<Value>> {
    let body = match classify_segment(&segment)? {
        Segment::Id(id) => catalog
            .get_by_id(id)
            .await?
            .map(document_to_json)
            .unwrap_or(Value::Null),
        Segment::Page(page) => documents_to_json(catalog.list_page(page).await?),
    };
    Ok(Json(body))
}

async fn find_by_year(State(catalog): Catalog, Path(year): Path<String>) -> ApiResult<Json<Value>> {
    let year = parse_year(&year)?;
    Ok(Json(documents_to_json(catalog.find_by_year(year).await?)))
}

async fn best_of(State(catalog): Catalog, Path(page): Path<String>) -> ApiResult<Json<Value>> {
    let page = parse_page(&page)?;
    Ok(Json(documents_to_json(catalog.best_of(page).await?)))
}

// =============================================================================
// Writes
// =============================================================================

async fn create_movie(
    State(catalog): Catalog,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<InsertAck>> {
    let movie = document_from_json(json_body(body)?)?;
    Ok(Json(catalog.create(movie).await?))
}

async fn update_movie(
    State(catalog): Catalog,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<UpdateAck>> {
    let id = parse_movie_id(&id)?;
    let changes = document_from_json(json_body(body)?)?;
    Ok(Json(catalog.update_one(id, changes).await?))
}

async fn update_movies(
    State(catalog): Catalog,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<UpdateAck>> {
    let Value::Object(mut body) = json_body(body)? else {
        return Err(ApiError::invalid("request body must be a JSON object"));
    };
    let request = BulkUpdate {
        filter: document_field(&mut body, "filter")?,
        update: document_field(&mut body, "update")?,
    };
    Ok(Json(catalog.update_many(request).await?))
}

async fn delete_movie(
    State(catalog): Catalog,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteAck>> {
    let id = parse_movie_id(&id)?;
    Ok(Json(catalog.delete_one(id).await?))
}
