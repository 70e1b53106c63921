//! Library catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::store::{CatalogOrder, LibraryItem, LibraryItemDraft};
use crate::AppState;

/// Create the library router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/library", post(publish_item).get(list_items))
        .route("/api/v1/library/{uuid}/votes", post(increment_votes))
        .route("/api/v1/library/{uuid}/copies", post(increment_copies))
}

/// Publish a catalog item. Duplicate uuids are rejected.
async fn publish_item(
    State(state): State<AppState>,
    Json(draft): Json<LibraryItemDraft>,
) -> ApiResult<(StatusCode, Json<LibraryItem>)> {
    let item = state.catalog.publish(draft).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Counter adjustment request.
#[derive(Debug, Deserialize)]
struct IncrementRequest {
    #[serde(default = "default_delta")]
    delta: i64,
}

fn default_delta() -> i64 {
    1
}

/// Atomically adjust an item's vote counter.
async fn increment_votes(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(req): Json<IncrementRequest>,
) -> ApiResult<Json<LibraryItem>> {
    let item = state.catalog.increment_votes(&uuid, req.delta).await?;
    Ok(Json(item))
}

/// Atomically adjust an item's copy counter.
async fn increment_copies(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(req): Json<IncrementRequest>,
) -> ApiResult<Json<LibraryItem>> {
    let item = state.catalog.increment_copies(&uuid, req.delta).await?;
    Ok(Json(item))
}

/// Listing parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    #[serde(default)]
    order_by: CatalogOrder,
    #[serde(default = "default_descending")]
    descending: bool,
}

fn default_descending() -> bool {
    true
}

/// List catalog items in the requested order.
async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<LibraryItem>>> {
    let items = state.catalog.list(query.order_by, query.descending).await?;
    Ok(Json(items))
}
