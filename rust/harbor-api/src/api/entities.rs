//! Entity persistence endpoints.
//!
//! One route serves all sixteen kinds; the kind in the path selects the
//! namespace. Unknown kind names are a 404.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::store::{EntityDraft, EntityKind, EntityRecord};
use crate::AppState;

/// Create the entities router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/v1/entities/{kind}",
        post(append_entity).get(query_entities),
    )
}

/// Append an entity event into its kind namespace.
async fn append_entity(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(draft): Json<EntityDraft>,
) -> ApiResult<(StatusCode, Json<EntityRecord>)> {
    let kind: EntityKind = kind.parse()?;
    let record = state.store.append(kind, draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Query parameters for entity reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityQuery {
    channel: Option<String>,
    user_uuid: Option<String>,
    /// Incremental sync cursor: only records with a strictly greater
    /// `serverTimestamp` are returned.
    since: Option<i64>,
}

/// Query records for a kind, scoped by channel and optionally by actor.
async fn query_entities(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<EntityQuery>,
) -> ApiResult<Json<Vec<EntityRecord>>> {
    let kind: EntityKind = kind.parse()?;
    let channel = query
        .channel
        .ok_or_else(|| ApiError::validation("Query parameter 'channel' is required"))?;

    let records = match query.user_uuid {
        Some(user_uuid) => {
            state
                .store
                .query_by_user(kind, &channel, &user_uuid)
                .await?
        }
        None => {
            state
                .store
                .query_by_channel(kind, &channel, query.since)
                .await?
        }
    };

    Ok(Json(records))
}
