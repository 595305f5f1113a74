//! Foundation registry endpoints.

use crate::error::{Error, Payload};
use crate::middleware::RequestId;
use crate::models::PublicFoundation;
use crate::registry::{self, FoundationPatch, NewFoundation};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// `GET /foundations/active` for the public donation page.
pub async fn active(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db = state.store.read().await;
    let foundations: Vec<PublicFoundation> = registry::sorted(&db, true)
        .into_iter()
        .map(PublicFoundation::from)
        .collect();
    Json(json!({ "success": true, "foundations": foundations }))
}

pub async fn list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db = state.store.read().await;
    let foundations = registry::sorted(&db, false);
    Json(json!({ "success": true, "foundations": foundations }))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let db = state.store.read().await;
    let foundation = db
        .foundations
        .get(&id)
        .ok_or_else(|| Error::NotFound("Foundation not found".into()))?;
    Ok(Json(json!({ "success": true, "foundation": foundation })))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Payload(req): Payload<NewFoundation>,
) -> Result<impl IntoResponse, Error> {
    let foundation = state
        .store
        .mutate(|db| registry::create(db, req, Utc::now()))
        .await?;

    info!(req_id = %req_id, id = %foundation.id, code = %foundation.code, "Foundation created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "foundation": foundation })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Path(id): Path<String>,
    Payload(patch): Payload<FoundationPatch>,
) -> Result<impl IntoResponse, Error> {
    let foundation = state
        .store
        .mutate(|db| registry::update(db, &id, patch, Utc::now()))
        .await?;

    info!(req_id = %req_id, id = %foundation.id, "Foundation updated");
    Ok(Json(json!({ "success": true, "foundation": foundation })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let removed = state.store.mutate(|db| registry::delete(db, &id)).await?;

    info!(req_id = %req_id, id = %removed.id, code = %removed.code, "Foundation deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Foundation deleted successfully"
    })))
}
