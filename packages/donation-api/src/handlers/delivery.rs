//! Pincode validation and delivery area administration.

use crate::delivery::{self, AreaInput, AreaPatch, BulkImport};
use crate::error::{Error, Payload, QueryParams};
use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::response::Success;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PincodeQuery {
    pub pincode: Option<String>,
    #[serde(default)]
    pub order_amount: f64,
}

/// `GET /validate-pincode?pincode=..&orderAmount=..`
pub async fn validate_query(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<PincodeQuery>,
) -> Result<impl IntoResponse, Error> {
    lookup(&state, query).await
}

/// `POST /validate-pincode`
pub async fn validate_body(
    State(state): State<Arc<AppState>>,
    Payload(query): Payload<PincodeQuery>,
) -> Result<impl IntoResponse, Error> {
    lookup(&state, query).await
}

async fn lookup(state: &AppState, query: PincodeQuery) -> Result<impl IntoResponse, Error> {
    let pincode = query
        .pincode
        .ok_or_else(|| Error::Validation("Pincode is required".into()))?;
    METRICS.pincode_lookups.fetch_add(1, Ordering::Relaxed);

    let check = delivery::resolve_delivery_charge(
        &pincode,
        query.order_amount,
        &state.config.delivery,
        &*state.store.read().await,
    );
    Ok(Json(Success::new(check)))
}

pub async fn list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let areas = delivery::list(&*state.store.read().await);
    Json(json!({ "success": true, "areas": areas }))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Payload(input): Payload<AreaInput>,
) -> Result<impl IntoResponse, Error> {
    let area = state
        .store
        .mutate(|db| delivery::create(db, input, Utc::now()))
        .await?;

    info!(req_id = %req_id, pincode = %area.pincode, "Delivery area added");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "area": area })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Path(pincode): Path<String>,
    Payload(patch): Payload<AreaPatch>,
) -> Result<impl IntoResponse, Error> {
    let area = state
        .store
        .mutate(|db| delivery::update(db, &pincode, patch, Utc::now()))
        .await?;

    info!(req_id = %req_id, pincode = %area.pincode, "Delivery area updated");
    Ok(Json(json!({ "success": true, "area": area })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Path(pincode): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let removed = state
        .store
        .mutate(|db| delivery::delete(db, &pincode))
        .await?;

    info!(req_id = %req_id, pincode = %removed.pincode, "Delivery area removed");
    Ok(Json(json!({
        "success": true,
        "message": "Delivery area deleted successfully"
    })))
}

pub async fn bulk_import(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Payload(import): Payload<BulkImport>,
) -> Result<impl IntoResponse, Error> {
    let report = state
        .store
        .mutate(|db| Ok(delivery::bulk_import(db, import.areas, Utc::now())))
        .await?;

    info!(
        req_id = %req_id,
        imported = report.imported,
        updated = report.updated,
        failed = report.failed.len(),
        "Delivery areas imported"
    );
    Ok(Json(Success::new(report)))
}
