//! CSR donation record endpoints.

use crate::csr::{self, CsrFilter, CsrPatch, NewCsrDonation};
use crate::error::{Error, Payload, QueryParams};
use crate::metrics::METRICS;
use crate::middleware::{AdminId, RequestId};
use crate::models::BreakdownSource;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn list(
    State(state): State<Arc<AppState>>,
    QueryParams(filter): QueryParams<CsrFilter>,
) -> Result<impl IntoResponse, Error> {
    let donations = csr::list(&*state.store.read().await, &filter)?;
    Ok(Json(json!({
        "success": true,
        "count": donations.len(),
        "donations": donations
    })))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    AdminId(admin): AdminId,
    Payload(req): Payload<NewCsrDonation>,
) -> Result<impl IntoResponse, Error> {
    let record = state
        .store
        .mutate(|db| csr::create(db, req, &admin, Utc::now()))
        .await?;
    METRICS.csr_created.fetch_add(1, Ordering::Relaxed);

    if record.breakdown_source == BreakdownSource::Override {
        METRICS.csr_overrides.fetch_add(1, Ordering::Relaxed);
        warn!(
            req_id = %req_id,
            id = %record.id,
            admin = %admin,
            amount = record.amount,
            platform_fee = record.platform_fee,
            foundation_share = record.foundation_share,
            company_share = record.company_share,
            "CSR donation stored with admin-supplied fee split"
        );
    } else {
        info!(req_id = %req_id, id = %record.id, admin = %admin, amount = record.amount, "CSR donation created");
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "CSR donation created successfully",
            "donation": record
        })),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    AdminId(admin): AdminId,
    Path(id): Path<String>,
    Payload(patch): Payload<CsrPatch>,
) -> Result<impl IntoResponse, Error> {
    let outcome = state
        .store
        .mutate(|db| csr::update(db, &id, patch, &admin, Utc::now()))
        .await?;

    if outcome.changes.is_empty() {
        return Ok(Json(json!({
            "success": true,
            "message": "No changes detected",
            "donation": outcome.record
        })));
    }

    info!(
        req_id = %req_id,
        id = %outcome.record.id,
        admin = %admin,
        changes = outcome.changes.len(),
        "CSR donation updated"
    );
    Ok(Json(json!({
        "success": true,
        "message": "CSR donation updated successfully",
        "changes": outcome.changes,
        "donation": outcome.record
    })))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    AdminId(admin): AdminId,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let removed = state.store.mutate(|db| csr::delete(db, &id)).await?;

    info!(req_id = %req_id, id = %removed.id, admin = %admin, "CSR donation deleted");
    Ok(Json(json!({
        "success": true,
        "message": "CSR donation deleted successfully"
    })))
}
