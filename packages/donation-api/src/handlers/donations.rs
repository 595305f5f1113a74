//! Online donation endpoints.

use crate::donations::{self, DonationFilter, DonorQuery, NewDonation, StatusUpdate};
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
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

/// `POST /donations`. Records a pending donation; payment happens elsewhere.
pub async fn create(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Payload(req): Payload<NewDonation>,
) -> Result<impl IntoResponse, Error> {
    let receipt = state
        .store
        .mutate(|db| donations::create(db, req, Utc::now()))
        .await?;
    METRICS.donations_created.fetch_add(1, Ordering::Relaxed);

    info!(
        req_id = %req_id,
        id = %receipt.donation_id,
        foundation = %receipt.foundation.code,
        amount = receipt.breakdown.gross_amount,
        "Donation recorded"
    );
    Ok((StatusCode::CREATED, Json(Success::new(receipt))))
}

/// `GET /donations/donors`. Public donor wall.
pub async fn donors(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<DonorQuery>,
) -> impl IntoResponse {
    let wall = donations::donor_wall(&*state.store.read().await, &query);
    Json(Success::new(wall))
}

pub async fn leaderboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let donors = donations::leaderboard(&*state.store.read().await);
    Json(json!({ "success": true, "donors": donors }))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    QueryParams(filter): QueryParams<DonationFilter>,
) -> Result<impl IntoResponse, Error> {
    let donations = donations::list(&*state.store.read().await, &filter)?;
    Ok(Json(json!({ "success": true, "donations": donations })))
}

pub async fn set_status(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Path(id): Path<String>,
    Payload(update): Payload<StatusUpdate>,
) -> Result<impl IntoResponse, Error> {
    let donation = state
        .store
        .mutate(|db| donations::set_status(db, &id, update, Utc::now()))
        .await?;

    info!(req_id = %req_id, id = %donation.id, status = ?donation.status, "Donation status updated");
    Ok(Json(json!({ "success": true, "donation": donation })))
}
