//! HTTP request handlers.

pub mod csr;
pub mod delivery;
pub mod donations;
pub mod foundations;
pub mod pool;
pub mod settings;

use crate::metrics::METRICS;
use crate::registry;
use crate::response::{HealthResponse, RecordCounts};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Readiness probe. 200 while serving, 503 once shutdown has begun.
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active = registry::sorted(&*state.store.read().await, true).len();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        METRICS.render(active),
    )
}

/// Health check with record counts.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let records = {
        let db = state.store.read().await;
        RecordCounts {
            foundations: db.foundations.len(),
            active_foundations: db.foundations.values().filter(|f| f.is_active).count(),
            donations: db.donations.len(),
            csr_donations: db.csr_donations.len(),
            delivery_areas: db.delivery_areas.len(),
        }
    };

    Json(HealthResponse {
        status: if state.is_ready() { "ok" } else { "shutting_down" },
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: METRICS.http_requests.load(Ordering::Relaxed),
        store_dirty: state.store.is_dirty(),
        records,
    })
}
