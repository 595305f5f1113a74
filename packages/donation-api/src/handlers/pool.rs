//! Donation pool summary for the admin dashboard.

use crate::error::{Error, QueryParams};
use crate::pool::{self, PoolFilter};
use crate::response::Success;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct PoolResponse {
    pool: pool::PoolSummary,
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    QueryParams(filter): QueryParams<PoolFilter>,
) -> Result<impl IntoResponse, Error> {
    let summary = pool::summarize(&*state.store.read().await, &filter, Utc::now())?;
    Ok(Json(Success::new(PoolResponse { pool: summary })))
}
