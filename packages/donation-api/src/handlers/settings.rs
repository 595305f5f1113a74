//! Fee settings and the public breakdown preview.

use crate::error::{Error, Payload};
use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::registry::{self, FeeSettings, PreviewRequest, SettingsUpdate};
use crate::response::Success;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

/// `GET /admin/foundation-settings`. Seeds the default foundations into an
/// empty registry when enabled.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, Error> {
    if state.config.seed_default_foundations && state.store.read().await.foundations.is_empty() {
        let seeded = state
            .store
            .mutate(|db| registry::seed_defaults(db, Utc::now()))
            .await?;
        if seeded {
            info!("Seeded default foundations");
        }
    }

    let db = state.store.read().await;
    let settings: Vec<FeeSettings> = registry::sorted(&db, true)
        .into_iter()
        .map(FeeSettings::from)
        .collect();
    Ok(Json(json!({ "success": true, "settings": settings })))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    RequestId(req_id): RequestId,
    Payload(req): Payload<SettingsUpdate>,
) -> Result<impl IntoResponse, Error> {
    let foundation = state
        .store
        .mutate(|db| registry::update_settings(db, req, Utc::now()))
        .await?;
    let settings = FeeSettings::from(&foundation);

    info!(
        req_id = %req_id,
        code = %settings.foundation_code,
        platform_fee = settings.platform_fee_percent,
        foundation_share = settings.foundation_share_percent,
        "Foundation fee settings updated"
    );
    Ok(Json(json!({
        "success": true,
        "message": "Settings updated successfully",
        "settings": settings
    })))
}

/// `POST /foundation-settings/preview`.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<PreviewRequest>,
) -> Result<impl IntoResponse, Error> {
    let preview = registry::preview(&*state.store.read().await, req)?;
    METRICS.previews.fetch_add(1, Ordering::Relaxed);
    Ok(Json(Success::new(preview)))
}
