//! HTTP router setup.

use crate::handlers::{self, csr, delivery, donations, foundations, pool, settings};
use crate::middleware::{api_key_auth, inject_request_id};
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Create the application router.
pub fn create(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/foundations", get(foundations::list).post(foundations::create))
        .route(
            "/foundations/{id}",
            get(foundations::get)
                .patch(foundations::update)
                .delete(foundations::delete),
        )
        .route(
            "/foundation-settings",
            get(settings::list).post(settings::update),
        )
        .route("/donations", get(donations::list))
        .route("/donations/{id}/status", patch(donations::set_status))
        .route("/donation-pool", get(pool::summary))
        .route("/csr-donations", get(csr::list).post(csr::create))
        .route(
            "/csr-donations/{id}",
            patch(csr::update).delete(csr::delete),
        )
        .route("/delivery-areas", get(delivery::list).post(delivery::create))
        .route("/delivery-areas/bulk-import", post(delivery::bulk_import))
        .route(
            "/delivery-areas/{pincode}",
            patch(delivery::update).delete(delivery::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), api_key_auth));

    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .route("/foundations/active", get(foundations::active))
        .route("/foundation-settings/preview", post(settings::preview))
        .route("/donations", post(donations::create))
        .route("/donations/donors", get(donations::donors))
        .route("/donations/leaderboard", get(donations::leaderboard))
        .route(
            "/validate-pincode",
            get(delivery::validate_query).post(delivery::validate_body),
        )
        .nest("/admin", admin)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(inject_request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// Any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(60 * 60));

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}
