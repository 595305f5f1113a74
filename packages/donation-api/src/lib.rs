//! # Donation API
//!
//! HTTP service around the donation fee split: foundation registry and fee
//! settings, breakdown previews, online donation intents, CSR donation records
//! with an audit trail, the aggregated donation pool, and pincode-based
//! delivery charges.
//!
//! ## Quick Start
//! ```bash
//! DONATION_API_KEY=dev cargo run --bin donation-api
//! ```
//!
//! ## Endpoints
//! - `GET /health`, `GET /ready`, `GET /metrics`
//! - `GET /foundations/active` - Active foundations for the donation page
//! - `POST /foundation-settings/preview` - Fee breakdown for an amount
//! - `POST /donations` - Record a pending online donation
//! - `GET /donations/donors`, `GET /donations/leaderboard` - Public donor wall
//! - `GET|POST /validate-pincode` - Delivery charge for a pincode
//! - `/admin/...` - Foundations, settings, donations, donation pool, CSR records,
//!   delivery areas (API key)

pub mod config;
pub mod csr;
pub mod delivery;
pub mod donations;
mod error;
mod handlers;
pub mod metrics;
mod middleware;
pub mod models;
pub mod pool;
pub mod registry;
mod response;
mod router;
mod state;
pub mod store;

pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
