//! Response types for the donation API.

use serde::Serialize;

/// Plain `{"success": true, ...}` envelope around a payload.
#[derive(Serialize)]
pub struct Success<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Response from the health endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub requests: u64,
    pub store_dirty: bool,
    pub records: RecordCounts,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCounts {
    pub foundations: usize,
    pub active_foundations: usize,
    pub donations: usize,
    pub csr_donations: usize,
    pub delivery_areas: usize,
}
