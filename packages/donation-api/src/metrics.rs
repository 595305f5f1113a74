//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub http_requests: AtomicU64,
    pub validation_errors: AtomicU64,

    // --- Fee split ---
    pub previews: AtomicU64,
    pub donations_created: AtomicU64,
    pub csr_created: AtomicU64,
    pub csr_overrides: AtomicU64,

    // --- Delivery ---
    pub pincode_lookups: AtomicU64,

    // --- Store ---
    pub store_flushes: AtomicU64,
    pub store_flush_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            http_requests: AtomicU64::new(0),
            validation_errors: AtomicU64::new(0),
            previews: AtomicU64::new(0),
            donations_created: AtomicU64::new(0),
            csr_created: AtomicU64::new(0),
            csr_overrides: AtomicU64::new(0),
            pincode_lookups: AtomicU64::new(0),
            store_flushes: AtomicU64::new(0),
            store_flush_errors: AtomicU64::new(0),
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, active_foundations: usize) -> String {
        let http_requests = self.http_requests.load(Ordering::Relaxed);
        let validation_errors = self.validation_errors.load(Ordering::Relaxed);
        let previews = self.previews.load(Ordering::Relaxed);
        let donations_created = self.donations_created.load(Ordering::Relaxed);
        let csr_created = self.csr_created.load(Ordering::Relaxed);
        let csr_overrides = self.csr_overrides.load(Ordering::Relaxed);
        let pincode_lookups = self.pincode_lookups.load(Ordering::Relaxed);
        let store_flushes = self.store_flushes.load(Ordering::Relaxed);
        let store_flush_errors = self.store_flush_errors.load(Ordering::Relaxed);

        format!(
            "\
# HELP donation_http_requests_total Total HTTP requests received.\n\
# TYPE donation_http_requests_total counter\n\
donation_http_requests_total {http_requests}\n\
# HELP donation_validation_errors_total Requests rejected with 400.\n\
# TYPE donation_validation_errors_total counter\n\
donation_validation_errors_total {validation_errors}\n\
# HELP donation_previews_total Breakdown previews served.\n\
# TYPE donation_previews_total counter\n\
donation_previews_total {previews}\n\
# HELP donation_donations_created_total Online donations recorded.\n\
# TYPE donation_donations_created_total counter\n\
donation_donations_created_total {donations_created}\n\
# HELP donation_csr_created_total CSR donation records created.\n\
# TYPE donation_csr_created_total counter\n\
donation_csr_created_total {csr_created}\n\
# HELP donation_csr_overrides_total CSR records stored with admin-supplied fee fields.\n\
# TYPE donation_csr_overrides_total counter\n\
donation_csr_overrides_total {csr_overrides}\n\
# HELP donation_pincode_lookups_total Pincode delivery charge lookups.\n\
# TYPE donation_pincode_lookups_total counter\n\
donation_pincode_lookups_total {pincode_lookups}\n\
# HELP donation_store_flushes_total Store snapshots written.\n\
# TYPE donation_store_flushes_total counter\n\
donation_store_flushes_total {store_flushes}\n\
# HELP donation_store_flush_errors_total Failed store writes.\n\
# TYPE donation_store_flush_errors_total counter\n\
donation_store_flush_errors_total {store_flush_errors}\n\
# HELP donation_foundations_active Active foundations.\n\
# TYPE donation_foundations_active gauge\n\
donation_foundations_active {active_foundations}\n"
        )
    }
}
