//! Service configuration.

use serde::Deserialize;

/// Configuration for the donation API.
///
/// Loaded from an optional `donation-api.toml` and `DONATION_*` environment
/// variables (nested keys use `__`, e.g. `DONATION_DELIVERY__DEFAULT_CHARGES`).
#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    #[serde(default = "defaults::data_path")]
    pub data_path: String,

    #[serde(default = "defaults::flush_interval_secs")]
    pub flush_interval_secs: u64,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Empty = any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub delivery: DeliverySettings,

    #[serde(default = "defaults::seed_default_foundations")]
    pub seed_default_foundations: bool,

    /// Admin API key (`DONATION_API_KEY`). `None` = dev mode, admin routes open.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base64 AES-256 key for the store file (`DONATION_STORE_KEY`). `None` = plaintext.
    #[serde(default)]
    pub store_key: Option<String>,
}

/// Delivery charge rules for pincode lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliverySettings {
    #[serde(default = "defaults::default_charges")]
    pub default_charges: f64,

    #[serde(default = "defaults::free_delivery_threshold")]
    pub free_delivery_threshold: f64,

    #[serde(default = "defaults::pincode_length")]
    pub pincode_length: usize,

    #[serde(default = "defaults::strict_pincode")]
    pub strict_pincode: bool,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(config::File::with_name("donation-api").required(false))
    }

    fn load_with<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("DONATION")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn store_key(&self) -> Option<&str> {
        self.store_key.as_deref().filter(|k| !k.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: defaults::bind_address(),
            data_path: defaults::data_path(),
            flush_interval_secs: defaults::flush_interval_secs(),
            request_timeout_secs: defaults::request_timeout_secs(),
            cors_allowed_origins: Vec::new(),
            delivery: DeliverySettings::default(),
            seed_default_foundations: defaults::seed_default_foundations(),
            api_key: None,
            store_key: None,
        }
    }
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            default_charges: defaults::default_charges(),
            free_delivery_threshold: defaults::free_delivery_threshold(),
            pincode_length: defaults::pincode_length(),
            strict_pincode: defaults::strict_pincode(),
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("data_path", &self.data_path)
            .field("flush_interval_secs", &self.flush_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("delivery", &self.delivery)
            .field("seed_default_foundations", &self.seed_default_foundations)
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("store_key", &self.store_key().map(|_| "<redacted>"))
            .finish()
    }
}

mod defaults {
    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn data_path() -> String {
        "./data/donation-store.json".into()
    }

    pub fn flush_interval_secs() -> u64 {
        5
    }

    pub fn request_timeout_secs() -> u64 {
        30
    }

    pub fn seed_default_foundations() -> bool {
        true
    }

    pub fn default_charges() -> f64 {
        500.0
    }

    pub fn free_delivery_threshold() -> f64 {
        2000.0
    }

    pub fn pincode_length() -> usize {
        donation_types::DEFAULT_PINCODE_LENGTH
    }

    pub fn strict_pincode() -> bool {
        true
    }
}
