//! Persisted record types.

use chrono::{DateTime, Utc};
use donation_types::{FeeConfig, PercentSnapshot};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_ICON: &str = "❤️";
pub const DEFAULT_PRIMARY_COLOR: &str = "#10b981";

/// Random record id, e.g. `fnd-1f3a9c0d2b4e5f60`.
pub fn new_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    format!("{prefix}-{:016x}", rng.gen::<u64>())
}

// --- Foundations ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationStats {
    pub total_donations: u64,
    pub total_amount: f64,
    pub donor_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Foundation {
    pub id: String,
    pub foundation_name: String,
    pub code: String,
    pub foundation_share_percent: f64,
    /// Stored because admins may set it explicitly; always validated against
    /// `foundation_share_percent`.
    pub company_share_percent: f64,
    /// Absent on older records; see [`Foundation::fee_config`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_fee_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub icon: String,
    pub primary_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub is_active: bool,
    pub priority: u32,
    pub minimum_donation: f64,
    #[serde(default)]
    pub stats: FoundationStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Foundation {
    /// Fee configuration with the platform-fee default applied.
    pub fn fee_config(&self) -> FeeConfig {
        FeeConfig::from_stored(self.platform_fee_percent, self.foundation_share_percent)
    }

    pub fn display_name_or_full(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or(&self.foundation_name)
    }
}

/// Foundation as shown on the public donation page (no stats or timestamps).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicFoundation {
    pub id: String,
    pub foundation_name: String,
    pub display_name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub icon: String,
    pub primary_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub priority: u32,
    pub minimum_donation: f64,
    pub platform_fee_percent: f64,
    pub foundation_share_percent: f64,
    pub company_share_percent: f64,
}

impl From<&Foundation> for PublicFoundation {
    fn from(f: &Foundation) -> Self {
        let fees = f.fee_config();
        Self {
            id: f.id.clone(),
            foundation_name: f.foundation_name.clone(),
            display_name: f.display_name_or_full().to_string(),
            code: f.code.clone(),
            tagline: f.tagline.clone(),
            description: f.description.clone(),
            logo_url: f.logo_url.clone(),
            icon: f.icon.clone(),
            primary_color: f.primary_color.clone(),
            website: f.website.clone(),
            priority: f.priority,
            minimum_donation: f.minimum_donation,
            platform_fee_percent: fees.platform_fee_percent,
            foundation_share_percent: fees.foundation_share_percent,
            company_share_percent: fees.company_share_percent(),
        }
    }
}

/// Short reference to a foundation embedded in record listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationRef {
    pub id: String,
    pub foundation_name: String,
    pub display_name: String,
    pub code: String,
}

impl From<&Foundation> for FoundationRef {
    fn from(f: &Foundation) -> Self {
        Self {
            id: f.id.clone(),
            foundation_name: f.foundation_name.clone(),
            display_name: f.display_name_or_full().to_string(),
            code: f.code.clone(),
        }
    }
}

// --- CSR donations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsrStatus {
    Pending,
    Verified,
    Rejected,
    Received,
    CertificateIssued,
}

impl CsrStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            "received" => Some(Self::Received),
            "certificate_issued" => Some(Self::CertificateIssued),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Received => "received",
            Self::CertificateIssued => "certificate_issued",
        }
    }
}

/// Where a CSR record's fee fields came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakdownSource {
    Calculated,
    /// Supplied by the admin and stored without recomputation.
    Override,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub edited_by: String,
    pub edited_at: DateTime<Utc>,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrDonation {
    pub id: String,
    pub company_name: String,
    pub amount: f64,
    pub number_of_people: u32,
    /// Foundation id.
    pub foundation: String,
    pub platform_fee: f64,
    pub foundation_share: f64,
    pub company_share: f64,
    pub breakdown_source: BreakdownSource,
    /// Percentages used for a calculated breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentages: Option<PercentSnapshot>,
    pub date: DateTime<Utc>,
    pub status: CsrStatus,
    #[serde(default)]
    pub notes: String,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<String>,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Online donations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Completed,
    Failed,
}

impl DonationStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub donor_name: String,
    pub email: String,
    pub phone: String,
    pub amount: f64,
    pub platform_fee: f64,
    pub foundation_amount: f64,
    pub company_amount: f64,
    /// Percentages in effect at creation.
    pub percentages: PercentSnapshot,
    pub sticks_equivalent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub status: DonationStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_anonymous: bool,
    /// Foundation id.
    pub foundation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Delivery ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryArea {
    pub pincode: String,
    pub area_name: String,
    pub district: String,
    pub is_active: bool,
    pub delivery_charges: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
