//! Donation fee split: platform fee, then foundation / company shares of the remainder.
//!
//! Every step rounds to two decimals before the next one consumes it. Historical
//! records were produced this way, so the operation order (including
//! `amount * (percent / 100)`) must not change.

use serde::{Deserialize, Serialize};

/// Platform fee applied when a foundation record does not carry one.
pub const DEFAULT_PLATFORM_FEE_PERCENT: f64 = 10.0;

/// Allowed drift when checking that two shares add up to 100.
pub const SPLIT_TOLERANCE: f64 = 0.01;

/// Fee configuration of a single foundation, as consumed by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfig {
    pub platform_fee_percent: f64,
    pub foundation_share_percent: f64,
}

impl FeeConfig {
    pub fn new(platform_fee_percent: f64, foundation_share_percent: f64) -> Self {
        Self {
            platform_fee_percent,
            foundation_share_percent,
        }
    }

    /// Build from a stored foundation record. The platform fee is optional on
    /// stored records and falls back to [`DEFAULT_PLATFORM_FEE_PERCENT`] here,
    /// and only here.
    pub fn from_stored(platform_fee_percent: Option<f64>, foundation_share_percent: f64) -> Self {
        Self::new(
            platform_fee_percent.unwrap_or(DEFAULT_PLATFORM_FEE_PERCENT),
            foundation_share_percent,
        )
    }

    pub fn company_share_percent(&self) -> f64 {
        100.0 - self.foundation_share_percent
    }

    pub fn snapshot(&self) -> PercentSnapshot {
        PercentSnapshot {
            platform_fee_percent: self.platform_fee_percent,
            foundation_share_percent: self.foundation_share_percent,
            company_share_percent: self.company_share_percent(),
        }
    }
}

/// Percentages in effect when a record was written.
///
/// Intentionally denormalised: records keep the values they were computed
/// with even after the foundation's configuration changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentSnapshot {
    pub platform_fee_percent: f64,
    pub foundation_share_percent: f64,
    pub company_share_percent: f64,
}

/// Three-way split of a gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub gross_amount: f64,
    pub platform_fee: f64,
    pub after_platform_fee: f64,
    pub foundation_share: f64,
    pub company_share: f64,
}

impl Breakdown {
    /// Sum of the three distributed parts.
    pub fn distributed(&self) -> f64 {
        self.platform_fee + self.foundation_share + self.company_share
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Split `gross_amount` according to `config`.
///
/// Pure arithmetic; callers validate the amount and the configuration.
pub fn compute_breakdown(gross_amount: f64, config: &FeeConfig) -> Breakdown {
    let platform_fee = round2(gross_amount * (config.platform_fee_percent / 100.0));
    let after_platform_fee = round2(gross_amount - platform_fee);
    let foundation_share =
        round2(after_platform_fee * (config.foundation_share_percent / 100.0));
    let company_share = round2(after_platform_fee - foundation_share);

    Breakdown {
        gross_amount,
        platform_fee,
        after_platform_fee,
        foundation_share,
        company_share,
    }
}
