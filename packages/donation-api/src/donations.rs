//! Online donations from the public donation page.

use crate::error::Error;
use crate::models::{new_id, Donation, DonationStatus, FoundationRef};
use crate::registry;
use crate::store::Db;
use chrono::{DateTime, Utc};
use donation_types::{compute_breakdown, round2, Breakdown};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Price of one stick; used for the "sticks equivalent" shown to donors.
pub const STICK_PRICE: f64 = 1499.0;
pub const MAX_DONATION: f64 = 1_000_000.0;
pub const ANONYMOUS_DONOR: &str = "Anonymous Donor";
const TOP_DONORS: usize = 10;

/// `POST /donations` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub amount: Option<f64>,
    pub message: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pan: Option<String>,
    /// Foundation code or id; the default foundation is used when absent.
    pub foundation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceipt {
    pub donation_id: String,
    pub foundation: FoundationRef,
    pub breakdown: Breakdown,
    pub sticks_equivalent: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct DonationFilter {
    pub status: Option<String>,
    pub foundation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: String,
    pub payment_id: Option<String>,
}

pub fn create(db: &mut Db, req: NewDonation, now: DateTime<Utc>) -> Result<DonationReceipt, Error> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let phone = req.phone.as_deref().map(str::trim).unwrap_or_default();
    let amount = req
        .amount
        .ok_or_else(|| Error::Validation("Minimum donation amount is ₹1".into()))?;

    let name_len = name.chars().count();
    if !(2..=100).contains(&name_len) {
        return Err(Error::Validation(
            "Name must be between 2 and 100 characters".into(),
        ));
    }
    if !registry::is_email(email) {
        return Err(Error::Validation("Invalid email address".into()));
    }
    if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Validation("Phone number must be 10 digits".into()));
    }
    if !amount.is_finite() || amount < 1.0 {
        return Err(Error::Validation("Minimum donation amount is ₹1".into()));
    }
    if amount > MAX_DONATION {
        return Err(Error::Validation(
            "Maximum donation amount is ₹10,00,000".into(),
        ));
    }

    let requested = req
        .foundation
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());
    let foundation = requested
        .and_then(|key| registry::find_active(db, key))
        .or_else(|| registry::default_active(db))
        .ok_or_else(|| {
            Error::Validation("No active foundation is accepting donations".into())
        })?;

    if amount < foundation.minimum_donation {
        return Err(Error::Validation(format!(
            "Minimum donation for {} is ₹{}",
            foundation.display_name_or_full(),
            foundation.minimum_donation
        )));
    }

    let config = foundation.fee_config();
    let breakdown = compute_breakdown(amount, &config);
    let sticks_equivalent = amount / STICK_PRICE;

    let donation = Donation {
        id: new_id("don"),
        donor_name: name.to_string(),
        email: email.to_lowercase(),
        phone: phone.to_string(),
        amount,
        platform_fee: breakdown.platform_fee,
        foundation_amount: breakdown.foundation_share,
        company_amount: breakdown.company_share,
        percentages: config.snapshot(),
        sticks_equivalent,
        payment_id: None,
        order_id: None,
        status: DonationStatus::Pending,
        message: req.message.map(|m| m.trim().to_string()).unwrap_or_default(),
        is_anonymous: req.is_anonymous,
        foundation: foundation.id.clone(),
        address: optional(req.address),
        city: optional(req.city),
        state: optional(req.state),
        pan: optional(req.pan).map(|p| p.to_uppercase()),
        created_at: now,
        updated_at: now,
    };
    let receipt = DonationReceipt {
        donation_id: donation.id.clone(),
        foundation: FoundationRef::from(foundation),
        breakdown,
        sticks_equivalent,
    };

    db.donations.insert(donation.id.clone(), donation);
    Ok(receipt)
}

/// Newest first.
pub fn list(db: &Db, filter: &DonationFilter) -> Result<Vec<Donation>, Error> {
    let status = match filter.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
        Some(s) => Some(
            DonationStatus::parse(s)
                .ok_or_else(|| Error::Validation(format!("Invalid status: {s}")))?,
        ),
        None => None,
    };
    let foundation = filter
        .foundation
        .as_deref()
        .filter(|f| !f.is_empty() && *f != "all")
        .map(|key| {
            registry::find_by_code(db, key)
                .map(|f| f.id.clone())
                .unwrap_or_else(|| key.to_string())
        });

    let mut out: Vec<Donation> = db
        .donations
        .values()
        .filter(|d| status.map_or(true, |s| d.status == s))
        .filter(|d| foundation.as_deref().map_or(true, |id| d.foundation == id))
        .cloned()
        .collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(out)
}

/// Record a payment outcome and refresh the foundation's stats.
pub fn set_status(
    db: &mut Db,
    id: &str,
    update: StatusUpdate,
    now: DateTime<Utc>,
) -> Result<Donation, Error> {
    let status = DonationStatus::parse(&update.status)
        .ok_or_else(|| Error::Validation(format!("Invalid status: {}", update.status)))?;
    let donation = db
        .donations
        .get_mut(id)
        .ok_or_else(|| Error::NotFound("Donation not found".into()))?;

    donation.status = status;
    if let Some(payment_id) = optional(update.payment_id) {
        donation.payment_id = Some(payment_id);
    }
    donation.updated_at = now;
    let donation = donation.clone();

    registry::recompute_stats(db, &donation.foundation);
    Ok(donation)
}

/// `GET /donations/donors` query.
#[derive(Debug, Default, Deserialize)]
pub struct DonorQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// Foundation code or id; `all` or empty means every foundation.
    pub foundation: Option<String>,
}

/// Completed donation as shown publicly. Anonymous donors are masked and
/// contact details are never included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDonation {
    pub id: String,
    pub donor_name: String,
    pub amount: f64,
    pub sticks_equivalent: f64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation: Option<FoundationRef>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorStats {
    pub total_amount: f64,
    pub total_donations: usize,
    pub total_sticks: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDonor {
    pub donor_name: String,
    pub total_amount: f64,
    pub donation_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_donations: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorWall {
    pub donations: Vec<PublicDonation>,
    pub stats: DonorStats,
    pub top_donors: Vec<TopDonor>,
    pub pagination: Pagination,
}

/// One page of completed donations (newest first), with totals and the
/// top named donors grouped by e-mail.
pub fn donor_wall(db: &Db, query: &DonorQuery) -> DonorWall {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let foundation = query
        .foundation
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != "all")
        .map(|key| {
            registry::find_by_code(db, key)
                .map(|f| f.id.clone())
                .unwrap_or_else(|| key.to_string())
        });

    let mut completed: Vec<&Donation> = db
        .donations
        .values()
        .filter(|d| d.status == DonationStatus::Completed)
        .filter(|d| foundation.as_deref().map_or(true, |id| d.foundation == id))
        .collect();
    completed.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let stats = DonorStats {
        total_amount: round2(completed.iter().map(|d| d.amount).sum()),
        total_donations: completed.len(),
        total_sticks: completed.iter().map(|d| d.sticks_equivalent).sum(),
    };

    let mut grouped: BTreeMap<&str, TopDonor> = BTreeMap::new();
    for d in completed.iter().filter(|d| !d.is_anonymous) {
        let entry = grouped.entry(d.email.as_str()).or_insert_with(|| TopDonor {
            donor_name: d.donor_name.clone(),
            total_amount: 0.0,
            donation_count: 0,
        });
        entry.total_amount += d.amount;
        entry.donation_count += 1;
    }
    let mut top_donors: Vec<TopDonor> = grouped
        .into_values()
        .map(|t| TopDonor {
            total_amount: round2(t.total_amount),
            ..t
        })
        .collect();
    top_donors.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
    top_donors.truncate(TOP_DONORS);

    let pagination = Pagination {
        current_page: page,
        total_pages: completed.len().div_ceil(limit),
        total_donations: completed.len(),
        limit,
    };
    let donations = completed
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .map(|d| public_donation(db, d))
        .collect();

    DonorWall {
        donations,
        stats,
        top_donors,
        pagination,
    }
}

/// Largest single completed donations from named donors.
pub fn leaderboard(db: &Db) -> Vec<PublicDonation> {
    let mut named: Vec<&Donation> = db
        .donations
        .values()
        .filter(|d| d.status == DonationStatus::Completed && !d.is_anonymous)
        .collect();
    named.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then(b.created_at.cmp(&a.created_at))
    });
    named
        .into_iter()
        .take(TOP_DONORS)
        .map(|d| public_donation(db, d))
        .collect()
}

fn public_donation(db: &Db, d: &Donation) -> PublicDonation {
    PublicDonation {
        id: d.id.clone(),
        donor_name: if d.is_anonymous {
            ANONYMOUS_DONOR.to_string()
        } else {
            d.donor_name.clone()
        },
        amount: d.amount,
        sticks_equivalent: d.sticks_equivalent,
        message: d.message.clone(),
        foundation: db.foundations.get(&d.foundation).map(FoundationRef::from),
        is_anonymous: d.is_anonymous,
        created_at: d.created_at,
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
