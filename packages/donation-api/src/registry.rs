//! Foundation registry: per-foundation fee configuration and profile.
//!
//! Percentages are validated here, at write time. The fee calculator trusts
//! whatever configuration this module lets through.

use crate::error::Error;
use crate::models::{
    new_id, DonationStatus, Foundation, FoundationStats, DEFAULT_ICON, DEFAULT_PRIMARY_COLOR,
};
use crate::store::Db;
use chrono::{DateTime, Utc};
use donation_types::{
    compute_breakdown, generate_code, is_valid_code, round2, validate_percent,
    validate_share_split, Breakdown,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// `POST /admin/foundations` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFoundation {
    pub foundation_name: Option<String>,
    pub code: Option<String>,
    pub foundation_share_percent: Option<f64>,
    pub company_share_percent: Option<f64>,
    pub platform_fee_percent: Option<f64>,
    pub display_name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub icon: Option<String>,
    pub primary_color: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub is_active: Option<bool>,
    pub minimum_donation: Option<f64>,
}

/// `PATCH /admin/foundations/{id}` body. Absent fields are left untouched; an
/// empty string clears an optional text field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationPatch {
    pub foundation_name: Option<String>,
    pub code: Option<String>,
    pub foundation_share_percent: Option<f64>,
    pub company_share_percent: Option<f64>,
    pub platform_fee_percent: Option<f64>,
    pub display_name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub icon: Option<String>,
    pub primary_color: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub is_active: Option<bool>,
    pub priority: Option<u32>,
    pub minimum_donation: Option<f64>,
}

/// `POST /admin/foundation-settings` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub foundation_code: Option<String>,
    pub platform_fee_percent: Option<f64>,
    pub foundation_share_percent: Option<f64>,
}

/// Fee settings row as listed on the settings page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSettings {
    pub foundation_code: String,
    pub foundation_name: String,
    pub platform_fee_percent: f64,
    pub foundation_share_percent: f64,
    pub company_share_percent: f64,
    pub is_active: bool,
}

impl From<&Foundation> for FeeSettings {
    fn from(f: &Foundation) -> Self {
        let fees = f.fee_config();
        Self {
            foundation_code: f.code.clone(),
            foundation_name: f.foundation_name.clone(),
            platform_fee_percent: fees.platform_fee_percent,
            foundation_share_percent: fees.foundation_share_percent,
            company_share_percent: fees.company_share_percent(),
            is_active: f.is_active,
        }
    }
}

// --- Queries ---

/// Foundations ordered for display: priority, then creation time.
pub fn sorted(db: &Db, active_only: bool) -> Vec<&Foundation> {
    let mut out: Vec<&Foundation> = db
        .foundations
        .values()
        .filter(|f| !active_only || f.is_active)
        .collect();
    out.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.created_at.cmp(&b.created_at))
    });
    out
}

/// Active foundation by code, falling back to id.
pub fn find_active<'a>(db: &'a Db, code_or_id: &str) -> Option<&'a Foundation> {
    let key = code_or_id.trim();
    let code = key.to_lowercase();
    db.foundations
        .values()
        .find(|f| f.is_active && f.code == code)
        .or_else(|| db.foundations.get(key).filter(|f| f.is_active))
}

pub fn find_by_code<'a>(db: &'a Db, code: &str) -> Option<&'a Foundation> {
    let code = code.trim().to_lowercase();
    db.foundations.values().find(|f| f.code == code)
}

/// First active foundation by priority.
pub fn default_active(db: &Db) -> Option<&Foundation> {
    sorted(db, true).into_iter().next()
}

pub fn next_priority(db: &Db) -> u32 {
    db.foundations
        .values()
        .map(|f| f.priority)
        .max()
        .map_or(1, |p| p.saturating_add(1))
}

fn code_taken(db: &Db, code: &str, exclude_id: Option<&str>) -> bool {
    db.foundations
        .values()
        .any(|f| f.code == code && Some(f.id.as_str()) != exclude_id)
}

fn references(db: &Db, id: &str) -> usize {
    db.donations.values().filter(|d| d.foundation == id).count()
        + db.csr_donations.values().filter(|c| c.foundation == id).count()
}

// --- Writes ---

pub fn create(db: &mut Db, req: NewFoundation, now: DateTime<Utc>) -> Result<Foundation, Error> {
    let name = clean(req.foundation_name).ok_or_else(|| {
        Error::Validation("Foundation name and foundation share percentage are required".into())
    })?;
    let foundation_share = req.foundation_share_percent.ok_or_else(|| {
        Error::Validation("Foundation name and foundation share percentage are required".into())
    })?;

    let code = clean(req.code)
        .map(|c| c.to_lowercase())
        .unwrap_or_else(|| generate_code(&name));
    if code_taken(db, &code, None) {
        return Err(Error::Conflict(format!(
            "Foundation code \"{code}\" already exists. Please choose a different code."
        )));
    }

    let foundation = Foundation {
        id: new_id("fnd"),
        foundation_name: name,
        code,
        foundation_share_percent: foundation_share,
        company_share_percent: req
            .company_share_percent
            .unwrap_or(100.0 - foundation_share),
        platform_fee_percent: req.platform_fee_percent,
        display_name: clean(req.display_name),
        tagline: clean(req.tagline),
        description: clean(req.description),
        logo_url: clean(req.logo_url),
        icon: clean(req.icon).unwrap_or_else(|| DEFAULT_ICON.into()),
        primary_color: clean(req.primary_color).unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.into()),
        contact_email: clean(req.contact_email).map(|e| e.to_lowercase()),
        contact_phone: clean(req.contact_phone),
        website: clean(req.website),
        is_active: req.is_active.unwrap_or(false),
        priority: next_priority(db),
        minimum_donation: req.minimum_donation.filter(|m| *m != 0.0).unwrap_or(1.0),
        stats: FoundationStats::default(),
        created_at: now,
        updated_at: now,
    };
    validate(&foundation)?;

    db.foundations
        .insert(foundation.id.clone(), foundation.clone());
    Ok(foundation)
}

pub fn update(
    db: &mut Db,
    id: &str,
    patch: FoundationPatch,
    now: DateTime<Utc>,
) -> Result<Foundation, Error> {
    let mut f = db
        .foundations
        .get(id)
        .cloned()
        .ok_or_else(|| Error::NotFound("Foundation not found".into()))?;

    if let Some(code) = clean(patch.code).map(|c| c.to_lowercase()) {
        if code != f.code {
            if code_taken(db, &code, Some(id)) {
                return Err(Error::Conflict(format!(
                    "Foundation code \"{code}\" already exists. Please choose a different code."
                )));
            }
            f.code = code;
        }
    }

    if let Some(name) = patch.foundation_name {
        f.foundation_name = name.trim().to_string();
    }
    if let Some(share) = patch.foundation_share_percent {
        f.foundation_share_percent = share;
        if patch.company_share_percent.is_none() {
            f.company_share_percent = 100.0 - share;
        }
    }
    if let Some(share) = patch.company_share_percent {
        f.company_share_percent = share;
    }
    if let Some(fee) = patch.platform_fee_percent {
        f.platform_fee_percent = Some(fee);
    }

    if let Some(v) = patch.display_name {
        f.display_name = clean(Some(v));
    }
    if let Some(v) = patch.tagline {
        f.tagline = clean(Some(v));
    }
    if let Some(v) = patch.description {
        f.description = clean(Some(v));
    }
    if let Some(v) = patch.logo_url {
        f.logo_url = clean(Some(v));
    }
    if let Some(v) = patch.icon {
        f.icon = clean(Some(v)).unwrap_or_else(|| DEFAULT_ICON.into());
    }
    if let Some(v) = patch.primary_color {
        f.primary_color = clean(Some(v)).unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.into());
    }
    if let Some(v) = patch.contact_email {
        f.contact_email = clean(Some(v)).map(|e| e.to_lowercase());
    }
    if let Some(v) = patch.contact_phone {
        f.contact_phone = clean(Some(v));
    }
    if let Some(v) = patch.website {
        f.website = clean(Some(v));
    }
    if let Some(active) = patch.is_active {
        f.is_active = active;
    }
    if let Some(priority) = patch.priority {
        f.priority = priority;
    }
    if let Some(min) = patch.minimum_donation {
        f.minimum_donation = min;
    }

    validate(&f)?;
    f.updated_at = now;
    db.foundations.insert(f.id.clone(), f.clone());
    Ok(f)
}

pub fn delete(db: &mut Db, id: &str) -> Result<Foundation, Error> {
    if !db.foundations.contains_key(id) {
        return Err(Error::NotFound("Foundation not found".into()));
    }

    let count = references(db, id);
    if count > 0 {
        return Err(Error::Conflict(format!(
            "Cannot delete foundation. It has {count} associated donation(s). Please deactivate instead."
        )));
    }

    db.foundations
        .remove(id)
        .ok_or_else(|| Error::NotFound("Foundation not found".into()))
}

/// Seed the two historical foundations into an empty registry.
pub fn seed_defaults(db: &mut Db, now: DateTime<Utc>) -> Result<bool, Error> {
    if !db.foundations.is_empty() {
        return Ok(false);
    }

    let defaults = [
        ("Vishnu Shakti Foundation", "vsf", 12.0, 65.0, "Empowering visually impaired individuals"),
        ("Chetana Foundation", "cf", 8.0, 75.0, "Supporting accessibility initiatives"),
    ];
    for (name, code, platform_fee, share, description) in defaults {
        create(
            db,
            NewFoundation {
                foundation_name: Some(name.into()),
                code: Some(code.into()),
                foundation_share_percent: Some(share),
                platform_fee_percent: Some(platform_fee),
                description: Some(description.into()),
                is_active: Some(true),
                ..NewFoundation::default()
            },
            now,
        )?;
    }
    Ok(true)
}

pub fn update_settings(
    db: &mut Db,
    req: SettingsUpdate,
    now: DateTime<Utc>,
) -> Result<Foundation, Error> {
    let code = clean(req.foundation_code)
        .ok_or_else(|| Error::Validation("Foundation code is required".into()))?;

    if let Some(fee) = req.platform_fee_percent {
        validate_percent("Platform fee", fee)?;
    }
    if let Some(share) = req.foundation_share_percent {
        validate_percent("Foundation share", share)?;
    }

    let id = find_by_code(db, &code)
        .map(|f| f.id.clone())
        .ok_or_else(|| Error::NotFound("Foundation settings not found".into()))?;

    update(
        db,
        &id,
        FoundationPatch {
            platform_fee_percent: req.platform_fee_percent,
            foundation_share_percent: req.foundation_share_percent,
            ..FoundationPatch::default()
        },
        now,
    )
}

/// `POST /foundation-settings/preview` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub amount: Option<f64>,
    pub foundation_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub breakdown: Breakdown,
    pub platform_fee_percent: f64,
    pub foundation_share_percent: f64,
    pub company_share_percent: f64,
    pub foundation_name: String,
}

/// Breakdown an active foundation would apply to `amount`. Read-only.
pub fn preview(db: &Db, req: PreviewRequest) -> Result<Preview, Error> {
    let amount = req
        .amount
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or_else(|| Error::Validation("Amount must be a positive number".into()))?;
    let code = clean(req.foundation_code)
        .ok_or_else(|| Error::Validation("Foundation code is required".into()))?;

    let foundation = find_by_code(db, &code)
        .filter(|f| f.is_active)
        .ok_or_else(|| Error::NotFound("Foundation not found or inactive".into()))?;

    let config = foundation.fee_config();
    Ok(Preview {
        breakdown: compute_breakdown(amount, &config),
        platform_fee_percent: config.platform_fee_percent,
        foundation_share_percent: config.foundation_share_percent,
        company_share_percent: config.company_share_percent(),
        foundation_name: foundation.foundation_name.clone(),
    })
}

/// Recompute a foundation's stats from its completed donations.
pub fn recompute_stats(db: &mut Db, foundation_id: &str) {
    let mut stats = FoundationStats::default();
    let mut donors = BTreeSet::new();
    for d in db
        .donations
        .values()
        .filter(|d| d.foundation == foundation_id && d.status == DonationStatus::Completed)
    {
        stats.total_donations += 1;
        stats.total_amount += d.amount;
        donors.insert(d.email.as_str());
    }
    stats.total_amount = round2(stats.total_amount);
    stats.donor_count = donors.len() as u64;

    if let Some(f) = db.foundations.get_mut(foundation_id) {
        f.stats = stats;
    }
}

// --- Validation ---

fn validate(f: &Foundation) -> Result<(), Error> {
    let name_len = f.foundation_name.chars().count();
    if name_len < 2 {
        return Err(Error::Validation(
            "Foundation name must be at least 2 characters".into(),
        ));
    }
    if name_len > 200 {
        return Err(Error::Validation(
            "Foundation name must not exceed 200 characters".into(),
        ));
    }
    if !is_valid_code(&f.code) {
        return Err(Error::Validation(
            "Code can only contain lowercase letters, numbers, and hyphens".into(),
        ));
    }

    validate_share_split(f.foundation_share_percent, f.company_share_percent)?;
    if let Some(fee) = f.platform_fee_percent {
        validate_percent("Platform fee", fee)?;
    }

    max_len("Display name", f.display_name.as_deref(), 50)?;
    max_len("Tagline", f.tagline.as_deref(), 150)?;
    max_len("Description", f.description.as_deref(), 1000)?;

    if !is_hex_color(&f.primary_color) {
        return Err(Error::Validation("Invalid hex color code".into()));
    }
    if let Some(email) = &f.contact_email {
        if !is_email(email) {
            return Err(Error::Validation("Invalid email address".into()));
        }
    }
    if let Some(phone) = &f.contact_phone {
        if !phone
            .chars()
            .all(|c| c.is_ascii_digit() || "+-() ".contains(c))
        {
            return Err(Error::Validation("Invalid phone number format".into()));
        }
    }
    if f.priority < 1 {
        return Err(Error::Validation("Priority must be at least 1".into()));
    }
    if !f.minimum_donation.is_finite() || f.minimum_donation < 1.0 {
        return Err(Error::Validation(
            "Minimum donation must be at least ₹1".into(),
        ));
    }
    Ok(())
}

fn max_len(field: &str, value: Option<&str>, max: usize) -> Result<(), Error> {
    match value {
        Some(v) if v.chars().count() > max => Err(Error::Validation(format!(
            "{field} must not exceed {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Trimmed value, `None` when absent or blank.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// `local@domain.tld` with no whitespace.
pub(crate) fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
