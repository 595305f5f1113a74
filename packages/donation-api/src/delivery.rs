//! Delivery charges by pincode.

use crate::config::DeliverySettings;
use crate::error::Error;
use crate::models::DeliveryArea;
use crate::store::Db;
use chrono::{DateTime, Utc};
use donation_types::check_pincode_format;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AREA_CHARGES: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppliedRule {
    ExactMatch,
    FreeDelivery,
    DefaultCharges,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSummary {
    pub pincode: String,
    pub area_name: String,
    pub district: String,
    pub delivery_charges: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PincodeCheck {
    pub pincode: String,
    pub is_valid: bool,
    pub exists: bool,
    pub delivery_charges: f64,
    pub area: Option<AreaSummary>,
    pub validation_errors: Vec<String>,
    pub applied_rule: AppliedRule,
}

/// Delivery charge for `pincode` on an order of `order_amount`.
pub fn resolve_delivery_charge(
    pincode: &str,
    order_amount: f64,
    settings: &DeliverySettings,
    db: &Db,
) -> PincodeCheck {
    let pincode = pincode.trim();
    let errors = check_pincode_format(pincode, settings.pincode_length, settings.strict_pincode);

    let mut check = PincodeCheck {
        pincode: pincode.to_string(),
        is_valid: errors.is_empty(),
        exists: false,
        delivery_charges: settings.default_charges,
        area: None,
        validation_errors: errors,
        applied_rule: AppliedRule::DefaultCharges,
    };
    if !check.is_valid {
        return check;
    }

    if let Some(area) = db.delivery_areas.get(pincode).filter(|a| a.is_active) {
        let charges = if order_amount >= settings.free_delivery_threshold {
            0.0
        } else {
            area.delivery_charges
        };
        check.exists = true;
        check.delivery_charges = charges;
        check.applied_rule = if charges == 0.0 {
            AppliedRule::FreeDelivery
        } else {
            AppliedRule::ExactMatch
        };
        check.area = Some(AreaSummary {
            pincode: area.pincode.clone(),
            area_name: area.area_name.clone(),
            district: area.district.clone(),
            delivery_charges: area.delivery_charges,
        });
    }
    check
}

/// Area as submitted by admins, singly or in a bulk import.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaInput {
    pub pincode: Option<String>,
    pub area_name: Option<String>,
    pub district: Option<String>,
    pub delivery_charges: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaPatch {
    pub area_name: Option<String>,
    pub district: Option<String>,
    pub delivery_charges: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct BulkImport {
    pub areas: Vec<AreaInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub pincode: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub updated: usize,
    pub failed: Vec<ImportFailure>,
}

pub fn list(db: &Db) -> Vec<DeliveryArea> {
    db.delivery_areas.values().cloned().collect()
}

pub fn create(db: &mut Db, input: AreaInput, now: DateTime<Utc>) -> Result<DeliveryArea, Error> {
    let area = build(input, now)?;
    if db.delivery_areas.contains_key(&area.pincode) {
        return Err(Error::Conflict("Pincode already exists".into()));
    }
    db.delivery_areas.insert(area.pincode.clone(), area.clone());
    Ok(area)
}

pub fn update(
    db: &mut Db,
    pincode: &str,
    patch: AreaPatch,
    now: DateTime<Utc>,
) -> Result<DeliveryArea, Error> {
    let area = db
        .delivery_areas
        .get_mut(pincode.trim())
        .ok_or_else(|| Error::NotFound("Delivery area not found".into()))?;

    let mut next = area.clone();
    if let Some(name) = clean(patch.area_name) {
        next.area_name = name;
    }
    if let Some(district) = clean(patch.district) {
        next.district = district;
    }
    if let Some(charges) = patch.delivery_charges {
        check_charges(charges)?;
        next.delivery_charges = charges;
    }
    if let Some(active) = patch.is_active {
        next.is_active = active;
    }
    next.updated_at = now;

    *area = next.clone();
    Ok(next)
}

pub fn delete(db: &mut Db, pincode: &str) -> Result<DeliveryArea, Error> {
    db.delivery_areas
        .remove(pincode.trim())
        .ok_or_else(|| Error::NotFound("Delivery area not found".into()))
}

/// Upsert every valid row; invalid rows are reported, not fatal.
pub fn bulk_import(db: &mut Db, rows: Vec<AreaInput>, now: DateTime<Utc>) -> ImportReport {
    let mut report = ImportReport::default();
    for row in rows {
        let pincode = row.pincode.as_deref().unwrap_or_default().trim().to_string();
        match build(row, now) {
            Ok(mut area) => match db.delivery_areas.get(&area.pincode) {
                Some(existing) => {
                    area.created_at = existing.created_at;
                    db.delivery_areas.insert(area.pincode.clone(), area);
                    report.updated += 1;
                }
                None => {
                    db.delivery_areas.insert(area.pincode.clone(), area);
                    report.imported += 1;
                }
            },
            Err(e) => report.failed.push(ImportFailure {
                pincode,
                error: e.to_string(),
            }),
        }
    }
    report
}

fn build(input: AreaInput, now: DateTime<Utc>) -> Result<DeliveryArea, Error> {
    let (Some(pincode), Some(area_name), Some(district)) = (
        clean(input.pincode),
        clean(input.area_name),
        clean(input.district),
    ) else {
        return Err(Error::Validation(
            "Pincode, area name and district are required".into(),
        ));
    };
    if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Validation(
            "Pincode must be exactly 6 digits".into(),
        ));
    }
    let delivery_charges = input.delivery_charges.unwrap_or(DEFAULT_AREA_CHARGES);
    check_charges(delivery_charges)?;

    Ok(DeliveryArea {
        pincode,
        area_name,
        district,
        is_active: input.is_active.unwrap_or(true),
        delivery_charges,
        created_at: now,
        updated_at: now,
    })
}

fn check_charges(charges: f64) -> Result<(), Error> {
    if !charges.is_finite() || charges < 0.0 {
        return Err(Error::Validation(
            "Delivery charges cannot be negative".into(),
        ));
    }
    Ok(())
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
