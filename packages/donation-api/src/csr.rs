//! CSR (corporate social responsibility) donation records.
//!
//! Records are entered by admins. The fee split is computed from the
//! foundation's configuration unless the admin supplies all three fee fields,
//! in which case they are stored as given and flagged as an override.

use crate::error::Error;
use crate::models::{
    new_id, AuditEntry, BreakdownSource, CsrDonation, CsrStatus, FieldChange, FoundationRef,
};
use crate::registry;
use crate::store::Db;
use chrono::{DateTime, NaiveDate, Utc};
use donation_types::compute_breakdown;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// `POST /admin/csr-donations` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCsrDonation {
    pub company_name: Option<String>,
    pub amount: Option<f64>,
    pub number_of_people: Option<u32>,
    /// Foundation code or id.
    pub foundation: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub platform_fee: Option<f64>,
    pub foundation_share: Option<f64>,
    pub company_share: Option<f64>,
}

/// `PATCH /admin/csr-donations/{id}` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrPatch {
    pub company_name: Option<String>,
    pub amount: Option<f64>,
    pub number_of_people: Option<u32>,
    pub foundation: Option<String>,
    pub platform_fee: Option<f64>,
    pub foundation_share: Option<f64>,
    pub company_share: Option<f64>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// `GET /admin/csr-donations` query. `all` or empty means no filter.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrFilter {
    pub status: Option<String>,
    pub foundation: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// CSR record with its foundation resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrListing {
    #[serde(flatten)]
    pub record: CsrDonation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation_info: Option<FoundationRef>,
}

#[derive(Debug, Clone)]
pub struct CsrUpdate {
    pub record: CsrDonation,
    pub changes: Vec<FieldChange>,
}

pub fn create(
    db: &mut Db,
    req: NewCsrDonation,
    admin: &str,
    now: DateTime<Utc>,
) -> Result<CsrDonation, Error> {
    let required = || {
        Error::Validation(
            "Company name, amount, number of people, and foundation are required".into(),
        )
    };
    let company_name = req
        .company_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(required)?;
    let amount = req.amount.ok_or_else(required)?;
    let number_of_people = req.number_of_people.ok_or_else(required)?;
    let foundation_key = req.foundation.ok_or_else(required)?;

    check_amount(amount)?;
    check_people(number_of_people)?;

    let foundation = registry::find_active(db, &foundation_key).ok_or_else(|| {
        Error::Validation("Invalid foundation selection or foundation is not active".into())
    })?;

    let date = match req.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => parse_date(d)?,
        None => now,
    };

    let (platform_fee, foundation_share, company_share, source, percentages) =
        match supplied_fees(req.platform_fee, req.foundation_share, req.company_share)? {
            Some((p, f, c)) => (p, f, c, BreakdownSource::Override, None),
            None => {
                let config = foundation.fee_config();
                let b = compute_breakdown(amount, &config);
                (
                    b.platform_fee,
                    b.foundation_share,
                    b.company_share,
                    BreakdownSource::Calculated,
                    Some(config.snapshot()),
                )
            }
        };

    let record = CsrDonation {
        id: new_id("csr"),
        company_name,
        amount,
        number_of_people,
        foundation: foundation.id.clone(),
        platform_fee,
        foundation_share,
        company_share,
        breakdown_source: source,
        percentages,
        date,
        status: CsrStatus::Pending,
        notes: req.notes.map(|n| n.trim().to_string()).unwrap_or_default(),
        created_by: admin.to_string(),
        last_edited_by: None,
        audit_log: vec![AuditEntry {
            edited_by: admin.to_string(),
            edited_at: now,
            changes: vec![FieldChange {
                field: "created".into(),
                old_value: Value::Null,
                new_value: json!("CSR Donation created"),
            }],
        }],
        created_at: now,
        updated_at: now,
    };

    db.csr_donations.insert(record.id.clone(), record.clone());
    Ok(record)
}

/// Admin-supplied fee fields are honoured only when all three are present and
/// non-zero; anything less falls back to the calculator.
fn supplied_fees(
    platform_fee: Option<f64>,
    foundation_share: Option<f64>,
    company_share: Option<f64>,
) -> Result<Option<(f64, f64, f64)>, Error> {
    let (Some(p), Some(f), Some(c)) = (platform_fee, foundation_share, company_share) else {
        return Ok(None);
    };
    if p == 0.0 || f == 0.0 || c == 0.0 {
        return Ok(None);
    }
    for v in [p, f, c] {
        check_fee(v)?;
    }
    Ok(Some((p, f, c)))
}

pub fn list(db: &Db, filter: &CsrFilter) -> Result<Vec<CsrListing>, Error> {
    let status = match active_filter(&filter.status) {
        Some(s) => Some(
            CsrStatus::parse(s)
                .ok_or_else(|| Error::Validation(format!("Invalid status: {s}")))?,
        ),
        None => None,
    };
    let foundation = active_filter(&filter.foundation).map(|key| {
        registry::find_by_code(db, key)
            .map(|f| f.id.clone())
            .unwrap_or_else(|| key.to_string())
    });
    let start = active_filter(&filter.start_date).map(parse_date).transpose()?;
    let end = active_filter(&filter.end_date).map(parse_date).transpose()?;

    let mut out: Vec<CsrListing> = db
        .csr_donations
        .values()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .filter(|r| foundation.as_deref().map_or(true, |id| r.foundation == id))
        .filter(|r| start.map_or(true, |s| r.date >= s))
        .filter(|r| end.map_or(true, |e| r.date <= e))
        .map(|r| CsrListing {
            record: r.clone(),
            foundation_info: db.foundations.get(&r.foundation).map(FoundationRef::from),
        })
        .collect();
    out.sort_by(|a, b| b.record.date.cmp(&a.record.date));
    Ok(out)
}

pub fn update(
    db: &mut Db,
    id: &str,
    patch: CsrPatch,
    admin: &str,
    now: DateTime<Utc>,
) -> Result<CsrUpdate, Error> {
    let existing = db
        .csr_donations
        .get(id)
        .cloned()
        .ok_or_else(|| Error::NotFound("CSR donation not found".into()))?;
    let mut record = existing.clone();
    let mut changes = Vec::new();

    if let Some(name) = patch.company_name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation("Company name is required".into()));
        }
        if name != record.company_name {
            changes.push(change("companyName", json!(record.company_name), json!(name)));
            record.company_name = name;
        }
    }
    if let Some(amount) = patch.amount {
        check_amount(amount)?;
        if amount != record.amount {
            changes.push(change("amount", json!(record.amount), json!(amount)));
            record.amount = amount;
        }
    }
    if let Some(people) = patch.number_of_people {
        check_people(people)?;
        if people != record.number_of_people {
            changes.push(change(
                "numberOfPeople",
                json!(record.number_of_people),
                json!(people),
            ));
            record.number_of_people = people;
        }
    }
    let mut split_detached = false;
    if let Some(key) = patch.foundation {
        let new = registry::find_active(db, &key)
            .ok_or_else(|| Error::Validation("Invalid foundation selection".into()))?;
        if new.id != record.foundation {
            let old_name = db
                .foundations
                .get(&record.foundation)
                .map(|f| f.foundation_name.clone())
                .unwrap_or_else(|| record.foundation.clone());
            changes.push(change(
                "foundation",
                json!(old_name),
                json!(new.foundation_name),
            ));
            record.foundation = new.id.clone();
            // The stored split was taken from the old foundation's settings.
            split_detached = true;
        }
    }

    for (field, value, slot) in [
        ("platformFee", patch.platform_fee, &mut record.platform_fee),
        ("foundationShare", patch.foundation_share, &mut record.foundation_share),
        ("companyShare", patch.company_share, &mut record.company_share),
    ] {
        if let Some(v) = value {
            check_fee(v)?;
            if v != *slot {
                changes.push(change(field, json!(*slot), json!(v)));
                *slot = v;
                split_detached = true;
            }
        }
    }

    if let Some(d) = patch.date {
        let date = parse_date(&d)?;
        if date != record.date {
            changes.push(change("date", json!(record.date), json!(date)));
            record.date = date;
        }
    }
    if let Some(s) = patch.status {
        let status = CsrStatus::parse(&s)
            .ok_or_else(|| Error::Validation(format!("Invalid status: {s}")))?;
        if status != record.status {
            changes.push(change(
                "status",
                json!(record.status.as_str()),
                json!(status.as_str()),
            ));
            record.status = status;
        }
    }
    if let Some(notes) = patch.notes {
        let notes = notes.trim().to_string();
        if notes != record.notes {
            changes.push(change("notes", json!(record.notes), json!(notes)));
            record.notes = notes;
        }
    }

    if changes.is_empty() {
        return Ok(CsrUpdate {
            record: existing,
            changes,
        });
    }

    if split_detached {
        record.breakdown_source = BreakdownSource::Override;
        record.percentages = None;
    }
    record.last_edited_by = Some(admin.to_string());
    record.audit_log.push(AuditEntry {
        edited_by: admin.to_string(),
        edited_at: now,
        changes: changes.clone(),
    });
    record.updated_at = now;

    db.csr_donations.insert(record.id.clone(), record.clone());
    Ok(CsrUpdate { record, changes })
}

pub fn delete(db: &mut Db, id: &str) -> Result<CsrDonation, Error> {
    db.csr_donations
        .remove(id)
        .ok_or_else(|| Error::NotFound("CSR donation not found".into()))
}

/// RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, Error> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::Validation(format!("Invalid date: {value}")))
}

fn active_filter(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

fn change(field: &str, old_value: Value, new_value: Value) -> FieldChange {
    FieldChange {
        field: field.to_string(),
        old_value,
        new_value,
    }
}

fn check_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() || amount < 1.0 {
        return Err(Error::Validation("Amount must be at least ₹1".into()));
    }
    Ok(())
}

fn check_people(people: u32) -> Result<(), Error> {
    if people < 1 {
        return Err(Error::Validation(
            "Number of people must be at least 1".into(),
        ));
    }
    Ok(())
}

fn check_fee(value: f64) -> Result<(), Error> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(
            "Fee fields must be non-negative numbers".into(),
        ));
    }
    Ok(())
}
