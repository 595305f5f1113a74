//! Donation pool: money that has actually arrived, aggregated for the admin
//! dashboard.
//!
//! Online donations count once `completed`. CSR records count once they are
//! `verified`, `received` or `certificate_issued`. Online donations are placed
//! in time by `createdAt`, CSR records by their donation `date`.

use crate::csr::parse_date;
use crate::error::Error;
use crate::models::{CsrDonation, CsrStatus, Donation, DonationStatus, FoundationRef};
use crate::registry;
use crate::store::Db;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use donation_types::round2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// `GET /admin/donation-pool` query.
///
/// `range` is one of `all` (default), `today`, `week`, `month`, `year` or
/// `custom`. Explicit `startDate`/`endDate` bounds imply `custom`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolFilter {
    pub range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl PoolFilter {
    /// Inclusive `(from, to)` bounds; `None` is open-ended.
    pub fn bounds(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), Error> {
        let start = non_empty(&self.start_date).map(parse_date).transpose()?;
        let end = non_empty(&self.end_date).map(parse_date).transpose()?;
        let range = non_empty(&self.range).unwrap_or(if start.is_some() || end.is_some() {
            "custom"
        } else {
            "all"
        });

        let bounds = match range {
            "all" => (None, None),
            "today" => (midnight(now.date_naive()), Some(now)),
            "week" => (Some(now - Duration::days(7)), Some(now)),
            "month" => (
                NaiveDate::from_ymd_opt(now.year(), now.month(), 1).and_then(midnight),
                Some(now),
            ),
            "year" => (NaiveDate::from_ymd_opt(now.year(), 1, 1).and_then(midnight), Some(now)),
            "custom" => (start, end),
            other => return Err(Error::Validation(format!("Invalid date range: {other}"))),
        };
        if let (Some(from), Some(to)) = bounds {
            if from > to {
                return Err(Error::Validation(
                    "Start date must not be after end date".into(),
                ));
            }
        }
        Ok(bounds)
    }
}

/// Amount and its fee split, summed over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub amount: f64,
    pub platform_fee: f64,
    pub foundation_share: f64,
    pub company_share: f64,
}

impl Split {
    fn add(&mut self, amount: f64, platform_fee: f64, foundation_share: f64, company_share: f64) {
        self.amount += amount;
        self.platform_fee += platform_fee;
        self.foundation_share += foundation_share;
        self.company_share += company_share;
    }

    fn rounded(self) -> Self {
        Self {
            amount: round2(self.amount),
            platform_fee: round2(self.platform_fee),
            foundation_share: round2(self.foundation_share),
            company_share: round2(self.company_share),
        }
    }

    fn merged(self, other: Split) -> Self {
        Self {
            amount: self.amount + other.amount,
            platform_fee: self.platform_fee + other.platform_fee,
            foundation_share: self.foundation_share + other.foundation_share,
            company_share: self.company_share + other.company_share,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlinePool {
    #[serde(flatten)]
    pub split: Split,
    pub donations: usize,
    /// Distinct donor e-mails.
    pub donor_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrPool {
    #[serde(flatten)]
    pub split: Split,
    pub company_count: usize,
    /// Sum of `numberOfPeople`.
    pub beneficiaries: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationPool {
    pub foundation: FoundationRef,
    /// Online and CSR combined.
    #[serde(flatten)]
    pub split: Split,
    pub online: OnlinePool,
    pub csr: CsrPool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    pub total_amount: f64,
    pub total_company_share: f64,
    pub unique_donors: usize,
    pub beneficiaries: u64,
    pub online: OnlinePool,
    pub csr: CsrPool,
    /// Every registered foundation in display order, including empty ones.
    pub by_foundation: Vec<FoundationPool>,
}

pub fn is_counted_csr(status: CsrStatus) -> bool {
    matches!(
        status,
        CsrStatus::Verified | CsrStatus::Received | CsrStatus::CertificateIssued
    )
}

pub fn summarize(db: &Db, filter: &PoolFilter, now: DateTime<Utc>) -> Result<PoolSummary, Error> {
    let (from, to) = filter.bounds(now)?;
    let in_range =
        |t: DateTime<Utc>| from.map_or(true, |f| t >= f) && to.map_or(true, |e| t <= e);

    let mut total = Tally::default();
    let mut per_foundation: BTreeMap<&str, Tally<'_>> = BTreeMap::new();

    for d in db
        .donations
        .values()
        .filter(|d| d.status == DonationStatus::Completed && in_range(d.created_at))
    {
        total.add_donation(d);
        per_foundation.entry(d.foundation.as_str()).or_default().add_donation(d);
    }
    for r in db
        .csr_donations
        .values()
        .filter(|r| is_counted_csr(r.status) && in_range(r.date))
    {
        total.add_csr(r);
        per_foundation.entry(r.foundation.as_str()).or_default().add_csr(r);
    }

    let by_foundation = registry::sorted(db, false)
        .into_iter()
        .map(|f| {
            let tally = per_foundation.remove(f.id.as_str()).unwrap_or_default();
            FoundationPool {
                foundation: FoundationRef::from(f),
                split: tally.online.merged(tally.csr).rounded(),
                online: tally.online_pool(),
                csr: tally.csr_pool(),
            }
        })
        .collect();

    let combined = total.online.merged(total.csr).rounded();
    Ok(PoolSummary {
        from,
        to,
        total_amount: combined.amount,
        total_company_share: combined.company_share,
        unique_donors: total.donors.len(),
        beneficiaries: total.beneficiaries,
        online: total.online_pool(),
        csr: total.csr_pool(),
        by_foundation,
    })
}

#[derive(Default)]
struct Tally<'a> {
    online: Split,
    online_count: usize,
    donors: BTreeSet<&'a str>,
    csr: Split,
    csr_count: usize,
    beneficiaries: u64,
}

impl<'a> Tally<'a> {
    fn add_donation(&mut self, d: &'a Donation) {
        self.online
            .add(d.amount, d.platform_fee, d.foundation_amount, d.company_amount);
        self.online_count += 1;
        if !d.email.is_empty() {
            self.donors.insert(d.email.as_str());
        }
    }

    fn add_csr(&mut self, r: &CsrDonation) {
        self.csr
            .add(r.amount, r.platform_fee, r.foundation_share, r.company_share);
        self.csr_count += 1;
        self.beneficiaries += u64::from(r.number_of_people);
    }

    fn online_pool(&self) -> OnlinePool {
        OnlinePool {
            split: self.online.rounded(),
            donations: self.online_count,
            donor_count: self.donors.len(),
        }
    }

    fn csr_pool(&self) -> CsrPool {
        CsrPool {
            split: self.csr.rounded(),
            company_count: self.csr_count,
            beneficiaries: self.beneficiaries,
        }
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
