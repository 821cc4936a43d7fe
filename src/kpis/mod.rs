//! KPI summary computation
//!
//! Scalar metrics over the featured table, plus the per-currency breakdown.
//! Any ratio whose denominator is zero, or any statistic over an empty base
//! population, is `None` rather than an error; it serializes to null in the
//! JSON document and an empty cell in the flat CSV row.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ApPaths;
use crate::error::ApResult;
use crate::features::FeaturedInvoice;
use crate::models::{Currency, Money};
use crate::storage;

/// The KPI summary record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Total invoice count
    pub invoices_total: usize,
    /// Total invoice amount
    pub amount_total: Money,
    /// Open invoice count
    pub open_count: usize,
    /// Open invoice amount
    pub open_amount: Money,
    /// Overdue invoice count (open, days past due > 0)
    pub overdue_count: usize,
    /// Overdue invoice amount
    pub overdue_amount: Money,
    /// Overdue amount as a percentage of open amount
    pub pct_overdue_amount: Option<f64>,
    /// Top-10 vendor spend share of total spend, percent
    pub top10_vendor_share_pct: Option<f64>,
    /// Single biggest vendor by spend
    pub top_vendor_name: Option<String>,
    /// That vendor's total spend
    pub top_vendor_amount: Option<Money>,
    /// Mean days from invoice to payment, paid invoices with a payment date
    pub days_to_pay_avg: Option<f64>,
    /// Median days from invoice to payment
    pub days_to_pay_median: Option<f64>,
    /// Mean payment delay relative to the due date
    pub delay_vs_due_avg: Option<f64>,
    /// Percentage of paid invoices paid after their due date
    pub delay_vs_due_pct_late: Option<f64>,
    /// Open amount due within the next 7 days
    pub cash_out_next_7: Money,
    /// Open amount due within the next 30 days
    pub cash_out_next_30: Money,
    /// Mean day count extracted from the Terms text
    pub terms_days_avg: Option<f64>,
    /// Median day count extracted from the Terms text
    pub terms_days_median: Option<f64>,
}

/// One row of the per-currency breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRow {
    /// Currency code
    #[serde(rename = "Currency")]
    pub currency: Currency,
    /// Invoice count in this currency
    pub count: usize,
    /// Total amount in this currency
    pub amount: Money,
}

/// Compute the KPI summary relative to `today`
pub fn compute_kpis(featured: &[FeaturedInvoice], today: NaiveDate) -> KpiSummary {
    let invoices_total = featured.len();
    let amount_total: Money = featured.iter().map(|f| f.record.amount).sum();

    let open: Vec<&FeaturedInvoice> = featured.iter().filter(|f| f.is_open()).collect();
    let open_count = open.len();
    let open_amount: Money = open.iter().map(|f| f.record.amount).sum();

    let overdue: Vec<&&FeaturedInvoice> = open.iter().filter(|f| f.is_overdue()).collect();
    let overdue_count = overdue.len();
    let overdue_amount: Money = overdue.iter().map(|f| f.record.amount).sum();

    let pct_overdue_amount = if open_amount.is_zero() {
        None
    } else {
        Some(overdue_amount.to_f64() / open_amount.to_f64() * 100.0)
    };

    // Vendor concentration
    let mut vendor_sums: BTreeMap<&str, Money> = BTreeMap::new();
    for f in featured {
        *vendor_sums
            .entry(f.record.vendor.as_str())
            .or_insert(Money::zero()) += f.record.amount;
    }
    let mut ranked: Vec<(&str, Money)> = vendor_sums.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let top10: Money = ranked.iter().take(10).map(|(_, amount)| *amount).sum();
    let top10_vendor_share_pct = if amount_total.is_zero() {
        None
    } else {
        Some(top10.to_f64() / amount_total.to_f64() * 100.0)
    };
    let top_vendor_name = ranked.first().map(|(name, _)| name.to_string());
    let top_vendor_amount = ranked.first().map(|(_, amount)| *amount);

    // Payment behavior, over paid invoices
    let paid: Vec<&FeaturedInvoice> = featured.iter().filter(|f| f.is_paid).collect();
    let days_to_pay: Vec<f64> = paid
        .iter()
        .filter_map(|f| f.record.paid_date.map(|p| (p - f.record.invoice_date).num_days() as f64))
        .collect();
    let days_to_pay_avg = mean(&days_to_pay);
    let days_to_pay_median = median(&days_to_pay);

    let delays: Vec<f64> = paid
        .iter()
        .filter_map(|f| f.record.paid_date.map(|p| (p - f.record.due_date).num_days() as f64))
        .collect();
    let delay_vs_due_avg = mean(&delays);
    // Paid rows without a payment date have no measurable delay and count as
    // on time, so the denominator is the whole paid population
    let delay_vs_due_pct_late = if paid.is_empty() {
        None
    } else {
        let late = delays.iter().filter(|&&d| d > 0.0).count();
        Some(late as f64 / paid.len() as f64 * 100.0)
    };

    // Cash commitments among open invoices
    let cash_out_within = |days: i64| -> Money {
        open.iter()
            .filter(|f| {
                let horizon = (f.record.due_date - today).num_days();
                (0..=days).contains(&horizon)
            })
            .map(|f| f.record.amount)
            .sum()
    };
    let cash_out_next_7 = cash_out_within(7);
    let cash_out_next_30 = cash_out_within(30);

    // Terms day counts, where extraction succeeds
    let terms_days: Vec<f64> = featured
        .iter()
        .filter_map(|f| f.record.terms.as_deref().and_then(parse_terms_days))
        .map(|d| d as f64)
        .collect();
    let terms_days_avg = mean(&terms_days);
    let terms_days_median = median(&terms_days);

    KpiSummary {
        invoices_total,
        amount_total,
        open_count,
        open_amount,
        overdue_count,
        overdue_amount,
        pct_overdue_amount,
        top10_vendor_share_pct,
        top_vendor_name,
        top_vendor_amount,
        days_to_pay_avg,
        days_to_pay_median,
        delay_vs_due_avg,
        delay_vs_due_pct_late,
        cash_out_next_7,
        cash_out_next_30,
        terms_days_avg,
        terms_days_median,
    }
}

/// Group invoices by currency, sorted by code
pub fn currency_breakdown(featured: &[FeaturedInvoice]) -> Vec<CurrencyRow> {
    let mut groups: BTreeMap<Currency, (usize, Money)> = BTreeMap::new();
    for f in featured {
        let entry = groups
            .entry(f.record.currency)
            .or_insert((0, Money::zero()));
        entry.0 += 1;
        entry.1 += f.record.amount;
    }
    let mut rows: Vec<CurrencyRow> = groups
        .into_iter()
        .map(|(currency, (count, amount))| CurrencyRow {
            currency,
            count,
            amount,
        })
        .collect();
    rows.sort_by(|a, b| a.currency.code().cmp(b.currency.code()));
    rows
}

/// Persist the KPI record as a flat CSV row and a structured JSON document
pub fn write_kpis(paths: &ApPaths, kpis: &KpiSummary) -> ApResult<(PathBuf, PathBuf)> {
    let summary = std::slice::from_ref(kpis);
    let csv_path = storage::write_csv_atomic(paths.kpi_csv(), summary)?;
    let json_path = paths.kpi_json();
    // A one-element record array, matching the flat CSV's shape
    storage::write_json(&json_path, &summary)?;
    Ok((csv_path, json_path))
}

/// First integer substring of a terms text, e.g. "Net 30" -> 30
pub fn parse_terms_days(terms: &str) -> Option<u32> {
    let start = terms.find(|c: char| c.is_ascii_digit())?;
    let digits: String = terms[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
