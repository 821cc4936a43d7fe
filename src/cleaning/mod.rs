//! Row validation and deduplication
//!
//! Each validity predicate is computed independently over the whole table,
//! the predicate columns are OR-ed into a single drop mask, and the complement
//! is kept. A row with several defects is dropped exactly once, but it counts
//! once per predicate in the diagnostic summary, so summary categories may
//! overlap for the same row.
//!
//! Duplicate detection drops every member of a composite-key group with two
//! or more rows, not just the extras.

use std::collections::HashMap;
use std::fmt;

use log::info;

use crate::models::{InvoiceRecord, RawInvoice};

/// Per-predicate defect counts over one table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityReport {
    /// Rows with a missing or blank APID
    pub missing_apid: usize,
    /// Rows whose amount is missing, zero, or negative
    pub amount_zero_negative_or_missing: usize,
    /// Rows whose invoice date did not parse
    pub invalid_invoice_date: usize,
    /// Rows whose due date did not parse
    pub invalid_due_date: usize,
    /// Rows where the due date precedes the invoice date
    pub due_before_invoice: usize,
    /// Rows whose currency is missing or outside the allowed set
    pub invalid_currency: usize,
    /// Rows belonging to a duplicated composite-key group (all members counted)
    pub duplicates: usize,
    /// Total missing cells across all source columns
    pub missing_values_total: usize,
}

impl QualityReport {
    /// Compute the report over a raw table
    pub fn of(rows: &[RawInvoice]) -> Self {
        let dup = duplicate_mask(rows);
        Self {
            missing_apid: count(rows, missing_apid),
            amount_zero_negative_or_missing: count(rows, invalid_amount),
            invalid_invoice_date: count(rows, invalid_invoice_date),
            invalid_due_date: count(rows, invalid_due_date),
            due_before_invoice: count(rows, due_before_invoice),
            invalid_currency: count(rows, invalid_currency),
            duplicates: dup.iter().filter(|&&d| d).count(),
            missing_values_total: rows.iter().map(RawInvoice::missing_count).sum(),
        }
    }

    /// True when every defect count except residual missing cells is zero
    pub fn is_clean(&self) -> bool {
        self.missing_apid == 0
            && self.amount_zero_negative_or_missing == 0
            && self.invalid_invoice_date == 0
            && self.invalid_due_date == 0
            && self.due_before_invoice == 0
            && self.invalid_currency == 0
            && self.duplicates == 0
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "missing_apid: {}", self.missing_apid)?;
        writeln!(
            f,
            "amount_zero_negative_or_missing: {}",
            self.amount_zero_negative_or_missing
        )?;
        writeln!(f, "invalid_invoice_date: {}", self.invalid_invoice_date)?;
        writeln!(f, "invalid_due_date: {}", self.invalid_due_date)?;
        writeln!(f, "due_before_invoice: {}", self.due_before_invoice)?;
        writeln!(f, "invalid_currency: {}", self.invalid_currency)?;
        writeln!(f, "duplicates: {}", self.duplicates)?;
        write!(f, "missing_values_total: {}", self.missing_values_total)
    }
}

/// Outcome of one cleaning pass
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    /// Rows satisfying every invariant
    pub records: Vec<InvoiceRecord>,
    /// Defect counts on the raw input
    pub report_raw: QualityReport,
    /// Defect counts recomputed on the cleaned output (the acceptance check)
    pub report_clean: QualityReport,
    /// Raw row count
    pub rows_total: usize,
    /// Rows dropped by the combined mask
    pub rows_removed: usize,
}

/// Validate and deduplicate a raw table
pub fn clean(rows: &[RawInvoice]) -> CleanOutcome {
    let report_raw = QualityReport::of(rows);

    let dup = duplicate_mask(rows);
    let drop_mask: Vec<bool> = rows
        .iter()
        .zip(&dup)
        .map(|(row, &is_dup)| {
            missing_apid(row)
                || invalid_amount(row)
                || invalid_invoice_date(row)
                || invalid_due_date(row)
                || due_before_invoice(row)
                || invalid_currency(row)
                || is_dup
        })
        .collect();

    let records: Vec<InvoiceRecord> = rows
        .iter()
        .zip(&drop_mask)
        .filter(|(_, &drop)| !drop)
        .filter_map(|(row, _)| row.to_clean())
        .collect();

    let rows_total = rows.len();
    let rows_removed = drop_mask.iter().filter(|&&d| d).count();

    let kept_raw: Vec<RawInvoice> = records.iter().map(InvoiceRecord::to_raw).collect();
    let report_clean = QualityReport::of(&kept_raw);

    info!(
        "Cleaned table: {} rows total, {} removed, {} kept",
        rows_total,
        rows_removed,
        records.len()
    );

    CleanOutcome {
        records,
        report_raw,
        report_clean,
        rows_total,
        rows_removed,
    }
}

// Row-level predicates. Each is evaluated independently over the full table.

fn missing_apid(row: &RawInvoice) -> bool {
    // Blank-stripping happens at load time, so blank and missing are both None
    row.apid.is_none()
}

fn invalid_amount(row: &RawInvoice) -> bool {
    !row.amount.is_some_and(|a| a.is_positive())
}

fn invalid_invoice_date(row: &RawInvoice) -> bool {
    row.invoice_date.is_none()
}

fn invalid_due_date(row: &RawInvoice) -> bool {
    row.due_date.is_none()
}

fn due_before_invoice(row: &RawInvoice) -> bool {
    match (row.due_date, row.invoice_date) {
        (Some(due), Some(invoice)) => due < invoice,
        _ => false,
    }
}

fn invalid_currency(row: &RawInvoice) -> bool {
    !row
        .currency
        .as_deref()
        .is_some_and(|c| c.parse::<crate::models::Currency>().is_ok())
}

/// Mark every member of a composite-key group that occurs more than once
fn duplicate_mask(rows: &[RawInvoice]) -> Vec<bool> {
    let mut counts: HashMap<_, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.composite_key()).or_insert(0) += 1;
    }
    rows.iter()
        .map(|row| counts[&row.composite_key()] > 1)
        .collect()
}

fn count(rows: &[RawInvoice], pred: fn(&RawInvoice) -> bool) -> usize {
    rows.iter().filter(|row| pred(row)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_row(apid: &str, amount: f64) -> RawInvoice {
        RawInvoice {
            apid: Some(apid.into()),
            vendor: Some("Acme Corp".into()),
            invoice_date: Some(date(2024, 1, 1)),
            due_date: Some(date(2024, 1, 31)),
            paid_date: None,
            amount: Some(Money::from_f64(amount)),
            currency: Some("USD".into()),
            status: None,
            terms: None,
            aging_bucket: None,
        }
    }

    #[test]
    fn test_valid_rows_survive() {
        let rows = vec![valid_row("AP-1", 100.5), valid_row("AP-2", 20.0)];
        let outcome = clean(&rows);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.rows_removed, 0);
        assert!(outcome.report_clean.is_clean());
    }

    #[test]
    fn test_amount_edge_cases() {
        let mut zero = valid_row("AP-1", 0.0);
        zero.amount = Some(Money::zero());
        let negative = valid_row("AP-2", -5.0);
        let fractional = valid_row("AP-3", 100.5);

        let outcome = clean(&[zero, negative, fractional]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].apid, "AP-3");
        assert_eq!(outcome.report_raw.amount_zero_negative_or_missing, 2);
    }

    #[test]
    fn test_blank_apid_dropped() {
        let mut row = valid_row("AP-1", 10.0);
        row.apid = None;
        let outcome = clean(&[row, valid_row("AP-2", 10.0)]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.report_raw.missing_apid, 1);
    }

    #[test]
    fn test_due_before_invoice_dropped() {
        let mut row = valid_row("AP-1", 10.0);
        row.due_date = Some(date(2023, 12, 31));
        let outcome = clean(&[row]);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.report_raw.due_before_invoice, 1);
    }

    #[test]
    fn test_same_day_due_date_kept() {
        let mut row = valid_row("AP-1", 10.0);
        row.due_date = row.invoice_date;
        let outcome = clean(&[row]);
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_invalid_currency_dropped() {
        let mut row = valid_row("AP-1", 10.0);
        row.currency = Some("CHF".into());
        let outcome = clean(&[row]);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.report_raw.invalid_currency, 1);
    }

    #[test]
    fn test_all_duplicate_group_members_dropped() {
        // Individually valid, identical composite key: both must go
        let a = valid_row("AP-1", 10.0);
        let b = valid_row("AP-1", 10.0);
        let c = valid_row("AP-2", 10.0);
        let outcome = clean(&[a, b, c]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].apid, "AP-2");
        assert_eq!(outcome.report_raw.duplicates, 2);
    }

    #[test]
    fn test_different_amount_is_not_duplicate() {
        let a = valid_row("AP-1", 10.0);
        let b = valid_row("AP-1", 20.0);
        let outcome = clean(&[a, b]);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn test_multi_defect_row_dropped_once_counted_per_predicate() {
        let mut row = valid_row("AP-1", 10.0);
        row.apid = None;
        row.amount = Some(Money::from_f64(-1.0));
        row.currency = Some("XXX".into());

        let outcome = clean(&[row]);
        assert_eq!(outcome.rows_removed, 1);
        // Diagnostic counts overlap on purpose
        assert_eq!(outcome.report_raw.missing_apid, 1);
        assert_eq!(outcome.report_raw.amount_zero_negative_or_missing, 1);
        assert_eq!(outcome.report_raw.invalid_currency, 1);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let rows = vec![
            valid_row("AP-1", 10.0),
            valid_row("AP-1", 10.0),
            valid_row("AP-2", 50.0),
            valid_row("AP-3", 75.25),
        ];
        let first = clean(&rows);
        let again_raw: Vec<RawInvoice> = first.records.iter().map(InvoiceRecord::to_raw).collect();
        let second = clean(&again_raw);
        assert_eq!(second.rows_removed, 0);
        assert_eq!(second.records, first.records);
    }

    #[test]
    fn test_clean_report_is_acceptance_check() {
        let mut bad = valid_row("AP-9", 10.0);
        bad.invoice_date = None;
        let rows = vec![valid_row("AP-1", 10.0), bad];

        let outcome = clean(&rows);
        assert!(!outcome.report_raw.is_clean());
        assert!(outcome.report_clean.is_clean());
        // Residual missing cells in optional columns are expected
        assert!(outcome.report_clean.missing_values_total > 0);
    }

    #[test]
    fn test_empty_table() {
        let outcome = clean(&[]);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.rows_total, 0);
        assert!(outcome.report_raw.is_clean());
    }
}
