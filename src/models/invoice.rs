//! Invoice record types
//!
//! Two shapes of the same row: `RawInvoice` is the loosely-typed form straight
//! out of the source workbook (every field optional, parse failures recorded
//! as `None`), and `InvoiceRecord` is the validated form that survives
//! cleaning. Cleaning never mutates a raw row; it produces new records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AgingBucket, Currency, Money};

/// One row of the source table, before validation
///
/// `None` means the cell was missing or unparseable; the cleaning predicates
/// decide what that implies per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInvoice {
    /// Invoice identifier (blank-stripped; `None` when missing or blank)
    pub apid: Option<String>,
    /// Vendor name
    pub vendor: Option<String>,
    /// Invoice issue date
    pub invoice_date: Option<NaiveDate>,
    /// Payment due date
    pub due_date: Option<NaiveDate>,
    /// Date payment was made, when paid
    pub paid_date: Option<NaiveDate>,
    /// Invoice amount
    pub amount: Option<Money>,
    /// Currency code as it appeared in the cell (validated during cleaning)
    pub currency: Option<String>,
    /// Free-text status ("paid" marks payment, case-insensitively)
    pub status: Option<String>,
    /// Free-text payment terms, e.g. "Net 30"
    pub terms: Option<String>,
    /// Pre-existing aging bucket, when the loaded table already carried one
    pub aging_bucket: Option<AgingBucket>,
}

impl RawInvoice {
    /// Duplicate-detection key over the raw cell values
    ///
    /// Missing cells participate as `None`, so two rows that are blank in the
    /// same fields still collide, matching string-keyed duplicate detection.
    pub fn composite_key(&self) -> RawCompositeKey {
        (
            self.apid.clone(),
            self.vendor.clone(),
            self.invoice_date,
            self.amount.map(|m| m.cents()),
        )
    }

    /// Number of missing cells among the nine source columns
    pub fn missing_count(&self) -> usize {
        [
            self.apid.is_none(),
            self.vendor.is_none(),
            self.invoice_date.is_none(),
            self.due_date.is_none(),
            self.paid_date.is_none(),
            self.amount.is_none(),
            self.currency.is_none(),
            self.status.is_none(),
            self.terms.is_none(),
        ]
        .into_iter()
        .filter(|&missing| missing)
        .count()
    }

    /// Convert to a validated record, if every row-level invariant holds
    ///
    /// Duplicate detection is table-level and not checked here.
    pub fn to_clean(&self) -> Option<InvoiceRecord> {
        let apid = self.apid.clone()?;
        let amount = self.amount.filter(|a| a.is_positive())?;
        let invoice_date = self.invoice_date?;
        let due_date = self.due_date?;
        if due_date < invoice_date {
            return None;
        }
        let currency: Currency = self.currency.as_deref()?.parse().ok()?;

        Some(InvoiceRecord {
            apid,
            vendor: self.vendor.clone().unwrap_or_default(),
            invoice_date,
            due_date,
            paid_date: self.paid_date,
            amount,
            currency,
            status: self.status.clone(),
            terms: self.terms.clone(),
            aging_bucket: self.aging_bucket,
        })
    }
}

/// Composite key over raw cell values: (APID, Vendor, InvoiceDate, Amount)
pub type RawCompositeKey = (Option<String>, Option<String>, Option<NaiveDate>, Option<i64>);

/// One validated invoice row
///
/// Field names serialize to the source table's column headers, so the cleaned
/// CSV artifact round-trips through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Invoice identifier, non-blank
    #[serde(rename = "APID")]
    pub apid: String,
    /// Vendor name (empty string when the source cell was blank)
    #[serde(rename = "Vendor", default)]
    pub vendor: String,
    /// Invoice issue date
    #[serde(rename = "InvoiceDate")]
    pub invoice_date: NaiveDate,
    /// Payment due date, never before the invoice date
    #[serde(rename = "DueDate")]
    pub due_date: NaiveDate,
    /// Date payment was made, when paid
    #[serde(rename = "PaidDate", default)]
    pub paid_date: Option<NaiveDate>,
    /// Invoice amount, strictly positive
    #[serde(rename = "Amount")]
    pub amount: Money,
    /// Invoice currency, from the allowed set
    #[serde(rename = "Currency")]
    pub currency: Currency,
    /// Free-text status
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    /// Free-text payment terms
    #[serde(rename = "Terms", default)]
    pub terms: Option<String>,
    /// Aging bucket carried over from a cached table, if any
    #[serde(rename = "AgingBucket", default)]
    pub aging_bucket: Option<AgingBucket>,
}

impl InvoiceRecord {
    /// Duplicate-detection key: (APID, Vendor, InvoiceDate, Amount)
    pub fn composite_key(&self) -> (String, String, NaiveDate, i64) {
        (
            self.apid.clone(),
            self.vendor.clone(),
            self.invoice_date,
            self.amount.cents(),
        )
    }

    /// View this record as a raw row (used when re-cleaning a cached table)
    pub fn to_raw(&self) -> RawInvoice {
        RawInvoice {
            apid: Some(self.apid.clone()),
            vendor: if self.vendor.is_empty() {
                None
            } else {
                Some(self.vendor.clone())
            },
            invoice_date: Some(self.invoice_date),
            due_date: Some(self.due_date),
            paid_date: self.paid_date,
            amount: Some(self.amount),
            currency: Some(self.currency.code().to_string()),
            status: self.status.clone(),
            terms: self.terms.clone(),
            aging_bucket: self.aging_bucket,
        }
    }
}
