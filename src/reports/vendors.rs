//! Top vendors by total spend
//!
//! Runs over the whole table, paid and open alike.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::features::FeaturedInvoice;
use crate::models::Money;

/// Default number of vendors kept in the view
pub const DEFAULT_TOP_N: usize = 10;

/// One row of the top-vendors view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRow {
    /// Vendor name
    #[serde(rename = "Vendor")]
    pub vendor: String,
    /// Total spend with this vendor
    #[serde(rename = "Amount")]
    pub amount: Money,
    /// Number of invoices from this vendor
    #[serde(rename = "CountInvoices")]
    pub count_invoices: usize,
}

/// Group by vendor, sort by spend descending, keep the top `top_n`
///
/// Ties break alphabetically so the view is deterministic.
pub fn top_vendors(featured: &[FeaturedInvoice], top_n: usize) -> Vec<VendorRow> {
    let mut totals: HashMap<&str, (Money, usize)> = HashMap::new();
    for inv in featured {
        let entry = totals
            .entry(inv.record.vendor.as_str())
            .or_insert((Money::zero(), 0));
        entry.0 += inv.record.amount;
        entry.1 += 1;
    }

    let mut rows: Vec<VendorRow> = totals
        .into_iter()
        .map(|(vendor, (amount, count_invoices))| VendorRow {
            vendor: vendor.to_string(),
            amount,
            count_invoices,
        })
        .collect();

    rows.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.vendor.cmp(&b.vendor)));
    rows.truncate(top_n);
    rows
}
