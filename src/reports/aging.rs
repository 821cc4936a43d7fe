//! Aging-by-bucket view over open invoices

use serde::{Deserialize, Serialize};

use crate::features::FeaturedInvoice;
use crate::models::{AgingBucket, Money};

/// One row of the aging view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingRow {
    /// Aging bucket
    #[serde(rename = "AgingBucket")]
    pub bucket: AgingBucket,
    /// Open amount in the bucket
    #[serde(rename = "Amount")]
    pub amount: Money,
    /// Open invoice count in the bucket
    #[serde(rename = "Count")]
    pub count: usize,
}

/// Group open invoices by aging bucket
///
/// Every bucket is emitted in category order, zero-filled when empty, so the
/// view always has the same shape.
pub fn aging_open(featured: &[FeaturedInvoice]) -> Vec<AgingRow> {
    AgingBucket::ALL
        .into_iter()
        .map(|bucket| {
            let mut amount = Money::zero();
            let mut count = 0;
            for inv in featured.iter().filter(|f| f.is_open()) {
                if inv.aging_bucket == bucket {
                    amount += inv.record.amount;
                    count += 1;
                }
            }
            AgingRow {
                bucket,
                amount,
                count,
            }
        })
        .collect()
}
