//! Aggregate views over the featured table
//!
//! Three independent groupings: aging-by-bucket and weekly cash outflow over
//! open invoices, and top vendors over the whole table. Each is a pure
//! function; persistence goes through the storage layer.

pub mod aging;
pub mod cash;
pub mod vendors;

use std::path::PathBuf;

use crate::config::ApPaths;
use crate::error::ApResult;
use crate::features::FeaturedInvoice;
use crate::storage;

pub use aging::{aging_open, AgingRow};
pub use cash::{cash_weekly, week_start, CashWeekRow};
pub use vendors::{top_vendors, VendorRow, DEFAULT_TOP_N};

/// The three aggregate views, computed together
#[derive(Debug, Clone)]
pub struct ReportSet {
    /// Aging-by-bucket over open invoices
    pub aging: Vec<AgingRow>,
    /// Top vendors by spend over the whole table
    pub vendors: Vec<VendorRow>,
    /// Weekly cash outflow over open invoices
    pub cash: Vec<CashWeekRow>,
}

impl ReportSet {
    /// Compute all three views
    pub fn build(featured: &[FeaturedInvoice], top_n: usize) -> Self {
        Self {
            aging: aging_open(featured),
            vendors: top_vendors(featured, top_n),
            cash: cash_weekly(featured),
        }
    }

    /// Persist all three views, returning the paths actually written
    pub fn write(&self, paths: &ApPaths) -> ApResult<Vec<PathBuf>> {
        Ok(vec![
            storage::write_csv_atomic(paths.aging_csv(), &self.aging)?,
            storage::write_csv_atomic(paths.top_vendors_csv(), &self.vendors)?,
            storage::write_csv_atomic(paths.cash_weekly_csv(), &self.cash)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_features;
    use crate::models::{Currency, InvoiceRecord, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn invoice(apid: &str, vendor: &str, amount: f64) -> InvoiceRecord {
        InvoiceRecord {
            apid: apid.into(),
            vendor: vendor.into(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            paid_date: None,
            amount: Money::from_f64(amount),
            currency: Currency::Usd,
            status: None,
            terms: None,
            aging_bucket: None,
        }
    }

    #[test]
    fn test_build_and_write_all_views() {
        let records = vec![invoice("AP-1", "Acme", 100.0), invoice("AP-2", "Globex", 50.0)];
        let featured = derive_features(&records, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let reports = ReportSet::build(&featured, DEFAULT_TOP_N);

        let temp_dir = TempDir::new().unwrap();
        let paths = ApPaths::new(
            temp_dir.path().join("data"),
            temp_dir.path().join("reports"),
        );
        let written = reports.write(&paths).unwrap();

        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists());
        }

        // Header rows are part of the artifact contract
        let aging = std::fs::read_to_string(&written[0]).unwrap();
        assert!(aging.starts_with("AgingBucket,Amount,Count"));
        let vendors = std::fs::read_to_string(&written[1]).unwrap();
        assert!(vendors.starts_with("Vendor,Amount,CountInvoices"));
        let cash = std::fs::read_to_string(&written[2]).unwrap();
        assert!(cash.starts_with("DueWeek,Amount"));
    }
}
