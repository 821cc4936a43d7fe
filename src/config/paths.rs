//! Path management for ap-insight
//!
//! All artifacts live under two user-supplied roots: a data directory
//! (containing `raw/` for source workbooks and `processed/` for pipeline
//! artifacts) and a reports directory for rendered outputs. There is no
//! other configuration surface.

use std::path::{Path, PathBuf};

use crate::error::ApResult;

/// Manages all paths used by the pipeline
#[derive(Debug, Clone)]
pub struct ApPaths {
    /// Base data directory (contains raw/ and processed/)
    data_dir: PathBuf,
    /// Directory for rendered report outputs
    reports_dir: PathBuf,
}

impl ApPaths {
    /// Create paths rooted at the given data and reports directories
    pub fn new(data_dir: impl Into<PathBuf>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            reports_dir: reports_dir.into(),
        }
    }

    /// The base data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Raw-input directory (source workbooks land here)
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    /// Processed-artifact directory
    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    /// Directory for rendered report outputs
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// The cleaned invoice table
    pub fn clean_csv(&self) -> PathBuf {
        self.processed_dir().join("ap_clean.csv")
    }

    /// Aging-by-bucket view over open invoices
    pub fn aging_csv(&self) -> PathBuf {
        self.processed_dir().join("aging_open.csv")
    }

    /// Top vendors by spend
    pub fn top_vendors_csv(&self) -> PathBuf {
        self.processed_dir().join("top_vendors.csv")
    }

    /// Weekly cash outflow over open invoices
    pub fn cash_weekly_csv(&self) -> PathBuf {
        self.processed_dir().join("cash_weekly.csv")
    }

    /// KPI summary as a flat one-row table
    pub fn kpi_csv(&self) -> PathBuf {
        self.processed_dir().join("kpis_summary.csv")
    }

    /// KPI summary as a structured record document
    pub fn kpi_json(&self) -> PathBuf {
        self.processed_dir().join("kpis_summary.json")
    }

    /// Per-currency invoice breakdown
    pub fn currency_breakdown_csv(&self) -> PathBuf {
        self.processed_dir().join("kpi_currency_breakdown.csv")
    }

    /// Ensure the processed and reports directories exist
    pub fn ensure_directories(&self) -> ApResult<()> {
        std::fs::create_dir_all(self.processed_dir())?;
        std::fs::create_dir_all(&self.reports_dir)?;
        Ok(())
    }
}

impl Default for ApPaths {
    fn default() -> Self {
        Self::new("data", "reports")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_paths() {
        let paths = ApPaths::new("data", "reports");
        assert_eq!(paths.raw_dir(), PathBuf::from("data/raw"));
        assert_eq!(
            paths.clean_csv(),
            PathBuf::from("data/processed/ap_clean.csv")
        );
        assert_eq!(
            paths.kpi_json(),
            PathBuf::from("data/processed/kpis_summary.json")
        );
        assert_eq!(paths.reports_dir(), Path::new("reports"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ApPaths::new(
            temp_dir.path().join("data"),
            temp_dir.path().join("reports"),
        );

        paths.ensure_directories().unwrap();

        assert!(paths.processed_dir().exists());
        assert!(paths.reports_dir().exists());
        // raw/ is input-only; the pipeline never creates it
        assert!(!paths.raw_dir().exists());
    }
}
