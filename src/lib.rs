//! ap-insight - Accounts-payable invoice analysis pipeline
//!
//! This library cleans a spreadsheet of accounts-payable invoices, derives
//! aging and cash-flow features, aggregates them into summary views and a
//! KPI record, and renders the results in the terminal.
//!
//! # Architecture
//!
//! The crate is organized into the following modules, in pipeline order:
//!
//! - `config`: directory and artifact-path management
//! - `error`: custom error types
//! - `models`: invoice rows, amounts, currencies, aging buckets
//! - `loader`: workbook discovery and ingest, cleaned-table cache
//! - `cleaning`: validity predicates, deduplication, quality reporting
//! - `features`: paid/open status, days-past-due, aging buckets
//! - `reports`: the three aggregate views (aging, vendors, weekly cash)
//! - `kpis`: scalar KPI summary and per-currency breakdown
//! - `storage`: atomic, retry-tolerant artifact writes
//! - `display`: terminal rendering of views and KPIs
//!
//! # Example
//!
//! ```rust,ignore
//! use ap_insight::{config::ApPaths, features, kpis, loader};
//!
//! let paths = ApPaths::default();
//! let table = loader::load_clean_or_raw(&paths)?;
//! let featured = features::derive_features(&table.records, today);
//! let summary = kpis::compute_kpis(&featured, today);
//! ```

pub mod cleaning;
pub mod config;
pub mod display;
pub mod error;
pub mod features;
pub mod kpis;
pub mod loader;
pub mod models;
pub mod reports;
pub mod storage;

pub use error::{ApError, ApResult};
