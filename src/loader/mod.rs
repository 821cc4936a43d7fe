//! Source table loading
//!
//! Locates the source workbook in the raw-input directory, reads its first
//! worksheet into loosely-typed rows, and prefers the cleaned CSV cache when
//! one already exists on disk. Loading has no side effects beyond reading,
//! except in [`load_clean_or_raw`], which persists the cleaned table when it
//! had to clean from raw.

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use chrono::NaiveDate;
use log::{debug, info};

use crate::cleaning;
use crate::config::ApPaths;
use crate::error::{ApError, ApResult};
use crate::models::{InvoiceRecord, Money, RawInvoice};

/// The source table columns, by header name
const COL_APID: &str = "APID";
const COL_VENDOR: &str = "Vendor";
const COL_INVOICE_DATE: &str = "InvoiceDate";
const COL_DUE_DATE: &str = "DueDate";
const COL_PAID_DATE: &str = "PaidDate";
const COL_AMOUNT: &str = "Amount";
const COL_CURRENCY: &str = "Currency";
const COL_STATUS: &str = "Status";
const COL_TERMS: &str = "Terms";
const COL_AGING_BUCKET: &str = "AgingBucket";

/// A loaded cleaned table, with its provenance
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// The validated records
    pub records: Vec<InvoiceRecord>,
    /// True when the table came from the cleaned-CSV cache
    pub from_cache: bool,
}

/// Select the source workbook: the lexicographically first `*.xlsx` file
pub fn find_source_workbook(raw_dir: &Path) -> ApResult<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(raw_dir)
        .map_err(|_| ApError::MissingInput {
            dir: raw_dir.to_path_buf(),
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("xlsx")
        })
        .collect();

    candidates.sort();
    candidates.into_iter().next().ok_or(ApError::MissingInput {
        dir: raw_dir.to_path_buf(),
    })
}

/// Read the first worksheet of a workbook into raw invoice rows
///
/// The header row maps column names to indices; unknown columns are ignored
/// and missing optional columns yield `None` fields on every row.
pub fn read_workbook(path: &Path) -> ApResult<Vec<RawInvoice>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ApError::Workbook(format!("{} has no worksheets", path.display())))??;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };

    let columns = ColumnIndex::from_header(header);
    debug!("Workbook columns: {:?}", columns);

    let records: Vec<RawInvoice> = rows.map(|row| columns.parse_row(row)).collect();
    info!("Read {} raw rows from {}", records.len(), path.display());
    Ok(records)
}

/// Load the cleaned table, preferring the on-disk cache
///
/// When no cache exists, reads the raw workbook, cleans it, persists the
/// cleaned table for reuse, and returns it. Both the batch pipeline and the
/// interactive view go through this one rule set.
pub fn load_clean_or_raw(paths: &ApPaths) -> ApResult<LoadedTable> {
    let clean_csv = paths.clean_csv();
    if clean_csv.exists() {
        let records = crate::storage::read_clean_csv(&clean_csv)?;
        info!("Loaded {} records from cache {}", records.len(), clean_csv.display());
        return Ok(LoadedTable {
            records,
            from_cache: true,
        });
    }

    let workbook = find_source_workbook(&paths.raw_dir())?;
    let raw = read_workbook(&workbook)?;
    let outcome = cleaning::clean(&raw);
    crate::storage::write_clean_csv(&clean_csv, &outcome.records)?;
    Ok(LoadedTable {
        records: outcome.records,
        from_cache: false,
    })
}

/// Column-name to index mapping for one worksheet
#[derive(Debug, Default)]
struct ColumnIndex {
    apid: Option<usize>,
    vendor: Option<usize>,
    invoice_date: Option<usize>,
    due_date: Option<usize>,
    paid_date: Option<usize>,
    amount: Option<usize>,
    currency: Option<usize>,
    status: Option<usize>,
    terms: Option<usize>,
    aging_bucket: Option<usize>,
}

impl ColumnIndex {
    fn from_header(header: &[Data]) -> Self {
        let mut index = Self::default();
        for (i, cell) in header.iter().enumerate() {
            let Some(name) = cell.as_string() else {
                continue;
            };
            match name.trim() {
                COL_APID => index.apid = Some(i),
                COL_VENDOR => index.vendor = Some(i),
                COL_INVOICE_DATE => index.invoice_date = Some(i),
                COL_DUE_DATE => index.due_date = Some(i),
                COL_PAID_DATE => index.paid_date = Some(i),
                COL_AMOUNT => index.amount = Some(i),
                COL_CURRENCY => index.currency = Some(i),
                COL_STATUS => index.status = Some(i),
                COL_TERMS => index.terms = Some(i),
                COL_AGING_BUCKET => index.aging_bucket = Some(i),
                _ => {}
            }
        }
        index
    }

    fn parse_row(&self, row: &[Data]) -> RawInvoice {
        RawInvoice {
            apid: self.apid.and_then(|i| cell_string(row.get(i))),
            vendor: self.vendor.and_then(|i| cell_string(row.get(i))),
            invoice_date: self.invoice_date.and_then(|i| cell_date(row.get(i))),
            due_date: self.due_date.and_then(|i| cell_date(row.get(i))),
            paid_date: self.paid_date.and_then(|i| cell_date(row.get(i))),
            amount: self.amount.and_then(|i| cell_money(row.get(i))),
            currency: self.currency.and_then(|i| cell_string(row.get(i))),
            status: self.status.and_then(|i| cell_string(row.get(i))),
            terms: self.terms.and_then(|i| cell_string(row.get(i))),
            aging_bucket: self
                .aging_bucket
                .and_then(|i| cell_string(row.get(i)))
                .and_then(|label| label.parse().ok()),
        }
    }
}

/// Non-blank trimmed string content of a cell
fn cell_string(cell: Option<&Data>) -> Option<String> {
    let text = cell?.as_string()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Date content of a cell: native spreadsheet datetimes or ISO date strings
fn cell_date(cell: Option<&Data>) -> Option<NaiveDate> {
    let cell = cell?;
    if let Some(date) = cell.as_date() {
        return Some(date);
    }
    let text = cell.as_string()?;
    let trimmed = text.trim();
    // ISO first, then the slashed US form some exports use
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

/// Monetary content of a cell; unparseable text yields `None`
fn cell_money(cell: Option<&Data>) -> Option<Money> {
    let cell = cell?;
    if let Some(value) = cell.as_f64() {
        return Some(Money::from_f64(value));
    }
    let text = cell.as_string()?;
    Money::parse(text.trim()).ok()
}
