use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use ap_insight::config::ApPaths;
use ap_insight::features::{derive_features, FeaturedInvoice};
use ap_insight::models::{Currency, InvoiceRecord};
use ap_insight::reports::{ReportSet, DEFAULT_TOP_N};
use ap_insight::{cleaning, display, kpis, loader, storage};

#[derive(Parser)]
#[command(
    name = "ap-insight",
    author = "Kaylee Beyene",
    version,
    about = "Accounts-payable invoice cleaning, aging analysis, and KPI reporting",
    long_about = "ap-insight ingests a spreadsheet of accounts-payable invoices, \
                  validates and deduplicates it, derives aging and cash-flow \
                  features, and produces summary tables, KPIs, and terminal views."
)]
struct Cli {
    /// Base data directory (contains raw/ and processed/)
    #[arg(long, global = true, default_value = "data")]
    data_dir: String,

    /// Directory for rendered report outputs
    #[arg(long, global = true, default_value = "reports")]
    reports_dir: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and deduplicate the source workbook, writing ap_clean.csv
    Clean,

    /// Compute the KPI summary and currency breakdown
    Kpis,

    /// Write the three aggregate views (aging, top vendors, weekly cash)
    Reports {
        /// Number of vendors to keep in the top-vendors view
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
    },

    /// Render filtered KPIs and views in the terminal, writing nothing
    Show(ShowArgs),

    /// Run the whole pipeline: clean, kpis, reports
    Run {
        /// Number of vendors to keep in the top-vendors view
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
    },

    /// Show resolved directories and artifact paths
    Config,
}

#[derive(Args)]
struct ShowArgs {
    /// Only invoices dated on or after this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only invoices dated on or before this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Only these vendors (repeatable)
    #[arg(long)]
    vendor: Vec<String>,

    /// Only these currencies (repeatable)
    #[arg(long)]
    currency: Vec<Currency>,

    /// Write the filtered table to this CSV path
    #[arg(long)]
    export: Option<std::path::PathBuf>,

    /// Number of vendors to keep in the top-vendors view
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let paths = ApPaths::new(&cli.data_dir, &cli.reports_dir);
    let today = Local::now().date_naive();

    match cli.command {
        Some(Commands::Clean) => run_clean(&paths)?,
        Some(Commands::Kpis) => run_kpis(&paths, today)?,
        Some(Commands::Reports { top_n }) => run_reports(&paths, today, top_n)?,
        Some(Commands::Show(args)) => run_show(&paths, today, args)?,
        Some(Commands::Run { top_n }) => {
            run_clean(&paths)?;
            run_kpis(&paths, today)?;
            run_reports(&paths, today, top_n)?;
        }
        Some(Commands::Config) => {
            println!("ap-insight configuration");
            println!("========================");
            println!("Raw inputs:     {}", paths.raw_dir().display());
            println!("Processed:      {}", paths.processed_dir().display());
            println!("Reports:        {}", paths.reports_dir().display());
            println!("Cleaned table:  {}", paths.clean_csv().display());
        }
        None => {
            println!("ap-insight - Accounts-payable invoice analysis");
            println!();
            println!("Run 'ap-insight --help' for usage information.");
            println!("Run 'ap-insight run' to execute the whole pipeline.");
        }
    }

    Ok(())
}

fn run_clean(paths: &ApPaths) -> Result<()> {
    paths.ensure_directories()?;

    let workbook = loader::find_source_workbook(&paths.raw_dir())?;
    println!("Using: {}", workbook.display());

    let raw = loader::read_workbook(&workbook)?;
    println!("Raw rows: {}", raw.len());

    let outcome = cleaning::clean(&raw);

    println!();
    println!("--- DATA QUALITY (RAW) ---");
    println!("{}", outcome.report_raw);

    let written = storage::write_clean_csv(&paths.clean_csv(), &outcome.records)?;

    println!();
    println!("--- CLEANING SUMMARY ---");
    println!("rows_total: {}", outcome.rows_total);
    println!("rows_removed: {}", outcome.rows_removed);
    println!("rows_cleaned: {}", outcome.records.len());
    println!("saved: {}", written.display());

    println!();
    println!("--- DATA QUALITY (CLEANED) ---");
    println!("{}", outcome.report_clean);

    Ok(())
}

fn run_kpis(paths: &ApPaths, today: NaiveDate) -> Result<()> {
    paths.ensure_directories()?;

    let table = loader::load_clean_or_raw(paths)?;
    let featured = derive_features(&table.records, today);

    let summary = kpis::compute_kpis(&featured, today);
    let (csv_path, json_path) = kpis::write_kpis(paths, &summary)?;

    let breakdown = kpis::currency_breakdown(&featured);
    let ccy_path = storage::write_csv_atomic(paths.currency_breakdown_csv(), &breakdown)?;

    println!("{}", display::format_kpis(&summary));
    println!("{}", display::format_currency_breakdown(&breakdown));
    println!("Saved: {}", csv_path.display());
    println!("Saved: {}", json_path.display());
    println!("Saved: {}", ccy_path.display());

    Ok(())
}

fn run_reports(paths: &ApPaths, today: NaiveDate, top_n: usize) -> Result<()> {
    paths.ensure_directories()?;

    let table = loader::load_clean_or_raw(paths)?;
    let featured = derive_features(&table.records, today);

    let reports = ReportSet::build(&featured, top_n);
    let written = reports.write(paths)?;

    println!("{}", display::format_aging(&reports.aging));
    println!("{}", display::format_vendors(&reports.vendors));
    println!("{}", display::format_cash(&reports.cash));
    for path in written {
        println!("Saved: {}", path.display());
    }

    Ok(())
}

fn run_show(paths: &ApPaths, today: NaiveDate, args: ShowArgs) -> Result<()> {
    let table = loader::load_clean_or_raw(paths)?;
    let filtered = apply_filters(table.records, &args);

    // The filtered subset goes back through the same deriver and aggregator
    let featured: Vec<FeaturedInvoice> = derive_features(&filtered, today);
    let summary = kpis::compute_kpis(&featured, today);
    let reports = ReportSet::build(&featured, args.top_n);

    println!("{}", display::format_kpis(&summary));
    println!("{}", display::format_aging(&reports.aging));
    println!("{}", display::format_vendors(&reports.vendors));
    println!("{}", display::format_cash(&reports.cash));

    if let Some(export) = &args.export {
        let written = storage::write_csv_atomic(export, &filtered)?;
        println!("Saved: {}", written.display());
    }

    println!(
        "{} • Rows: {}",
        if table.from_cache {
            "Loaded from processed"
        } else {
            "Cleaned from raw"
        },
        filtered.len()
    );

    Ok(())
}

fn apply_filters(records: Vec<InvoiceRecord>, args: &ShowArgs) -> Vec<InvoiceRecord> {
    records
        .into_iter()
        .filter(|r| args.from.map_or(true, |from| r.invoice_date >= from))
        .filter(|r| args.to.map_or(true, |to| r.invoice_date <= to))
        .filter(|r| args.vendor.is_empty() || args.vendor.contains(&r.vendor))
        .filter(|r| args.currency.is_empty() || args.currency.contains(&r.currency))
        .collect()
}
