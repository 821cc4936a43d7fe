//! Terminal rendering of aggregate views and the KPI block
//!
//! The Presenter is a pure consumer of the Aggregator outputs: aligned
//! tables with unicode bars for the two categorical views, a marker line for
//! the weekly time series, and labeled metric lines for the KPI record.

use crate::kpis::{CurrencyRow, KpiSummary};
use crate::models::Money;
use crate::reports::{AgingRow, CashWeekRow, VendorRow};

/// Width of the rendered bar column
const BAR_WIDTH: usize = 30;

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct < 0.1 && pct > 0.0 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Create a simple bar chart representation
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Render the aging-by-bucket view as an aligned bar table
pub fn format_aging(rows: &[AgingRow]) -> String {
    let max = rows
        .iter()
        .map(|r| r.amount.to_f64())
        .fold(0.0_f64, f64::max);

    let mut out = String::from("AP Aging — Open Invoices\n");
    out.push_str(&separator(60));
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{:<8} {:>14}  {:>5}  {}\n",
            row.bucket.label(),
            row.amount.format_grouped(),
            row.count,
            format_bar(row.amount.to_f64(), max, BAR_WIDTH)
        ));
    }
    out
}

/// Render the top-vendors view as an aligned bar table
pub fn format_vendors(rows: &[VendorRow]) -> String {
    let max = rows
        .iter()
        .map(|r| r.amount.to_f64())
        .fold(0.0_f64, f64::max);

    let mut out = String::from("Top Vendors by Spend\n");
    out.push_str(&separator(60));
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{:<20} {:>14}  {:>4}  {}\n",
            truncate(&row.vendor, 20),
            row.amount.format_grouped(),
            row.count_invoices,
            format_bar(row.amount.to_f64(), max, BAR_WIDTH)
        ));
    }
    out
}

/// Render the weekly cash view as a marker series
pub fn format_cash(rows: &[CashWeekRow]) -> String {
    let max = rows
        .iter()
        .map(|r| r.amount.to_f64())
        .fold(0.0_f64, f64::max);

    let mut out = String::from("Weekly Cash Outflow (Open Invoices)\n");
    out.push_str(&separator(60));
    out.push('\n');
    if rows.is_empty() {
        out.push_str("(no open invoices)\n");
        return out;
    }
    for row in rows {
        out.push_str(&format!(
            "{}  {:>14}  {}\n",
            row.due_week,
            row.amount.format_grouped(),
            format_bar(row.amount.to_f64(), max, BAR_WIDTH)
        ));
    }
    out
}

/// Render the KPI record as labeled metric lines
pub fn format_kpis(kpis: &KpiSummary) -> String {
    let mut out = String::from("KPI Summary\n");
    out.push_str(&separator(60));
    out.push('\n');

    push_count(&mut out, "Invoices", kpis.invoices_total);
    push_amount(&mut out, "Total amount", kpis.amount_total);
    push_count(&mut out, "Open", kpis.open_count);
    push_amount(&mut out, "Open amount", kpis.open_amount);
    push_count(&mut out, "Overdue", kpis.overdue_count);
    push_amount(&mut out, "Overdue amount", kpis.overdue_amount);
    push_pct(&mut out, "Overdue % of open", kpis.pct_overdue_amount);
    push_pct(&mut out, "Top-10 vendor share", kpis.top10_vendor_share_pct);
    push_opt(&mut out, "Top vendor", kpis.top_vendor_name.as_deref());
    push_opt(
        &mut out,
        "Top vendor amount",
        kpis.top_vendor_amount.map(|m| m.format_grouped()).as_deref(),
    );
    push_days(&mut out, "Days to pay (avg)", kpis.days_to_pay_avg);
    push_days(&mut out, "Days to pay (median)", kpis.days_to_pay_median);
    push_days(&mut out, "Delay vs due (avg)", kpis.delay_vs_due_avg);
    push_pct(&mut out, "Paid late", kpis.delay_vs_due_pct_late);
    push_amount(&mut out, "Cash due next 7d", kpis.cash_out_next_7);
    push_amount(&mut out, "Cash due next 30d", kpis.cash_out_next_30);
    push_days(&mut out, "Terms days (avg)", kpis.terms_days_avg);
    push_days(&mut out, "Terms days (median)", kpis.terms_days_median);
    out
}

/// Render the per-currency breakdown
pub fn format_currency_breakdown(rows: &[CurrencyRow]) -> String {
    let mut out = String::from("Currency Breakdown\n");
    out.push_str(&separator(60));
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{:<4} {:>6}  {:>14}\n",
            row.currency.code(),
            row.count,
            row.amount.format_grouped()
        ));
    }
    out
}

/// Truncate a string to a maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn push_count(out: &mut String, label: &str, value: usize) {
    out.push_str(&format!("{:<22} {}\n", label, value));
}

fn push_amount(out: &mut String, label: &str, value: Money) {
    out.push_str(&format!("{:<22} {}\n", label, value.format_grouped()));
}

fn push_pct(out: &mut String, label: &str, value: Option<f64>) {
    match value {
        Some(pct) => out.push_str(&format!("{:<22} {}\n", label, format_percentage(pct))),
        None => out.push_str(&format!("{:<22} n/a\n", label)),
    }
}

fn push_days(out: &mut String, label: &str, value: Option<f64>) {
    match value {
        Some(days) => out.push_str(&format!("{:<22} {:.1}\n", label, days)),
        None => out.push_str(&format!("{:<22} n/a\n", label)),
    }
}

fn push_opt(out: &mut String, label: &str, value: Option<&str>) {
    out.push_str(&format!("{:<22} {}\n", label, value.unwrap_or("n/a")));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgingBucket;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "0.05%");
        assert_eq!(format_percentage(5.5), "5.5%");
        assert_eq!(format_percentage(50.0), "50%");
    }

    #[test]
    fn test_format_bar() {
        let bar = format_bar(50.0, 100.0, 10);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(format_bar(0.0, 100.0, 10), " ".repeat(10));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 5), "He...");
        assert_eq!(truncate("Hi", 5), "Hi");
        assert_eq!(truncate("Test", 4), "Test");
    }

    #[test]
    fn test_format_aging_lists_every_bucket() {
        let rows: Vec<AgingRow> = AgingBucket::ALL
            .into_iter()
            .map(|bucket| AgingRow {
                bucket,
                amount: Money::from_f64(10.0),
                count: 1,
            })
            .collect();
        let text = format_aging(&rows);
        for bucket in AgingBucket::ALL {
            assert!(text.contains(bucket.label()));
        }
    }

    #[test]
    fn test_format_cash_empty() {
        assert!(format_cash(&[]).contains("no open invoices"));
    }

    #[test]
    fn test_format_kpis_shows_null_as_na() {
        let kpis = crate::kpis::compute_kpis(&[], chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let text = format_kpis(&kpis);
        let line = text
            .lines()
            .find(|l| l.starts_with("Overdue % of open"))
            .unwrap();
        assert!(line.ends_with("n/a"));
    }
}
