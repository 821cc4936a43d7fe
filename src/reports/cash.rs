//! Weekly cash outflow over open invoices
//!
//! Due dates bucket to the Monday of their week; one row per week with an
//! open invoice, sorted chronologically.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::features::FeaturedInvoice;
use crate::models::Money;

/// One row of the weekly cash view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashWeekRow {
    /// Monday of the due week
    #[serde(rename = "DueWeek")]
    pub due_week: NaiveDate,
    /// Open amount due that week
    #[serde(rename = "Amount")]
    pub amount: Money,
}

/// The Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sum open amounts per due week, chronologically
pub fn cash_weekly(featured: &[FeaturedInvoice]) -> Vec<CashWeekRow> {
    let mut weeks: BTreeMap<NaiveDate, Money> = BTreeMap::new();
    for inv in featured.iter().filter(|f| f.is_open()) {
        *weeks
            .entry(week_start(inv.record.due_date))
            .or_insert(Money::zero()) += inv.record.amount;
    }

    weeks
        .into_iter()
        .map(|(due_week, amount)| CashWeekRow { due_week, amount })
        .collect()
}
