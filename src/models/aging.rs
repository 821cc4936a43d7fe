//! Aging buckets for overdue classification
//!
//! Buckets use left-open/right-closed day intervals with boundaries at
//! 0, 30, 60 and 90: exactly 0 days past due is `Current`, exactly 30 lands
//! in `0–30`, and so on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How overdue an invoice is, in fixed day-count bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    #[serde(rename = "Current")]
    Current,
    #[serde(rename = "0–30")]
    Days0To30,
    #[serde(rename = "31–60")]
    Days31To60,
    #[serde(rename = "61–90")]
    Days61To90,
    #[serde(rename = ">90")]
    Over90,
}

impl AgingBucket {
    /// All buckets in category order (the order aggregate views sort by)
    pub const ALL: [AgingBucket; 5] = [
        AgingBucket::Current,
        AgingBucket::Days0To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    /// Classify a non-negative days-past-due count
    pub fn from_days_past_due(days: i64) -> Self {
        match days {
            d if d <= 0 => AgingBucket::Current,
            d if d <= 30 => AgingBucket::Days0To30,
            d if d <= 60 => AgingBucket::Days31To60,
            d if d <= 90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }

    /// The display label, matching the persisted artifact columns
    pub const fn label(&self) -> &'static str {
        match self {
            AgingBucket::Current => "Current",
            AgingBucket::Days0To30 => "0–30",
            AgingBucket::Days31To60 => "31–60",
            AgingBucket::Days61To90 => "61–90",
            AgingBucket::Over90 => ">90",
        }
    }
}

impl fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgingBucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Current" => Ok(AgingBucket::Current),
            "0–30" => Ok(AgingBucket::Days0To30),
            "31–60" => Ok(AgingBucket::Days31To60),
            "61–90" => Ok(AgingBucket::Days61To90),
            ">90" => Ok(AgingBucket::Over90),
            other => Err(UnknownBucket(other.to_string())),
        }
    }
}

/// Error for an unrecognized bucket label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBucket(pub String);

impl fmt::Display for UnknownBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown aging bucket: {}", self.0)
    }
}

impl std::error::Error for UnknownBucket {}
