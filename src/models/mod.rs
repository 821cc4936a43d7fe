//! Core data models for ap-insight
//!
//! This module contains the data structures that represent the
//! accounts-payable domain: invoice rows (raw and validated), monetary
//! amounts, currencies, and aging buckets.

pub mod aging;
pub mod currency;
pub mod invoice;
pub mod money;

pub use aging::AgingBucket;
pub use currency::Currency;
pub use invoice::{InvoiceRecord, RawCompositeKey, RawInvoice};
pub use money::Money;
