mod policy;
mod store;

pub use policy::{QuotaPolicy, QuotaSnapshot};
pub use store::{decode_record, FileQuotaStore, MemoryQuotaStore, QuotaStore, QuotaStoreError};

use chrono::{Local, NaiveDate};

/// Source of the client's current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
