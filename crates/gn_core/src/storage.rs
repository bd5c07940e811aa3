use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::Result;

/// One document per calendar day. Existing documents are never overwritten.
#[async_trait]
pub trait DailyStore: Send + Sync {
    /// Location of the document for `date`, whether or not it exists yet.
    fn path_for(&self, date: NaiveDate) -> PathBuf;

    async fn exists(&self, date: NaiveDate) -> Result<bool>;

    /// Writes `contents` for `date` unless a document is already present.
    /// Returns whether a write happened.
    async fn write_if_absent(&self, date: NaiveDate, contents: &str) -> Result<bool>;
}
