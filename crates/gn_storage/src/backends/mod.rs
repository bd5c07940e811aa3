pub mod markdown;
pub mod memory;

pub use markdown::MarkdownStore;
pub use memory::InMemoryStore;

use chrono::NaiveDate;

/// `YYYY-MM-DD.md`
pub fn file_name(date: NaiveDate) -> String {
    format!("{}.md", date.format("%Y-%m-%d"))
}
