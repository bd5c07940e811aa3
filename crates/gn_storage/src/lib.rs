use std::path::Path;
use std::sync::Arc;

use gn_core::{DailyStore, Error, Result};

pub mod backends;

pub use backends::*;

/// Builds a store by name: `markdown` (files under `dir`) or `memory`.
pub fn create_store(kind: &str, dir: &Path) -> Result<Arc<dyn DailyStore>> {
    match kind {
        "markdown" => Ok(Arc::new(MarkdownStore::new(dir))),
        "memory" => Ok(Arc::new(InMemoryStore::new(dir))),
        other => Err(Error::Configuration(format!(
            "Unknown storage backend: {} (expected markdown or memory)",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::create_store;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_create_store() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let store = create_store("markdown", Path::new("out")).unwrap();
        assert_eq!(store.path_for(date), Path::new("out").join("2024-05-02.md"));

        assert!(create_store("memory", Path::new("out")).is_ok());
        assert!(matches!(
            create_store("qdrant", Path::new("out")),
            Err(Error::Configuration(_))
        ));
    }
}
