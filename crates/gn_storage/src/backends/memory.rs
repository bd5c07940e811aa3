use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use gn_core::{DailyStore, Result};
use tokio::sync::RwLock;

use super::file_name;

/// Keeps documents in memory; paths are reported as if under `dir`.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    dir: PathBuf,
    documents: Arc<RwLock<HashMap<NaiveDate, String>>>,
}

impl InMemoryStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, date: NaiveDate) -> Option<String> {
        self.documents.read().await.get(&date).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl DailyStore for InMemoryStore {
    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(file_name(date))
    }

    async fn exists(&self, date: NaiveDate) -> Result<bool> {
        Ok(self.documents.read().await.contains_key(&date))
    }

    async fn write_if_absent(&self, date: NaiveDate, contents: &str) -> Result<bool> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&date) {
            return Ok(false);
        }
        documents.insert(date, contents.to_string());
        Ok(true)
    }
}
