use std::path::PathBuf;

use thiserror::Error;

use crate::types::Digest;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("No articles parsed from the search output")]
    NoArticles,

    #[error("Enrichment error: {0}")]
    Enrichment(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The digest was generated but could not be persisted. The generated
    /// digest travels with the error so callers can still use it.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: Box<Error>,
        digest: Box<Digest>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = Error::Configuration("Missing OpenAI API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: Missing OpenAI API key");
    }

    #[test]
    fn test_no_articles_is_distinct_from_fetch() {
        let fetch = Error::Fetch("no data".to_string());
        assert!(matches!(fetch, Error::Fetch(_)));
        assert!(!matches!(Error::NoArticles, Error::Fetch(_)));
    }
}
