use std::path::PathBuf;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Title used when a feed entry carries a URL or summary but no title.
pub const UNTITLED: &str = "未命名";

/// A single news item. Values are never mutated in place; enrichment
/// produces a new `Article` through [`Article::with_content`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub source: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: None,
            author: None,
            published_at: None,
            url: None,
            description: None,
            content: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns a copy of this article carrying the fetched body text.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..self.clone()
        }
    }
}

/// Output of the search stage: the raw text plus the articles recovered from it,
/// in the relevance order reported by the search collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub raw_feed: String,
    pub extra_notes: Vec<String>,
    pub articles: Vec<Article>,
}

/// One run of the digest pipeline.
#[derive(Debug, Clone)]
pub struct Digest {
    pub report: String,
    pub summary: String,
    pub articles: Vec<Article>,
    pub raw_feed: String,
    pub extra_notes: Vec<String>,
    pub generated_at: DateTime<Tz>,
    pub output_path: PathBuf,
    /// False when a file for the day already existed or writing was disabled.
    pub written: bool,
}

/// Reply of an external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolReply {
    pub is_error: bool,
    pub texts: Vec<String>,
}

impl ToolReply {
    pub fn text(texts: Vec<String>) -> Self {
        Self {
            is_error: false,
            texts,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            texts: vec![message.into()],
        }
    }

    /// Non-blank text items, trimmed, joined by newlines.
    pub fn joined(&self) -> String {
        self.texts
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_content_returns_new_value() {
        let article = Article::new("Joyful Discovery").with_url("https://example.com/story");
        let enriched = article.with_content("Full body");

        assert_eq!(article.content, None);
        assert_eq!(enriched.content.as_deref(), Some("Full body"));
        assert_eq!(enriched.title, article.title);
        assert_eq!(enriched.url, article.url);
    }

    #[test]
    fn test_tool_reply_joined_skips_blank_items() {
        let reply = ToolReply::text(vec![" first ".into(), "   ".into(), "second".into()]);
        assert_eq!(reply.joined(), "first\nsecond");
    }
}
