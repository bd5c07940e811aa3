use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::types::{Article, ToolReply};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the provider to constrain the reply to a JSON object.
    pub json_response: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            json_response: false,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub model: String,
    pub voice: String,
    pub input: String,
    pub format: String,
}

/// A chat-completion capable language model.
#[async_trait]
pub trait ChatModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Returns the text of the first completion choice.
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}

/// A text-to-speech capable model.
#[async_trait]
pub trait SpeechModel: Send + Sync + fmt::Debug {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>>;
}

/// Turns enriched articles into the narrative section of a digest.
#[async_trait]
pub trait NewsSummarizer: Send + Sync {
    async fn summarize(
        &self,
        articles: &[Article],
        extra_notes: &[String],
        generated_at: &DateTime<Tz>,
    ) -> Result<String>;
}

/// The search collaborator.
#[async_trait]
pub trait SearchTool: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<ToolReply>;
}

/// The fetch collaborator. Fetches every URL in order within a single
/// session and returns the text of those that succeeded, keyed by URL.
/// An `Err` means the session itself could not be used.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_pages(&self, urls: &[String], max_length: usize)
        -> Result<HashMap<String, String>>;
}
