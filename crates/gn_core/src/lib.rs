pub mod config;
pub mod enrich;
pub mod error;
pub mod models;
pub mod parser;
pub mod report;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::{ChatMessage, ChatModel, ChatRequest, NewsSummarizer, PageFetcher, Role, SearchTool, SpeechModel, SpeechRequest};
pub use storage::DailyStore;
pub use types::{Article, Digest, FetchResult, ToolReply};

pub mod prelude {
    pub use super::{Article, Digest, Error, FetchResult, Result};
}
