pub mod digest;
pub mod logging;
pub mod mcp;
pub mod tools;

pub use digest::{compose_feed, DigestService};
pub use mcp::McpSession;
pub use tools::{McpPageFetcher, McpSearchTool};

pub mod prelude {
    pub use super::digest::DigestService;
    pub use super::tools::{McpPageFetcher, McpSearchTool};
    pub use gn_core::{Article, Digest, Error, Result};
}
