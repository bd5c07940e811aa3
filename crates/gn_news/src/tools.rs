use std::collections::HashMap;

use async_trait::async_trait;
use gn_core::config::ServerCommand;
use gn_core::{Error, PageFetcher, Result, SearchTool, ToolReply};
use serde_json::json;

use crate::logging::Logger;
use crate::mcp::McpSession;

/// Search collaborator backed by an MCP server exposing a `search` tool.
#[derive(Debug, Clone)]
pub struct McpSearchTool {
    server: ServerCommand,
}

impl McpSearchTool {
    pub fn new(server: ServerCommand) -> Self {
        Self { server }
    }
}

#[async_trait]
impl SearchTool for McpSearchTool {
    async fn search(&self, query: &str, max_results: usize) -> Result<ToolReply> {
        let mut session = McpSession::connect(&self.server).await?;
        let reply = session
            .call_tool("search", json!({ "query": query, "max_results": max_results }))
            .await;
        session.close().await;
        reply
    }
}

/// Fetch collaborator backed by an MCP server exposing a `fetch` tool.
#[derive(Debug, Clone)]
pub struct McpPageFetcher {
    server: ServerCommand,
    log: Logger,
}

impl McpPageFetcher {
    pub fn new(server: ServerCommand) -> Self {
        let log = Logger::new().with_prefix(format!("[{}]", server.name));
        Self { server, log }
    }
}

#[async_trait]
impl PageFetcher for McpPageFetcher {
    async fn fetch_pages(
        &self,
        urls: &[String],
        max_length: usize,
    ) -> Result<HashMap<String, String>> {
        if !self.server.is_runnable() {
            return Err(Error::Enrichment(format!(
                "{} server is not configured",
                self.server.name
            )));
        }

        let mut session = McpSession::connect(&self.server).await?;
        let mut contents = HashMap::new();

        for url in urls {
            match session
                .call_tool("fetch", json!({ "url": url, "max_length": max_length }))
                .await
            {
                Ok(reply) if reply.is_error => {
                    self.log.debug(&format!("fetch of {} refused: {}", url, reply.joined()));
                }
                Ok(reply) => {
                    let text = reply.joined();
                    if !text.is_empty() {
                        contents.insert(url.clone(), text);
                    }
                }
                Err(e) => self.log.debug(&format!("fetch of {} failed: {}", url, e)),
            }
        }

        session.close().await;
        self.log.info(&format!("fetched {}/{} pages", contents.len(), urls.len()));
        Ok(contents)
    }
}
