//! Minimal Model Context Protocol client over a child process's stdio.
//!
//! Messages are newline-delimited JSON-RPC 2.0. A session is opened with
//! [`McpSession::connect`], used for one or more [`McpSession::call_tool`]
//! calls and released with [`McpSession::close`]. The child is also killed
//! when the session is dropped, so an early return never leaks a server.

use std::process::Stdio;

use gn_core::config::ServerCommand;
use gn_core::{Error, Result, ToolReply};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::logging::Logger;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Deserialize)]
struct RpcMessage {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CallToolResult {
    #[serde(default)]
    content: Vec<ContentItem>,
    #[serde(default, rename = "isError")]
    is_error: bool,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct McpSession {
    name: String,
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    log: Logger,
}

impl McpSession {
    /// Spawns the server and completes the initialize handshake.
    pub async fn connect(server: &ServerCommand) -> Result<Self> {
        let log = Logger::new().with_prefix(format!("[{}]", server.name));
        log.debug(&format!("spawning {} {:?}", server.command, server.args));

        let mut command = Command::new(&server.command);
        command
            .args(&server.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &server.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            Error::Tool(format!(
                "failed to spawn {} server: {}. Is `{}` installed?",
                server.name, e, server.command
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Tool(format!("failed to capture {} server stdin", server.name)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Tool(format!("failed to capture {} server stdout", server.name)))?;

        let mut session = Self {
            name: server.name.clone(),
            child,
            stdin: Some(stdin),
            lines: BufReader::new(stdout).lines(),
            next_id: 0,
            log,
        };
        session.initialize().await?;
        Ok(session)
    }

    async fn initialize(&mut self) -> Result<()> {
        self.request(
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
        .await?;
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
        }))
        .await
    }

    /// Invokes a tool and collects the text items of its reply.
    pub async fn call_tool(&mut self, tool: &str, arguments: Value) -> Result<ToolReply> {
        let result = self
            .request("tools/call", json!({ "name": tool, "arguments": arguments }))
            .await?;
        let result: CallToolResult = serde_json::from_value(result)?;

        Ok(ToolReply {
            is_error: result.is_error,
            texts: result
                .content
                .into_iter()
                .filter(|item| item.kind == "text")
                .filter_map(|item| item.text)
                .collect(),
        })
    }

    async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        self.next_id += 1;
        let id = self.next_id;
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))
        .await?;

        loop {
            let line = self.lines.next_line().await?.ok_or_else(|| {
                Error::Tool(format!(
                    "{} server closed its output before answering {}",
                    self.name, method
                ))
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let message: RpcMessage = match serde_json::from_str(line) {
                Ok(message) => message,
                Err(_) => {
                    self.log.debug(&format!("ignoring non-protocol output: {}", line));
                    continue;
                }
            };
            // Notifications and server-initiated requests carry a method.
            if message.method.is_some() || message.id.as_ref().and_then(Value::as_u64) != Some(id) {
                continue;
            }
            if let Some(error) = message.error {
                return Err(Error::Tool(format!(
                    "{} failed on {} server ({}): {}",
                    method, self.name, error.code, error.message
                )));
            }
            return Ok(message.result.unwrap_or(Value::Null));
        }
    }

    async fn send(&mut self, message: &Value) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::Tool(format!("{} session is closed", self.name)))?;
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Closes stdin and stops the server.
    pub async fn close(mut self) {
        drop(self.stdin.take());
        if let Err(e) = self.child.kill().await {
            self.log.debug(&format!("server already exited: {}", e));
        }
    }
}
