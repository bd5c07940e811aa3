use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use gn_core::{ChatModel, ChatRequest, Error, Result, Role, SpeechModel, SpeechRequest};

/// Offline model. Replies come from a script; once it runs out, the model
/// echoes the first 20 words of the last user message.
#[derive(Default)]
pub struct DummyModel {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
    speech_requests: Mutex<Vec<SpeechRequest>>,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    fn push(&self, entry: std::result::Result<String, String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
    }

    /// Chat requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn speech_requests(&self) -> Vec<SpeechRequest> {
        self.speech_requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let echo = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.split_whitespace().take(20).collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match scripted {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(Error::Inference(message)),
            None => Ok(echo),
        }
    }
}

#[async_trait]
impl SpeechModel for DummyModel {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>> {
        let audio = format!("{}:{}:{}", request.voice, request.format, request.input).into_bytes();
        if let Ok(mut requests) = self.speech_requests.lock() {
            requests.push(request);
        }
        Ok(audio)
    }
}
