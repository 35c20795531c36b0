//! HTTP client for the local model server.

use std::time::Duration;

use crate::api::ServerError;
use crate::models::{ChatRequest, ChatResponseLine, ModelList, StreamChunk, WireMessage};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const TAGS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Lightweight reachability probe against the server root.
    pub async fn is_running(&self) -> bool {
        self.http
            .get(&self.base_url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    /// Names of the models installed on the server.
    pub async fn list_models(&self) -> anyhow::Result<Vec<String>> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(TAGS_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Error: {}", response.status()));
        }
        let list: ModelList = response.json().await?;
        Ok(list.models.into_iter().map(|model| model.name).collect())
    }

    /// Open the streaming chat request. Status problems are mapped to
    /// errors before any body bytes are read; a 404 means the configured
    /// model is not installed.
    pub async fn open_chat_stream(
        &self,
        model: &str,
        messages: Vec<WireMessage>,
    ) -> Result<reqwest::Response, ServerError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            stream: true,
        };
        log::info!(
            "OllamaClient: streaming chat with {} messages using model {}",
            request.messages.len(),
            request.model
        );
        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|err| ServerError::StreamRead(err.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ServerError::ModelNotFound(model.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("OllamaClient: chat request failed ({status}): {body}");
            return Err(ServerError::Http(status.as_u16()));
        }
        Ok(response)
    }
}

/// Outcome of parsing one line of the newline-delimited response body.
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedLine {
    Chunk(StreamChunk),
    Error(String),
}

/// Parse one response line. Blank and malformed lines are skipped, as the
/// server occasionally pads the stream with keep-alive noise.
pub fn parse_chunk_line(line: &str) -> Option<ParsedLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let parsed: ChatResponseLine = serde_json::from_str(line).ok()?;
    if let Some(error) = parsed.error {
        return Some(ParsedLine::Error(error));
    }
    let text_delta = parsed
        .message
        .map(|message| message.content)
        .unwrap_or_default();
    Some(ParsedLine::Chunk(StreamChunk {
        text_delta,
        is_final: parsed.done,
    }))
}
