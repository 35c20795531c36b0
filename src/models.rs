use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// What a single user utterance maps to: one local action, or nothing
/// (in which case the text goes to the model instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum IntentKind {
    OpenApp,
    CloseApp,
    OpenUrl,
    SearchWeb,
    Screenshot,
    FileSearch,
    OpenFolder,
    None,
}

/// Classified meaning of a user utterance. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub kind: IntentKind,
    pub argument: String,
}

impl Intent {
    pub fn new(kind: IntentKind, argument: impl ToString) -> Self {
        Self {
            kind,
            argument: argument.to_string(),
        }
    }

    pub fn none() -> Self {
        Self {
            kind: IntentKind::None,
            argument: String::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == IntentKind::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the conversation history owned by the chat session.
#[derive(Debug, Clone)]
pub struct ConversationMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Committed before the stream completed (cancellation or error).
    pub truncated: bool,
}

impl ConversationMessage {
    pub fn system(text: impl ToString) -> Self {
        Self::new(Role::System, text)
    }

    pub fn user(text: impl ToString) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl ToString) -> Self {
        Self::new(Role::Assistant, text)
    }

    fn new(role: Role, text: impl ToString) -> Self {
        Self {
            role,
            text: text.to_string(),
            timestamp: Utc::now(),
            truncated: false,
        }
    }

    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }
}

/// Message shape the chat endpoint understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&ConversationMessage> for WireMessage {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            role: message.role,
            content: message.text.clone(),
        }
    }
}

/// Request body for the streaming chat endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
}

/// One newline-delimited JSON object of the streaming response. The server
/// interleaves delta lines, a final `done` line, and standalone error
/// objects.
#[derive(Debug, Deserialize)]
pub struct ChatResponseLine {
    #[serde(default)]
    pub message: Option<WireMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Incremental piece of an assistant reply, one per network read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    pub text_delta: String,
    pub is_final: bool,
}

/// Entry of the `/api/tags` model listing.
#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}
