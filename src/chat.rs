//! Conversation history and the streaming-request state machine.
//!
//! One session owns the history and a state field that moves
//! Idle -> Sending -> Streaming -> Idle on the happy path. Failure and
//! cancellation both land back on Idle immediately; the error resting
//! state is transient and observable only through the synthetic message
//! it produces. All mutation funnels through the methods here; the
//! session has a single owner and is never shared across threads.

use strum_macros::Display;

use crate::api::ServerError;
use crate::models::{ConversationMessage, StreamChunk, WireMessage};

pub const SYSTEM_PROMPT: &str = "You are Deskmate, a friendly desktop companion powered by a \
    local model running on the user's own hardware, with no cloud involved. Keep your answers \
    short, warm, and helpful.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ChatState {
    #[default]
    Idle,
    Sending,
    Streaming,
}

/// Events produced by the streaming transport, delivered back to the
/// session's owner one at a time.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Chunk(StreamChunk),
    Done,
    Failed(ServerError),
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    state: ChatState,
    history: Vec<ConversationMessage>,
    pending: String,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            state: ChatState::Idle,
            history: vec![ConversationMessage::system(SYSTEM_PROMPT)],
            pending: String::new(),
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ChatState::Idle
    }

    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }

    /// Assistant text accumulated for the in-flight request.
    pub fn pending_text(&self) -> &str {
        &self.pending
    }

    /// Start a request. Only valid while idle: appends the user message,
    /// moves to Sending, and hands back the wire history for the request
    /// body. Any other state rejects the send with no state change and no
    /// network call; a second send is refused, not queued.
    pub fn begin_send(&mut self, text: &str) -> Option<Vec<WireMessage>> {
        if self.state != ChatState::Idle {
            log::warn!("send rejected: a request is already in flight");
            return None;
        }
        self.history.push(ConversationMessage::user(text));
        self.pending.clear();
        self.state = ChatState::Sending;
        Some(self.wire_history())
    }

    /// Accumulate one streamed delta. Stale chunks arriving after a
    /// cancellation find the session idle and are dropped.
    pub fn append_delta(&mut self, chunk: &StreamChunk) {
        match self.state {
            ChatState::Sending | ChatState::Streaming => {
                self.state = ChatState::Streaming;
                self.pending.push_str(&chunk.text_delta);
            }
            ChatState::Idle => {}
        }
    }

    /// Commit the completed assistant message and return to idle. Returns
    /// the committed message, or None for a stale completion.
    pub fn finish(&mut self) -> Option<&ConversationMessage> {
        if self.state == ChatState::Idle {
            return None;
        }
        self.history
            .push(ConversationMessage::assistant(std::mem::take(
                &mut self.pending,
            )));
        self.state = ChatState::Idle;
        self.history.last()
    }

    /// Record a failure: whatever partial text arrived is committed as
    /// truncated, and a synthetic assistant message describing the failure
    /// is returned for display. The session is idle again afterwards; the
    /// next send is the only recovery path.
    pub fn fail(&mut self, error: &ServerError) -> Option<String> {
        if self.state == ChatState::Idle {
            return None;
        }
        if !self.pending.is_empty() {
            self.history.push(
                ConversationMessage::assistant(std::mem::take(&mut self.pending)).truncated(),
            );
        }
        self.state = ChatState::Idle;
        log::error!("chat request failed: {error}");
        Some(error.to_string())
    }

    /// Cooperative cancellation: commit the partial reply as truncated and
    /// return to idle. Safe to call in any state at or after Sending; a
    /// no-op while idle. Returns true when a request was actually stopped.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            ChatState::Sending | ChatState::Streaming => {
                if !self.pending.is_empty() {
                    self.history.push(
                        ConversationMessage::assistant(std::mem::take(&mut self.pending))
                            .truncated(),
                    );
                }
                self.state = ChatState::Idle;
                true
            }
            ChatState::Idle => false,
        }
    }

    /// Discard the history. Only valid while idle.
    pub fn clear(&mut self) -> bool {
        if self.state != ChatState::Idle {
            return false;
        }
        self.history = vec![ConversationMessage::system(SYSTEM_PROMPT)];
        true
    }

    fn wire_history(&self) -> Vec<WireMessage> {
        self.history.iter().map(WireMessage::from).collect()
    }
}
