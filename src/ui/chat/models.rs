use iced::widget::markdown;

use crate::chat::ChatEvent;

/// Display log entry for the chat page. Action results and errors are
/// display-only; the LLM history lives in the session, not here.
#[derive(Debug, Clone)]
pub struct DisplayMessage {
    pub kind: BubbleKind,
    pub content: String,
    pub markdown_items: Vec<markdown::Item>,
}

impl DisplayMessage {
    pub fn new(kind: BubbleKind, content: impl ToString) -> Self {
        let content = content.to_string();
        Self {
            kind,
            markdown_items: markdown::parse(&content).collect(),
            content,
        }
    }

    /// Replace the text and re-parse; used while a reply streams in.
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.markdown_items = markdown::parse(content).collect();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleKind {
    User,
    Assistant,
    Action,
    Error,
}

#[derive(Debug, Clone)]
pub enum ChatAction {
    InputChanged(String),
    SendMessage,
    ActionFinished(String),
    /// Stream events carry the sequence number of the request that
    /// produced them, so leftovers from a cancelled request can't bleed
    /// into the next one.
    StreamEvent(u64, ChatEvent),
    CancelRequested,
    ClearRequested,
    UrlClicked(String),
}
