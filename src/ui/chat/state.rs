use iced::{
    widget::{button, column, container, markdown, row, scrollable, text, text_input},
    Alignment, Element, Length, Task, Theme,
};
use tokio_util::sync::CancellationToken;

use crate::{
    chat::{ChatEvent, ChatSession},
    intent,
    ui::chat::{chat_stream, run_action, BubbleKind, ChatAction, DisplayMessage},
};

const GREETING: &str = "Hi! I can chat and run quick actions for you.\n\n\
Try:\n\
- \"open youtube\"\n\
- \"take a screenshot\"\n\
- \"find pdf files\"\n\n\
Or just ask me anything.";

#[derive(Debug, Default)]
pub struct State {
    messages: Vec<DisplayMessage>,
    input_value: String,
    session: ChatSession,
    cancel: Option<CancellationToken>,
    request_seq: u64,
}

impl State {
    pub fn new() -> Self {
        Self {
            messages: vec![DisplayMessage::new(BubbleKind::Assistant, GREETING)],
            ..Default::default()
        }
    }

    pub fn update(&mut self, action: ChatAction) -> Task<ChatAction> {
        match action {
            ChatAction::InputChanged(value) => self.on_input_changed(value),
            ChatAction::SendMessage => self.on_send_message(),
            ChatAction::ActionFinished(outcome) => self.on_action_finished(outcome),
            ChatAction::StreamEvent(seq, event) => self.on_stream_event(seq, event),
            ChatAction::CancelRequested => self.on_cancel_requested(),
            ChatAction::ClearRequested => self.on_clear_requested(),
            ChatAction::UrlClicked(url) => self.on_url_clicked(url),
        }
    }

    fn on_input_changed(&mut self, value: String) -> Task<ChatAction> {
        self.input_value = value;
        Task::none()
    }

    /// One submit produces exactly one intent: either a local action runs,
    /// or the text goes to the model, never both.
    fn on_send_message(&mut self) -> Task<ChatAction> {
        let text = self.input_value.trim().to_string();
        if text.is_empty() || !self.session.is_idle() {
            return Task::none();
        }
        self.input_value.clear();
        self.messages.push(DisplayMessage::new(BubbleKind::User, &text));

        let intent = intent::detect(&text);
        if !intent.is_none() {
            return Task::perform(run_action(intent), ChatAction::ActionFinished);
        }

        let Some(history) = self.session.begin_send(&text) else {
            return Task::none();
        };
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        self.request_seq += 1;
        let seq = self.request_seq;
        self.messages
            .push(DisplayMessage::new(BubbleKind::Assistant, ""));
        Task::run(chat_stream(history, token), move |event| {
            ChatAction::StreamEvent(seq, event)
        })
    }

    fn on_action_finished(&mut self, outcome: String) -> Task<ChatAction> {
        self.messages
            .push(DisplayMessage::new(BubbleKind::Action, outcome));
        Task::none()
    }

    fn on_stream_event(&mut self, seq: u64, event: ChatEvent) -> Task<ChatAction> {
        if seq != self.request_seq {
            return Task::none();
        }
        match event {
            ChatEvent::Chunk(chunk) => {
                self.session.append_delta(&chunk);
                let pending = self.session.pending_text().to_string();
                if let Some(bubble) = self.messages.last_mut() {
                    if bubble.kind == BubbleKind::Assistant {
                        bubble.set_content(&pending);
                    }
                }
            }
            ChatEvent::Done => {
                if self.session.finish().is_some() {
                    self.cancel = None;
                }
            }
            ChatEvent::Failed(err) => {
                if let Some(message) = self.session.fail(&err) {
                    self.drop_empty_assistant_bubble();
                    self.messages
                        .push(DisplayMessage::new(BubbleKind::Error, message));
                    self.cancel = None;
                }
            }
        }
        Task::none()
    }

    fn on_cancel_requested(&mut self) -> Task<ChatAction> {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        if self.session.cancel() {
            self.drop_empty_assistant_bubble();
        }
        Task::none()
    }

    fn on_clear_requested(&mut self) -> Task<ChatAction> {
        if self.session.clear() {
            self.messages.clear();
            self.messages
                .push(DisplayMessage::new(BubbleKind::Assistant, GREETING));
        }
        Task::none()
    }

    fn on_url_clicked(&mut self, url: String) -> Task<ChatAction> {
        log::info!("URL clicked: {}", url);
        if let Err(err) = open::that(&url) {
            log::error!("couldn't open {url}: {err}");
        }
        Task::none()
    }

    /// A reply bubble with no text yet is noise once the request ends.
    fn drop_empty_assistant_bubble(&mut self) {
        if matches!(
            self.messages.last(),
            Some(bubble) if bubble.kind == BubbleKind::Assistant && bubble.content.is_empty()
        ) {
            self.messages.pop();
        }
    }

    pub fn view(&self) -> Element<'_, ChatAction> {
        let chat_window = column![self.build_message_list(), self.build_input_area()]
            .spacing(10)
            .padding(10);

        container(chat_window)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn build_message_list(&self) -> Element<'_, ChatAction> {
        let rows: Vec<Element<ChatAction>> =
            self.messages.iter().map(Self::build_message_row).collect();

        scrollable(
            container(column(rows).spacing(10).padding(10))
                .width(Length::Fill)
                .padding(10),
        )
        .height(Length::Fill)
        .into()
    }

    fn build_message_row(msg: &DisplayMessage) -> Element<'_, ChatAction> {
        let prefix = match msg.kind {
            BubbleKind::User => "You: ",
            BubbleKind::Assistant => "Deskmate: ",
            BubbleKind::Action => "[done] ",
            BubbleKind::Error => "[error] ",
        };

        row![
            text(prefix),
            markdown(
                &msg.markdown_items,
                markdown::Settings::with_style(markdown::Style::from_palette(
                    Theme::Light.palette()
                ))
            )
            .map(|url| ChatAction::UrlClicked(url.to_string())),
        ]
        .into()
    }

    fn build_input_area(&self) -> Element<'_, ChatAction> {
        let busy = !self.session.is_idle();

        let send_or_stop = if busy {
            button("Stop").on_press(ChatAction::CancelRequested)
        } else {
            button("Send").on_press(ChatAction::SendMessage)
        };

        row![
            text_input("Ask me anything...", &self.input_value)
                .on_input_maybe(if busy {
                    None
                } else {
                    Some(ChatAction::InputChanged)
                })
                .on_submit(ChatAction::SendMessage)
                .width(Length::FillPortion(7)),
            send_or_stop.width(Length::FillPortion(1)),
            button("Clear")
                .on_press_maybe(if busy {
                    None
                } else {
                    Some(ChatAction::ClearRequested)
                })
                .width(Length::FillPortion(1)),
            text(if busy {
                self.session.state().to_string()
            } else {
                String::new()
            })
            .width(Length::FillPortion(1)),
        ]
        .spacing(10)
        .align_y(Alignment::Center)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServerError;
    use crate::chat::ChatState;
    use crate::models::{Role, StreamChunk};

    fn chunk_event(seq: u64, text: &str) -> ChatAction {
        ChatAction::StreamEvent(
            seq,
            ChatEvent::Chunk(StreamChunk {
                text_delta: text.to_string(),
                is_final: false,
            }),
        )
    }

    #[test]
    fn test_input_changed() {
        let mut state = State::new();

        let _ = state.update(ChatAction::InputChanged("Hello, world!".to_string()));

        assert_eq!(state.input_value, "Hello, world!");
    }

    #[test]
    fn test_send_plain_text_starts_chat_request() {
        let mut state = State::new();
        state.input_value = "what's the capital of France".to_string();

        let _ = state.update(ChatAction::SendMessage);

        assert_eq!(state.session.state(), ChatState::Sending);
        assert!(state.input_value.is_empty());
        // Greeting, user bubble, pending assistant bubble.
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[1].kind, BubbleKind::User);
        assert_eq!(state.messages[2].kind, BubbleKind::Assistant);
        assert!(state.cancel.is_some());
    }

    #[test]
    fn test_send_matched_intent_skips_the_model() {
        let mut state = State::new();
        state.input_value = "take a screenshot".to_string();

        let _ = state.update(ChatAction::SendMessage);

        // The action path never touches the chat session.
        assert_eq!(state.session.state(), ChatState::Idle);
        assert!(state.cancel.is_none());
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].kind, BubbleKind::User);
    }

    #[test]
    fn test_send_empty_message_is_noop() {
        let mut state = State::new();

        let _ = state.update(ChatAction::SendMessage);

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.session.state(), ChatState::Idle);
    }

    #[test]
    fn test_send_while_busy_is_rejected() {
        let mut state = State::new();
        state.input_value = "first question".to_string();
        let _ = state.update(ChatAction::SendMessage);
        let messages_before = state.messages.len();

        state.input_value = "second question".to_string();
        let _ = state.update(ChatAction::SendMessage);

        assert_eq!(state.messages.len(), messages_before);
        assert_eq!(state.input_value, "second question");
    }

    #[test]
    fn test_chunks_accumulate_into_reply_bubble() {
        let mut state = State::new();
        state.input_value = "question".to_string();
        let _ = state.update(ChatAction::SendMessage);

        let _ = state.update(chunk_event(state.request_seq, "Hel"));
        let _ = state.update(chunk_event(state.request_seq, "lo!"));

        assert_eq!(state.session.state(), ChatState::Streaming);
        assert_eq!(state.messages.last().unwrap().content, "Hello!");
    }

    #[test]
    fn test_done_commits_reply_and_returns_to_idle() {
        let mut state = State::new();
        state.input_value = "question".to_string();
        let _ = state.update(ChatAction::SendMessage);
        let _ = state.update(chunk_event(state.request_seq, "Hello!"));

        let _ = state.update(ChatAction::StreamEvent(state.request_seq, ChatEvent::Done));

        assert_eq!(state.session.state(), ChatState::Idle);
        assert!(state.cancel.is_none());
        let last = state.session.history().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.text, "Hello!");
    }

    #[test]
    fn test_failure_shows_error_bubble_and_recovers() {
        let mut state = State::new();
        state.input_value = "question".to_string();
        let _ = state.update(ChatAction::SendMessage);

        let _ = state.update(ChatAction::StreamEvent(
            state.request_seq,
            ChatEvent::Failed(ServerError::ServerUnavailable(
                "http://localhost:11434".to_string(),
            )),
        ));

        assert_eq!(state.session.state(), ChatState::Idle);
        assert_eq!(state.messages.last().unwrap().kind, BubbleKind::Error);

        // The next send succeeds.
        state.input_value = "retry".to_string();
        let _ = state.update(ChatAction::SendMessage);
        assert_eq!(state.session.state(), ChatState::Sending);
    }

    #[test]
    fn test_cancel_mid_stream_keeps_partial_reply() {
        let mut state = State::new();
        state.input_value = "question".to_string();
        let _ = state.update(ChatAction::SendMessage);
        let _ = state.update(chunk_event(state.request_seq, "partial ans"));

        let _ = state.update(ChatAction::CancelRequested);

        assert_eq!(state.session.state(), ChatState::Idle);
        assert!(state.cancel.is_none());
        let last = state.session.history().last().unwrap();
        assert_eq!(last.text, "partial ans");
        assert!(last.truncated);
        // The partial bubble stays visible.
        assert_eq!(state.messages.last().unwrap().content, "partial ans");
    }

    #[test]
    fn test_cancel_before_first_chunk_drops_empty_bubble() {
        let mut state = State::new();
        state.input_value = "question".to_string();
        let _ = state.update(ChatAction::SendMessage);

        let _ = state.update(ChatAction::CancelRequested);

        assert_eq!(state.session.state(), ChatState::Idle);
        assert_eq!(state.messages.last().unwrap().kind, BubbleKind::User);
    }

    #[test]
    fn test_stale_events_after_cancel_change_nothing() {
        let mut state = State::new();
        state.input_value = "question".to_string();
        let _ = state.update(ChatAction::SendMessage);
        let _ = state.update(ChatAction::CancelRequested);
        let messages_before = state.messages.len();

        let _ = state.update(chunk_event(state.request_seq, "late"));
        let _ = state.update(ChatAction::StreamEvent(state.request_seq, ChatEvent::Done));

        assert_eq!(state.messages.len(), messages_before);
        assert_eq!(state.session.state(), ChatState::Idle);
    }

    #[test]
    fn test_events_from_a_previous_request_are_ignored() {
        let mut state = State::new();
        state.input_value = "first".to_string();
        let _ = state.update(ChatAction::SendMessage);
        let old_seq = state.request_seq;
        let _ = state.update(ChatAction::CancelRequested);

        state.input_value = "second".to_string();
        let _ = state.update(ChatAction::SendMessage);

        // A chunk left over from the cancelled request must not bleed
        // into the new one.
        let _ = state.update(chunk_event(old_seq, "leftover"));
        assert_eq!(state.session.pending_text(), "");
        assert_eq!(state.messages.last().unwrap().content, "");
    }

    #[test]
    fn test_action_result_bubble() {
        let mut state = State::new();

        let _ = state.update(ChatAction::ActionFinished("Opened chrome".to_string()));

        let last = state.messages.last().unwrap();
        assert_eq!(last.kind, BubbleKind::Action);
        assert_eq!(last.content, "Opened chrome");
    }

    #[test]
    fn test_clear_resets_to_greeting() {
        let mut state = State::new();
        state.input_value = "question".to_string();
        let _ = state.update(ChatAction::SendMessage);
        let _ = state.update(chunk_event(state.request_seq, "answer"));
        let _ = state.update(ChatAction::StreamEvent(state.request_seq, ChatEvent::Done));

        let _ = state.update(ChatAction::ClearRequested);

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.session.history().len(), 1);
    }

    #[test]
    fn test_clear_while_streaming_is_rejected() {
        let mut state = State::new();
        state.input_value = "question".to_string();
        let _ = state.update(ChatAction::SendMessage);
        let messages_before = state.messages.len();

        let _ = state.update(ChatAction::ClearRequested);

        assert_eq!(state.messages.len(), messages_before);
        assert_eq!(state.session.state(), ChatState::Sending);
    }
}
