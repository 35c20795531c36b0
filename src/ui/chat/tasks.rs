//! Background work spawned from the chat page: local actions and the
//! streaming chat request. Both run off the UI thread; results come back
//! as messages.

use std::time::Duration;

use iced::futures::{SinkExt, Stream};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::actions;
use crate::api::{guard, ollama, ollama::OllamaClient, ServerError};
use crate::chat::ChatEvent;
use crate::config::Config;
use crate::models::{Intent, WireMessage};

/// A stream that goes quiet for this long is treated as failed.
const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Execute one matched intent and reduce the outcome to a user-facing
/// string. Action errors are terminal for the action; they never touch
/// the chat session.
pub async fn run_action(intent: Intent) -> String {
    log::info!("executing action {} '{}'", intent.kind, intent.argument);
    let config = Config::default().actions;
    match tokio::task::spawn_blocking(move || actions::execute(&intent, &config)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            log::error!("action failed: {err}");
            err.to_string()
        }
        Err(err) => {
            log::error!("action task panicked: {err}");
            "The action failed unexpectedly.".to_string()
        }
    }
}

/// Run one full chat request against the configured server, emitting
/// chunk/done/failed events as the newline-delimited body arrives.
/// Cancelling the token closes the connection; no event follows, since
/// the caller has already settled the session.
pub fn chat_stream(
    history: Vec<WireMessage>,
    cancel: CancellationToken,
) -> impl Stream<Item = ChatEvent> {
    iced::stream::channel(64, move |mut output: iced::futures::channel::mpsc::Sender<ChatEvent>| async move {
        let server = Config::default().server;

        if let Err(err) = guard::ensure_available(&server).await {
            let _ = output.send(ChatEvent::Failed(err)).await;
            return;
        }

        let client = OllamaClient::new(&server.url);
        let response = match client.open_chat_stream(&server.model, history).await {
            Ok(response) => response,
            Err(err) => {
                let _ = output.send(ChatEvent::Failed(err)).await;
                return;
            }
        };

        let mut body = Box::pin(response.bytes_stream());
        let mut buffer = String::new();
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return,
                next = tokio::time::timeout(STREAM_IDLE_TIMEOUT, body.next()) => next,
            };
            let Ok(next) = next else {
                let _ = output.send(ChatEvent::Failed(ServerError::StreamTimeout)).await;
                return;
            };
            match next {
                // Connection closed without a done flag: treat what we
                // have as the complete reply.
                None => {
                    let _ = output.send(ChatEvent::Done).await;
                    return;
                }
                Some(Err(err)) => {
                    let _ = output
                        .send(ChatEvent::Failed(ServerError::StreamRead(err.to_string())))
                        .await;
                    return;
                }
                Some(Ok(bytes)) => {
                    buffer.push_str(&String::from_utf8_lossy(&bytes));
                    while let Some(pos) = buffer.find('\n') {
                        let line: String = buffer.drain(..=pos).collect();
                        match ollama::parse_chunk_line(&line) {
                            Some(ollama::ParsedLine::Error(message)) => {
                                let _ = output
                                    .send(ChatEvent::Failed(ServerError::StreamRead(message)))
                                    .await;
                                return;
                            }
                            Some(ollama::ParsedLine::Chunk(chunk)) => {
                                let is_final = chunk.is_final;
                                let _ = output.send(ChatEvent::Chunk(chunk)).await;
                                if is_final {
                                    let _ = output.send(ChatEvent::Done).await;
                                    return;
                                }
                            }
                            None => {}
                        }
                    }
                }
            }
        }
    })
}
