pub mod guard;
pub mod ollama;

use thiserror::Error;

/// Failures of the chat transport and the availability guard. The display
/// strings double as the synthetic assistant messages shown to the user.
#[derive(Debug, Clone, Error)]
pub enum ServerError {
    #[error("Can't reach the model server at {0}. Make sure it's running: ollama serve")]
    ServerUnavailable(String),
    #[error("Model '{0}' isn't installed. Try: ollama pull {0}")]
    ModelNotFound(String),
    #[error("The model server returned HTTP {0}.")]
    Http(u16),
    #[error("Lost the connection to the model server: {0}")]
    StreamRead(String),
    #[error("The model server stopped responding mid-reply.")]
    StreamTimeout,
}
