mod models;
mod state;
mod tasks;
pub use models::{BubbleKind, ChatAction, DisplayMessage};
pub use state::State;
pub use tasks::{chat_stream, run_action};
