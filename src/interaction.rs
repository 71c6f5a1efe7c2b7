//! Match-and-teach conversations.

mod commands;
mod discord;
mod driver;
mod flow;
mod handler;
mod sessions;

pub use commands::teach_commands;
pub use discord::DiscordConversation;
pub use driver::{Conversation, run};
pub use flow::{CANCEL_KEYWORD, CONFIRM_KEYWORD, Interaction, Outcome, Transition};
pub use handler::handle_wake_word;
pub use sessions::{SessionGuard, SessionKey, Sessions};
