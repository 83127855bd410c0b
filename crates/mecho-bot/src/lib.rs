//! # mecho-bot
//!
//! The chat-facing half of mecho. A host (chat adapter, the CLI's `chat` mode)
//! turns platform events into [`InboundMessage`]s and hands them to
//! [`MemeBot::handle`], which either answers a `/meme` command, captures an
//! image the user was asked for, replays a stored meme, or leaves the message
//! alone.

mod bot;
mod command;
mod message;
mod reply;

pub use bot::{BotSettings, MemeBot};
pub use command::Command;
pub use message::{HandleResult, InboundMessage, Reply};
