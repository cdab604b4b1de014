//! Chat session for conversing with the question-answering backend.
//!
//! # Architecture
//!
//! - [`state`]: the transcript, input buffer, pending flag and locale
//! - [`history`]: the list of past exchanges fetched from the server
//! - [`session`]: the per-session context owning both stores
//! - [`controller`]: turns user intents into state changes and requests
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: slash command parsing
//! - [`interrupt`]: Ctrl+C state for the terminal loop
//! - [`render`] and [`view`]: terminal presentation

mod commands;
mod config;
mod controller;
mod history;
mod interrupt;
mod render;
mod session;
mod state;
mod view;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatArgsError, ChatConfig};
pub use controller::{ConversationController, SubmitOutcome};
pub use history::HistoryStore;
pub use interrupt::Interrupt;
pub use render::{PlainTextRenderer, Renderer};
pub use session::{SessionContext, SessionEvent};
pub use state::{ConversationState, FALLBACK_MESSAGE, Rejection, WELCOME_MESSAGE};
pub use view::TranscriptView;
