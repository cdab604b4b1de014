//! Conversation state: the transcript and the transient flags around it.

use crate::types::{Locale, Turn};

/// The assistant turn every session starts with.
pub const WELCOME_MESSAGE: &str = "Hello! I am ready to answer questions about the CV.";

/// The assistant turn appended when a chat request fails.
pub const FALLBACK_MESSAGE: &str = "Sorry, something went wrong.";

/// Why a submission was refused before any request was made.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The input was empty or whitespace-only.
    Empty,
    /// A submission is already in flight.
    Pending,
    /// The session has been torn down.
    Closed,
}

/// Transcript, input buffer, pending flag and locale for one session.
#[derive(Debug, Clone)]
pub struct ConversationState {
    transcript: Vec<Turn>,
    input: String,
    pending: bool,
    locale: Locale,
}

impl ConversationState {
    /// Creates a state seeded with the welcome turn.
    pub fn new(locale: Locale) -> Self {
        Self {
            transcript: vec![Turn::assistant(WELCOME_MESSAGE)],
            input: String::new(),
            pending: false,
            locale,
        }
    }

    /// The transcript in order.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// The current input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// True while a chat submission is in flight.
    pub fn pending(&self) -> bool {
        self.pending
    }

    /// The selected locale.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub(crate) fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub(crate) fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// Starts a submission.
    ///
    /// On success the user turn has been appended, the input buffer cleared
    /// and the pending flag raised; the trimmed message and the locale to send
    /// it with are returned.  Nothing changes on rejection.
    pub(crate) fn begin_submit(&mut self, raw: &str) -> Result<(String, Locale), Rejection> {
        if self.pending {
            return Err(Rejection::Pending);
        }
        let message = raw.trim();
        if message.is_empty() {
            return Err(Rejection::Empty);
        }
        let message = message.to_string();
        self.transcript.push(Turn::user(message.clone()));
        self.input.clear();
        self.pending = true;
        Ok((message, self.locale))
    }

    /// Completes a submission with its assistant turn and lowers the flag.
    pub(crate) fn finish_submit(&mut self, reply: Turn) {
        self.transcript.push(reply);
        self.pending = false;
    }

    pub(crate) fn replace_transcript(&mut self, turns: Vec<Turn>) {
        self.transcript = turns;
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
