use std::fmt;

/// Who produced a turn in the transcript.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Speaker {
    /// The person typing.
    User,

    /// The question-answering backend.
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Assistant => write!(f, "assistant"),
        }
    }
}

/// One utterance in the transcript.
///
/// Turns are immutable once created; the fields are only reachable through
/// accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    speaker: Speaker,
    text: String,
}

impl Turn {
    /// Create a new turn.
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    /// Create a new user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    /// Create a new assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    /// The speaker of this turn.
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    /// The text of this turn.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True if the user produced this turn.
    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }

    /// True if the assistant produced this turn.
    pub fn is_assistant(&self) -> bool {
        self.speaker == Speaker::Assistant
    }
}
