use serde::{Deserialize, Serialize};

use crate::types::Locale;

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The question to answer.
    pub message: String,

    /// Language the answer should be given in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Locale>,
}

impl ChatRequest {
    /// Create a request that carries a language selection.
    pub fn new(message: impl Into<String>, language: Locale) -> Self {
        Self {
            message: message.into(),
            language: Some(language),
        }
    }
}
