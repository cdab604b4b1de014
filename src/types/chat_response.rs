use serde::{Deserialize, Serialize};

/// Body returned by `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The backend's answer.
    pub answer: String,
}

impl ChatResponse {
    /// Create a new response.
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}
