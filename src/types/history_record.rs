use serde::{Deserialize, Serialize};

/// One persisted past exchange, as returned by `GET /history`.
///
/// The `id` and `timestamp` are assigned by the server and treated as opaque;
/// in particular the timestamp is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Server-assigned unique identifier.
    pub id: i64,

    /// The question that was asked.
    pub user_query: String,

    /// The answer the backend produced.
    pub bot_response: String,

    /// Server-assigned timestamp in whatever format the server chose.
    pub timestamp: String,
}

impl HistoryRecord {
    /// Create a new history record.
    pub fn new(
        id: i64,
        user_query: impl Into<String>,
        bot_response: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_query: user_query.into(),
            bot_response: bot_response.into(),
            timestamp: timestamp.into(),
        }
    }
}
