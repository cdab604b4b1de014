//! The seam between the conversation controller and the backend.
//!
//! [`RagClient`] is the production implementation; tests drive the
//! controller with in-memory gateways.

use std::sync::Arc;

use crate::client::RagClient;
use crate::error::Result;
use crate::types::{ChatResponse, HistoryRecord, Locale};

/// The two backend operations the conversation needs.
///
/// Implementations must not retry, cache, or deduplicate requests.  Every
/// failure surfaces as a transport [`Error`](crate::Error).
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Retrieve the full history list in server order.
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>>;

    /// Submit one question and wait for the complete answer.
    async fn send_chat(&self, message: &str, locale: Locale) -> Result<ChatResponse>;
}

#[async_trait::async_trait]
impl Gateway for RagClient {
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>> {
        RagClient::fetch_history(self).await
    }

    async fn send_chat(&self, message: &str, locale: Locale) -> Result<ChatResponse> {
        RagClient::send_chat(self, message, locale).await
    }
}

#[async_trait::async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>> {
        (**self).fetch_history().await
    }

    async fn send_chat(&self, message: &str, locale: Locale) -> Result<ChatResponse> {
        (**self).send_chat(message, locale).await
    }
}
