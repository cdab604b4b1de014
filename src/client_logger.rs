//! Logging trait for backend exchanges.
//!
//! This module provides the [`ClientLogger`] trait that allows callers to
//! capture every successful exchange passing through a [`RagClient`].
//!
//! [`RagClient`]: crate::RagClient

use crate::types::{ChatRequest, ChatResponse, HistoryRecord};

/// A trait for logging backend exchanges.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat::{ChatRequest, ChatResponse, ClientLogger, HistoryRecord};
///
/// struct StderrLogger;
///
/// impl ClientLogger for StderrLogger {
///     fn log_history(&self, records: &[HistoryRecord]) {
///         eprintln!("history: {} records", records.len());
///     }
///
///     fn log_chat(&self, request: &ChatRequest, response: &ChatResponse) {
///         eprintln!("{} -> {}", request.message, response.answer);
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log the records returned by a successful `GET /history`.
    fn log_history(&self, records: &[HistoryRecord]);

    /// Log a successful `POST /chat` exchange.
    fn log_chat(&self, request: &ChatRequest, response: &ChatResponse);
}
