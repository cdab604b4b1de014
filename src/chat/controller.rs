//! The conversation controller.
//!
//! The controller turns user intents into state changes and backend calls.
//! Chat submissions are single-flight: the pending check, the user turn, the
//! input clear and raising the pending flag happen under one lock, so a
//! second submission can never slip in between.  Backend failures never
//! reach the caller.  A failed chat becomes the fallback assistant turn; a
//! failed history refresh leaves the previous list in place.  Both are
//! reported only through `tracing`.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use crate::chat::session::SessionContext;
use crate::chat::state::{FALLBACK_MESSAGE, Rejection};
use crate::gateway::Gateway;
use crate::observability::{
    CHAT_ABANDONED, CHAT_FALLBACKS, CHAT_SUBMITS, CHAT_SUBMITS_REJECTED, HISTORY_REFRESH_ERRORS,
    HISTORY_REFRESH_STALE, HISTORY_REFRESHES,
};
use crate::types::{HistoryRecord, Locale, Turn};

/// What became of a call to [`ConversationController::submit`].
///
/// This is informational; none of these is an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend answered and its answer was appended.
    Answered,
    /// The request failed and the fallback turn was appended.
    Fallback,
    /// Nothing happened: the input was blank.
    RejectedEmpty,
    /// Nothing happened: another submission is in flight.
    RejectedPending,
    /// Nothing happened: the session is closed.
    RejectedClosed,
    /// The session was torn down while the request was in flight.
    Abandoned,
}

impl SubmitOutcome {
    /// True if a user turn and an assistant turn were appended.
    pub fn appended(&self) -> bool {
        matches!(self, SubmitOutcome::Answered | SubmitOutcome::Fallback)
    }
}

impl From<Rejection> for SubmitOutcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Empty => SubmitOutcome::RejectedEmpty,
            Rejection::Pending => SubmitOutcome::RejectedPending,
            Rejection::Closed => SubmitOutcome::RejectedClosed,
        }
    }
}

/// Orchestrates input, backend calls and state updates for one session.
pub struct ConversationController<G: Gateway> {
    gateway: Arc<G>,
    session: Arc<SessionContext>,
    refreshes: TaskTracker,
}

impl<G: Gateway> Clone for ConversationController<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            session: Arc::clone(&self.session),
            refreshes: self.refreshes.clone(),
        }
    }
}

impl<G: Gateway + 'static> ConversationController<G> {
    /// Creates a controller for a fresh session in `locale`.
    pub fn new(gateway: G, locale: Locale) -> Self {
        Self::with_session(Arc::new(gateway), Arc::new(SessionContext::new(locale)))
    }

    /// Creates a controller over an existing gateway and session.
    pub fn with_session(gateway: Arc<G>, session: Arc<SessionContext>) -> Self {
        Self {
            gateway,
            session,
            refreshes: TaskTracker::new(),
        }
    }

    /// The session this controller drives.
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Populates the history list at session start.
    pub async fn mount(&self) {
        self.refresh_history().await;
    }

    /// Submits `raw` as a question.
    ///
    /// The user turn is appended before the request goes out.  Exactly one
    /// assistant turn follows for every accepted submission, and the pending
    /// flag is lowered on every path, including when this future is dropped
    /// before the backend answers.
    pub async fn submit(&self, raw: &str) -> SubmitOutcome {
        let (message, locale) = match self.session.begin_submit(raw) {
            Ok(begun) => begun,
            Err(rejection) => {
                CHAT_SUBMITS_REJECTED.click();
                tracing::debug!(?rejection, "submission rejected");
                return rejection.into();
            }
        };
        CHAT_SUBMITS.click();

        let mut guard = PendingGuard::new(&self.session);
        let result = self.gateway.send_chat(&message, locale).await;
        guard.disarm();

        if self.session.is_closed() {
            CHAT_ABANDONED.click();
            tracing::debug!("session closed while chat was in flight; dropping result");
            return SubmitOutcome::Abandoned;
        }

        match result {
            Ok(response) => {
                if !self.session.finish_submit(Turn::assistant(response.answer)) {
                    CHAT_ABANDONED.click();
                    return SubmitOutcome::Abandoned;
                }
                self.spawn_history_refresh();
                SubmitOutcome::Answered
            }
            Err(err) => {
                CHAT_FALLBACKS.click();
                tracing::warn!(error = %err, status = ?err.status_code(), "chat request failed");
                if !self.session.finish_submit(Turn::assistant(FALLBACK_MESSAGE)) {
                    CHAT_ABANDONED.click();
                    return SubmitOutcome::Abandoned;
                }
                SubmitOutcome::Fallback
            }
        }
    }

    /// Stores `input` in the input buffer.
    pub fn set_input(&self, input: impl Into<String>) {
        self.session.set_input(input);
    }

    /// The current input buffer.
    pub fn input(&self) -> String {
        self.session.input()
    }

    /// Submits whatever is in the input buffer.
    pub async fn submit_input(&self) -> SubmitOutcome {
        let raw = self.session.input();
        self.submit(&raw).await
    }

    /// Replaces the transcript with the question and answer of `record`.
    ///
    /// Whatever was in the transcript is discarded.  No request is made.
    pub fn load_history_item(&self, record: &HistoryRecord) {
        self.session.replace_transcript(vec![
            Turn::user(record.user_query.clone()),
            Turn::assistant(record.bot_response.clone()),
        ]);
    }

    /// Loads the history record at `index` in display order.
    ///
    /// Returns the record that was loaded, or `None` (and changes nothing)
    /// if the index is out of range.
    pub fn load_history_item_at(&self, index: usize) -> Option<HistoryRecord> {
        let record = self.session.history_record(index)?;
        self.load_history_item(&record);
        Some(record)
    }

    /// Selects the locale for future submissions.
    pub fn set_locale(&self, locale: Locale) {
        self.session.set_locale(locale);
    }

    /// The selected locale.
    pub fn locale(&self) -> Locale {
        self.session.locale()
    }

    /// Placeholder text for the input prompt in the selected locale.
    pub fn placeholder(&self) -> &'static str {
        self.session.locale().placeholder()
    }

    /// Fetches the history list and replaces the store with it.
    ///
    /// Failures leave the previous list untouched and are only logged.
    pub async fn refresh_history(&self) {
        HISTORY_REFRESHES.click();
        let ticket = self.session.issue_history_ticket();
        match self.gateway.fetch_history().await {
            Ok(records) => {
                let count = records.len();
                if self.session.apply_history(ticket, records) {
                    tracing::debug!(count, "history replaced");
                } else {
                    HISTORY_REFRESH_STALE.click();
                    tracing::debug!(ticket, "discarding superseded history response");
                }
            }
            Err(err) => {
                HISTORY_REFRESH_ERRORS.click();
                tracing::warn!(
                    error = %err,
                    status = ?err.status_code(),
                    "history refresh failed; keeping previous list"
                );
            }
        }
    }

    /// Starts a best-effort history refresh in the background.
    ///
    /// Nothing awaits the returned handle in normal operation; the outcome is
    /// visible only in the history store and in the logs.
    pub fn spawn_history_refresh(&self) -> JoinHandle<()> {
        let this = self.clone();
        self.refreshes
            .spawn(async move { this.refresh_history().await })
    }

    /// Waits until every background refresh started so far has finished.
    pub async fn wait_for_refreshes(&self) {
        self.refreshes.close();
        self.refreshes.wait().await;
        if !self.session.is_closed() {
            self.refreshes.reopen();
        }
    }

    /// Tears the session down.
    ///
    /// In-flight requests are not cancelled; their results are dropped when
    /// they arrive.
    pub fn teardown(&self) {
        self.session.close();
        self.refreshes.close();
    }
}

/// Lowers the pending flag if a submission is dropped mid-flight.
///
/// The fallback turn is appended so the user turn still gets its reply.
struct PendingGuard<'a> {
    session: &'a SessionContext,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(session: &'a SessionContext) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.session.finish_submit(Turn::assistant(FALLBACK_MESSAGE)) {
            CHAT_ABANDONED.click();
            CHAT_FALLBACKS.click();
            tracing::warn!("submission dropped before the backend answered");
        }
    }
}
