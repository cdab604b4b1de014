//! The per-session context object.
//!
//! A [`SessionContext`] is built once when a chat session starts and torn
//! down when it ends.  It owns the conversation state and the history store,
//! and publishes a [`SessionEvent`] after every change so the presentation
//! layer can re-render and keep the latest content in view.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::chat::history::HistoryStore;
use crate::chat::state::{ConversationState, Rejection};
use crate::types::{HistoryRecord, Locale, Turn};

pub(crate) const EVENT_CAPACITY: usize = 64;

/// A change notification for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Turns were appended or the transcript was replaced.
    TranscriptChanged,
    /// The pending flag changed to the carried value.
    PendingChanged(bool),
    /// The selected locale changed.
    LocaleChanged(Locale),
    /// The history list was replaced.
    HistoryReplaced,
    /// The session was torn down.
    Closed,
}

/// Owns everything that lives for exactly one chat session.
pub struct SessionContext {
    state: Mutex<ConversationState>,
    history: Mutex<HistoryStore>,
    closed: AtomicBool,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    /// Starts a session with the welcome turn and an empty history list.
    pub fn new(locale: Locale) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(ConversationState::new(locale)),
            history: Mutex::new(HistoryStore::new()),
            closed: AtomicBool::new(false),
            events,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// A copy of the transcript.
    pub fn transcript(&self) -> Vec<Turn> {
        self.state.lock().transcript().to_vec()
    }

    /// Number of turns in the transcript.
    pub fn transcript_len(&self) -> usize {
        self.state.lock().transcript().len()
    }

    /// True while a chat submission is in flight.
    pub fn pending(&self) -> bool {
        self.state.lock().pending()
    }

    /// The selected locale.
    pub fn locale(&self) -> Locale {
        self.state.lock().locale()
    }

    /// The current input buffer.
    pub fn input(&self) -> String {
        self.state.lock().input().to_string()
    }

    /// A copy of the history list.
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.history.lock().records().to_vec()
    }

    /// The history record at `index`, if any.
    pub fn history_record(&self, index: usize) -> Option<HistoryRecord> {
        self.history.lock().get(index).cloned()
    }

    /// True once the session has been torn down.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Tears the session down.  Results arriving afterwards are dropped.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.emit(SessionEvent::Closed);
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine; nobody is rendering.
        let _ = self.events.send(event);
    }

    pub(crate) fn set_input(&self, input: impl Into<String>) {
        self.state.lock().set_input(input);
    }

    pub(crate) fn set_locale(&self, locale: Locale) {
        let changed = {
            let mut state = self.state.lock();
            let changed = state.locale() != locale;
            state.set_locale(locale);
            changed
        };
        if changed {
            self.emit(SessionEvent::LocaleChanged(locale));
        }
    }

    pub(crate) fn begin_submit(&self, raw: &str) -> Result<(String, Locale), Rejection> {
        if self.is_closed() {
            return Err(Rejection::Closed);
        }
        let begun = self.state.lock().begin_submit(raw)?;
        self.emit(SessionEvent::TranscriptChanged);
        self.emit(SessionEvent::PendingChanged(true));
        Ok(begun)
    }

    /// Appends the reply and lowers the pending flag unless torn down.
    pub(crate) fn finish_submit(&self, reply: Turn) -> bool {
        {
            let mut state = self.state.lock();
            if self.is_closed() {
                return false;
            }
            state.finish_submit(reply);
        }
        self.emit(SessionEvent::TranscriptChanged);
        self.emit(SessionEvent::PendingChanged(false));
        true
    }

    pub(crate) fn replace_transcript(&self, turns: Vec<Turn>) {
        self.state.lock().replace_transcript(turns);
        self.emit(SessionEvent::TranscriptChanged);
    }

    pub(crate) fn issue_history_ticket(&self) -> u64 {
        self.history.lock().issue_ticket()
    }

    /// Applies a history response unless stale or torn down.
    pub(crate) fn apply_history(&self, ticket: u64, records: Vec<HistoryRecord>) -> bool {
        let applied = {
            let mut history = self.history.lock();
            !self.is_closed() && history.apply(ticket, records)
        };
        if applied {
            self.emit(SessionEvent::HistoryReplaced);
        }
        applied
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
