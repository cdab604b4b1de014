//! Keeps the terminal in step with the session.
//!
//! The terminal is append-only, so "scroll to the latest content" means
//! printing whatever has not been printed yet.  When the transcript was
//! replaced rather than appended to, the whole transcript is drawn again
//! below a divider.

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;

use crate::chat::render::Renderer;
use crate::chat::session::{SessionContext, SessionEvent};
use crate::types::Turn;

/// The part of the transcript already on screen.
#[derive(Debug, Default)]
pub struct TranscriptView {
    shown: Vec<Turn>,
}

impl TranscriptView {
    /// Creates a view that has shown nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints whatever part of `transcript` is not yet on screen.
    ///
    /// Returns the number of turns printed.
    pub fn sync(&mut self, transcript: &[Turn], renderer: &mut dyn Renderer) -> usize {
        let appended = transcript.len() >= self.shown.len()
            && transcript[..self.shown.len()] == self.shown[..];
        let start = if appended {
            self.shown.len()
        } else {
            renderer.print_divider();
            0
        };
        for turn in &transcript[start..] {
            renderer.print_turn(turn);
        }
        self.shown = transcript.to_vec();
        transcript.len() - start
    }

    /// Draws the whole transcript again.
    pub fn redraw(&mut self, transcript: &[Turn], renderer: &mut dyn Renderer) {
        self.shown.clear();
        renderer.print_divider();
        self.sync(transcript, renderer);
    }

    /// Reacts to one session event.
    pub fn handle(
        &mut self,
        event: &SessionEvent,
        session: &SessionContext,
        renderer: &mut dyn Renderer,
    ) {
        match event {
            SessionEvent::TranscriptChanged => {
                self.sync(&session.transcript(), renderer);
            }
            SessionEvent::PendingChanged(true) => renderer.print_pending(),
            SessionEvent::PendingChanged(false) => {}
            SessionEvent::LocaleChanged(locale) => {
                renderer.print_info(&format!("Answer language set to {locale}."));
            }
            SessionEvent::HistoryReplaced | SessionEvent::Closed => {}
        }
    }

    /// Catches up after the event receiver missed `skipped` events.
    ///
    /// Missed events carry nothing the session does not still hold, so the
    /// transcript is synced from the session directly.
    pub fn lagged(
        &mut self,
        skipped: u64,
        session: &SessionContext,
        renderer: &mut dyn Renderer,
    ) {
        tracing::debug!(skipped, "view lagged behind session events");
        self.sync(&session.transcript(), renderer);
    }

    /// Handles every event already queued on `events`.
    ///
    /// If the receiver fell behind, the transcript is synced from the
    /// session directly.
    pub fn drain(
        &mut self,
        events: &mut Receiver<SessionEvent>,
        session: &SessionContext,
        renderer: &mut dyn Renderer,
    ) {
        loop {
            match events.try_recv() {
                Ok(event) => self.handle(&event, session, renderer),
                Err(TryRecvError::Lagged(skipped)) => self.lagged(skipped, session, renderer),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::session::EVENT_CAPACITY;
    use crate::types::{HistoryRecord, Locale};
    use tokio::sync::broadcast::error::RecvError;

    #[derive(Debug, Default)]
    struct Recording {
        lines: Vec<String>,
    }

    impl Renderer for Recording {
        fn print_turn(&mut self, turn: &Turn) {
            self.lines.push(format!("{}: {}", turn.speaker(), turn.text()));
        }

        fn print_pending(&mut self) {
            self.lines.push("pending".to_string());
        }

        fn print_divider(&mut self) {
            self.lines.push("---".to_string());
        }

        fn print_history(&mut self, records: &[HistoryRecord]) {
            self.lines.push(format!("history({})", records.len()));
        }

        fn print_error(&mut self, error: &str) {
            self.lines.push(format!("error: {error}"));
        }

        fn print_info(&mut self, info: &str) {
            self.lines.push(format!("info: {info}"));
        }
    }

    #[test]
    fn sync_prints_only_new_turns() {
        let mut view = TranscriptView::new();
        let mut out = Recording::default();
        let mut transcript = vec![Turn::assistant("hello")];

        assert_eq!(view.sync(&transcript, &mut out), 1);
        transcript.push(Turn::user("q"));
        transcript.push(Turn::assistant("a"));
        assert_eq!(view.sync(&transcript, &mut out), 2);
        assert_eq!(view.sync(&transcript, &mut out), 0);

        assert_eq!(
            out.lines,
            vec!["assistant: hello", "user: q", "assistant: a"]
        );
    }

    #[test]
    fn replaced_transcript_is_redrawn() {
        let mut view = TranscriptView::new();
        let mut out = Recording::default();
        view.sync(&[Turn::assistant("hello"), Turn::user("q")], &mut out);
        out.lines.clear();

        view.sync(&[Turn::user("Q"), Turn::assistant("A")], &mut out);
        assert_eq!(out.lines, vec!["---", "user: Q", "assistant: A"]);
    }

    #[test]
    fn drain_follows_session_events() {
        let session = SessionContext::new(Locale::En);
        let mut events = session.subscribe();
        let mut view = TranscriptView::new();
        let mut out = Recording::default();
        view.sync(&session.transcript(), &mut out);
        out.lines.clear();

        session.begin_submit("q").unwrap();
        view.drain(&mut events, &session, &mut out);
        assert_eq!(out.lines, vec!["user: q", "pending"]);

        session.finish_submit(Turn::assistant("a"));
        session.set_locale(Locale::Tr);
        view.drain(&mut events, &session, &mut out);
        assert_eq!(
            out.lines,
            vec![
                "user: q",
                "pending",
                "assistant: a",
                "info: Answer language set to tr."
            ]
        );
    }

    /// Runs `rounds` complete exchanges; each emits four events.
    fn exchanges(session: &SessionContext, rounds: usize) -> Vec<String> {
        let mut expected = Vec::new();
        for i in 0..rounds {
            session.begin_submit(&format!("q{i}")).unwrap();
            session.finish_submit(Turn::assistant(format!("a{i}")));
            expected.push(format!("user: q{i}"));
            expected.push(format!("assistant: a{i}"));
        }
        expected
    }

    #[test]
    fn drain_resyncs_after_lagging() {
        let session = SessionContext::new(Locale::En);
        let mut events = session.subscribe();
        let mut view = TranscriptView::new();
        let mut out = Recording::default();
        view.sync(&session.transcript(), &mut out);
        out.lines.clear();

        let rounds = EVENT_CAPACITY;
        let expected = exchanges(&session, rounds);
        view.drain(&mut events, &session, &mut out);

        let turns: Vec<String> = out
            .lines
            .iter()
            .filter(|line| line.as_str() != "pending")
            .cloned()
            .collect();
        assert_eq!(turns, expected);
        assert!(!out.lines.iter().any(|line| line == "---"));
        assert!(events.try_recv().is_err());

        session.begin_submit("after").unwrap();
        out.lines.clear();
        view.drain(&mut events, &session, &mut out);
        assert_eq!(out.lines, vec!["user: after", "pending"]);
    }

    #[tokio::test]
    async fn lagged_receiver_resyncs_view() {
        let session = SessionContext::new(Locale::En);
        let mut events = session.subscribe();
        let mut view = TranscriptView::new();
        let mut out = Recording::default();
        view.sync(&session.transcript(), &mut out);
        out.lines.clear();

        let expected = exchanges(&session, EVENT_CAPACITY);
        match events.recv().await {
            Err(RecvError::Lagged(skipped)) => view.lagged(skipped, &session, &mut out),
            other => panic!("expected the receiver to lag, got {other:?}"),
        }
        assert_eq!(out.lines, expected);
    }
}
