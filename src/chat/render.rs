//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the REPL can
//! draw to a terminal while tests record what would have been drawn.

use std::io::{self, Stdout, Write};

use crate::types::{HistoryRecord, Speaker, Turn};

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the loading indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for user turns).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for assistant turns).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for history numbers).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// History entries longer than this are cut with an ellipsis.
const HISTORY_PREVIEW_CHARS: usize = 60;

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print one turn as a labelled bubble.
    fn print_turn(&mut self, turn: &Turn);

    /// Print the loading indicator after the last turn.
    fn print_pending(&mut self);

    /// Print a separator before a replaced transcript is drawn.
    fn print_divider(&mut self);

    /// Print the history list, numbered from 1.
    fn print_history(&mut self, records: &[HistoryRecord]);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_turn(&mut self, turn: &Turn) {
        let label = speaker_label(turn.speaker());
        let body = indent_continuation(turn.text(), label.len() + 2);
        if self.use_color {
            let color = match turn.speaker() {
                Speaker::User => ANSI_CYAN,
                Speaker::Assistant => ANSI_GREEN,
            };
            println!("{ANSI_BOLD}{color}{label}:{ANSI_RESET} {body}");
        } else {
            println!("{label}: {body}");
        }
        self.flush();
    }

    fn print_pending(&mut self) {
        let label = speaker_label(Speaker::Assistant);
        if self.use_color {
            println!("{ANSI_DIM}{label}: ...{ANSI_RESET}");
        } else {
            println!("{label}: ...");
        }
        self.flush();
    }

    fn print_divider(&mut self) {
        if self.use_color {
            println!("{ANSI_DIM}----------------------------------------{ANSI_RESET}");
        } else {
            println!("----------------------------------------");
        }
        self.flush();
    }

    fn print_history(&mut self, records: &[HistoryRecord]) {
        if records.is_empty() {
            println!("    (no history)");
        }
        for (idx, record) in records.iter().enumerate() {
            let preview = truncate(&record.user_query, HISTORY_PREVIEW_CHARS);
            if self.use_color {
                println!(
                    "  {ANSI_YELLOW}{:>3}.{ANSI_RESET} {} {ANSI_DIM}{}{ANSI_RESET}",
                    idx + 1,
                    preview,
                    record.timestamp
                );
            } else {
                println!("  {:>3}. {} {}", idx + 1, preview, record.timestamp);
            }
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }
}

fn speaker_label(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "You",
        Speaker::Assistant => "Bot",
    }
}

/// Indents every line after the first so multi-line turns stay aligned.
pub(crate) fn indent_continuation(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines().collect::<Vec<_>>().join(&format!("\n{pad}"))
}

/// Cuts `text` to at most `max` characters, ending in an ellipsis if cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let mut out: String = single_line.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
