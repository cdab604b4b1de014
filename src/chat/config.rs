//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling the session and its backend connection.

use std::fmt;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::RagClient;
use crate::error::Result;
use crate::types::Locale;

/// Default transport timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Command-line arguments for the ragchat-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the backend.
    #[arrrg(
        optional,
        "Backend base URL (default: $RAGCHAT_API_URL or http://localhost:8000/)",
        "URL"
    )]
    pub base_url: Option<String>,

    /// Answer language.
    #[arrrg(optional, "Answer language: tr or en (default: en)", "LOCALE")]
    pub locale: Option<String>,

    /// Transport timeout.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Cap on the number of history entries requested.
    #[arrrg(optional, "Maximum history entries to request", "N")]
    pub history_limit: Option<u32>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Verbose diagnostics on stderr.
    #[arrrg(flag, "Log debug diagnostics to stderr")]
    pub debug: bool,
}

/// Error produced when command-line arguments cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatArgsError {
    /// The locale was neither `tr` nor `en`.
    InvalidLocale(String),
    /// The timeout was zero.
    ZeroTimeout,
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatArgsError::InvalidLocale(value) => {
                write!(f, "invalid locale {value:?} (expected tr or en)")
            }
            ChatArgsError::ZeroTimeout => write!(f, "timeout must be at least one second"),
        }
    }
}

impl std::error::Error for ChatArgsError {}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Backend base URL; `None` defers to the environment and default.
    pub base_url: Option<String>,

    /// Locale the session starts in.
    pub locale: Locale,

    /// Transport timeout.
    pub timeout: Duration,

    /// Optional cap on history entries requested.
    pub history_limit: Option<u32>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to log debug diagnostics.
    pub debug: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: from the environment, else http://localhost:8000/
    /// - Locale: en
    /// - Timeout: 60 seconds
    /// - History limit: none
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            locale: Locale::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            history_limit: None,
            use_color: true,
            debug: false,
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the starting locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sets the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the history limit.
    pub fn with_history_limit(mut self, limit: Option<u32>) -> Self {
        self.history_limit = limit;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Builds the backend client this configuration describes.
    pub fn build_client(&self) -> Result<RagClient> {
        Ok(
            RagClient::with_options(self.base_url.clone(), Some(self.timeout))?
                .with_history_limit(self.history_limit),
        )
    }

    /// The default `tracing` filter directive for this configuration.
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "ragchat=debug" } else { "warn" }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = ChatArgsError;

    fn try_from(args: ChatArgs) -> std::result::Result<Self, Self::Error> {
        let locale = match args.locale {
            Some(value) => value
                .parse::<Locale>()
                .map_err(|_| ChatArgsError::InvalidLocale(value))?,
            None => Locale::default(),
        };
        let timeout = match args.timeout_secs {
            Some(0) => return Err(ChatArgsError::ZeroTimeout),
            Some(secs) => Duration::from_secs(secs),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(ChatConfig {
            base_url: args.base_url,
            locale,
            timeout,
            history_limit: args.history_limit,
            use_color: !args.no_color,
            debug: args.debug,
        })
    }
}
