use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two languages the backend can be asked to answer in.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Turkish.
    Tr,

    /// English.
    #[default]
    En,
}

impl Locale {
    /// The wire code for this locale.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Tr => "tr",
            Locale::En => "en",
        }
    }

    /// Placeholder text shown in the input prompt.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Locale::Tr => "CV hakkında bir soru sorun...",
            Locale::En => "Ask a question about the CV...",
        }
    }

    /// The other locale.
    pub fn toggled(&self) -> Self {
        match self {
            Locale::Tr => Locale::En,
            Locale::En => Locale::Tr,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing a locale other than `tr` or `en`.
#[derive(Debug)]
pub struct LocaleParseError {
    /// The invalid string value that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for LocaleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown locale: {} (expected tr or en)", self.invalid_value)
    }
}

impl std::error::Error for LocaleParseError {}

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tr" => Ok(Locale::Tr),
            "en" => Ok(Locale::En),
            _ => Err(LocaleParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}
