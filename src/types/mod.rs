// Public modules
pub mod chat_request;
pub mod chat_response;
pub mod history_record;
pub mod locale;
pub mod turn;

// Re-exports
pub use chat_request::ChatRequest;
pub use chat_response::ChatResponse;
pub use history_record::HistoryRecord;
pub use locale::{Locale, LocaleParseError};
pub use turn::{Speaker, Turn};
