// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod types;

// Re-exports
pub use client::RagClient;
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use gateway::Gateway;
pub use observability::register_biometrics;
pub use types::*;
