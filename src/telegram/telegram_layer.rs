// Telegram layer - transport adapter, message pipeline, admin commands.

pub mod commands;
pub mod message_handler;
pub mod transport;

// Re-export the shared handler state for convenience
pub use message_handler::AppState;
