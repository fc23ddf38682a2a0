//! Report delivery adapters

pub mod telegram;

pub use telegram::TelegramSink;
