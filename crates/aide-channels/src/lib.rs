//! # aide-channels
//!
//! Outbound notification transports.

pub mod log;
pub mod telegram;

pub use log::LogNotifier;
pub use telegram::TelegramNotifier;
