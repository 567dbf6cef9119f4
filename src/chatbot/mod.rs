//! Chatbot module - keyword rules, quote catalog, daily schedule.

pub mod picker;
pub mod quotes;
pub mod responder;
pub mod scheduler;
pub mod telegram;

pub use picker::Picker;
pub use quotes::{default_quotes, QuoteCatalog};
pub use responder::{Persona, Responder};
pub use scheduler::{DailyScheduler, SendText, Subscription};
pub use telegram::{spawn_sender, TelegramClient};
