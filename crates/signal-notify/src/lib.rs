//! Alert delivery.
//!
//! Every destination is one [`Notifier`](signal_core::traits::Notifier);
//! a [`NotifierSet`] fans a message out to all of them.

mod log_notifier;
mod set;
mod telegram;

pub use log_notifier::LogNotifier;
pub use set::{DeliveryReport, NotifierSet};
pub use telegram::{
    destinations_from_env, parse_destinations, TelegramConfig, TelegramDestination,
    TelegramNotifier, TELEGRAM_API_URL,
};
