//! Thin HTTP clients for the upstream services of the exchange gateway.
//!
//! * [`CryptoPayApi`] talks to the Crypto Pay API, the payment provider that issues deposit invoices and reports
//!   payments through a webhook.
//! * [`TelegramApi`] sends messages to users through the Telegram Bot API.
mod config;
mod crypto_pay;
mod data_objects;
mod error;
mod telegram;

pub use config::{CryptoPayConfig, TelegramConfig};
pub use crypto_pay::CryptoPayApi;
pub use data_objects::{CryptoPayInvoice, NewInvoice, WebhookUpdate, INVOICE_PAID};
pub use error::ProviderApiError;
pub use telegram::{escape_html, TelegramApi};
