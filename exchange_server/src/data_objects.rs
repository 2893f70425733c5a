use std::fmt::Display;

use exchange_engine::{
    db_types::{ExchangeRate, User, Wallet},
    traits::RegisteredUser,
};
use provider_tools::CryptoPayApi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xg_common::Amount;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResult {
    pub user: User,
    pub wallets: Vec<Wallet>,
}

impl From<RegisteredUser> for UserResult {
    fn from(value: RegisteredUser) -> Self {
        Self { user: value.user, wallets: value.wallets }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateResult {
    #[serde(flatten)]
    pub rate: ExchangeRate,
    /// The base rate with the markup applied. Null for a stored rate too large to mark up.
    pub effective_rate: Option<Decimal>,
}

impl From<ExchangeRate> for RateResult {
    fn from(rate: ExchangeRate) -> Self {
        let effective_rate = rate.effective_rate();
        Self { rate, effective_rate }
    }
}

/// The status is kept as a string so that unknown values reach the order API and are rejected there, with a 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusParams {
    pub order_id: i64,
    pub status: String,
}

/// `GET /api/orders?telegram_id=123`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHistoryParams {
    pub telegram_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub telegram_id: i64,
    pub asset: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub invoice_id: String,
    pub pay_url: Option<String>,
    pub asset: String,
    pub amount: String,
}

/// The acknowledgement sent back for every webhook delivery that was handled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
    /// Set when the invoice had been credited by an earlier delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookAck {
    pub fn credited(transaction_id: i64, duplicate: bool) -> Self {
        Self { success: true, transaction_id: Some(transaction_id), duplicate: Some(duplicate), message: None }
    }

    pub fn ignored<S: Display>(message: S) -> Self {
        Self { success: true, message: Some(message.to_string()), ..Default::default() }
    }
}

/// The payment provider client, if one could be configured. Handlers that need it report an upstream error when it is
/// missing.
#[derive(Clone, Default)]
pub struct InvoiceClient(Option<CryptoPayApi>);

impl InvoiceClient {
    pub fn new(api: Option<CryptoPayApi>) -> Self {
        Self(api)
    }

    pub fn api(&self) -> Option<&CryptoPayApi> {
        self.0.as_ref()
    }
}
