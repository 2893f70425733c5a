use thiserror::Error;

use crate::db_types::{ExchangeRate, NewExchangeRate};

#[derive(Debug, Clone, Error)]
pub enum ExchangeRateError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No active exchange rate for {from} → {to}")]
    RateNotFound { from: String, to: String },
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),
}

impl From<sqlx::Error> for ExchangeRateError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait ExchangeRates {
    /// Fetch the active rate for the ordered pair `from` → `to`. There is no fallback to the inverse pair.
    ///
    /// If several rows are active for the pair, the most recently updated one wins, and the most recently inserted
    /// one breaks a tie on the update time. If no row is active, [`ExchangeRateError::RateNotFound`] is returned.
    async fn fetch_active_rate(&self, from: &str, to: &str) -> Result<ExchangeRate, ExchangeRateError>;
    /// All active rates, ordered by pair and then newest first.
    async fn fetch_active_rates(&self) -> Result<Vec<ExchangeRate>, ExchangeRateError>;
    /// Replace the active rate for the pair. Previously active rows for the pair are deactivated in the same
    /// transaction.
    async fn set_exchange_rate(&self, rate: NewExchangeRate) -> Result<ExchangeRate, ExchangeRateError>;
}
