use thiserror::Error;

use crate::traits::data_objects::{DepositResult, NewDeposit};

#[derive(Debug, Clone, Error)]
pub enum DepositError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0}")]
    InvalidPayload(String),
    #[error("Invalid deposit amount: {0}")]
    InvalidAmount(String),
    #[error("Balance out of range: {0}")]
    BalanceOutOfRange(String),
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),
    #[error("No user with telegram id {0}")]
    UserNotFound(i64),
    #[error("User #{user_id} has no {currency} wallet")]
    WalletNotFound { user_id: i64, currency: String },
}

impl From<sqlx::Error> for DepositError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait DepositManagement {
    /// Credits a confirmed payment to the user's wallet for the deposit currency.
    ///
    /// In one transaction: if the invoice has been credited before, the original ledger entry is returned and nothing
    /// is written. Otherwise the wallet balance is incremented in place, a completed `deposit` transaction is recorded
    /// against the invoice id and the user is notified. Any failure leaves no trace.
    async fn credit_deposit(&self, deposit: NewDeposit) -> Result<DepositResult, DepositError>;
}
