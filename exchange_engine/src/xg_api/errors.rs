use thiserror::Error;

use crate::{
    db_types::{ConversionError, OrderStatusType},
    traits::{ExchangeRateError, OrderManagementError, UserManagementError},
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),
    #[error("No user with telegram id {0}")]
    UserNotFound(i64),
    #[error("No active exchange rate for {from} → {to}")]
    RateNotFound { from: String, to: String },
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Order #{id} cannot change from {from} to {to}")]
    StatusTransitionForbidden { id: i64, from: OrderStatusType, to: OrderStatusType },
}

impl From<ExchangeRateError> for OrderFlowError {
    fn from(e: ExchangeRateError) -> Self {
        match e {
            ExchangeRateError::DatabaseError(s) => Self::DatabaseError(s),
            ExchangeRateError::RateNotFound { from, to } => Self::RateNotFound { from, to },
            ExchangeRateError::InvalidRate(s) => Self::InvalidRate(s),
        }
    }
}

impl From<UserManagementError> for OrderFlowError {
    fn from(e: UserManagementError) -> Self {
        match e {
            UserManagementError::UserNotFound(id) => Self::UserNotFound(id),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

impl From<OrderManagementError> for OrderFlowError {
    fn from(e: OrderManagementError) -> Self {
        match e {
            OrderManagementError::DatabaseError(s) => Self::DatabaseError(s),
            OrderManagementError::OrderNotFound(id) => Self::OrderNotFound(id),
            OrderManagementError::StatusTransitionForbidden { id, from, to } => {
                Self::StatusTransitionForbidden { id, from, to }
            },
        }
    }
}

impl From<ConversionError> for OrderFlowError {
    fn from(e: ConversionError) -> Self {
        Self::InvalidStatus(e.to_string())
    }
}
