use thiserror::Error;

use crate::{
    db_types::{ExchangeOrder, NewExchangeOrder, OrderStatusType},
    traits::data_objects::{NewOrderRecord, OrderStatusUpdate},
};

#[derive(Debug, Clone, Error)]
pub enum OrderManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Order #{id} cannot change from {from} to {to}")]
    StatusTransitionForbidden { id: i64, from: OrderStatusType, to: OrderStatusType },
}

impl From<sqlx::Error> for OrderManagementError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait ExchangeOrderManagement {
    /// Stores a priced order in the `pending` state along with its `order_created` notification, atomically.
    async fn insert_order(&self, order: NewExchangeOrder) -> Result<NewOrderRecord, OrderManagementError>;
    async fn fetch_order(&self, id: i64) -> Result<Option<ExchangeOrder>, OrderManagementError>;
    /// Up to `limit` orders of the user with the given telegram id, newest first.
    async fn fetch_orders_for_user(
        &self,
        telegram_id: i64,
        limit: i64,
    ) -> Result<Vec<ExchangeOrder>, OrderManagementError>;
    /// Moves the order to `status` and writes an `order_status` notification for the order owner, atomically.
    ///
    /// `completed_at` is stamped only when the new status is `completed`. Orders in a terminal state, and updates to
    /// the status the order already has, are refused with [`OrderManagementError::StatusTransitionForbidden`].
    async fn update_order_status(
        &self,
        id: i64,
        status: OrderStatusType,
    ) -> Result<OrderStatusUpdate, OrderManagementError>;
}
