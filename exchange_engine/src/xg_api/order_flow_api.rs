use std::fmt::Debug;

use log::*;
use xg_common::helpers::normalize_currency_code;

use crate::{
    db_types::{Amount, ExchangeOrder, NewExchangeOrder, OrderStatusType},
    events::{EventProducers, OrderCreatedEvent, OrderStatusChangedEvent},
    traits::{ExchangeOrderManagement, ExchangeRates, UserManagement},
    xg_api::{
        errors::OrderFlowError,
        exchange_objects::{calculate_quote, NewOrderRequest, OrderQuote},
    },
};

/// The most orders returned by an order history request.
pub const ORDER_HISTORY_LIMIT: i64 = 100;

/// `ExchangeOrderApi` prices and places exchange orders, and drives their status changes.
///
/// Every write is one atomic unit in the backend, together with the user notification it produces. Once a write has
/// committed, the matching event is published to any registered hooks. Hook delivery is best-effort and cannot undo
/// the write.
pub struct ExchangeOrderApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ExchangeOrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExchangeOrderApi")
    }
}

impl<B> ExchangeOrderApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> ExchangeOrderApi<B>
where B: ExchangeRates + UserManagement + ExchangeOrderManagement
{
    /// Price `amount` of `from` in terms of `to` at the current active rate, without placing an order.
    pub async fn quote(&self, from: &str, to: &str, amount: Amount) -> Result<OrderQuote, OrderFlowError> {
        let (from, to) = validate_pair(from, to)?;
        let rate = self.db.fetch_active_rate(&from, &to).await?;
        calculate_quote(amount, &rate)
    }

    /// Places a new exchange order in the `pending` state.
    ///
    /// Checks are made in this order, before anything is written: the currency codes are well-formed and distinct,
    /// the amount is positive, the user exists and an active rate exists for the pair. The order is then priced and
    /// stored along with its `order_created` notification.
    ///
    /// No funds are debited or reserved from the user's wallet.
    pub async fn create_order(&self, request: NewOrderRequest) -> Result<ExchangeOrder, OrderFlowError> {
        let (from, to) = validate_pair(&request.from_currency, &request.to_currency)?;
        if !request.from_amount.is_positive() {
            return Err(OrderFlowError::InvalidAmount(format!("{} is not a positive amount", request.from_amount)));
        }
        let user = self
            .db
            .fetch_user_by_telegram_id(request.telegram_id)
            .await?
            .ok_or(OrderFlowError::UserNotFound(request.telegram_id))?;
        let rate = self.db.fetch_active_rate(&from, &to).await?;
        let quote = calculate_quote(request.from_amount, &rate)?;
        trace!("🔄️📦️ Order for user #{} priced at {} {to} (fee {})", user.id, quote.to_amount, quote.fee);
        let order = NewExchangeOrder {
            user_id: user.id,
            from_currency: from,
            to_currency: to,
            from_amount: quote.from_amount,
            to_amount: quote.to_amount,
            exchange_rate: quote.exchange_rate,
            fee: quote.fee,
        };
        let record = self.db.insert_order(order).await?;
        info!(
            "🔄️📦️ Order #{} created for user #{}: {} {} → {} {}",
            record.order.id,
            user.id,
            record.order.from_amount,
            record.order.from_currency,
            record.order.to_amount,
            record.order.to_currency
        );
        let event = OrderCreatedEvent {
            telegram_id: user.telegram_id,
            order: record.order.clone(),
            notification: record.notification,
        };
        self.producers.publish_order_created(event);
        Ok(record.order)
    }

    /// Moves an order to a new status. `status` must be one of the recognised order statuses.
    pub async fn update_order_status(&self, order_id: i64, status: &str) -> Result<ExchangeOrder, OrderFlowError> {
        let status = status.parse::<OrderStatusType>()?;
        let update = self.db.update_order_status(order_id, status).await?;
        info!("🔄️📦️ Order #{order_id} moved from {} to {}", update.old_status, update.order.status);
        let event = OrderStatusChangedEvent {
            telegram_id: update.telegram_id,
            old_status: update.old_status,
            order: update.order.clone(),
            notification: update.notification,
        };
        self.producers.publish_order_status_changed(event);
        Ok(update.order)
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<ExchangeOrder, OrderFlowError> {
        self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))
    }

    /// The user's most recent orders, newest first, capped at [`ORDER_HISTORY_LIMIT`]. A telegram id that is not
    /// registered simply has no orders.
    pub async fn order_history(&self, telegram_id: i64) -> Result<Vec<ExchangeOrder>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(telegram_id, ORDER_HISTORY_LIMIT).await?;
        trace!("🔄️📦️ {} orders found for telegram user {telegram_id}", orders.len());
        Ok(orders)
    }
}

fn validate_pair(from: &str, to: &str) -> Result<(String, String), OrderFlowError> {
    let from = normalize_currency_code(from)
        .ok_or_else(|| OrderFlowError::InvalidCurrency(format!("'{from}' is not a valid currency code")))?;
    let to = normalize_currency_code(to)
        .ok_or_else(|| OrderFlowError::InvalidCurrency(format!("'{to}' is not a valid currency code")))?;
    if from == to {
        return Err(OrderFlowError::InvalidCurrency(format!("{from} cannot be exchanged for itself")));
    }
    Ok((from, to))
}
