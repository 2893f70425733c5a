use crate::db_types::{ExchangeOrder, Notification, OrderStatusType, Transaction, Wallet};

/// Published after a new order and its notification have been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreatedEvent {
    pub telegram_id: i64,
    pub order: ExchangeOrder,
    pub notification: Notification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusChangedEvent {
    pub telegram_id: i64,
    pub old_status: OrderStatusType,
    pub order: ExchangeOrder,
    pub notification: Notification,
}

/// Published once per invoice, when the credit has been committed. Redeliveries do not publish again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositCreditedEvent {
    pub telegram_id: i64,
    pub wallet: Wallet,
    pub transaction: Transaction,
    pub notification: Notification,
}

/// Anything that carries a user-facing notification for a messaging-platform user.
pub trait NotifiableEvent {
    fn telegram_id(&self) -> i64;
    fn notification(&self) -> &Notification;
}

macro_rules! notifiable {
    ($($event:ty),+) => {
        $(impl NotifiableEvent for $event {
            fn telegram_id(&self) -> i64 {
                self.telegram_id
            }

            fn notification(&self) -> &Notification {
                &self.notification
            }
        })+
    };
}

notifiable!(OrderCreatedEvent, OrderStatusChangedEvent, DepositCreditedEvent);
