use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row, Type};
use thiserror::Error;
pub use xg_common::Amount;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------         User         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// The identity assigned to the user by the messaging platform
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub referral_code: String,
    pub referred_by_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    /// The referral code of an existing user who invited this one
    pub referral_code: Option<String>,
}

impl NewUser {
    pub fn new(telegram_id: i64) -> Self {
        Self { telegram_id, ..Default::default() }
    }

    pub fn with_username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_first_name<S: Into<String>>(mut self, first_name: S) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn referred_by<S: Into<String>>(mut self, referral_code: S) -> Self {
        self.referral_code = Some(referral_code.into());
        self
    }
}

//--------------------------------------        Wallet        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub user_id: i64,
    pub currency: String,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     ExchangeRate     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub id: i64,
    pub from_currency: String,
    pub to_currency: String,
    /// The base rate: how many units of `from_currency` buy one unit of `to_currency`
    pub rate: Decimal,
    pub markup_percent: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRate {
    /// The base rate adjusted by the markup. `None` if the result does not fit a `Decimal`.
    pub fn effective_rate(&self) -> Option<Decimal> {
        effective_rate(self.rate, self.markup_percent)
    }
}

/// `rate * (1 + markup_percent / 100)`, or `None` on overflow.
pub fn effective_rate(rate: Decimal, markup_percent: Decimal) -> Option<Decimal> {
    let factor = Decimal::ONE.checked_add(markup_percent.checked_div(Decimal::ONE_HUNDRED)?)?;
    rate.checked_mul(factor)
}

// Rates are stored as decimal strings, which sqlx cannot decode into `Decimal` on its own.
impl<'r> FromRow<'r, SqliteRow> for ExchangeRate {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            from_currency: row.try_get("from_currency")?,
            to_currency: row.try_get("to_currency")?,
            rate: decimal_column(row, "rate")?,
            markup_percent: decimal_column(row, "markup_percent")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    #[serde(default)]
    pub markup_percent: Decimal,
}

impl NewExchangeRate {
    pub fn new<S: Into<String>>(from_currency: S, to_currency: S, rate: Decimal, markup_percent: Decimal) -> Self {
        Self { from_currency: from_currency.into(), to_currency: to_currency.into(), rate, markup_percent }
    }
}

//--------------------------------------   OrderStatusType    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// Newly created and waiting for an operator.
    #[default]
    Pending,
    /// An operator has picked the order up.
    Processing,
    /// Settled. The order receives a completion timestamp.
    Completed,
    Cancelled,
    Failed,
}

impl OrderStatusType {
    /// Orders in a terminal state can no longer change status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Whether an order currently in this state may move to `next`.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        !self.is_terminal() && *self != next
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Processing => write!(f, "processing"),
            OrderStatusType::Completed => write!(f, "completed"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
            OrderStatusType::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("'{s}' is not a recognised order status"))),
        }
    }
}

//--------------------------------------    ExchangeOrder     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeOrder {
    pub id: i64,
    pub user_id: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub from_amount: Amount,
    pub to_amount: Amount,
    /// The effective rate applied when the order was created
    pub exchange_rate: Decimal,
    pub fee: Amount,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, SqliteRow> for ExchangeOrder {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            from_currency: row.try_get("from_currency")?,
            to_currency: row.try_get("to_currency")?,
            from_amount: row.try_get("from_amount")?,
            to_amount: row.try_get("to_amount")?,
            exchange_rate: decimal_column(row, "exchange_rate")?,
            fee: row.try_get("fee")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }
}

/// A fully priced order, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExchangeOrder {
    pub user_id: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub from_amount: Amount,
    pub to_amount: Amount,
    pub exchange_rate: Decimal,
    pub fee: Amount,
}

//--------------------------------------     Transaction      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Exchange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// An append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub currency: String,
    pub amount: Amount,
    pub status: TransactionStatus,
    pub crypto_bot_invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: i64,
    pub transaction_type: TransactionType,
    pub currency: String,
    pub amount: Amount,
    pub status: TransactionStatus,
    pub crypto_bot_invoice_id: Option<String>,
}

//--------------------------------------     Notification     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    OrderCreated,
    OrderStatus,
    Deposit,
    Referral,
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::OrderCreated => write!(f, "order_created"),
            NotificationType::OrderStatus => write!(f, "order_status"),
            NotificationType::Deposit => write!(f, "deposit"),
            NotificationType::Referral => write!(f, "referral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub related_order_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub related_order_id: Option<i64>,
}

impl NewNotification {
    pub fn order_created(order: &ExchangeOrder) -> Self {
        Self {
            user_id: order.user_id,
            notification_type: NotificationType::OrderCreated,
            title: "Exchange order created".to_string(),
            message: format!(
                "Order #{}: {} {} → {} {} is pending",
                order.id, order.from_amount, order.from_currency, order.to_amount, order.to_currency
            ),
            related_order_id: Some(order.id),
        }
    }

    pub fn order_status(order: &ExchangeOrder) -> Self {
        Self {
            user_id: order.user_id,
            notification_type: NotificationType::OrderStatus,
            title: "Order status updated".to_string(),
            message: format!("Order #{} is now {}", order.id, order.status),
            related_order_id: Some(order.id),
        }
    }

    pub fn deposit(user_id: i64, amount: Amount, currency: &str) -> Self {
        Self {
            user_id,
            notification_type: NotificationType::Deposit,
            title: "Deposit received".to_string(),
            message: format!("{amount} {currency} has been credited to your wallet"),
            related_order_id: None,
        }
    }

    pub fn referral(referrer_id: i64, new_user: &User) -> Self {
        let who = new_user
            .username
            .as_ref()
            .map(|u| format!("@{u}"))
            .or_else(|| new_user.first_name.clone())
            .unwrap_or_else(|| "A new user".to_string());
        Self {
            user_id: referrer_id,
            notification_type: NotificationType::Referral,
            title: "New referral".to_string(),
            message: format!("{who} joined using your referral code"),
            related_order_id: None,
        }
    }
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let value: String = row.try_get(column)?;
    Decimal::from_str(&value).map_err(|e| sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(e) })
}
