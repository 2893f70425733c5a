//! # Backend contracts
//!
//! This module defines the behaviour a storage backend must expose to drive the exchange engine. Every method that
//! writes is an all-or-nothing unit: a backend must either apply every write it describes, or none of them.
//!
//! * [`ExchangeRates`] resolves and maintains the conversion rates between ordered currency pairs.
//! * [`UserManagement`] registers users and looks them up by their messaging-platform identity.
//! * [`ExchangeOrderManagement`] stores exchange orders and drives their status changes, emitting a user
//!   notification alongside every write.
//! * [`DepositManagement`] credits confirmed payments to user wallets, exactly once per provider invoice.
mod data_objects;
mod deposit_management;
mod exchange_rates;
mod order_management;
mod user_management;

pub use data_objects::{CreditedDeposit, DepositResult, NewDeposit, NewOrderRecord, OrderStatusUpdate, RegisteredUser};
pub use deposit_management::{DepositError, DepositManagement};
pub use exchange_rates::{ExchangeRateError, ExchangeRates};
pub use order_management::{ExchangeOrderManagement, OrderManagementError};
pub use user_management::{UserManagement, UserManagementError};
