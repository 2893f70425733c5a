//! Exchange Engine
//!
//! The exchange engine holds the core logic of the crypto exchange gateway: pricing and placing exchange orders,
//! driving the order status lifecycle, and crediting deposits confirmed by the payment provider. It is
//! provider-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Storage. [`traits`] defines the contracts a backend must honour, and [`SqliteDatabase`] is the SQLite backend.
//!    You should never need to access the database directly. The exception is the data types used in the database,
//!    which are defined in [`db_types`] and are public.
//! 2. The public API ([`xg_api`]). Every flow that touches money is one atomic unit in the backend, together with the
//!    notification it produces for the user.
//!
//! The engine also publishes [`events`] after each flow commits. Hooks can subscribe to these to perform side effects,
//! such as forwarding notifications to the messaging platform, without being able to affect the committed ledger.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;
pub mod xg_api;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{db, SqliteDatabase};
pub use xg_api::{
    deposit_api::DepositApi,
    errors::OrderFlowError,
    exchange_objects,
    exchange_rate_api::ExchangeRateApi,
    order_flow_api::{ExchangeOrderApi, ORDER_HISTORY_LIMIT},
    user_api::UserApi,
};
