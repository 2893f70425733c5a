//! # Exchange engine public API
//!
//! The `xg_api` module exposes the programmatic API for the exchange engine. The API is modular, so that clients can
//! pick the functionality they need.
//!
//! * [`order_flow_api`] prices and places exchange orders and drives their status lifecycle.
//! * [`deposit_api`] credits invoices paid through the payment provider to user wallets.
//! * [`exchange_rate_api`] resolves and maintains exchange rates.
//! * [`user_api`] registers users and their wallets.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits the API needs.
//!
//! ```rust,ignore
//! use exchange_engine::{events::EventProducers, ExchangeOrderApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/exchange.db", 5).await?;
//! let api = ExchangeOrderApi::new(db, EventProducers::default());
//! let order = api.update_order_status(42, "completed").await?;
//! ```
pub mod deposit_api;
pub mod errors;
pub mod exchange_objects;
pub mod exchange_rate_api;
pub mod order_flow_api;
pub mod user_api;
