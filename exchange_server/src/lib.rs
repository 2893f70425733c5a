//! # Exchange gateway server
//! This crate hosts the HTTP server for the crypto exchange gateway. It is responsible for:
//! * Registering users arriving from the Telegram mini-app, and placing and settling their exchange orders.
//! * Issuing deposit invoices through the Crypto Pay API, and crediting wallets when the payment webhook arrives.
//! * Forwarding user notifications to Telegram.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/users`, `/api/rates`, `/api/orders`, `/api/deposits/invoice`: the public API.
//! * `/api/admin/rates`: rate management. Requires the `X-Admin-Key` header.
//! * `/webhooks/crypto-pay`: the payment provider webhook. Requests must carry a valid `crypto-pay-api-signature`.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
