//! SQLite backend for the exchange engine.
//!
//! Schema migrations live in `migrations/` and are embedded into the binary.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
