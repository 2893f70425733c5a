//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are simple functions that accept a `&mut SqliteConnection` argument. None of them opens or
//! commits a transaction. Callers either take a connection from the pool, or open a transaction and pass `&mut tx`
//! through, so that a group of calls succeeds or fails as one.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    Sqlite,
    SqlitePool,
    Transaction,
};

pub mod exchange_rates;
pub mod notifications;
pub mod orders;
pub mod transactions;
pub mod users;
pub mod wallets;

const SQLITE_DB_URL: &str = "sqlite://data/exchange.db";
/// How long a writer waits for the database write lock before giving up.
const WRITE_LOCK_TIMEOUT: Duration = Duration::from_secs(15);

pub fn db_url() -> String {
    let result = env::var("XG_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ XG_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(WRITE_LOCK_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// Opens a transaction that holds the database write lock from its first statement, like `BEGIN IMMEDIATE`.
///
/// A deferred transaction that reads before it writes gets `SQLITE_BUSY` straight away when another connection is
/// writing, instead of waiting. Every transaction that reads and then writes must be opened here.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, SqlxError> {
    let mut tx = pool.begin().await?;
    // Matches no rows, but still takes the write lock, waiting up to the busy timeout for it.
    sqlx::query("UPDATE users SET id = id WHERE 0").execute(&mut *tx).await?;
    Ok(tx)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./src/sqlite/migrations").run(pool).await?;
    info!("🗃️ Database migrations complete");
    Ok(())
}
