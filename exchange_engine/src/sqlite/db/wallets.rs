use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{Amount, Wallet};

pub async fn create_wallet(user_id: i64, currency: &str, conn: &mut SqliteConnection) -> Result<Wallet, sqlx::Error> {
    let wallet = sqlx::query_as("INSERT INTO wallets (user_id, currency) VALUES ($1, $2) RETURNING *;")
        .bind(user_id)
        .bind(currency)
        .fetch_one(conn)
        .await?;
    trace!("🗃️ {currency} wallet created for user #{user_id}");
    Ok(wallet)
}

pub async fn fetch_wallets_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Wallet>, sqlx::Error> {
    let wallets =
        sqlx::query_as("SELECT * FROM wallets WHERE user_id = $1 ORDER BY id").bind(user_id).fetch_all(conn).await?;
    Ok(wallets)
}

pub async fn fetch_wallet(
    user_id: i64,
    currency: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Wallet>, sqlx::Error> {
    let wallet = sqlx::query_as("SELECT * FROM wallets WHERE user_id = $1 AND currency = $2")
        .bind(user_id)
        .bind(currency)
        .fetch_optional(conn)
        .await?;
    Ok(wallet)
}

/// Overwrites a wallet balance. Balances are decimal strings, so a new balance is always computed from one read in
/// the same write transaction (see [`begin_write`](super::begin_write)).
pub async fn update_balance(
    wallet_id: i64,
    balance: Amount,
    conn: &mut SqliteConnection,
) -> Result<Wallet, sqlx::Error> {
    let wallet = sqlx::query_as(
        r#"
            UPDATE wallets SET balance = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(balance)
    .bind(wallet_id)
    .fetch_one(conn)
    .await?;
    Ok(wallet)
}
