use sqlx::SqliteConnection;

use crate::db_types::{NewTransaction, Transaction};

pub async fn fetch_transaction_by_invoice_id(
    invoice_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let tx = sqlx::query_as("SELECT * FROM transactions WHERE crypto_bot_invoice_id = $1")
        .bind(invoice_id)
        .fetch_optional(conn)
        .await?;
    Ok(tx)
}

/// Appends a ledger entry. A second entry for the same invoice id violates a unique index.
pub async fn insert_transaction(tx: NewTransaction, conn: &mut SqliteConnection) -> Result<Transaction, sqlx::Error> {
    let tx = sqlx::query_as(
        r#"
            INSERT INTO transactions (user_id, type, currency, amount, status, crypto_bot_invoice_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(tx.user_id)
    .bind(tx.transaction_type)
    .bind(tx.currency)
    .bind(tx.amount)
    .bind(tx.status)
    .bind(tx.crypto_bot_invoice_id)
    .fetch_one(conn)
    .await?;
    Ok(tx)
}
