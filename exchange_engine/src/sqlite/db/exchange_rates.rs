use sqlx::SqliteConnection;

use crate::db_types::{ExchangeRate, NewExchangeRate};

/// The active rate for the ordered pair. Ties between several active rows go to the most recently updated row, then
/// to the most recently inserted one.
pub async fn fetch_active_rate(
    from: &str,
    to: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<ExchangeRate>, sqlx::Error> {
    let rate = sqlx::query_as(
        r#"
            SELECT * FROM exchange_rates
            WHERE from_currency = $1 AND to_currency = $2 AND is_active = TRUE
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_optional(conn)
    .await?;
    Ok(rate)
}

pub async fn fetch_active_rates(conn: &mut SqliteConnection) -> Result<Vec<ExchangeRate>, sqlx::Error> {
    let rates = sqlx::query_as(
        r#"
            SELECT * FROM exchange_rates
            WHERE is_active = TRUE
            ORDER BY from_currency, to_currency, updated_at DESC, id DESC
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(rates)
}

/// Deactivates every active row for the ordered pair, returning the number of rows affected.
pub async fn deactivate_rates_for_pair(from: &str, to: &str, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE exchange_rates SET is_active = FALSE, updated_at = CURRENT_TIMESTAMP
            WHERE from_currency = $1 AND to_currency = $2 AND is_active = TRUE
        "#,
    )
    .bind(from)
    .bind(to)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn insert_rate(rate: &NewExchangeRate, conn: &mut SqliteConnection) -> Result<ExchangeRate, sqlx::Error> {
    let rate = sqlx::query_as(
        r#"
            INSERT INTO exchange_rates (from_currency, to_currency, rate, markup_percent, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING *;
        "#,
    )
    .bind(&rate.from_currency)
    .bind(&rate.to_currency)
    .bind(rate.rate.to_string())
    .bind(rate.markup_percent.to_string())
    .fetch_one(conn)
    .await?;
    Ok(rate)
}
