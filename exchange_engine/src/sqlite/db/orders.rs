use sqlx::SqliteConnection;

use crate::db_types::{ExchangeOrder, NewExchangeOrder, OrderStatusType};

/// Inserts a new order in the `pending` state. This is not atomic. Embed the call in a transaction when the order
/// must be written together with other rows.
pub async fn insert_order(order: NewExchangeOrder, conn: &mut SqliteConnection) -> Result<ExchangeOrder, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO exchange_orders (
                user_id,
                from_currency,
                to_currency,
                from_amount,
                to_amount,
                exchange_rate,
                fee,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(order.user_id)
    .bind(order.from_currency)
    .bind(order.to_currency)
    .bind(order.from_amount)
    .bind(order.to_amount)
    .bind(order.exchange_rate.to_string())
    .bind(order.fee)
    .bind(OrderStatusType::Pending)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<ExchangeOrder>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM exchange_orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// The orders placed by the user with the given telegram id, newest first. An unknown telegram id has no orders.
pub async fn fetch_orders_for_telegram_id(
    telegram_id: i64,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<ExchangeOrder>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
            SELECT exchange_orders.* FROM exchange_orders
            JOIN users ON exchange_orders.user_id = users.id
            WHERE users.telegram_id = $1
            ORDER BY exchange_orders.created_at DESC, exchange_orders.id DESC
            LIMIT $2;
        "#,
    )
    .bind(telegram_id)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Moves the order from `current` to `status`. `completed_at` is stamped when, and only when, the new status is
/// `completed`.
///
/// Returns `None` if the order does not exist or is no longer in the `current` state.
pub async fn update_order_status(
    id: i64,
    current: OrderStatusType,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<ExchangeOrder>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE exchange_orders SET
                status = $1,
                updated_at = CURRENT_TIMESTAMP,
                completed_at = CASE WHEN $1 = 'completed' THEN CURRENT_TIMESTAMP ELSE completed_at END
            WHERE id = $2 AND status = $3
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(id)
    .bind(current)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
