use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{NewNotification, Notification};

/// Queues a user-visible notification. Never commits on its own: every flow calls this inside the transaction that
/// carries the write being reported.
pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, sqlx::Error> {
    let notification: Notification = sqlx::query_as(
        r#"
            INSERT INTO notifications (user_id, type, title, message, related_order_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(notification.user_id)
    .bind(notification.notification_type)
    .bind(notification.title)
    .bind(notification.message)
    .bind(notification.related_order_id)
    .fetch_one(conn)
    .await?;
    trace!(
        "🗃️ Notification #{} ({}) queued for user #{}",
        notification.id,
        notification.notification_type,
        notification.user_id
    );
    Ok(notification)
}

pub async fn fetch_notifications_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    let notifications = sqlx::query_as("SELECT * FROM notifications WHERE user_id = $1 ORDER BY id")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(notifications)
}
