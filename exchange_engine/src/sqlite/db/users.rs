use sqlx::SqliteConnection;

use crate::db_types::User;

pub async fn fetch_user_by_telegram_id(
    telegram_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, sqlx::Error> {
    let user =
        sqlx::query_as("SELECT * FROM users WHERE telegram_id = $1").bind(telegram_id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_referral_code(code: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user =
        sqlx::query_as("SELECT * FROM users WHERE referral_code = $1").bind(code).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn referral_code_exists(code: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE referral_code = $1").bind(code).fetch_one(conn).await?;
    Ok(count > 0)
}

/// Inserts a new user. This is not atomic with anything else; run it inside a transaction if other writes depend on
/// it.
pub async fn insert_user(
    telegram_id: i64,
    username: Option<&str>,
    first_name: Option<&str>,
    referral_code: &str,
    referred_by_id: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as(
        r#"
            INSERT INTO users (telegram_id, username, first_name, referral_code, referred_by_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(telegram_id)
    .bind(username)
    .bind(first_name)
    .bind(referral_code)
    .bind(referred_by_id)
    .fetch_one(conn)
    .await?;
    Ok(user)
}
