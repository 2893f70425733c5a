#![allow(dead_code)]
use exchange_engine::{
    db_types::{NewExchangeRate, NewUser, User},
    traits::{ExchangeRates, UserManagement},
    SqliteDatabase,
};
use log::*;
use rust_decimal_macros::dec;
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// A fresh database file in the system temp directory.
pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/xg_engine_test_{}.db", dir.display(), rand::random::<u64>())
}

/// Creates and migrates a brand-new database.
pub async fn setup() -> SqliteDatabase {
    setup_with_connections(2).await
}

pub async fn setup_with_connections(max_connections: u32) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    Sqlite::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, max_connections).await.expect("Error connecting to database");
    db.migrate().await.expect("Error running migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

pub async fn tear_down(db: SqliteDatabase) {
    let url = db.url().to_string();
    db.close().await;
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Could not drop test database {url}: {e}");
    }
}

pub async fn register(db: &SqliteDatabase, telegram_id: i64) -> User {
    db.register_user(NewUser::new(telegram_id).with_username(format!("user{telegram_id}")))
        .await
        .expect("Error registering user")
        .user
}

/// USDT → BTC at 0.000016 with a 2% markup.
pub async fn seed_usdt_btc_rate(db: &SqliteDatabase) {
    db.set_exchange_rate(NewExchangeRate::new("USDT", "BTC", dec!(0.000016), dec!(2)))
        .await
        .expect("Error setting rate");
}

/// Makes every insert into `notifications` fail, to prove that the writes preceding it are rolled back.
pub async fn break_notifications(db: &SqliteDatabase) {
    sqlx::query(
        r#"
            CREATE TRIGGER notifications_offline BEFORE INSERT ON notifications
            BEGIN
                SELECT RAISE(ABORT, 'notifications are offline');
            END
        "#,
    )
    .execute(db.pool())
    .await
    .expect("Error creating trigger");
}

pub async fn count_rows(db: &SqliteDatabase, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}")).fetch_one(db.pool()).await.expect("Error counting")
}
