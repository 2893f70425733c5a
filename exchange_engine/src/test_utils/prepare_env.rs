use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

/// A fresh database file in the system temp directory.
pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/xg_test_store_{}.db", dir.display(), rand::random::<u64>())
}

/// Creates an empty, fully migrated database at `url`, replacing whatever was there, and connects to it.
pub async fn prepare_test_db(url: &str, max_connections: u32) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        Sqlite::drop_database(url).await.expect("Could not drop the old test database");
    }
    Sqlite::create_database(url).await.expect("Could not create the test database");
    let db = SqliteDatabase::new_with_url(url, max_connections).await.expect("Could not connect to the test database");
    db.migrate().await.expect("Could not migrate the test database");
    debug!("🗃️ Test database ready at {url}");
    db
}
