use once_cell::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection};

use crate::config::APP_CONFIG;

/// Process-wide database handle, set once at startup (or by the test
/// harness before any repository call).
pub static DATABASE_CONNECTION: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn get_database_connection() -> &'static DatabaseConnection {
    if DATABASE_CONNECTION.get().is_none() {
        let connection = Database::connect(&APP_CONFIG.database_url)
            .await
            .expect("Failed to connect to database");
        DATABASE_CONNECTION.set(connection).ok();
    }

    DATABASE_CONNECTION
        .get()
        .expect("DATABASE_CONNECTION not set")
}
