//! Shared test harness: an in-memory SQLite database wired into the
//! process-wide connection slot.

use migration::{Migrator, MigratorTrait};
use registrar_service::static_service::DATABASE_CONNECTION;
use sea_orm::{ConnectOptions, Database};

/// Connects an in-memory SQLite database, runs every migration and
/// publishes the handle. Call once at the top of each test binary;
/// the connection slot can only be set once per process.
pub async fn setup_database() {
    publish_config_env();

    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    // A single connection: every pooled connection would otherwise get
    // its own empty in-memory database.
    options.max_connections(1);

    let connection = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory sqlite");

    Migrator::up(&connection, None)
        .await
        .expect("Failed to run migrations");

    DATABASE_CONNECTION
        .set(connection)
        .expect("DATABASE_CONNECTION already set");
}

/// Environment-backed configuration for anything that reaches
/// `APP_CONFIG`, published before the first read can latch it.
fn publish_config_env() {
    // SAFETY: each test binary runs one single-threaded test; nothing
    // else is reading the environment yet.
    unsafe {
        std::env::set_var("LOG_LEVEL", "info");
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
        std::env::set_var("JWT_SECRET", "registrar-test-secret");
        std::env::set_var("ADMIN_EMAIL", "registrar@university.edu");
    }
}
