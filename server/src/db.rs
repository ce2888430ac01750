use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::error::Error;

pub type ConnectionPool = Pool<ConnectionManager<SqliteConnection>>;
pub type Connection = PooledConnection<ConnectionManager<SqliteConnection>>;
pub type MigrationError = Box<dyn Error + Send + Sync>;

/// Builds a connection pool for the SQLite database at `database_url`.
pub fn create_connection_pool(database_url: &str, max_size: u32) -> Result<ConnectionPool, PoolError> {
    let manager = ConnectionManager::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .max_lifetime(None)
        .idle_timeout(None)
        .test_on_check_out(true)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
}

/// Runs embedded migrations on the database. Migrations are compiled into the binary
/// so end-users don't need the diesel CLI.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), MigrationError> {
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for version in applied {
        tracing::info!("Applied migration {version}");
    }
    Ok(())
}

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
const BUSY_TIMEOUT_MS: u32 = 5000;

/// SQLite settings are per-connection, so they are applied every time the pool opens one.
#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}
