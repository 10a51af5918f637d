//! Shared helpers for `PostgreSQL` integration tests.

use std::sync::OnceLock;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use eyre::Result;
use permit::app::Repositories;
use pg_embedded_setup_unpriv::{ClusterHandle, TestCluster};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// SQL creating every table.
pub const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2024-01-01-000000_create_tables/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "permit_test_template";

static CLUSTER: OnceLock<Option<ClusterHandle>> = OnceLock::new();

/// Returns the process-wide embedded cluster, or `None` when `PostgreSQL`
/// cannot be started on this host.
pub fn postgres_cluster() -> Option<&'static ClusterHandle> {
    CLUSTER
        .get_or_init(|| match TestCluster::new_split() {
            Ok((cluster, guard)) => {
                // The guard is `!Send`; forget it so the shared cluster lives
                // for the whole process, as a `TestCluster` static would.
                std::mem::forget(guard);
                Some(cluster)
            }
            Err(err) => {
                eprintln!("Skipping PostgreSQL tests: embedded cluster unavailable: {err}");
                None
            }
        })
        .as_ref()
}

/// Creates a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error when the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &ClusterHandle) -> Result<()> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            execute_sql_statements(&mut conn, CREATE_TABLES_SQL)?;
            Ok(())
        })
        .map_err(|e| eyre::eyre!("template setup failed: {e}"))?;
    Ok(())
}

/// Executes the statements of `sql` one at a time.
///
/// `diesel::sql_query` runs a single statement per call.
fn execute_sql_statements(conn: &mut PgConnection, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        let trimmed = statement.trim();
        if trimmed.is_empty() || trimmed.lines().all(|line| line.trim().starts_with("--")) {
            continue;
        }
        diesel::sql_query(trimmed)
            .execute(conn)
            .map_err(|e| eyre::eyre!("SQL error: {e}\nStatement: {trimmed}"))?;
    }
    Ok(())
}

/// Guard that drops the test database even if the test panics.
pub struct CleanupGuard {
    cluster: &'static ClusterHandle,
    db_name: String,
}

impl CleanupGuard {
    /// Returns the connection URL of the guarded database.
    #[must_use]
    pub fn url(&self) -> String {
        self.cluster.connection().database_url(&self.db_name)
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// Creates a database from the template and guards its removal.
///
/// # Errors
///
/// Returns an error if template creation or database cloning fails.
pub fn temporary_database(cluster: &'static ClusterHandle, prefix: &str) -> Result<CleanupGuard> {
    ensure_template(cluster)?;
    let db_name = format!("{prefix}_{}", Uuid::new_v4().simple());
    cluster
        .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
        .map_err(|e| eyre::eyre!("database {db_name} not created: {e}"))?;
    Ok(CleanupGuard { cluster, db_name })
}

/// Builds repositories over a single-connection pool to `guard`'s database.
///
/// Drop the repositories before the guard so the database has no open
/// connections when it is removed.
///
/// # Errors
///
/// Returns an error if the pool cannot connect.
pub fn repositories(guard: &CleanupGuard) -> Result<Repositories> {
    let manager = ConnectionManager::<PgConnection>::new(guard.url());
    let pool = Pool::builder().max_size(1).build(manager)?;
    Ok(Repositories::postgres_pool(pool))
}
