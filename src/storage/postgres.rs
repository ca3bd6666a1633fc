//! Shared `PostgreSQL` pool type and blocking-call bridge.

use super::PersistenceFailure;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool used by every diesel adapter.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a pool, connecting eagerly so misconfiguration fails at startup.
///
/// # Errors
///
/// Returns the r2d2 error when no connection can be established.
pub fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, diesel::r2d2::PoolError> {
    Pool::builder()
        .max_size(max_connections.max(1))
        .build(ConnectionManager::<PgConnection>::new(database_url))
}

/// Runs a diesel closure on the blocking thread pool with a pooled
/// connection.
pub(crate) async fn run_blocking<F, T, E>(pool: &PgPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: PersistenceFailure + Send + 'static,
{
    let shared_pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = shared_pool.get().map_err(E::persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(E::persistence)?
}
