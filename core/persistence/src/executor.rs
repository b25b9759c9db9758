use std::env;
use std::path::Path;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::RunMigrationsError;
use dotenv::dotenv;
use tokio::task::JoinError;

pub type PoolType = Pool<ConnectionManager<SqliteConnection>>;
pub type ConnType = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const DEFAULT_DATABASE_URL: &str = "farmgate.db";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),
    #[error("Database query error: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("Runtime error: {0}")]
    Runtime(#[from] JoinError),
    #[error("Migration error: {0}")]
    Migration(#[from] RunMigrationsError),
}

pub trait AsDao<'a> {
    fn as_dao(pool: &'a PoolType) -> Self;
}

#[derive(Clone)]
pub struct DbExecutor {
    pub pool: PoolType,
}

impl DbExecutor {
    pub fn new<S: Into<String>>(database_url: S) -> Result<Self, Error> {
        let database_url = database_url.into();
        log::info!("using database at: {}", database_url);
        let manager = ConnectionManager::new(database_url);
        let pool = Pool::builder()
            .connection_customizer(Box::new(ConnectionInit))
            .build(manager)?;
        Ok(DbExecutor { pool })
    }

    pub fn from_env() -> Result<Self, Error> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        Self::new(database_url)
    }

    pub fn from_data_dir(data_dir: &Path, name: &str) -> Result<Self, Error> {
        let db = data_dir.join(name).with_extension("db");
        Self::new(db.to_string_lossy())
    }

    /// Private database for tests. The shared-cache URI keeps all pooled
    /// connections on one in-memory database instead of giving each its own.
    pub fn in_memory() -> Result<Self, Error> {
        Self::new(format!(
            "file:{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        ))
    }

    pub fn as_dao<'a, T: AsDao<'a>>(&'a self) -> T {
        AsDao::as_dao(&self.pool)
    }

    pub fn conn(&self) -> Result<ConnType, Error> {
        Ok(self.pool.get()?)
    }

    pub fn apply_migration<
        T: FnOnce(&ConnType, &mut dyn std::io::Write) -> Result<(), RunMigrationsError>,
    >(
        &self,
        migration: T,
    ) -> Result<(), Error> {
        let c = self.conn()?;
        // Disabling foreign keys from within a migration does not stick.
        c.batch_execute("PRAGMA foreign_keys = OFF;")?;
        migration(&c, &mut std::io::stderr())?;
        c.batch_execute("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    pub async fn execute<T: Into<String>>(&self, query: T) -> Result<usize, Error> {
        let query = query.into();
        self.with_connection(move |conn| Ok(diesel::sql_query(query).execute(conn)?))
            .await
    }

    pub async fn with_connection<R: Send + 'static, Error, F>(&self, f: F) -> Result<R, Error>
    where
        Error: Send + 'static + From<JoinError> + From<r2d2::Error>,
        F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
    {
        do_with_connection(&self.pool, f).await
    }

    pub async fn with_transaction<R: Send + 'static, Error, F>(&self, f: F) -> Result<R, Error>
    where
        Error: Send
            + 'static
            + From<JoinError>
            + From<r2d2::Error>
            + From<diesel::result::Error>,
        F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
    {
        do_with_transaction(&self.pool, f).await
    }
}

pub async fn do_with_connection<R: Send + 'static, Error, F>(
    pool: &PoolType,
    f: F,
) -> Result<R, Error>
where
    Error: Send + 'static + From<JoinError> + From<r2d2::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    let pool = pool.clone();
    match tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(Error::from)?;
        f(&conn)
    })
    .await
    {
        Ok(v) => v,
        Err(join_err) => Err(From::from(join_err)),
    }
}

/// Runs the closure on the blocking pool inside an immediate transaction,
/// taking the database write lock up front.
pub async fn do_with_transaction<R: Send + 'static, Error, F>(
    pool: &PoolType,
    f: F,
) -> Result<R, Error>
where
    Error: Send + 'static + From<JoinError> + From<r2d2::Error> + From<diesel::result::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    do_with_connection(pool, move |conn| conn.immediate_transaction(|| f(conn))).await
}

pub async fn readonly_transaction<R: Send + 'static, Error, F>(
    pool: &PoolType,
    f: F,
) -> Result<R, Error>
where
    Error: Send + 'static + From<JoinError> + From<r2d2::Error> + From<diesel::result::Error>,
    F: FnOnce(&ConnType) -> Result<R, Error> + Send + 'static,
{
    do_with_connection(pool, move |conn| conn.transaction(|| f(conn))).await
}

#[derive(Debug)]
struct ConnectionInit;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionInit {
    fn on_acquire(&self, c: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        c.batch_execute(
            "PRAGMA synchronous = NORMAL; \
             PRAGMA journal_mode = WAL; \
             PRAGMA foreign_keys = ON; \
             PRAGMA busy_timeout = 15000;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_shares_database() -> anyhow::Result<()> {
        let db = DbExecutor::in_memory()?;
        db.execute("CREATE TABLE t(x INTEGER);").await?;
        db.execute("INSERT INTO t(x) VALUES (1);").await?;
        let copied = db.execute("INSERT INTO t(x) SELECT x FROM t;").await?;
        assert_eq!(copied, 1);
        Ok(())
    }

    #[tokio::test]
    async fn two_in_memory_databases_are_isolated() -> anyhow::Result<()> {
        let first = DbExecutor::in_memory()?;
        let second = DbExecutor::in_memory()?;
        first.execute("CREATE TABLE t(x INTEGER);").await?;
        assert!(second.execute("INSERT INTO t(x) VALUES (1);").await.is_err());
        Ok(())
    }
}
