use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::Statement;
use tokio::sync::Mutex;

use super::params::bind_parameters;
use super::query::build_result_set;
use crate::command::{Command, CommandKind};
use crate::error::DataSourceError;
use crate::params::ParameterCollection;
use crate::provider::{Provider, ProviderConnection};
use crate::results::DataSet;
use crate::types::EngineKind;

pub(crate) type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// File engine provider. The connection string is a database path or `file:` URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteProvider;

#[async_trait]
impl Provider for SqliteProvider {
    fn engine(&self) -> EngineKind {
        EngineKind::Sqlite
    }

    async fn connect(
        &self,
        connection_string: &str,
    ) -> Result<Box<dyn ProviderConnection>, DataSourceError> {
        let path = connection_string.to_owned();
        let conn = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(path)?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            Ok::<_, DataSourceError>(conn)
        })
        .await??;
        Ok(Box::new(SqliteConnection::new(conn)))
    }
}

/// An open `SQLite` connection. Every call runs on the blocking thread pool.
pub struct SqliteConnection {
    conn: SharedSqliteConnection,
}

impl SqliteConnection {
    pub(crate) fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn handle(&self) -> SharedSqliteConnection {
        Arc::clone(&self.conn)
    }

    async fn batch(&self, sql: &'static str) -> Result<(), DataSourceError> {
        run_blocking(self.handle(), move |guard| Ok(guard.execute_batch(sql)?)).await
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection").finish_non_exhaustive()
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, DataSourceError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, DataSourceError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await?
}

/// Owned copy of what a blocking task needs from a [`Command`].
struct StatementPlan {
    sql: String,
    parameters: ParameterCollection,
    cached: bool,
}

impl StatementPlan {
    fn from_command(command: &Command) -> Result<Self, DataSourceError> {
        if command.kind() == CommandKind::StoredProcedure {
            return Err(DataSourceError::Unimplemented(
                "SQLite has no stored procedures".into(),
            ));
        }
        Ok(Self {
            sql: command.text().to_owned(),
            parameters: command.parameters().clone(),
            cached: command.is_prepared(),
        })
    }

    /// Prepare (from the connection's statement cache when the command is prepared), bind,
    /// then hand the statement to `f`.
    fn run<R>(
        &self,
        conn: &rusqlite::Connection,
        f: impl FnOnce(&mut Statement<'_>) -> Result<R, DataSourceError>,
    ) -> Result<R, DataSourceError> {
        if self.cached {
            let mut stmt = conn.prepare_cached(&self.sql)?;
            bind_parameters(&mut *stmt, &self.parameters)?;
            f(&mut *stmt)
        } else {
            let mut stmt = conn.prepare(&self.sql)?;
            bind_parameters(&mut stmt, &self.parameters)?;
            f(&mut stmt)
        }
    }
}

#[async_trait]
impl ProviderConnection for SqliteConnection {
    async fn begin(&mut self) -> Result<(), DataSourceError> {
        self.batch("BEGIN").await
    }

    async fn commit(&mut self) -> Result<(), DataSourceError> {
        self.batch("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<(), DataSourceError> {
        self.batch("ROLLBACK").await
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, DataSourceError> {
        let plan = StatementPlan::from_command(command)?;
        run_blocking(self.handle(), move |guard| {
            let affected = plan.run(guard, |stmt| Ok(stmt.raw_execute()?))?;
            u64::try_from(affected).map_err(|e| {
                DataSourceError::ExecutionError(format!("Invalid rows affected count: {e}"))
            })
        })
        .await
    }

    async fn fill(&mut self, command: &Command) -> Result<DataSet, DataSourceError> {
        let plan = StatementPlan::from_command(command)?;
        run_blocking(self.handle(), move |guard| {
            plan.run(guard, |stmt| {
                let mut data_set = DataSet::new();
                if stmt.column_count() == 0 {
                    stmt.raw_execute()?;
                } else {
                    data_set.push(build_result_set(stmt)?);
                }
                Ok(data_set)
            })
        })
        .await
    }

    async fn close(self: Box<Self>) -> Result<(), DataSourceError> {
        let handle = self.conn;
        tokio::task::spawn_blocking(move || match Arc::try_unwrap(handle) {
            Ok(mutex) => mutex
                .into_inner()
                .close()
                .map_err(|(_, e)| DataSourceError::SqliteError(e)),
            // A blocking task still holds a clone; the connection closes when it finishes.
            Err(_) => Ok(()),
        })
        .await?
    }
}
