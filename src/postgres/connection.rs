use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Statement};

use super::query::build_result_set;
use crate::command::{Command, CommandKind};
use crate::error::DataSourceError;
use crate::provider::{Provider, ProviderConnection};
use crate::results::DataSet;
use crate::types::EngineKind;

const DRIVER_SHUTDOWN: Duration = Duration::from_secs(5);

/// Networked engine provider. Accepts libpq key/value strings and `postgres://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresProvider;

#[async_trait]
impl Provider for PostgresProvider {
    fn engine(&self) -> EngineKind {
        EngineKind::Postgres
    }

    async fn connect(
        &self,
        connection_string: &str,
    ) -> Result<Box<dyn ProviderConnection>, DataSourceError> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| {
                DataSourceError::ConnectionError(format!("Failed to connect to Postgres: {e}"))
            })?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "postgres connection ended with an error");
            }
        });
        Ok(Box::new(PostgresConnection {
            client,
            statements: HashMap::new(),
            driver,
        }))
    }
}

/// An open `PostgreSQL` client. Prepared commands are cached per SQL text for the life of
/// the connection.
pub struct PostgresConnection {
    client: Client,
    statements: HashMap<String, Statement>,
    driver: JoinHandle<()>,
}

impl PostgresConnection {
    async fn statement(
        &mut self,
        command: &Command,
    ) -> Result<Statement, DataSourceError> {
        let sql = render_sql(command);
        if !command.is_prepared() {
            return Ok(self.client.prepare(&sql).await?);
        }
        if let Some(stmt) = self.statements.get(&sql) {
            return Ok(stmt.clone());
        }
        let stmt = self.client.prepare(&sql).await?;
        self.statements.insert(sql, stmt.clone());
        Ok(stmt)
    }
}

impl fmt::Debug for PostgresConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConnection")
            .field("cached_statements", &self.statements.len())
            .finish_non_exhaustive()
    }
}

/// Literal text, or `CALL name($1, ..)` for a stored procedure.
fn render_sql(command: &Command) -> String {
    match command.kind() {
        CommandKind::Text => command.text().to_owned(),
        CommandKind::StoredProcedure => {
            let args: Vec<String> = (1..=command.parameters().len())
                .map(|i| EngineKind::Postgres.placeholder(i))
                .collect();
            format!("CALL {}({})", command.text(), args.join(", "))
        }
    }
}

fn param_refs(command: &Command) -> Vec<&(dyn ToSql + Sync)> {
    command
        .parameters()
        .iter()
        .map(|p| p.value() as &(dyn ToSql + Sync))
        .collect()
}

#[async_trait]
impl ProviderConnection for PostgresConnection {
    async fn begin(&mut self) -> Result<(), DataSourceError> {
        self.client.batch_execute("BEGIN").await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DataSourceError> {
        self.client.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DataSourceError> {
        self.client.batch_execute("ROLLBACK").await?;
        Ok(())
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, DataSourceError> {
        let stmt = self.statement(command).await?;
        let params = param_refs(command);
        Ok(self.client.execute(&stmt, &params).await?)
    }

    async fn fill(&mut self, command: &Command) -> Result<DataSet, DataSourceError> {
        let stmt = self.statement(command).await?;
        let params = param_refs(command);
        let mut data_set = DataSet::new();
        if stmt.columns().is_empty() {
            self.client.execute(&stmt, &params).await?;
        } else {
            let rows = self.client.query(&stmt, &params).await?;
            data_set.push(build_result_set(&stmt, &rows)?);
        }
        Ok(data_set)
    }

    async fn close(self: Box<Self>) -> Result<(), DataSourceError> {
        let PostgresConnection {
            client,
            statements,
            driver,
        } = *self;
        drop(statements);
        drop(client);
        // The driver task finishes once the client is gone.
        if tokio::time::timeout(DRIVER_SHUTDOWN, driver).await.is_err() {
            tracing::warn!("postgres connection driver did not stop in time");
        }
        Ok(())
    }
}
