use std::fmt;

use async_trait::async_trait;
use tiberius::{Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::params::bind_query;
use super::query::build_data_set;
use crate::command::Command;
use crate::error::DataSourceError;
use crate::provider::{Provider, ProviderConnection};
use crate::results::DataSet;
use crate::types::EngineKind;

pub type MssqlClient = Client<Compat<TcpStream>>;

/// SQL Server provider. The connection string is an ADO.NET string
/// (`server=tcp:host,1433;user=..;password=..;database=..`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlProvider;

#[async_trait]
impl Provider for MssqlProvider {
    fn engine(&self) -> EngineKind {
        EngineKind::Mssql
    }

    async fn connect(
        &self,
        connection_string: &str,
    ) -> Result<Box<dyn ProviderConnection>, DataSourceError> {
        let config = Config::from_ado_string(connection_string).map_err(|e| {
            DataSourceError::ConfigError(format!("invalid SQL Server connection string: {e}"))
        })?;
        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| DataSourceError::ConnectionError(format!("TCP connection error: {e}")))?;
        tcp.set_nodelay(true)
            .map_err(|e| DataSourceError::ConnectionError(format!("TCP setup error: {e}")))?;
        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| {
                DataSourceError::ConnectionError(format!("SQL Server connection error: {e}"))
            })?;
        Ok(Box::new(MssqlConnection { client }))
    }
}

/// An open SQL Server client.
///
/// tiberius has no client-side prepare; every statement is sent as a parameterized
/// `sp_executesql` batch, so the prepared flag has no effect here.
pub struct MssqlConnection {
    client: MssqlClient,
}

impl MssqlConnection {
    async fn simple(&mut self, sql: &str) -> Result<(), DataSourceError> {
        self.client.simple_query(sql).await?.into_results().await?;
        Ok(())
    }
}

impl fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MssqlConnection").finish_non_exhaustive()
    }
}

#[async_trait]
impl ProviderConnection for MssqlConnection {
    async fn begin(&mut self) -> Result<(), DataSourceError> {
        self.simple("BEGIN TRANSACTION").await
    }

    async fn commit(&mut self) -> Result<(), DataSourceError> {
        self.simple("COMMIT TRANSACTION").await
    }

    async fn rollback(&mut self) -> Result<(), DataSourceError> {
        self.simple("ROLLBACK TRANSACTION").await
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, DataSourceError> {
        let result = bind_query(command).execute(&mut self.client).await?;
        Ok(result.rows_affected().iter().sum())
    }

    async fn fill(&mut self, command: &Command) -> Result<DataSet, DataSourceError> {
        let results = bind_query(command)
            .query(&mut self.client)
            .await?
            .into_results()
            .await?;
        build_data_set(results)
    }

    async fn close(self: Box<Self>) -> Result<(), DataSourceError> {
        self.client.close().await?;
        Ok(())
    }
}
