//! Backend boundary.
//!
//! A [`Provider`] turns a ready-made connection string into a live
//! [`ProviderConnection`]. Everything engine-specific (placeholder style, prepare,
//! transactions, reading rows back) lives behind these two traits.

use std::fmt;

use async_trait::async_trait;

use crate::command::Command;
use crate::error::DataSourceError;
use crate::results::DataSet;
use crate::types::{EngineKind, RowValues};

#[async_trait]
pub trait Provider: Send + Sync + fmt::Debug {
    fn engine(&self) -> EngineKind;

    /// Invariant provider identifier, e.g. `"rusqlite"`.
    fn name(&self) -> &str {
        self.engine().provider_name()
    }

    /// Open one connection.
    ///
    /// # Errors
    /// Returns `DataSourceError` if the backend cannot be reached or rejects the
    /// connection string.
    async fn connect(
        &self,
        connection_string: &str,
    ) -> Result<Box<dyn ProviderConnection>, DataSourceError>;
}

/// One open backend connection.
///
/// The [`Command`] handed to `execute`/`fill`/`scalar` carries its prepared flag; a
/// provider pre-compiles or caches the statement only when
/// [`Command::is_prepared`] is true.
#[async_trait]
pub trait ProviderConnection: Send {
    async fn begin(&mut self) -> Result<(), DataSourceError>;

    async fn commit(&mut self) -> Result<(), DataSourceError>;

    async fn rollback(&mut self) -> Result<(), DataSourceError>;

    /// Run a statement that returns no rows; yields the affected row count.
    async fn execute(&mut self, command: &Command) -> Result<u64, DataSourceError>;

    /// Table-fill adapter: run the command and materialize every result table.
    async fn fill(&mut self, command: &Command) -> Result<DataSet, DataSourceError>;

    /// First column of the first row, or `None` when the command yields no row.
    async fn scalar(&mut self, command: &Command) -> Result<Option<RowValues>, DataSourceError> {
        let data_set = self.fill(command).await?;
        Ok(data_set
            .into_first_table()
            .and_then(|table| table.results.into_iter().next())
            .and_then(|row| row.rows.into_iter().next()))
    }

    async fn close(self: Box<Self>) -> Result<(), DataSourceError>;
}
