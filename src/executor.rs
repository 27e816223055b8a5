//! Running the bound command.
//!
//! Each operation comes in two shapes: a `try_*` method returning the structured
//! [`DataSourceError`], and a sentinel method (`-1`, `None`, `false`) that logs the
//! error and swallows it.

use crate::command::Command;
use crate::connection::ConnectionState;
use crate::data_source::DataSource;
use crate::error::DataSourceError;
use crate::results::{CustomDbRow, DataSet, ResultSet};
use crate::types::RowValues;

/// Returned by [`DataSource::execute_for_effect`] when the statement failed.
pub const EFFECT_FAILED: i64 = -1;

impl DataSource {
    /// Run the command as a row-affecting statement.
    ///
    /// Opens the connection if needed and, in transactional mode, begins the transaction
    /// on first use. Bound parameters are cleared afterwards whatever the outcome, and the
    /// connection is closed unless a transaction holds it.
    ///
    /// # Errors
    /// Returns `DataSourceError::InvalidOperation` if no command text is set, otherwise
    /// the connection or backend error.
    pub async fn try_execute_for_effect(&mut self) -> Result<u64, DataSourceError> {
        self.ensure_command_text()?;
        let result = self.run_effect().await;
        if let Some(command) = self.command.as_mut() {
            command.parameters_mut().clear();
        }
        self.close_unless_in_transaction().await;
        result
    }

    /// Sentinel form of [`try_execute_for_effect`](DataSource::try_execute_for_effect):
    /// the affected row count, or [`EFFECT_FAILED`].
    pub async fn execute_for_effect(&mut self) -> i64 {
        match self.try_execute_for_effect().await {
            Ok(affected) => i64::try_from(affected).unwrap_or(i64::MAX),
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "effect statement failed");
                EFFECT_FAILED
            }
        }
    }

    /// Run the command and return the first column of its first row.
    ///
    /// Never begins a transaction. `Ok(None)` means the command produced no row.
    ///
    /// # Errors
    /// Returns `DataSourceError::InvalidOperation` if no command text is set, otherwise
    /// the connection or backend error.
    pub async fn try_execute_for_scalar(&mut self) -> Result<Option<RowValues>, DataSourceError> {
        self.run_scalar(false).await
    }

    /// Sentinel form of [`try_execute_for_scalar`](DataSource::try_execute_for_scalar):
    /// `None` on failure, empty text when the command produced no row.
    pub async fn execute_for_scalar(&mut self) -> Option<RowValues> {
        match self.try_execute_for_scalar().await {
            Ok(Some(value)) => Some(value),
            Ok(None) => Some(RowValues::Text(String::new())),
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "scalar read failed");
                None
            }
        }
    }

    /// Fill every table the command produces.
    ///
    /// # Errors
    /// Returns `DataSourceError::InvalidOperation` if no command text is set, otherwise
    /// the connection or backend error.
    pub async fn try_execute_for_data_set(&mut self) -> Result<DataSet, DataSourceError> {
        self.ensure_command_text()?;
        let result = self.run_fill().await;
        self.close_unless_in_transaction().await;
        result
    }

    /// `None` on failure.
    pub async fn execute_for_data_set(&mut self) -> Option<DataSet> {
        match self.try_execute_for_data_set().await {
            Ok(data_set) => Some(data_set),
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "table fill failed");
                None
            }
        }
    }

    /// First table of the fill; `None` on failure or when the command produced no table.
    pub async fn execute_for_table(&mut self) -> Option<ResultSet> {
        self.execute_for_data_set()
            .await
            .and_then(DataSet::into_first_table)
    }

    /// First row of the first table, or `None`.
    pub async fn execute_for_row(&mut self) -> Option<CustomDbRow> {
        self.execute_for_table()
            .await
            .and_then(|table| table.results.into_iter().next())
    }

    /// Rows in the command's first table; 0 on failure.
    pub async fn record_count(&mut self) -> usize {
        self.execute_for_table()
            .await
            .map_or(0, |table| table.results.len())
    }

    pub async fn has_records(&mut self) -> bool {
        self.record_count().await > 0
    }

    /// Probe the backend by opening a connection. Never fails; the connection is left
    /// closed unless a transaction holds it.
    pub async fn test_connection(&mut self) -> bool {
        let opened = self.open_connection().await;
        let reachable = opened.is_ok() && self.connection.state() == ConnectionState::Open;
        if let Err(e) = opened {
            tracing::debug!(error = %e, "connection probe failed");
        }
        self.close_unless_in_transaction().await;
        reachable
    }

    /// Scalar read that, in transactional mode, joins (or begins) the transaction. Used by
    /// statements that write and read in one round-trip.
    pub(crate) async fn run_scalar(
        &mut self,
        join_transaction: bool,
    ) -> Result<Option<RowValues>, DataSourceError> {
        self.ensure_command_text()?;
        let result = self.scalar_round_trip(join_transaction).await;
        self.close_unless_in_transaction().await;
        result
    }

    async fn run_effect(&mut self) -> Result<u64, DataSourceError> {
        self.open_connection().await?;
        if self.transactional {
            self.ensure_transaction().await?;
        }
        let command = current(self.command.as_ref())?;
        let affected = self.connection.live_mut()?.execute(command).await?;
        if let Some(tx) = self.transaction.as_mut() {
            tx.record_statement();
        }
        Ok(affected)
    }

    async fn scalar_round_trip(
        &mut self,
        join_transaction: bool,
    ) -> Result<Option<RowValues>, DataSourceError> {
        self.open_connection().await?;
        if join_transaction && self.transactional {
            self.ensure_transaction().await?;
        }
        let command = current(self.command.as_ref())?;
        let value = self.connection.live_mut()?.scalar(command).await?;
        if join_transaction {
            if let Some(tx) = self.transaction.as_mut() {
                tx.record_statement();
            }
        }
        Ok(value)
    }

    async fn run_fill(&mut self) -> Result<DataSet, DataSourceError> {
        self.open_connection().await?;
        let command = current(self.command.as_ref())?;
        self.connection.live_mut()?.fill(command).await
    }

    fn ensure_command_text(&self) -> Result<(), DataSourceError> {
        self.ensure_live()?;
        match &self.command {
            Some(command) if !command.text().is_empty() => Ok(()),
            _ => Err(DataSourceError::InvalidOperation(
                "command text is not set; call prepare_statement first".into(),
            )),
        }
    }
}

fn current(command: Option<&Command>) -> Result<&Command, DataSourceError> {
    command.ok_or_else(|| DataSourceError::InvalidOperation("data source has no command".into()))
}
