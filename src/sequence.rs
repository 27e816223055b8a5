//! Counter-table identifiers for engines without a usable auto-increment.
//!
//! Counters live in `Sequences (TableName TEXT, CurrentValue INTEGER)`, one row per
//! logical sequence. [`DataSource::next_id`] returns the current value and leaves the row
//! incremented by one.

use serde::{Deserialize, Serialize};

use crate::command::CommandKind;
use crate::data_source::DataSource;
use crate::error::DataSourceError;
use crate::types::{EngineKind, RowValues};

const TABLE_NAME_PARAM: &str = "TableName";

/// How [`DataSource::next_id`] reads and advances a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStrategy {
    /// One `UPDATE .. RETURNING` (or `OUTPUT`) round-trip; safe under concurrent callers.
    #[default]
    Atomic,
    /// `SELECT` then a separate `UPDATE`. Two callers can read the same value unless the
    /// data source is in transactional mode and the backend serializes the rows.
    ReadThenIncrement,
}

fn select_sql(engine: EngineKind) -> String {
    format!(
        "SELECT CurrentValue FROM Sequences WHERE TableName = {}",
        engine.placeholder(1)
    )
}

fn increment_sql(engine: EngineKind) -> String {
    format!(
        "UPDATE Sequences SET CurrentValue = CurrentValue + 1 WHERE TableName = {}",
        engine.placeholder(1)
    )
}

fn increment_returning_sql(engine: EngineKind) -> String {
    match engine {
        EngineKind::Mssql => format!(
            "UPDATE Sequences SET CurrentValue = CurrentValue + 1 \
             OUTPUT deleted.CurrentValue WHERE TableName = {}",
            engine.placeholder(1)
        ),
        EngineKind::Sqlite | EngineKind::Postgres => format!(
            "{} RETURNING CurrentValue - 1",
            increment_sql(engine)
        ),
    }
}

impl DataSource {
    /// Next identifier for `table_name`.
    ///
    /// The command descriptor is reinitialized first, so any pending bindings are
    /// discarded. In transactional mode the increment joins the active transaction.
    ///
    /// # Errors
    /// Returns `DataSourceError::SequenceNotFound` when no counter row exists for
    /// `table_name`, or the connection or backend error.
    pub async fn next_id(&mut self, table_name: &str) -> Result<i64, DataSourceError> {
        match self.sequence_strategy {
            SequenceStrategy::Atomic => self.next_id_atomic(table_name).await,
            SequenceStrategy::ReadThenIncrement => self.next_id_two_step(table_name).await,
        }
    }

    async fn next_id_atomic(&mut self, table_name: &str) -> Result<i64, DataSourceError> {
        self.reinitialize()?;
        self.prepare_statement(&increment_returning_sql(self.engine), CommandKind::Text)?;
        self.bind(TABLE_NAME_PARAM, table_name)?;
        let value = self.run_scalar(true).await;
        self.reinitialize()?;
        sequence_value(table_name, value?)
    }

    async fn next_id_two_step(&mut self, table_name: &str) -> Result<i64, DataSourceError> {
        self.reinitialize()?;
        self.prepare_statement(&select_sql(self.engine), CommandKind::Text)?;
        self.bind(TABLE_NAME_PARAM, table_name)?;
        let current = sequence_value(table_name, self.run_scalar(true).await?)?;

        self.reinitialize()?;
        self.prepare_statement(&increment_sql(self.engine), CommandKind::Text)?;
        self.bind(TABLE_NAME_PARAM, table_name)?;
        let updated = self.try_execute_for_effect().await?;
        if updated == 0 {
            return Err(DataSourceError::SequenceNotFound(table_name.to_owned()));
        }
        Ok(current)
    }
}

fn sequence_value(table_name: &str, value: Option<RowValues>) -> Result<i64, DataSourceError> {
    match value {
        None | Some(RowValues::Null) => {
            Err(DataSourceError::SequenceNotFound(table_name.to_owned()))
        }
        Some(other) => other.to_i64().ok_or_else(|| {
            DataSourceError::ExecutionError(format!(
                "sequence '{table_name}' holds a non-integer value: {other:?}"
            ))
        }),
    }
}
