use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::command::CommandKind;
use crate::error::DataSourceError;
use crate::provider::Provider;

/// Values read back from a backend: one cell of a result row.
///
/// ```rust
/// use sql_datasource::prelude::*;
///
/// let cell = RowValues::Int(7);
/// assert_eq!(cell.as_int(), Some(&7));
/// assert!(RowValues::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Integer view that also accepts integral text, as some drivers report
    /// `DECIMAL`/`NUMERIC` results as strings.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            RowValues::Int(i) => Some(*i),
            RowValues::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// The backend technology a data source talks to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// File-based engine (`SQLite`); no stored procedures.
    Sqlite,
    /// Transact-SQL engine (SQL Server).
    Mssql,
    /// Networked SQL engine (`PostgreSQL`).
    Postgres,
}

impl EngineKind {
    #[must_use]
    pub fn supports_stored_procedures(self) -> bool {
        !matches!(self, EngineKind::Sqlite)
    }

    /// Command interpretation a fresh command descriptor starts with.
    #[must_use]
    pub fn default_command_kind(self) -> CommandKind {
        match self {
            EngineKind::Mssql => CommandKind::StoredProcedure,
            EngineKind::Sqlite | EngineKind::Postgres => CommandKind::Text,
        }
    }

    /// Positional placeholder for the 1-based parameter `index`.
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            EngineKind::Sqlite => "?".to_string(),
            EngineKind::Postgres => format!("${index}"),
            EngineKind::Mssql => format!("@P{index}"),
        }
    }

    #[must_use]
    pub fn provider_name(self) -> &'static str {
        match self {
            EngineKind::Sqlite => "rusqlite",
            EngineKind::Mssql => "tiberius",
            EngineKind::Postgres => "tokio-postgres",
        }
    }

    /// Resolve the built-in provider for this engine.
    ///
    /// # Errors
    /// Returns `DataSourceError::ConfigError` when the engine's Cargo feature is not enabled.
    pub fn provider(self) -> Result<Arc<dyn Provider>, DataSourceError> {
        match self {
            #[cfg(feature = "sqlite")]
            EngineKind::Sqlite => Ok(Arc::new(crate::sqlite::SqliteProvider)),
            #[cfg(feature = "postgres")]
            EngineKind::Postgres => Ok(Arc::new(crate::postgres::PostgresProvider)),
            #[cfg(feature = "mssql")]
            EngineKind::Mssql => Ok(Arc::new(crate::mssql::MssqlProvider)),
            #[allow(unreachable_patterns)]
            other => Err(DataSourceError::ConfigError(format!(
                "engine '{other}' is not enabled in this build"
            ))),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::Sqlite => "sqlite",
            EngineKind::Mssql => "mssql",
            EngineKind::Postgres => "postgres",
        };
        f.write_str(name)
    }
}

impl FromStr for EngineKind {
    type Err = DataSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if let Ok(kind) = <EngineKind as ValueEnum>::from_str(wanted, true) {
            return Ok(kind);
        }
        EngineKind::value_variants()
            .iter()
            .copied()
            .find(|kind| kind.provider_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DataSourceError::ConfigError(format!("unknown provider '{s}'")))
    }
}
