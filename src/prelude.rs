//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types
//! to make it easier to get started with the library.

pub use crate::command::{Command, CommandKind, StatementState};
pub use crate::config::{DataSourceOptions, DataSourceOptionsBuilder};
pub use crate::connection::ConnectionState;
pub use crate::data_source::DataSource;
pub use crate::error::{DataSourceError, ErrorKind};
pub use crate::executor::EFFECT_FAILED;
pub use crate::params::{DbType, ParamValue, Parameter, ParameterCollection, ToParam};
pub use crate::provider::{Provider, ProviderConnection};
pub use crate::results::{CustomDbRow, DataSet, ResultSet};
pub use crate::sequence::SequenceStrategy;
pub use crate::types::{EngineKind, RowValues};

#[cfg(feature = "mssql")]
pub use crate::mssql::MssqlProvider;
#[cfg(feature = "postgres")]
pub use crate::postgres::PostgresProvider;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteProvider;
