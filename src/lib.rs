//! Provider-agnostic SQL data source.
//!
//! A [`DataSource`] owns one backend connection, one command descriptor and at most one
//! transaction. Statements are pointed at with
//! [`prepare_statement`](DataSource::prepare_statement), parameters are bound by name,
//! and the command runs as an effect, a scalar read or a table fill.
//!
//! ```rust,no_run
//! use sql_datasource::prelude::*;
//!
//! # async fn demo() -> Result<(), DataSourceError> {
//! let mut ds = DataSource::new(EngineKind::Sqlite, "app.db")?;
//! ds.prepare_statement("UPDATE users SET age = ? WHERE name = ?", CommandKind::Text)?;
//! ds.bind("Age", 31_i32)?;
//! ds.bind("Name", "ada")?;
//! let affected = ds.try_execute_for_effect().await?;
//! # let _ = affected;
//! ds.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod connection;
pub mod data_source;
pub mod error;
pub mod executor;
pub mod params;
pub mod prelude;
pub mod provider;
pub mod results;
pub mod sequence;
pub mod statement;
pub mod transaction;
pub mod types;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{DataSourceOptions, DataSourceOptionsBuilder};
pub use data_source::DataSource;
pub use error::{DataSourceError, ErrorKind};
pub use types::{EngineKind, RowValues};
