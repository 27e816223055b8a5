use serde::{Deserialize, Serialize};

use crate::data_source::DataSource;
use crate::error::DataSourceError;
use crate::sequence::SequenceStrategy;
use crate::types::EngineKind;

/// Options for constructing a [`DataSource`].
///
/// Deserializable, so a data source can be described in a config file:
/// ```rust
/// use sql_datasource::prelude::*;
///
/// let opts: DataSourceOptions = serde_json::from_str(
///     r#"{ "engine": "sqlite", "connection_string": "app.db", "transactional": true }"#,
/// )
/// .unwrap();
/// assert_eq!(opts.engine, EngineKind::Sqlite);
/// assert_eq!(opts.sequence_strategy, SequenceStrategy::Atomic);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceOptions {
    pub engine: EngineKind,
    pub connection_string: String,
    #[serde(default)]
    pub transactional: bool,
    #[serde(default)]
    pub sequence_strategy: SequenceStrategy,
}

impl DataSourceOptions {
    #[must_use]
    pub fn new(engine: EngineKind, connection_string: String) -> Self {
        Self {
            engine,
            connection_string,
            transactional: false,
            sequence_strategy: SequenceStrategy::default(),
        }
    }

    #[must_use]
    pub fn with_transactional(mut self, transactional: bool) -> Self {
        self.transactional = transactional;
        self
    }

    #[must_use]
    pub fn with_sequence_strategy(mut self, strategy: SequenceStrategy) -> Self {
        self.sequence_strategy = strategy;
        self
    }

    /// Parse options from a JSON document.
    ///
    /// # Errors
    /// Returns `DataSourceError::ConfigError` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, DataSourceError> {
        serde_json::from_str(json)
            .map_err(|e| DataSourceError::ConfigError(format!("invalid options: {e}")))
    }
}

/// Fluent builder for [`DataSourceOptions`].
#[derive(Debug, Clone)]
pub struct DataSourceOptionsBuilder {
    opts: DataSourceOptions,
}

impl DataSourceOptionsBuilder {
    #[must_use]
    pub fn new(engine: EngineKind, connection_string: impl Into<String>) -> Self {
        Self {
            opts: DataSourceOptions::new(engine, connection_string.into()),
        }
    }

    #[must_use]
    pub fn transactional(mut self, transactional: bool) -> Self {
        self.opts.transactional = transactional;
        self
    }

    #[must_use]
    pub fn sequence_strategy(mut self, strategy: SequenceStrategy) -> Self {
        self.opts.sequence_strategy = strategy;
        self
    }

    #[must_use]
    pub fn finish(self) -> DataSourceOptions {
        self.opts
    }

    /// Build the data source.
    ///
    /// # Errors
    /// Returns `DataSourceError::ConfigError` if the engine is unavailable or the
    /// connection string is empty.
    pub fn build(self) -> Result<DataSource, DataSourceError> {
        DataSource::from_options(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_option() {
        let opts = DataSourceOptionsBuilder::new(EngineKind::Postgres, "host=db user=app")
            .transactional(true)
            .sequence_strategy(SequenceStrategy::ReadThenIncrement)
            .finish();
        assert_eq!(opts.engine, EngineKind::Postgres);
        assert!(opts.transactional);
        assert_eq!(opts.sequence_strategy, SequenceStrategy::ReadThenIncrement);
    }

    #[test]
    fn json_defaults_and_errors() {
        let opts =
            DataSourceOptions::from_json(r#"{"engine":"mssql","connection_string":"Server=x"}"#)
                .unwrap();
        assert!(!opts.transactional);
        assert_eq!(opts.sequence_strategy, SequenceStrategy::Atomic);

        let err = DataSourceOptions::from_json(r#"{"engine":"oracle","connection_string":"x"}"#)
            .unwrap_err();
        assert!(matches!(err, DataSourceError::ConfigError(_)));
    }
}
