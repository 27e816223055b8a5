use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("No sequence row for table '{0}'")]
    SequenceNotFound(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

/// Coarse classification of a [`DataSourceError`].
///
/// Only `Configuration` and `InvalidOperation` are caller mistakes; the other two
/// come from the backend and are what the sentinel adapters swallow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InvalidOperation,
    Connectivity,
    Execution,
}

impl DataSourceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError(_) => ErrorKind::Configuration,
            Self::InvalidOperation(_) | Self::ParameterError(_) => ErrorKind::InvalidOperation,
            Self::ConnectionError(_) => ErrorKind::Connectivity,
            #[cfg(feature = "postgres")]
            Self::PostgresError(e) if e.is_closed() => ErrorKind::Connectivity,
            _ => ErrorKind::Execution,
        }
    }

    /// True for failures the sentinel-returning operations convert to `-1` / `None` / `false`.
    #[must_use]
    pub fn is_backend_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::Connectivity | ErrorKind::Execution)
    }
}

impl From<tokio::task::JoinError> for DataSourceError {
    fn from(err: tokio::task::JoinError) -> Self {
        DataSourceError::ExecutionError(format!("blocking task join error: {err}"))
    }
}
