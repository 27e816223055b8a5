use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::command::Command;
use crate::config::DataSourceOptions;
use crate::connection::{Connection, ConnectionState};
use crate::error::DataSourceError;
use crate::params::ToParam;
use crate::provider::Provider;
use crate::sequence::SequenceStrategy;
use crate::transaction::Transaction;
use crate::types::EngineKind;

/// Owner of one provider, one connection, one command descriptor and at most one
/// transaction.
///
/// Every mutating operation takes `&mut self`: a data source serves one logical caller
/// at a time and runs operations strictly in call order.
///
/// Release with [`dispose`](DataSource::dispose), or acquire through
/// [`scope`](DataSource::scope) which disposes on every exit path. Dropping an
/// undisposed data source releases its handles synchronously without a graceful close.
pub struct DataSource {
    pub(crate) provider: Option<Arc<dyn Provider>>,
    pub(crate) engine: EngineKind,
    pub(crate) connection: Connection,
    pub(crate) command: Option<Command>,
    pub(crate) transaction: Option<Transaction>,
    pub(crate) transactional: bool,
    pub(crate) sequence_strategy: SequenceStrategy,
    disposed: bool,
}

impl DataSource {
    /// Create a data source for a built-in engine. No connection is opened yet.
    ///
    /// # Errors
    /// Returns `DataSourceError::ConfigError` if the engine is not compiled in or the
    /// connection string is empty.
    pub fn new(
        engine: EngineKind,
        connection_string: impl Into<String>,
    ) -> Result<Self, DataSourceError> {
        Self::with_provider(engine.provider()?, connection_string)
    }

    /// Create a data source from an engine or provider name (`"sqlite"`, `"tiberius"`, ...).
    ///
    /// # Errors
    /// Returns `DataSourceError::ConfigError` for unknown names, disabled engines or an
    /// empty connection string.
    pub fn from_provider_name(
        provider_name: &str,
        connection_string: impl Into<String>,
    ) -> Result<Self, DataSourceError> {
        Self::new(provider_name.parse()?, connection_string)
    }

    /// Create a data source over a caller-supplied provider.
    ///
    /// # Errors
    /// Returns `DataSourceError::ConfigError` if the connection string is empty.
    pub fn with_provider(
        provider: Arc<dyn Provider>,
        connection_string: impl Into<String>,
    ) -> Result<Self, DataSourceError> {
        let connection_string = connection_string.into();
        if connection_string.trim().is_empty() {
            return Err(DataSourceError::ConfigError(
                "connection string is required".into(),
            ));
        }
        let engine = provider.engine();
        Ok(Self {
            provider: Some(provider),
            engine,
            connection: Connection::new(connection_string),
            command: Some(Command::new(engine.default_command_kind())),
            transaction: None,
            transactional: false,
            sequence_strategy: SequenceStrategy::default(),
            disposed: false,
        })
    }

    /// # Errors
    /// Returns `DataSourceError::ConfigError` if the engine is not compiled in or the
    /// connection string is empty.
    pub fn from_options(opts: DataSourceOptions) -> Result<Self, DataSourceError> {
        let mut ds = Self::new(opts.engine, opts.connection_string)?;
        ds.transactional = opts.transactional;
        ds.sequence_strategy = opts.sequence_strategy;
        Ok(ds)
    }

    /// Run `body` against a fresh data source and dispose it afterwards, whatever `body`
    /// returns.
    ///
    /// ```rust,no_run
    /// use sql_datasource::prelude::*;
    ///
    /// # async fn demo() -> Result<(), DataSourceError> {
    /// let opts = DataSourceOptions::new(EngineKind::Sqlite, "app.db".into());
    /// let count = DataSource::scope(opts, |ds| {
    ///     Box::pin(async move {
    ///         ds.prepare_statement("SELECT COUNT(*) FROM users", CommandKind::Text)?;
    ///         ds.try_execute_for_scalar().await
    ///     })
    /// })
    /// .await??;
    /// # let _ = count;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns `DataSourceError::ConfigError` if the data source cannot be constructed.
    pub async fn scope<T, F>(opts: DataSourceOptions, body: F) -> Result<T, DataSourceError>
    where
        F: for<'a> FnOnce(&'a mut DataSource) -> BoxFuture<'a, T>,
    {
        let mut ds = Self::from_options(opts)?;
        let out = body(&mut ds).await;
        ds.dispose().await;
        Ok(out)
    }

    #[must_use]
    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        self.connection.connection_string()
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// The live command descriptor; `None` once disposed.
    #[must_use]
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn sequence_strategy(&self) -> SequenceStrategy {
        self.sequence_strategy
    }

    pub fn set_sequence_strategy(&mut self, strategy: SequenceStrategy) {
        self.sequence_strategy = strategy;
    }

    /// Bind `value` under `name` on the current command.
    ///
    /// A new name is added with the declared type of `V`; an existing name only has its
    /// value replaced.
    ///
    /// # Errors
    /// Returns `DataSourceError::ParameterError` for an empty name and
    /// `DataSourceError::InvalidOperation` once disposed.
    pub fn bind<V: ToParam>(&mut self, name: &str, value: V) -> Result<(), DataSourceError> {
        self.command_mut()?.parameters_mut().bind(name, value)
    }

    /// Discard the command descriptor, bindings included, and start a fresh one in the
    /// engine's default command kind.
    ///
    /// # Errors
    /// Returns `DataSourceError::InvalidOperation` once disposed.
    pub fn reinitialize(&mut self) -> Result<(), DataSourceError> {
        self.ensure_live()?;
        self.command = Some(Command::new(self.engine.default_command_kind()));
        Ok(())
    }

    /// Release everything this data source owns, in order: transaction (rolled back),
    /// connection (closed, then dropped), command, provider. Later calls do nothing.
    pub async fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(tx) = self.transaction.take() {
            if let Ok(live) = self.connection.live_mut() {
                if let Err(e) = live.rollback().await {
                    tracing::warn!(error = %e, "rollback during dispose failed");
                }
            }
            tracing::debug!(statements = tx.statements(), "open transaction discarded");
        }
        if let Err(e) = self.connection.close().await {
            tracing::warn!(error = %e, "close during dispose failed");
        }
        self.command = None;
        self.provider = None;
        self.disposed = true;
        tracing::debug!(engine = %self.engine, "data source disposed");
    }

    pub(crate) fn ensure_live(&self) -> Result<(), DataSourceError> {
        if self.disposed {
            Err(DataSourceError::InvalidOperation(
                "data source has been disposed".into(),
            ))
        } else {
            Ok(())
        }
    }

    pub(crate) fn command_mut(&mut self) -> Result<&mut Command, DataSourceError> {
        self.ensure_live()?;
        self.command.as_mut().ok_or_else(|| {
            DataSourceError::InvalidOperation("data source has no command".into())
        })
    }

    pub(crate) fn provider(&self) -> Result<Arc<dyn Provider>, DataSourceError> {
        self.ensure_live()?;
        self.provider.clone().ok_or_else(|| {
            DataSourceError::InvalidOperation("data source has no provider".into())
        })
    }

    pub(crate) async fn open_connection(&mut self) -> Result<(), DataSourceError> {
        let provider = self.provider()?;
        self.connection.open(provider.as_ref()).await
    }

    /// Close unless a transaction is holding the connection. Close failures are logged.
    pub(crate) async fn close_unless_in_transaction(&mut self) {
        if self.transaction.is_none() {
            if let Err(e) = self.connection.close().await {
                tracing::warn!(error = %e, "connection close failed");
            }
        }
    }
}

impl Drop for DataSource {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        let had_tx = self.transaction.take().is_some();
        let had_conn = self.connection.release();
        if had_tx || had_conn {
            tracing::warn!(
                engine = %self.engine,
                open_transaction = had_tx,
                "data source dropped without dispose; handles released without a graceful close"
            );
        }
        self.command = None;
        self.provider = None;
        self.disposed = true;
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("engine", &self.engine)
            .field("connection", &self.connection)
            .field("command", &self.command)
            .field("transactional", &self.transactional)
            .field("in_transaction", &self.transaction.is_some())
            .field("disposed", &self.disposed)
            .finish()
    }
}
