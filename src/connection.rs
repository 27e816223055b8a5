use std::fmt;

use crate::error::DataSourceError;
use crate::provider::{Provider, ProviderConnection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Closed,
    Open,
}

/// Logical connection owned by a data source: the connection string plus, while open,
/// the provider's live connection.
pub(crate) struct Connection {
    connection_string: String,
    live: Option<Box<dyn ProviderConnection>>,
}

impl Connection {
    pub(crate) fn new(connection_string: String) -> Self {
        Self {
            connection_string,
            live: None,
        }
    }

    pub(crate) fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub(crate) fn state(&self) -> ConnectionState {
        if self.live.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    /// Open through `provider` unless already open.
    pub(crate) async fn open(&mut self, provider: &dyn Provider) -> Result<(), DataSourceError> {
        if self.live.is_none() {
            let live = provider.connect(&self.connection_string).await?;
            tracing::debug!(provider = provider.name(), "connection opened");
            self.live = Some(live);
        }
        Ok(())
    }

    pub(crate) fn live_mut(&mut self) -> Result<&mut dyn ProviderConnection, DataSourceError> {
        match self.live.as_mut() {
            Some(live) => Ok(live.as_mut()),
            None => Err(DataSourceError::ConnectionError(
                "connection is not open".into(),
            )),
        }
    }

    /// Close if open. The handle is released even when the provider reports an error.
    pub(crate) async fn close(&mut self) -> Result<(), DataSourceError> {
        match self.live.take() {
            Some(live) => {
                tracing::debug!("connection closed");
                live.close().await
            }
            None => Ok(()),
        }
    }

    /// Synchronous release for `Drop`: the provider connection is dropped without a
    /// graceful close.
    pub(crate) fn release(&mut self) -> bool {
        self.live.take().is_some()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
