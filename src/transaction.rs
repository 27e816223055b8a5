use crate::data_source::DataSource;
use crate::error::DataSourceError;

/// Bookkeeping for the transaction a data source has begun on its connection.
#[derive(Debug, Default)]
pub(crate) struct Transaction {
    statements: usize,
}

impl Transaction {
    pub(crate) fn statements(&self) -> usize {
        self.statements
    }

    pub(crate) fn record_statement(&mut self) {
        self.statements += 1;
    }
}

impl DataSource {
    #[must_use]
    pub fn is_transactional(&self) -> bool {
        self.transactional
    }

    /// Whether a transaction has begun and is not yet confirmed or undone.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Turn transactional mode on or off.
    ///
    /// While on, effect statements run inside one transaction (begun lazily by the first
    /// of them) and the connection stays open until [`confirm`](DataSource::confirm) or
    /// [`undo`](DataSource::undo).
    ///
    /// # Errors
    /// Returns `DataSourceError::InvalidOperation` when turning the mode off while a
    /// transaction is active.
    pub fn set_transactional(&mut self, enabled: bool) -> Result<(), DataSourceError> {
        self.ensure_live()?;
        if !enabled && self.transaction.is_some() {
            return Err(DataSourceError::InvalidOperation(
                "confirm or undo the active transaction before leaving transactional mode"
                    .into(),
            ));
        }
        self.transactional = enabled;
        Ok(())
    }

    /// Commit the active transaction.
    ///
    /// Does nothing when transactional mode is on but no statement has run yet.
    ///
    /// # Errors
    /// Returns `DataSourceError::InvalidOperation` if transactional mode is off, or the
    /// backend error if the commit fails (the transaction is gone either way).
    pub async fn confirm(&mut self) -> Result<(), DataSourceError> {
        self.finish_transaction(true).await
    }

    /// Roll back the active transaction.
    ///
    /// # Errors
    /// Returns `DataSourceError::InvalidOperation` if transactional mode is off, or the
    /// backend error if the rollback fails.
    pub async fn undo(&mut self) -> Result<(), DataSourceError> {
        self.finish_transaction(false).await
    }

    /// Begin a transaction on the (already open) connection unless one is active.
    pub(crate) async fn ensure_transaction(&mut self) -> Result<(), DataSourceError> {
        if self.transaction.is_none() {
            self.connection.live_mut()?.begin().await?;
            tracing::debug!("transaction begun");
            self.transaction = Some(Transaction::default());
        }
        Ok(())
    }

    async fn finish_transaction(&mut self, commit: bool) -> Result<(), DataSourceError> {
        self.ensure_live()?;
        if !self.transactional {
            return Err(DataSourceError::InvalidOperation(
                "transactional mode is not enabled".into(),
            ));
        }
        let Some(tx) = self.transaction.take() else {
            tracing::debug!(commit, "no active transaction to finish");
            return Ok(());
        };
        let result = match self.connection.live_mut() {
            Ok(live) if commit => live.commit().await,
            Ok(live) => live.rollback().await,
            Err(e) => Err(e),
        };
        tracing::debug!(
            commit,
            statements = tx.statements(),
            ok = result.is_ok(),
            "transaction finished"
        );
        self.close_unless_in_transaction().await;
        result
    }
}
