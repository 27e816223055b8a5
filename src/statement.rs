use crate::command::{CommandKind, StatementState};
use crate::data_source::DataSource;
use crate::error::DataSourceError;

impl DataSource {
    /// Point the command descriptor at `text`.
    ///
    /// | bound text | requested | result |
    /// |---|---|---|
    /// | empty | any | adopted, [`StatementState::Unset`], prepared |
    /// | same | same | reset and re-adopted, [`StatementState::SameText`], prepared |
    /// | other | different | reset and adopted, [`StatementState::ChangedText`], not prepared |
    ///
    /// Resets keep pending bindings; use [`reinitialize`](DataSource::reinitialize) to
    /// drop them.
    ///
    /// # Errors
    /// Returns `DataSourceError::InvalidOperation` for empty text, for a stored procedure
    /// on an engine without them, or once disposed.
    pub fn prepare_statement(
        &mut self,
        text: &str,
        kind: CommandKind,
    ) -> Result<StatementState, DataSourceError> {
        if text.trim().is_empty() {
            return Err(DataSourceError::InvalidOperation(
                "command text must not be empty".into(),
            ));
        }
        if kind == CommandKind::StoredProcedure && !self.engine.supports_stored_procedures() {
            return Err(DataSourceError::InvalidOperation(format!(
                "engine '{}' has no stored procedures",
                self.engine
            )));
        }
        let default_kind = self.engine.default_command_kind();
        let command = self.command_mut()?;
        let state = if command.text().is_empty() {
            StatementState::Unset
        } else {
            let state = if command.text() == text {
                StatementState::SameText
            } else {
                StatementState::ChangedText
            };
            command.reset_keeping_parameters(default_kind);
            state
        };
        command.adopt(text, kind, state);
        tracing::debug!(?state, ?kind, "statement prepared");
        Ok(state)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use crate::command::{CommandKind, StatementState};
    use crate::data_source::DataSource;
    use crate::error::DataSourceError;
    use crate::types::EngineKind;

    fn sqlite() -> DataSource {
        DataSource::new(EngineKind::Sqlite, "unused.db").unwrap()
    }

    #[test]
    fn same_text_twice_stays_prepared() {
        let mut ds = sqlite();
        let sql = "SELECT 1";
        assert_eq!(
            ds.prepare_statement(sql, CommandKind::Text).unwrap(),
            StatementState::Unset
        );
        assert_eq!(
            ds.prepare_statement(sql, CommandKind::Text).unwrap(),
            StatementState::SameText
        );
        let command = ds.command().unwrap();
        assert!(command.is_prepared());
        assert_eq!(command.text(), sql);
    }

    #[test]
    fn changed_text_is_adopted_but_not_prepared() {
        let mut ds = sqlite();
        ds.prepare_statement("SELECT 1", CommandKind::Text).unwrap();
        let state = ds.prepare_statement("SELECT 2", CommandKind::Text).unwrap();

        assert_eq!(state, StatementState::ChangedText);
        let command = ds.command().unwrap();
        assert!(!command.is_prepared());
        assert_eq!(command.text(), "SELECT 2");
    }

    #[test]
    fn reset_keeps_pending_bindings() {
        let mut ds = sqlite();
        ds.prepare_statement("SELECT ?", CommandKind::Text).unwrap();
        ds.bind("Id", 4_i64).unwrap();
        ds.prepare_statement("SELECT ?", CommandKind::Text).unwrap();
        assert_eq!(ds.command().unwrap().parameters().len(), 1);

        ds.reinitialize().unwrap();
        let command = ds.command().unwrap();
        assert!(command.parameters().is_empty());
        assert!(command.text().is_empty());
    }

    #[test]
    fn rejects_empty_text_and_unsupported_procedures() {
        let mut ds = sqlite();
        assert!(matches!(
            ds.prepare_statement("  ", CommandKind::Text),
            Err(DataSourceError::InvalidOperation(_))
        ));
        assert!(matches!(
            ds.prepare_statement("sp_do_work", CommandKind::StoredProcedure),
            Err(DataSourceError::InvalidOperation(_))
        ));
    }
}
