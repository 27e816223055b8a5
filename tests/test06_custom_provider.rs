use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sql_datasource::prelude::*;

type Journal = Arc<Mutex<Vec<String>>>;

/// Provider that records every call and can be told to fail.
#[derive(Debug, Default)]
struct RecordingProvider {
    journal: Journal,
    refuse_connect: bool,
}

struct RecordingConnection {
    journal: Journal,
}

impl RecordingConnection {
    fn log(&self, event: impl Into<String>) {
        self.journal.lock().unwrap().push(event.into());
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn engine(&self) -> EngineKind {
        EngineKind::Postgres
    }

    fn name(&self) -> &str {
        "recording"
    }

    async fn connect(
        &self,
        connection_string: &str,
    ) -> Result<Box<dyn ProviderConnection>, DataSourceError> {
        if self.refuse_connect {
            return Err(DataSourceError::ConnectionError(format!(
                "refused {connection_string}"
            )));
        }
        self.journal.lock().unwrap().push("connect".into());
        Ok(Box::new(RecordingConnection {
            journal: Arc::clone(&self.journal),
        }))
    }
}

#[async_trait]
impl ProviderConnection for RecordingConnection {
    async fn begin(&mut self) -> Result<(), DataSourceError> {
        self.log("begin");
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DataSourceError> {
        self.log("commit");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DataSourceError> {
        self.log("rollback");
        Ok(())
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, DataSourceError> {
        self.log(format!(
            "execute {} prepared={} params={}",
            command.text(),
            command.is_prepared(),
            command.parameters().len()
        ));
        if command.text().contains("fail") {
            return Err(DataSourceError::ExecutionError("boom".into()));
        }
        Ok(3)
    }

    async fn fill(&mut self, command: &Command) -> Result<DataSet, DataSourceError> {
        self.log(format!("fill {}", command.text()));
        let mut table = ResultSet::with_capacity(1);
        table.set_column_names(Arc::new(vec!["value".to_string()]));
        table.add_row_values(vec![RowValues::Int(7)]);
        let mut data_set = DataSet::new();
        data_set.push(table);
        Ok(data_set)
    }

    async fn close(self: Box<Self>) -> Result<(), DataSourceError> {
        self.log("close");
        Ok(())
    }
}

fn recording() -> (DataSource, Journal) {
    let provider = RecordingProvider::default();
    let journal = Arc::clone(&provider.journal);
    let ds = DataSource::with_provider(Arc::new(provider), "memory://recording").unwrap();
    (ds, journal)
}

fn events(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

#[tokio::test]
async fn each_effect_opens_and_closes() {
    let (mut ds, journal) = recording();
    ds.prepare_statement("UPDATE t SET a = $1", CommandKind::Text)
        .unwrap();
    ds.bind("A", 1_i32).unwrap();
    assert_eq!(ds.execute_for_effect().await, 3);
    ds.prepare_statement("UPDATE t SET a = $1", CommandKind::Text)
        .unwrap();
    assert_eq!(ds.execute_for_effect().await, 3);

    assert_eq!(
        events(&journal),
        vec![
            "connect",
            "execute UPDATE t SET a = $1 prepared=true params=1",
            "close",
            "connect",
            "execute UPDATE t SET a = $1 prepared=true params=0",
            "close",
        ]
    );
    ds.dispose().await;
}

#[tokio::test]
async fn dispose_releases_in_order() {
    let (mut ds, journal) = recording();
    ds.set_transactional(true).unwrap();
    ds.prepare_statement("INSERT INTO t VALUES (1)", CommandKind::Text)
        .unwrap();
    ds.execute_for_effect().await;

    ds.dispose().await;
    ds.dispose().await;
    assert_eq!(
        events(&journal),
        vec!["connect", "begin", "execute INSERT INTO t VALUES (1) prepared=true params=0", "rollback", "close"]
    );
}

#[tokio::test]
async fn failures_become_sentinels() {
    let (mut ds, journal) = recording();
    ds.prepare_statement("fail please", CommandKind::Text)
        .unwrap();
    assert_eq!(ds.execute_for_effect().await, EFFECT_FAILED);
    assert_eq!(ds.connection_state(), ConnectionState::Closed);
    assert_eq!(events(&journal).last().map(String::as_str), Some("close"));

    let err = ds.try_execute_for_effect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    ds.dispose().await;
}

#[tokio::test]
async fn refused_connection_is_a_connectivity_failure() {
    let provider = RecordingProvider {
        refuse_connect: true,
        ..RecordingProvider::default()
    };
    let mut ds = DataSource::with_provider(Arc::new(provider), "memory://down").unwrap();
    assert!(!ds.test_connection().await);

    ds.prepare_statement("SELECT 1", CommandKind::Text).unwrap();
    let err = ds.try_execute_for_scalar().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert_eq!(ds.execute_for_scalar().await, None);
    ds.dispose().await;
}

#[tokio::test]
async fn scalar_reads_first_cell_without_a_transaction() {
    let (mut ds, journal) = recording();
    ds.set_transactional(true).unwrap();
    ds.prepare_statement("SELECT value FROM t", CommandKind::Text)
        .unwrap();
    assert_eq!(ds.execute_for_scalar().await, Some(RowValues::Int(7)));
    assert!(!ds.in_transaction());
    assert_eq!(events(&journal), vec!["connect", "fill SELECT value FROM t", "close"]);

    let row = ds.execute_for_row().await.unwrap();
    assert_eq!(row.get("VALUE"), Some(&RowValues::Int(7)));
    ds.dispose().await;
}

#[tokio::test]
async fn confirm_commits_then_closes() {
    let (mut ds, journal) = recording();
    ds.set_transactional(true).unwrap();
    ds.prepare_statement("DELETE FROM t", CommandKind::Text)
        .unwrap();
    ds.execute_for_effect().await;
    ds.prepare_statement("SELECT value FROM t", CommandKind::Text)
        .unwrap();
    assert_eq!(ds.record_count().await, 1);
    ds.confirm().await.unwrap();

    assert_eq!(
        events(&journal),
        vec![
            "connect",
            "begin",
            "execute DELETE FROM t prepared=true params=0",
            "fill SELECT value FROM t",
            "commit",
            "close",
        ]
    );
    ds.dispose().await;
}

#[tokio::test]
async fn postgres_flavoured_provider_allows_procedures() {
    let (mut ds, _journal) = recording();
    let state = ds
        .prepare_statement("archive", CommandKind::StoredProcedure)
        .unwrap();
    assert_eq!(state, StatementState::Unset);
    assert_eq!(ds.command().unwrap().kind(), CommandKind::StoredProcedure);
    ds.dispose().await;
}
