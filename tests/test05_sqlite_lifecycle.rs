#![cfg(feature = "sqlite")]

use sql_datasource::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn dispose_is_idempotent_and_final() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut ds = DataSource::new(EngineKind::Sqlite, dir.path().join("a.db").to_string_lossy())?;
    assert!(ds.test_connection().await);

    ds.dispose().await;
    ds.dispose().await;
    assert!(ds.is_disposed());
    assert!(ds.command().is_none());
    assert_eq!(ds.connection_state(), ConnectionState::Closed);

    let err = ds.prepare_statement("SELECT 1", CommandKind::Text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert!(ds.bind("x", 1_i32).is_err());
    assert_eq!(ds.execute_for_effect().await, EFFECT_FAILED);
    assert!(!ds.test_connection().await);
    Ok(())
}

#[tokio::test]
async fn unreachable_database_probes_false() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let missing = dir.path().join("no_such_dir").join("x.db");
    let mut ds = DataSource::new(EngineKind::Sqlite, missing.to_string_lossy())?;

    assert!(!ds.test_connection().await);
    assert_eq!(ds.connection_state(), ConnectionState::Closed);

    ds.prepare_statement("SELECT 1", CommandKind::Text)?;
    assert_eq!(ds.execute_for_scalar().await, None);
    assert!(ds.execute_for_data_set().await.is_none());
    assert_eq!(ds.record_count().await, 0);
    assert!(!ds.has_records().await);

    let err = ds.try_execute_for_scalar().await.unwrap_err();
    assert!(err.is_backend_failure());
    ds.dispose().await;
    Ok(())
}

#[tokio::test]
async fn reads_shape_their_results() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut ds = DataSource::new(EngineKind::Sqlite, dir.path().join("r.db").to_string_lossy())?;
    ds.prepare_statement("CREATE TABLE t (id INTEGER, label TEXT)", CommandKind::Text)?;
    ds.try_execute_for_effect().await?;

    // DML fills no table.
    ds.prepare_statement("INSERT INTO t VALUES (1, 'one'), (2, 'two')", CommandKind::Text)?;
    assert!(ds.execute_for_table().await.is_none());

    ds.prepare_statement("SELECT id, label FROM t ORDER BY id", CommandKind::Text)?;
    let data_set = ds.try_execute_for_data_set().await?;
    assert_eq!(data_set.table_count(), 1);
    let table = data_set.first_table().unwrap();
    assert_eq!(table.results.len(), 2);
    assert_eq!(
        table.get_column_names().map(|c| c.as_slice()),
        Some(&["id".to_string(), "label".to_string()][..])
    );
    assert!(ds.has_records().await);

    ds.prepare_statement("SELECT id FROM t WHERE id > 10", CommandKind::Text)?;
    assert_eq!(ds.try_execute_for_scalar().await?, None);
    assert_eq!(
        ds.execute_for_scalar().await,
        Some(RowValues::Text(String::new()))
    );
    assert!(ds.execute_for_row().await.is_none());
    assert!(!ds.has_records().await);

    ds.dispose().await;
    Ok(())
}

#[tokio::test]
async fn scope_disposes_after_the_body() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let opts = DataSourceOptions::new(
        EngineKind::Sqlite,
        dir.path().join("s.db").to_string_lossy().into_owned(),
    );

    let answer = DataSource::scope(opts.clone(), |ds| {
        Box::pin(async move {
            ds.prepare_statement("SELECT 40 + 2", CommandKind::Text)?;
            ds.try_execute_for_scalar().await
        })
    })
    .await??;
    assert_eq!(answer, Some(RowValues::Int(42)));

    // The body's own error comes back untouched.
    let failed = DataSource::scope(opts, |ds| {
        Box::pin(async move { ds.prepare_statement("", CommandKind::Text) })
    })
    .await?;
    assert!(failed.is_err());
    Ok(())
}

#[tokio::test]
async fn construction_validates_configuration() {
    let err = DataSource::new(EngineKind::Sqlite, "  ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = DataSource::from_provider_name("oracle", "x.db").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let ds = DataSource::from_provider_name("rusqlite", "x.db").unwrap();
    assert_eq!(ds.engine(), EngineKind::Sqlite);
    assert_eq!(ds.connection_string(), "x.db");
    assert!(!ds.is_transactional());
}

#[tokio::test]
async fn options_carry_mode_and_strategy() -> Result<(), Box<dyn std::error::Error>> {
    let opts = DataSourceOptions::from_json(
        r#"{"engine":"sqlite","connection_string":"x.db","transactional":true,"sequence_strategy":"read_then_increment"}"#,
    )?;
    let mut ds = DataSource::from_options(opts)?;
    assert!(ds.is_transactional());
    assert_eq!(ds.sequence_strategy(), SequenceStrategy::ReadThenIncrement);
    ds.set_sequence_strategy(SequenceStrategy::Atomic);
    assert_eq!(ds.sequence_strategy(), SequenceStrategy::Atomic);
    ds.dispose().await;
    Ok(())
}
