#![cfg(feature = "mssql")]
//! Runs against a live server named by `SQL_DATASOURCE_MSSQL_ADO`; skipped otherwise.

use sql_datasource::prelude::*;

#[tokio::test]
async fn mssql_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let Ok(ado) = std::env::var("SQL_DATASOURCE_MSSQL_ADO") else {
        eprintln!("SQL_DATASOURCE_MSSQL_ADO not set; skipping");
        return Ok(());
    };
    let mut ds = DataSource::new(EngineKind::Mssql, ado)?;
    assert_eq!(
        ds.command().map(Command::kind),
        Some(CommandKind::StoredProcedure)
    );
    assert!(ds.test_connection().await);

    ds.set_transactional(true)?;
    ds.prepare_statement(
        "CREATE TABLE #people (name NVARCHAR(50) PRIMARY KEY, age INT NULL)",
        CommandKind::Text,
    )?;
    ds.try_execute_for_effect().await?;

    ds.prepare_statement(
        "INSERT INTO #people (name, age) VALUES (@P1, @P2)",
        CommandKind::Text,
    )?;
    ds.bind("Name", "ada")?;
    ds.bind("Age", Option::<i32>::None)?;
    assert_eq!(ds.try_execute_for_effect().await?, 1);

    ds.prepare_statement("SELECT name, age FROM #people", CommandKind::Text)?;
    let row = ds.execute_for_row().await.expect("row");
    assert_eq!(row.get("name").and_then(RowValues::as_text), Some("ada"));
    assert!(row.get("age").is_some_and(RowValues::is_null));

    ds.prepare_statement("sp_who", CommandKind::StoredProcedure)?;
    assert!(ds.has_records().await);

    ds.undo().await?;
    ds.dispose().await;
    Ok(())
}
