#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use sql_datasource::prelude::*;
use tempfile::TempDir;

async fn people_db(dir: &TempDir) -> Result<DataSource, DataSourceError> {
    let path = dir.path().join("people.db");
    let mut ds = DataSource::new(EngineKind::Sqlite, path.to_string_lossy())?;
    ds.prepare_statement(
        "CREATE TABLE people (
            name TEXT PRIMARY KEY,
            age INTEGER,
            joined TEXT,
            balance TEXT,
            prefs TEXT,
            avatar BLOB
        )",
        CommandKind::Text,
    )?;
    ds.try_execute_for_effect().await?;
    Ok(ds)
}

#[tokio::test]
async fn rebinding_a_name_updates_the_value() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut ds = people_db(&dir).await?;

    ds.prepare_statement(
        "INSERT INTO people (name, age) VALUES (:Name, :Age)",
        CommandKind::Text,
    )?;
    ds.bind("Name", "ada")?;
    ds.bind("Age", 30_i32)?;
    ds.bind("Age", 31_i32)?;
    let params = ds.command().unwrap().parameters();
    assert_eq!(params.len(), 2);
    assert_eq!(params.get("Age").unwrap().value(), &ParamValue::Int32(31));
    assert_eq!(ds.try_execute_for_effect().await?, 1);

    // Bindings are cleared after every effect.
    assert!(ds.command().unwrap().parameters().is_empty());

    ds.prepare_statement("SELECT age FROM people WHERE name = ?", CommandKind::Text)?;
    ds.bind("Name", "ada")?;
    assert_eq!(ds.try_execute_for_scalar().await?, Some(RowValues::Int(31)));

    ds.dispose().await;
    Ok(())
}

#[tokio::test]
async fn semantic_types_reach_the_table() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut ds = people_db(&dir).await?;
    let joined = NaiveDate::from_ymd_opt(2021, 6, 1)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap();

    ds.prepare_statement(
        "INSERT INTO people (name, age, joined, balance, prefs, avatar)
         VALUES (@Name, @Age, @Joined, @Balance, @Prefs, @Avatar)",
        CommandKind::Text,
    )?;
    ds.bind("Name", "grace")?;
    ds.bind("Age", Option::<i32>::None)?;
    ds.bind("Joined", joined)?;
    ds.bind("Balance", Decimal::new(12050, 2))?;
    ds.bind("Prefs", json!({"theme": "dark"}))?;
    ds.bind("Avatar", vec![1_u8, 2, 3])?;
    assert_eq!(ds.execute_for_effect().await, 1);

    ds.prepare_statement(
        "SELECT name, age, joined, balance, prefs, avatar FROM people",
        CommandKind::Text,
    )?;
    let row = ds.execute_for_row().await.expect("one row");
    assert_eq!(row.get("NAME").and_then(RowValues::as_text), Some("grace"));
    assert!(row.get("age").unwrap().is_null());
    assert_eq!(
        row.get("joined").and_then(RowValues::as_text),
        Some("2021-06-01 09:15:00")
    );
    assert_eq!(row.get("balance").and_then(RowValues::as_text), Some("120.50"));
    assert_eq!(
        row.get("prefs").and_then(RowValues::as_text),
        Some(r#"{"theme":"dark"}"#)
    );
    assert_eq!(row.get("avatar"), Some(&RowValues::Blob(vec![1, 2, 3])));

    ds.dispose().await;
    Ok(())
}

#[tokio::test]
async fn positional_binding_follows_bind_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut ds = people_db(&dir).await?;

    ds.prepare_statement("INSERT INTO people (name, age) VALUES (?, ?)", CommandKind::Text)?;
    ds.bind("first", "linus")?;
    ds.bind("second", 54_i64)?;
    assert_eq!(ds.execute_for_effect().await, 1);

    ds.prepare_statement("SELECT name, age FROM people", CommandKind::Text)?;
    let table = ds.execute_for_table().await.expect("table");
    assert_eq!(table.results.len(), 1);
    assert_eq!(table.results[0].get("age"), Some(&RowValues::Int(54)));

    ds.dispose().await;
    Ok(())
}

#[tokio::test]
async fn empty_parameter_name_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let mut ds = DataSource::new(EngineKind::Sqlite, dir.path().join("x.db").to_string_lossy())?;
    let err = ds.bind("", 1_i32).unwrap_err();
    assert!(matches!(err, DataSourceError::ParameterError(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    ds.dispose().await;
    Ok(())
}
