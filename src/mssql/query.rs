use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tiberius::Row;

use crate::error::DataSourceError;
use crate::results::{DataSet, ResultSet};
use crate::types::RowValues;

/// One table per result set the batch produced.
///
/// tiberius only exposes column metadata through rows, so a result set without rows
/// becomes a table without column names.
///
/// # Errors
/// Returns `DataSourceError` if a value cannot be decoded.
pub fn build_data_set(results: Vec<Vec<Row>>) -> Result<DataSet, DataSourceError> {
    let mut data_set = DataSet::new();
    for rows in results {
        let mut result_set = ResultSet::with_capacity(rows.len());
        if let Some(first) = rows.first() {
            let column_names: Vec<String> = first
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect();
            result_set.set_column_names(Arc::new(column_names));
        }
        for row in &rows {
            let mut row_values = Vec::with_capacity(row.len());
            for i in 0..row.len() {
                row_values.push(extract_value(row, i)?.unwrap_or(RowValues::Null));
            }
            result_set.add_row_values(row_values);
        }
        data_set.push(result_set);
    }
    Ok(data_set)
}

/// Extract a value from a row at a specific index, trying each supported type in turn.
/// `None` is a SQL NULL.
///
/// # Errors
/// Returns `DataSourceError::ExecutionError` when the column type is not supported.
pub fn extract_value(row: &Row, idx: usize) -> Result<Option<RowValues>, DataSourceError> {
    if let Ok(val) = row.try_get::<i32, _>(idx) {
        return Ok(val.map(|v| RowValues::Int(i64::from(v))));
    }
    if let Ok(val) = row.try_get::<i64, _>(idx) {
        return Ok(val.map(RowValues::Int));
    }
    if let Ok(val) = row.try_get::<i16, _>(idx) {
        return Ok(val.map(|v| RowValues::Int(i64::from(v))));
    }
    if let Ok(val) = row.try_get::<u8, _>(idx) {
        return Ok(val.map(|v| RowValues::Int(i64::from(v))));
    }
    if let Ok(val) = row.try_get::<f32, _>(idx) {
        return Ok(val.map(|v| RowValues::Float(f64::from(v))));
    }
    if let Ok(val) = row.try_get::<f64, _>(idx) {
        return Ok(val.map(RowValues::Float));
    }
    if let Ok(val) = row.try_get::<bool, _>(idx) {
        return Ok(val.map(RowValues::Bool));
    }
    if let Ok(val) = row.try_get::<Decimal, _>(idx) {
        return Ok(val.map(|v| RowValues::Text(v.to_string())));
    }
    if let Ok(val) = row.try_get::<NaiveDateTime, _>(idx) {
        return Ok(val.map(RowValues::Timestamp));
    }
    if let Ok(val) = row.try_get::<&str, _>(idx) {
        return Ok(val.map(|v| RowValues::Text(v.to_string())));
    }
    if let Ok(val) = row.try_get::<&[u8], _>(idx) {
        return Ok(val.map(|v| RowValues::Blob(v.to_vec())));
    }
    Err(DataSourceError::ExecutionError(format!(
        "unsupported SQL Server column type at index {idx}"
    )))
}
