use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::DataSourceError;
use crate::params::{ParamValue, ParameterCollection};

const NAME_PREFIXES: [&str; 3] = [":", "@", "$"];

/// Convert a parameter value to a rusqlite `Value`.
///
/// Timestamps are stored as `YYYY-MM-DD HH:MM:SS[.fff]` text and decimals as their exact
/// text form; opaque objects become JSON text.
#[must_use]
pub fn param_value_to_sqlite_value(value: &ParamValue) -> Value {
    match value {
        ParamValue::Bool(b) => Value::Integer(i64::from(*b)),
        ParamValue::Byte(v) => Value::Integer(i64::from(*v)),
        ParamValue::Int16(v) => Value::Integer(i64::from(*v)),
        ParamValue::Int32(v) => Value::Integer(i64::from(*v)),
        ParamValue::Int64(v) => Value::Integer(*v),
        ParamValue::Double(f) => Value::Real(*f),
        ParamValue::Single(f) => Value::Real(f64::from(*f)),
        ParamValue::Decimal(d) => Value::Text(d.to_string()),
        ParamValue::Text(s) => Value::Text(s.clone()),
        ParamValue::DateTime(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        ParamValue::Object(json) => Value::Text(json.to_string()),
        ParamValue::Binary(bytes) => Value::Blob(bytes.clone()),
        ParamValue::Null => Value::Null,
    }
}

/// Bind every parameter onto `stmt`.
///
/// A parameter whose name appears in the SQL as `:name`, `@name` or `$name` binds there;
/// any other binds at its position in the collection.
///
/// # Errors
/// Returns `DataSourceError::SqliteError` if an index is out of range for the statement.
pub fn bind_parameters(
    stmt: &mut Statement<'_>,
    params: &ParameterCollection,
) -> Result<(), DataSourceError> {
    for (pos, param) in params.iter().enumerate() {
        let index = named_index(stmt, param.name())?.unwrap_or(pos + 1);
        stmt.raw_bind_parameter(index, param_value_to_sqlite_value(param.value()))?;
    }
    Ok(())
}

fn named_index(stmt: &Statement<'_>, name: &str) -> Result<Option<usize>, DataSourceError> {
    if NAME_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return Ok(stmt.parameter_index(name)?);
    }
    for prefix in NAME_PREFIXES {
        if let Some(idx) = stmt.parameter_index(&format!("{prefix}{name}"))? {
            return Ok(Some(idx));
        }
    }
    Ok(None)
}
