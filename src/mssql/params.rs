use tiberius::Query;

use crate::command::{Command, CommandKind};
use crate::params::{DbType, ParamValue, Parameter};
use crate::types::EngineKind;

/// Literal text, or `EXEC name @Param = @P1, ..` for a stored procedure.
pub fn render_sql(command: &Command) -> String {
    match command.kind() {
        CommandKind::Text => command.text().to_owned(),
        CommandKind::StoredProcedure => {
            let args: Vec<String> = command
                .parameters()
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    format!(
                        "@{} = {}",
                        p.name().trim_start_matches('@'),
                        EngineKind::Mssql.placeholder(i + 1)
                    )
                })
                .collect();
            if args.is_empty() {
                format!("EXEC {}", command.text())
            } else {
                format!("EXEC {} {}", command.text(), args.join(", "))
            }
        }
    }
}

/// Query with every parameter of `command` bound positionally.
pub fn bind_query(command: &Command) -> Query<'static> {
    let mut query = Query::new(render_sql(command));
    for param in command.parameters() {
        bind_parameter(&mut query, param);
    }
    query
}

fn bind_parameter(query: &mut Query<'static>, param: &Parameter) {
    match param.value() {
        ParamValue::Bool(b) => query.bind(*b),
        ParamValue::Byte(v) => query.bind(*v),
        ParamValue::Int16(v) => query.bind(*v),
        ParamValue::Int32(v) => query.bind(*v),
        ParamValue::Int64(v) => query.bind(*v),
        ParamValue::Single(f) => query.bind(*f),
        ParamValue::Double(f) => query.bind(*f),
        ParamValue::Decimal(d) => query.bind(*d),
        ParamValue::Text(s) => query.bind(s.clone()),
        ParamValue::DateTime(dt) => query.bind(*dt),
        ParamValue::Object(json) => query.bind(json.to_string()),
        ParamValue::Binary(bytes) => query.bind(bytes.clone()),
        ParamValue::Null => bind_null(query, param.db_type()),
    }
}

/// Typed null so the server sees the declared parameter type.
fn bind_null(query: &mut Query<'static>, db_type: DbType) {
    match db_type {
        DbType::Boolean => query.bind(Option::<bool>::None),
        DbType::Byte => query.bind(Option::<u8>::None),
        DbType::Int16 => query.bind(Option::<i16>::None),
        DbType::Int32 => query.bind(Option::<i32>::None),
        DbType::Int64 => query.bind(Option::<i64>::None),
        DbType::Single => query.bind(Option::<f32>::None),
        DbType::Double => query.bind(Option::<f64>::None),
        DbType::Currency => query.bind(Option::<rust_decimal::Decimal>::None),
        DbType::DateTime => query.bind(Option::<chrono::NaiveDateTime>::None),
        DbType::Binary => query.bind(Option::<Vec<u8>>::None),
        DbType::String | DbType::Object => query.bind(Option::<String>::None),
    }
}
