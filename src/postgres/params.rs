use std::error::Error;

use rust_decimal::Decimal;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::params::ParamValue;

type BoxedError = Box<dyn Error + Sync + Send>;

/// Parameters are encoded against the type the server inferred for the placeholder.
/// Integers and floats widen or narrow to the target column type (failing on overflow);
/// everything else must match the target type.
impl ToSql for ParamValue {
    fn to_sql(&self, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, BoxedError> {
        match self {
            ParamValue::Null => Ok(IsNull::Yes),
            ParamValue::Bool(b) => b.to_sql_checked(ty, out),
            ParamValue::Byte(v) => integer_to_sql(i64::from(*v), ty, out),
            ParamValue::Int16(v) => integer_to_sql(i64::from(*v), ty, out),
            ParamValue::Int32(v) => integer_to_sql(i64::from(*v), ty, out),
            ParamValue::Int64(v) => integer_to_sql(*v, ty, out),
            ParamValue::Double(f) => float_to_sql(*f, ty, out),
            ParamValue::Single(f) => float_to_sql(f64::from(*f), ty, out),
            ParamValue::Decimal(d) => d.to_sql_checked(ty, out),
            ParamValue::Text(s) => s.as_str().to_sql_checked(ty, out),
            ParamValue::DateTime(dt) => dt.to_sql_checked(ty, out),
            ParamValue::Object(json) => {
                if matches!(*ty, Type::JSON | Type::JSONB) {
                    json.to_sql_checked(ty, out)
                } else {
                    json.to_string().to_sql_checked(ty, out)
                }
            }
            ParamValue::Binary(bytes) => bytes.as_slice().to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn integer_to_sql(v: i64, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, BoxedError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::NUMERIC => Decimal::from(v).to_sql(ty, out),
        _ => v.to_sql_checked(ty, out),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_sql(v: f64, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, BoxedError> {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from(v)?.to_sql(ty, out),
        _ => v.to_sql_checked(ty, out),
    }
}
