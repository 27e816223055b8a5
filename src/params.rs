//! Typed parameter binding.
//!
//! A [`Parameter`] is a provider-neutral descriptor: name, declared [`DbType`], size and
//! value. [`ParameterCollection`] keeps them in bind order with unique names; binding an
//! existing name overwrites the value only.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::error::DataSourceError;

/// Declared semantic type of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbType {
    Boolean,
    Byte,
    Binary,
    DateTime,
    /// Fixed-point decimal.
    Currency,
    Double,
    Single,
    Int32,
    Int64,
    /// Opaque value, carried as JSON.
    Object,
    Int16,
    String,
}

/// Value held by a [`Parameter`]. `Null` is the database-null marker.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Byte(u8),
    Binary(Vec<u8>),
    DateTime(NaiveDateTime),
    Decimal(Decimal),
    Double(f64),
    Single(f32),
    Int32(i32),
    Int64(i64),
    Object(JsonValue),
    Int16(i16),
    Text(String),
    Null,
}

impl ParamValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer view used by backends that bind every integral type the same way.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Byte(v) => Some(i64::from(*v)),
            ParamValue::Int16(v) => Some(i64::from(*v)),
            ParamValue::Int32(v) => Some(i64::from(*v)),
            ParamValue::Int64(v) => Some(*v),
            _ => None,
        }
    }
}

/// Rust types that can be bound as a parameter.
///
/// `Option<T>` binds `None` as database null while keeping `T`'s declared type.
pub trait ToParam {
    fn db_type() -> DbType;
    fn into_param_value(self) -> ParamValue;
}

macro_rules! impl_to_param {
    ($ty:ty, $db:ident, |$v:ident| $conv:expr) => {
        impl ToParam for $ty {
            fn db_type() -> DbType {
                DbType::$db
            }
            fn into_param_value(self) -> ParamValue {
                let $v = self;
                $conv
            }
        }
    };
}

impl_to_param!(bool, Boolean, |v| ParamValue::Bool(v));
impl_to_param!(u8, Byte, |v| ParamValue::Byte(v));
impl_to_param!(Vec<u8>, Binary, |v| ParamValue::Binary(v));
impl_to_param!(&[u8], Binary, |v| ParamValue::Binary(v.to_vec()));
impl_to_param!(NaiveDateTime, DateTime, |v| ParamValue::DateTime(v));
impl_to_param!(Decimal, Currency, |v| ParamValue::Decimal(v));
impl_to_param!(f64, Double, |v| ParamValue::Double(v));
impl_to_param!(f32, Single, |v| ParamValue::Single(v));
impl_to_param!(i32, Int32, |v| ParamValue::Int32(v));
impl_to_param!(i64, Int64, |v| ParamValue::Int64(v));
impl_to_param!(JsonValue, Object, |v| if v.is_null() {
    ParamValue::Null
} else {
    ParamValue::Object(v)
});
impl_to_param!(i16, Int16, |v| ParamValue::Int16(v));
impl_to_param!(String, String, |v| ParamValue::Text(v));
impl_to_param!(&str, String, |v| ParamValue::Text(v.to_owned()));

impl<T: ToParam> ToParam for Option<T> {
    fn db_type() -> DbType {
        T::db_type()
    }

    fn into_param_value(self) -> ParamValue {
        self.map_or(ParamValue::Null, ToParam::into_param_value)
    }
}

/// A bound input parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    db_type: DbType,
    size: usize,
    value: ParamValue,
}

impl Parameter {
    fn new(name: &str, db_type: DbType, value: ParamValue) -> Self {
        let size = match &value {
            ParamValue::Text(s) => s.chars().count(),
            ParamValue::Null => 1,
            _ => 0,
        };
        Self {
            name: name.to_owned(),
            db_type,
            size,
            value,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn db_type(&self) -> DbType {
        self.db_type
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn value(&self) -> &ParamValue {
        &self.value
    }
}

/// Ordered parameters, unique by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterCollection {
    items: Vec<Parameter>,
}

impl ParameterCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter or, when `name` is already bound, overwrite its value.
    ///
    /// The declared type and size of an existing parameter never change.
    ///
    /// # Errors
    /// Returns `DataSourceError::ParameterError` if `name` is empty.
    pub fn bind<V: ToParam>(&mut self, name: &str, value: V) -> Result<(), DataSourceError> {
        if name.is_empty() {
            return Err(DataSourceError::ParameterError(
                "parameter name must not be empty".into(),
            ));
        }
        let db_type = V::db_type();
        let value = value.into_param_value();
        match self.index_of(name) {
            Some(idx) => self.items[idx].value = value,
            None => self.items.push(Parameter::new(name, db_type, value)),
        }
        Ok(())
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|p| p.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.index_of(name).map(|idx| &self.items[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a ParameterCollection {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
