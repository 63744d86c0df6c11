//! Params module - positional binding of values into a prepared statement

use crate::error::{DbError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{Null, Value as SqlValue};
use rusqlite::{Statement, ToSql};
use serde_json::Value;

/// Binds values to the `?` placeholders of one statement, left to right.
///
/// Every `bind*` call fills the next placeholder; there is no way to skip or
/// revisit one. The binder borrows the statement, so it cannot outlive the
/// call that prepared it.
pub struct ParamBinder<'s, 'conn> {
    stmt: &'s mut Statement<'conn>,
    position: usize,
}

impl<'s, 'conn> ParamBinder<'s, 'conn> {
    pub(crate) fn new(stmt: &'s mut Statement<'conn>) -> Self {
        ParamBinder { stmt, position: 0 }
    }

    /// Bind any `ToSql` value at the next position
    ///
    /// # Arguments
    /// * `value` - Value for the next `?` placeholder
    ///
    /// # Returns
    /// The binder, for chaining; a `Binding` error carrying the 1-based
    /// position if the driver rejects the value or no placeholder is left
    pub fn bind<V: ToSql>(&mut self, value: V) -> Result<&mut Self> {
        let position = self.position + 1;
        self.stmt
            .raw_bind_parameter(position, value)
            .map_err(|source| DbError::Binding { position, source })?;
        self.position = position;
        Ok(self)
    }

    pub fn bind_int(&mut self, value: i32) -> Result<&mut Self> {
        self.bind(value)
    }

    pub fn bind_long(&mut self, value: i64) -> Result<&mut Self> {
        self.bind(value)
    }

    pub fn bind_real(&mut self, value: f64) -> Result<&mut Self> {
        self.bind(value)
    }

    pub fn bind_text(&mut self, value: &str) -> Result<&mut Self> {
        self.bind(value)
    }

    pub fn bind_bool(&mut self, value: bool) -> Result<&mut Self> {
        self.bind(value)
    }

    /// Dates are stored as `YYYY-MM-DD` text
    pub fn bind_date(&mut self, value: NaiveDate) -> Result<&mut Self> {
        self.bind(value)
    }

    pub fn bind_datetime(&mut self, value: NaiveDateTime) -> Result<&mut Self> {
        self.bind(value)
    }

    pub fn bind_blob(&mut self, value: &[u8]) -> Result<&mut Self> {
        self.bind(value)
    }

    pub fn bind_null(&mut self) -> Result<&mut Self> {
        self.bind(Null)
    }

    /// Bind a JSON value; arrays and objects are stored as JSON text
    pub fn bind_json(&mut self, value: &Value) -> Result<&mut Self> {
        self.bind(json_to_sql(value))
    }

    /// Bind each JSON value in order
    pub fn bind_all(&mut self, values: &[Value]) -> Result<&mut Self> {
        for value in values {
            self.bind_json(value)?;
        }
        Ok(self)
    }

    /// Number of values bound so far
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Convert a JSON value to an owned SQLite value
pub fn json_to_sql(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        // Arrays and objects round-trip as JSON text
        Value::Array(_) | Value::Object(_) => SqlValue::Text(v.to_string()),
    }
}
