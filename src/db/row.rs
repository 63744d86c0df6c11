//! Row module - typed, by-name access to the current row of a query

use crate::error::{DbError, Result};
use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, ValueRef};
use rusqlite::Row;
use serde_json::{Map, Number, Value};

/// Read-only view of the row a cursor is positioned on.
///
/// Handed to row mappers by reference; it borrows the cursor and so cannot be
/// kept past the mapper call.
pub struct TableRow<'a, 'stmt> {
    row: &'a Row<'stmt>,
}

impl<'a, 'stmt> TableRow<'a, 'stmt> {
    pub(crate) fn new(row: &'a Row<'stmt>) -> Self {
        TableRow { row }
    }

    /// Read `column` as any `FromSql` type
    ///
    /// # Arguments
    /// * `column` - Column name as it appears in the result set
    ///
    /// # Returns
    /// The converted value, or a `Mapping` error naming the column when it is
    /// missing or holds an incompatible type
    pub fn get<V: FromSql>(&self, column: &str) -> Result<V> {
        self.row
            .get(column)
            .map_err(|e| DbError::column(column, e))
    }

    /// Read a nullable column; SQL `NULL` becomes `None`
    pub fn get_optional<V: FromSql>(&self, column: &str) -> Result<Option<V>> {
        self.get(column)
    }

    pub fn get_int(&self, column: &str) -> Result<i32> {
        self.get(column)
    }

    pub fn get_long(&self, column: &str) -> Result<i64> {
        self.get(column)
    }

    pub fn get_real(&self, column: &str) -> Result<f64> {
        self.get(column)
    }

    pub fn get_string(&self, column: &str) -> Result<String> {
        self.get(column)
    }

    pub fn get_bool(&self, column: &str) -> Result<bool> {
        self.get(column)
    }

    pub fn get_date(&self, column: &str) -> Result<NaiveDate> {
        self.get(column)
    }

    pub fn get_datetime(&self, column: &str) -> Result<NaiveDateTime> {
        self.get(column)
    }

    pub fn get_blob(&self, column: &str) -> Result<Vec<u8>> {
        self.get(column)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.row
            .as_ref()
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Render the whole row as a JSON object keyed by column name
    ///
    /// # Returns
    /// JSON object with integers and reals as numbers, text as strings,
    /// blobs as base64 strings and `NULL` as null
    pub fn to_json(&self) -> Result<Value> {
        let mut map = Map::new();
        for (i, name) in self.column_names().into_iter().enumerate() {
            let value = self
                .row
                .get_ref(i)
                .map_err(|e| DbError::column(&name, e))?;
            map.insert(name, sqlite_to_json(value));
        }
        Ok(Value::Object(map))
    }
}

/// Convert a SQLite value to JSON; blobs become base64 strings
fn sqlite_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(base64::engine::general_purpose::STANDARD.encode(b)),
    }
}
