//! Typed row access for bound record types

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::Connection;
use std::any::type_name;

use super::backend::Dialect;
use super::error::{Result, SchemaError};
use super::mapper::Record;
use super::metadata::MetaData;

/// Reads and writes records through their bindings
///
/// Every operation first resolves the record type's binding in the registry;
/// types that were never bound are refused with `SchemaError::Unbound`.
pub struct RecordStore<'a> {
    conn: &'a Connection,
    metadata: &'a MetaData,
}

fn quote(ident: &str) -> String {
    Dialect::Sqlite.quote(ident)
}

fn is_null(value: &ToSqlOutput<'_>) -> bool {
    matches!(
        value,
        ToSqlOutput::Owned(Value::Null) | ToSqlOutput::Borrowed(ValueRef::Null)
    )
}

impl<'a> RecordStore<'a> {
    pub fn new(conn: &'a Connection, metadata: &'a MetaData) -> Self {
        Self { conn, metadata }
    }

    /// Insert a record and return the rowid assigned to it.
    ///
    /// `NULL` values are omitted so surrogate keys and column defaults are
    /// filled in by the database.
    pub fn insert<T: Record>(&self, record: &T) -> Result<i64> {
        let binding = self.metadata.binding::<T>()?;
        let values = record.values();
        if values.len() != T::COLUMNS.len() {
            return Err(SchemaError::Binding {
                record: type_name::<T>(),
                table: binding.table.clone(),
                detail: format!(
                    "record produced {} values for {} columns",
                    values.len(),
                    T::COLUMNS.len()
                ),
            });
        }

        let mut columns = Vec::new();
        let mut params = Vec::new();
        for (column, value) in T::COLUMNS.iter().zip(values) {
            let output = value.to_sql()?;
            if is_null(&output) {
                continue;
            }
            columns.push(quote(column));
            params.push(output);
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote(&binding.table))
        } else {
            let placeholders = (1..=columns.len())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote(&binding.table),
                columns.join(", "),
                placeholders
            )
        };

        self.conn
            .execute(&sql, rusqlite::params_from_iter(params.iter()))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Load every row of the record's table
    pub fn all<T: Record>(&self) -> Result<Vec<T>> {
        let binding = self.metadata.binding::<T>()?;
        let sql = format!(
            "SELECT {} FROM {}",
            Self::column_list::<T>(),
            quote(&binding.table)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], |row| T::from_row(row))?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(records)
    }

    /// Load the rows whose `column` equals `value`
    pub fn find_by<T: Record, V: ToSql>(&self, column: &str, value: V) -> Result<Vec<T>> {
        let binding = self.metadata.binding::<T>()?;
        if !T::COLUMNS.iter().any(|c| *c == column) {
            return Err(SchemaError::Binding {
                record: type_name::<T>(),
                table: binding.table.clone(),
                detail: format!("no bound column '{}'", column),
            });
        }

        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            Self::column_list::<T>(),
            quote(&binding.table),
            quote(column)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([value], |row| T::from_row(row))?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(records)
    }

    /// Delete the row holding this record's primary key.
    ///
    /// Returns the number of rows removed (0 or 1); dependent rows go with it
    /// where the schema cascades.
    pub fn delete<T: Record>(&self, record: &T) -> Result<usize> {
        let binding = self.metadata.binding::<T>()?;
        let table = self
            .metadata
            .table(&binding.table)
            .ok_or_else(|| SchemaError::UnknownTable(binding.table.clone()))?;

        let values = record.values();
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        for key in table.primary_key() {
            let pos = T::COLUMNS
                .iter()
                .position(|c| *c == key)
                .ok_or_else(|| SchemaError::Binding {
                    record: type_name::<T>(),
                    table: binding.table.clone(),
                    detail: format!("primary key column '{}' is not bound", key),
                })?;
            let value = values.get(pos).ok_or_else(|| SchemaError::Binding {
                record: type_name::<T>(),
                table: binding.table.clone(),
                detail: format!("no value for primary key column '{}'", key),
            })?;
            conditions.push(format!("{} = ?{}", quote(key), conditions.len() + 1));
            params.push(*value);
        }

        let sql = format!(
            "DELETE FROM {} WHERE {}",
            quote(&binding.table),
            conditions.join(" AND ")
        );
        Ok(self
            .conn
            .execute(&sql, rusqlite::params_from_iter(params))?)
    }

    /// Number of rows in the record's table
    pub fn count<T: Record>(&self) -> Result<u64> {
        let binding = self.metadata.binding::<T>()?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote(&binding.table));
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    fn column_list<T: Record>() -> String {
        T::COLUMNS
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
