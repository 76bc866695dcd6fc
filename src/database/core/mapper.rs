//! Record-type to table bindings
//!
//! A record type declares its table and column order through [`Record`].
//! Binding it into a [`MetaData`] checks the columns against the registered
//! table; only bound types can be read or written through a `RecordStore`.

use std::any::{type_name, TypeId};

use rusqlite::types::ToSql;
use rusqlite::Row;
use serde::Serialize;

use super::error::{Result, SchemaError};
use super::metadata::MetaData;

/// A typed row of one table
pub trait Record: Sized + 'static {
    /// Table the record is stored in
    const TABLE: &'static str;

    /// Columns in the order used by [`Record::values`] and [`Record::from_row`]
    const COLUMNS: &'static [&'static str];

    /// Build a record from a row selected in `COLUMNS` order
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Column values in `COLUMNS` order; `NULL` values are left to the database
    fn values(&self) -> Vec<&dyn ToSql>;
}

/// Association of a record type with a registered table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub record: &'static str,
    pub table: String,
    pub columns: Vec<&'static str>,
}

/// Result of a bind request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BindOutcome {
    /// The binding was created
    Bound,
    /// An identical binding already existed
    AlreadyBound,
    /// The type is already bound differently; the existing binding is kept
    Conflicting { existing_table: String },
}

impl MetaData {
    /// Bind a record type to its table.
    ///
    /// Existing bindings are never replaced: an identical one yields
    /// `AlreadyBound`, a different one yields `Conflicting`.
    pub fn bind<T: Record>(&mut self) -> Result<BindOutcome> {
        if let Some(existing) = self.bindings.get(&TypeId::of::<T>()) {
            if existing.table == T::TABLE && existing.columns == T::COLUMNS {
                return Ok(BindOutcome::AlreadyBound);
            }
            return Ok(BindOutcome::Conflicting {
                existing_table: existing.table.clone(),
            });
        }

        let table = self
            .table(T::TABLE)
            .ok_or_else(|| SchemaError::UnknownTable(T::TABLE.to_string()))?;

        if let Some(missing) = T::COLUMNS.iter().find(|c| table.get_column(c).is_none()) {
            return Err(SchemaError::Binding {
                record: type_name::<T>(),
                table: T::TABLE.to_string(),
                detail: format!("table has no column '{}'", missing),
            });
        }

        self.bindings.insert(
            TypeId::of::<T>(),
            Binding {
                record: type_name::<T>(),
                table: T::TABLE.to_string(),
                columns: T::COLUMNS.to_vec(),
            },
        );
        Ok(BindOutcome::Bound)
    }

    pub fn is_bound<T: Record>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// The binding for `T`, or `Unbound` if it has none
    pub fn binding<T: Record>(&self) -> Result<&Binding> {
        self.bindings
            .get(&TypeId::of::<T>())
            .ok_or(SchemaError::Unbound(type_name::<T>()))
    }

    /// Number of record types bound
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}
