//! Database connection management
//!
//! This module provides the SQLite connection wrapper and the `SchemaTarget`
//! trait that the schema initializer drives.

use rusqlite::{Connection, OpenFlags};

use super::error::{Result, SchemaError};

/// A column as it exists in the live database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingColumn {
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

/// Anything the schema can be created against
///
/// The backend name selects the capability entry (key width, dialect,
/// decimal handling) used to render DDL for this target.
pub trait SchemaTarget {
    /// Backend identity, e.g. `sqlite` or `mysql`
    fn backend_name(&self) -> &str;

    /// Check if a table exists
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Columns of an existing table
    fn existing_columns(&self, table: &str) -> Result<Vec<ExistingColumn>>;

    /// Run DDL statements as one unit
    fn apply_ddl(&self, statements: &[String]) -> Result<()>;
}

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling both file-based and in-memory databases with consistent
/// configuration and error handling.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p).map_err(|e| {
                SchemaError::Connection(format!("Failed to open database at '{}': {}", p, e))
            })?,
            None => Connection::open_in_memory().map_err(|e| {
                SchemaError::Connection(format!("Failed to create in-memory database: {}", e))
            })?,
        };

        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Open a database at the specified path (convenience method)
    pub fn open_path(path: &str) -> Result<Self> {
        Self::open(Some(path))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None)
    }

    /// Open an existing database file without write access
    pub fn open_read_only(path: &str) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |e| SchemaError::Connection(format!("Failed to open database at '{}': {}", path, e)),
        )?;
        conn.execute("PRAGMA foreign_keys=ON", [])?;
        Ok(DatabaseConn { conn })
    }

    /// Wrap an already-open connection
    pub fn from_connection(conn: Connection) -> Result<Self> {
        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Configure the database for the dashboard's use
    fn configure(&self) -> Result<()> {
        // Cascading deletes rely on foreign key enforcement
        self.conn.execute("PRAGMA foreign_keys=ON", [])?;

        // Wait on concurrent DDL from other processes instead of failing at once
        self.conn
            .busy_timeout(std::time::Duration::from_secs(5))?;

        Ok(())
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Execute a SQL statement with parameters
    pub fn execute_with_params<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!(
            "SELECT COUNT(*) FROM \"{}\"",
            table_name.replace('"', "\"\"")
        );
        let count: u64 = self.conn.query_row(&query, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Names of all indexes on a table
    pub fn index_names(&self, table_name: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='index' AND tbl_name=?1 ORDER BY name",
        )?;
        let names = stmt
            .query_map([table_name], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }
}

impl SchemaTarget for DatabaseConn {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn existing_columns(&self, table: &str) -> Result<Vec<ExistingColumn>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ExistingColumn {
                    name: row.get(0)?,
                    declared_type: row.get(1)?,
                    not_null: row.get::<_, i32>(2)? != 0,
                    primary_key: row.get::<_, i32>(3)? > 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    fn apply_ddl(&self, statements: &[String]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for sql in statements {
            tx.execute(sql, [])?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let enabled: i32 = db
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_existing_columns() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (a INTEGER NOT NULL, b VARCHAR(10), PRIMARY KEY (a))")
            .unwrap();

        let columns = db.existing_columns("t").unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "a");
        assert!(columns[0].primary_key);
        assert!(columns[0].not_null);
        assert_eq!(columns[1].declared_type, "VARCHAR(10)");
        assert!(!columns[1].primary_key);
    }

    #[test]
    fn test_apply_ddl_is_atomic() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let statements = vec![
            "CREATE TABLE ok_table (id INTEGER PRIMARY KEY)".to_string(),
            "CREATE TABLE broken (".to_string(),
        ];
        assert!(db.apply_ddl(&statements).is_err());
        assert!(!db.table_exists("ok_table").unwrap());
    }

    #[test]
    fn test_table_count() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();
        db.execute("INSERT INTO test_table (id) VALUES (1), (2), (3)")
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
    }

    #[test]
    fn test_read_only_rejects_ddl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.sqlite3");
        let path = path.to_str().unwrap();
        DatabaseConn::open_path(path)
            .unwrap()
            .execute("CREATE TABLE seed (id INTEGER PRIMARY KEY)")
            .unwrap();

        let db = DatabaseConn::open_read_only(path).unwrap();
        let err = db
            .apply_ddl(&["CREATE TABLE t (id INTEGER PRIMARY KEY)".to_string()])
            .unwrap_err();
        assert!(err.is_connection());
    }
}
