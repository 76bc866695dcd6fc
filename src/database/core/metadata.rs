//! In-memory table registry
//!
//! `MetaData` accumulates table definitions and record bindings. Nothing touches
//! the database until [`MetaData::create_all`] renders the DDL for the target's
//! dialect and creates whatever is missing.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::backend::{BackendCapabilities, Dialect, KeyWidth};
use super::connection::{ExistingColumn, SchemaTarget};
use super::error::{Result, SchemaError};
use super::mapper::Binding;

/// Column types understood by the schema layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInteger,
    Varchar(u32),
    Text,
    Numeric { precision: u8, scale: u8 },
    DateTime,
    /// Closed set of string values, in declaration order
    Enum(Vec<String>),
}

impl ColumnType {
    /// Integer type used for key columns of the given width
    pub fn key_integer(width: KeyWidth) -> Self {
        match width {
            KeyWidth::Standard => ColumnType::Integer,
            KeyWidth::Wide => ColumnType::BigInteger,
        }
    }

    /// Enumerated type over `values`, dropping repeats but keeping order
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = Vec::new();
        for value in values {
            let value = value.into();
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
        ColumnType::Enum(seen)
    }

    /// Render the type for a dialect
    pub fn render(&self, dialect: Dialect) -> String {
        match self {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Varchar(len) => format!("VARCHAR({})", len),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Numeric { precision, scale } => {
                format!("NUMERIC({}, {})", precision, scale)
            }
            ColumnType::DateTime => match dialect {
                Dialect::Postgresql => "TIMESTAMP WITHOUT TIME ZONE".to_string(),
                Dialect::Sqlite | Dialect::Mysql => "DATETIME".to_string(),
            },
            ColumnType::Enum(values) => {
                if dialect.native_enum() {
                    format!("ENUM({})", quoted_list(values))
                } else {
                    let width = values.iter().map(|v| v.len()).max().unwrap_or(1).max(1);
                    format!("VARCHAR({})", width)
                }
            }
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric { .. })
    }
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reference from a column to a parent table's column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub on_delete_cascade: bool,
}

/// A table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    /// A nullable, non-key column
    pub fn new(name: &str, ty: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            nullable: true,
            primary_key: false,
            foreign_key: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Make this column part of the table's primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.to_string(),
            column: column.to_string(),
            on_delete_cascade: false,
        });
        self
    }

    /// Delete child rows along with the referenced parent row
    pub fn on_delete_cascade(mut self) -> Self {
        if let Some(fk) = self.foreign_key.as_mut() {
            fk.on_delete_cascade = true;
        }
        self
    }
}

/// A named index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    pub fn unique(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: true,
        }
    }
}

/// Backend-specific table-creation hints
///
/// Keys carry a dialect prefix (`mysql_engine`, `mysql_charset`). Only keys
/// whose prefix matches the target dialect are rendered; the values are never
/// interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableOptions(BTreeMap<String, String>);

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Layer `self` on top of `base`; keys in `self` win
    pub fn layered_over(&self, base: &TableOptions) -> TableOptions {
        let mut merged = base.0.clone();
        merged.extend(self.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        TableOptions(merged)
    }

    fn render(&self, dialect: Dialect) -> String {
        let prefix = dialect.option_prefix();
        let mut parts = Vec::new();
        for (key, value) in &self.0 {
            let Some(name) = key.strip_prefix(prefix) else {
                continue;
            };
            match dialect {
                Dialect::Mysql => {
                    let upper = name.to_ascii_uppercase();
                    let keyword = match upper.as_str() {
                        "CHARSET" => "DEFAULT CHARSET".to_string(),
                        "DEFAULT_CHARSET" | "CHARACTER_SET" | "DEFAULT_CHARACTER_SET"
                        | "DEFAULT_COLLATE" | "DATA_DIRECTORY" | "INDEX_DIRECTORY" => {
                            upper.replace('_', " ")
                        }
                        _ => upper,
                    };
                    parts.push(format!("{}={}", keyword, value));
                }
                Dialect::Sqlite | Dialect::Postgresql => {
                    debug!(option = %key, "table option has no rendering for {}", dialect);
                }
            }
        }
        parts.join(" ")
    }
}

impl From<BTreeMap<String, String>> for TableOptions {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for TableOptions {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// A table definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub options: TableOptions,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            indexes: Vec::new(),
            options: TableOptions::default(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the primary key columns in declaration order
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// The single integer key column the database assigns on insert, if any
    pub fn auto_key(&self) -> Option<&Column> {
        let mut keys = self.columns.iter().filter(|c| c.primary_key);
        let key = keys.next()?;
        if keys.next().is_some() || key.foreign_key.is_some() {
            return None;
        }
        matches!(key.ty, ColumnType::Integer | ColumnType::BigInteger).then_some(key)
    }

    fn validate(&self) -> Result<()> {
        if self.primary_key().is_empty() {
            return Err(SchemaError::Registry(format!(
                "table '{}' has no primary key",
                self.name
            )));
        }
        for column in &self.columns {
            if let ColumnType::Enum(values) = &column.ty {
                if values.is_empty() {
                    return Err(SchemaError::Vocabulary {
                        column: format!("{}.{}", self.name, column.name),
                        detail: "vocabulary is empty".to_string(),
                    });
                }
                if values.iter().any(|v| v.is_empty()) {
                    return Err(SchemaError::Vocabulary {
                        column: format!("{}.{}", self.name, column.name),
                        detail: "vocabulary contains an empty value".to_string(),
                    });
                }
            }
        }
        for index in &self.indexes {
            if let Some(missing) = index
                .columns
                .iter()
                .find(|c| self.get_column(c).is_none())
            {
                return Err(SchemaError::Registry(format!(
                    "index '{}' references unknown column '{}.{}'",
                    index.name, self.name, missing
                )));
            }
        }
        Ok(())
    }

    /// Render `CREATE TABLE IF NOT EXISTS` for a dialect
    pub fn create_sql(&self, dialect: Dialect) -> String {
        let q = |ident: &str| dialect.quote(ident);
        let auto_key = self.auto_key().map(|c| c.name.as_str());
        let mut lines = Vec::new();

        for column in &self.columns {
            let auto = auto_key == Some(column.name.as_str());
            let ty = match (&column.ty, dialect) {
                (ColumnType::Integer, Dialect::Postgresql) if auto => "SERIAL".to_string(),
                (ColumnType::BigInteger, Dialect::Postgresql) if auto => "BIGSERIAL".to_string(),
                (ty, _) => ty.render(dialect),
            };
            let mut line = format!("\t{} {}", q(&column.name), ty);
            if !column.nullable {
                line.push_str(" NOT NULL");
            }
            // SQLite assigns INTEGER PRIMARY KEY columns from the rowid
            if auto && dialect == Dialect::Mysql {
                line.push_str(" AUTO_INCREMENT");
            }
            lines.push(line);
        }

        let pk = self
            .primary_key()
            .into_iter()
            .map(q)
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("\tPRIMARY KEY ({})", pk));

        for column in &self.columns {
            if let Some(fk) = &column.foreign_key {
                let mut line = format!(
                    "\tFOREIGN KEY({}) REFERENCES {} ({})",
                    q(&column.name),
                    q(&fk.table),
                    q(&fk.column)
                );
                if fk.on_delete_cascade {
                    line.push_str(" ON DELETE CASCADE");
                }
                lines.push(line);
            }
        }

        if !dialect.native_enum() {
            for column in &self.columns {
                if let ColumnType::Enum(values) = &column.ty {
                    lines.push(format!(
                        "\tCHECK ({} IN ({}))",
                        q(&column.name),
                        quoted_list(values)
                    ));
                }
            }
        }

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            q(&self.name),
            lines.join(",\n")
        );
        let options = self.options.render(dialect);
        if !options.is_empty() {
            sql.push(' ');
            sql.push_str(&options);
        }
        sql
    }

    /// Render the table's index statements for a dialect
    pub fn index_sql(&self, dialect: Dialect) -> Vec<String> {
        let if_not_exists = if dialect.supports_index_if_not_exists() {
            "IF NOT EXISTS "
        } else {
            ""
        };
        self.indexes
            .iter()
            .map(|index| {
                let columns = index
                    .columns
                    .iter()
                    .map(|c| dialect.quote(c))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "CREATE {}INDEX {}{} ON {} ({})",
                    if index.unique { "UNIQUE " } else { "" },
                    if_not_exists,
                    dialect.quote(&index.name),
                    dialect.quote(&self.name),
                    columns
                )
            })
            .collect()
    }

    /// Check that a pre-existing table can carry this definition
    fn verify_existing(&self, found: &[ExistingColumn], dialect: Dialect) -> Result<()> {
        for column in &self.columns {
            let Some(existing) = found
                .iter()
                .find(|e| e.name.eq_ignore_ascii_case(&column.name))
            else {
                return Err(SchemaError::conflict(
                    &self.name,
                    format!("column '{}' is missing", column.name),
                ));
            };

            let declared = column.ty.render(dialect);
            if !types_compatible(dialect, &declared, &existing.declared_type) {
                return Err(SchemaError::conflict(
                    &self.name,
                    format!(
                        "column '{}' is declared {} but exists as {}",
                        column.name, declared, existing.declared_type
                    ),
                ));
            }

            if column.primary_key != existing.primary_key {
                return Err(SchemaError::conflict(
                    &self.name,
                    format!(
                        "column '{}' primary key membership differs from the existing table",
                        column.name
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// SQLite type affinity of a declared type name
#[derive(Debug, PartialEq, Eq)]
enum Affinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

fn affinity(declared: &str) -> Affinity {
    let upper = declared.to_ascii_uppercase();
    if upper.contains("INT") {
        Affinity::Integer
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        Affinity::Text
    } else if upper.contains("BLOB") || upper.trim().is_empty() {
        Affinity::Blob
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        Affinity::Real
    } else {
        Affinity::Numeric
    }
}

fn base_type(declared: &str) -> String {
    let upper = declared.to_ascii_uppercase();
    let base = upper.split('(').next().unwrap_or("").trim().to_string();
    match base.as_str() {
        "INT" | "INT4" | "INTEGER" => "INTEGER".to_string(),
        "INT8" | "BIGINT" => "BIGINT".to_string(),
        "DECIMAL" | "NUMERIC" => "NUMERIC".to_string(),
        "CHARACTER VARYING" | "VARCHAR" => "VARCHAR".to_string(),
        other => other.to_string(),
    }
}

fn types_compatible(dialect: Dialect, declared: &str, found: &str) -> bool {
    match dialect {
        Dialect::Sqlite => affinity(declared) == affinity(found),
        Dialect::Mysql | Dialect::Postgresql => base_type(declared) == base_type(found),
    }
}

/// Outcome of a create-if-missing pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateSummary {
    /// Tables created by this pass
    pub created: Vec<String>,
    /// Tables that already existed and were left untouched
    pub existing: Vec<String>,
    /// Decimal-precision warnings silenced for this backend
    pub decimal_warnings_suppressed: usize,
}

/// Registry of table definitions and record bindings
#[derive(Debug, Default)]
pub struct MetaData {
    tables: Vec<Table>,
    pub(crate) bindings: HashMap<TypeId, Binding>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table definition.
    ///
    /// Re-registering an identical definition is a no-op. A different
    /// definition under an existing name is an error.
    pub fn add_table(&mut self, table: Table) -> Result<&Table> {
        table.validate()?;

        match self.tables.iter().position(|t| t.name == table.name) {
            Some(pos) => {
                if self.tables[pos] != table {
                    return Err(SchemaError::Registry(format!(
                        "table '{}' is already defined with a different structure",
                        table.name
                    )));
                }
                debug!(table = %table.name, "table already registered");
                Ok(&self.tables[pos])
            }
            None => {
                for column in &table.columns {
                    if let Some(fk) = &column.foreign_key {
                        let parent = if fk.table == table.name {
                            Some(&table)
                        } else {
                            self.table(&fk.table)
                        };
                        if parent.and_then(|p| p.get_column(&fk.column)).is_none() {
                            return Err(SchemaError::Registry(format!(
                                "'{}.{}' references unknown column '{}.{}'",
                                table.name, column.name, fk.table, fk.column
                            )));
                        }
                    }
                }
                self.tables.push(table);
                let pos = self.tables.len() - 1;
                Ok(&self.tables[pos])
            }
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Tables in registration order (parents before children)
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Create every registered table that does not exist yet.
    ///
    /// Existing tables are only checked for compatibility, never altered.
    /// Missing tables and their indexes are created in one batch.
    pub fn create_all<T>(&self, target: &T, caps: &BackendCapabilities) -> Result<CreateSummary>
    where
        T: SchemaTarget + ?Sized,
    {
        let dialect = caps.dialect;
        let mut summary = CreateSummary::default();
        let mut statements = Vec::new();

        for table in &self.tables {
            if !caps.native_decimal {
                for column in table.columns.iter().filter(|c| c.ty.is_numeric()) {
                    if caps.suppress_decimal_warnings {
                        summary.decimal_warnings_suppressed += 1;
                        debug!(
                            table = %table.name,
                            column = %column.name,
                            "decimal precision warning suppressed"
                        );
                    } else {
                        warn!(
                            table = %table.name,
                            column = %column.name,
                            "{} does not natively support decimals; precision may be lost",
                            target.backend_name()
                        );
                    }
                }
            }

            if target.table_exists(&table.name)? {
                let found = target.existing_columns(&table.name)?;
                table.verify_existing(&found, dialect)?;
                debug!(table = %table.name, "table exists, leaving untouched");
                summary.existing.push(table.name.clone());
            } else {
                statements.push(table.create_sql(dialect));
                statements.extend(table.index_sql(dialect));
                summary.created.push(table.name.clone());
            }
        }

        if !statements.is_empty() {
            target.apply_ddl(&statements)?;
            info!(
                created = summary.created.len(),
                existing = summary.existing.len(),
                "created missing tables"
            );
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent() -> Table {
        Table::new("parent")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("name", ColumnType::Varchar(100)).not_null())
            .index(Index::unique("UNIQUE_PARENT_NAME", &["name"]))
    }

    #[test]
    fn test_enum_render() {
        let ty = ColumnType::enumeration(["File", "Regex", "File"]);
        assert_eq!(ty, ColumnType::Enum(vec!["File".into(), "Regex".into()]));
        assert_eq!(ty.render(Dialect::Mysql), "ENUM('File', 'Regex')");
        assert_eq!(ty.render(Dialect::Sqlite), "VARCHAR(5)");
    }

    #[test]
    fn test_create_sql_sqlite() {
        let table = Table::new("child")
            .column(
                Column::new("parent_id", ColumnType::Integer)
                    .references("parent", "id")
                    .on_delete_cascade()
                    .primary_key(),
            )
            .column(Column::new("state", ColumnType::enumeration(["A", "B"])).primary_key());
        let sql = table.create_sql(Dialect::Sqlite);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"child\" ("));
        assert!(sql.contains("\"parent_id\" INTEGER NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (\"parent_id\", \"state\")"));
        assert!(sql.contains(
            "FOREIGN KEY(\"parent_id\") REFERENCES \"parent\" (\"id\") ON DELETE CASCADE"
        ));
        assert!(sql.contains("CHECK (\"state\" IN ('A', 'B'))"));
    }

    #[test]
    fn test_mysql_options_render() {
        let table = parent().options(
            TableOptions::new()
                .with("mysql_engine", "InnoDB")
                .with("mysql_charset", "latin1")
                .with("sqlite_autoincrement", "true"),
        );
        let sql = table.create_sql(Dialect::Mysql);
        assert!(sql.ends_with(") DEFAULT CHARSET=latin1 ENGINE=InnoDB"));
        assert!(!table.create_sql(Dialect::Sqlite).contains("ENGINE"));
    }

    #[test]
    fn test_auto_key_rendering() {
        let table = parent();
        assert_eq!(table.auto_key().map(|c| c.name.as_str()), Some("id"));
        assert!(table
            .create_sql(Dialect::Mysql)
            .contains("`id` INTEGER NOT NULL AUTO_INCREMENT,"));
        assert!(table
            .create_sql(Dialect::Postgresql)
            .contains("\"id\" SERIAL NOT NULL,"));
        let sqlite = table.create_sql(Dialect::Sqlite);
        assert!(sqlite.contains("\"id\" INTEGER NOT NULL,"));
        assert!(!sqlite.contains("AUTO"));

        let wide = Table::new("wide").column(Column::new("id", ColumnType::BigInteger).primary_key());
        assert!(wide
            .create_sql(Dialect::Postgresql)
            .contains("\"id\" BIGSERIAL NOT NULL"));
        assert!(wide
            .create_sql(Dialect::Mysql)
            .contains("`id` BIGINT NOT NULL AUTO_INCREMENT"));
    }

    #[test]
    fn test_no_auto_key_for_composite_or_referencing_keys() {
        let child = Table::new("child")
            .column(
                Column::new("parent_id", ColumnType::Integer)
                    .references("parent", "id")
                    .primary_key(),
            )
            .column(Column::new("state", ColumnType::Varchar(10)).primary_key());
        assert!(child.auto_key().is_none());
        assert!(!child.create_sql(Dialect::Mysql).contains("AUTO_INCREMENT"));
        assert!(!child.create_sql(Dialect::Postgresql).contains("SERIAL"));

        let single_fk = Table::new("detail").column(
            Column::new("parent_id", ColumnType::Integer)
                .references("parent", "id")
                .primary_key(),
        );
        assert!(single_fk.auto_key().is_none());
    }

    #[test]
    fn test_mysql_option_keywords() {
        let table = parent().options(
            TableOptions::new()
                .with("mysql_row_format", "DYNAMIC")
                .with("mysql_key_block_size", "8")
                .with("mysql_data_directory", "'/srv/mysql'")
                .with("mysql_default_collate", "latin1_bin"),
        );
        let sql = table.create_sql(Dialect::Mysql);
        assert!(sql.contains("ROW_FORMAT=DYNAMIC"));
        assert!(sql.contains("KEY_BLOCK_SIZE=8"));
        assert!(sql.contains("DATA DIRECTORY='/srv/mysql'"));
        assert!(sql.contains("DEFAULT COLLATE=latin1_bin"));
        assert!(!sql.contains("ROW FORMAT"));
    }

    #[test]
    fn test_index_sql() {
        let table = parent();
        assert_eq!(
            table.index_sql(Dialect::Sqlite),
            vec![
                "CREATE UNIQUE INDEX IF NOT EXISTS \"UNIQUE_PARENT_NAME\" ON \"parent\" (\"name\")"
                    .to_string()
            ]
        );
        assert_eq!(
            table.index_sql(Dialect::Mysql),
            vec!["CREATE UNIQUE INDEX `UNIQUE_PARENT_NAME` ON `parent` (`name`)".to_string()]
        );
    }

    #[test]
    fn test_add_table_idempotent() {
        let mut metadata = MetaData::new();
        metadata.add_table(parent()).unwrap();
        metadata.add_table(parent()).unwrap();
        assert_eq!(metadata.tables().len(), 1);

        let changed = parent().column(Column::new("extra", ColumnType::Text));
        assert!(matches!(
            metadata.add_table(changed),
            Err(SchemaError::Registry(_))
        ));
    }

    #[test]
    fn test_add_table_requires_primary_key() {
        let mut metadata = MetaData::new();
        let table = Table::new("nokey").column(Column::new("v", ColumnType::Text));
        assert!(metadata.add_table(table).is_err());
    }

    #[test]
    fn test_add_table_rejects_empty_vocabulary() {
        let mut metadata = MetaData::new();
        let table = Table::new("t")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("state", ColumnType::Enum(Vec::new())).not_null());
        assert!(matches!(
            metadata.add_table(table),
            Err(SchemaError::Vocabulary { .. })
        ));
    }

    #[test]
    fn test_add_table_checks_foreign_key_target() {
        let mut metadata = MetaData::new();
        let orphan = Table::new("child").column(
            Column::new("parent_id", ColumnType::Integer)
                .references("parent", "id")
                .primary_key(),
        );
        assert!(metadata.add_table(orphan.clone()).is_err());
        metadata.add_table(parent()).unwrap();
        assert!(metadata.add_table(orphan).is_ok());
    }

    #[test]
    fn test_affinity_compatibility() {
        assert!(types_compatible(Dialect::Sqlite, "VARCHAR(19)", "VARCHAR(16)"));
        assert!(types_compatible(Dialect::Sqlite, "NUMERIC(16, 6)", "DECIMAL"));
        assert!(!types_compatible(Dialect::Sqlite, "VARCHAR(255)", "INTEGER"));
        assert!(types_compatible(Dialect::Mysql, "BIGINT", "bigint(20)"));
        assert!(!types_compatible(Dialect::Mysql, "BIGINT", "int(11)"));
    }

    #[test]
    fn test_layered_options() {
        let defaults = TableOptions::new().with("mysql_charset", "latin1");
        let caller = TableOptions::new().with("mysql_charset", "utf8mb4");
        let merged = caller.layered_over(&defaults);
        assert_eq!(merged.get("mysql_charset"), Some("utf8mb4"));
    }
}
