//! Backend capability table
//!
//! Type-selection decisions are keyed on the backend name reported by the
//! connection. Each entry says which SQL dialect to render, how wide key
//! integers must be, and how to treat fixed-precision decimal columns.
//! New backends are added with [`CapabilityTable::register`] without touching
//! the creation logic.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// SQL dialect used to render DDL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Sqlite,
    Mysql,
    Postgresql,
}

impl Dialect {
    /// Prefix that selects this dialect's table options (e.g. `mysql_engine`)
    pub fn option_prefix(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite_",
            Dialect::Mysql => "mysql_",
            Dialect::Postgresql => "postgresql_",
        }
    }

    /// Quote an identifier for this dialect
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::Mysql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Sqlite | Dialect::Postgresql => {
                format!("\"{}\"", ident.replace('"', "\"\""))
            }
        }
    }

    /// Whether `CREATE INDEX IF NOT EXISTS` is accepted
    pub fn supports_index_if_not_exists(&self) -> bool {
        !matches!(self, Dialect::Mysql)
    }

    /// Whether enumerated columns are rendered as a native `ENUM(...)` type
    pub fn native_enum(&self) -> bool {
        matches!(self, Dialect::Mysql)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::Mysql => write!(f, "mysql"),
            Dialect::Postgresql => write!(f, "postgresql"),
        }
    }
}

/// Width of integer key columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyWidth {
    /// Standard 32-bit `INTEGER`
    #[default]
    Standard,
    /// 64-bit `BIGINT`
    Wide,
}

/// What a backend needs from the schema layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub dialect: Dialect,
    pub key_width: KeyWidth,
    /// Whether fixed-precision decimals are stored without loss
    pub native_decimal: bool,
    /// Whether precision-loss warnings on decimal columns are silenced
    pub suppress_decimal_warnings: bool,
    /// Table options merged under the caller's options
    pub default_table_options: Vec<(String, String)>,
}

impl BackendCapabilities {
    pub fn sqlite() -> Self {
        Self {
            dialect: Dialect::Sqlite,
            key_width: KeyWidth::Standard,
            native_decimal: false,
            suppress_decimal_warnings: true,
            default_table_options: Vec::new(),
        }
    }

    pub fn mysql() -> Self {
        Self {
            dialect: Dialect::Mysql,
            key_width: KeyWidth::Wide,
            native_decimal: true,
            suppress_decimal_warnings: false,
            default_table_options: vec![("mysql_charset".to_string(), "latin1".to_string())],
        }
    }

    pub fn postgresql() -> Self {
        Self {
            dialect: Dialect::Postgresql,
            key_width: KeyWidth::Standard,
            native_decimal: true,
            suppress_decimal_warnings: false,
            default_table_options: Vec::new(),
        }
    }
}

/// Backend name to capability lookup
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    entries: HashMap<String, BackendCapabilities>,
    fallback: BackendCapabilities,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
            fallback: BackendCapabilities::postgresql(),
        };
        table.register("sqlite", BackendCapabilities::sqlite());
        table.register("mysql", BackendCapabilities::mysql());
        table.register("mariadb", BackendCapabilities::mysql());
        table.register("postgresql", BackendCapabilities::postgresql());
        table.register("postgres", BackendCapabilities::postgresql());
        table
    }
}

impl CapabilityTable {
    /// Add or replace the capabilities for a backend name
    pub fn register(&mut self, name: &str, caps: BackendCapabilities) {
        self.entries.insert(name.to_ascii_lowercase(), caps);
    }

    /// Set the capabilities used for unknown backends
    pub fn with_fallback(mut self, caps: BackendCapabilities) -> Self {
        self.fallback = caps;
        self
    }

    /// Resolve a backend name such as `mysql`, `MySQL` or `mysql+mysqldb`.
    ///
    /// Unknown names resolve to the fallback entry.
    pub fn lookup(&self, backend: &str) -> &BackendCapabilities {
        let family = backend
            .split('+')
            .next()
            .unwrap_or(backend)
            .trim()
            .to_ascii_lowercase();
        self.entries.get(&family).unwrap_or(&self.fallback)
    }

    /// Whether the backend name has its own entry
    pub fn is_known(&self, backend: &str) -> bool {
        let family = backend.split('+').next().unwrap_or(backend);
        self.entries.contains_key(&family.trim().to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_width_policy() {
        let table = CapabilityTable::default();
        assert_eq!(table.lookup("mysql").key_width, KeyWidth::Wide);
        assert_eq!(table.lookup("MySQL").key_width, KeyWidth::Wide);
        assert_eq!(table.lookup("mysql+mysqldb").key_width, KeyWidth::Wide);
        assert_eq!(table.lookup("mariadb").key_width, KeyWidth::Wide);
        assert_eq!(table.lookup("sqlite").key_width, KeyWidth::Standard);
        assert_eq!(table.lookup("postgresql").key_width, KeyWidth::Standard);
        assert_eq!(table.lookup("oracle").key_width, KeyWidth::Standard);
    }

    #[test]
    fn test_decimal_policy() {
        let table = CapabilityTable::default();
        let sqlite = table.lookup("sqlite");
        assert!(!sqlite.native_decimal);
        assert!(sqlite.suppress_decimal_warnings);
        assert!(table.lookup("mysql").native_decimal);
    }

    #[test]
    fn test_register_custom_backend() {
        let mut table = CapabilityTable::default();
        assert!(!table.is_known("cockroachdb"));
        table.register(
            "cockroachdb",
            BackendCapabilities {
                key_width: KeyWidth::Wide,
                ..BackendCapabilities::postgresql()
            },
        );
        assert!(table.is_known("CockroachDB"));
        assert_eq!(table.lookup("cockroachdb").key_width, KeyWidth::Wide);
        assert_eq!(table.lookup("cockroachdb").dialect, Dialect::Postgresql);
    }

    #[test]
    fn test_mysql_default_charset() {
        let table = CapabilityTable::default();
        assert_eq!(
            table.lookup("mysql").default_table_options,
            vec![("mysql_charset".to_string(), "latin1".to_string())]
        );
    }

    #[test]
    fn test_quote() {
        assert_eq!(Dialect::Sqlite.quote("user"), "\"user\"");
        assert_eq!(Dialect::Mysql.quote("user"), "`user`");
    }
}
