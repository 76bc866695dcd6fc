pub mod config;
pub mod init;
pub mod status;

use anyhow::Result;
use serde::Serialize;

/// Print a value as JSON, pretty-printed for terminals
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolve the database file from an explicit path or the configuration
pub(crate) fn database_path(config: &dashdb::DashboardConfig, path: &Option<String>) -> String {
    match path {
        Some(p) => p.clone(),
        None => config.sqlite_path(),
    }
}
