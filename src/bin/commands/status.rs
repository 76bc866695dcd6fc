use anyhow::Result;
use clap::Args;
use dashdb::database::{DatabaseConn, SchemaManager, SchemaStatus, SchemaTarget};
use dashdb::database::{DASHBOARD_TABLES, SCHEMA_VERSION};
use dashdb::DashboardConfig;
use serde::Serialize;
use std::path::Path;

use super::{database_path, print_json};

/// Arguments for the Status command
#[derive(Args)]
pub struct StatusArgs {
    /// SQLite database file, by default `workflow.db` in the data directory
    #[clap(short, long)]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
struct TableInfo {
    name: &'static str,
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<u64>,
}

#[derive(Debug, Serialize)]
struct DatabaseStatus {
    path: String,
    exists: bool,
    schema_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<SchemaStatus>,
    tables: Vec<TableInfo>,
}

pub fn run(config: &DashboardConfig, args: StatusArgs, json: bool) -> Result<()> {
    let path = database_path(config, &args.path);
    let exists = Path::new(&path).exists();

    let mut status = DatabaseStatus {
        path: path.clone(),
        exists,
        schema_version: SCHEMA_VERSION,
        schema: None,
        tables: Vec::new(),
    };

    if exists {
        let db = DatabaseConn::open_read_only(&path)?;
        status.schema = Some(SchemaManager::new(&db).check_status()?);
        for name in DASHBOARD_TABLES {
            let exists = db.table_exists(name)?;
            let rows = if exists { db.table_count(name).ok() } else { None };
            status.tables.push(TableInfo { name, exists, rows });
        }
    }

    if json {
        return print_json(&status);
    }
    print_status(&status);
    Ok(())
}

fn print_status(status: &DatabaseStatus) {
    println!("Database:   {}", status.path);
    if !status.exists {
        println!("Status:     not created, run `dashdb init`");
        return;
    }

    let schema = match &status.schema {
        Some(SchemaStatus::Current) => format!("current (v{})", status.schema_version),
        Some(SchemaStatus::Partial { missing }) => format!("partial, missing {}", missing.join(", ")),
        Some(SchemaStatus::NotInitialized) | None => "not initialized".to_string(),
    };
    println!("Schema:     {}", schema);
    println!();

    for table in &status.tables {
        match table.rows {
            Some(rows) => println!("  {:<24} {:>10}", table.name, rows),
            None => println!("  {:<24} {:>10}", table.name, "-"),
        }
    }
}
