use std::cell::RefCell;

use anyhow::{anyhow, Result};
use clap::Args;
use dashdb::database::core::{ExistingColumn, Result as SchemaResult};
use dashdb::database::{
    ensure_data_dir, DashboardDatabase, MetaData, SchemaManager, SchemaReport, SchemaTarget,
};
use dashdb::DashboardConfig;
use serde::Serialize;

use super::{database_path, print_json};

/// Arguments for the Init command
#[derive(Args)]
pub struct InitArgs {
    /// SQLite database file, by default `workflow.db` in the data directory
    #[clap(short, long)]
    pub path: Option<String>,

    /// Print the DDL for the configured backend instead of touching a database
    #[clap(long)]
    pub print_ddl: bool,
}

/// Collects DDL for a backend without a live connection
struct DdlCollector {
    backend: String,
    statements: RefCell<Vec<String>>,
}

impl SchemaTarget for DdlCollector {
    fn backend_name(&self) -> &str {
        &self.backend
    }

    fn table_exists(&self, _table: &str) -> SchemaResult<bool> {
        Ok(false)
    }

    fn existing_columns(&self, _table: &str) -> SchemaResult<Vec<ExistingColumn>> {
        Ok(Vec::new())
    }

    fn apply_ddl(&self, statements: &[String]) -> SchemaResult<()> {
        self.statements.borrow_mut().extend_from_slice(statements);
        Ok(())
    }
}

#[derive(Serialize)]
struct DdlOutput<'a> {
    backend: &'a str,
    statements: Vec<String>,
}

pub fn run(config: &DashboardConfig, args: InitArgs, json: bool) -> Result<()> {
    let options = config.init_options();

    if args.print_ddl {
        let collector = DdlCollector {
            backend: config.backend.clone(),
            statements: RefCell::new(Vec::new()),
        };
        SchemaManager::new(&collector).initialize(&mut MetaData::new(), &options)?;
        let statements = collector.statements.into_inner();
        if json {
            return print_json(&DdlOutput {
                backend: &config.backend,
                statements,
            });
        }
        for statement in statements {
            println!("{};\n", statement);
        }
        return Ok(());
    }

    if config.backend != "sqlite" {
        return Err(anyhow!(
            "only SQLite databases can be initialized directly (configured backend: {}); use --print-ddl",
            config.backend
        ));
    }

    let path = database_path(config, &args.path);
    if args.path.is_none() {
        ensure_data_dir(&config.data_dir)?;
    }

    let db = DashboardDatabase::open(&path, &options)
        .map_err(|e| anyhow!("Failed to initialize {}: {}", path, e))?;

    if json {
        return print_json(db.report());
    }
    print_report(&path, db.report());
    Ok(())
}

fn print_report(path: &str, report: &SchemaReport) {
    println!("Database:   {}", path);
    println!("Backend:    {} ({})", report.backend, report.dialect);
    if report.created.is_empty() {
        println!("Created:    none, schema already present");
    } else {
        println!("Created:    {}", report.created.join(", "));
    }
    if !report.existing.is_empty() {
        println!("Existing:   {}", report.existing.join(", "));
    }
    if report.decimal_warnings_suppressed > 0 {
        println!(
            "Suppressed {} decimal precision warning(s)",
            report.decimal_warnings_suppressed
        );
    }
}
