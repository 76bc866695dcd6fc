use anyhow::Result;
use clap::Args;
use dashdb::database::{TableOptions, Vocabularies};
use dashdb::DashboardConfig;
use serde::Serialize;
use std::path::Path;

use super::print_json;

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Also list the enumerated value sets
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
struct ConfigInfo<'a> {
    config_file: String,
    data_dir: &'a str,
    database: String,
    database_exists: bool,
    backend: &'a str,
    table_options: &'a TableOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    vocabularies: Option<&'a Vocabularies>,
}

pub fn run(config: &DashboardConfig, args: ConfigArgs, json: bool) -> Result<()> {
    let database = config.sqlite_path();
    let info = ConfigInfo {
        config_file: DashboardConfig::config_file_path(),
        data_dir: &config.data_dir,
        database_exists: Path::new(&database).exists(),
        database,
        backend: &config.backend,
        table_options: &config.table_options,
        vocabularies: args.verbose.then_some(&config.vocabularies),
    };

    if json {
        return print_json(&info);
    }

    println!("Dashboard Configuration");
    println!("=======================\n");
    println!("  Config file:    {}", info.config_file);
    println!(
        "  Database:       {} ({})",
        info.database,
        if info.database_exists { "exists" } else { "not created" }
    );
    println!();
    println!("{}", config.summary());
    Ok(())
}
