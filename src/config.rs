use anyhow::{anyhow, Result};
use config::Config;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::database::{InitOptions, TableOptions, Vocabularies, DASHBOARD_DB_FILE};

/// Vocabulary keys that may be given as comma-separated lists in the environment
const VOCABULARY_KEYS: [&str; 6] = [
    "workflow_states",
    "replica_catalog_formats",
    "site_catalog_formats",
    "transformation_catalog_formats",
    "ensemble_states",
    "ensemble_workflow_states",
];

#[derive(Debug, Clone, Serialize)]
pub struct DashboardConfig {
    /// Path to the directory holding the dashboard database
    pub data_dir: String,

    /// Backend name used to pick type and option policies
    pub backend: String,

    /// Dialect-prefixed table options, e.g. `mysql_engine = "InnoDB"`
    pub table_options: TableOptions,

    /// Value sets for the enumerated columns
    pub vocabularies: Vocabularies,
}

const EMPTY_CONFIG: &str = r#"### dashdb configuration file

### directory holding the dashboard database
# data_dir = "~/.dashdb"

### backend whose type policies are applied (sqlite, mysql, postgresql)
# backend = "sqlite"

### value sets of the enumerated columns
# ensemble_states = ["ACTIVE", "HELD", "PAUSED"]
# replica_catalog_formats = ["File", "Regex"]

### table options, passed through to the backend
# [table_options]
# mysql_engine = "InnoDB"
# mysql_charset = "utf8mb4"
"#;

/// Settings as they appear in the file and environment
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    data_dir: Option<String>,
    backend: Option<String>,
    #[serde(default)]
    table_options: BTreeMap<String, String>,
    workflow_states: Option<Vec<String>>,
    replica_catalog_formats: Option<Vec<String>>,
    site_catalog_formats: Option<Vec<String>>,
    transformation_catalog_formats: Option<Vec<String>>,
    ensemble_states: Option<Vec<String>>,
    ensemble_workflow_states: Option<Vec<String>>,
}

fn home_dir() -> Result<String> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .to_str()
        .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
        .to_owned())
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str) -> Result<String> {
    match path.strip_prefix('~') {
        Some(rest) => Ok(format!("{}{}", home_dir()?, rest)),
        None => Ok(path.to_string()),
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.dashdb", home_dir),
            backend: "sqlite".to_string(),
            table_options: TableOptions::default(),
            vocabularies: Vocabularies::default(),
        }
    }
}

impl DashboardConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<DashboardConfig> {
        let mut builder = Config::builder();

        let dashdb_dir = format!("{}/.dashdb", home_dir()?);

        // Add in toml configuration file
        match path {
            Some(p) => {
                if Path::new(p).exists() {
                    builder = builder.add_source(config::File::from(Path::new(p)));
                } else {
                    std::fs::write(p, EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file {}: {}", p, e))?;
                }
            }
            None => {
                std::fs::create_dir_all(&dashdb_dir)
                    .map_err(|e| anyhow!("Unable to create dashdb directory: {}", e))?;
                let p = Self::config_file_path();
                if Path::new(&p).exists() {
                    builder = builder.add_source(config::File::from(Path::new(&p)));
                } else {
                    std::fs::write(&p, EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file {}: {}", p, e))?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of DASHDB)
        // E.g., `DASHDB_BACKEND=mysql ./dashdb init` would select MySQL policies
        let mut env = config::Environment::with_prefix("DASHDB")
            .try_parsing(true)
            .list_separator(",");
        for key in VOCABULARY_KEYS {
            env = env.with_list_parse_key(key);
        }
        builder = builder.add_source(env);

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let raw = settings
            .try_deserialize::<RawConfig>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_raw(raw, &dashdb_dir)
    }

    fn from_raw(raw: RawConfig, default_dir: &str) -> Result<Self> {
        let data_dir = match raw.data_dir {
            Some(p) => expand_home(&p)?,
            None => default_dir.to_string(),
        };

        let defaults = Vocabularies::default();
        let vocabularies = Vocabularies {
            workflow_states: raw.workflow_states.unwrap_or(defaults.workflow_states),
            replica_catalog_formats: raw
                .replica_catalog_formats
                .unwrap_or(defaults.replica_catalog_formats),
            site_catalog_formats: raw
                .site_catalog_formats
                .unwrap_or(defaults.site_catalog_formats),
            transformation_catalog_formats: raw
                .transformation_catalog_formats
                .unwrap_or(defaults.transformation_catalog_formats),
            ensemble_states: raw.ensemble_states.unwrap_or(defaults.ensemble_states),
            ensemble_workflow_states: raw
                .ensemble_workflow_states
                .unwrap_or(defaults.ensemble_workflow_states),
        };

        Ok(DashboardConfig {
            data_dir,
            backend: raw.backend.unwrap_or_else(|| "sqlite".to_string()),
            table_options: TableOptions::from(raw.table_options),
            vocabularies,
        })
    }

    /// Get the path to the SQLite database file
    pub fn sqlite_path(&self) -> String {
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/{}", data_dir, DASHBOARD_DB_FILE)
    }

    /// Options handed to the schema initializer
    pub fn init_options(&self) -> InitOptions {
        InitOptions {
            table_options: self.table_options.clone(),
            vocabularies: self.vocabularies.clone(),
            ..Default::default()
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Data Directory:     {}", self.data_dir),
            format!("SQLite Path:        {}", self.sqlite_path()),
            format!("Backend:            {}", self.backend),
        ];

        if !self.table_options.is_empty() {
            let options = serde_json::to_string(&self.table_options).unwrap_or_default();
            lines.push(format!("Table Options:      {}", options));
        }

        let vocab = &self.vocabularies;
        lines.push(format!("Workflow States:    {}", vocab.workflow_states.join(", ")));
        lines.push(format!("Ensemble States:    {}", vocab.ensemble_states.join(", ")));
        lines.push(format!(
            "Ensemble WF States: {}",
            vocab.ensemble_workflow_states.join(", ")
        ));
        lines.push(format!(
            "Catalog Formats:    replica [{}], site [{}], transformation [{}]",
            vocab.replica_catalog_formats.join(", "),
            vocab.site_catalog_formats.join(", "),
            vocab.transformation_catalog_formats.join(", ")
        ));

        lines.join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.dashdb/dashdb.toml", home_dir)
    }
}
