#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! dashdb - schema initializer for the workflow dashboard database
//!
//! dashdb creates the seven tables behind the workflow dashboard (root
//! workflows, their state history, per-user replica/site/transformation
//! catalogs, ensembles and ensemble workflows) together with their unique
//! indices and foreign keys, and binds a record type to each table. It can be
//! used as both a command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `cli` | The `dashdb` binary (default) | `clap`, `tracing-subscriber` |
//!
//! ```toml
//! # Library only
//! dashdb = { version = "0.4", default-features = false }
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: All database functionality
//!   - `core`: capability table, table registry, bindings, schema initializer
//!   - `dashboard`: record types, vocabularies and the `DashboardDatabase` entry point
//!
//! - **[`config`]**: Configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dashdb::database::{DashboardDatabase, InitOptions, ReplicaCatalog};
//!
//! // Creating is idempotent: existing tables and rows are left alone
//! let db = DashboardDatabase::open("workflow.db", &InitOptions::default())?;
//! println!("created {:?}", db.report().created);
//!
//! db.store().insert(&ReplicaCatalog::new("alice", "rc", "File"))?;
//! ```
//!
//! Initializing against a connection of your own:
//!
//! ```rust,ignore
//! use dashdb::database::{DatabaseConn, InitOptions, MetaData, SchemaManager};
//!
//! let conn = DatabaseConn::open_in_memory()?;
//! let mut metadata = MetaData::new();
//! let report = SchemaManager::new(&conn).initialize(&mut metadata, &InitOptions::default())?;
//! assert_eq!(report.created.len(), 7);
//! ```

pub mod config;
pub mod database;

// =============================================================================
// Configuration
// =============================================================================

pub use config::DashboardConfig;

// =============================================================================
// Database Module - Re-export commonly used types
// =============================================================================

// Primary database type (SQLite)
pub use database::DashboardDatabase;

// Schema infrastructure
pub use database::{
    CapabilityTable, DatabaseConn, InitOptions, MetaData, Record, RecordStore, SchemaError,
    SchemaManager, SchemaReport, SchemaStatus, SchemaTarget, DASHBOARD_TABLES, SCHEMA_VERSION,
};

// Record types
pub use database::{
    Ensemble, EnsembleWorkflow, ReplicaCatalog, SiteCatalog, TransformationCatalog, Vocabularies,
    Workflow, WorkflowState,
};
