//! Database module
//!
//! This module provides all database functionality for the dashboard, organized into:
//!
//! - **core**: Schema infrastructure (connections, capabilities, registry, bindings)
//! - **dashboard**: The dashboard tables, their record types and vocabularies
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/             # Foundation
//! │   ├── backend       # Backend capability table
//! │   ├── connection    # SQLite DatabaseConn wrapper, SchemaTarget trait
//! │   ├── error         # SchemaError
//! │   ├── mapper        # Record trait and bindings
//! │   ├── metadata      # Table registry and DDL rendering
//! │   ├── schema        # Dashboard schema definitions and initializer
//! │   └── store         # RecordStore
//! │
//! └── dashboard/        # Persistent storage
//!     ├── records       # Workflow, catalog and ensemble records
//!     └── vocabulary    # Enumerated value sets
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use dashdb::database::{DashboardDatabase, InitOptions, Ensemble};
//!
//! let db = DashboardDatabase::open_in_dir("~/.dashdb", &InitOptions::default())?;
//! db.store().insert(&Ensemble::new("alice", "nightly", "ACTIVE"))?;
//! ```

pub mod core;
pub mod dashboard;

pub use core::{
    BackendCapabilities, BindOutcome, CapabilityTable, DatabaseConn, Dialect, InitOptions,
    KeyWidth, MetaData, Record, RecordStore, SchemaError, SchemaManager, SchemaReport,
    SchemaStatus, SchemaTarget, TableOptions, DASHBOARD_TABLES, SCHEMA_VERSION,
};

pub use dashboard::{
    DashboardDatabase, Ensemble, EnsembleWorkflow, ReplicaCatalog, SiteCatalog,
    TransformationCatalog, Vocabularies, Workflow, WorkflowState, DASHBOARD_DB_FILE,
};

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}
