//! Core database infrastructure
//!
//! This module provides the foundational database components used by the dashboard:
//! - `DatabaseConn`: Core SQLite connection wrapper with configuration
//! - `SchemaTarget`: What the initializer needs from a connection
//! - `CapabilityTable`: Backend name to type-selection policy
//! - `MetaData`: Table registry and record bindings
//! - `SchemaManager`: Schema initialization and status checks
//! - `RecordStore`: Typed reads and writes for bound record types

mod backend;
mod connection;
mod error;
mod mapper;
mod metadata;
mod schema;
mod store;

pub use backend::{BackendCapabilities, CapabilityTable, Dialect, KeyWidth};
pub use connection::{DatabaseConn, ExistingColumn, SchemaTarget};
pub use error::{Result, SchemaError};
pub use mapper::{BindOutcome, Binding, Record};
pub use metadata::{
    Column, ColumnType, CreateSummary, ForeignKey, Index, MetaData, Table, TableOptions,
};
pub use schema::{
    BindingReport, InitOptions, SchemaDefinitions, SchemaManager, SchemaReport, SchemaStatus,
    DASHBOARD_TABLES, SCHEMA_VERSION,
};
pub use store::RecordStore;
