//! Database schema management
//!
//! This module declares the seven dashboard tables, binds their record types,
//! and creates whatever is missing in the target database.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::backend::{CapabilityTable, Dialect, KeyWidth};
use super::connection::SchemaTarget;
use super::error::Result;
use super::mapper::{BindOutcome, Record};
use super::metadata::{Column, ColumnType, Index, MetaData, Table, TableOptions};
use crate::database::dashboard::{
    Ensemble, EnsembleWorkflow, ReplicaCatalog, SiteCatalog, TransformationCatalog, Vocabularies,
    Workflow, WorkflowState,
};

/// Dashboard schema version
pub const SCHEMA_VERSION: &str = "4.0";

/// Tables owned by the dashboard schema, parents first
pub const DASHBOARD_TABLES: [&str; 7] = [
    "master_workflow",
    "master_workflowstate",
    "replica_catalog",
    "site_catalog",
    "transformation_catalog",
    "ensemble",
    "ensemble_workflow",
];

/// Fixed-precision type used for sub-second epoch timestamps
const TIMESTAMP: ColumnType = ColumnType::Numeric {
    precision: 16,
    scale: 6,
};

/// Everything the initializer needs besides the connection and registry
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Dialect-prefixed table options, passed through verbatim
    pub table_options: TableOptions,
    /// Current value sets of the enumerated columns
    pub vocabularies: Vocabularies,
    /// Backend name to capability lookup
    pub capabilities: CapabilityTable,
}

/// Schema definitions for all dashboard tables
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// Root-level workflows, one row per submitted workflow
    pub fn master_workflow(key: &ColumnType, options: &TableOptions) -> Table {
        let varchar = || ColumnType::Varchar(255);
        Table::new("master_workflow")
            .column(Column::new("wf_id", key.clone()).primary_key())
            .column(Column::new("wf_uuid", varchar()).not_null())
            .column(Column::new("dax_label", varchar()))
            .column(Column::new("dax_version", varchar()))
            .column(Column::new("dax_file", varchar()))
            .column(Column::new("dag_file_name", varchar()))
            .column(Column::new("timestamp", TIMESTAMP))
            .column(Column::new("submit_hostname", varchar()))
            .column(Column::new("submit_dir", ColumnType::Text))
            .column(Column::new("planner_arguments", ColumnType::Text))
            .column(Column::new("user", varchar()))
            .column(Column::new("grid_dn", varchar()))
            .column(Column::new("planner_version", varchar()))
            .column(Column::new("db_url", ColumnType::Text))
            .index(Index::unique("KEY_MASTER_WF_ID", &["wf_id"]))
            .index(Index::unique("UNIQUE_MASTER_WF_UUID", &["wf_uuid"]))
            .options(options.clone())
    }

    /// Append-only state history; the full triple is the key
    pub fn master_workflowstate(
        key: &ColumnType,
        states: &[String],
        options: &TableOptions,
    ) -> Table {
        Table::new("master_workflowstate")
            .column(
                Column::new("wf_id", key.clone())
                    .references("master_workflow", "wf_id")
                    .on_delete_cascade()
                    .primary_key(),
            )
            .column(Column::new("state", ColumnType::enumeration(states)).primary_key())
            .column(Column::new("timestamp", TIMESTAMP).primary_key())
            .column(Column::new("restart_count", ColumnType::Integer).not_null())
            .column(Column::new("status", ColumnType::Integer))
            .index(Index::unique(
                "UNIQUE_MASTER_WORKFLOWSTATE",
                &["wf_id", "state", "timestamp"],
            ))
            .options(options.clone())
    }

    /// A per-user catalog table; names are unique per owner
    pub fn catalog(name: &str, index: &str, formats: &[String], options: &TableOptions) -> Table {
        Table::new(name)
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("name", ColumnType::Varchar(100)).not_null())
            .column(Column::new("format", ColumnType::enumeration(formats)).not_null())
            .column(Column::new("created", ColumnType::DateTime).not_null())
            .column(Column::new("updated", ColumnType::DateTime).not_null())
            .column(Column::new("username", ColumnType::Varchar(100)).not_null())
            .index(Index::unique(index, &["username", "name"]))
            .options(options.clone())
    }

    /// User-owned groups of workflows; names are unique per owner
    pub fn ensemble(states: &[String], options: &TableOptions) -> Table {
        Table::new("ensemble")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("name", ColumnType::Varchar(100)).not_null())
            .column(Column::new("created", ColumnType::DateTime).not_null())
            .column(Column::new("updated", ColumnType::DateTime).not_null())
            .column(Column::new("state", ColumnType::enumeration(states)).not_null())
            .column(Column::new("max_running", ColumnType::Integer).not_null())
            .column(Column::new("max_planning", ColumnType::Integer).not_null())
            .column(Column::new("username", ColumnType::Varchar(100)).not_null())
            .index(Index::unique("UNIQUE_ENSEMBLE", &["username", "name"]))
            .options(options.clone())
    }

    /// Workflows within an ensemble; names are unique per ensemble
    pub fn ensemble_workflow(states: &[String], options: &TableOptions) -> Table {
        Table::new("ensemble_workflow")
            .column(Column::new("id", ColumnType::Integer).primary_key())
            .column(Column::new("name", ColumnType::Varchar(100)).not_null())
            .column(Column::new("created", ColumnType::DateTime).not_null())
            .column(Column::new("updated", ColumnType::DateTime).not_null())
            .column(Column::new("state", ColumnType::enumeration(states)).not_null())
            .column(Column::new("priority", ColumnType::Integer).not_null())
            .column(Column::new("wf_uuid", ColumnType::Varchar(36)))
            .column(Column::new("submitdir", ColumnType::Varchar(512)))
            .column(
                Column::new("ensemble_id", ColumnType::Integer)
                    .references("ensemble", "id")
                    .on_delete_cascade()
                    .not_null(),
            )
            .index(Index::unique(
                "UNIQUE_ENSEMBLE_WORKFLOW",
                &["ensemble_id", "name"],
            ))
            .options(options.clone())
    }

    /// Register all seven tables in `metadata`
    pub fn declare(
        metadata: &mut MetaData,
        key_width: KeyWidth,
        options: &TableOptions,
        vocab: &Vocabularies,
    ) -> Result<()> {
        let key = ColumnType::key_integer(key_width);
        let innodb = options.layered_over(&TableOptions::new().with("mysql_engine", "InnoDB"));

        metadata.add_table(Self::master_workflow(&key, options))?;
        metadata.add_table(Self::master_workflowstate(
            &key,
            &vocab.workflow_states,
            options,
        ))?;
        metadata.add_table(Self::catalog(
            "replica_catalog",
            "UNIQUE_REPLICA_CATALOG",
            &vocab.replica_catalog_formats,
            &innodb,
        ))?;
        metadata.add_table(Self::catalog(
            "site_catalog",
            "UNIQUE_SITE_CATALOG",
            &vocab.site_catalog_formats,
            &innodb,
        ))?;
        metadata.add_table(Self::catalog(
            "transformation_catalog",
            "UNIQUE_TRANSFORMATION_CATALOG",
            &vocab.transformation_catalog_formats,
            &innodb,
        ))?;
        metadata.add_table(Self::ensemble(&vocab.ensemble_states, &innodb))?;
        metadata.add_table(Self::ensemble_workflow(
            &vocab.ensemble_workflow_states,
            &innodb,
        ))?;
        Ok(())
    }
}

/// How one record type's bind request ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingReport {
    pub table: String,
    #[serde(flatten)]
    pub outcome: BindOutcome,
}

/// What an initialization call did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub backend: String,
    pub dialect: Dialect,
    pub key_width: KeyWidth,
    pub created: Vec<String>,
    pub existing: Vec<String>,
    pub bindings: Vec<BindingReport>,
    pub decimal_warnings_suppressed: usize,
}

impl SchemaReport {
    /// Whether the call left everything as it found it
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
            && self
                .bindings
                .iter()
                .all(|b| b.outcome != BindOutcome::Bound)
    }
}

/// Schema manager for the dashboard database
///
/// Handles schema declaration, record binding, and creation of missing tables.
pub struct SchemaManager<'a, T: SchemaTarget + ?Sized> {
    target: &'a T,
}

impl<'a, T: SchemaTarget + ?Sized> SchemaManager<'a, T> {
    /// Create a new schema manager for the given connection
    pub fn new(target: &'a T) -> Self {
        Self { target }
    }

    /// Initialize the dashboard schema
    ///
    /// Declares the seven tables in `metadata`, binds their record types, and
    /// creates the tables that do not exist yet. Repeating the call against the
    /// same connection and registry changes nothing.
    pub fn initialize(&self, metadata: &mut MetaData, options: &InitOptions) -> Result<SchemaReport> {
        let backend = self.target.backend_name();
        if !options.capabilities.is_known(backend) {
            warn!(backend, "unknown backend, using fallback capabilities");
        }
        let caps = options.capabilities.lookup(backend);

        let defaults: TableOptions = caps
            .default_table_options
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let table_options = options.table_options.layered_over(&defaults);

        SchemaDefinitions::declare(
            metadata,
            caps.key_width,
            &table_options,
            &options.vocabularies,
        )?;

        let bindings = vec![
            Self::bind::<Workflow>(metadata)?,
            Self::bind::<WorkflowState>(metadata)?,
            Self::bind::<ReplicaCatalog>(metadata)?,
            Self::bind::<SiteCatalog>(metadata)?,
            Self::bind::<TransformationCatalog>(metadata)?,
            Self::bind::<Ensemble>(metadata)?,
            Self::bind::<EnsembleWorkflow>(metadata)?,
        ];

        let summary = metadata.create_all(self.target, caps)?;

        info!(
            backend,
            created = summary.created.len(),
            existing = summary.existing.len(),
            "dashboard schema initialized"
        );

        Ok(SchemaReport {
            backend: backend.to_string(),
            dialect: caps.dialect,
            key_width: caps.key_width,
            created: summary.created,
            existing: summary.existing,
            bindings,
            decimal_warnings_suppressed: summary.decimal_warnings_suppressed,
        })
    }

    fn bind<R: Record>(metadata: &mut MetaData) -> Result<BindingReport> {
        let outcome = metadata.bind::<R>()?;
        match &outcome {
            BindOutcome::Bound => debug!(table = R::TABLE, "record type bound"),
            BindOutcome::AlreadyBound => {
                info!(table = R::TABLE, "record type already bound, skipping")
            }
            BindOutcome::Conflicting { existing_table } => warn!(
                table = R::TABLE,
                existing = %existing_table,
                "record type already bound to another table, keeping existing binding"
            ),
        }
        Ok(BindingReport {
            table: R::TABLE.to_string(),
            outcome,
        })
    }

    /// Check the current schema status
    pub fn check_status(&self) -> Result<SchemaStatus> {
        let mut missing = Vec::new();
        for table in DASHBOARD_TABLES {
            if !self.target.table_exists(table)? {
                missing.push(table.to_string());
            }
        }

        Ok(match missing.len() {
            0 => SchemaStatus::Current,
            n if n == DASHBOARD_TABLES.len() => SchemaStatus::NotInitialized,
            _ => SchemaStatus::Partial { missing },
        })
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SchemaStatus {
    /// None of the dashboard tables exist
    NotInitialized,

    /// All dashboard tables exist
    Current,

    /// Some dashboard tables are missing
    Partial { missing: Vec<String> },
}
