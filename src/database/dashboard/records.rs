//! Record types bound to the dashboard tables

use std::marker::PhantomData;

use chrono::{NaiveDateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::Row;
use serde::Serialize;

use crate::database::core::Record;

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// A root-level workflow (`master_workflow`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Workflow {
    /// Storage handle, assigned on insert
    pub wf_id: Option<i64>,
    /// Stable external identity
    pub wf_uuid: String,
    pub dax_label: Option<String>,
    pub dax_version: Option<String>,
    pub dax_file: Option<String>,
    pub dag_file_name: Option<String>,
    /// Submit time in epoch seconds with microsecond precision
    pub timestamp: Option<f64>,
    pub submit_hostname: Option<String>,
    pub submit_dir: Option<String>,
    pub planner_arguments: Option<String>,
    pub user: Option<String>,
    pub grid_dn: Option<String>,
    pub planner_version: Option<String>,
    pub db_url: Option<String>,
}

impl Workflow {
    pub fn new(wf_uuid: impl Into<String>) -> Self {
        Self {
            wf_uuid: wf_uuid.into(),
            ..Default::default()
        }
    }
}

impl Record for Workflow {
    const TABLE: &'static str = "master_workflow";
    const COLUMNS: &'static [&'static str] = &[
        "wf_id",
        "wf_uuid",
        "dax_label",
        "dax_version",
        "dax_file",
        "dag_file_name",
        "timestamp",
        "submit_hostname",
        "submit_dir",
        "planner_arguments",
        "user",
        "grid_dn",
        "planner_version",
        "db_url",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Workflow {
            wf_id: row.get(0)?,
            wf_uuid: row.get(1)?,
            dax_label: row.get(2)?,
            dax_version: row.get(3)?,
            dax_file: row.get(4)?,
            dag_file_name: row.get(5)?,
            timestamp: row.get(6)?,
            submit_hostname: row.get(7)?,
            submit_dir: row.get(8)?,
            planner_arguments: row.get(9)?,
            user: row.get(10)?,
            grid_dn: row.get(11)?,
            planner_version: row.get(12)?,
            db_url: row.get(13)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.wf_id,
            &self.wf_uuid,
            &self.dax_label,
            &self.dax_version,
            &self.dax_file,
            &self.dag_file_name,
            &self.timestamp,
            &self.submit_hostname,
            &self.submit_dir,
            &self.planner_arguments,
            &self.user,
            &self.grid_dn,
            &self.planner_version,
            &self.db_url,
        ]
    }
}

/// One entry in a workflow's state history (`master_workflowstate`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowState {
    pub wf_id: i64,
    pub state: String,
    /// Epoch seconds with microsecond precision
    pub timestamp: f64,
    pub restart_count: i32,
    pub status: Option<i32>,
}

impl WorkflowState {
    pub fn new(wf_id: i64, state: impl Into<String>, timestamp: f64) -> Self {
        Self {
            wf_id,
            state: state.into(),
            timestamp,
            restart_count: 0,
            status: None,
        }
    }

    /// A state entry stamped with the current time
    pub fn now(wf_id: i64, state: impl Into<String>) -> Self {
        let timestamp = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        Self::new(wf_id, state, timestamp)
    }
}

impl Record for WorkflowState {
    const TABLE: &'static str = "master_workflowstate";
    const COLUMNS: &'static [&'static str] =
        &["wf_id", "state", "timestamp", "restart_count", "status"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(WorkflowState {
            wf_id: row.get(0)?,
            state: row.get(1)?,
            timestamp: row.get(2)?,
            restart_count: row.get(3)?,
            status: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.wf_id,
            &self.state,
            &self.timestamp,
            &self.restart_count,
            &self.status,
        ]
    }
}

/// Marker for the kind of catalog a [`Catalog`] row belongs to
pub trait CatalogKind: 'static {
    const TABLE: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replica;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transformation;

impl CatalogKind for Replica {
    const TABLE: &'static str = "replica_catalog";
}

impl CatalogKind for Site {
    const TABLE: &'static str = "site_catalog";
}

impl CatalogKind for Transformation {
    const TABLE: &'static str = "transformation_catalog";
}

/// A user-owned catalog; the three catalog tables share this shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog<K: CatalogKind> {
    pub id: Option<i64>,
    pub name: String,
    pub format: String,
    pub created: NaiveDateTime,
    pub updated: NaiveDateTime,
    pub username: String,
    #[serde(skip)]
    kind: PhantomData<K>,
}

pub type ReplicaCatalog = Catalog<Replica>;
pub type SiteCatalog = Catalog<Site>;
pub type TransformationCatalog = Catalog<Transformation>;

impl<K: CatalogKind> Catalog<K> {
    pub fn new(username: &str, name: &str, format: &str) -> Self {
        let created = now();
        Self {
            id: None,
            name: name.to_string(),
            format: format.to_string(),
            created,
            updated: created,
            username: username.to_string(),
            kind: PhantomData,
        }
    }
}

impl<K: CatalogKind> Record for Catalog<K> {
    const TABLE: &'static str = K::TABLE;
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "format", "created", "updated", "username"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Catalog {
            id: row.get(0)?,
            name: row.get(1)?,
            format: row.get(2)?,
            created: row.get(3)?,
            updated: row.get(4)?,
            username: row.get(5)?,
            kind: PhantomData,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id,
            &self.name,
            &self.format,
            &self.created,
            &self.updated,
            &self.username,
        ]
    }
}

/// A user-owned group of workflows (`ensemble`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ensemble {
    pub id: Option<i64>,
    pub name: String,
    pub created: NaiveDateTime,
    pub updated: NaiveDateTime,
    pub state: String,
    pub max_running: i32,
    pub max_planning: i32,
    pub username: String,
}

impl Ensemble {
    pub fn new(username: &str, name: &str, state: &str) -> Self {
        let created = now();
        Self {
            id: None,
            name: name.to_string(),
            created,
            updated: created,
            state: state.to_string(),
            max_running: 1,
            max_planning: 1,
            username: username.to_string(),
        }
    }
}

impl Record for Ensemble {
    const TABLE: &'static str = "ensemble";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "created",
        "updated",
        "state",
        "max_running",
        "max_planning",
        "username",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Ensemble {
            id: row.get(0)?,
            name: row.get(1)?,
            created: row.get(2)?,
            updated: row.get(3)?,
            state: row.get(4)?,
            max_running: row.get(5)?,
            max_planning: row.get(6)?,
            username: row.get(7)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id,
            &self.name,
            &self.created,
            &self.updated,
            &self.state,
            &self.max_running,
            &self.max_planning,
            &self.username,
        ]
    }
}

/// A workflow scheduled within an ensemble (`ensemble_workflow`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleWorkflow {
    pub id: Option<i64>,
    pub name: String,
    pub created: NaiveDateTime,
    pub updated: NaiveDateTime,
    pub state: String,
    pub priority: i32,
    pub wf_uuid: Option<String>,
    pub submitdir: Option<String>,
    pub ensemble_id: i64,
}

impl EnsembleWorkflow {
    pub fn new(ensemble_id: i64, name: &str, state: &str) -> Self {
        let created = now();
        Self {
            id: None,
            name: name.to_string(),
            created,
            updated: created,
            state: state.to_string(),
            priority: 0,
            wf_uuid: None,
            submitdir: None,
            ensemble_id,
        }
    }
}

impl Record for EnsembleWorkflow {
    const TABLE: &'static str = "ensemble_workflow";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "created",
        "updated",
        "state",
        "priority",
        "wf_uuid",
        "submitdir",
        "ensemble_id",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(EnsembleWorkflow {
            id: row.get(0)?,
            name: row.get(1)?,
            created: row.get(2)?,
            updated: row.get(3)?,
            state: row.get(4)?,
            priority: row.get(5)?,
            wf_uuid: row.get(6)?,
            submitdir: row.get(7)?,
            ensemble_id: row.get(8)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id,
            &self.name,
            &self.created,
            &self.updated,
            &self.state,
            &self.priority,
            &self.wf_uuid,
            &self.submitdir,
            &self.ensemble_id,
        ]
    }
}
