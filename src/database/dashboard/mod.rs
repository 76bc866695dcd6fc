//! Dashboard database storage
//!
//! This module provides the persistent database behind the workflow dashboard.
//! The dashboard database stores:
//! - Root workflows and their state history
//! - Per-user replica, site and transformation catalogs
//! - Ensembles and the workflows scheduled within them

mod records;
mod vocabulary;

pub use records::{
    Catalog, CatalogKind, Ensemble, EnsembleWorkflow, Replica, ReplicaCatalog, Site, SiteCatalog,
    Transformation, TransformationCatalog, Workflow, WorkflowState,
};
pub use vocabulary::Vocabularies;

use std::path::Path;

use tracing::info;

use crate::database::core::{
    DatabaseConn, InitOptions, MetaData, RecordStore, Result, SchemaManager, SchemaReport,
    SchemaStatus,
};

/// File name of the dashboard database inside a data directory
pub const DASHBOARD_DB_FILE: &str = "workflow.db";

/// Main dashboard database (SQLite backend)
///
/// Opening the database always runs the schema initializer, so the seven
/// dashboard tables exist and every record type is bound before any record
/// is read or written.
pub struct DashboardDatabase {
    db: DatabaseConn,
    metadata: MetaData,
    report: SchemaReport,
}

impl DashboardDatabase {
    /// Open the dashboard database at the specified path
    ///
    /// If the database doesn't exist, it will be created and initialized.
    /// Existing tables and their rows are left untouched.
    pub fn open(path: &str, options: &InitOptions) -> Result<Self> {
        let db = DatabaseConn::open_path(path)?;
        Self::initialize(db, options)
    }

    /// Open the dashboard database from a data directory
    ///
    /// Creates the standard database file path: `{data_dir}/workflow.db`
    pub fn open_in_dir(data_dir: &str, options: &InitOptions) -> Result<Self> {
        let path = Path::new(data_dir).join(DASHBOARD_DB_FILE);
        Self::open(&path.to_string_lossy(), options)
    }

    /// Create an in-memory dashboard database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(DatabaseConn::open_in_memory()?, &InitOptions::default())
    }

    fn initialize(db: DatabaseConn, options: &InitOptions) -> Result<Self> {
        let mut metadata = MetaData::new();
        let schema = SchemaManager::new(&db);
        if schema.check_status()? == SchemaStatus::NotInitialized {
            info!("Initializing dashboard database schema");
        }
        let report = schema.initialize(&mut metadata, options)?;
        Ok(Self {
            db,
            metadata,
            report,
        })
    }

    /// Typed access to the bound record types
    pub fn store(&self) -> RecordStore<'_> {
        RecordStore::new(&self.db.conn, &self.metadata)
    }

    /// The table registry built while opening
    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    /// What the initializer did when the database was opened
    pub fn report(&self) -> &SchemaReport {
        &self.report
    }

    /// Get the underlying database connection (for advanced queries)
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.db.conn
    }

    /// Current schema status
    pub fn status(&self) -> Result<SchemaStatus> {
        SchemaManager::new(&self.db).check_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::SchemaError;

    fn open() -> DashboardDatabase {
        DashboardDatabase::open_in_memory().unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let db = open();
        assert_eq!(db.status().unwrap(), SchemaStatus::Current);
        assert_eq!(db.metadata().binding_count(), 7);
        assert_eq!(db.report().created.len(), 7);
    }

    #[test]
    fn test_open_in_dir_twice() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let first = DashboardDatabase::open_in_dir(data_dir, &InitOptions::default()).unwrap();
        first.store().insert(&Workflow::new("wf-a")).unwrap();
        drop(first);

        let second = DashboardDatabase::open_in_dir(data_dir, &InitOptions::default()).unwrap();
        assert!(second.report().created.is_empty());
        assert_eq!(second.report().existing.len(), 7);
        assert_eq!(second.store().count::<Workflow>().unwrap(), 1);
        assert!(dir.path().join(DASHBOARD_DB_FILE).exists());
    }

    #[test]
    fn test_workflow_uuid_unique() {
        let db = open();
        let store = db.store();
        store.insert(&Workflow::new("wf-a")).unwrap();
        let err = store.insert(&Workflow::new("wf-a")).unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_workflow_state_history() {
        let db = open();
        let store = db.store();
        let wf_id = store.insert(&Workflow::new("wf-a")).unwrap();

        store
            .insert(&WorkflowState::new(wf_id, "WORKFLOW_STARTED", 1000.5))
            .unwrap();
        store
            .insert(&WorkflowState::new(wf_id, "WORKFLOW_TERMINATED", 1000.5))
            .unwrap();
        store
            .insert(&WorkflowState::new(wf_id, "WORKFLOW_STARTED", 2000.25))
            .unwrap();

        // the full (wf_id, state, timestamp) triple may not repeat
        let err = store
            .insert(&WorkflowState::new(wf_id, "WORKFLOW_STARTED", 1000.5))
            .unwrap_err();
        assert!(err.is_constraint());

        let history: Vec<WorkflowState> = store.find_by("wf_id", wf_id).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().any(|s| s.timestamp == 2000.25));
    }

    #[test]
    fn test_workflow_state_requires_parent() {
        let db = open();
        let err = db
            .store()
            .insert(&WorkflowState::new(42, "WORKFLOW_STARTED", 1.0))
            .unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_workflow_state_rejects_unknown_state() {
        let db = open();
        let store = db.store();
        let wf_id = store.insert(&Workflow::new("wf-a")).unwrap();
        let err = store
            .insert(&WorkflowState::new(wf_id, "WORKFLOW_LOST", 1.0))
            .unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_delete_workflow_cascades() {
        let db = open();
        let store = db.store();
        let wf_id = store.insert(&Workflow::new("wf-a")).unwrap();
        store.insert(&WorkflowState::now(wf_id, "WORKFLOW_STARTED")).unwrap();
        let other = store.insert(&Workflow::new("wf-b")).unwrap();
        store.insert(&WorkflowState::now(other, "WORKFLOW_STARTED")).unwrap();

        let workflow = store
            .find_by::<Workflow, _>("wf_uuid", "wf-a")
            .unwrap()
            .remove(0);
        assert_eq!(store.delete(&workflow).unwrap(), 1);

        assert_eq!(store.count::<WorkflowState>().unwrap(), 1);
        assert!(store
            .find_by::<WorkflowState, _>("wf_id", wf_id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_catalog_names_scoped_per_user() {
        let db = open();
        let store = db.store();

        store.insert(&ReplicaCatalog::new("alice", "rc", "File")).unwrap();
        store.insert(&ReplicaCatalog::new("bob", "rc", "Regex")).unwrap();
        let err = store
            .insert(&ReplicaCatalog::new("alice", "rc", "Regex"))
            .unwrap_err();
        assert!(err.is_constraint());

        store.insert(&SiteCatalog::new("alice", "sites", "XML")).unwrap();
        store.insert(&SiteCatalog::new("bob", "sites", "XML3")).unwrap();
        assert!(store
            .insert(&SiteCatalog::new("bob", "sites", "XML"))
            .unwrap_err()
            .is_constraint());

        store
            .insert(&TransformationCatalog::new("alice", "tc", "Text"))
            .unwrap();
        store
            .insert(&TransformationCatalog::new("bob", "tc", "File"))
            .unwrap();
        assert!(store
            .insert(&TransformationCatalog::new("alice", "tc", "File"))
            .unwrap_err()
            .is_constraint());

        // the same name may appear in different kinds of catalog
        assert_eq!(store.count::<ReplicaCatalog>().unwrap(), 2);
        assert_eq!(store.count::<SiteCatalog>().unwrap(), 2);
        assert_eq!(store.count::<TransformationCatalog>().unwrap(), 2);
    }

    #[test]
    fn test_catalog_format_checked() {
        let db = open();
        let store = db.store();
        assert!(store
            .insert(&SiteCatalog::new("alice", "sites", "Regex"))
            .unwrap_err()
            .is_constraint());
        assert!(store
            .insert(&TransformationCatalog::new("alice", "tc", "XML"))
            .unwrap_err()
            .is_constraint());
    }

    #[test]
    fn test_catalog_roundtrip_keeps_timestamps() {
        let db = open();
        let store = db.store();
        let catalog = ReplicaCatalog::new("alice", "rc", "File");
        let id = store.insert(&catalog).unwrap();

        let loaded: Vec<ReplicaCatalog> = store.find_by("username", "alice").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, Some(id));
        assert_eq!(loaded[0].created, catalog.created);
        assert_eq!(loaded[0].format, "File");
    }

    #[test]
    fn test_ensemble_names_scoped_per_user() {
        let db = open();
        let store = db.store();
        store.insert(&Ensemble::new("alice", "nightly", "ACTIVE")).unwrap();
        store.insert(&Ensemble::new("bob", "nightly", "HELD")).unwrap();
        assert!(store
            .insert(&Ensemble::new("alice", "nightly", "PAUSED"))
            .unwrap_err()
            .is_constraint());
        assert!(store
            .insert(&Ensemble::new("carol", "nightly", "STOPPED"))
            .unwrap_err()
            .is_constraint());
    }

    #[test]
    fn test_every_vocabulary_value_accepted() {
        let db = open();
        let store = db.store();
        let vocab = Vocabularies::default();

        let wf_id = store.insert(&Workflow::new("wf-a")).unwrap();
        for (i, state) in vocab.workflow_states.iter().enumerate() {
            store
                .insert(&WorkflowState::new(wf_id, state.as_str(), i as f64))
                .unwrap();
        }
        for (i, format) in vocab.replica_catalog_formats.iter().enumerate() {
            store
                .insert(&ReplicaCatalog::new("alice", &format!("rc-{}", i), format))
                .unwrap();
        }
        for (i, format) in vocab.site_catalog_formats.iter().enumerate() {
            store
                .insert(&SiteCatalog::new("alice", &format!("sc-{}", i), format))
                .unwrap();
        }
        for (i, format) in vocab.transformation_catalog_formats.iter().enumerate() {
            store
                .insert(&TransformationCatalog::new("alice", &format!("tc-{}", i), format))
                .unwrap();
        }
        for (i, state) in vocab.ensemble_states.iter().enumerate() {
            store
                .insert(&Ensemble::new("alice", &format!("e-{}", i), state))
                .unwrap();
        }
        let ensemble_id = store.insert(&Ensemble::new("bob", "runs", "ACTIVE")).unwrap();
        for (i, state) in vocab.ensemble_workflow_states.iter().enumerate() {
            store
                .insert(&EnsembleWorkflow::new(ensemble_id, &format!("w-{}", i), state))
                .unwrap();
        }

        assert_eq!(
            store.count::<WorkflowState>().unwrap() as usize,
            vocab.workflow_states.len()
        );
        assert_eq!(
            store.count::<ReplicaCatalog>().unwrap() as usize,
            vocab.replica_catalog_formats.len()
        );
        assert_eq!(
            store.count::<SiteCatalog>().unwrap() as usize,
            vocab.site_catalog_formats.len()
        );
        assert_eq!(
            store.count::<TransformationCatalog>().unwrap() as usize,
            vocab.transformation_catalog_formats.len()
        );
        assert_eq!(
            store.count::<Ensemble>().unwrap() as usize,
            vocab.ensemble_states.len() + 1
        );
        let states: Vec<String> = store
            .all::<EnsembleWorkflow>()
            .unwrap()
            .into_iter()
            .map(|w| w.state)
            .collect();
        for state in &vocab.ensemble_workflow_states {
            assert!(states.contains(state), "missing {}", state);
        }
    }

    #[test]
    fn test_ensemble_workflows() {
        let db = open();
        let store = db.store();
        let first = store.insert(&Ensemble::new("alice", "e1", "ACTIVE")).unwrap();
        let second = store.insert(&Ensemble::new("alice", "e2", "ACTIVE")).unwrap();

        store
            .insert(&EnsembleWorkflow::new(first, "run", "READY"))
            .unwrap();
        store
            .insert(&EnsembleWorkflow::new(second, "run", "QUEUED"))
            .unwrap();
        assert!(store
            .insert(&EnsembleWorkflow::new(first, "run", "RUNNING"))
            .unwrap_err()
            .is_constraint());
        assert!(store
            .insert(&EnsembleWorkflow::new(first, "other", "DONE"))
            .unwrap_err()
            .is_constraint());
        assert!(store
            .insert(&EnsembleWorkflow::new(999, "orphan", "READY"))
            .unwrap_err()
            .is_constraint());

        let ensemble = store
            .find_by::<Ensemble, _>("name", "e1")
            .unwrap()
            .remove(0);
        store.delete(&ensemble).unwrap();
        let remaining: Vec<EnsembleWorkflow> = store.all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].ensemble_id, second);
    }

    #[test]
    fn test_find_by_unbound_column() {
        let db = open();
        let err = db
            .store()
            .find_by::<Ensemble, _>("owner", "alice")
            .unwrap_err();
        assert!(matches!(err, SchemaError::Binding { .. }));
    }

    #[test]
    fn test_unbound_record_refused() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let metadata = MetaData::new();
        let store = RecordStore::new(&db.conn, &metadata);
        let err = store.insert(&Workflow::new("wf-a")).unwrap_err();
        assert!(matches!(err, SchemaError::Unbound(_)));
        assert!(matches!(
            store.count::<Ensemble>(),
            Err(SchemaError::Unbound(_))
        ));
    }
}
