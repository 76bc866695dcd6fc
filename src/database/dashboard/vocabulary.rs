//! Value sets for enumerated columns
//!
//! The legal values of every `state`/`format` column are owned by the catalog
//! and ensemble services, not by the schema. They are handed to the
//! initializer at call time; re-initializing a fresh registry with a changed
//! set yields tables constrained to the new set.

use serde::{Deserialize, Serialize};

/// Enumerated value sets consumed by the dashboard schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabularies {
    /// `master_workflowstate.state`
    pub workflow_states: Vec<String>,
    /// `replica_catalog.format`
    pub replica_catalog_formats: Vec<String>,
    /// `site_catalog.format`
    pub site_catalog_formats: Vec<String>,
    /// `transformation_catalog.format`
    pub transformation_catalog_formats: Vec<String>,
    /// `ensemble.state`
    pub ensemble_states: Vec<String>,
    /// `ensemble_workflow.state`
    pub ensemble_workflow_states: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self {
            workflow_states: owned(&["WORKFLOW_STARTED", "WORKFLOW_TERMINATED"]),
            replica_catalog_formats: owned(&["File", "Regex"]),
            site_catalog_formats: owned(&["XML", "XML3"]),
            transformation_catalog_formats: owned(&["Text", "File"]),
            ensemble_states: owned(&["ACTIVE", "HELD", "PAUSED"]),
            ensemble_workflow_states: owned(&[
                "READY",
                "PLANNING",
                "PLAN_FAILED",
                "QUEUED",
                "RUNNING",
                "SUCCESSFUL",
                "FAILED",
                "ABORTED",
            ]),
        }
    }
}
