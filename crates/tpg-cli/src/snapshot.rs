//! JSON snapshots of the record store
//!
//! A snapshot carries exactly what the record store would return:
//!
//! ```json
//! { "parameters": [ { "parameter": { ... }, "options": [ ... ] } ], "edges": [ ... ] }
//! ```
//!
//! Edge rows are kept verbatim, malformed ones and duplicates included, so
//! writing a snapshot back never silently repairs remote data.

use crate::error::CliError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tpg_editor::MemoryDependencyStore;
use tpg_graph::{DependencyEdge, GraphStore, LoadReport, ParameterWithOptions};

/// Parameters with their options plus dependency rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Parameters in display order
    pub parameters: Vec<ParameterWithOptions>,
    /// Dependency rows
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
}

impl Snapshot {
    /// Create a snapshot
    #[inline]
    #[must_use]
    pub fn new(parameters: Vec<ParameterWithOptions>, edges: Vec<DependencyEdge>) -> Self {
        Self { parameters, edges }
    }

    /// Parse from JSON text
    pub fn from_json_str(source: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Render as pretty JSON
    pub fn to_json_string(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a snapshot file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = Self::from_json_str(&source)?;
        tracing::debug!(
            "Read snapshot {} with {} parameters and {} edges",
            path.display(),
            snapshot.parameters.len(),
            snapshot.edges.len()
        );
        Ok(snapshot)
    }

    /// Write the snapshot file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), CliError> {
        let path = path.as_ref();
        let mut json = self.to_json_string()?;
        json.push('\n');
        std::fs::write(path, json).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load into a fresh graph
    #[must_use]
    pub fn to_graph(&self) -> (GraphStore, LoadReport) {
        let graph = GraphStore::new();
        let report = graph.load_with_options(self.parameters.clone(), self.edges.clone());
        (graph, report)
    }

    /// Serve the snapshot from an in-memory record store
    #[must_use]
    pub fn into_memory_store(self) -> MemoryDependencyStore {
        MemoryDependencyStore::new(self.parameters, self.edges)
    }

    /// Capture the current contents of an in-memory record store
    #[must_use]
    pub fn from_memory_store(store: &MemoryDependencyStore) -> Self {
        Self::new(store.parameters(), store.edges())
    }
}
