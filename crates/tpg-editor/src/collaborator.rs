//! Record store contract
//!
//! The hosted backend owns durable parameters, options and dependency
//! edges. The editor only talks to it through [`DependencyStore`].

use crate::error::PersistenceError;
use async_trait::async_trait;
use tpg_graph::{DependencyEdge, ParameterWithOptions};

/// Remote CRUD for the dependency graph
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DependencyStore: Send + Sync {
    /// Parameters editable in the node editor (select kind), with their options
    async fn fetch_parameters_with_options(&self) -> Result<Vec<ParameterWithOptions>, PersistenceError>;

    /// Every stored dependency edge
    async fn fetch_dependency_edges(&self) -> Result<Vec<DependencyEdge>, PersistenceError>;

    /// Persist a new edge; returns the stored edge
    async fn create_dependency_edge(&self, edge: &DependencyEdge) -> Result<DependencyEdge, PersistenceError>;

    /// Delete every stored row of `edge`
    ///
    /// Fails with `PersistenceError::NotFound` if there is none.
    async fn delete_dependency_edge(&self, edge: &DependencyEdge) -> Result<(), PersistenceError>;
}

#[async_trait]
impl<S> DependencyStore for std::sync::Arc<S>
where
    S: DependencyStore + ?Sized,
{
    async fn fetch_parameters_with_options(&self) -> Result<Vec<ParameterWithOptions>, PersistenceError> {
        (**self).fetch_parameters_with_options().await
    }

    async fn fetch_dependency_edges(&self) -> Result<Vec<DependencyEdge>, PersistenceError> {
        (**self).fetch_dependency_edges().await
    }

    async fn create_dependency_edge(&self, edge: &DependencyEdge) -> Result<DependencyEdge, PersistenceError> {
        (**self).create_dependency_edge(edge).await
    }

    async fn delete_dependency_edge(&self, edge: &DependencyEdge) -> Result<(), PersistenceError> {
        (**self).delete_dependency_edge(edge).await
    }
}
