//! In-process record store
//!
//! [`MemoryDependencyStore`] keeps parameters and edges in memory and
//! behaves like the hosted backend: edges are rows without a uniqueness
//! constraint, so two racing creates of the same edge both persist. A
//! delete is keyed by the edge tuple and removes every matching row.
//!
//! It can also fail requests on demand and hold writes at a [`WriteGate`],
//! which makes in-flight behaviour observable.

use crate::collaborator::DependencyStore;
use crate::error::PersistenceError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tpg_graph::{DependencyEdge, ParameterWithOptions};

/// A request received by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `fetch_parameters_with_options`
    FetchParameters,
    /// `fetch_dependency_edges`
    FetchEdges,
    /// `create_dependency_edge`
    Create(DependencyEdge),
    /// `delete_dependency_edge`
    Delete(DependencyEdge),
}

#[derive(Debug, Default)]
struct MemoryState {
    parameters: Vec<ParameterWithOptions>,
    edges: Vec<DependencyEdge>,
    fail_next: VecDeque<PersistenceError>,
    fail_writes: Option<PersistenceError>,
    requests: Vec<Request>,
}

/// Record store kept in memory
#[derive(Debug, Default)]
pub struct MemoryDependencyStore {
    state: Mutex<MemoryState>,
    gate: Mutex<Option<WriteGate>>,
}

impl MemoryDependencyStore {
    /// Create a store holding the given records
    #[must_use]
    pub fn new(parameters: Vec<ParameterWithOptions>, edges: Vec<DependencyEdge>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                parameters,
                edges,
                ..MemoryState::default()
            }),
            gate: Mutex::new(None),
        }
    }

    /// Stored parameters
    #[must_use]
    pub fn parameters(&self) -> Vec<ParameterWithOptions> {
        self.state.lock().parameters.clone()
    }

    /// Stored edge rows, duplicates included
    #[must_use]
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.state.lock().edges.clone()
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    /// Fail the next request of any kind with `error`
    pub fn fail_next(&self, error: PersistenceError) {
        self.state.lock().fail_next.push_back(error);
    }

    /// Fail every create/delete with `error` until [`heal`](Self::heal)
    pub fn fail_writes(&self, error: PersistenceError) {
        self.state.lock().fail_writes = Some(error);
    }

    /// Stop failing writes
    pub fn heal(&self) {
        self.state.lock().fail_writes = None;
    }

    /// Hold every create/delete until the returned gate releases it
    pub fn hold_writes(&self) -> WriteGate {
        let gate = WriteGate::new();
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    /// Let writes through without waiting again
    pub fn open_writes(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.open();
        }
    }

    fn begin(&self, request: Request) -> Result<(), PersistenceError> {
        let mut state = self.state.lock();
        state.requests.push(request);
        match state.fail_next.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn begin_write(&self, request: Request) -> Result<(), PersistenceError> {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.begin(request)?;
        match self.state.lock().fail_writes.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DependencyStore for MemoryDependencyStore {
    async fn fetch_parameters_with_options(&self) -> Result<Vec<ParameterWithOptions>, PersistenceError> {
        self.begin(Request::FetchParameters)?;
        Ok(self.parameters())
    }

    async fn fetch_dependency_edges(&self) -> Result<Vec<DependencyEdge>, PersistenceError> {
        self.begin(Request::FetchEdges)?;
        Ok(self.edges())
    }

    async fn create_dependency_edge(&self, edge: &DependencyEdge) -> Result<DependencyEdge, PersistenceError> {
        self.begin_write(Request::Create(*edge)).await?;
        self.state.lock().edges.push(*edge);
        Ok(*edge)
    }

    async fn delete_dependency_edge(&self, edge: &DependencyEdge) -> Result<(), PersistenceError> {
        self.begin_write(Request::Delete(*edge)).await?;
        let mut state = self.state.lock();
        let before = state.edges.len();
        state.edges.retain(|stored| stored != edge);
        if state.edges.len() == before {
            return Err(PersistenceError::NotFound);
        }
        Ok(())
    }
}

/// Holds writes of a [`MemoryDependencyStore`] until released
#[derive(Debug, Clone)]
pub struct WriteGate {
    inner: Arc<GateInner>,
}

#[derive(Debug)]
struct GateInner {
    arrived: Semaphore,
    permits: Semaphore,
}

impl WriteGate {
    fn new() -> Self {
        Self {
            inner: Arc::new(GateInner {
                arrived: Semaphore::new(0),
                permits: Semaphore::new(0),
            }),
        }
    }

    /// Wait until one more write is parked at the gate
    pub async fn wait_for_request(&self) {
        if let Ok(permit) = self.inner.arrived.acquire().await {
            permit.forget();
        }
    }

    /// Let `count` parked (or future) writes through
    pub fn release(&self, count: usize) {
        self.inner.permits.add_permits(count);
    }

    fn open(&self) {
        self.inner.permits.close();
    }

    async fn pass(&self) {
        self.inner.arrived.add_permits(1);
        // A closed gate lets everything through.
        if let Ok(permit) = self.inner.permits.acquire().await {
            permit.forget();
        }
    }
}
