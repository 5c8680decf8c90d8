//! Editor controller
//!
//! Turns node-editor gestures into guarded, persisted graph mutations:
//! - `on_connect`: guard check, remote create, then a guarded local insert
//!   (a saved edge that no longer fits is deleted again)
//! - `on_disconnect`: guard check, remote delete, then local `remove_edge`
//! - `refresh`: remote fetch, then wholesale reload
//!
//! The local graph is only mutated after the record store confirms, so a
//! failed request never leaves a connection on screen that was not saved.
//! The controller is also the only component that sees both the logical
//! graph and the [`Canvas`]; it keeps the latter in sync through a listener
//! on the [`GraphStore`].

use crate::canvas::{Canvas, CanvasEdge, Position};
use crate::collaborator::DependencyStore;
use crate::config::EditorConfig;
use crate::error::{EditorError, PersistenceError};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tpg_graph::{
    DependencyEdge, GraphChange, GraphStore, LoadReport, OptionId, ParameterId, Rejection,
    SubscriptionId,
};

/// Bridges editor gestures to the dependency graph
pub struct EditorController<S> {
    store: S,
    graph: Arc<GraphStore>,
    canvas: Arc<Mutex<Canvas>>,
    config: EditorConfig,
    mounted: AtomicBool,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl<S> EditorController<S> {
    /// The logical graph
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &Arc<GraphStore> {
        &self.graph
    }

    /// The record store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Snapshot of the visual collection
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        self.canvas.lock().clone()
    }

    /// Record a user drag on the canvas
    pub fn move_node(&self, id: ParameterId, position: Position) -> bool {
        self.canvas.lock().move_node(id, position)
    }

    /// Whether the editor is still mounted
    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Detach the editor
    ///
    /// Stops canvas synchronisation; results of requests still in flight
    /// are discarded when they arrive.
    pub fn unmount(&self) {
        if !self.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(id) = self.subscription.lock().take() {
            self.graph.unsubscribe(id);
        }
        tracing::info!("Editor unmounted");
    }

    fn ensure_mounted(&self) -> Result<(), EditorError> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(EditorError::Detached)
        }
    }

    fn accept_result(&self, what: &str) -> Result<(), EditorError> {
        if self.is_mounted() {
            return Ok(());
        }
        tracing::warn!("Discarding {} result: editor unmounted", what);
        Err(EditorError::Detached)
    }
}

impl<S: DependencyStore> EditorController<S> {
    /// Create a controller over `graph`, drawing its current state
    #[must_use]
    pub fn new(store: S, graph: Arc<GraphStore>, config: EditorConfig) -> Self {
        let canvas = Arc::new(Mutex::new(Canvas::new()));
        canvas.lock().apply(&GraphChange::Reloaded {
            parameters: graph.parameters_with_options(),
            edges: graph.edges(),
        });

        let sync = Arc::clone(&canvas);
        let subscription =
            graph.subscribe(Arc::new(move |change: &GraphChange| sync.lock().apply(change)));

        Self {
            store,
            graph,
            canvas,
            config,
            mounted: AtomicBool::new(true),
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// Fetch parameters and edges and reload the graph wholesale
    pub async fn refresh(&self) -> Result<LoadReport, EditorError> {
        self.ensure_mounted()?;

        let fetch = async {
            futures::try_join!(
                self.store.fetch_parameters_with_options(),
                self.store.fetch_dependency_edges()
            )
        };
        let (parameters, edges) = self.persist(fetch).await?;
        self.accept_result("refresh")?;

        let report = self.graph.load_with_options(parameters, edges);
        if !report.duplicates.is_empty() {
            tracing::warn!(
                "Record store holds {} duplicate dependencies",
                report.duplicates.len()
            );
        }
        Ok(report)
    }

    /// User connected an option handle of `source_parameter` to `target_parameter`
    ///
    /// # Errors
    /// - `EditorError::Rejected` if the guard refuses the edge; nothing is sent.
    ///   Also returned when the saved edge no longer fits the graph once the
    ///   store confirms; the saved record is then deleted again
    /// - `EditorError::Persistence` if the record store fails; the graph is unchanged
    /// - `EditorError::Detached` if the editor was unmounted
    pub async fn on_connect(
        &self,
        source_parameter: ParameterId,
        source_option: OptionId,
        target_parameter: ParameterId,
    ) -> Result<DependencyEdge, EditorError> {
        if source_parameter == target_parameter {
            tracing::debug!("Ignoring connection of parameter {} to itself", source_parameter);
            return Err(Rejection::SelfLoop.into());
        }
        self.ensure_mounted()?;

        let edge = DependencyEdge::new(source_parameter, source_option, target_parameter);
        self.graph.check_add(&edge)?;

        let stored = match self.persist(self.store.create_dependency_edge(&edge)).await {
            Ok(stored) => stored,
            Err(err) => {
                self.after_failure(&edge, &err).await;
                return Err(err);
            }
        };
        self.accept_result("connect")?;

        // Other gestures may have landed while the request was in flight.
        match self.graph.try_add_edge(stored) {
            Ok(true) => tracing::info!("Connected {}", stored),
            Ok(false) => tracing::debug!("Dependency {} was already connected", stored),
            Err(reason) => {
                tracing::warn!("Saved dependency {} no longer fits the graph: {}", stored, reason);
                self.withdraw(&stored).await;
                return Err(reason.into());
            }
        }
        Ok(stored)
    }

    /// User deleted a connection
    ///
    /// # Errors
    /// - `EditorError::Rejected` with `Rejection::EdgeNotFound` if the edge is not in the graph
    /// - `EditorError::Persistence` if the record store fails; the graph is unchanged
    /// - `EditorError::Detached` if the editor was unmounted
    pub async fn on_disconnect(&self, edge: DependencyEdge) -> Result<(), EditorError> {
        self.ensure_mounted()?;
        self.graph.check_remove(&edge)?;

        if let Err(err) = self.persist(self.store.delete_dependency_edge(&edge)).await {
            self.after_failure(&edge, &err).await;
            return Err(err);
        }
        self.accept_result("disconnect")?;

        if self.graph.remove_edge(&edge) {
            tracing::info!("Disconnected {}", edge);
        }
        Ok(())
    }

    /// User deleted the canvas edge `edge_id`
    pub async fn on_disconnect_canvas(&self, edge_id: &str) -> Result<(), EditorError> {
        let edge = self
            .canvas
            .lock()
            .edge(edge_id)
            .map(CanvasEdge::dependency)
            .ok_or(Rejection::EdgeNotFound)?;
        self.on_disconnect(edge).await
    }

    async fn persist<T, F>(&self, request: F) -> Result<T, EditorError>
    where
        F: Future<Output = Result<T, PersistenceError>>,
    {
        match tokio::time::timeout(self.config.request_timeout(), request).await {
            Ok(result) => result.map_err(EditorError::from),
            Err(_) => Err(PersistenceError::Timeout {
                duration_secs: self.config.request_timeout_secs,
            }
            .into()),
        }
    }

    /// Delete a saved edge the local graph refused
    async fn withdraw(&self, edge: &DependencyEdge) {
        match self.persist(self.store.delete_dependency_edge(edge)).await {
            Ok(()) => tracing::info!("Withdrew saved dependency {}", edge),
            Err(err) => self.after_failure(edge, &err).await,
        }
    }

    async fn after_failure(&self, edge: &DependencyEdge, err: &EditorError) {
        tracing::warn!("Persisting {} failed: {}", edge, err);
        if !self.config.resync_on_failure || !self.is_mounted() {
            return;
        }
        if let Err(resync) = self.refresh().await {
            tracing::warn!("Resync after failure did not complete: {}", resync);
        }
    }
}

impl<S> Drop for EditorController<S> {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.get_mut().take() {
            self.graph.unsubscribe(id);
        }
    }
}

impl<S> std::fmt::Debug for EditorController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorController")
            .field("config", &self.config)
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}
