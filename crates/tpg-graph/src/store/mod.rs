//! Graph store
//!
//! [`GraphStore`] holds the authoritative in-memory dependency graph:
//! - wholesale reloads from the record store ([`GraphStore::load`])
//! - structural queries in both edge directions
//! - low-level edge mutators (callers go through the guard first)
//! - listener registration for change notifications
//!
//! Loaded edges that break the data-model invariants are kept aside as
//! [`InertEdge`]s and never take part in queries or evaluation.

mod events;
mod index;

pub use events::{GraphChange, GraphListener, SubscriptionId};
pub(crate) use index::GraphIndex;

use crate::error::{GraphError, Rejection};
use crate::guard;
use crate::types::{
    DependencyEdge, OptionId, Parameter, ParameterId, ParameterOption, ParameterWithOptions,
};
use events::Listeners;
use parking_lot::RwLock;
use petgraph::algo::{is_cyclic_directed, toposort};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A loaded edge that is ignored because it violates an invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InertEdge {
    /// The edge as stored remotely
    pub edge: DependencyEdge,
    /// Why it is ignored
    pub reason: Rejection,
}

/// Outcome of a wholesale reload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Parameters loaded
    pub parameters: usize,
    /// Options loaded
    pub options: usize,
    /// Active edges loaded
    pub edges: usize,
    /// Edges ignored as malformed
    pub inert: Vec<InertEdge>,
    /// Extra copies of edges that were already loaded
    pub duplicates: Vec<DependencyEdge>,
    /// Options whose parameter is not loaded
    pub orphan_options: Vec<OptionId>,
    /// Whether the active edges contain a cycle
    pub cyclic: bool,
}

impl LoadReport {
    /// True when the remote data satisfied every invariant
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.inert.is_empty()
            && self.duplicates.is_empty()
            && self.orphan_options.is_empty()
            && !self.cyclic
    }
}

/// The in-memory dependency graph
#[derive(Debug, Default)]
pub struct GraphStore {
    index: RwLock<GraphIndex>,
    inert: RwLock<Vec<InertEdge>>,
    listeners: Listeners,
}

impl GraphStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the graph wholesale
    pub fn load(
        &self,
        parameters: Vec<Parameter>,
        options: Vec<ParameterOption>,
        edges: Vec<DependencyEdge>,
    ) -> LoadReport {
        let mut index = GraphIndex::default();
        let mut report = LoadReport::default();

        for parameter in parameters {
            index.insert_parameter(parameter);
        }

        for option in options {
            let id = option.id;
            if !index.insert_option(option) {
                tracing::warn!("Ignoring option {} of unknown parameter", id);
                report.orphan_options.push(id);
            }
        }

        for edge in edges {
            if let Err(reason) = guard::check_structure(&index, &edge) {
                tracing::warn!("Ignoring inert dependency {}: {}", edge, reason);
                report.inert.push(InertEdge { edge, reason });
            } else if !index.insert_edge(edge) {
                tracing::warn!("Duplicate dependency {} in loaded graph", edge);
                report.duplicates.push(edge);
            }
        }

        report.parameters = index.parameter_count();
        report.options = index.option_count();
        report.edges = index.edge_count();
        report.cyclic = is_cyclic_directed(index.arcs());
        if report.cyclic {
            tracing::warn!("Loaded dependency graph contains a cycle");
        }

        *self.index.write() = index;
        *self.inert.write() = report.inert.clone();
        tracing::info!(
            "Dependency graph reloaded: {} parameters, {} edges",
            report.parameters,
            report.edges
        );

        if !self.listeners.is_empty() {
            let change = GraphChange::Reloaded {
                parameters: self.parameters_with_options(),
                edges: self.edges(),
            };
            self.listeners.notify(&change);
        }

        report
    }

    /// Replace the graph wholesale from the record store's nested shape
    pub fn load_with_options(
        &self,
        parameters: Vec<ParameterWithOptions>,
        edges: Vec<DependencyEdge>,
    ) -> LoadReport {
        let mut flat_parameters = Vec::with_capacity(parameters.len());
        let mut flat_options = Vec::new();
        for entry in parameters {
            flat_parameters.push(entry.parameter);
            flat_options.extend(entry.options);
        }
        self.load(flat_parameters, flat_options, edges)
    }

    /// Children directly activated by `(parameter, option)`
    #[must_use]
    pub fn children(&self, parameter: ParameterId, option: OptionId) -> BTreeSet<ParameterId> {
        self.index.read().children(parameter, option).collect()
    }

    /// `(parent, option)` pairs that can activate `parameter`
    #[must_use]
    pub fn parents(&self, parameter: ParameterId) -> BTreeSet<(ParameterId, OptionId)> {
        self.index.read().parents(parameter).collect()
    }

    /// Insert an edge that already passed [`check_add`](Self::check_add)
    ///
    /// Returns `false` if the edge was already present, in which case nothing
    /// changes and no one is notified.
    pub fn add_edge(&self, edge: DependencyEdge) -> bool {
        let inserted = self.index.write().insert_edge(edge);
        if inserted {
            self.listeners.notify(&GraphChange::EdgeAdded(edge));
        } else {
            tracing::debug!("Dependency {} already present", edge);
        }
        inserted
    }

    /// Run the guard and insert under one write lock
    ///
    /// Used to apply an edge that was admitted earlier against a graph that
    /// may have changed since. An edge already present is a no-op returning
    /// `Ok(false)`.
    ///
    /// # Errors
    /// Any other [`Rejection`] from the guard; the graph is unchanged.
    pub fn try_add_edge(&self, edge: DependencyEdge) -> Result<bool, Rejection> {
        let inserted = {
            let mut index = self.index.write();
            match guard::can_add(&index, &edge) {
                Ok(()) => index.insert_edge(edge),
                Err(Rejection::DuplicateEdge) => false,
                Err(reason) => {
                    tracing::debug!("Refused late dependency {}: {}", edge, reason);
                    return Err(reason);
                }
            }
        };
        if inserted {
            self.listeners.notify(&GraphChange::EdgeAdded(edge));
        }
        Ok(inserted)
    }

    /// Remove an edge; returns `false` if it was not present
    pub fn remove_edge(&self, edge: &DependencyEdge) -> bool {
        let removed = self.index.write().remove_edge(edge);
        if removed {
            self.listeners.notify(&GraphChange::EdgeRemoved(*edge));
        }
        removed
    }

    /// Whether the exact edge is active
    #[must_use]
    pub fn contains_edge(&self, edge: &DependencyEdge) -> bool {
        self.index.read().contains_edge(edge)
    }

    /// All active edges, sorted
    #[must_use]
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.index.read().edges()
    }

    /// Edges set aside by the last reload
    #[must_use]
    pub fn inert_edges(&self) -> Vec<InertEdge> {
        self.inert.read().clone()
    }

    /// Look up a parameter
    #[must_use]
    pub fn parameter(&self, id: ParameterId) -> Option<Parameter> {
        self.index.read().parameter(id).cloned()
    }

    /// All parameters in load order
    #[must_use]
    pub fn parameters(&self) -> Vec<Parameter> {
        self.index.read().parameters().cloned().collect()
    }

    /// All parameters in load order, with their options
    #[must_use]
    pub fn parameters_with_options(&self) -> Vec<ParameterWithOptions> {
        let index = self.index.read();
        index
            .parameters()
            .map(|parameter| ParameterWithOptions {
                parameter: parameter.clone(),
                options: index.options_of(parameter.id).cloned().collect(),
            })
            .collect()
    }

    /// Look up an option
    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<ParameterOption> {
        self.index.read().option(id).cloned()
    }

    /// Options of a parameter, in load order
    #[must_use]
    pub fn options_of(&self, parameter: ParameterId) -> Vec<ParameterOption> {
        self.index.read().options_of(parameter).cloned().collect()
    }

    /// Find a parameter by its slug
    #[must_use]
    pub fn find_parameter_by_slug(&self, slug: &str) -> Option<Parameter> {
        self.index
            .read()
            .parameters()
            .find(|parameter| parameter.slug == slug)
            .cloned()
    }

    /// Find an option of `parameter` by its label
    #[must_use]
    pub fn find_option_by_label(&self, parameter: ParameterId, label: &str) -> Option<ParameterOption> {
        self.index
            .read()
            .options_of(parameter)
            .find(|option| option.label == label)
            .cloned()
    }

    /// Parameters with no active incoming edge, in load order
    #[must_use]
    pub fn roots(&self) -> Vec<ParameterId> {
        let index = self.index.read();
        index
            .parameters()
            .map(|parameter| parameter.id)
            .filter(|id| index.is_root(*id))
            .collect()
    }

    /// Parameters ordered parents-before-children
    pub fn topological_order(&self) -> Result<Vec<ParameterId>, GraphError> {
        let index = self.index.read();
        toposort(index.arcs(), None).map_err(|_| GraphError::CycleDetected)
    }

    /// Whether the parameter-collapsed graph is acyclic
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(self.index.read().arcs())
    }

    /// Number of parameters
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.index.read().parameter_count()
    }

    /// Number of active edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.index.read().edge_count()
    }

    /// Register a listener for structural changes
    pub fn subscribe(&self, listener: Arc<dyn GraphListener>) -> SubscriptionId {
        self.listeners.add(listener)
    }

    /// Drop a listener; returns `false` if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn read_index(&self) -> parking_lot::RwLockReadGuard<'_, GraphIndex> {
        self.index.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterKind;
    use parking_lot::Mutex;

    struct Fixture {
        store: GraphStore,
        a: ParameterId,
        a1: OptionId,
        b: ParameterId,
        b1: OptionId,
        c: ParameterId,
    }

    fn fixture() -> Fixture {
        let a = Parameter::new("A", "a", ParameterKind::Select);
        let b = Parameter::new("B", "b", ParameterKind::Select);
        let c = Parameter::new("C", "c", ParameterKind::Number);
        let a1 = ParameterOption::new(a.id, "a1");
        let b1 = ParameterOption::new(b.id, "b1");
        let fx = Fixture {
            store: GraphStore::new(),
            a: a.id,
            a1: a1.id,
            b: b.id,
            b1: b1.id,
            c: c.id,
        };
        let report = fx.store.load(
            vec![a, b, c],
            vec![a1, b1],
            vec![
                DependencyEdge::new(fx.a, fx.a1, fx.b),
                DependencyEdge::new(fx.b, fx.b1, fx.c),
            ],
        );
        assert!(report.is_clean());
        fx
    }

    #[test]
    fn children_and_parents() {
        let fx = fixture();
        assert_eq!(fx.store.children(fx.a, fx.a1), BTreeSet::from([fx.b]));
        assert!(fx.store.children(fx.a, OptionId::new()).is_empty());
        assert_eq!(fx.store.parents(fx.c), BTreeSet::from([(fx.b, fx.b1)]));
        assert!(fx.store.parents(fx.a).is_empty());
    }

    #[test]
    fn roots_and_topological_order() {
        let fx = fixture();
        assert_eq!(fx.store.roots(), vec![fx.a]);
        assert_eq!(fx.store.topological_order().unwrap(), vec![fx.a, fx.b, fx.c]);
    }

    #[test]
    fn reload_supersedes_previous_state() {
        let fx = fixture();
        let report = fx.store.load(Vec::new(), Vec::new(), Vec::new());
        assert_eq!(report.parameters, 0);
        assert_eq!(fx.store.edge_count(), 0);
        assert!(fx.store.parameter(fx.a).is_none());
    }

    #[test]
    fn load_sets_aside_malformed_edges() {
        let fx = fixture();
        let stray_option = OptionId::new();
        let ghost = ParameterId::new();
        let mut edges = fx.store.edges();
        edges.push(DependencyEdge::new(fx.a, stray_option, fx.c));
        edges.push(DependencyEdge::new(fx.a, fx.a1, ghost));
        edges.push(DependencyEdge::new(fx.b, fx.b1, fx.b));
        edges.push(DependencyEdge::new(fx.a, fx.a1, fx.b));

        let report = fx.store.load_with_options(fx.store.parameters_with_options(), edges);

        assert_eq!(report.edges, 2);
        assert_eq!(report.inert.len(), 3);
        assert_eq!(report.duplicates, vec![DependencyEdge::new(fx.a, fx.a1, fx.b)]);
        assert!(!report.is_clean());
        assert!(report
            .inert
            .iter()
            .any(|inert| inert.reason == Rejection::UnknownParameter(ghost)));
        assert!(fx.store.parents(ghost).is_empty());
        assert_eq!(fx.store.inert_edges(), report.inert);
    }

    #[test]
    fn load_reports_cycles() {
        let fx = fixture();
        let c_select = Parameter {
            kind: ParameterKind::Select,
            ..fx.store.parameter(fx.c).unwrap()
        };
        let c1 = ParameterOption::new(fx.c, "c1");
        let mut edges = fx.store.edges();
        edges.push(DependencyEdge::new(fx.c, c1.id, fx.a));

        let mut parameters = fx.store.parameters();
        parameters[2] = c_select;
        let mut options: Vec<_> = fx
            .store
            .parameters_with_options()
            .into_iter()
            .flat_map(|entry| entry.options)
            .collect();
        options.push(c1);

        let report = fx.store.load(parameters, options, edges);
        assert!(report.cyclic);
        assert!(!fx.store.is_acyclic());
        assert_eq!(fx.store.topological_order(), Err(GraphError::CycleDetected));
    }

    #[test]
    fn listeners_see_real_changes_only() {
        let fx = fixture();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = fx
            .store
            .subscribe(Arc::new(move |change: &GraphChange| sink.lock().push(change.clone())));

        let edge = DependencyEdge::new(fx.a, fx.a1, fx.c);
        assert!(fx.store.add_edge(edge));
        assert!(!fx.store.add_edge(edge));
        assert!(fx.store.remove_edge(&edge));
        assert!(!fx.store.remove_edge(&edge));

        assert_eq!(
            *seen.lock(),
            vec![GraphChange::EdgeAdded(edge), GraphChange::EdgeRemoved(edge)]
        );

        assert!(fx.store.unsubscribe(id));
        assert!(!fx.store.unsubscribe(id));
        fx.store.add_edge(edge);
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn late_insert_rechecks_the_current_graph() {
        let fx = fixture();
        let shortcut = DependencyEdge::new(fx.a, fx.a1, fx.c);
        let closing = DependencyEdge::new(fx.b, fx.b1, fx.a);

        assert_eq!(fx.store.try_add_edge(shortcut), Ok(true));
        assert_eq!(fx.store.try_add_edge(shortcut), Ok(false));
        assert_eq!(fx.store.try_add_edge(closing), Err(Rejection::WouldCreateCycle));
        assert_eq!(fx.store.edge_count(), 3);
        assert!(fx.store.is_acyclic());
    }

    #[test]
    fn lookup_by_slug_and_label() {
        let fx = fixture();
        assert_eq!(fx.store.find_parameter_by_slug("b").unwrap().id, fx.b);
        assert_eq!(fx.store.find_option_by_label(fx.b, "b1").unwrap().id, fx.b1);
        assert!(fx.store.find_option_by_label(fx.a, "b1").is_none());
    }
}
