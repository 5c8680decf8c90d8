//! Testing utilities for the tpg workspace
//!
//! Shared fixtures: graphs described by slug and option label, so tests can
//! read like the scenarios they check.

#![allow(missing_docs)]

use std::sync::Arc;
use tpg_editor::MemoryDependencyStore;
use tpg_graph::{
    DependencyEdge, GraphStore, OptionId, Parameter, ParameterId, ParameterKind, ParameterOption,
    ParameterWithOptions, Selection,
};

/// A graph under construction, addressed by slug
#[derive(Debug, Clone, Default)]
pub struct GraphFixture {
    parameters: Vec<ParameterWithOptions>,
    edges: Vec<DependencyEdge>,
}

impl GraphFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a select parameter with the given option labels
    pub fn select(mut self, slug: &str, options: &[&str]) -> Self {
        let parameter = Parameter::new(slug.to_uppercase(), slug, ParameterKind::Select);
        let options = options
            .iter()
            .map(|label| ParameterOption::new(parameter.id, *label))
            .collect();
        self.parameters.push(ParameterWithOptions { parameter, options });
        self
    }

    /// Add a parameter without options
    pub fn input(mut self, slug: &str, kind: ParameterKind) -> Self {
        let parameter = Parameter::new(slug.to_uppercase(), slug, kind);
        self.parameters.push(ParameterWithOptions {
            parameter,
            options: Vec::new(),
        });
        self
    }

    /// Add `parent -(option)-> child`
    pub fn edge(mut self, parent: &str, option: &str, child: &str) -> Self {
        let edge = self.dependency(parent, option, child);
        self.edges.push(edge);
        self
    }

    /// Add an edge as-is, valid or not
    pub fn raw_edge(mut self, edge: DependencyEdge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn param(&self, slug: &str) -> ParameterId {
        self.entry(slug).parameter.id
    }

    pub fn option(&self, slug: &str, label: &str) -> OptionId {
        self.entry(slug)
            .options
            .iter()
            .find(|option| option.label == label)
            .unwrap_or_else(|| panic!("fixture parameter {slug} has no option {label}"))
            .id
    }

    pub fn dependency(&self, parent: &str, option: &str, child: &str) -> DependencyEdge {
        DependencyEdge::new(self.param(parent), self.option(parent, option), self.param(child))
    }

    /// Selection from `(slug, option label)` picks
    pub fn selection(&self, picks: &[(&str, &str)]) -> Selection {
        picks
            .iter()
            .map(|(slug, label)| (self.param(slug), self.option(slug, label)))
            .collect()
    }

    pub fn parameters(&self) -> Vec<ParameterWithOptions> {
        self.parameters.clone()
    }

    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.edges.clone()
    }

    /// A graph store loaded with this fixture
    pub fn store(&self) -> GraphStore {
        let store = GraphStore::new();
        store.load_with_options(self.parameters(), self.edges());
        store
    }

    pub fn shared_store(&self) -> Arc<GraphStore> {
        Arc::new(self.store())
    }

    /// A record store holding this fixture
    pub fn memory_store(&self) -> Arc<MemoryDependencyStore> {
        Arc::new(MemoryDependencyStore::new(self.parameters(), self.edges()))
    }

    fn entry(&self, slug: &str) -> &ParameterWithOptions {
        self.parameters
            .iter()
            .find(|entry| entry.parameter.slug == slug)
            .unwrap_or_else(|| panic!("fixture has no parameter {slug}"))
    }
}

/// `a -(a1)-> b -(b1)-> c`, every parameter a select with two options
pub fn abc_chain() -> GraphFixture {
    GraphFixture::new()
        .select("a", &["a1", "a2"])
        .select("b", &["b1", "b2"])
        .select("c", &["c1", "c2"])
        .edge("a", "a1", "b")
        .edge("b", "b1", "c")
}

/// Route `tracing` output through the test harness; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
