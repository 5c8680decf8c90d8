//! `tpg` subcommands
//!
//! Each command takes a [`Snapshot`] and returns a serializable report;
//! printing is left to the binary.

use crate::error::CliError;
use crate::resolve;
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tpg_editor::{EditorConfig, EditorController};
use tpg_graph::{DependencyEdge, GraphStore, OptionId, ParameterId};

/// A parameter as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterRef {
    /// Parameter id
    pub id: ParameterId,
    /// Machine slug
    pub slug: String,
    /// Display label
    pub label: String,
}

impl ParameterRef {
    fn lookup(graph: &GraphStore, id: ParameterId) -> Self {
        match graph.parameter(id) {
            Some(parameter) => Self {
                id,
                slug: parameter.slug,
                label: parameter.label,
            },
            None => Self {
                id,
                slug: id.to_string(),
                label: String::new(),
            },
        }
    }

    fn many(graph: &GraphStore, ids: impl IntoIterator<Item = ParameterId>) -> Vec<Self> {
        ids.into_iter().map(|id| Self::lookup(graph, id)).collect()
    }
}

/// An ignored edge row and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InertRow {
    /// The row
    pub edge: DependencyEdge,
    /// Why it is ignored
    pub reason: String,
}

/// Result of `tpg check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Parameters loaded
    pub parameters: usize,
    /// Options loaded
    pub options: usize,
    /// Active edges
    pub edges: usize,
    /// Ignored edge rows
    pub inert: Vec<InertRow>,
    /// Extra copies of edge rows
    pub duplicates: Vec<DependencyEdge>,
    /// Options whose parameter is missing
    pub orphan_options: Vec<OptionId>,
    /// Whether the active edges contain a cycle
    pub cyclic: bool,
    /// Parameters visible without any selection
    pub roots: Vec<ParameterRef>,
}

impl CheckReport {
    /// True when the snapshot satisfies every invariant
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.inert.is_empty()
            && self.duplicates.is_empty()
            && self.orphan_options.is_empty()
            && !self.cyclic
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dependency Graph Check")?;
        writeln!(f, "======================")?;
        writeln!(f, "  Parameters: {}", self.parameters)?;
        writeln!(f, "  Options: {}", self.options)?;
        writeln!(f, "  Edges: {}", self.edges)?;
        writeln!(f, "  Inert edges: {}", self.inert.len())?;
        for row in &self.inert {
            writeln!(f, "    {} ({})", row.edge, row.reason)?;
        }
        writeln!(f, "  Duplicates: {}", self.duplicates.len())?;
        for edge in &self.duplicates {
            writeln!(f, "    {edge}")?;
        }
        writeln!(f, "  Orphan options: {}", self.orphan_options.len())?;
        for option in &self.orphan_options {
            writeln!(f, "    {option}")?;
        }
        writeln!(f, "  Acyclic: {}", if self.cyclic { "NO" } else { "yes" })?;
        let roots: Vec<&str> = self.roots.iter().map(|r| r.slug.as_str()).collect();
        writeln!(f, "  Roots: {}", roots.join(", "))?;
        write!(f, "  Status: {}", if self.is_clean() { "CLEAN" } else { "NEEDS ATTENTION" })
    }
}

/// Load a snapshot and report on its consistency
#[must_use]
pub fn check(snapshot: &Snapshot) -> CheckReport {
    let (graph, report) = snapshot.to_graph();
    CheckReport {
        parameters: report.parameters,
        options: report.options,
        edges: report.edges,
        inert: report
            .inert
            .into_iter()
            .map(|inert| InertRow {
                edge: inert.edge,
                reason: inert.reason.to_string(),
            })
            .collect(),
        duplicates: report.duplicates,
        orphan_options: report.orphan_options,
        cyclic: report.cyclic,
        roots: ParameterRef::many(&graph, graph.roots()),
    }
}

/// Result of `tpg eval`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvalReport {
    /// Visible parameters in reveal order
    pub visible: Vec<ParameterRef>,
    /// Selected parameters that are hidden and should be cleared
    pub stale: Vec<ParameterRef>,
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Visible parameters: {}", self.visible.len())?;
        for parameter in &self.visible {
            writeln!(f, "  {} ({})", parameter.slug, parameter.label)?;
        }
        if !self.stale.is_empty() {
            let stale: Vec<&str> = self.stale.iter().map(|r| r.slug.as_str()).collect();
            write!(f, "Hidden selections: {}", stale.join(", "))?;
        }
        Ok(())
    }
}

/// Evaluate the visible parameter set for `parameter=option` picks
pub fn eval<'a>(
    snapshot: &Snapshot,
    picks: impl IntoIterator<Item = &'a str>,
) -> Result<EvalReport, CliError> {
    let (graph, _) = snapshot.to_graph();
    let selection = resolve::selection(&graph, picks)?;
    let evaluation = graph.evaluate_detailed(&selection);

    Ok(EvalReport {
        visible: ParameterRef::many(&graph, evaluation.order.iter().copied()),
        stale: ParameterRef::many(&graph, evaluation.stale.iter().copied()),
    })
}

/// Endpoints of an edge as given on the command line
#[derive(Debug, Clone, Copy)]
pub struct EdgeArgs<'a> {
    /// Parent parameter id or slug
    pub parent: &'a str,
    /// Parent option id or label
    pub option: &'a str,
    /// Child parameter id or slug
    pub child: &'a str,
}

impl EdgeArgs<'_> {
    fn resolve(&self, graph: &GraphStore) -> Result<DependencyEdge, CliError> {
        let parent = resolve::parameter(graph, self.parent)?;
        let option = resolve::option(graph, parent, self.option)?;
        let child = resolve::parameter(graph, self.child)?;
        Ok(DependencyEdge::new(parent, option, child))
    }
}

/// Which edit to run through the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Add a dependency
    Connect,
    /// Remove a dependency
    Disconnect,
}

/// Run a connect or disconnect against the snapshot
///
/// Returns the snapshot as the record store holds it afterwards, and the
/// edge that was added or removed.
pub async fn edit(
    snapshot: Snapshot,
    config: EditorConfig,
    edit: Edit,
    args: EdgeArgs<'_>,
) -> Result<(Snapshot, DependencyEdge), CliError> {
    let remote = Arc::new(snapshot.into_memory_store());
    let editor = EditorController::new(Arc::clone(&remote), Arc::new(GraphStore::new()), config);
    editor.refresh().await?;

    let edge = args.resolve(editor.graph())?;
    let edge = match edit {
        Edit::Connect => {
            editor
                .on_connect(edge.parent_parameter_id, edge.parent_option_id, edge.child_parameter_id)
                .await?
        }
        Edit::Disconnect => {
            editor.on_disconnect(edge).await?;
            edge
        }
    };
    editor.unmount();

    Ok((Snapshot::from_memory_store(&remote), edge))
}
