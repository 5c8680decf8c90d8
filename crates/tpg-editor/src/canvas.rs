//! Visual node/edge collection of the editor
//!
//! The canvas is UI state: one node per parameter with a handle per option,
//! one edge per dependency, and whatever positions the user dragged nodes
//! to. It is derived from the logical graph and never consulted by it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tpg_graph::{DependencyEdge, GraphChange, OptionId, ParameterId, ParameterWithOptions};

/// Node coordinates on the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Source handle of a node, one per option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionHandle {
    pub option_id: OptionId,
    pub label: String,
}

/// A parameter drawn on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: ParameterId,
    pub label: String,
    pub handles: Vec<OptionHandle>,
    pub position: Position,
}

/// A dependency drawn on the canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasEdge {
    pub id: String,
    pub source: ParameterId,
    pub source_handle: OptionId,
    pub target: ParameterId,
}

impl CanvasEdge {
    /// Canvas id for a dependency edge
    #[must_use]
    pub fn id_for(edge: &DependencyEdge) -> String {
        format!(
            "{}:{}->{}",
            edge.parent_parameter_id, edge.parent_option_id, edge.child_parameter_id
        )
    }

    /// The logical edge this canvas edge draws
    #[inline]
    #[must_use]
    pub fn dependency(&self) -> DependencyEdge {
        DependencyEdge::new(self.source, self.source_handle, self.target)
    }
}

impl From<DependencyEdge> for CanvasEdge {
    fn from(edge: DependencyEdge) -> Self {
        Self {
            id: Self::id_for(&edge),
            source: edge.parent_parameter_id,
            source_handle: edge.parent_option_id,
            target: edge.child_parameter_id,
        }
    }
}

/// Nodes and edges shown by the editor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canvas {
    nodes: IndexMap<ParameterId, CanvasNode>,
    edges: IndexMap<String, CanvasEdge>,
}

impl Canvas {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the canvas in line with a graph change
    pub fn apply(&mut self, change: &GraphChange) {
        match change {
            GraphChange::Reloaded { parameters, edges } => self.reload(parameters, edges),
            GraphChange::EdgeAdded(edge) => {
                let drawn = CanvasEdge::from(*edge);
                self.edges.insert(drawn.id.clone(), drawn);
            }
            GraphChange::EdgeRemoved(edge) => {
                self.edges.shift_remove(&CanvasEdge::id_for(edge));
            }
        }
    }

    fn reload(&mut self, parameters: &[ParameterWithOptions], edges: &[DependencyEdge]) {
        let mut previous = std::mem::take(&mut self.nodes);
        for entry in parameters {
            let id = entry.parameter.id;
            // Layout is not ours to decide: keep where the user left it, else origin.
            let position = previous
                .shift_remove(&id)
                .map(|node| node.position)
                .unwrap_or_default();
            let handles = entry
                .options
                .iter()
                .map(|option| OptionHandle {
                    option_id: option.id,
                    label: option.label.clone(),
                })
                .collect();
            self.nodes.insert(
                id,
                CanvasNode {
                    id,
                    label: entry.parameter.label.clone(),
                    handles,
                    position,
                },
            );
        }

        self.edges = edges
            .iter()
            .map(|edge| {
                let drawn = CanvasEdge::from(*edge);
                (drawn.id.clone(), drawn)
            })
            .collect();
    }

    /// Record a user drag; returns `false` for an unknown node
    pub fn move_node(&mut self, id: ParameterId, position: Position) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn node(&self, id: ParameterId) -> Option<&CanvasNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CanvasNode> + '_ {
        self.nodes.values()
    }

    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&CanvasEdge> {
        self.edges.get(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &CanvasEdge> + '_ {
        self.edges.values()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
