//! Task-parameter dependency graph
//!
//! Selecting an option of a "parent" parameter reveals one or more "child"
//! parameters of a construction task template. This crate holds that graph
//! and answers the two questions the application asks of it.
//!
//! # Overview
//!
//! - **GraphStore**: parameters, options and edges with incremental adjacency indices
//! - **Consistency guard**: `check_add`/`check_remove` keep the graph a DAG without duplicates
//! - **Evaluation**: `evaluate` computes the visible parameter set for a partial selection
//!
//! # Example
//!
//! ```rust
//! use tpg_graph::{DependencyEdge, GraphStore, Parameter, ParameterKind, ParameterOption, Selection};
//!
//! let wall = Parameter::new("Wall type", "wall-type", ParameterKind::Select);
//! let brick = ParameterOption::new(wall.id, "Brick");
//! let bond = Parameter::new("Brick bond", "brick-bond", ParameterKind::Text);
//! let (wall_id, brick_id, bond_id) = (wall.id, brick.id, bond.id);
//!
//! let store = GraphStore::new();
//! store.load(vec![wall, bond], vec![brick], Vec::new());
//!
//! let edge = DependencyEdge::new(wall_id, brick_id, bond_id);
//! store.check_add(&edge).unwrap();
//! store.add_edge(edge);
//!
//! assert!(!store.evaluate(&Selection::new()).contains(&bond_id));
//! assert!(store.evaluate(&Selection::from([(wall_id, brick_id)])).contains(&bond_id));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod eval;
pub mod guard;
pub mod store;
pub mod types;

// Re-exports
pub use error::{GraphError, Rejection};
pub use eval::Evaluation;
pub use store::{GraphChange, GraphListener, GraphStore, InertEdge, LoadReport, SubscriptionId};
pub use types::{
    DependencyEdge, OptionId, Parameter, ParameterId, ParameterKind, ParameterOption,
    ParameterWithOptions, Selection,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for graph operations
    pub use crate::{
        DependencyEdge, Evaluation, GraphChange, GraphListener, GraphStore, OptionId, Parameter,
        ParameterId, ParameterKind, ParameterOption, ParameterWithOptions, Rejection, Selection,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
