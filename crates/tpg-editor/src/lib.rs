//! Parameter dependency editor
//!
//! The controller side of the node editor used to author the task-parameter
//! dependency graph:
//! - Bridges connect/disconnect gestures to guarded graph mutations
//! - Persists through an async record store before touching the local graph
//! - Keeps the visual canvas in sync with the logical graph
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tpg_editor::{EditorConfig, EditorController, MemoryDependencyStore};
//! use tpg_graph::GraphStore;
//!
//! # async fn example(parameters: Vec<tpg_graph::ParameterWithOptions>) -> Result<(), tpg_editor::EditorError> {
//! let store = MemoryDependencyStore::new(parameters, Vec::new());
//! let editor = EditorController::new(store, Arc::new(GraphStore::new()), EditorConfig::new());
//! editor.refresh().await?;
//!
//! let edge = editor.on_connect(wall, brick, bond).await?;
//! editor.on_disconnect(edge).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod canvas;
pub mod collaborator;
pub mod config;
pub mod controller;
pub mod error;
pub mod memory;

// Re-exports for convenience
pub use canvas::{Canvas, CanvasEdge, CanvasNode, OptionHandle, Position};
pub use collaborator::DependencyStore;
pub use config::EditorConfig;
pub use controller::EditorController;
pub use error::{ConfigError, EditorError, PersistenceError};
pub use memory::{MemoryDependencyStore, Request, WriteGate};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the editor
    pub use crate::{
        Canvas, DependencyStore, EditorConfig, EditorController, EditorError,
        MemoryDependencyStore, PersistenceError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
