//! Parameter dependency snapshot tool
//!
//! Library side of the `tpg` binary:
//! - [`Snapshot`]: JSON snapshots of the record store
//! - [`commands`]: check, evaluate and edit a snapshot
//! - [`resolve`]: map slugs and labels to ids

pub mod commands;
pub mod error;
pub mod resolve;
pub mod snapshot;

// Re-exports for convenience
pub use commands::{check, edit, eval, CheckReport, EdgeArgs, Edit, EvalReport};
pub use error::CliError;
pub use snapshot::Snapshot;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
