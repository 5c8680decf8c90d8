//! Error types for the parameter graph
//!
//! - [`Rejection`]: a proposed edge mutation was refused by the guard
//! - [`GraphError`]: a structural query could not be answered

use crate::types::{OptionId, ParameterId};

/// Why the consistency guard refused an edge mutation
///
/// All rejections are recoverable: the mutation is discarded and nothing
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Parent and child are the same parameter
    #[error("a parameter cannot depend on itself")]
    SelfLoop,

    /// The exact edge already exists
    #[error("dependency already exists")]
    DuplicateEdge,

    /// Adding the edge would close a cycle
    #[error("dependency would create a cycle")]
    WouldCreateCycle,

    /// The option does not exist or is not owned by the parent parameter
    #[error("option {option} is not an option of parameter {parameter}")]
    UnknownOption {
        /// Claimed owner
        parameter: ParameterId,
        /// Offending option
        option: OptionId,
    },

    /// An endpoint names a parameter that is not loaded
    #[error("unknown parameter {0}")]
    UnknownParameter(ParameterId),

    /// Removal of an edge that is not present
    #[error("dependency not found")]
    EdgeNotFound,
}

/// Structural query errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The loaded graph contains a cycle
    #[error("dependency graph contains a cycle")]
    CycleDetected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_display() {
        assert!(Rejection::WouldCreateCycle.to_string().contains("cycle"));
        assert!(Rejection::SelfLoop.to_string().contains("itself"));

        let parameter = ParameterId::new();
        let option = OptionId::new();
        let err = Rejection::UnknownOption { parameter, option };
        assert!(err.to_string().contains(&option.to_string()));
    }
}
