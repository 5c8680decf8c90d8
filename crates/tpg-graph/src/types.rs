//! Core types for the parameter graph
//!
//! Defines the data model shared by every component:
//! - Parameter and option identities
//! - Parameters, their options and input kinds
//! - Dependency edges and user selections

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique parameter identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterId(pub Uuid);

impl ParameterId {
    /// Generate new parameter ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParameterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ParameterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ParameterId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Unique option identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub Uuid);

impl OptionId {
    /// Generate new option ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OptionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Input type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Free text
    #[default]
    Text,
    /// Numeric value
    Number,
    /// One of a fixed list of options
    Select,
    /// Yes / no
    Boolean,
}

impl ParameterKind {
    /// Whether options of this kind may source dependency edges
    #[inline]
    #[must_use]
    pub fn has_options(self) -> bool {
        matches!(self, Self::Select)
    }
}

/// A configurable slot on a task template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter ID
    pub id: ParameterId,
    /// Display label
    pub label: String,
    /// Machine slug
    pub slug: String,
    /// Input type
    #[serde(default)]
    pub kind: ParameterKind,
    /// Whether a value is required once the parameter is visible
    #[serde(default)]
    pub required: bool,
}

impl Parameter {
    /// Create a parameter with a fresh ID
    #[must_use]
    pub fn new(label: impl Into<String>, slug: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            id: ParameterId::new(),
            label: label.into(),
            slug: slug.into(),
            kind,
            required: false,
        }
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A selectable value of a `select` parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterOption {
    /// Option ID
    pub id: OptionId,
    /// Owning parameter
    pub parameter_id: ParameterId,
    /// Display label
    pub label: String,
}

impl ParameterOption {
    /// Create an option with a fresh ID
    #[must_use]
    pub fn new(parameter_id: ParameterId, label: impl Into<String>) -> Self {
        Self {
            id: OptionId::new(),
            parameter_id,
            label: label.into(),
        }
    }
}

/// A parameter together with its options, as fetched from the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterWithOptions {
    /// The parameter
    pub parameter: Parameter,
    /// Its options (empty for non-select kinds)
    #[serde(default)]
    pub options: Vec<ParameterOption>,
}

/// "Selecting `parent_option_id` on `parent_parameter_id` makes `child_parameter_id` applicable"
///
/// The tuple is the identity of the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Parent parameter
    pub parent_parameter_id: ParameterId,
    /// Option of the parent that activates the child
    pub parent_option_id: OptionId,
    /// Child parameter
    pub child_parameter_id: ParameterId,
}

impl DependencyEdge {
    /// Create new edge
    #[inline]
    #[must_use]
    pub fn new(parent: ParameterId, option: OptionId, child: ParameterId) -> Self {
        Self {
            parent_parameter_id: parent,
            parent_option_id: option,
            child_parameter_id: child,
        }
    }

    /// Source `(parameter, option)` pair
    #[inline]
    #[must_use]
    pub fn source(&self) -> (ParameterId, OptionId) {
        (self.parent_parameter_id, self.parent_option_id)
    }
}

impl std::fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}] -> {}",
            self.parent_parameter_id, self.parent_option_id, self.child_parameter_id
        )
    }
}

/// The options the user has picked so far, keyed by parameter
pub type Selection = HashMap<ParameterId, OptionId>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ParameterKind::Select).unwrap();
        assert_eq!(json, "\"select\"");

        let kind: ParameterKind = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(kind, ParameterKind::Boolean);
    }

    #[test]
    fn only_select_has_options() {
        assert!(ParameterKind::Select.has_options());
        assert!(!ParameterKind::Text.has_options());
        assert!(!ParameterKind::Number.has_options());
        assert!(!ParameterKind::Boolean.has_options());
    }

    #[test]
    fn ids_parse_from_uuid_strings() {
        let id = ParameterId::new();
        let parsed: ParameterId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<OptionId>().is_err());
    }

    #[test]
    fn edge_identity_is_the_tuple() {
        let (p, o, c) = (ParameterId::new(), OptionId::new(), ParameterId::new());
        assert_eq!(DependencyEdge::new(p, o, c), DependencyEdge::new(p, o, c));
        assert_ne!(
            DependencyEdge::new(p, o, c),
            DependencyEdge::new(p, OptionId::new(), c)
        );
    }

    #[test]
    fn parameter_defaults_on_deserialize() {
        let id = ParameterId::new();
        let json = format!(r#"{{"id":"{id}","label":"Wall","slug":"wall"}}"#);
        let param: Parameter = serde_json::from_str(&json).unwrap();
        assert_eq!(param.kind, ParameterKind::Text);
        assert!(!param.required);
    }
}
