//! Consistency guard
//!
//! Admits or rejects proposed edge mutations so the graph keeps its
//! invariants: no self-loop, no duplicate edge, no cycle, and every edge
//! sourced from a real option of its parent.

use crate::error::Rejection;
use crate::store::{GraphIndex, GraphStore};
use crate::types::DependencyEdge;

/// Checks that only look at the edge and the loaded parameters/options.
///
/// Shared with [`GraphStore::load`], which uses them to spot inert edges.
pub(crate) fn check_structure(index: &GraphIndex, edge: &DependencyEdge) -> Result<(), Rejection> {
    let (parent_id, option_id) = edge.source();
    let child_id = edge.child_parameter_id;

    if parent_id == child_id {
        return Err(Rejection::SelfLoop);
    }

    let parent = index
        .parameter(parent_id)
        .ok_or(Rejection::UnknownParameter(parent_id))?;
    if index.parameter(child_id).is_none() {
        return Err(Rejection::UnknownParameter(child_id));
    }

    let owned = index
        .option(option_id)
        .is_some_and(|option| option.parameter_id == parent_id);
    if !owned || !parent.kind.has_options() {
        return Err(Rejection::UnknownOption {
            parameter: parent_id,
            option: option_id,
        });
    }

    Ok(())
}

pub(crate) fn can_add(index: &GraphIndex, edge: &DependencyEdge) -> Result<(), Rejection> {
    check_structure(index, edge)?;

    if index.contains_edge(edge) {
        return Err(Rejection::DuplicateEdge);
    }

    // The new arc closes a cycle iff the parent is already reachable from the child.
    if index.reaches(edge.child_parameter_id, edge.parent_parameter_id) {
        return Err(Rejection::WouldCreateCycle);
    }

    Ok(())
}

pub(crate) fn can_remove(index: &GraphIndex, edge: &DependencyEdge) -> Result<(), Rejection> {
    if index.contains_edge(edge) {
        Ok(())
    } else {
        Err(Rejection::EdgeNotFound)
    }
}

impl GraphStore {
    /// Ask the guard whether `edge` may be added
    ///
    /// # Errors
    /// - `Rejection::SelfLoop` if parent and child are the same parameter
    /// - `Rejection::UnknownParameter` if either endpoint is not loaded
    /// - `Rejection::UnknownOption` if the option is not a select option of the parent
    /// - `Rejection::DuplicateEdge` if the edge already exists
    /// - `Rejection::WouldCreateCycle` if the parent is reachable from the child
    pub fn check_add(&self, edge: &DependencyEdge) -> Result<(), Rejection> {
        let verdict = can_add(&self.read_index(), edge);
        if let Err(reason) = &verdict {
            tracing::debug!("Rejected dependency {}: {}", edge, reason);
        }
        verdict
    }

    /// Ask the guard whether `edge` may be removed
    ///
    /// Removal can never break an invariant, so this only fails with
    /// `Rejection::EdgeNotFound`.
    pub fn check_remove(&self, edge: &DependencyEdge) -> Result<(), Rejection> {
        can_remove(&self.read_index(), edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptionId, Parameter, ParameterId, ParameterKind, ParameterOption};

    struct Abc {
        store: GraphStore,
        params: [ParameterId; 3],
        options: [OptionId; 3],
    }

    /// A -(a1)-> B -(b1)-> C, all select parameters
    fn abc() -> Abc {
        let params: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|slug| Parameter::new(slug.to_uppercase(), *slug, ParameterKind::Select))
            .collect();
        let options: Vec<_> = params
            .iter()
            .map(|p| ParameterOption::new(p.id, format!("{}1", p.slug)))
            .collect();
        let ids = [params[0].id, params[1].id, params[2].id];
        let option_ids = [options[0].id, options[1].id, options[2].id];

        let store = GraphStore::new();
        store.load(
            params,
            options,
            vec![
                DependencyEdge::new(ids[0], option_ids[0], ids[1]),
                DependencyEdge::new(ids[1], option_ids[1], ids[2]),
            ],
        );
        Abc {
            store,
            params: ids,
            options: option_ids,
        }
    }

    #[test]
    fn rejects_closing_edge() {
        let g = abc();
        let [a, _, c] = g.params;
        let edge = DependencyEdge::new(c, g.options[2], a);
        assert_eq!(g.store.check_add(&edge), Err(Rejection::WouldCreateCycle));
    }

    #[test]
    fn accepts_shortcut_edge() {
        let g = abc();
        let [a, _, c] = g.params;
        let edge = DependencyEdge::new(a, g.options[0], c);
        assert_eq!(g.store.check_add(&edge), Ok(()));
    }

    #[test]
    fn rejects_self_loop_before_anything_else() {
        let g = abc();
        let b = g.params[1];
        // Option belongs to another parameter; self-loop still wins.
        let edge = DependencyEdge::new(b, g.options[0], b);
        assert_eq!(g.store.check_add(&edge), Err(Rejection::SelfLoop));
    }

    #[test]
    fn rejects_duplicates() {
        let g = abc();
        let [a, b, _] = g.params;
        let edge = DependencyEdge::new(a, g.options[0], b);
        assert_eq!(g.store.check_add(&edge), Err(Rejection::DuplicateEdge));
    }

    #[test]
    fn rejects_foreign_option() {
        let g = abc();
        let [a, _, c] = g.params;
        let edge = DependencyEdge::new(a, g.options[1], c);
        assert_eq!(
            g.store.check_add(&edge),
            Err(Rejection::UnknownOption {
                parameter: a,
                option: g.options[1]
            })
        );
    }

    #[test]
    fn rejects_unknown_endpoints() {
        let g = abc();
        let ghost = ParameterId::new();
        let edge = DependencyEdge::new(g.params[0], g.options[0], ghost);
        assert_eq!(
            g.store.check_add(&edge),
            Err(Rejection::UnknownParameter(ghost))
        );
    }

    #[test]
    fn removal_requires_existing_edge() {
        let g = abc();
        let [a, b, c] = g.params;
        assert_eq!(
            g.store.check_remove(&DependencyEdge::new(a, g.options[0], b)),
            Ok(())
        );
        assert_eq!(
            g.store.check_remove(&DependencyEdge::new(a, g.options[0], c)),
            Err(Rejection::EdgeNotFound)
        );
    }
}
