//! Adjacency indices for the dependency graph
//!
//! Option-level edges are indexed in both directions, and a
//! parameter-collapsed `DiGraphMap` is kept alongside for reachability.
//! Every index is updated incrementally on insert/remove.

use crate::types::{DependencyEdge, OptionId, Parameter, ParameterId, ParameterOption};
use indexmap::{IndexMap, IndexSet};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;
use std::collections::HashMap;

type Source = (ParameterId, OptionId);

#[derive(Debug, Default)]
pub(crate) struct GraphIndex {
    parameters: IndexMap<ParameterId, Parameter>,
    options: IndexMap<OptionId, ParameterOption>,
    options_by_parameter: HashMap<ParameterId, Vec<OptionId>>,
    children: HashMap<Source, IndexSet<ParameterId>>,
    parents: HashMap<ParameterId, IndexSet<Source>>,
    // Weight counts the option-level edges collapsed into the arc.
    arcs: DiGraphMap<ParameterId, u32>,
    edge_count: usize,
}

impl GraphIndex {
    pub(crate) fn insert_parameter(&mut self, parameter: Parameter) {
        self.arcs.add_node(parameter.id);
        self.parameters.insert(parameter.id, parameter);
    }

    /// Returns `false` when the owning parameter is unknown.
    pub(crate) fn insert_option(&mut self, option: ParameterOption) -> bool {
        if !self.parameters.contains_key(&option.parameter_id) {
            return false;
        }
        let owned = self.options_by_parameter.entry(option.parameter_id).or_default();
        if !owned.contains(&option.id) {
            owned.push(option.id);
        }
        self.options.insert(option.id, option);
        true
    }

    pub(crate) fn insert_edge(&mut self, edge: DependencyEdge) -> bool {
        let inserted = self
            .children
            .entry(edge.source())
            .or_default()
            .insert(edge.child_parameter_id);
        if !inserted {
            return false;
        }

        self.parents
            .entry(edge.child_parameter_id)
            .or_default()
            .insert(edge.source());

        let (from, to) = (edge.parent_parameter_id, edge.child_parameter_id);
        match self.arcs.edge_weight_mut(from, to) {
            Some(weight) => *weight += 1,
            None => {
                self.arcs.add_edge(from, to, 1);
            }
        }

        self.edge_count += 1;
        true
    }

    pub(crate) fn remove_edge(&mut self, edge: &DependencyEdge) -> bool {
        let source = edge.source();
        let Some(children) = self.children.get_mut(&source) else {
            return false;
        };
        if !children.shift_remove(&edge.child_parameter_id) {
            return false;
        }
        if children.is_empty() {
            self.children.remove(&source);
        }

        if let Some(parents) = self.parents.get_mut(&edge.child_parameter_id) {
            parents.shift_remove(&source);
            if parents.is_empty() {
                self.parents.remove(&edge.child_parameter_id);
            }
        }

        let (from, to) = (edge.parent_parameter_id, edge.child_parameter_id);
        let drop_arc = match self.arcs.edge_weight_mut(from, to) {
            Some(weight) => {
                *weight -= 1;
                *weight == 0
            }
            None => false,
        };
        if drop_arc {
            self.arcs.remove_edge(from, to);
        }

        self.edge_count -= 1;
        true
    }

    pub(crate) fn contains_edge(&self, edge: &DependencyEdge) -> bool {
        self.children
            .get(&edge.source())
            .is_some_and(|children| children.contains(&edge.child_parameter_id))
    }

    pub(crate) fn children(
        &self,
        parameter: ParameterId,
        option: OptionId,
    ) -> impl Iterator<Item = ParameterId> + '_ {
        self.children
            .get(&(parameter, option))
            .into_iter()
            .flat_map(|children| children.iter().copied())
    }

    pub(crate) fn parents(&self, parameter: ParameterId) -> impl Iterator<Item = Source> + '_ {
        self.parents
            .get(&parameter)
            .into_iter()
            .flat_map(|parents| parents.iter().copied())
    }

    pub(crate) fn is_root(&self, parameter: ParameterId) -> bool {
        self.parents.get(&parameter).map_or(true, IndexSet::is_empty)
    }

    /// Depth-first search over the collapsed graph. Only the part reachable
    /// from `from` is visited.
    pub(crate) fn reaches(&self, from: ParameterId, to: ParameterId) -> bool {
        if !self.arcs.contains_node(from) {
            return false;
        }
        let mut dfs = Dfs::new(&self.arcs, from);
        while let Some(node) = dfs.next(&self.arcs) {
            if node == to {
                return true;
            }
        }
        false
    }

    pub(crate) fn parameter(&self, id: ParameterId) -> Option<&Parameter> {
        self.parameters.get(&id)
    }

    pub(crate) fn parameters(&self) -> impl Iterator<Item = &Parameter> + '_ {
        self.parameters.values()
    }

    pub(crate) fn option(&self, id: OptionId) -> Option<&ParameterOption> {
        self.options.get(&id)
    }

    pub(crate) fn options_of(&self, parameter: ParameterId) -> impl Iterator<Item = &ParameterOption> + '_ {
        self.options_by_parameter
            .get(&parameter)
            .into_iter()
            .flatten()
            .filter_map(|id| self.options.get(id))
    }

    pub(crate) fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<_> = self
            .children
            .iter()
            .flat_map(|(&(parent, option), children)| {
                children
                    .iter()
                    .map(move |&child| DependencyEdge::new(parent, option, child))
            })
            .collect();
        edges.sort();
        edges
    }

    pub(crate) fn arcs(&self) -> &DiGraphMap<ParameterId, u32> {
        &self.arcs
    }

    pub(crate) fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub(crate) fn option_count(&self) -> usize {
        self.options.len()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edge_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterKind;

    fn select(index: &mut GraphIndex, slug: &str) -> (ParameterId, OptionId) {
        let parameter = Parameter::new(slug, slug, ParameterKind::Select);
        let id = parameter.id;
        index.insert_parameter(parameter);
        let option = ParameterOption::new(id, "yes");
        let option_id = option.id;
        assert!(index.insert_option(option));
        (id, option_id)
    }

    #[test]
    fn collapsed_arc_counts_parallel_edges() {
        let mut index = GraphIndex::default();
        let (a, a1) = select(&mut index, "a");
        let (b, _) = select(&mut index, "b");
        let a2 = ParameterOption::new(a, "no");
        let a2_id = a2.id;
        index.insert_option(a2);

        let e1 = DependencyEdge::new(a, a1, b);
        let e2 = DependencyEdge::new(a, a2_id, b);
        assert!(index.insert_edge(e1));
        assert!(index.insert_edge(e2));
        assert_eq!(index.arcs().edge_weight(a, b), Some(&2));
        assert_eq!(index.edge_count(), 2);

        assert!(index.remove_edge(&e1));
        assert_eq!(index.arcs().edge_weight(a, b), Some(&1));
        assert!(index.reaches(a, b));

        assert!(index.remove_edge(&e2));
        assert_eq!(index.arcs().edge_weight(a, b), None);
        assert!(!index.reaches(a, b));
        assert!(index.is_root(b));
    }

    #[test]
    fn duplicate_insert_is_refused() {
        let mut index = GraphIndex::default();
        let (a, a1) = select(&mut index, "a");
        let (b, _) = select(&mut index, "b");
        let edge = DependencyEdge::new(a, a1, b);

        assert!(index.insert_edge(edge));
        assert!(!index.insert_edge(edge));
        assert_eq!(index.edge_count(), 1);
        assert_eq!(index.arcs().edge_weight(a, b), Some(&1));
    }

    #[test]
    fn removing_missing_edge_is_a_no_op() {
        let mut index = GraphIndex::default();
        let (a, a1) = select(&mut index, "a");
        let (b, _) = select(&mut index, "b");

        assert!(!index.remove_edge(&DependencyEdge::new(a, a1, b)));
        assert_eq!(index.edge_count(), 0);
    }

    #[test]
    fn option_requires_known_owner() {
        let mut index = GraphIndex::default();
        let orphan = ParameterOption::new(ParameterId::new(), "lost");
        assert!(!index.insert_option(orphan));
        assert_eq!(index.option_count(), 0);
    }
}
