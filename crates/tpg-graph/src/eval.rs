//! Evaluation engine
//!
//! Computes the visible parameter set for a partial selection. Root
//! parameters (no active incoming edge) are always visible; a visible
//! parameter whose selected option sources edges reveals the children of
//! those edges. The traversal is breadth-first and stops at the fixed point.
//!
//! Evaluation never mutates the graph and never owns form state: clearing
//! values of parameters that drop out of the visible set is the caller's
//! job ([`Evaluation::stale`], [`Evaluation::prune`]).

use crate::store::{GraphIndex, GraphStore};
use crate::types::{ParameterId, Selection};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Detailed evaluation result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Visible parameters
    pub visible: BTreeSet<ParameterId>,
    /// Visible parameters in discovery order: roots (load order), then reveals
    pub order: Vec<ParameterId>,
    /// Selected parameters that are not visible
    pub stale: BTreeSet<ParameterId>,
}

impl Evaluation {
    /// Whether `parameter` is visible
    #[inline]
    #[must_use]
    pub fn is_visible(&self, parameter: ParameterId) -> bool {
        self.visible.contains(&parameter)
    }

    /// The selection restricted to visible parameters
    #[must_use]
    pub fn prune(&self, selection: &Selection) -> Selection {
        selection
            .iter()
            .filter(|(parameter, _)| self.visible.contains(*parameter))
            .map(|(parameter, option)| (*parameter, *option))
            .collect()
    }
}

pub(crate) fn evaluate(index: &GraphIndex, selection: &Selection) -> Evaluation {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    for parameter in index.parameters() {
        if index.is_root(parameter.id) && seen.insert(parameter.id) {
            order.push(parameter.id);
            queue.push_back(parameter.id);
        }
    }

    while let Some(parameter) = queue.pop_front() {
        let Some(&option) = selection.get(&parameter) else {
            continue;
        };
        for child in index.children(parameter, option) {
            if seen.insert(child) {
                order.push(child);
                queue.push_back(child);
            }
        }
    }

    let visible: BTreeSet<_> = order.iter().copied().collect();
    let stale = selection
        .keys()
        .filter(|parameter| !visible.contains(*parameter))
        .copied()
        .collect();

    Evaluation {
        visible,
        order,
        stale,
    }
}

impl GraphStore {
    /// The visible parameter set for `selection`
    #[must_use]
    pub fn evaluate(&self, selection: &Selection) -> BTreeSet<ParameterId> {
        self.evaluate_detailed(selection).visible
    }

    /// Like [`evaluate`](Self::evaluate), with discovery order and stale selections
    #[must_use]
    pub fn evaluate_detailed(&self, selection: &Selection) -> Evaluation {
        let evaluation = evaluate(&self.read_index(), selection);
        tracing::trace!(
            "Evaluated {} selections: {} visible, {} stale",
            selection.len(),
            evaluation.visible.len(),
            evaluation.stale.len()
        );
        evaluation
    }
}
