//! Visible-set evaluation against fixture graphs.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;
use tpg_graph::{DependencyEdge, OptionId, ParameterId, ParameterKind, Selection};
use tpg_test_utils::{abc_chain, GraphFixture};

fn ids(fixture: &GraphFixture, slugs: &[&str]) -> BTreeSet<ParameterId> {
    slugs.iter().map(|slug| fixture.param(slug)).collect()
}

#[test]
fn transitive_reveal() {
    let fixture = abc_chain();
    let store = fixture.store();

    let full = store.evaluate(&fixture.selection(&[("a", "a1"), ("b", "b1")]));
    assert_eq!(full, ids(&fixture, &["a", "b", "c"]));

    let partial = store.evaluate(&fixture.selection(&[("a", "a1")]));
    assert_eq!(partial, ids(&fixture, &["a", "b"]));
}

#[test]
fn changing_a_choice_hides_the_branch() {
    let fixture = abc_chain();
    let store = fixture.store();

    let before = fixture.selection(&[("a", "a1"), ("b", "b1")]);
    let after = fixture.selection(&[("a", "a2"), ("b", "b1")]);

    assert!(store.evaluate(&before).contains(&fixture.param("c")));

    let evaluation = store.evaluate_detailed(&after);
    assert_eq!(evaluation.visible, ids(&fixture, &["a"]));
    assert_eq!(evaluation.stale, ids(&fixture, &["b"]));
    assert_eq!(evaluation.prune(&after), fixture.selection(&[("a", "a2")]));
}

#[test]
fn unconditional_parameters_always_visible() {
    let fixture = abc_chain()
        .input("notes", ParameterKind::Text)
        .input("area", ParameterKind::Number);
    let store = fixture.store();

    for selection in [
        Selection::new(),
        fixture.selection(&[("a", "a2")]),
        fixture.selection(&[("a", "a1"), ("b", "b2"), ("c", "c1")]),
    ] {
        let visible = store.evaluate(&selection);
        assert!(visible.is_superset(&ids(&fixture, &["a", "notes", "area"])));
    }
}

#[test]
fn inert_edges_contribute_nothing() {
    let base = abc_chain().input("d", ParameterKind::Boolean);
    let stray = DependencyEdge::new(base.param("a"), OptionId::new(), base.param("d"));
    let fixture = base.raw_edge(stray);

    let store = fixture.store();
    assert_eq!(store.edge_count(), 2);

    // The malformed edge neither hides D nor reveals anything.
    let visible = store.evaluate(&Selection::new());
    assert_eq!(visible, ids(&fixture, &["a", "d"]));
}

#[test]
fn unknown_selection_entries_are_ignored() {
    let fixture = abc_chain();
    let store = fixture.store();

    let mut selection = fixture.selection(&[("a", "a1")]);
    selection.insert(ParameterId::new(), OptionId::new());
    selection.insert(fixture.param("b"), OptionId::new());

    assert_eq!(store.evaluate(&selection), ids(&fixture, &["a", "b"]));
}

#[test]
fn diamond_reveals_once() {
    let fixture = GraphFixture::new()
        .select("root", &["left", "right"])
        .select("l", &["go"])
        .select("r", &["go"])
        .input("leaf", ParameterKind::Number)
        .edge("root", "left", "l")
        .edge("root", "left", "r")
        .edge("l", "go", "leaf")
        .edge("r", "go", "leaf");
    let store = fixture.store();

    let evaluation =
        store.evaluate_detailed(&fixture.selection(&[("root", "left"), ("l", "go"), ("r", "go")]));
    assert_eq!(evaluation.visible, ids(&fixture, &["root", "l", "r", "leaf"]));
    assert_eq!(evaluation.order.len(), 4);
}

proptest! {
    #[test]
    fn prop_evaluate_is_idempotent(picks in proptest::collection::vec((0..3usize, 0..2usize), 0..4)) {
        let fixture = abc_chain();
        let store = fixture.store();
        let slugs = ["a", "b", "c"];
        let labels = [["a1", "a2"], ["b1", "b2"], ["c1", "c2"]];

        let selection: Selection = picks
            .into_iter()
            .map(|(p, o)| (fixture.param(slugs[p]), fixture.option(slugs[p], labels[p][o])))
            .collect();

        let edges_before = store.edges();
        let first = store.evaluate(&selection);
        let second = store.evaluate(&selection);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(store.edges(), edges_before);
        prop_assert!(first.contains(&fixture.param("a")));
    }
}
