//! # Property-Based Tests
//!
//! Random edit sequences against a `Session` with the built-in
//! configuration, checking the graph invariants after every step.

use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;
use topology_core::{EdgeId, NodeId, Position, Session};

const KINDS: [&str; 4] = ["network", "vm", "storage", "router"];

#[derive(Debug, Clone)]
enum Op {
    AddNode(usize),
    AddEdge(u64, u64),
    DeleteNode(u64),
    DeleteEdge(u64),
    Move(u64),
    Select(u64),
    Deselect,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..KINDS.len()).prop_map(Op::AddNode),
        4 => (1u64..12, 1u64..12).prop_map(|(a, b)| Op::AddEdge(a, b)),
        1 => (1u64..12).prop_map(Op::DeleteNode),
        1 => (1u64..8).prop_map(Op::DeleteEdge),
        1 => (1u64..12).prop_map(Op::Move),
        1 => (1u64..12).prop_map(Op::Select),
        1 => Just(Op::Deselect),
    ]
}

/// Apply one op; returns whether it succeeded.
fn apply(session: &mut Session, op: &Op) -> bool {
    match *op {
        Op::AddNode(kind) => session.add_node(KINDS[kind]).is_ok(),
        Op::AddEdge(a, b) => session.add_edge(NodeId(a), NodeId(b)).is_ok(),
        Op::DeleteNode(id) => session.delete_node(NodeId(id)).is_ok(),
        Op::DeleteEdge(id) => session.delete_edge(EdgeId(id)).is_ok(),
        Op::Move(id) => session.move_node(NodeId(id), Position::new(1.0, 1.0)).is_ok(),
        Op::Select(id) => session.select(NodeId(id)).is_ok(),
        Op::Deselect => {
            session.deselect();
            true
        }
    }
}

fn assert_invariants(session: &Session) -> Result<(), TestCaseError> {
    let graph = session.graph();
    let mut pairs = BTreeSet::new();

    for edge in graph.edges() {
        let from = graph.node(edge.from);
        let to = graph.node(edge.to);
        prop_assert!(from.is_some() && to.is_some(), "dangling edge {:?}", edge);
        if let (Some(from), Some(to)) = (from, to) {
            prop_assert!(session.rules().allows(&from.type_key, &to.type_key));
        }
        prop_assert!(pairs.insert((edge.from, edge.to)), "duplicate pair {:?}", edge);
    }

    if let Some(selected) = graph.selected() {
        prop_assert!(graph.node(selected).is_some());
    }

    Ok(())
}

proptest! {
    /// Version equals the number of successful mutations; reads never move it.
    #[test]
    fn version_counts_successful_mutations(ops in vec(op_strategy(), 0..80)) {
        let mut session = Session::new();
        let mut successes = 0u64;

        for op in &ops {
            if apply(&mut session, op) {
                successes += 1;
            }
            let _ = session.snapshot();
            let _ = session.build_document();
            prop_assert_eq!(session.version(), successes);
        }
    }

    /// Graph invariants hold after every step.
    #[test]
    fn invariants_hold_after_every_step(ops in vec(op_strategy(), 0..80)) {
        let mut session = Session::new();
        for op in &ops {
            apply(&mut session, op);
            assert_invariants(&session)?;
        }
    }

    /// An edge is created iff both ends exist, the rule allows it and the
    /// pair is not yet connected.
    #[test]
    fn edge_acceptance_matches_preconditions(
        ops in vec(op_strategy(), 0..60),
        from in 1u64..12,
        to in 1u64..12,
    ) {
        let mut session = Session::new();
        for op in &ops {
            apply(&mut session, op);
        }

        let (from, to) = (NodeId(from), NodeId(to));
        let graph = session.graph();
        let expected = match (graph.node(from), graph.node(to)) {
            (Some(a), Some(b)) => {
                session.rules().allows(&a.type_key, &b.type_key)
                    && graph.edge_between(from, to).is_none()
            }
            _ => false,
        };

        prop_assert_eq!(session.add_edge(from, to).is_ok(), expected);
    }

    /// Deleting a node leaves no edge referencing it.
    #[test]
    fn delete_cascades(ops in vec(op_strategy(), 0..60), victim in 1u64..12) {
        let mut session = Session::new();
        for op in &ops {
            apply(&mut session, op);
        }

        let victim = NodeId(victim);
        let _ = session.delete_node(victim);
        prop_assert!(
            session
                .graph()
                .edges()
                .all(|e| e.from != victim && e.to != victim)
        );
    }

    /// Exactly the nodes without incoming edges appear at top level, and
    /// rendering twice gives identical bytes.
    #[test]
    fn roots_and_determinism(ops in vec(op_strategy(), 0..60)) {
        let mut session = Session::new();
        for op in &ops {
            apply(&mut session, op);
        }

        let graph = session.graph();
        let children: BTreeSet<NodeId> = graph.edges().map(|e| e.to).collect();
        let doc = session.build_document();

        for node in graph.nodes() {
            let has_root_sibling_with_label = graph
                .nodes()
                .any(|n| n.label == node.label && !children.contains(&n.id));
            if !children.contains(&node.id) {
                prop_assert!(doc.contains_key(&node.label));
            } else if !has_root_sibling_with_label {
                prop_assert!(!doc.contains_key(&node.label));
            }
        }

        let first = serde_json::to_string(&doc).expect("render");
        let second = serde_json::to_string(&session.build_document()).expect("render");
        prop_assert_eq!(first, second);
    }
}
