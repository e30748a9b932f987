use proptest::prelude::*;
use treeline_core::config::TreelineConfig;
use treeline_core::editor::Editor;
use treeline_core::model::block::{NodeKind, OrderStore};
use treeline_core::model::canvas::{Canvas, CanvasBuilder};
use treeline_core::order::build_tree;

fn labels(host: &Canvas, ids: &[&str]) -> Vec<Option<u32>> {
    ids.iter().map(|id| host.order(id)).collect()
}

/// R wraps [A, B] and is the root; C wraps [D]; E wraps [F, G]; X wraps [x1].
fn canvas() -> Canvas {
    Canvas::builder()
        .wrapper("R", 0.0, &["A", "B"])
        .kind("A", NodeKind::Top)
        .wrapper("C", 100.0, &["D"])
        .wrapper("E", 200.0, &["F", "G"])
        .wrapper("X", 400.0, &["x1"])
        .build()
}

fn connected(pairs: &[(&str, &str)]) -> (Canvas, Editor) {
    let mut host = canvas();
    let mut editor = Editor::new(TreelineConfig::default());
    editor.recompute_order(&mut host, "R").expect("root");
    for (from, to) in pairs {
        editor.commit_gesture_edge(&mut host, from, to).expect("edge");
    }
    (host, editor)
}

#[test]
fn worked_example() {
    let mut host = Canvas::builder()
        .wrapper("R", 0.0, &["A", "B"])
        .kind("A", NodeKind::Top)
        .wrapper("C", 100.0, &["D"])
        .build();
    let mut editor = Editor::new(TreelineConfig::default());
    editor.commit_gesture_edge(&mut host, "R", "C").expect("edge");
    editor.recompute_order(&mut host, "C").expect("root");

    let tree = build_tree(&host, editor.edges().iter()).expect("tree");
    assert_eq!(tree.node("R").map(|node| node.pre_order_weight_sum), Some(0));
    assert_eq!(tree.node("C").map(|node| node.pre_order_weight_sum), Some(2));
    assert_eq!(labels(&host, &["A", "B", "D"]), vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn siblings_are_numbered_top_to_bottom() {
    // E sits above X, so E's chain comes first whatever the edge order.
    let (host, _) = connected(&[("R", "C"), ("C", "X"), ("C", "E")]);
    assert_eq!(
        labels(&host, &["A", "B", "D", "F", "G", "x1"]),
        vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]
    );
}

#[test]
fn root_keeps_a_single_child() {
    let (host, editor) = connected(&[("R", "C"), ("R", "E")]);
    assert_eq!(editor.edges().len(), 1);
    assert!(editor.edges().between("R", "E").is_some());
    assert_eq!(labels(&host, &["F", "G", "D"]), vec![Some(3), Some(4), None]);
}

#[test]
fn nested_subtrees_get_contiguous_ranges() {
    let (host, _) = connected(&[("R", "C"), ("C", "E"), ("E", "X")]);
    // Pre-order: R(2) C(1) E(2) X(1)
    assert_eq!(
        labels(&host, &["A", "B", "D", "F", "G", "x1"]),
        vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]
    );
}

#[test]
fn rebuild_is_deterministic() {
    let (mut first, editor) = connected(&[("R", "C"), ("C", "E")]);
    let mut second = first.clone();
    editor.recompute_order(&mut first, "R");
    editor.recompute_order(&mut second, "E");
    let ids = ["A", "B", "D", "F", "G", "x1"];
    assert_eq!(labels(&first, &ids), labels(&second, &ids));
}

#[test]
fn disconnected_chain_is_reset() {
    let (mut host, mut editor) = connected(&[("R", "C"), ("C", "E")]);
    assert_eq!(host.order("F"), Some(4));

    let id = editor.edges().between("C", "E").expect("edge").id().clone();
    editor.dispose_edge(&mut host, &id).expect("disposed");
    assert_eq!(labels(&host, &["F", "G"]), vec![None, None]);
    assert_eq!(labels(&host, &["A", "B", "D"]), vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn disposing_unrelated_block_keeps_labels() {
    let (mut host, mut editor) = connected(&[("R", "C"), ("C", "E")]);
    let ids = ["A", "B", "D", "F", "G"];
    let before = labels(&host, &ids);

    let manager = editor.order_manager(&host, "X");
    host.dispose("X");
    editor.block_disposed(&mut host, &manager);
    assert_eq!(labels(&host, &ids), before);
}

fn assert_contiguous(host: &Canvas) {
    let found = all_labels(host);
    let expected: Vec<u32> = (1..=u32::try_from(found.len()).expect("label count")).collect();
    assert_eq!(found, expected);
}

#[test]
fn disposing_a_mid_tree_wrapper_clears_the_cut_off_subtree() {
    let (mut host, mut editor) = connected(&[("R", "C"), ("C", "E")]);
    assert_eq!(labels(&host, &["F", "G"]), vec![Some(4), Some(5)]);

    let manager = editor.order_manager(&host, "C");
    host.dispose("C");
    assert!(editor.block_disposed(&mut host, &manager));

    assert!(editor.edges().is_empty());
    assert_eq!(labels(&host, &["A", "B"]), vec![Some(1), Some(2)]);
    assert_eq!(labels(&host, &["F", "G"]), vec![None, None]);
    assert_contiguous(&host);
}

#[test]
fn disposing_a_chain_member_closes_the_gap() {
    let (mut host, mut editor) = connected(&[("R", "C"), ("C", "E")]);

    let manager = editor.order_manager(&host, "D");
    host.dispose("D");
    assert!(editor.block_disposed(&mut host, &manager));
    assert_eq!(labels(&host, &["A", "B", "F", "G"]), vec![Some(1), Some(2), Some(3), Some(4)]);
    assert_contiguous(&host);

    let manager = editor.order_manager(&host, "B");
    host.dispose("B");
    assert!(editor.block_disposed(&mut host, &manager));
    assert_eq!(labels(&host, &["A", "F", "G"]), vec![Some(1), Some(2), Some(3)]);
    assert_contiguous(&host);
}

#[test]
fn moving_a_sibling_reorders_labels_on_settle() {
    let (mut host, mut editor) = connected(&[("R", "C"), ("C", "E"), ("C", "X")]);
    assert_eq!(labels(&host, &["F", "G", "x1"]), vec![Some(4), Some(5), Some(6)]);

    // Drag X above E.
    host.move_by("X", 0.0, -250.0);
    assert!(editor.on_drag_settled(&mut host, "X"));
    assert_eq!(labels(&host, &["x1", "F", "G"]), vec![Some(4), Some(5), Some(6)]);
}

#[test]
fn untouched_block_drag_skips_rebuild() {
    let (mut host, mut editor) = connected(&[("R", "C")]);
    host.move_by("X", 10.0, 0.0);
    assert!(!editor.on_drag_settled(&mut host, "X"));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

const MAX_WRAPPERS: usize = 6;

fn arb_scene() -> impl Strategy<Value = (Vec<(f64, usize)>, Vec<(usize, usize)>)> {
    let wrappers = prop::collection::vec((0.0f64..500.0, 0usize..4), 2..=MAX_WRAPPERS);
    let edges = prop::collection::vec((0usize..MAX_WRAPPERS, 0usize..MAX_WRAPPERS), 0..12);
    (wrappers, edges)
}

fn build_scene(wrappers: &[(f64, usize)]) -> Canvas {
    let mut builder = CanvasBuilder::default();
    for (w, (top, len)) in wrappers.iter().enumerate() {
        // The root always has at least one chained block.
        let len = if w == 0 { (*len).max(1) } else { *len };
        let chain: Vec<String> = (0..len).map(|i| format!("w{w}c{i}")).collect();
        let chain: Vec<&str> = chain.iter().map(String::as_str).collect();
        builder = builder.wrapper(&format!("w{w}"), *top, &chain);
    }
    builder.kind("w0c0", NodeKind::Top).build()
}

fn all_labels(host: &Canvas) -> Vec<u32> {
    let mut found: Vec<u32> = host.specs().filter_map(|spec| spec.order).collect();
    found.sort_unstable();
    found
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn labels_are_contiguous_from_one((wrappers, edges) in arb_scene()) {
        let mut host = build_scene(&wrappers);
        let mut editor = Editor::new(TreelineConfig::default());
        for (from, to) in edges {
            let _ = editor.commit_gesture_edge(&mut host, &format!("w{from}"), &format!("w{to}"));
        }
        editor.recompute_order(&mut host, "w0").expect("root");

        let found = all_labels(&host);
        let expected: Vec<u32> = (1..=u32::try_from(found.len()).expect("fits")).collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn rebuild_twice_gives_same_labels((wrappers, edges) in arb_scene()) {
        let mut host = build_scene(&wrappers);
        let mut editor = Editor::new(TreelineConfig::default());
        for (from, to) in edges {
            let _ = editor.commit_gesture_edge(&mut host, &format!("w{from}"), &format!("w{to}"));
        }
        editor.recompute_order(&mut host, "w0");
        let first: Vec<Option<u32>> = host.specs().map(|spec| spec.order).collect();
        editor.recompute_order(&mut host, "w0");
        let second: Vec<Option<u32>> = host.specs().map(|spec| spec.order).collect();
        prop_assert_eq!(first, second);
    }
}
