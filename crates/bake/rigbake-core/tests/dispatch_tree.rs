use rigbake_core::frame::CommandEffect;
use rigbake_core::{DispatchNode, DispatchTree, Frame, NodeId, Route};

fn frame(tick: u32, tag: &str) -> Frame {
    let mut f = Frame::new(tick);
    f.commands = Some(CommandEffect {
        commands: vec![format!("say {tag}")],
        execute_condition: None,
    });
    f
}

fn leaf_tick(tree: &DispatchTree, id: NodeId) -> u32 {
    match tree.node(id) {
        DispatchNode::Leaf { tick_index, .. } => *tick_index,
        DispatchNode::Branch { .. } => panic!("expected a leaf"),
    }
}

/// Every leaf below `id`, with a check that each branch bound covers its descendants and
/// siblings are ordered and disjoint.
fn check_ranges(tree: &DispatchTree, id: NodeId) -> Vec<u32> {
    match tree.node(id) {
        DispatchNode::Leaf { tick_index, .. } => vec![*tick_index],
        DispatchNode::Branch {
            min_index,
            max_index,
            children,
        } => {
            assert!(children.len() >= 2, "single-child branches collapse");
            let mut ticks = Vec::new();
            let mut prev_hi: Option<u32> = None;
            for child in children {
                let (lo, hi) = tree.node(*child).range();
                if let Some(p) = prev_hi {
                    assert!(lo > p, "siblings overlap: {p} >= {lo}");
                }
                prev_hi = Some(hi);
                ticks.extend(check_ranges(tree, *child));
            }
            assert_eq!(*min_index, *ticks.first().unwrap());
            assert_eq!(*max_index, *ticks.last().unwrap());
            ticks
        }
    }
}

/// it should build four leaves for frames {0,5,5,20,39} over 40 ticks and route seeks by floor
#[test]
fn scenario_duplicate_tick_and_floor_routing() {
    let frames = vec![
        frame(0, "a"),
        frame(5, "b"),
        frame(5, "c"),
        frame(20, "d"),
        frame(39, "e"),
    ];
    let tree = DispatchTree::build(frames, 40);

    let leaves: Vec<u32> = tree.leaves().into_iter().map(|l| leaf_tick(&tree, l)).collect();
    assert_eq!(leaves, vec![0, 5, 20, 39]);

    match tree.route(10) {
        Route::Leaf(id) => assert_eq!(leaf_tick(&tree, id), 5),
        Route::NoOp => panic!("tick 10 should route to the frame at 5"),
    }
    assert_eq!(tree.route(40), Route::NoOp);
    assert_eq!(tree.route(39), Route::Leaf(tree.find_leaf(39).unwrap()));

    // The duplicate at 5 merged to the larger command effect.
    let merged = tree.frame(tree.find_leaf(5).unwrap()).unwrap();
    assert_eq!(merged.commands.as_ref().unwrap().commands, vec!["say c".to_string()]);
}

/// it should match exactly one leaf for every frame tick and none elsewhere
#[test]
fn exact_lookup_covers_frames_only() {
    let ticks = [0u32, 1, 2, 7, 8, 15, 31, 32, 33, 60, 99];
    let tree = DispatchTree::build(ticks.iter().map(|t| frame(*t, "x")).collect(), 100);
    for tick in 0..100u32 {
        let found = tree.find_leaf(tick);
        if ticks.contains(&tick) {
            let id = found.unwrap_or_else(|| panic!("no leaf for frame tick {tick}"));
            assert_eq!(tree.frame(id).unwrap().tick, tick);
        } else {
            assert!(found.is_none(), "tick {tick} has no frame but matched a leaf");
        }
    }
}

/// it should keep branch bounds tight and siblings disjoint
#[test]
fn branch_ranges_hold() {
    let ticks: Vec<u32> = (0..64).map(|i| i * 4 + (i % 4)).collect();
    let duration = ticks.last().unwrap() + 1;
    let tree = DispatchTree::build(ticks.iter().map(|t| frame(*t, "x")).collect(), duration);
    let covered = check_ranges(&tree, tree.root().unwrap());
    assert_eq!(covered, ticks);
    // 64 leaves split in halves: 6 branch levels plus the leaf.
    assert_eq!(tree.depth(), 7);
}

/// it should produce the identical tree for any permutation of the frame list
#[test]
fn permutation_stability() {
    let base = vec![
        frame(3, "a"),
        frame(3, "b"),
        frame(10, "c"),
        frame(0, "d"),
        frame(10, "e"),
        frame(7, "f"),
        frame(25, "g"),
    ];
    let reference = DispatchTree::build(base.clone(), 30);

    let mut reversed = base.clone();
    reversed.reverse();
    assert_eq!(DispatchTree::build(reversed, 30), reference);

    // Deterministic shuffles: every rotation of the list.
    for shift in 1..base.len() {
        let mut rotated = base.clone();
        rotated.rotate_left(shift);
        assert_eq!(DispatchTree::build(rotated, 30), reference, "rotation {shift}");
    }
}

/// it should drop frames outside the animation domain
#[test]
fn out_of_domain_frames_are_dropped() {
    let tree = DispatchTree::build(vec![frame(2, "a"), frame(20, "b"), frame(50, "c")], 20);
    let leaves: Vec<u32> = tree.leaves().into_iter().map(|l| leaf_tick(&tree, l)).collect();
    assert_eq!(leaves, vec![2]);
    assert_eq!(tree.route(1), Route::NoOp);
    assert!(matches!(tree.route(19), Route::Leaf(_)));
}

/// it should give seek ranges that tile every tick from the first frame to the end
#[test]
fn floor_ranges_tile_the_domain() {
    let ticks = [4u32, 9, 10, 30, 31, 47];
    let tree = DispatchTree::build(ticks.iter().map(|t| frame(*t, "x")).collect(), 50);

    fn walk(tree: &DispatchTree, id: NodeId, lo: u32, hi: u32, out: &mut Vec<(u32, u32, u32)>) {
        match tree.node(id) {
            DispatchNode::Leaf { tick_index, .. } => out.push((*tick_index, lo, hi)),
            DispatchNode::Branch { .. } => {
                for (child, clo, chi) in tree.floor_ranges(id, hi) {
                    assert!(clo >= lo && chi <= hi);
                    walk(tree, child, clo, chi, out);
                }
            }
        }
    }
    let mut spans = Vec::new();
    walk(&tree, tree.root().unwrap(), 4, 49, &mut spans);
    assert_eq!(
        spans,
        vec![(4, 4, 8), (9, 9, 9), (10, 10, 29), (30, 30, 30), (31, 31, 46), (47, 47, 49)]
    );
    for tick in 4..50 {
        let Route::Leaf(id) = tree.route(tick) else {
            panic!("tick {tick} should route");
        };
        let (leaf, lo, hi) = spans.iter().find(|(t, _, _)| *t == leaf_tick(&tree, id)).unwrap();
        assert!(*lo <= tick && tick <= *hi, "tick {tick} routed to {leaf}");
    }
}
