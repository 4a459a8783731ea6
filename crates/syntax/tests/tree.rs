use pretty_assertions::assert_eq;

use syntax::{
    Direction, FilterResult, GreenNode, PathWalker, RedNode, SyntaxKind, TreeBuilder, TreeError, TreeWalker, Trivia,
    WhatToShow,
};

fn ident(text: &str, trailing: Vec<Trivia>) -> GreenNode {
    GreenNode::leaf(SyntaxKind::IDENT, text, vec![], trailing)
}

fn brace(children: Vec<GreenNode>) -> GreenNode {
    let opener = GreenNode::leaf(SyntaxKind::SYMBOL, "{", vec![], vec![Trivia::whitespace(" ")]);
    let closer = GreenNode::leaf(SyntaxKind::SYMBOL, "}", vec![Trivia::whitespace(" ")], vec![]);
    GreenNode::block(opener, children, closer)
}

/// `"pre { a b } post"` built by hand.
fn sample() -> GreenNode {
    GreenNode::list(vec![
        ident("pre", vec![Trivia::whitespace(" ")]),
        brace(vec![ident("a", vec![Trivia::whitespace(" ")]), ident("b", vec![])]),
        GreenNode::leaf(SyntaxKind::IDENT, "post", vec![Trivia::whitespace(" ")], vec![]),
    ])
}

#[test]
fn test_hand_built_tree_renders() {
    let root = sample();
    assert_eq!(root.to_text(), "pre { a b } post");
    assert_eq!(root.width(), 16);
    assert_eq!(root.slot_count(), 3);
}

#[test]
fn test_sequential_builder_edits_share_structure() {
    let v0 = sample();

    let v1 = TreeBuilder::new(v0.clone())
        .replace_child(&[1], 1, ident("B", vec![]))
        .unwrap();
    assert_eq!(v1.to_text(), "pre { a B } post");

    let v2 = TreeBuilder::new(v1.clone()).remove_at(&[1], 0, 1).unwrap();
    assert_eq!(v2.to_text(), "pre { B } post");

    let v3 = TreeBuilder::new(v2.clone())
        .insert_at(&[], 3, &[ident("tail", vec![])])
        .unwrap();
    assert_eq!(v3.to_text(), "pre { B } posttail");

    // every version shares the untouched leaves with the original
    for version in [&v1, &v2, &v3] {
        assert_eq!(version.get_slot(0).unwrap().ptr_eq(v0.get_slot(0).unwrap()), true);
    }
    // old versions are unchanged snapshots
    assert_eq!(v0.to_text(), "pre { a b } post");
    assert_eq!(v1.to_text(), "pre { a B } post");
}

#[test]
fn test_red_view_stays_consistent_across_new_roots() {
    let v0 = sample();
    let red0 = RedNode::new_root(v0.clone());
    let block0 = red0.child(1).unwrap();

    let v1 = TreeBuilder::new(v0).remove_at(&[], 0, 1).unwrap();
    let red1 = RedNode::new_root(v1);

    // the old cursor still describes the old snapshot
    assert_eq!(block0.position(), 4);
    assert_eq!(block0.to_text(), "{ a b }");
    // the new root has its own positions
    assert_eq!(red1.child(0).unwrap().position(), 0);
    assert_eq!(red1.child(0).unwrap().kind(), SyntaxKind::BRACE_BLOCK);
}

#[test]
fn test_red_token_positions_and_trivia() {
    let red = RedNode::new_root(sample());
    let block = red.child(1).unwrap();
    let a = block.child(0).unwrap();

    assert_eq!(a.position(), 6);
    assert_eq!(a.text_position(), 6);
    assert_eq!(a.text_end_position(), 7);
    assert_eq!(a.trailing_trivia().count(), 1);
    assert_eq!(block.inner_start_position(), 6);
    assert_eq!(block.inner_end_position(), 9);
    assert_eq!(block.opener_node().unwrap().position(), 4);
    assert_eq!(block.closer_node().unwrap().end_position(), 11);
}

#[test]
fn test_unclosed_block_has_zero_width_closer() {
    let opener = GreenNode::leaf(SyntaxKind::SYMBOL, "[", vec![], vec![]);
    let closer = GreenNode::leaf(SyntaxKind::SYMBOL, "", vec![], vec![]);
    let block = GreenNode::block(opener, vec![ident("x", vec![])], closer);
    let root = RedNode::new_root(GreenNode::list(vec![block]));

    assert_eq!(root.to_text(), "[x");
    let block = root.child(0).unwrap();
    assert_eq!(block.closer_node().unwrap().green().text(), Some(""));
    // positions never land on the zero-width closer
    assert_eq!(root.find_leaf_at(1).unwrap().green().text(), Some("x"));
    assert_eq!(root.find_leaf_at(2), None);
}

#[test]
fn test_walker_masks_and_filters_compose() {
    let red = RedNode::new_root(sample());

    let leaves: Vec<_> = TreeWalker::new(red.clone(), WhatToShow::LEAVES)
        .map(|n| n.green().text().unwrap().to_owned())
        .collect();
    assert_eq!(leaves, vec!["pre", "a", "b", "post"]);

    // pruning the block drops its leaves from the same walk
    let pruned: Vec<_> = TreeWalker::new(red.clone(), WhatToShow::LEAVES)
        .with_filter(|node| {
            if node.is_block() {
                FilterResult::Reject
            } else {
                FilterResult::Accept
            }
        })
        .map(|n| n.green().text().unwrap().to_owned())
        .collect();
    assert_eq!(pruned, vec!["pre", "post"]);

    let backward: Vec<_> = TreeWalker::new(red, WhatToShow::LEAVES)
        .backward()
        .map(|n| n.green().text().unwrap().to_owned())
        .collect();
    assert_eq!(backward, vec!["post", "b", "a", "pre"]);
}

#[test]
fn test_path_walker_paths_address_builder_targets() {
    let root = sample();
    let red = RedNode::new_root(root.clone());
    let mut walker = PathWalker::new(red);

    // find `b` by walking, then edit it through the recorded path
    let mut target = None;
    while let Some(node) = walker.next() {
        if node.green().text() == Some("b") {
            target = Some(walker.path().to_vec());
            break;
        }
    }
    let path = target.unwrap();
    assert_eq!(path, vec![1, 1]);

    let (container, slot) = (&path[..path.len() - 1], path[path.len() - 1]);
    let edited = TreeBuilder::new(root)
        .replace_child(container, slot, ident("beta", vec![]))
        .unwrap();
    assert_eq!(edited.to_text(), "pre { a beta } post");
}

#[test]
fn test_builder_rejects_descent_through_leaves() {
    let root = sample();
    let builder = TreeBuilder::new(root);
    assert_eq!(
        builder.insert_at(&[0, 0], 0, &[ident("x", vec![])]),
        Err(TreeError::DescendIntoLeaf { kind: SyntaxKind::IDENT })
    );
    assert_eq!(
        builder.replace_child(&[9], 0, ident("x", vec![])),
        Err(TreeError::OutOfRange { index: 9, len: 3 })
    );
}

#[test]
fn test_descendants_and_siblings_roundtrip_order() {
    let red = RedNode::new_root(sample());
    let names: Vec<_> = red
        .descendants()
        .map(|n| n.green().text().map(str::to_owned).unwrap_or_else(|| format!("{:?}", n.kind())))
        .collect();
    assert_eq!(names, vec!["TokenList", "pre", "BraceBlock", "a", "b", "post"]);

    let pre = red.child(0).unwrap();
    let forward: Vec<_> = pre
        .siblings(Direction::Forward)
        .map(|n| format!("{:?}", n.kind()))
        .collect();
    assert_eq!(forward, vec!["Ident", "BraceBlock", "Ident"]);
}
