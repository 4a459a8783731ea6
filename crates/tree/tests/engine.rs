use pretty_assertions::assert_eq;
use rstest::rstest;
use triomphe::Arc;

use query::BoundarySide;
use syntax::{GreenNode, KeywordTable, RedNode, SyntaxKind, TokenizerOptions};
use tree::{InsertPosition, Schema, SyntaxTree};

fn method_call_schema() -> Arc<Schema> {
    let mut schema = Schema::new(TokenizerOptions::default(), KeywordTable::new());
    schema.define_syntax(
        "MethodCall",
        10,
        vec![query::seq([
            query::kind(SyntaxKind::IDENT),
            query::kind(SyntaxKind::SYMBOL).with_text("."),
            query::kind(SyntaxKind::IDENT),
            query::block_of(SyntaxKind::PAREN_BLOCK),
        ])],
    );
    schema.define_syntax(
        "PropertyAccess",
        5,
        vec![query::seq([
            query::kind(SyntaxKind::IDENT),
            query::kind(SyntaxKind::SYMBOL).with_text("."),
            query::kind(SyntaxKind::IDENT),
        ])],
    );
    Arc::new(schema)
}

#[rstest]
#[case("{ a + b }")]
#[case("\"abc")]
#[case("fn f() { g(1, 2.5); } // tail")]
#[case("{ unbalanced")]
#[case("  \n// only trivia\n")]
#[case("")]
fn test_round_trip(#[case] source: &str) {
    assert_eq!(SyntaxTree::parse(source).to_text(), source);
}

#[test]
fn test_balanced_parse_structure() {
    let tree = SyntaxTree::parse("{ a + b }");
    let root = tree.root();
    assert_eq!(root.slot_count(), 1);
    let block = root.child(0).unwrap();
    assert_eq!(block.kind(), SyntaxKind::BRACE_BLOCK);
    assert_eq!(block.slot_count(), 3);
    assert_eq!(block.opener_node().unwrap().green().text(), Some("{"));
    assert_eq!(block.closer_node().unwrap().green().text(), Some("}"));
}

#[test]
fn test_unclosed_string_is_single_error_leaf() {
    let tree = SyntaxTree::parse("\"abc");
    let root = tree.root();
    assert_eq!(root.slot_count(), 1);
    assert_eq!(root.child(0).unwrap().kind(), SyntaxKind::ERROR);
    assert_eq!(tree.green_root().contains_error(), true);
    assert_eq!(tree.to_text(), "\"abc");
}

#[test]
fn test_insert_at_block_inner_start() {
    let mut tree = SyntaxTree::parse("{ }");
    let mut editor = tree.create_editor();
    editor.insert(&query::block().first(), InsertPosition::InnerStart, "x");
    editor.commit().unwrap();
    // the inserted token follows the opener's trailing trivia; nothing lost
    assert_eq!(tree.to_text(), "{ x}");
}

#[test]
fn test_insert_at_block_inner_end() {
    let mut tree = SyntaxTree::parse("{ a }");
    let mut editor = tree.create_editor();
    editor.insert(&query::block().first(), InsertPosition::InnerEnd, " z");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "{ a z }");
}

#[test]
fn test_replace_preserves_trivia() {
    let mut tree = SyntaxTree::parse(" foo ");
    let mut editor = tree.create_editor();
    editor.replace(&query::kind(SyntaxKind::IDENT), "bar");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), " bar ");
}

#[test]
fn test_priority_binding_scenario() {
    let schema = method_call_schema();

    let tree = SyntaxTree::parse_and_bind("a.b()", schema.clone());
    let root = tree.root();
    assert_eq!(root.slot_count(), 1);
    assert_eq!(root.child(0).unwrap().kind(), schema.kind_of("MethodCall").unwrap());

    let tree = SyntaxTree::parse_and_bind("a.b", schema.clone());
    assert_eq!(tree.root().child(0).unwrap().kind(), schema.kind_of("PropertyAccess").unwrap());
}

#[test]
fn test_undo_redo_chain() {
    let mut tree = SyntaxTree::parse("a");

    let mut editor = tree.create_editor();
    editor.insert(&query::kind(SyntaxKind::IDENT).with_text("a"), InsertPosition::After, " b");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "a b");

    let mut editor = tree.create_editor();
    editor.insert(&query::kind(SyntaxKind::IDENT).with_text("b"), InsertPosition::After, " c");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "a b c");

    assert_eq!(tree.undo(), true);
    assert_eq!(tree.undo(), true);
    assert_eq!(tree.to_text(), "a");
    assert_eq!(tree.undo(), false);

    assert_eq!(tree.redo(), true);
    assert_eq!(tree.redo(), true);
    assert_eq!(tree.to_text(), "a b c");
    assert_eq!(tree.redo(), false);
}

#[test]
fn test_undo_redo_restores_root_identity() {
    let mut tree = SyntaxTree::parse("a b");
    let original = tree.green_root().clone();

    let mut editor = tree.create_editor();
    editor.remove(&query::kind(SyntaxKind::IDENT).with_text("b"));
    editor.commit().unwrap();
    let edited = tree.green_root().clone();

    tree.undo();
    assert_eq!(tree.green_root().ptr_eq(&original), true);
    tree.redo();
    assert_eq!(tree.green_root().ptr_eq(&edited), true);
}

#[test]
fn test_structural_sharing_after_edit() {
    let mut tree = SyntaxTree::parse("x { y } z");
    let before = tree.green_root().clone();

    let mut editor = tree.create_editor();
    editor.replace(&query::kind(SyntaxKind::IDENT).with_text("y"), "Y");
    editor.commit().unwrap();
    let after = tree.green_root();

    // off-spine subtrees are shared by reference
    assert_eq!(after.get_slot(0).unwrap().ptr_eq(before.get_slot(0).unwrap()), true);
    assert_eq!(after.get_slot(2).unwrap().ptr_eq(before.get_slot(2).unwrap()), true);
    // the spine was rebuilt
    assert_eq!(after.get_slot(1).unwrap().ptr_eq(before.get_slot(1).unwrap()), false);
    assert_eq!(tree.to_text(), "x { Y } z");
}

#[test]
fn test_batch_commit_applies_position_descending() {
    let mut tree = SyntaxTree::parse("a b c");
    let mut editor = tree.create_editor();
    editor.replace(&query::kind(SyntaxKind::IDENT).with_text("a"), "AA");
    editor.replace(&query::kind(SyntaxKind::IDENT).with_text("c"), "CC");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "AA b CC");
}

#[test]
fn test_same_position_edits_keep_queue_order() {
    let mut tree = SyntaxTree::parse("x");
    let mut editor = tree.create_editor();
    let target = query::kind(SyntaxKind::IDENT);
    editor.insert(&target, InsertPosition::Before, "1");
    editor.insert(&target, InsertPosition::Before, "2");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "12x");
}

#[test]
fn test_remove_and_boundary_targeting() {
    let mut tree = SyntaxTree::parse("{ a b c }");
    let mut editor = tree.create_editor();
    editor.remove(&query::boundary(query::block(), BoundarySide::End));
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "{ a b }");
}

#[test]
fn test_replace_with_transformer() {
    let mut tree = SyntaxTree::parse("a bb ccc");
    let mut editor = tree.create_editor();
    editor.replace_with(&query::kind(SyntaxKind::IDENT), |node| {
        node.green().text().unwrap().to_uppercase()
    });
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "A BB CCC");
}

#[test]
fn test_empty_commit_is_noop() {
    let mut tree = SyntaxTree::parse("a");
    let editor = tree.create_editor();
    editor.commit().unwrap();
    assert_eq!(tree.can_undo(), false);
}

#[test]
fn test_unresolvable_query_is_silent_noop() {
    let mut tree = SyntaxTree::parse("a");
    let mut editor = tree.create_editor();
    editor.insert(&query::keyword("missing"), InsertPosition::After, "x");
    assert_eq!(editor.pending_count(), 0);
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "a");
    assert_eq!(tree.can_undo(), false);
}

#[test]
fn test_rollback_discards_batch() {
    let mut tree = SyntaxTree::parse("a");
    let mut editor = tree.create_editor();
    editor.remove(&query::kind(SyntaxKind::IDENT));
    assert_eq!(editor.pending_count(), 1);
    editor.rollback();
    assert_eq!(tree.to_text(), "a");
    assert_eq!(tree.can_undo(), false);
}

#[test]
fn test_edit_rebinds_incrementally() {
    let schema = method_call_schema();
    let mut tree = SyntaxTree::parse_and_bind("x a.b y", schema.clone());
    let property = schema.kind_of("PropertyAccess").unwrap();
    assert_eq!(tree.nodes_of_kind(property).count(), 1);

    let mut editor = tree.create_editor();
    editor.replace(&query::kind(SyntaxKind::IDENT).with_text("y"), "p.q");
    editor.commit().unwrap();

    assert_eq!(tree.to_text(), "x a.b p.q");
    assert_eq!(tree.nodes_of_kind(property).count(), 2);
}

#[test]
fn test_with_schema_binds_existing_tree() {
    let schema = method_call_schema();
    let plain = SyntaxTree::parse("a.b");
    assert_eq!(plain.root().child(0).unwrap().kind(), SyntaxKind::IDENT);

    let bound = plain.with_schema(schema.clone());
    assert_eq!(bound.root().child(0).unwrap().kind(), schema.kind_of("PropertyAccess").unwrap());
    assert_eq!(bound.to_text(), "a.b");
    // the original tree is untouched
    assert_eq!(plain.root().child(0).unwrap().kind(), SyntaxKind::IDENT);
}

#[test]
fn test_select_resolves_keywords_through_schema() {
    let mut keywords = KeywordTable::new();
    keywords.define("let");
    let schema = Arc::new(Schema::new(TokenizerOptions::default(), keywords));

    let tree = SyntaxTree::parse_with("let x", schema);
    let hits: Vec<_> = tree.select(&query::keyword("let")).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].green().text(), Some("let"));
}

#[test]
fn test_find_node_and_leaf_at() {
    let tree = SyntaxTree::parse("{ a }");
    assert_eq!(tree.find_leaf_at(2).unwrap().green().text(), Some("a"));
    assert_eq!(tree.find_node_at(2).unwrap().kind(), SyntaxKind::BRACE_BLOCK);
    assert_eq!(tree.find_leaf_at(0).unwrap().green().text(), Some("{"));
    assert_eq!(tree.find_node_at(tree.green_root().width()).is_none(), true);
}

#[test]
fn test_leaves_and_nodes_of_kind() {
    let tree = SyntaxTree::parse("a { b } 1");
    let leaf_texts: Vec<_> = tree.leaves().map(|l| l.green().text().unwrap().to_owned()).collect();
    assert_eq!(leaf_texts, vec!["a", "b", "1"]);
    assert_eq!(tree.nodes_of_kind(SyntaxKind::NUMERIC).count(), 1);
    assert_eq!(tree.nodes_of_kind(SyntaxKind::BRACE_BLOCK).count(), 1);
}

#[test]
fn test_dump_shows_structure() {
    let tree = SyntaxTree::parse("{ a }");
    let dump = tree.dump();
    assert_eq!(dump.contains("BraceBlock@0..5"), true);
    assert_eq!(dump.contains("Ident@2..3"), true);
}

#[test]
fn test_lossless_edits_match_textual_edits() {
    let source = "{ alpha + beta }";
    let mut tree = SyntaxTree::parse(source);
    let mut editor = tree.create_editor();
    editor.replace(&query::kind(SyntaxKind::IDENT).with_text("beta"), "gamma");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), source.replace("beta", "gamma"));
}

#[test]
fn test_keyword_category_binding() {
    let mut keywords = KeywordTable::new();
    keywords.define_in_category("let", "decl");
    keywords.define_in_category("const", "decl");
    let mut schema = Schema::new(TokenizerOptions::default(), keywords);
    let decl = schema.define_syntax(
        "Declaration",
        0,
        vec![query::seq([query::keyword_category("decl"), query::kind(SyntaxKind::IDENT)])],
    );

    let tree = SyntaxTree::parse_and_bind("let x const y", Arc::new(schema));
    assert_eq!(tree.nodes_of_kind(decl).count(), 2);
    assert_eq!(tree.to_text(), "let x const y");
}

#[test]
fn test_repeat_until_definition_spans_to_terminator() {
    let mut keywords = KeywordTable::new();
    keywords.define("do");
    keywords.define("end");
    let mut schema = Schema::new(TokenizerOptions::default(), keywords);
    let stmt = schema.define_syntax(
        "DoBlock",
        0,
        vec![query::seq([
            query::keyword("do"),
            query::repeat_until(query::any(), query::keyword("end")),
            query::keyword("end"),
        ])],
    );

    let tree = SyntaxTree::parse_and_bind("do a b end tail", Arc::new(schema));
    let root = tree.root();
    let wrapped = root.child(0).unwrap();
    assert_eq!(wrapped.kind(), stmt);
    assert_eq!(wrapped.slot_count(), 4);
    assert_eq!(root.child(1).unwrap().kind(), SyntaxKind::IDENT);
    assert_eq!(tree.to_text(), "do a b end tail");
}

#[test]
fn test_union_pattern_in_definition() {
    let mut schema = Schema::new(TokenizerOptions::default(), KeywordTable::new());
    let pair = schema.define_syntax(
        "KeyValue",
        0,
        vec![query::seq([
            query::kind(SyntaxKind::IDENT) | query::kind(SyntaxKind::STRING),
            query::kind(SyntaxKind::SYMBOL).with_text(":"),
            query::kind(SyntaxKind::NUMERIC),
        ])],
    );

    let tree = SyntaxTree::parse_and_bind("a: 1 's': 2", Arc::new(schema));
    assert_eq!(tree.nodes_of_kind(pair).count(), 2);
    assert_eq!(tree.to_text(), "a: 1 's': 2");
}

#[test]
fn test_bof_anchored_definition_binds_only_first() {
    let mut schema = Schema::new(TokenizerOptions::default(), KeywordTable::new());
    let header = schema.define_syntax(
        "Header",
        0,
        vec![query::seq([query::bof(), query::kind(SyntaxKind::IDENT)])],
    );

    let tree = SyntaxTree::parse_and_bind("x y", Arc::new(schema));
    let root = tree.root();
    assert_eq!(root.child(0).unwrap().kind(), header);
    assert_eq!(root.child(1).unwrap().kind(), SyntaxKind::IDENT);
}

#[test]
fn test_lookahead_pattern_in_definition() {
    let mut schema = Schema::new(TokenizerOptions::default(), KeywordTable::new());
    // an ident counts as a callee only when a paren block follows; the
    // block itself stays outside the wrapper
    let callee = schema.define_syntax(
        "Callee",
        0,
        vec![query::lookahead(query::kind(SyntaxKind::IDENT), query::block_of(SyntaxKind::PAREN_BLOCK))],
    );

    let tree = SyntaxTree::parse_and_bind("f() g", Arc::new(schema));
    let root = tree.root();
    assert_eq!(root.slot_count(), 3);
    let wrapped = root.child(0).unwrap();
    assert_eq!(wrapped.kind(), callee);
    assert_eq!(wrapped.slot_count(), 1);
    assert_eq!(root.child(1).unwrap().kind(), SyntaxKind::PAREN_BLOCK);
    assert_eq!(root.child(2).unwrap().kind(), SyntaxKind::IDENT);
}

#[test]
fn test_higher_priority_definition_shadows_overlapping_lower() {
    let mut keywords = KeywordTable::new();
    keywords.define("ret");
    let mut schema = Schema::new(TokenizerOptions::default(), keywords);
    // both definitions start at the keyword; the wider, higher-priority one
    // must win even though it was declared second
    let bare = schema.define_syntax("BareReturn", 1, vec![query::keyword("ret")]);
    let valued = schema.define_syntax(
        "ValuedReturn",
        9,
        vec![query::seq([query::keyword("ret"), query::kind(SyntaxKind::NUMERIC)])],
    );

    let tree = SyntaxTree::parse_and_bind("ret 1 ret", Arc::new(schema));
    let root = tree.root();
    assert_eq!(root.slot_count(), 2);
    assert_eq!(root.child(0).unwrap().kind(), valued);
    assert_eq!(root.child(0).unwrap().slot_count(), 2);
    assert_eq!(root.child(1).unwrap().kind(), bare);
}

#[test]
fn test_definitions_apply_inside_every_container() {
    let schema = method_call_schema();
    let property = schema.kind_of("PropertyAccess").unwrap();
    let tree = SyntaxTree::parse_and_bind("a.b { c.d [ e.f ] }", schema);
    assert_eq!(tree.nodes_of_kind(property).count(), 3);
    assert_eq!(tree.to_text(), "a.b { c.d [ e.f ] }");
}

#[test]
fn test_between_query_through_facade() {
    let tree = SyntaxTree::parse("start a b stop c");
    let span = query::between(
        query::kind(SyntaxKind::IDENT).with_text("start"),
        query::kind(SyntaxKind::IDENT).with_text("stop"),
        true,
    );
    let starts: Vec<_> = tree.select(&span).collect();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].green().text(), Some("start"));
    assert_eq!(span.try_match(&starts[0]), Some(4));
}

#[test]
fn test_repeat_query_targets_runs_for_removal() {
    let mut tree = SyntaxTree::parse("a 1 2 3 b");
    // the whole numeric run resolves to one region; remove drops its head
    let run = query::one_or_more(query::kind(SyntaxKind::NUMERIC)).first();
    let mut editor = tree.create_editor();
    editor.remove(&run);
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "a 2 3 b");
}

#[test]
fn test_mixed_operation_commit() {
    let mut tree = SyntaxTree::parse("a b c d");
    let mut editor = tree.create_editor();
    editor.remove(&query::kind(SyntaxKind::IDENT).with_text("b"));
    editor.replace(&query::kind(SyntaxKind::IDENT).with_text("d"), "D");
    editor.insert(&query::kind(SyntaxKind::IDENT).with_text("c"), InsertPosition::Before, "! ");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "a ! c D");
}

#[test]
fn test_edit_inside_nested_block() {
    let mut tree = SyntaxTree::parse("{ [ x ] }");
    let mut editor = tree.create_editor();
    editor.replace(&query::kind(SyntaxKind::IDENT).with_text("x"), "y");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "{ [ y ] }");
}

#[test]
fn test_insert_and_replace_ready_made_nodes() {
    let mut tree = SyntaxTree::parse("a c");
    let b = GreenNode::leaf(SyntaxKind::IDENT, "b", vec![], vec![syntax::Trivia::whitespace(" ")]);
    let mut editor = tree.create_editor();
    editor.insert_nodes(&query::kind(SyntaxKind::IDENT).with_text("c"), InsertPosition::Before, vec![b]);
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "a b c");

    let z = GreenNode::leaf(SyntaxKind::IDENT, "z", vec![], vec![]);
    let mut editor = tree.create_editor();
    editor.replace_nodes(&query::kind(SyntaxKind::IDENT).with_text("b"), vec![z]);
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "a z c");
}

#[test]
fn test_editor_options_drive_inserted_text_lexing() {
    let mut tree = SyntaxTree::parse("a");
    let options = TokenizerOptions::default().with_line_comment("#");
    let mut editor = tree.create_editor_with(options);
    editor.insert(&query::kind(SyntaxKind::IDENT), InsertPosition::After, " x # mark");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "a x # mark");

    // "# mark" was lexed as comment trivia of the inserted token
    let x = tree.select(&query::kind(SyntaxKind::IDENT).with_text("x")).next().unwrap();
    let trailing: Vec<_> = x.trailing_trivia().map(|t| t.text().to_owned()).collect();
    assert_eq!(trailing, vec![" ", "# mark"]);
}

#[test]
fn test_remove_every_match() {
    let mut tree = SyntaxTree::parse("a b c");
    let mut editor = tree.create_editor();
    editor.remove(&query::kind(SyntaxKind::IDENT));
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "");
    tree.undo();
    assert_eq!(tree.to_text(), "a b c");
}

#[test]
fn test_undo_on_bound_tree_restores_bound_root() {
    let schema = method_call_schema();
    let property = schema.kind_of("PropertyAccess").unwrap();
    let mut tree = SyntaxTree::parse_and_bind("a.b", schema);
    let bound_root = tree.green_root().clone();

    let mut editor = tree.create_editor();
    editor.insert(&query::kind(property), InsertPosition::After, " tail");
    editor.commit().unwrap();
    assert_eq!(tree.to_text(), "a.b tail");

    tree.undo();
    assert_eq!(tree.green_root().ptr_eq(&bound_root), true);
    assert_eq!(tree.nodes_of_kind(property).count(), 1);
}

fn assert_green_widths(node: &GreenNode) {
    if node.is_leaf() {
        assert_eq!(node.width(), node.leading_width() + node.text_width() + node.trailing_width());
        return;
    }
    let children_width: u32 = node.children().iter().map(GreenNode::width).sum();
    let delimiters = node.opener().map_or(0, GreenNode::width) + node.closer().map_or(0, GreenNode::width);
    assert_eq!(node.width(), children_width + delimiters);
    for child in node.children() {
        assert_green_widths(child);
    }
}

fn assert_red_positions(node: &RedNode) {
    for (index, child) in node.children().enumerate() {
        let offset = node.green().slot_offset(index).unwrap();
        assert_eq!(child.position(), node.position() + offset);
        assert_eq!(child.end_position(), child.position() + child.green().width());
        assert_red_positions(&child);
    }
}

#[rstest]
#[case("{ a + b } [1, 2.5] x")]
#[case("'str' nested {[({ deep })]} tail // comment\n")]
#[case("\"open { mixed\nlines")]
fn test_width_and_position_consistency(#[case] source: &str) {
    let tree = SyntaxTree::parse(source);
    assert_green_widths(tree.green_root());
    assert_red_positions(&tree.root());
}

#[test]
fn test_clear_history() {
    let mut tree = SyntaxTree::parse("a");
    let mut editor = tree.create_editor();
    editor.remove(&query::kind(SyntaxKind::IDENT));
    editor.commit().unwrap();
    assert_eq!(tree.can_undo(), true);
    tree.clear_history();
    assert_eq!(tree.can_undo(), false);
    assert_eq!(tree.can_redo(), false);
}
