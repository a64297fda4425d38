use rstest::{fixture, rstest};
use treepath::simple_node::{SimpleContext, SimpleDocument, SimpleElement, SimpleItem, comment, doc, elem};
use treepath::{AtomicValue, Axis, CycleDetection, ElementNode, ErrorKind, XPathContext, XPathItem, XPathValue};

fn el(e: &SimpleElement) -> SimpleItem {
    XPathItem::Element(e.clone())
}

// Collects every yielded item with the (position, size) the cursor had at that point.
fn walk(iter: treepath::AxisIter<'_, SimpleDocument>) -> Vec<(SimpleItem, usize, usize)> {
    let mut iter = iter;
    let mut out = Vec::new();
    while let Some(item) = iter.next() {
        let item = item.expect("axis step");
        let ctx = iter.context();
        assert_eq!(ctx.item.as_ref(), Some(&item), "cursor must sit on the yielded item");
        out.push((item, ctx.position, ctx.size));
    }
    out
}

struct Tree {
    root: SimpleElement,
    a: SimpleElement,
    b: SimpleElement,
    c: SimpleElement,
}

// root(text="x", children=[a, b]); b has child c
#[fixture]
fn tree() -> Tree {
    let a = elem("a").build();
    let c = elem("c").build();
    let b = elem("b").child(c.clone()).build();
    let root = elem("root").text("x").child(a.clone()).child(b.clone()).build();
    Tree { root, a, b, c }
}

#[rstest]
fn root_must_be_element_or_document() {
    let rejected: [SimpleItem; 4] = [
        XPathItem::text("x"),
        XPathItem::attribute("id", "1"),
        XPathItem::Element(comment("c")),
        XPathItem::Atomic(AtomicValue::Integer(1)),
    ];
    for bad in rejected {
        let err = SimpleContext::new(bad).expect_err("root rejected");
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(err.message.starts_with("argument 'root' must be an Element"));
    }
}

#[rstest]
fn default_item_is_root_element(tree: Tree) {
    let ctx = SimpleContext::new(el(&tree.root)).unwrap();
    assert_eq!(ctx.item, Some(el(&tree.root)));
    assert_eq!((ctx.position, ctx.size), (0, 1));

    let document = doc(tree.root.clone());
    let ctx = XPathContext::new(XPathItem::Document(document)).unwrap();
    assert_eq!(ctx.item, Some(el(&tree.root)));
    assert_eq!(ctx.root_element(), tree.root);
}

#[rstest]
fn debug_rendering_lists_cursor_fields(tree: Tree) {
    let ctx = SimpleContext::builder(el(&tree.root)).with_position(2).with_size(5).build().unwrap();
    let rendered = format!("{ctx:?}");
    assert!(rendered.starts_with("XPathContext(root="));
    assert!(rendered.ends_with("position=2, size=5)"));
}

#[rstest]
fn self_axis_yields_current_item_once(tree: Tree) {
    let mut ctx = SimpleContext::new(el(&tree.root)).unwrap();
    ctx.item = Some(el(&tree.b));
    let items: Vec<_> = ctx.iter_self().collect::<Result<_, _>>().unwrap();
    assert_eq!(items, vec![el(&tree.b)]);
    assert_eq!(ctx.item, Some(el(&tree.b)));
    assert_eq!(ctx.active_iterator(), None);
}

#[rstest]
fn self_axis_keeps_element_kind_test(tree: Tree) {
    let mut ctx = SimpleContext::new(el(&tree.root)).unwrap();
    ctx.item = Some(XPathItem::attribute("id", "1"));
    let mut it = ctx.iter_self();
    assert!(it.next().is_some());
    assert_eq!(it.context().active_iterator(), Some(Axis::SelfAxis));
    assert!(!it.context().principal_node_kind());
}

#[rstest]
fn self_axis_on_document_sentinel_yields_document() {
    let document = doc(elem("root"));
    let mut ctx = XPathContext::new(XPathItem::Document(document.clone())).unwrap();
    ctx.item = None;
    let items: Vec<_> = ctx.iter_self().collect::<Result<_, _>>().unwrap();
    assert_eq!(items, vec![XPathItem::Document(document)]);
}

#[rstest]
fn attributes_are_sorted_by_name() {
    let e = elem("e").attr("b", "2").attr("a", "1").build();
    let mut ctx = SimpleContext::new(el(&e)).unwrap();
    let items: Vec<_> = ctx.iter_attributes().collect::<Result<_, _>>().unwrap();
    assert_eq!(items, vec![XPathItem::attribute("a", "1"), XPathItem::attribute("b", "2")]);
    assert_eq!(ctx.item, Some(el(&e)));
}

#[rstest]
fn attribute_axis_switches_principal_node_kind() {
    let e = elem("e").attr("id", "1").build();
    let mut ctx = SimpleContext::new(el(&e)).unwrap();
    assert!(ctx.principal_node_kind());
    {
        let mut it = ctx.iter_attributes();
        assert_eq!(it.next().unwrap().unwrap(), XPathItem::attribute("id", "1"));
        assert!(it.context().principal_node_kind());
        assert_eq!(it.context().active_iterator(), Some(Axis::Attribute));
    }
    assert!(ctx.principal_node_kind());
    assert_eq!(ctx.active_iterator(), None);
}

#[rstest]
fn attribute_axis_on_non_element_is_empty() {
    let root = elem("root").child(comment("c")).build();
    let mut ctx = SimpleContext::new(el(&root)).unwrap();
    ctx.item = Some(XPathItem::Element(root.children()[0].clone()));
    assert_eq!(ctx.iter_attributes().count(), 0);
    ctx.item = Some(XPathItem::text("t"));
    assert_eq!(ctx.iter_attributes().count(), 0);
}

#[rstest]
fn children_yield_text_then_elements(tree: Tree) {
    let mut ctx = SimpleContext::new(el(&tree.root)).unwrap();
    let steps = walk(ctx.iter_children(None));
    assert_eq!(
        steps,
        vec![(XPathItem::text("x"), 0, 1), (el(&tree.a), 0, 2), (el(&tree.b), 1, 2)]
    );
    assert_eq!(ctx.item, Some(el(&tree.root)));
}

#[rstest]
fn children_of_given_item(tree: Tree) {
    let mut ctx = SimpleContext::new(el(&tree.root)).unwrap();
    let items: Vec<_> = ctx.iter_children(Some(el(&tree.b))).collect::<Result<_, _>>().unwrap();
    assert_eq!(items, vec![el(&tree.c)]);
    assert_eq!(ctx.item, Some(el(&tree.root)));
}

#[rstest]
fn children_of_document_sentinel_is_root_element(tree: Tree) {
    let mut ctx = XPathContext::new(XPathItem::Document(doc(tree.root.clone()))).unwrap();
    ctx.item = None;
    let steps = walk(ctx.iter_children(None));
    assert_eq!(steps, vec![(el(&tree.root), 0, 1)]);
    assert_eq!(ctx.item, None);
}

#[rstest]
fn children_of_text_or_comment_are_empty() {
    let root = elem("root").child(comment("c")).build();
    let mut ctx = SimpleContext::new(el(&root)).unwrap();
    assert_eq!(ctx.iter_children(Some(XPathItem::text("t"))).count(), 0);
    assert_eq!(ctx.iter_children(Some(XPathItem::Element(root.children()[0].clone()))).count(), 0);
}

#[rstest]
fn descendants_in_document_order(tree: Tree) {
    let mut ctx = SimpleContext::new(el(&tree.root)).unwrap();
    let steps = walk(ctx.iter_descendants(None));
    assert_eq!(
        steps,
        vec![
            (el(&tree.root), 0, 1),
            (XPathItem::text("x"), 0, 1),
            (el(&tree.a), 0, 2),
            (el(&tree.b), 1, 2),
            (el(&tree.c), 0, 1),
        ]
    );
}

#[rstest]
fn descendant_size_tracks_immediate_parent() {
    // after leaving b's subtree, d is reported with root's fan-out again
    let b = elem("b").child(elem("c1")).child(elem("c2")).child(elem("c3"));
    let root = elem("root").child(b).child(elem("d")).build();
    let mut ctx = SimpleContext::new(el(&root)).unwrap();
    let steps = walk(ctx.iter_descendants(None));
    let positions: Vec<_> = steps.into_iter().map(|(_, p, s)| (p, s)).collect();
    assert_eq!(positions, vec![(0, 1), (0, 2), (0, 3), (1, 3), (2, 3), (1, 2)]);
}

#[rstest]
fn descendants_from_document_sentinel_start_with_document(tree: Tree) {
    let document = doc(tree.root.clone());
    let mut ctx = SimpleContext::builder(XPathItem::Document(document.clone()))
        .with_position(4)
        .with_size(9)
        .build()
        .unwrap();
    ctx.item = None;
    let items: Vec<_> = {
        let mut it = ctx.iter_descendants(None);
        let first = it.next().unwrap().unwrap();
        assert_eq!(first, XPathItem::Document(document));
        assert_eq!((it.context().position, it.context().size), (0, 1));
        assert_eq!(it.context().item, None);
        it.map(Result::unwrap).collect()
    };
    assert_eq!(items[0], el(&tree.root));
    assert_eq!(items.len(), 5);
    assert_eq!(ctx.item, None);
    assert_eq!((ctx.position, ctx.size), (4, 9));
}

#[rstest]
fn descendants_of_non_element_are_empty(tree: Tree) {
    let mut ctx = SimpleContext::new(el(&tree.root)).unwrap();
    assert_eq!(ctx.iter_descendants(Some(XPathItem::text("t"))).count(), 0);
    assert_eq!(ctx.item, Some(el(&tree.root)));
}

#[rstest]
fn abandoned_descendant_walk_restores_cursor(tree: Tree) {
    let mut ctx = SimpleContext::builder(el(&tree.root))
        .with_item(el(&tree.a))
        .with_position(3)
        .with_size(7)
        .build()
        .unwrap();
    {
        let mut it = ctx.iter_descendants(Some(el(&tree.root)));
        assert!(it.next().is_some());
        assert!(it.next().is_some());
        assert_eq!(it.context().item, Some(XPathItem::text("x")));
        assert_eq!(it.context().active_iterator(), Some(Axis::Descendant));
    }
    assert_eq!(ctx.item, Some(el(&tree.a)));
    assert_eq!((ctx.position, ctx.size), (3, 7));
    assert_eq!(ctx.active_iterator(), None);
}

#[rstest]
fn nested_traversal_restores_outer_cursor(tree: Tree) {
    let mut ctx = SimpleContext::new(el(&tree.root)).unwrap();
    let mut outer = ctx.iter_descendants(None);
    let mut seen = Vec::new();
    while let Some(item) = outer.next() {
        let item = item.unwrap();
        if item == el(&tree.b) {
            let (position, size) = (outer.context().position, outer.context().size);
            let inner: Vec<_> = outer.context_mut().iter_children(None).collect::<Result<_, _>>().unwrap();
            assert_eq!(inner, vec![el(&tree.c)]);
            assert_eq!(outer.context().item, Some(el(&tree.b)));
            assert_eq!((outer.context().position, outer.context().size), (position, size));
            assert_eq!(outer.context().active_iterator(), Some(Axis::Descendant));
        }
        seen.push(item);
    }
    drop(outer);
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[4], el(&tree.c));
}

#[rstest]
fn ancestors_walk_up_to_root() {
    let leaf = elem("leaf").build();
    let b = elem("b").child(leaf.clone()).build();
    let a = elem("a").child(b.clone()).build();
    let root = elem("root").child(a.clone()).build();
    let mut ctx = SimpleContext::new(el(&root)).unwrap();
    let items: Vec<_> = ctx.iter_ancestors(Some(el(&leaf))).collect::<Result<_, _>>().unwrap();
    assert_eq!(items, vec![el(&b), el(&a), el(&root)]);
    assert_eq!(ctx.item, Some(el(&root)));
    assert_eq!(ctx.iter_ancestors(None).count(), 0);
}

#[rstest]
fn ancestors_of_comment_and_in_document(tree: Tree) {
    let note = comment("n");
    tree.a.append_child(note.clone());
    let mut ctx = XPathContext::new(XPathItem::Document(doc(tree.root.clone()))).unwrap();
    let items: Vec<_> = ctx.iter_ancestors(Some(XPathItem::Element(note))).collect::<Result<_, _>>().unwrap();
    assert_eq!(items, vec![el(&tree.a), el(&tree.root)]);
    assert_eq!(ctx.iter_ancestors(Some(XPathItem::text("x"))).count(), 0);
}

#[rstest]
fn direct_circularity_is_reported() {
    let root = elem("root").build();
    let a = elem("a").build();
    root.append_child(a.clone());
    a.append_child(root.clone());
    let mut ctx = SimpleContext::new(el(&root)).unwrap();
    let mut it = ctx.iter_ancestors(Some(el(&a)));
    assert_eq!(it.next().unwrap().unwrap(), el(&root));
    let err = it.next().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert!(err.message.contains("circularity found"));
    assert!(it.next().is_none());
    assert_eq!(it.context().item, Some(el(&root)));
}

#[rstest]
fn self_loop_is_reported_immediately() {
    let a = elem("a").build();
    a.append_child(a.clone());
    let mut ctx = SimpleContext::new(el(&a)).unwrap();
    let results: Vec<_> = ctx.iter_ancestors(None).collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].as_ref().is_err_and(treepath::Error::is_value_error));
}

fn longer_cycle() -> (SimpleElement, SimpleElement, SimpleElement, SimpleElement) {
    // root -> a -> b -> {a, c}: a and b are each other's parent
    let root = elem("root").build();
    let a = elem("a").build();
    let b = elem("b").build();
    let c = elem("c").build();
    root.append_child(a.clone());
    a.append_child(b.clone());
    b.append_child(a.clone());
    b.append_child(c.clone());
    (root, a, b, c)
}

#[rstest]
fn direct_mode_does_not_see_longer_cycles() {
    let (root, a, b, c) = longer_cycle();
    let mut ctx = SimpleContext::new(el(&root)).unwrap();
    let items: Vec<_> = ctx.iter_ancestors(Some(el(&c))).take(4).collect::<Result<_, _>>().unwrap();
    assert_eq!(items, vec![el(&b), el(&a), el(&b), el(&a)]);
}

#[rstest]
fn full_mode_reports_longer_cycles() {
    let (root, a, b, c) = longer_cycle();
    let mut ctx = SimpleContext::builder(el(&root))
        .with_cycle_detection(CycleDetection::Full)
        .build()
        .unwrap();
    let results: Vec<_> = ctx.iter_ancestors(Some(el(&c))).collect();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Ok(el(&b)));
    assert_eq!(results[1], Ok(el(&a)));
    assert!(results[2].is_err());
    assert_eq!(ctx.copy(None).cycle_detection(), CycleDetection::Full);
}

#[rstest]
fn copy_clones_variables_and_shares_parent_map(tree: Tree) {
    let ctx = SimpleContext::builder(el(&tree.root))
        .with_variable("x", AtomicValue::Integer(1))
        .build()
        .unwrap();
    let mut copy = ctx.copy(Some(el(&tree.b)));
    copy.variables.insert("x".into(), XPathValue::from(AtomicValue::Integer(2)));
    assert_eq!(ctx.variable("x"), Some(&XPathValue::from(AtomicValue::Integer(1))));
    assert_eq!(copy.item, Some(el(&tree.b)));
    assert!(ctx.shares_parent_map(&copy));
    assert!(std::ptr::eq(ctx.parent_map(), copy.parent_map()));
    assert_eq!(ctx.parent_map().get(&tree.c), Some(&tree.b));
    assert_eq!(ctx.parent_map().get(&tree.root), None);
}

#[rstest]
fn copy_inherits_item_when_none_given(tree: Tree) {
    let ctx = SimpleContext::builder(el(&tree.root)).with_item(el(&tree.a)).build().unwrap();
    let copy = ctx.copy(None);
    assert_eq!(copy.item, Some(el(&tree.a)));
    assert_eq!(copy.root_element(), tree.root);
}

#[rstest]
fn parent_map_built_by_copy_is_shared_back(tree: Tree) {
    let mut ctx = SimpleContext::new(el(&tree.root)).unwrap();
    let copy = ctx.copy(None);
    assert_eq!(copy.parent_map().len(), 3);
    let items: Vec<_> = ctx.iter_ancestors(Some(el(&tree.c))).collect::<Result<_, _>>().unwrap();
    assert_eq!(items, vec![el(&tree.b), el(&tree.root)]);
    assert!(std::ptr::eq(ctx.parent_map(), copy.parent_map()));
}
