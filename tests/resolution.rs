//! Tag resolution: chain order, transparent delegation, enclosures,
//! auto-injected components and unresolved tags.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use common::Probe;
use spark_markup::{
    container, label, page, transparent_container, EngineError, NodeTree, Resolution,
    ResolveRequest, ResolverChain, SequenceBuilder, TagResolver,
};

// =============================================================================
// Chain order
// =============================================================================

struct Recording {
    name: &'static str,
    claim: bool,
    calls: Rc<Cell<usize>>,
}

impl Recording {
    fn new(name: &'static str, claim: bool) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                name,
                claim,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl TagResolver for Recording {
    fn name(&self) -> &str {
        self.name
    }

    fn resolve(&self, _request: &ResolveRequest<'_>) -> spark_markup::Result<Option<Resolution>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.claim.then_some(Resolution::Skip))
    }
}

fn ghost_markup() -> std::sync::Arc<spark_markup::ElementSequence> {
    SequenceBuilder::new()
        .open_bound("p", "ghost")
        .raw("x")
        .close("p")
        .raw("end")
        .build("Home")
        .unwrap()
}

#[test]
fn test_first_claiming_resolver_wins() {
    let (first, first_calls) = Recording::new("first", true);
    let (second, second_calls) = Recording::new("second", true);
    let ctx = common::context(vec![ghost_markup()])
        .with_resolvers(ResolverChain::new().with(first).with(second));

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));

    assert_eq!(ctx.render_to_string(&mut tree, root).unwrap(), "end");
    assert_eq!(first_calls.get(), 1);
    assert_eq!(second_calls.get(), 0);
}

#[test]
fn test_passing_resolver_falls_through() {
    let (first, first_calls) = Recording::new("first", false);
    let (second, second_calls) = Recording::new("second", true);
    let ctx = common::context(vec![ghost_markup()])
        .with_resolvers(ResolverChain::new().with(first).with(second));

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));

    assert_eq!(ctx.render_to_string(&mut tree, root).unwrap(), "end");
    assert_eq!(first_calls.get(), 1);
    assert_eq!(second_calls.get(), 1);
}

#[test]
fn test_exhausted_chain_reports_path_and_similar_ids() {
    let home = SequenceBuilder::new()
        .open_bound("div", "form")
        .open_close_bound("input", "nmae")
        .close("div")
        .build("Home")
        .unwrap();
    let ctx = common::context(vec![home]);

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));
    let form = tree.add_child(root, container("form")).unwrap();
    tree.add_child(form, label("name", "x")).unwrap();

    let err = ctx.render_to_string(&mut tree, root).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("unable to find component with id 'nmae' in template 'Home'"));
    assert!(message.contains("expected: 'form:nmae'"));
    assert!(message.contains("found with similar names: 'form:name'"));
}

// =============================================================================
// Transparent delegation and enclosures
// =============================================================================

#[test]
fn test_transparent_owner_delegates_to_parent_child() {
    let home = SequenceBuilder::new()
        .open_bound("div", "wrapper")
        .open_bound("span", "title")
        .close("span")
        .close("div")
        .build("Home")
        .unwrap();
    let ctx = common::context(vec![home]);

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));
    tree.add_child(root, transparent_container("wrapper")).unwrap();
    tree.add_child(root, label("title", "Hello")).unwrap();

    assert_eq!(
        ctx.render_to_string(&mut tree, root).unwrap(),
        "<div><span>Hello</span></div>"
    );
}

#[test]
fn test_transparent_delegation_precedes_enclosure() {
    let home = SequenceBuilder::new()
        .open_bound("div", "t") // 0
        .open_bound("spark:enclosure", "box") // 1
        .attr("child", "msg")
        .raw("inside") // 2
        .open_close_bound("i", "msg") // 3
        .close("spark:enclosure") // 4
        .close("div") // 5
        .build("Home")
        .unwrap();
    let ctx = common::context(vec![home]);
    let probe = Probe::visible();

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));
    tree.add_child(root, transparent_container("t")).unwrap();
    let boxed = tree
        .add_child(root, container("box").with_hook(probe.clone()))
        .unwrap();
    tree.add_child(boxed, container("msg").with_visible(false)).unwrap();

    assert_eq!(
        ctx.render_to_string(&mut tree, root).unwrap(),
        "<div>inside</div>"
    );
    assert_eq!(probe.before.get(), 1);
    assert_eq!(probe.after.get(), 1);
}

fn enclosure_markup() -> std::sync::Arc<spark_markup::ElementSequence> {
    SequenceBuilder::new()
        .open_bound("div", "c")
        .open("spark:enclosure")
        .attr("child", "msg")
        .raw("inside")
        .open_close_bound("i", "msg")
        .close("spark:enclosure")
        .raw("after")
        .close("div")
        .build("Home")
        .unwrap()
}

fn enclosure_tree(visible: bool) -> (NodeTree, spark_markup::NodeId) {
    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));
    let owner = tree.add_child(root, container("c")).unwrap();
    tree.add_child(owner, container("msg").with_visible(visible))
        .unwrap();
    (tree, root)
}

#[test]
fn test_enclosure_follows_controller_visibility() {
    let ctx = common::context(vec![enclosure_markup()]);

    let (mut tree, root) = enclosure_tree(true);
    assert_eq!(
        ctx.render_to_string(&mut tree, root).unwrap(),
        "<div>inside<i/>after</div>"
    );

    let (mut tree, root) = enclosure_tree(false);
    assert_eq!(
        ctx.render_to_string(&mut tree, root).unwrap(),
        "<div>after</div>"
    );
}

#[test]
fn test_enclosure_marker_form() {
    let home = SequenceBuilder::new()
        .open_bound("div", "c")
        .enclosure("msg")
        .raw("inside")
        .open_close_bound("i", "msg")
        .end_enclosure()
        .raw("after")
        .close("div")
        .build("Home")
        .unwrap();
    let ctx = common::context(vec![home]);

    let (mut tree, root) = enclosure_tree(false);
    assert_eq!(
        ctx.render_to_string(&mut tree, root).unwrap(),
        "<div>after</div>"
    );

    let (mut tree, root) = enclosure_tree(true);
    assert_eq!(
        ctx.render_to_string(&mut tree, root).unwrap(),
        "<div>inside<i/>after</div>"
    );
}

#[test]
fn test_enclosure_without_controller_fails() {
    let ctx = common::context(vec![enclosure_markup()]);

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));
    tree.add_child(root, container("c")).unwrap();

    match ctx.render_to_string(&mut tree, root) {
        Err(EngineError::MissingEnclosureController { controller, .. }) => {
            assert_eq!(controller, "msg");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

// =============================================================================
// Auto-injected components
// =============================================================================

#[test]
fn test_auto_components_released_after_pass() {
    let home = SequenceBuilder::new()
        .open("html")
        .open("head")
        .close("head")
        .open("spark:remove")
        .raw("junk")
        .close("spark:remove")
        .raw("ok")
        .close("html")
        .build("Home")
        .unwrap();
    let ctx = common::context(vec![home]);

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));
    let before = tree.len();

    assert_eq!(
        ctx.render_to_string(&mut tree, root).unwrap(),
        "<html><head></head>ok</html>"
    );
    assert_eq!(tree.len(), before);
    assert_eq!(tree.get(root).unwrap().child_count(), 0);

    // A second pass injects fresh nodes and cleans them up again.
    ctx.render_to_string(&mut tree, root).unwrap();
    assert_eq!(tree.len(), before);
}

#[test]
fn test_auto_components_released_when_pass_fails() {
    let home = SequenceBuilder::new()
        .open("head")
        .close("head")
        .open_close_bound("b", "nope")
        .build("Home")
        .unwrap();
    let ctx = common::context(vec![home]);

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));

    assert!(matches!(
        ctx.render_to_string(&mut tree, root),
        Err(EngineError::UnresolvedTag { .. })
    ));
    assert_eq!(tree.len(), 1);
}

// =============================================================================
// Tree mutation between passes
// =============================================================================

#[test]
fn test_duplicate_child_leaves_render_unchanged() {
    let home = SequenceBuilder::new()
        .open_bound("p", "title")
        .close("p")
        .build("Home")
        .unwrap();
    let ctx = common::context(vec![home]);

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));
    tree.add_child(root, label("title", "first")).unwrap();
    let before = ctx.render_to_string(&mut tree, root).unwrap();

    let err = tree.add_child(root, label("title", "second")).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateChildId { .. }));
    assert_eq!(tree.len(), 2);
    assert_eq!(ctx.render_to_string(&mut tree, root).unwrap(), before);
}

#[test]
fn test_replacing_child_between_passes() {
    let home = SequenceBuilder::new()
        .open_bound("p", "title")
        .close("p")
        .build("Home")
        .unwrap();
    let ctx = common::context(vec![home]);

    let mut tree = NodeTree::new();
    let root = tree.insert_root(page("Home"));
    tree.add_child(root, label("title", "first")).unwrap();
    assert_eq!(ctx.render_to_string(&mut tree, root).unwrap(), "<p>first</p>");

    assert!(tree.remove_child(root, "title").unwrap());
    tree.add_child(root, label("title", "second")).unwrap();
    assert_eq!(ctx.render_to_string(&mut tree, root).unwrap(), "<p>second</p>");
}
