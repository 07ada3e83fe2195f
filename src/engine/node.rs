//! Node - One component in the arena.
//!
//! A node is plain data: identifier, parent index, ordered children, flags,
//! a closed [`NodeKind`] saying which rendering protocol applies, and any
//! number of [`NodeHooks`] behaviors. The render pipeline dispatches on the
//! kind; hooks customize the lifecycle without subclassing.

use std::fmt;

use indexmap::IndexMap;

use crate::error::Result;
use crate::markup::MarkupCursor;
use crate::primitives::RepeaterSpec;
use crate::renderer::{HeaderResponse, MarkupSink};
use crate::types::{ComponentTag, NodeFlags, NodeId};

// =============================================================================
// Hooks
// =============================================================================

/// Lifecycle callbacks and tag decoration for a node.
///
/// Called per render in this order: `before_render`, tag decoration, body,
/// `after_render`. A node renders only if every attached hook returns
/// `true` from both `before_render` and `is_render_allowed`.
pub trait NodeHooks {
    /// Runs right before the node renders. `false` hides the node for this pass.
    fn before_render(&mut self) -> bool {
        true
    }

    /// Runs after the node's span has been consumed.
    fn after_render(&mut self) {}

    /// Authorization predicate; consulted for rendering and enclosures.
    fn is_render_allowed(&self) -> bool {
        true
    }

    /// Decorate the node's open tag before it is written.
    fn on_component_tag(&self, _tag: &mut ComponentTag) {}

    /// Contribute header resources. Runs each time the node renders, before its body.
    fn render_head(&self, _response: &mut HeaderResponse<'_>) {}
}

/// Hand-written rendering for a node.
///
/// Receives the cursor positioned at the node's own open tag and must leave
/// it one past the matching close. The engine checks this and fails the pass
/// with [`CursorContractViolation`](crate::EngineError::CursorContractViolation)
/// otherwise.
pub trait CustomRender {
    fn render(&mut self, cursor: &mut MarkupCursor, out: &mut dyn MarkupSink) -> Result<()>;
}

// =============================================================================
// Kinds
// =============================================================================

/// Which rendering protocol a node follows.
pub enum NodeKind {
    /// Root of a pass; renders the whole sequence of its template.
    Page { template: String },
    /// Renders inline with its parent's cursor.
    Container,
    /// Replaces its tag body with text.
    Label { text: String, escape: bool },
    /// Own associated markup with a panel boundary; call-site body goes to the slot.
    Panel {
        template: String,
        boundary: Option<String>,
    },
    /// Same protocol as a panel, border boundary tag.
    Border {
        template: String,
        boundary: Option<String>,
    },
    /// Renders its tag span once per item.
    Repeater(RepeaterSpec),
    /// Auto-injected `<head>`: receives header contributions.
    Header,
    /// Auto-injected region that renders nothing.
    Remove,
    Custom(Box<dyn CustomRender>),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Page { .. } => "page",
            NodeKind::Container => "container",
            NodeKind::Label { .. } => "label",
            NodeKind::Panel { .. } => "panel",
            NodeKind::Border { .. } => "border",
            NodeKind::Repeater(_) => "repeater",
            NodeKind::Header => "header",
            NodeKind::Remove => "remove",
            NodeKind::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Page { template } => f.debug_struct("Page").field("template", template).finish(),
            NodeKind::Label { text, escape } => f
                .debug_struct("Label")
                .field("text", text)
                .field("escape", escape)
                .finish(),
            NodeKind::Panel { template, boundary } | NodeKind::Border { template, boundary } => f
                .debug_struct(if matches!(self, NodeKind::Panel { .. }) { "Panel" } else { "Border" })
                .field("template", template)
                .field("boundary", boundary)
                .finish(),
            NodeKind::Repeater(spec) => f.debug_tuple("Repeater").field(spec).finish(),
            other => f.write_str(other.name()),
        }
    }
}

// =============================================================================
// Node
// =============================================================================

pub struct Node {
    pub(crate) id: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: IndexMap<String, NodeId>,
    pub(crate) flags: NodeFlags,
    pub(crate) kind: NodeKind,
    pub(crate) hooks: Vec<Box<dyn NodeHooks>>,
}

impl Node {
    /// A visible, detached node.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            parent: None,
            children: IndexMap::new(),
            flags: NodeFlags::VISIBLE,
            kind,
            hooks: Vec::new(),
        }
    }

    /// Attach a behavior.
    pub fn with_hook(mut self, hook: impl NodeHooks + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.flags.set(NodeFlags::VISIBLE, visible);
        self
    }

    /// Unmatched child tags resolve against the parent's children.
    pub fn transparent(mut self) -> Self {
        self.flags.insert(NodeFlags::TRANSPARENT);
        self
    }

    pub(crate) fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(NodeFlags::VISIBLE, visible);
    }

    pub fn is_transparent(&self) -> bool {
        self.flags.contains(NodeFlags::TRANSPARENT)
    }

    /// Visible and allowed by every hook; does not run `before_render`.
    pub fn is_render_allowed(&self) -> bool {
        self.is_visible() && self.hooks.iter().all(|hook| hook.is_render_allowed())
    }

    pub fn child(&self, id: &str) -> Option<NodeId> {
        self.children.get(id).copied()
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Replace a label's text. No effect on other kinds.
    pub fn set_text(&mut self, value: impl Into<String>) {
        if let NodeKind::Label { text, .. } = &mut self.kind {
            *text = value.into();
        }
    }

    /// Run every hook's `before_render`; all of them run even if one refuses.
    pub(crate) fn run_before_render(&mut self) -> bool {
        let mut render = true;
        for hook in &mut self.hooks {
            render &= hook.before_render();
        }
        render
    }

    pub(crate) fn run_after_render(&mut self) {
        for hook in &mut self.hooks {
            hook.after_render();
        }
    }

    pub(crate) fn decorate(&self, tag: &mut ComponentTag) {
        for hook in &self.hooks {
            hook.on_component_tag(tag);
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("flags", &self.flags)
            .field("kind", &self.kind)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Gate {
        allow: bool,
        calls: Rc<Cell<usize>>,
    }

    impl NodeHooks for Gate {
        fn before_render(&mut self) -> bool {
            self.calls.set(self.calls.get() + 1);
            self.allow
        }

        fn is_render_allowed(&self) -> bool {
            self.allow
        }
    }

    #[test]
    fn test_new_node_is_visible() {
        let node = Node::new("x", NodeKind::Container);
        assert!(node.is_visible());
        assert!(!node.is_transparent());
        assert!(node.is_render_allowed());
        assert_eq!(node.kind().name(), "container");
    }

    #[test]
    fn test_every_before_render_hook_runs() {
        let calls = Rc::new(Cell::new(0));
        let mut node = Node::new("x", NodeKind::Container)
            .with_hook(Gate { allow: false, calls: calls.clone() })
            .with_hook(Gate { allow: true, calls: calls.clone() });

        assert!(!node.run_before_render());
        assert_eq!(calls.get(), 2);
        assert!(!node.is_render_allowed());
    }

    #[test]
    fn test_set_text_only_touches_labels() {
        let mut label = Node::new("l", NodeKind::Label { text: "a".into(), escape: true });
        label.set_text("b");
        assert!(matches!(label.kind(), NodeKind::Label { text, .. } if text == "b"));

        let mut container = Node::new("c", NodeKind::Container);
        container.set_text("ignored");
        assert!(matches!(container.kind(), NodeKind::Container));
    }
}
