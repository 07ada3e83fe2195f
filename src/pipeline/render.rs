//! Render Pass - One synchronous walk over a node tree.
//!
//! A pass owns everything that must not leak between requests: the header
//! token set, the before-render decisions, and the list of auto-injected
//! nodes. Cursors live on the call stack and are handed down by `&mut`.
//!
//! # Phases
//!
//! 1. **prepare** - `before_render` runs once per node, parents first; a
//!    refusing or invisible node hides its whole subtree for the pass
//! 2. **render** - the page's markup is walked; every matched node renders
//!    its span through [`RenderPass::render_node`]
//! 3. **finish** - auto-injected nodes are released; on success the
//!    header text collected from rendered nodes is spliced into the head
//!
//! # Header Contributions
//!
//! A node contributes when it actually renders, right before its protocol
//! runs. Nodes in skipped spans (hidden, enclosure off, removed regions) and
//! nodes the markup never mentions contribute nothing; repeater rows
//! contribute while their iteration renders. Output after the head's body
//! is held until the pass ends so the head can receive all of it.
//!
//! # Span Contract
//!
//! `render_node` is entered with the cursor on the node's own tag and must
//! leave it one past the matching close. Every node kind is checked, so a
//! hand-written renderer that over- or under-consumes fails the pass with
//! `CursorContractViolation` instead of corrupting the sibling walk.

use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use crate::engine::{NodeKind, NodeTree};
use crate::error::{EngineError, Result};
use crate::markup::{ElementSequence, MarkupCursor};
use crate::primitives::RepeaterSpec;
use crate::renderer::{HeadSplice, HeaderResponse, HeaderTokenSet, MarkupSink};
use crate::resolver::{Resolution, ResolveRequest};
use crate::types::{escape_markup, ComponentTag, MarkerKind, MarkupElement, NodeFlags, NodeId, TagData};

use super::body::BodyCapture;
use super::context::EngineContext;

/// Rendering protocol of a node, copied out of the tree before dispatch.
enum Protocol {
    Inline,
    Label { text: String, escape: bool },
    Associated { template: String, boundary: Option<String> },
    Repeater(RepeaterSpec),
    Header,
    Remove,
    Custom,
}

pub(crate) struct RenderPass<'a> {
    pub(super) ctx: &'a EngineContext,
    pub(super) tree: &'a mut NodeTree,
    pub(super) out: HeadSplice<'a>,
    pub(super) tokens: HeaderTokenSet,
    /// Nodes whose `before_render` already ran this pass.
    pub(super) prepared: HashSet<NodeId>,
    /// Prepared nodes that do not render this pass.
    pub(super) hidden: HashSet<NodeId>,
    pub(super) auto_nodes: Vec<NodeId>,
}

impl<'a> RenderPass<'a> {
    pub(crate) fn new(
        ctx: &'a EngineContext,
        tree: &'a mut NodeTree,
        out: &'a mut dyn MarkupSink,
    ) -> Self {
        Self {
            ctx,
            tree,
            out: HeadSplice::new(out),
            tokens: HeaderTokenSet::new(),
            prepared: HashSet::new(),
            hidden: HashSet::new(),
            auto_nodes: Vec::new(),
        }
    }

    pub(crate) fn tokens(&self) -> &HeaderTokenSet {
        &self.tokens
    }

    // =========================================================================
    // Prepare
    // =========================================================================

    /// Run `before_render` over `from` and its descendants not yet prepared.
    pub(crate) fn prepare(&mut self, from: NodeId) -> Result<()> {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if !self.prepared.insert(id) {
                if !self.hidden.contains(&id) {
                    stack.extend(self.tree.children(id).into_iter().rev());
                }
                continue;
            }
            let node = self.tree.get_mut(id)?;
            let render = node.is_visible() && node.run_before_render() && node.is_render_allowed();
            if render {
                let children: Vec<NodeId> = node.children().collect();
                stack.extend(children.into_iter().rev());
            } else {
                self.hidden.insert(id);
            }
        }
        Ok(())
    }

    fn should_render(&mut self, node: NodeId) -> Result<bool> {
        if !self.prepared.contains(&node) {
            self.prepare(node)?;
        }
        Ok(!self.hidden.contains(&node) && self.tree.get(node)?.is_render_allowed())
    }

    // =========================================================================
    // Page
    // =========================================================================

    pub(crate) fn render_page(&mut self, root: NodeId, template: &str) -> Result<()> {
        self.prepare(root)?;
        if !self.should_render(root)? {
            log::debug!("page '{template}' is hidden; nothing rendered");
            return Ok(());
        }
        self.contribute(root)?;

        let markup = self.ctx.cache().markup(template)?;
        let end = markup.len();
        let mut cursor = MarkupCursor::new(markup);

        self.tree.set_flag(root, NodeFlags::RENDERING, true)?;
        let result = self.walk(root, &mut cursor, end, None);
        self.tree.set_flag(root, NodeFlags::RENDERING, false)?;
        result?;

        self.tree.get_mut(root)?.run_after_render();
        Ok(())
    }

    /// Write collected header text into the head slot and release held output.
    pub(crate) fn flush(&mut self) {
        if !self.out.has_slot() {
            log::trace!("pass rendered no head tag");
        }
        self.out.flush();
    }

    /// Release every auto-injected node still attached.
    pub(crate) fn finish(&mut self) {
        for id in std::mem::take(&mut self.auto_nodes).into_iter().rev() {
            if self.tree.has_flag(id, NodeFlags::AUTO) {
                self.tree.release(id);
            }
        }
    }

    // =========================================================================
    // Node
    // =========================================================================

    /// Render `node` over the span starting at the cursor.
    pub(crate) fn render_node(
        &mut self,
        node: NodeId,
        cursor: &mut MarkupCursor,
        body: Option<&Rc<BodyCapture>>,
    ) -> Result<()> {
        let expected = cursor.span_end()?;

        if !self.should_render(node)? {
            log::trace!("'{}' is hidden; skipping its span", self.tree.path(node));
            cursor.skip_component()?;
            return Ok(());
        }
        self.contribute(node)?;

        self.tree.set_flag(node, NodeFlags::RENDERING, true)?;
        let result = self.dispatch(node, cursor, body);
        if let Ok(rendered) = self.tree.get_mut(node) {
            rendered.flags.remove(NodeFlags::RENDERING);
        }
        result?;

        if cursor.position() != expected {
            return Err(EngineError::CursorContractViolation {
                template: cursor.template().to_string(),
                path: self.tree.path(node),
                expected,
                actual: cursor.position(),
            });
        }

        self.tree.get_mut(node)?.run_after_render();
        Ok(())
    }

    fn dispatch(
        &mut self,
        node: NodeId,
        cursor: &mut MarkupCursor,
        body: Option<&Rc<BodyCapture>>,
    ) -> Result<()> {
        let ctx = self.ctx;
        let settings = ctx.settings();
        let protocol = match self.tree.get(node)?.kind() {
            NodeKind::Container => Protocol::Inline,
            NodeKind::Label { text, escape } => Protocol::Label {
                text: text.clone(),
                escape: *escape,
            },
            NodeKind::Page { template } => Protocol::Associated {
                template: template.clone(),
                boundary: None,
            },
            NodeKind::Panel { template, boundary } => Protocol::Associated {
                template: template.clone(),
                boundary: Some(boundary.clone().unwrap_or_else(|| settings.panel_boundary.clone())),
            },
            NodeKind::Border { template, boundary } => Protocol::Associated {
                template: template.clone(),
                boundary: Some(boundary.clone().unwrap_or_else(|| settings.border_boundary.clone())),
            },
            NodeKind::Repeater(spec) => Protocol::Repeater(spec.clone()),
            NodeKind::Header => Protocol::Header,
            NodeKind::Remove => Protocol::Remove,
            NodeKind::Custom(_) => Protocol::Custom,
        };

        match protocol {
            Protocol::Inline => self.render_inline(node, cursor, body),
            Protocol::Label { text, escape } => self.render_label(node, cursor, &text, escape),
            Protocol::Associated { template, boundary } => {
                self.render_associated(node, cursor, body, &template, boundary.as_deref())
            }
            Protocol::Repeater(spec) => self.render_repeater(node, cursor, body, &spec),
            Protocol::Header => self.render_header(node, cursor, body),
            Protocol::Remove => cursor.skip_component(),
            Protocol::Custom => {
                let NodeKind::Custom(renderer) = &mut self.tree.get_mut(node)?.kind else {
                    return Ok(());
                };
                renderer.render(cursor, &mut self.out)
            }
        }
    }

    // =========================================================================
    // Walk
    // =========================================================================

    /// Render elements from the cursor up to (not including) `end`.
    ///
    /// `owner` is the node whose children bound tags resolve against.
    pub(crate) fn walk(
        &mut self,
        owner: NodeId,
        cursor: &mut MarkupCursor,
        end: usize,
        body: Option<&Rc<BodyCapture>>,
    ) -> Result<()> {
        let sequence = Arc::clone(cursor.sequence());
        while cursor.position() < end {
            let position = cursor.position();
            let element = element_at(&sequence, position)?;
            match element {
                MarkupElement::Raw(text) => {
                    self.out.emit(text);
                    cursor.advance()?;
                }
                MarkupElement::Close { .. } => {
                    self.emit_plain(element);
                    cursor.advance()?;
                }
                MarkupElement::Marker {
                    kind: MarkerKind::BodySlot,
                    ..
                } => {
                    cursor.advance()?;
                    self.render_body(body)?;
                }
                MarkupElement::Marker { .. } => self.resolve(owner, cursor, element, None, body)?,
                MarkupElement::Open(tag) | MarkupElement::OpenClose(tag) => {
                    self.walk_tag(owner, cursor, element, tag, body)?;
                }
            }
        }
        Ok(())
    }

    fn walk_tag(
        &mut self,
        owner: NodeId,
        cursor: &mut MarkupCursor,
        element: &MarkupElement,
        tag: &TagData,
        body: Option<&Rc<BodyCapture>>,
    ) -> Result<()> {
        let ctx = self.ctx;
        let settings = ctx.settings();
        if tag.id.is_none() && tag.name == settings.body_tag {
            return self.render_body_tag(cursor, tag, body);
        }

        let generated;
        let id = match tag.id.as_deref() {
            Some(id) => id,
            None if ctx.resolvers().claims_unbound(tag, settings) => {
                generated = auto_id(tag, cursor.position());
                generated.as_str()
            }
            None => {
                self.emit_plain(element);
                cursor.advance()?;
                return Ok(());
            }
        };

        match self.tree.child(owner, id) {
            Some(child) => self.render_node(child, cursor, body),
            None => self.resolve(owner, cursor, element, Some(id), body),
        }
    }

    fn resolve(
        &mut self,
        owner: NodeId,
        cursor: &mut MarkupCursor,
        element: &MarkupElement,
        id: Option<&str>,
        body: Option<&Rc<BodyCapture>>,
    ) -> Result<()> {
        let sequence = Arc::clone(cursor.sequence());
        let request = ResolveRequest {
            tree: &*self.tree,
            owner,
            element,
            id,
            sequence: &sequence,
            position: cursor.position(),
            settings: self.ctx.settings(),
            hidden: &self.hidden,
        };
        let resolution = self.ctx.resolvers().resolve(&request)?;

        match resolution {
            Resolution::Delegate(node) => self.render_node(node, cursor, body),
            Resolution::Skip => cursor.skip_component(),
            Resolution::Enter => {
                self.emit_plain(element);
                cursor.advance()?;
                Ok(())
            }
            Resolution::Inject(node) => {
                let injected = self.tree.add_child(owner, node.with_flags(NodeFlags::AUTO))?;
                log::debug!("injected auto node '{}'", self.tree.path(injected));
                self.auto_nodes.push(injected);
                self.render_node(injected, cursor, body)
            }
        }
    }

    // =========================================================================
    // Protocols
    // =========================================================================

    fn render_inline(
        &mut self,
        node: NodeId,
        cursor: &mut MarkupCursor,
        body: Option<&Rc<BodyCapture>>,
    ) -> Result<()> {
        let sequence = Arc::clone(cursor.sequence());
        let start = cursor.position();
        match element_at(&sequence, start)? {
            MarkupElement::Open(tag) => {
                let close = close_of(&sequence, start)?;
                let component_tag = self.emit_open(node, tag, false)?;
                cursor.advance()?;
                self.walk(node, cursor, close, body)?;
                cursor.advance()?;
                self.emit_close(&component_tag);
            }
            MarkupElement::OpenClose(tag) => {
                self.emit_open(node, tag, true)?;
                cursor.advance()?;
            }
            // Bound to a marker or text: nothing of its own to write
            _ => {
                cursor.advance()?;
            }
        }
        Ok(())
    }

    fn render_label(
        &mut self,
        node: NodeId,
        cursor: &mut MarkupCursor,
        text: &str,
        escape: bool,
    ) -> Result<()> {
        let sequence = Arc::clone(cursor.sequence());
        let start = cursor.position();
        let tag = tag_at(&sequence, start)?;
        let end = sequence.span_end(start);

        let component_tag = self.emit_open(node, tag, false)?;
        if escape {
            self.out.emit(&escape_markup(text));
        } else {
            self.out.emit(text);
        }
        self.emit_close(&component_tag);
        cursor.rewind_to(end)
    }

    fn render_header(
        &mut self,
        node: NodeId,
        cursor: &mut MarkupCursor,
        body: Option<&Rc<BodyCapture>>,
    ) -> Result<()> {
        let sequence = Arc::clone(cursor.sequence());
        let start = cursor.position();
        let tag = tag_at(&sequence, start)?;

        let component_tag = self.emit_open(node, tag, false)?;
        cursor.advance()?;
        if let Some(close) = sequence.matching_close(start) {
            self.walk(node, cursor, close, body)?;
            cursor.advance()?;
        }
        self.out.mark_slot();
        self.emit_close(&component_tag);
        Ok(())
    }

    /// Collect header contributions of a node that is about to render.
    fn contribute(&mut self, node: NodeId) -> Result<()> {
        let node = self.tree.get(node)?;
        if node.hooks.is_empty() {
            return Ok(());
        }
        let mut response = HeaderResponse::new(&mut self.tokens, self.out.head());
        for hook in &node.hooks {
            hook.render_head(&mut response);
        }
        Ok(())
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    /// Write a decorated copy of `tag`. Returns it so the close matches.
    pub(super) fn emit_open(
        &mut self,
        node: NodeId,
        tag: &TagData,
        open_close: bool,
    ) -> Result<ComponentTag> {
        let mut component_tag = ComponentTag::from_tag(tag, open_close);
        self.tree.get(node)?.decorate(&mut component_tag);
        if self.ctx.settings().emits_tag(component_tag.name()) {
            let mut text = String::new();
            component_tag.write_open(&mut text);
            self.out.emit(&text);
        }
        Ok(component_tag)
    }

    pub(super) fn emit_close(&mut self, tag: &ComponentTag) {
        if !tag.is_open_close() && self.ctx.settings().emits_tag(tag.name()) {
            let mut text = String::new();
            tag.write_close(&mut text);
            self.out.emit(&text);
        }
    }

    /// Write an element as plain markup, honoring namespace stripping.
    pub(super) fn emit_plain(&mut self, element: &MarkupElement) {
        let name = match element {
            MarkupElement::Open(tag) | MarkupElement::OpenClose(tag) => tag.name.as_str(),
            MarkupElement::Close { name } => name.as_str(),
            MarkupElement::Raw(text) => {
                self.out.emit(text);
                return;
            }
            MarkupElement::Marker { .. } => return,
        };
        if self.ctx.settings().emits_tag(name) {
            let mut text = String::new();
            element.write_markup(&mut text);
            self.out.emit(&text);
        }
    }
}

// =============================================================================
// Sequence helpers
// =============================================================================

pub(super) fn element_at(sequence: &ElementSequence, position: usize) -> Result<&MarkupElement> {
    sequence.get(position).ok_or_else(|| EngineError::OutOfBounds {
        template: sequence.template().to_string(),
        len: sequence.len(),
    })
}

pub(super) fn tag_at(sequence: &ElementSequence, position: usize) -> Result<&TagData> {
    element_at(sequence, position)?
        .tag()
        .ok_or_else(|| EngineError::MalformedMarkup {
            template: sequence.template().to_string(),
            position,
            message: "component must be bound to a tag".to_string(),
        })
}

fn close_of(sequence: &ElementSequence, position: usize) -> Result<usize> {
    sequence
        .matching_close(position)
        .ok_or_else(|| EngineError::MalformedMarkup {
            template: sequence.template().to_string(),
            position,
            message: "open tag has no matching close".to_string(),
        })
}

/// Id given to an unbound tag routed through the resolver chain.
fn auto_id(tag: &TagData, position: usize) -> String {
    format!("_{}_{}", tag.name.replace(':', "_"), position)
}
