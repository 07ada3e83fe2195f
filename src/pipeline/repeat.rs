//! Repeater rendering.
//!
//! The repeater's own tag span is the row template. Items are requested
//! fresh on every render, then for each item: rewind to the span start,
//! attach a transient item node, let the populate callback fill it, render
//! the span with the item node as owner, release the item node. The span is
//! consumed exactly once overall; zero items render nothing.

use std::rc::Rc;

use crate::engine::{Node, NodeKind};
use crate::error::{EngineError, Result};
use crate::markup::MarkupCursor;
use crate::primitives::{window, Item, ItemScope, ItemSource, RepeaterSpec};
use crate::types::{NodeFlags, NodeId};

use super::body::BodyCapture;
use super::render::RenderPass;

impl RenderPass<'_> {
    pub(super) fn render_repeater(
        &mut self,
        node: NodeId,
        cursor: &mut MarkupCursor,
        body: Option<&Rc<BodyCapture>>,
        spec: &RepeaterSpec,
    ) -> Result<()> {
        let start = cursor.position();
        let end = cursor.span_end()?;

        let ctx = self.ctx;
        let items: Box<dyn Iterator<Item = Item> + '_> = match &spec.source {
            ItemSource::Static(items) => Box::new(window(items.as_slice(), spec.offset, spec.count).cloned()),
            ItemSource::Provider(provider) => {
                let Some(source) = ctx.provider() else {
                    return Err(EngineError::ProviderUnavailable {
                        path: self.tree.path(node),
                        provider: provider.clone(),
                    });
                };
                source.items(provider, spec.offset, spec.count)?
            }
        };

        let mut rendered = 0;
        for (i, item) in items.enumerate() {
            let index = spec.offset + i;
            cursor.rewind_to(start)?;

            let item_node = self.tree.add_child(
                node,
                Node::new(index.to_string(), NodeKind::Container).with_flags(NodeFlags::TRANSIENT),
            )?;
            let result = self.render_item(item_node, index, &item, spec, cursor, body);
            self.release_transient(item_node);
            result?;
            rendered += 1;
        }

        log::trace!("repeater '{}' rendered {} items", self.tree.path(node), rendered);
        cursor.rewind_to(end)
    }

    fn render_item(
        &mut self,
        item_node: NodeId,
        index: usize,
        item: &Item,
        spec: &RepeaterSpec,
        cursor: &mut MarkupCursor,
        body: Option<&Rc<BodyCapture>>,
    ) -> Result<()> {
        let mut scope = ItemScope {
            tree: &mut *self.tree,
            item: item_node,
            index,
            value: item,
        };
        (spec.populate)(&mut scope)?;

        self.prepare(item_node)?;
        self.render_node(item_node, cursor, body)
    }

    /// Release an item subtree and forget everything the pass knew about it.
    fn release_transient(&mut self, item_node: NodeId) {
        let released = self.tree.preorder(item_node);
        for id in &released {
            self.prepared.remove(id);
            self.hidden.remove(id);
        }
        self.auto_nodes.retain(|id| !released.contains(id));
        self.tree.release(item_node);
    }
}
