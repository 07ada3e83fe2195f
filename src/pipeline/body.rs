//! Associated markup and body substitution (panels, borders, nested pages).
//!
//! ```text
//! parent markup:  ... <div spark:id="box"> BODY </div> ...
//!                      ^ start             ^ end (matching close)
//!
//! box markup:     <spark:border> A <spark:body/> B </spark:border>
//!
//! output:         <div> A BODY B </div>
//! ```
//!
//! The call-site body is captured (not rendered), the parent cursor jumps
//! past the span, and a second cursor walks the node's own markup inside
//! its boundary tag. At the body slot a third cursor re-opens the parent
//! sequence over the captured range. Ids inside the body resolve against the
//! node's children; a body slot inside the body refers to the capture that
//! was active at the call site.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::Result;
use crate::markup::{ElementSequence, MarkupCursor};
use crate::renderer::MarkupSink;
use crate::types::{ComponentTag, NodeId, TagData};

use super::render::{tag_at, RenderPass};

/// Call-site body of a panel or border. Pass-local.
#[derive(Debug)]
pub(crate) struct BodyCapture {
    pub(super) sequence: Arc<ElementSequence>,
    /// First element after the open tag.
    pub(super) start: usize,
    /// Matching close (exclusive bound); equals `start` for an empty body.
    pub(super) end: usize,
    /// Node whose children the body's ids resolve against.
    pub(super) owner: NodeId,
    /// Capture in scope where the owner's tag appeared.
    pub(super) enclosing: Option<Rc<BodyCapture>>,
}

impl RenderPass<'_> {
    pub(super) fn render_associated(
        &mut self,
        node: NodeId,
        cursor: &mut MarkupCursor,
        body: Option<&Rc<BodyCapture>>,
        template: &str,
        boundary: Option<&str>,
    ) -> Result<()> {
        let sequence = Arc::clone(cursor.sequence());
        let start = cursor.position();
        let tag = tag_at(&sequence, start)?;

        // `<x spark:id="p"/>` renders as `<x>...</x>` with an empty body
        let capture = Rc::new(BodyCapture {
            sequence: Arc::clone(&sequence),
            start: start + 1,
            end: sequence.matching_close(start).unwrap_or(start + 1),
            owner: node,
            enclosing: body.cloned(),
        });
        cursor.skip_component()?;

        let component_tag = self.emit_open(node, tag, false)?;

        let ctx = self.ctx;
        let markup = ctx.cache().markup(template)?;
        let (from, to) = match boundary {
            Some(boundary) => {
                let index = ctx.cache().boundary(&markup, boundary)?;
                (index + 1, markup.matching_close(index).unwrap_or(index + 1))
            }
            None => (0, markup.len()),
        };

        let comments = ctx.settings().output_markup_container_class_name;
        if comments {
            self.out.emit(&format!("<!-- MARKUP FOR {template} BEGIN -->"));
        }
        let mut inner = MarkupCursor::at(markup, from)?;
        self.walk(node, &mut inner, to, Some(&capture))?;
        if comments {
            self.out.emit(&format!("<!-- MARKUP FOR {template} END -->"));
        }

        self.emit_close(&component_tag);
        Ok(())
    }

    /// Render the captured body in scope, if any.
    pub(super) fn render_body(&mut self, body: Option<&Rc<BodyCapture>>) -> Result<()> {
        let Some(capture) = body.cloned() else {
            log::warn!("body slot outside of a panel or border; nothing to render");
            return Ok(());
        };
        let mut cursor = MarkupCursor::at(Arc::clone(&capture.sequence), capture.start)?;
        self.walk(capture.owner, &mut cursor, capture.end, capture.enclosing.as_ref())
    }

    /// `<spark:body>preview</spark:body>`: preview is dropped, body rendered.
    pub(super) fn render_body_tag(
        &mut self,
        cursor: &mut MarkupCursor,
        tag: &TagData,
        body: Option<&Rc<BodyCapture>>,
    ) -> Result<()> {
        let slot = ComponentTag::from_tag(tag, false);
        let emits = self.ctx.settings().emits_tag(slot.name());

        if emits {
            let mut text = String::new();
            slot.write_open(&mut text);
            self.out.emit(&text);
        }
        cursor.skip_component()?;
        self.render_body(body)?;
        if emits {
            self.emit_close(&slot);
        }
        Ok(())
    }
}
