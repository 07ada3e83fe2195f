//! Panel Primitives - Nodes that ship their own markup.
//!
//! A panel or border renders its associated template (the part inside the
//! template's boundary tag) in place of its call-site body. The call-site
//! body renders where the associated markup has a body slot.
//!
//! ```text
//! call site:   <div spark:id="box">PRE<span spark:id="x"/>POST</div>
//! Box markup:  <spark:border>[ <spark:body/> ]</spark:border>
//! output:      <div>[ PRE<span>..</span>POST ]</div>
//! ```
//!
//! Both kinds follow the same protocol; they differ only in the boundary
//! tag looked up by default (`spark:panel` vs `spark:border`).

use crate::engine::{Node, NodeKind};

pub fn panel(id: impl Into<String>, template: impl Into<String>) -> Node {
    Node::new(
        id,
        NodeKind::Panel {
            template: template.into(),
            boundary: None,
        },
    )
}

/// Panel with an explicit boundary tag instead of the configured default.
pub fn panel_with_boundary(
    id: impl Into<String>,
    template: impl Into<String>,
    boundary: impl Into<String>,
) -> Node {
    Node::new(
        id,
        NodeKind::Panel {
            template: template.into(),
            boundary: Some(boundary.into()),
        },
    )
}

pub fn border(id: impl Into<String>, template: impl Into<String>) -> Node {
    Node::new(
        id,
        NodeKind::Border {
            template: template.into(),
            boundary: None,
        },
    )
}

pub fn border_with_boundary(
    id: impl Into<String>,
    template: impl Into<String>,
    boundary: impl Into<String>,
) -> Node {
    Node::new(
        id,
        NodeKind::Border {
            template: template.into(),
            boundary: Some(boundary.into()),
        },
    )
}
