//! Container Primitives - Nodes that render with their parent's markup.
//!
//! # Example
//!
//! ```ignore
//! use spark_markup::primitives::{page, container, label};
//!
//! let mut tree = NodeTree::new();
//! let home = tree.insert_root(page("Home"));
//! let form = tree.add_child(home, container("form"))?;
//! tree.add_child(form, label("name", "Ada & Grace"))?;
//! ```

use crate::engine::{CustomRender, Node, NodeKind};

use super::control_flow::RepeaterSpec;

/// Root of a render pass over `template`. The node id is the template name.
pub fn page(template: impl Into<String>) -> Node {
    let template = template.into();
    Node::new(template.clone(), NodeKind::Page { template })
}

/// Plain container; its tag and body come from the enclosing markup.
pub fn container(id: impl Into<String>) -> Node {
    Node::new(id, NodeKind::Container)
}

/// Container whose unmatched child tags resolve against its parent.
pub fn transparent_container(id: impl Into<String>) -> Node {
    container(id).transparent()
}

/// Replace the tag body with escaped text.
pub fn label(id: impl Into<String>, text: impl Into<String>) -> Node {
    Node::new(
        id,
        NodeKind::Label {
            text: text.into(),
            escape: true,
        },
    )
}

/// Replace the tag body with text written as-is.
pub fn raw_label(id: impl Into<String>, text: impl Into<String>) -> Node {
    Node::new(
        id,
        NodeKind::Label {
            text: text.into(),
            escape: false,
        },
    )
}

/// Render `spec`'s items over this tag's span.
pub fn repeater(id: impl Into<String>, spec: RepeaterSpec) -> Node {
    Node::new(id, NodeKind::Repeater(spec))
}

/// Hand-written rendering. Must consume exactly the node's own span.
pub fn custom(id: impl Into<String>, renderer: impl CustomRender + 'static) -> Node {
    Node::new(id, NodeKind::Custom(Box::new(renderer)))
}
