//! Primitives - Component building blocks.
//!
//! Constructors returning detached [`Node`](crate::engine::Node)s, ready to
//! be attached with [`NodeTree::add_child`](crate::engine::NodeTree::add_child):
//! - [`page`] - Root of a render pass
//! - [`container`] / [`transparent_container`] - Inline rendering
//! - [`label`] / [`raw_label`] - Text replacing the tag body
//! - [`panel`] / [`border`] - Own associated markup with a body slot
//! - [`repeater`] - One span rendered per item
//! - [`custom`] - Hand-written rendering under the span contract
//!
//! # Architecture
//!
//! Nodes are NOT objects holding their children. They are slots in a
//! [`NodeTree`](crate::engine::NodeTree) arena. Each constructor:
//! 1. Picks the node kind (the rendering protocol)
//! 2. Sets the component id the markup binds to
//! 3. Leaves attachment, hooks and flags to the caller

mod container;
mod control_flow;
mod panel;

pub use container::{container, custom, label, page, raw_label, repeater, transparent_container};
pub use control_flow::{Item, ItemProvider, ItemScope, ItemSource, RepeaterSpec, StaticItemProvider};
pub use panel::{border, border_with_boundary, panel, panel_with_boundary};

pub(crate) use control_flow::window;
