//! Engine - Node arena and node definitions.
//!
//! The engine manages the core data structures:
//! - [`NodeTree`]: Index allocation, parent/child links, release and destroy callbacks
//! - [`Node`]: Id, flags, kind and hooks of one component
//! - [`NodeKind`]: Which rendering protocol a node follows
//!
//! # Architecture
//!
//! Components are NOT objects owning their children. They are slots in one
//! arena, linked by index:
//!
//! ```text
//! #0: Page   "Home"   (parent=-,  children={form:#1})
//! #1: Container "form" (parent=#0, children={name:#2})
//! #2: Label  "name"   (parent=#1, children={})
//! ```
//!
//! Parent links are plain indices, so there are no ownership cycles, and a
//! released subtree returns its slots to the free pool.

mod node;
mod registry;

pub use node::{CustomRender, Node, NodeHooks, NodeKind};
pub use registry::NodeTree;
