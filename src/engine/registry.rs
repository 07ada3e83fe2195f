//! Node Tree - Index allocation for the component arena.
//!
//! Manages the lifecycle of node indices:
//! - Slot storage addressed by [`NodeId`]
//! - Free index pool for O(1) reuse
//! - Per-parent child maps keyed by component id (insertion ordered)
//! - Recursive release with destroy callbacks
//!
//! Nodes never own each other. A parent knows its children by id, a child
//! knows its parent by index; everything else is a lookup through the tree.

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::types::{NodeFlags, NodeId};

use super::node::Node;

// =============================================================================
// Tree State
// =============================================================================

#[derive(Default)]
pub struct NodeTree {
    /// Node storage; `None` marks a free slot.
    slots: Vec<Option<Node>>,
    /// Pool of freed indices for reuse.
    free: Vec<usize>,
    /// Count of live nodes.
    allocated: usize,
    /// Destroy callbacks registered per index.
    destroy_callbacks: HashMap<NodeId, Vec<Box<dyn FnOnce()>>>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    fn allocate(&mut self, node: Node) -> NodeId {
        self.allocated += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Insert a node without a parent (a page, or a detached subtree root).
    pub fn insert_root(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        self.allocate(node)
    }

    /// Attach `node` under `parent`.
    ///
    /// Fails with [`EngineError::DuplicateChildId`] if the parent already has
    /// a child with the same id; the tree is left exactly as it was.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId> {
        let parent_node = self.get(parent)?;
        if parent_node.children.contains_key(&node.id) {
            return Err(EngineError::DuplicateChildId {
                parent: self.path(parent),
                id: node.id,
            });
        }

        node.parent = Some(parent);
        let key = node.id.clone();
        let id = self.allocate(node);
        self.get_mut(parent)?.children.insert(key, id);
        Ok(id)
    }

    /// Detach and release the child `id` of `parent`. Returns whether one existed.
    pub fn remove_child(&mut self, parent: NodeId, id: &str) -> Result<bool> {
        match self.get(parent)?.child(id) {
            Some(child) => {
                self.release(child);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Release a node and its whole subtree back to the pool.
    ///
    /// Children go first; destroy callbacks run per node before its slot is
    /// freed. Releasing an unallocated index does nothing.
    pub fn release(&mut self, id: NodeId) {
        let Some(node) = self.slots.get(id.0).and_then(Option::as_ref) else {
            return;
        };
        let parent = node.parent;
        let key = node.id.clone();

        if let Some(parent) = parent.and_then(|p| self.slots.get_mut(p.0)).and_then(Option::as_mut) {
            parent.children.shift_remove(&key);
        }
        self.release_subtree(id);
    }

    fn release_subtree(&mut self, id: NodeId) {
        let children: Vec<NodeId> = match self.slots.get(id.0).and_then(Option::as_ref) {
            Some(node) => node.children().collect(),
            None => return,
        };
        for child in children {
            self.release_subtree(child);
        }

        if let Some(callbacks) = self.destroy_callbacks.remove(&id) {
            for callback in callbacks {
                callback();
            }
        }

        self.slots[id.0] = None;
        self.free.push(id.0);
        self.allocated -= 1;

        // Fully drained: drop storage so indices restart at zero
        if self.allocated == 0 {
            self.slots.clear();
            self.free.clear();
        }
    }

    /// Register a callback to run when `id` is released.
    pub fn on_destroy(&mut self, id: NodeId, callback: impl FnOnce() + 'static) {
        self.destroy_callbacks
            .entry(id)
            .or_default()
            .push(Box::new(callback));
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(EngineError::NodeNotFound(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(EngineError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.get(id.0).is_some_and(Option::is_some)
    }

    pub fn len(&self) -> usize {
        self.allocated
    }

    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).ok().and_then(Node::parent)
    }

    /// Direct child of `parent` with the given component id.
    pub fn child(&self, parent: NodeId, id: &str) -> Option<NodeId> {
        self.get(parent).ok().and_then(|node| node.child(id))
    }

    /// Children of `id` in insertion order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|node| node.children().collect())
            .unwrap_or_default()
    }

    /// Follow a `:`-separated id path down from `from`.
    pub fn lookup_path(&self, from: NodeId, path: &str) -> Option<NodeId> {
        path.split(':')
            .filter(|segment| !segment.is_empty())
            .try_fold(from, |node, segment| self.child(node, segment))
    }

    /// Topmost ancestor of `id`.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Page-relative path of a node: ancestor ids below the root joined by `:`.
    ///
    /// A root reports its own id.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Ok(node) = self.get(node_id) else { break };
            if node.parent.is_none() {
                if segments.is_empty() {
                    return node.id.clone();
                }
                break;
            }
            segments.push(node.id.as_str());
            current = node.parent;
        }
        segments.reverse();
        segments.join(":")
    }

    /// `id` followed by all its descendants, depth first in child order.
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        self.preorder_filtered(id, |_, _| true)
    }

    /// Pre-order walk that prunes every subtree whose root fails `keep`.
    pub fn preorder_filtered(&self, id: NodeId, keep: impl Fn(NodeId, &Node) -> bool) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Ok(node) = self.get(current) else { continue };
            if !keep(current, node) {
                continue;
            }
            order.push(current);
            let children: Vec<NodeId> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    // =========================================================================
    // Flags
    // =========================================================================

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.get_mut(id)?.set_visible(visible);
        Ok(())
    }

    pub fn set_flag(&mut self, id: NodeId, flag: NodeFlags, on: bool) -> Result<()> {
        self.get_mut(id)?.flags.set(flag, on);
        Ok(())
    }

    pub fn has_flag(&self, id: NodeId, flag: NodeFlags) -> bool {
        self.get(id).is_ok_and(|node| node.flags.contains(flag))
    }
}

impl std::fmt::Debug for NodeTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTree")
            .field("allocated", &self.allocated)
            .field("capacity", &self.slots.len())
            .field("free", &self.free.len())
            .finish()
    }
}
