//! Transparent delegation.
//!
//! A transparent owner does not have a child namespace of its own for
//! unmatched tags: the id is looked up among its parent's children, and if
//! that parent is transparent too, further up.

use crate::error::Result;

use super::{ResolveRequest, Resolution, TagResolver};

#[derive(Debug, Default, Clone, Copy)]
pub struct TransparentResolver;

impl TagResolver for TransparentResolver {
    fn name(&self) -> &str {
        "transparent"
    }

    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Option<Resolution>> {
        let Some(id) = request.id else {
            return Ok(None);
        };

        let mut current = request.owner;
        loop {
            let node = request.tree.get(current)?;
            if !node.is_transparent() {
                return Ok(None);
            }
            let Some(parent) = node.parent() else {
                return Ok(None);
            };
            if let Some(found) = request.tree.child(parent, id) {
                return Ok(Some(Resolution::Delegate(found)));
            }
            current = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::config::RenderSettings;
    use crate::engine::{Node, NodeKind, NodeTree};
    use crate::markup::SequenceBuilder;

    #[test]
    fn test_walks_through_transparent_ancestors() {
        let mut tree = NodeTree::new();
        let root = tree.insert_root(Node::new("Home", NodeKind::Container));
        let target = tree.add_child(root, Node::new("name", NodeKind::Container)).unwrap();
        let outer = tree.add_child(root, Node::new("outer", NodeKind::Container).transparent()).unwrap();
        let inner = tree.add_child(outer, Node::new("inner", NodeKind::Container).transparent()).unwrap();
        let opaque = tree.add_child(root, Node::new("opaque", NodeKind::Container)).unwrap();

        let sequence = SequenceBuilder::new().open_close_bound("b", "name").build("Home").unwrap();
        let settings = RenderSettings::default();
        let hidden = HashSet::new();
        let request = |owner| ResolveRequest {
            tree: &tree,
            owner,
            element: sequence.get(0).unwrap(),
            id: Some("name"),
            sequence: &sequence,
            position: 0,
            settings: &settings,
            hidden: &hidden,
        };

        assert!(matches!(
            TransparentResolver.resolve(&request(inner)).unwrap(),
            Some(Resolution::Delegate(found)) if found == target
        ));
        assert!(TransparentResolver.resolve(&request(opaque)).unwrap().is_none());
    }
}
