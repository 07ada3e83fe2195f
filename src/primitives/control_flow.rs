//! Control Flow Primitives - Repeated rendering of one markup span.
//!
//! A repeater owns exactly one row-template tag. Each render pass it asks
//! its [`ItemSource`] for a fresh item sequence, then renders the span once
//! per item with a transient item node bound under the item's index.
//!
//! # Pattern: Populate Callback
//!
//! Item nodes do not outlive their iteration. The repeater calls its
//! populate callback with an [`ItemScope`] so the application can attach
//! per-item children (labels, nested repeaters, ...) to the item node:
//!
//! ```ignore
//! let rows = RepeaterSpec::from_items(
//!     vec![json!({"name": "ada"}), json!({"name": "grace"})],
//!     |scope| {
//!         let name = scope.value()["name"].as_str().unwrap_or_default().to_string();
//!         scope.add(label("name", name))?;
//!         Ok(())
//!     },
//! );
//! tree.add_child(page, repeater("rows", rows))?;
//! ```
//!
//! # Item Lifecycle
//!
//! - Items are requested at the start of every render of the repeater, never cached
//! - Item node id is the absolute index (`offset + i`)
//! - Item node (and everything populate attached) is released right after its iteration

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::engine::{Node, NodeTree};
use crate::error::{EngineError, Result};
use crate::types::NodeId;

/// One item handed to a repeater iteration.
pub type Item = serde_json::Value;

/// Lazy, finite, restartable item sequences by provider id.
pub trait ItemProvider: Send + Sync {
    /// Items of `provider`, starting at `offset`, at most `count` of them.
    fn items(
        &self,
        provider: &str,
        offset: usize,
        count: Option<usize>,
    ) -> Result<Box<dyn Iterator<Item = Item> + '_>>;
}

/// In-memory provider keyed by provider id.
#[derive(Debug, Default, Clone)]
pub struct StaticItemProvider {
    lists: HashMap<String, Vec<Item>>,
}

impl StaticItemProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl Into<String>, items: Vec<Item>) -> Self {
        self.lists.insert(provider.into(), items);
        self
    }
}

impl ItemProvider for StaticItemProvider {
    fn items(
        &self,
        provider: &str,
        offset: usize,
        count: Option<usize>,
    ) -> Result<Box<dyn Iterator<Item = Item> + '_>> {
        let list = self.lists.get(provider).ok_or_else(|| EngineError::Provider {
            provider: provider.to_string(),
            message: "unknown provider".to_string(),
        })?;
        Ok(Box::new(window(list, offset, count).cloned()))
    }
}

pub(crate) fn window<'a>(
    items: &'a [Item],
    offset: usize,
    count: Option<usize>,
) -> impl Iterator<Item = &'a Item> {
    items.iter().skip(offset).take(count.unwrap_or(usize::MAX))
}

// =============================================================================
// Repeater Spec
// =============================================================================

/// Where a repeater's items come from.
#[derive(Debug, Clone)]
pub enum ItemSource {
    /// Looked up on the [`EngineContext`](crate::pipeline::EngineContext)'s provider.
    Provider(String),
    /// Fixed list owned by the node.
    Static(Rc<Vec<Item>>),
}

type Populate = Rc<dyn Fn(&mut ItemScope<'_>) -> Result<()>>;

#[derive(Clone)]
pub struct RepeaterSpec {
    pub(crate) source: ItemSource,
    pub(crate) offset: usize,
    pub(crate) count: Option<usize>,
    pub(crate) populate: Populate,
}

impl RepeaterSpec {
    pub fn from_items(
        items: Vec<Item>,
        populate: impl Fn(&mut ItemScope<'_>) -> Result<()> + 'static,
    ) -> Self {
        Self::new(ItemSource::Static(Rc::new(items)), populate)
    }

    pub fn from_provider(
        provider: impl Into<String>,
        populate: impl Fn(&mut ItemScope<'_>) -> Result<()> + 'static,
    ) -> Self {
        Self::new(ItemSource::Provider(provider.into()), populate)
    }

    fn new(
        source: ItemSource,
        populate: impl Fn(&mut ItemScope<'_>) -> Result<()> + 'static,
    ) -> Self {
        Self {
            source,
            offset: 0,
            count: None,
            populate: Rc::new(populate),
        }
    }

    /// Index of the first item to render.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Maximum number of items to render (view size).
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn source(&self) -> &ItemSource {
        &self.source
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn set_count(&mut self, count: Option<usize>) {
        self.count = count;
    }

    /// Replace a static list; the next pass renders the new items.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.source = ItemSource::Static(Rc::new(items));
    }
}

impl fmt::Debug for RepeaterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepeaterSpec")
            .field("source", &self.source)
            .field("offset", &self.offset)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Item Scope
// =============================================================================

/// What a populate callback sees for one iteration.
pub struct ItemScope<'a> {
    pub(crate) tree: &'a mut NodeTree,
    pub(crate) item: NodeId,
    pub(crate) index: usize,
    pub(crate) value: &'a Item,
}

impl ItemScope<'_> {
    /// Absolute item index (`offset + i`).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> &Item {
        self.value
    }

    /// The transient item node.
    pub fn item_node(&self) -> NodeId {
        self.item
    }

    /// Attach a child to the item node.
    pub fn add(&mut self, node: Node) -> Result<NodeId> {
        self.tree.add_child(self.item, node)
    }

    /// Full tree access, e.g. to attach grandchildren.
    pub fn tree(&mut self) -> &mut NodeTree {
        &mut *self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_provider_paging() {
        let provider = StaticItemProvider::new().with("n", (0..10).map(|i| json!(i)).collect());
        let items: Vec<Item> = provider.items("n", 3, Some(2)).unwrap().collect();
        assert_eq!(items, vec![json!(3), json!(4)]);

        let tail: Vec<Item> = provider.items("n", 8, None).unwrap().collect();
        assert_eq!(tail, vec![json!(8), json!(9)]);
    }

    #[test]
    fn test_unknown_provider() {
        let provider = StaticItemProvider::new();
        assert!(matches!(
            provider.items("missing", 0, None).map(|_| ()),
            Err(EngineError::Provider { .. })
        ));
    }

    #[test]
    fn test_spec_builders() {
        let spec = RepeaterSpec::from_items(vec![json!(1)], |_| Ok(())).offset(4).count(2);
        assert_eq!(spec.offset, 4);
        assert_eq!(spec.count, Some(2));
        assert!(matches!(spec.source(), ItemSource::Static(items) if items.len() == 1));
    }
}
