//! Resolver Chain - What happens to a tag no child claims.
//!
//! When a bound tag finds no child with its id (or a control marker / a
//! framework tag shows up), the render pass builds a [`ResolveRequest`] and
//! asks the [`ResolverChain`]. Resolvers are tried in registration order and
//! the first one returning a [`Resolution`] wins; later resolvers are not
//! consulted. If none claims the tag the pass fails with
//! [`EngineError::UnresolvedTag`].
//!
//! The standard chain is:
//! 1. [`TransparentResolver`] - defer to the parent of a transparent owner
//! 2. [`EnclosureResolver`] - show or skip a span keyed off one controller
//! 3. [`AutoResolver`] - inject an ephemeral node for well-known tags

mod auto;
mod enclosure;
mod transparent;

use std::collections::HashSet;

use crate::config::RenderSettings;
use crate::engine::{Node, NodeTree};
use crate::error::{EngineError, Result};
use crate::markup::ElementSequence;
use crate::types::{MarkupElement, NodeId, TagData};

pub use auto::{AutoComponentRegistry, AutoResolver};
pub use enclosure::EnclosureResolver;
pub use transparent::TransparentResolver;

// =============================================================================
// Request / Resolution
// =============================================================================

/// Everything a resolver may look at. Read-only.
pub struct ResolveRequest<'a> {
    pub tree: &'a NodeTree,
    /// Node whose child namespace missed.
    pub owner: NodeId,
    pub element: &'a MarkupElement,
    /// Bound (or generated) id of the tag; `None` for markers.
    pub id: Option<&'a str>,
    pub sequence: &'a ElementSequence,
    pub position: usize,
    pub settings: &'a RenderSettings,
    pub(crate) hidden: &'a HashSet<NodeId>,
}

impl ResolveRequest<'_> {
    pub fn tag(&self) -> Option<&TagData> {
        self.element.tag()
    }

    /// Whether `node` renders in this pass: it and every ancestor are
    /// visible, allowed, and did not refuse in `before_render`.
    pub fn is_visible(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            let Ok(node) = self.tree.get(id) else {
                return false;
            };
            if !node.is_render_allowed() || self.hidden.contains(&id) {
                return false;
            }
            current = node.parent();
        }
        true
    }

    /// Page-relative path the tag would have had as a child of the owner.
    pub fn expected_path(&self) -> String {
        let id = self.id.unwrap_or_else(|| self.element_label());
        match self.tree.parent(self.owner) {
            Some(_) => format!("{}:{}", self.tree.path(self.owner), id),
            None => id.to_string(),
        }
    }

    fn element_label(&self) -> &str {
        match self.element {
            MarkupElement::Marker { kind, .. } => kind.as_str(),
            MarkupElement::Open(tag) | MarkupElement::OpenClose(tag) => &tag.name,
            MarkupElement::Close { name } => name,
            MarkupElement::Raw(_) => "#text",
        }
    }
}

/// How a claimed tag is rendered.
pub enum Resolution {
    /// Render this existing node at the cursor.
    Delegate(NodeId),
    /// Skip the whole span; nothing renders.
    Skip,
    /// Treat the element as plain markup and keep walking inside it.
    Enter,
    /// Attach this node under the owner for the rest of the pass and render it.
    Inject(Node),
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Delegate(id) => write!(f, "Delegate({id})"),
            Resolution::Skip => f.write_str("Skip"),
            Resolution::Enter => f.write_str("Enter"),
            Resolution::Inject(node) => write!(f, "Inject({})", node.id()),
        }
    }
}

pub trait TagResolver {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Claim the tag with `Some`, pass with `None`.
    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Option<Resolution>>;

    /// Whether an unbound tag should be routed through the chain at all.
    fn claims_unbound(&self, _tag: &TagData, _settings: &RenderSettings) -> bool {
        false
    }
}

// =============================================================================
// Chain
// =============================================================================

#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn TagResolver>>,
}

impl ResolverChain {
    /// Empty chain; every miss is an error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transparent, enclosure, auto: in that order.
    pub fn standard(auto: AutoComponentRegistry) -> Self {
        Self::new()
            .with(TransparentResolver)
            .with(EnclosureResolver)
            .with(AutoResolver::new(auto))
    }

    pub fn with(mut self, resolver: impl TagResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub fn claims_unbound(&self, tag: &TagData, settings: &RenderSettings) -> bool {
        self.resolvers
            .iter()
            .any(|resolver| resolver.claims_unbound(tag, settings))
    }

    /// First claiming resolver wins; no claim is an error.
    pub fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Resolution> {
        for resolver in &self.resolvers {
            if let Some(resolution) = resolver.resolve(request)? {
                log::trace!(
                    "{} resolved '{}' under {} as {:?}",
                    resolver.name(),
                    request.element,
                    request.tree.path(request.owner),
                    resolution
                );
                return Ok(resolution);
            }
        }
        Err(unresolved(request))
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Build (and log) the error for a tag nothing claimed.
fn unresolved(request: &ResolveRequest<'_>) -> EngineError {
    let id = request.id.unwrap_or_else(|| request.element_label()).to_string();
    let path = request.expected_path();
    let similar = similar_names(request.tree, request.owner, &id);

    let error = EngineError::UnresolvedTag {
        template: request.sequence.template().to_string(),
        path,
        id,
        similar,
    };
    log::error!("{error}");
    error
}

/// Paths of every node whose id is within edit distance 2 of `id`.
fn similar_names(tree: &NodeTree, owner: NodeId, id: &str) -> Vec<String> {
    let root = tree.root_of(owner);
    tree.preorder(root)
        .into_iter()
        .filter(|&node| node != root)
        .filter(|&node| {
            tree.get(node)
                .is_ok_and(|n| strsim::levenshtein(id, n.id()) < 3)
        })
        .map(|node| tree.path(node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NodeKind;
    use crate::markup::SequenceBuilder;

    #[test]
    fn test_similar_names() {
        let mut tree = NodeTree::new();
        let root = tree.insert_root(Node::new("Home", NodeKind::Container));
        let form = tree.add_child(root, Node::new("form", NodeKind::Container)).unwrap();
        tree.add_child(form, Node::new("name", NodeKind::Container)).unwrap();
        tree.add_child(form, Node::new("password", NodeKind::Container)).unwrap();

        assert_eq!(similar_names(&tree, form, "nmae"), vec!["form:name".to_string()]);
        assert!(similar_names(&tree, form, "zzzzzz").is_empty());
    }

    #[test]
    fn test_empty_chain_reports_unresolved() {
        let mut tree = NodeTree::new();
        let root = tree.insert_root(Node::new("Home", NodeKind::Container));
        let form = tree.add_child(root, Node::new("form", NodeKind::Container)).unwrap();
        let sequence = SequenceBuilder::new()
            .open_close_bound("input", "nmae")
            .build("Home")
            .unwrap();
        let settings = RenderSettings::default();
        let hidden = HashSet::new();
        let request = ResolveRequest {
            tree: &tree,
            owner: form,
            element: sequence.get(0).unwrap(),
            id: Some("nmae"),
            sequence: &sequence,
            position: 0,
            settings: &settings,
            hidden: &hidden,
        };

        let err = ResolverChain::new().resolve(&request).unwrap_err();
        assert!(matches!(
            &err,
            EngineError::UnresolvedTag { path, id, .. } if path == "form:nmae" && id == "nmae"
        ));
    }

    #[test]
    fn test_standard_order() {
        let chain = ResolverChain::standard(AutoComponentRegistry::standard(&RenderSettings::default()));
        assert_eq!(chain.names(), vec!["transparent", "enclosure", "auto"]);
    }
}
