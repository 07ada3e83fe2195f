//! Auto-injection of ephemeral nodes for well-known tags.
//!
//! The registry maps tag names to node factories. A matching tag with no
//! child of its id gets a fresh node, attached under the current owner with
//! the AUTO flag and released when the pass ends.

use indexmap::IndexMap;

use crate::config::RenderSettings;
use crate::engine::{Node, NodeKind};
use crate::error::Result;
use crate::types::TagData;

use super::{ResolveRequest, Resolution, TagResolver};

type Factory = Box<dyn Fn(&TagData, &str) -> Node>;

#[derive(Default)]
pub struct AutoComponentRegistry {
    factories: IndexMap<String, Factory>,
}

impl AutoComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header container for `head_tag`, remove region for `remove_tag`.
    pub fn standard(settings: &RenderSettings) -> Self {
        Self::new()
            .with(settings.head_tag.clone(), |_, id| {
                Node::new(id, NodeKind::Header).transparent()
            })
            .with(settings.remove_tag.clone(), |_, id| Node::new(id, NodeKind::Remove))
    }

    /// Register (or replace) the factory for a tag name.
    pub fn with(
        mut self,
        tag: impl Into<String>,
        factory: impl Fn(&TagData, &str) -> Node + 'static,
    ) -> Self {
        self.factories.insert(tag.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Build a node for `tag` with component id `id`.
    pub fn create(&self, tag: &TagData, id: &str) -> Option<Node> {
        self.factories.get(&tag.name).map(|factory| factory(tag, id))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for AutoComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tags()).finish()
    }
}

#[derive(Debug)]
pub struct AutoResolver {
    registry: AutoComponentRegistry,
}

impl AutoResolver {
    pub fn new(registry: AutoComponentRegistry) -> Self {
        Self { registry }
    }
}

impl TagResolver for AutoResolver {
    fn name(&self) -> &str {
        "auto"
    }

    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Option<Resolution>> {
        let (Some(tag), Some(id)) = (request.tag(), request.id) else {
            return Ok(None);
        };
        Ok(self.registry.create(tag, id).map(Resolution::Inject))
    }

    fn claims_unbound(&self, tag: &TagData, _settings: &RenderSettings) -> bool {
        self.registry.contains(&tag.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let settings = RenderSettings::default();
        let registry = AutoComponentRegistry::standard(&settings);
        assert_eq!(registry.tags().collect::<Vec<_>>(), vec!["head", "spark:remove"]);

        let head = registry.create(&TagData::new("head"), "_head0").unwrap();
        assert_eq!(head.id(), "_head0");
        assert!(matches!(head.kind(), NodeKind::Header));
        assert!(head.is_transparent());

        assert!(registry.create(&TagData::new("div"), "x").is_none());
    }

    #[test]
    fn test_claims_only_registered_tags() {
        let settings = RenderSettings::default();
        let resolver = AutoResolver::new(AutoComponentRegistry::standard(&settings));
        assert!(resolver.claims_unbound(&TagData::new("spark:remove"), &settings));
        assert!(!resolver.claims_unbound(&TagData::new("span"), &settings));
    }
}
