//! Engine Context - Explicit render configuration threaded through a pass.
//!
//! Holds the settings, the shared template cache, the resolver chain and
//! the optional item provider. Nothing here is a process-wide singleton:
//! build one per request (cheap; the cache is an `Arc`) or reuse one on the
//! thread that owns it.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use spark_markup::{EngineContext, RenderSettings, StaticMarkupSource, TemplateCache};
//!
//! let cache = Arc::new(TemplateCache::new(source));
//! let ctx = EngineContext::new(RenderSettings::default(), cache);
//!
//! let html = ctx.render_to_string(&mut tree, page)?;
//! ```

use std::sync::Arc;

use crate::config::RenderSettings;
use crate::engine::{NodeKind, NodeTree};
use crate::error::{EngineError, Result};
use crate::markup::{MarkupCursor, TemplateCache};
use crate::primitives::ItemProvider;
use crate::renderer::MarkupSink;
use crate::resolver::{AutoComponentRegistry, ResolverChain};
use crate::types::NodeId;

use super::render::RenderPass;

pub struct EngineContext {
    settings: RenderSettings,
    cache: Arc<TemplateCache>,
    resolvers: ResolverChain,
    provider: Option<Arc<dyn ItemProvider>>,
}

impl EngineContext {
    /// Context with the standard resolver chain for `settings`.
    pub fn new(settings: RenderSettings, cache: Arc<TemplateCache>) -> Self {
        let resolvers = ResolverChain::standard(AutoComponentRegistry::standard(&settings));
        Self {
            settings,
            cache,
            resolvers,
            provider: None,
        }
    }

    /// Replace the resolver chain.
    pub fn with_resolvers(mut self, resolvers: ResolverChain) -> Self {
        self.resolvers = resolvers;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn ItemProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    pub fn resolvers(&self) -> &ResolverChain {
        &self.resolvers
    }

    pub fn provider(&self) -> Option<&dyn ItemProvider> {
        self.provider.as_deref()
    }

    // =========================================================================
    // Render passes
    // =========================================================================

    /// Render a page node's whole template to `out`.
    ///
    /// Header tokens and before-render decisions start empty and are dropped
    /// when the pass ends. Markup after the head tag reaches `out` only once
    /// the pass succeeds, with the header contributions in front of it.
    /// Auto-injected nodes are released even when the pass fails.
    pub fn render(&self, tree: &mut NodeTree, root: NodeId, out: &mut dyn MarkupSink) -> Result<()> {
        let template = match tree.get(root)?.kind() {
            NodeKind::Page { template } => template.clone(),
            other => {
                return Err(EngineError::InvalidRoot {
                    path: tree.path(root),
                    kind: other.name(),
                });
            }
        };

        log::debug!("render pass for '{template}' started");
        let mut pass = RenderPass::new(self, tree, out);
        let result = pass.render_page(root, &template);
        let contributed = pass.tokens().len();
        if result.is_ok() {
            pass.flush();
        }
        pass.finish();

        match &result {
            Ok(()) => log::debug!(
                "render pass for '{template}' finished ({contributed} header contributions)"
            ),
            Err(err) => log::debug!("render pass for '{template}' failed: {err}"),
        }
        result
    }

    pub fn render_to_string(&self, tree: &mut NodeTree, root: NodeId) -> Result<String> {
        let mut out = String::new();
        self.render(tree, root, &mut out)?;
        Ok(out)
    }

    /// Render one node at `cursor` (partial re-render).
    ///
    /// The cursor must sit on the node's own tag; on success it is left one
    /// past the node's span, under the same contract as a full pass.
    pub fn render_component(
        &self,
        tree: &mut NodeTree,
        node: NodeId,
        cursor: &mut MarkupCursor,
        out: &mut dyn MarkupSink,
    ) -> Result<()> {
        log::debug!(
            "rendering component '{}' at {} in '{}'",
            tree.path(node),
            cursor.position(),
            cursor.template()
        );
        let mut pass = RenderPass::new(self, tree, out);
        let result = pass
            .prepare(node)
            .and_then(|()| pass.render_node(node, cursor, None));
        if result.is_ok() {
            pass.flush();
        }
        pass.finish();
        result
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("settings", &self.settings)
            .field("cache", &self.cache)
            .field("resolvers", &self.resolvers)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}
