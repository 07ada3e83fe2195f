//! # spark-markup
//!
//! Component-oriented markup rendering for Rust.
//!
//! ## Architecture
//!
//! A page is a tree of components living in one [`NodeTree`] arena. Markup
//! templates arrive already parsed as immutable [`ElementSequence`]s. A
//! render pass walks the page's sequence with a cursor: plain markup is
//! copied through, tags carrying a component id are handed to the matching
//! child, and anything no child claims goes to a fixed resolver chain
//! (transparent delegation, enclosures, auto-injected components).
//!
//! ```text
//! NodeTree + TemplateCache → EngineContext::render → RenderPass → MarkupSink
//! ```
//!
//! Panels and borders ship their own markup and render their call-site body
//! at a body slot; repeaters render one tag span per item; header
//! contributions are deduplicated per pass.
//!
//! ## Modules
//!
//! - [`types`] - Markup elements, tags, node ids and flags
//! - [`markup`] - Element sequences, cursors, template sources and cache
//! - [`engine`] - Node arena, node kinds and hooks
//! - [`resolver`] - The chain consulted for unmatched tags
//! - [`pipeline`] - Render passes and the engine context
//! - [`primitives`] - Node constructors and repeater item sources
//! - [`renderer`] - Output sinks and header contributions
//! - [`config`] - Render settings
//! - [`error`] - Error taxonomy

pub mod config;
pub mod engine;
pub mod error;
pub mod markup;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod resolver;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::RenderSettings;
pub use error::{EngineError, Result};

pub use engine::{CustomRender, Node, NodeHooks, NodeKind, NodeTree};

pub use markup::{
    ElementSequence, MarkupCursor, MarkupSource, SequenceBuilder, StaticMarkupSource, TemplateCache,
};

pub use pipeline::EngineContext;

pub use primitives::{
    border, border_with_boundary, container, custom, label, page, panel, panel_with_boundary,
    raw_label, repeater, transparent_container, Item, ItemProvider, ItemScope, ItemSource,
    RepeaterSpec, StaticItemProvider,
};

pub use renderer::{HeaderResponse, HeaderTokenSet, MarkupSink, OutputBuffer, RenderToken};

pub use resolver::{
    AutoComponentRegistry, AutoResolver, EnclosureResolver, Resolution, ResolveRequest,
    ResolverChain, TagResolver, TransparentResolver,
};
