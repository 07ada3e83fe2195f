//! Render Pipeline
//!
//! Turns a node tree plus element sequences into markup text.
//!
//! # Pipeline Architecture
//!
//! ```text
//! EngineContext::render → RenderPass (prepare → walk → finish) → MarkupSink
//! ```
//!
//! ## Data Flow
//!
//! 1. **prepare** - `before_render` over the tree; refusals hide subtrees
//! 2. **walk** - one cursor per element sequence, handed down by `&mut`;
//!    tags bind to children, misses go to the resolver chain
//! 3. **protocols** - inline containers, labels, panels/borders (body
//!    substitution), repeaters, header containers, custom renderers
//! 4. **finish** - auto-injected nodes released
//!
//! ## Key Design Principles
//!
//! - **Pass-local state**: cursors, body captures, header tokens and
//!   decisions are created per pass and never stored on nodes
//! - **Shared immutable markup**: element sequences come from the
//!   [`TemplateCache`](crate::markup::TemplateCache) behind `Arc`
//! - **Span contract**: every node consumes exactly its own span

mod body;
mod context;
mod render;
mod repeat;

pub use context::EngineContext;
