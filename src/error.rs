//! Error taxonomy for rendering.
//!
//! Every variant aborts the render pass that produced it. Nothing here is
//! retried; a caller wanting a fallback page runs a separate pass.

use thiserror::Error;

use crate::types::NodeId;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cursor advanced past the end of template '{template}' (length {len})")]
    OutOfBounds { template: String, len: usize },

    #[error("cannot rewind cursor over template '{template}' to {mark}: length is {len}")]
    InvalidMark {
        template: String,
        mark: usize,
        len: usize,
    },

    #[error(
        "unable to find component with id '{id}' in template '{template}'\n\texpected: '{path}'{}",
        similar_suffix(.similar)
    )]
    UnresolvedTag {
        template: String,
        path: String,
        id: String,
        similar: Vec<String>,
    },

    #[error("'{parent}' already has a child with id '{id}'")]
    DuplicateChildId { parent: String, id: String },

    #[error("template '{template}' has no <{boundary}> boundary tag")]
    MissingBoundaryTag { template: String, boundary: String },

    #[error("template '{template}' has {count} <{boundary}> boundary tags, expected exactly one")]
    AmbiguousBoundaryTag {
        template: String,
        boundary: String,
        count: usize,
    },

    #[error(
        "component '{path}' left the cursor at {actual} in template '{template}', expected {expected}"
    )]
    CursorContractViolation {
        template: String,
        path: String,
        expected: usize,
        actual: usize,
    },

    #[error("malformed markup in template '{template}' at element {position}: {message}")]
    MalformedMarkup {
        template: String,
        position: usize,
        message: String,
    },

    #[error("no markup available for template '{template}'")]
    TemplateNotFound { template: String },

    #[error("node {0} is not allocated")]
    NodeNotFound(NodeId),

    #[error("'{path}' is a {kind} and cannot start a render pass; use a page or render_component")]
    InvalidRoot { path: String, kind: &'static str },

    #[error("enclosure in template '{template}' refers to missing controller '{controller}' under '{path}'")]
    MissingEnclosureController {
        template: String,
        path: String,
        controller: String,
    },

    #[error("repeater '{path}' needs item provider '{provider}' but none is installed")]
    ProviderUnavailable { path: String, provider: String },

    #[error("item provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    #[error("invalid render settings: {0}")]
    Settings(#[from] toml::de::Error),
}

fn similar_suffix(similar: &[String]) -> String {
    if similar.is_empty() {
        String::new()
    } else {
        format!("\n\tfound with similar names: '{}'", similar.join("', '"))
    }
}
