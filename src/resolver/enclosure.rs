//! Enclosures - Spans shown or hidden by one controlling component.
//!
//! Two forms are understood:
//! - The marker pair `[enclosure-start:controller] ... [enclosure-end]`
//! - The tag `<spark:enclosure child="path">...</spark:enclosure>`; without
//!   the attribute the first bound id inside the span is the controller
//!
//! The controller path is relative to the node that owns the enclosure. If
//! the controller does not render in this pass, the whole span is skipped;
//! otherwise the enclosure itself renders as plain markup and its content is
//! walked normally (the controller renders when its tag comes up).

use crate::error::{EngineError, Result};
use crate::config::RenderSettings;
use crate::types::{MarkerKind, MarkupElement, NodeId, TagData};

use super::{ResolveRequest, Resolution, TagResolver};

#[derive(Debug, Default, Clone, Copy)]
pub struct EnclosureResolver;

impl EnclosureResolver {
    /// Controller path named by the enclosure at the request position.
    fn controller<'r>(&self, request: &'r ResolveRequest<'_>) -> Option<&'r str> {
        match request.element {
            MarkupElement::Marker { payload, .. } => payload.as_deref(),
            MarkupElement::Open(tag) | MarkupElement::OpenClose(tag) => tag
                .attr(&request.settings.enclosure_child_attribute)
                .or_else(|| first_bound_id(request)),
            _ => None,
        }
    }

    fn locate(&self, request: &ResolveRequest<'_>, controller: &str) -> Option<NodeId> {
        let mut current = Some(request.owner);
        while let Some(owner) = current {
            if let Some(found) = request.tree.lookup_path(owner, controller) {
                return Some(found);
            }
            current = request
                .tree
                .get(owner)
                .ok()
                .filter(|node| node.is_transparent())
                .and_then(|node| node.parent());
        }
        None
    }

    fn evaluate(&self, request: &ResolveRequest<'_>) -> Result<Resolution> {
        let Some(controller) = self.controller(request) else {
            return Err(self.missing(request, ""));
        };
        let Some(node) = self.locate(request, controller) else {
            return Err(self.missing(request, controller));
        };

        if request.is_visible(node) {
            Ok(Resolution::Enter)
        } else {
            log::trace!("enclosure controlled by '{controller}' is hidden");
            Ok(Resolution::Skip)
        }
    }

    fn missing(&self, request: &ResolveRequest<'_>, controller: &str) -> EngineError {
        EngineError::MissingEnclosureController {
            template: request.sequence.template().to_string(),
            path: request.tree.path(request.owner),
            controller: controller.to_string(),
        }
    }
}

fn first_bound_id<'r>(request: &'r ResolveRequest<'_>) -> Option<&'r str> {
    let end = request.sequence.matching_close(request.position)?;
    request.sequence.elements()[request.position + 1..end]
        .iter()
        .find_map(MarkupElement::id)
}

impl TagResolver for EnclosureResolver {
    fn name(&self) -> &str {
        "enclosure"
    }

    fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Option<Resolution>> {
        match request.element {
            MarkupElement::Marker {
                kind: MarkerKind::EnclosureStart,
                ..
            } => self.evaluate(request).map(Some),
            MarkupElement::Marker {
                kind: MarkerKind::EnclosureEnd,
                ..
            } => Ok(Some(Resolution::Enter)),
            MarkupElement::Open(tag) | MarkupElement::OpenClose(tag)
                if tag.name == request.settings.enclosure_tag =>
            {
                self.evaluate(request).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn claims_unbound(&self, tag: &TagData, settings: &RenderSettings) -> bool {
        tag.name == settings.enclosure_tag
    }
}
