//! Element Sequence - Immutable parsed template.
//!
//! An ordered, randomly indexable list of [`MarkupElement`]s. Built once per
//! template, validated for balanced nesting, then shared read-only (behind
//! `Arc`) by every cursor and every concurrent render pass.
//!
//! Validation records each opener's partner index (tag → matching close,
//! enclosure start → enclosure end) so skipping a span never rescans it.

use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::types::{MarkerKind, MarkupElement, TagData};

#[derive(Debug)]
pub struct ElementSequence {
    template: String,
    elements: Vec<MarkupElement>,
    partner: Vec<Option<usize>>,
}

enum Frame<'a> {
    Tag(&'a str),
    Enclosure,
}

impl ElementSequence {
    /// Build and validate a sequence.
    ///
    /// Fails with [`EngineError::MalformedMarkup`] if the sequence is empty,
    /// a close tag does not match the innermost open tag, or an opener is
    /// never closed.
    pub fn new(template: impl Into<String>, elements: Vec<MarkupElement>) -> Result<Self> {
        let template = template.into();
        if elements.is_empty() {
            return Err(EngineError::MalformedMarkup {
                template,
                position: 0,
                message: "element sequence is empty".to_string(),
            });
        }

        let partner = match_partners(&elements).map_err(|(position, message)| {
            EngineError::MalformedMarkup {
                template: template.clone(),
                position,
                message,
            }
        })?;

        Ok(Self {
            template,
            elements,
            partner,
        })
    }

    /// Name of the template this sequence was parsed from.
    pub fn template(&self) -> &str {
        &self.template
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the sequence has no elements. [`ElementSequence::new`] rejects empty input.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&MarkupElement> {
        self.elements.get(index)
    }

    pub fn elements(&self) -> &[MarkupElement] {
        &self.elements
    }

    /// Index of the element closing the opener at `index`.
    ///
    /// `Open` → its `Close`, `EnclosureStart` → its `EnclosureEnd`. `None`
    /// for every other element.
    #[inline]
    pub fn matching_close(&self, index: usize) -> Option<usize> {
        self.partner.get(index).copied().flatten()
    }

    /// One past the last element of the span starting at `index`.
    ///
    /// For openers this is one past the partner; for anything else the span
    /// is the element itself.
    pub fn span_end(&self, index: usize) -> usize {
        match self.matching_close(index) {
            Some(close) => close + 1,
            None => index + 1,
        }
    }

    /// Indices of all `Open`/`OpenClose` tags with the given name.
    pub fn find_tags(&self, name: &str) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.tag().is_some_and(|tag| tag.name == name))
            .map(|(index, _)| index)
            .collect()
    }
}

fn match_partners(elements: &[MarkupElement]) -> std::result::Result<Vec<Option<usize>>, (usize, String)> {
    let mut partner = vec![None; elements.len()];
    let mut stack: Vec<(usize, Frame<'_>)> = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        match element {
            MarkupElement::Open(tag) => stack.push((index, Frame::Tag(&tag.name))),
            MarkupElement::Close { name } => match stack.pop() {
                Some((open, Frame::Tag(open_name))) if open_name == name.as_str() => {
                    partner[open] = Some(index);
                }
                Some((open, Frame::Tag(open_name))) => {
                    return Err((
                        index,
                        format!("</{name}> closes <{open_name}> opened at element {open}"),
                    ));
                }
                Some((open, Frame::Enclosure)) => {
                    return Err((
                        index,
                        format!("</{name}> crosses the enclosure opened at element {open}"),
                    ));
                }
                None => return Err((index, format!("</{name}> has no open tag"))),
            },
            MarkupElement::Marker {
                kind: MarkerKind::EnclosureStart,
                ..
            } => stack.push((index, Frame::Enclosure)),
            MarkupElement::Marker {
                kind: MarkerKind::EnclosureEnd,
                ..
            } => match stack.pop() {
                Some((open, Frame::Enclosure)) => partner[open] = Some(index),
                Some((_, Frame::Tag(open_name))) => {
                    return Err((index, format!("enclosure end inside unclosed <{open_name}>")));
                }
                None => return Err((index, "enclosure end without a start".to_string())),
            },
            _ => {}
        }
    }

    if let Some((open, frame)) = stack.pop() {
        let message = match frame {
            Frame::Tag(name) => format!("<{name}> is never closed"),
            Frame::Enclosure => "enclosure is never closed".to_string(),
        };
        return Err((open, message));
    }

    Ok(partner)
}

// =============================================================================
// Builder
// =============================================================================

/// Fluent construction of already-parsed sequences.
///
/// ```ignore
/// let seq = SequenceBuilder::new()
///     .open("p")
///     .open_bound("span", "name").attr("class", "big").raw("[name]").close("span")
///     .close("p")
///     .build("Home")?;
/// ```
#[derive(Debug, Default, Clone)]
pub struct SequenceBuilder {
    elements: Vec<MarkupElement>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, element: MarkupElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn raw(self, text: impl Into<String>) -> Self {
        self.push(MarkupElement::raw(text))
    }

    pub fn open(self, name: impl Into<String>) -> Self {
        self.push(MarkupElement::open(name))
    }

    pub fn open_bound(self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.push(MarkupElement::open_bound(name, id))
    }

    pub fn open_close(self, name: impl Into<String>) -> Self {
        self.push(MarkupElement::open_close(name))
    }

    pub fn open_close_bound(self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.push(MarkupElement::open_close_bound(name, id))
    }

    pub fn close(self, name: impl Into<String>) -> Self {
        self.push(MarkupElement::close(name))
    }

    /// Add an attribute to the most recent tag. Ignored after non-tags.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(MarkupElement::Open(tag) | MarkupElement::OpenClose(tag)) =
            self.elements.last_mut()
        {
            tag.attrs.push((key.into(), value.into()));
        }
        self
    }

    pub fn body_slot(self) -> Self {
        self.push(MarkupElement::marker(MarkerKind::BodySlot, None))
    }

    pub fn enclosure(self, controller: impl Into<String>) -> Self {
        self.push(MarkupElement::marker(
            MarkerKind::EnclosureStart,
            Some(controller.into()),
        ))
    }

    pub fn end_enclosure(self) -> Self {
        self.push(MarkupElement::marker(MarkerKind::EnclosureEnd, None))
    }

    pub fn tag(self, tag: TagData) -> Self {
        self.push(MarkupElement::Open(tag))
    }

    pub fn build(self, template: impl Into<String>) -> Result<Arc<ElementSequence>> {
        ElementSequence::new(template, self.elements).map(Arc::new)
    }
}
