//! Core types for spark-markup.
//!
//! These types define the foundation that everything builds on.
//! Element sequences are made of [`MarkupElement`]s, components live in the
//! node arena behind [`NodeId`]s, and tag decorators work on a mutable
//! [`ComponentTag`] copy of an open tag.

use std::fmt;

use indexmap::IndexMap;

// =============================================================================
// Tags
// =============================================================================

/// Name, attributes and optional component identifier of a parsed tag.
///
/// The identifier is kept apart from the attributes: it binds the tag to a
/// component and is never written to the output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagData {
    pub name: String,
    /// Attribute values as they appear in the markup (entities unresolved).
    pub attrs: Vec<(String, String)>,
    pub id: Option<String>,
}

impl TagData {
    /// Create an unbound tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            id: None,
        }
    }

    /// Create a tag bound to a component identifier.
    pub fn bound(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            id: Some(id.into()),
        }
    }

    /// Append an attribute; `value` is markup text and is written as-is.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    /// Look up an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// =============================================================================
// Control Markers
// =============================================================================

/// Kind of a control marker. Markers steer rendering and are never emitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Where a panel/border renders the body captured from its call site.
    BodySlot,
    /// Opens an enclosure; the payload names the controlling component.
    EnclosureStart,
    /// Closes the innermost enclosure.
    EnclosureEnd,
    /// Anything else; only a registered resolver can claim it.
    Other(String),
}

impl MarkerKind {
    pub fn as_str(&self) -> &str {
        match self {
            MarkerKind::BodySlot => "body-slot",
            MarkerKind::EnclosureStart => "enclosure-start",
            MarkerKind::EnclosureEnd => "enclosure-end",
            MarkerKind::Other(name) => name,
        }
    }
}

// =============================================================================
// Markup Elements
// =============================================================================

/// One element of a parsed template.
///
/// Immutable once built into an [`ElementSequence`](crate::markup::ElementSequence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupElement {
    Open(TagData),
    Close { name: String },
    OpenClose(TagData),
    Raw(String),
    Marker {
        kind: MarkerKind,
        payload: Option<String>,
    },
}

impl MarkupElement {
    pub fn open(name: impl Into<String>) -> Self {
        MarkupElement::Open(TagData::new(name))
    }

    pub fn open_bound(name: impl Into<String>, id: impl Into<String>) -> Self {
        MarkupElement::Open(TagData::bound(name, id))
    }

    pub fn close(name: impl Into<String>) -> Self {
        MarkupElement::Close { name: name.into() }
    }

    pub fn open_close(name: impl Into<String>) -> Self {
        MarkupElement::OpenClose(TagData::new(name))
    }

    pub fn open_close_bound(name: impl Into<String>, id: impl Into<String>) -> Self {
        MarkupElement::OpenClose(TagData::bound(name, id))
    }

    pub fn raw(text: impl Into<String>) -> Self {
        MarkupElement::Raw(text.into())
    }

    pub fn marker(kind: MarkerKind, payload: Option<String>) -> Self {
        MarkupElement::Marker { kind, payload }
    }

    /// Tag data for `Open` and `OpenClose` elements.
    pub fn tag(&self) -> Option<&TagData> {
        match self {
            MarkupElement::Open(tag) | MarkupElement::OpenClose(tag) => Some(tag),
            _ => None,
        }
    }

    /// Component identifier, if this is a bound tag.
    pub fn id(&self) -> Option<&str> {
        self.tag().and_then(|tag| tag.id.as_deref())
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, MarkupElement::Open(_))
    }

    #[inline]
    pub fn is_open_close(&self) -> bool {
        matches!(self, MarkupElement::OpenClose(_))
    }

    /// Write the element as markup text. Markers produce nothing.
    pub fn write_markup(&self, out: &mut String) {
        match self {
            MarkupElement::Open(tag) => write_open_tag(out, &tag.name, pairs(&tag.attrs), false),
            MarkupElement::OpenClose(tag) => write_open_tag(out, &tag.name, pairs(&tag.attrs), true),
            MarkupElement::Close { name } => write_close_tag(out, name),
            MarkupElement::Raw(text) => out.push_str(text),
            MarkupElement::Marker { .. } => {}
        }
    }
}

impl fmt::Display for MarkupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupElement::Marker { kind, payload } => match payload {
                Some(payload) => write!(f, "[{}:{}]", kind.as_str(), payload),
                None => write!(f, "[{}]", kind.as_str()),
            },
            other => {
                let mut text = String::new();
                other.write_markup(&mut text);
                f.write_str(&text)
            }
        }
    }
}

fn pairs(attrs: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    attrs.iter().map(|(key, value)| (key.as_str(), value.as_str()))
}

/// Attribute values are markup text already and are written verbatim.
fn write_open_tag<'a, I>(out: &mut String, name: &str, attrs: I, open_close: bool)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    out.push('<');
    out.push_str(name);
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    if open_close {
        out.push_str("/>");
    } else {
        out.push('>');
    }
}

fn write_close_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

// =============================================================================
// Component Tag (mutable copy handed to tag decorators)
// =============================================================================

/// Mutable copy of a component's open tag.
///
/// Built fresh for every render from the immutable [`TagData`]; decorators
/// may rename the tag or change attributes without touching the template.
///
/// Attributes are held as markup text. Values copied from the template keep
/// their original form; values passed to [`put`](Self::put) and
/// [`append`](Self::append) are plain text and get escaped on the way in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTag {
    name: String,
    attrs: IndexMap<String, String>,
    open_close: bool,
}

impl ComponentTag {
    pub fn from_tag(tag: &TagData, open_close: bool) -> Self {
        Self {
            name: tag.name.clone(),
            attrs: tag.attrs.iter().cloned().collect(),
            open_close,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Attribute value as markup text.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Set or replace an attribute; insertion order is kept for new keys.
    pub fn put(&mut self, key: impl Into<String>, value: &str) {
        self.attrs.insert(key.into(), escape_markup(value));
    }

    /// Append to an attribute with a separator, creating it if absent.
    pub fn append(&mut self, key: &str, value: &str, separator: &str) {
        let value = escape_markup(value);
        match self.attrs.get_mut(key) {
            Some(existing) if !existing.is_empty() => {
                existing.push_str(&escape_markup(separator));
                existing.push_str(&value);
            }
            Some(existing) => existing.push_str(&value),
            None => {
                self.attrs.insert(key.to_string(), value);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.attrs.shift_remove(key)
    }

    pub fn is_open_close(&self) -> bool {
        self.open_close
    }

    /// Render as an open tag, or `<name/>` when the tag has no body.
    pub fn write_open(&self, out: &mut String) {
        let attrs = self.attrs.iter().map(|(key, value)| (key.as_str(), value.as_str()));
        write_open_tag(out, &self.name, attrs, self.open_close);
    }

    pub fn write_close(&self, out: &mut String) {
        write_close_tag(out, &self.name);
    }
}

// =============================================================================
// Node Identity
// =============================================================================

/// Index of a node in its [`NodeTree`](crate::engine::NodeTree) arena.
///
/// A plain index, never an owning pointer, so parent back-references cannot
/// form cycles. Indices are recycled after release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Node Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Per-node state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Application-controlled visibility.
        const VISIBLE = 1 << 0;
        /// Unmatched child tags resolve against the parent's namespace.
        const TRANSPARENT = 1 << 1;
        /// Injected by the auto-component resolver; released at pass end.
        const AUTO = 1 << 2;
        /// Per-iteration repeater item; released after its iteration.
        const TRANSIENT = 1 << 3;
        /// Set while the node's render call is on the stack.
        const RENDERING = 1 << 4;
    }
}

// =============================================================================
// Escaping
// =============================================================================

/// Escape text for inclusion in markup content or attribute values.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
