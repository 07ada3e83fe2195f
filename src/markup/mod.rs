//! Markup - Parsed templates and the cursors that walk them.
//!
//! - [`ElementSequence`]: immutable, shared element list with a partner table
//! - [`MarkupCursor`]: pass-local read position
//! - [`MarkupSource`] / [`TemplateCache`]: where sequences come from

mod cursor;
mod sequence;
mod source;

pub use cursor::MarkupCursor;
pub use sequence::{ElementSequence, SequenceBuilder};
pub use source::{MarkupSource, StaticMarkupSource, TemplateCache};
