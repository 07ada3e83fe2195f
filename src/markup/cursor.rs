//! Markup Cursor - Mutable read position into one element sequence.
//!
//! A container and all of its direct rendering calls share one cursor; a
//! node with its own associated markup opens a fresh cursor over that
//! markup. Cursors are pass-local and never stored on a node.

use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::types::MarkupElement;

use super::sequence::ElementSequence;

#[derive(Debug, Clone)]
pub struct MarkupCursor {
    sequence: Arc<ElementSequence>,
    position: usize,
}

impl MarkupCursor {
    /// Cursor at the first element.
    pub fn new(sequence: Arc<ElementSequence>) -> Self {
        Self {
            sequence,
            position: 0,
        }
    }

    /// Cursor at an arbitrary position (`0..=len`).
    pub fn at(sequence: Arc<ElementSequence>, position: usize) -> Result<Self> {
        let mut cursor = Self::new(sequence);
        cursor.rewind_to(position)?;
        Ok(cursor)
    }

    pub fn sequence(&self) -> &Arc<ElementSequence> {
        &self.sequence
    }

    pub fn template(&self) -> &str {
        self.sequence.template()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.sequence.len()
    }

    /// Element at the current position, without advancing.
    #[inline]
    pub fn peek(&self) -> Option<&MarkupElement> {
        self.sequence.get(self.position)
    }

    /// Return the current element and move past it.
    pub fn advance(&mut self) -> Result<&MarkupElement> {
        let index = self.position;
        if index >= self.sequence.len() {
            return Err(self.out_of_bounds());
        }
        self.position += 1;
        self.sequence.get(index).ok_or_else(|| self.out_of_bounds())
    }

    #[inline]
    pub fn mark(&self) -> usize {
        self.position
    }

    /// Restore a saved position. Marks beyond the end are rejected.
    pub fn rewind_to(&mut self, mark: usize) -> Result<()> {
        if mark > self.sequence.len() {
            return Err(EngineError::InvalidMark {
                template: self.sequence.template().to_string(),
                mark,
                len: self.sequence.len(),
            });
        }
        self.position = mark;
        Ok(())
    }

    /// Move from an opener to its matching close and return that index.
    ///
    /// Nothing in between is rendered. On an element without a partner
    /// (`OpenClose`, raw text, a lone marker) the cursor stays put and the
    /// current index is returned.
    pub fn skip_to_matching_close(&mut self) -> Result<usize> {
        if self.is_at_end() {
            return Err(self.out_of_bounds());
        }
        if let Some(close) = self.sequence.matching_close(self.position) {
            self.position = close;
        }
        Ok(self.position)
    }

    /// Move past the whole span starting at the current element.
    pub fn skip_component(&mut self) -> Result<()> {
        self.skip_to_matching_close()?;
        self.advance()?;
        Ok(())
    }

    /// One past the end of the span starting at the current element.
    pub fn span_end(&self) -> Result<usize> {
        if self.is_at_end() {
            return Err(self.out_of_bounds());
        }
        Ok(self.sequence.span_end(self.position))
    }

    fn out_of_bounds(&self) -> EngineError {
        EngineError::OutOfBounds {
            template: self.sequence.template().to_string(),
            len: self.sequence.len(),
        }
    }
}
