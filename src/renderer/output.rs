//! Output sinks.
//!
//! Rendering appends text fragments to a [`MarkupSink`]. The engine never
//! reads back what it wrote, so any append-only target works: a `String`,
//! an [`OutputBuffer`] that is flushed in one write, or a test recorder.

use std::io::{self, Write};

/// Append-only destination for rendered markup.
pub trait MarkupSink {
    fn emit(&mut self, text: &str);
}

impl MarkupSink for String {
    #[inline]
    fn emit(&mut self, text: &str) {
        self.push_str(text);
    }
}

impl<S: MarkupSink + ?Sized> MarkupSink for &mut S {
    #[inline]
    fn emit(&mut self, text: &str) {
        (**self).emit(text);
    }
}

// =============================================================================
// OutputBuffer
// =============================================================================

/// A buffer that accumulates a whole render pass for batch writing.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: String,
    fragments: usize,
}

impl OutputBuffer {
    /// Create a new output buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(16384) // 16KB default
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: String::with_capacity(capacity),
            fragments: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of non-empty fragments emitted since the last clear.
    #[inline]
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Clear the buffer without deallocating.
    pub fn clear(&mut self) {
        self.data.clear();
        self.fragments = 0;
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn into_string(self) -> String {
        self.data
    }

    /// Write the buffer to `out` in one call and clear it.
    pub fn flush_to(&mut self, out: &mut impl Write) -> io::Result<()> {
        if !self.data.is_empty() {
            out.write_all(self.data.as_bytes())?;
            out.flush()?;
        }
        self.clear();
        Ok(())
    }
}

impl MarkupSink for OutputBuffer {
    #[inline]
    fn emit(&mut self, text: &str) {
        if !text.is_empty() {
            self.data.push_str(text);
            self.fragments += 1;
        }
    }
}

// =============================================================================
// HeadSplice
// =============================================================================

/// Pass output with a late-filled header slot.
///
/// Text streams straight to the sink until the slot is marked (just before
/// the head's close tag). From then on it is held, header text collected
/// while the rest of the page renders goes to [`head`](Self::head), and
/// [`flush`](Self::flush) writes header text followed by the held markup.
pub(crate) struct HeadSplice<'a> {
    sink: &'a mut dyn MarkupSink,
    head: String,
    held: Option<String>,
}

impl<'a> HeadSplice<'a> {
    pub(crate) fn new(sink: &'a mut dyn MarkupSink) -> Self {
        Self {
            sink,
            head: String::new(),
            held: None,
        }
    }

    /// Start holding output. Only the first slot of a pass counts.
    pub(crate) fn mark_slot(&mut self) {
        if self.held.is_none() {
            self.held = Some(String::new());
        }
    }

    pub(crate) fn has_slot(&self) -> bool {
        self.held.is_some()
    }

    /// Where header contributions are written.
    pub(crate) fn head(&mut self) -> &mut String {
        &mut self.head
    }

    /// Splice header text into the slot and release held output.
    ///
    /// Without a slot, collected header text has nowhere to go and is dropped.
    pub(crate) fn flush(&mut self) {
        let head = std::mem::take(&mut self.head);
        if let Some(held) = self.held.take() {
            if !head.is_empty() {
                self.sink.emit(&head);
            }
            self.sink.emit(&held);
        } else if !head.is_empty() {
            log::debug!("no head tag rendered; {} bytes of header contributions dropped", head.len());
        }
    }
}

impl MarkupSink for HeadSplice<'_> {
    fn emit(&mut self, text: &str) {
        match &mut self.held {
            Some(held) => held.push_str(text),
            None => self.sink.emit(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_splice_fills_slot_late() {
        let mut out = String::new();
        let mut splice = HeadSplice::new(&mut out);
        splice.emit("<head>");
        splice.mark_slot();
        splice.emit("</head><body>");
        splice.head().emit("<script/>");
        splice.emit("</body>");
        splice.flush();
        assert_eq!(out, "<head><script/></head><body></body>");
    }

    #[test]
    fn test_head_splice_without_slot_streams() {
        let mut out = OutputBuffer::new();
        let mut splice = HeadSplice::new(&mut out);
        splice.emit("a");
        splice.head().emit("<script/>");
        splice.emit("b");
        splice.flush();
        assert_eq!(out.as_str(), "ab");
        assert_eq!(out.fragments(), 2);
    }

    #[test]
    fn test_string_sink() {
        let mut out = String::new();
        out.emit("<p>");
        out.emit("x");
        assert_eq!(out, "<p>x");
    }

    #[test]
    fn test_buffer_counts_fragments() {
        let mut buffer = OutputBuffer::new();
        buffer.emit("a");
        buffer.emit("");
        buffer.emit("b");
        assert_eq!(buffer.as_str(), "ab");
        assert_eq!(buffer.fragments(), 2);
    }

    #[test]
    fn test_flush_clears() {
        let mut buffer = OutputBuffer::new();
        buffer.emit("<html/>");
        let mut written = Vec::new();
        buffer.flush_to(&mut written).unwrap();
        assert_eq!(written, b"<html/>");
        assert!(buffer.is_empty());
        assert_eq!(buffer.fragments(), 0);
    }
}
