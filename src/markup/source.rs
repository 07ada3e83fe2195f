//! Markup Source - Where element sequences come from.
//!
//! Parsing is upstream; the engine only asks a [`MarkupSource`] for the
//! sequence of a template id. [`TemplateCache`] sits in front of the source,
//! keeps the `Arc`s it hands out stable, and validates boundary tags once per
//! template instead of once per render.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{EngineError, Result};

use super::sequence::ElementSequence;

/// Supplies parsed markup for a template id.
///
/// Must return the same (or a structurally identical) sequence for repeated
/// calls with the same id.
pub trait MarkupSource: Send + Sync {
    fn markup_for(&self, template: &str) -> Result<Arc<ElementSequence>>;
}

/// In-memory source, filled by the application or by tests.
#[derive(Debug, Default)]
pub struct StaticMarkupSource {
    templates: HashMap<String, Arc<ElementSequence>>,
}

impl StaticMarkupSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sequence under its own template name.
    pub fn insert(&mut self, sequence: Arc<ElementSequence>) {
        self.templates
            .insert(sequence.template().to_string(), sequence);
    }

    pub fn with(mut self, sequence: Arc<ElementSequence>) -> Self {
        self.insert(sequence);
        self
    }
}

impl MarkupSource for StaticMarkupSource {
    fn markup_for(&self, template: &str) -> Result<Arc<ElementSequence>> {
        self.templates
            .get(template)
            .cloned()
            .ok_or_else(|| EngineError::TemplateNotFound {
                template: template.to_string(),
            })
    }
}

// =============================================================================
// Template Cache
// =============================================================================

/// Shared, thread-safe cache in front of a [`MarkupSource`].
///
/// One instance is typically shared (`Arc`) by every render pass of the
/// application. Only immutable sequences and validated boundary indices are
/// stored; no per-pass state lives here.
pub struct TemplateCache {
    source: Box<dyn MarkupSource>,
    sequences: RwLock<HashMap<String, Arc<ElementSequence>>>,
    boundaries: RwLock<HashMap<(String, String), usize>>,
}

impl TemplateCache {
    pub fn new(source: impl MarkupSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            sequences: RwLock::new(HashMap::new()),
            boundaries: RwLock::new(HashMap::new()),
        }
    }

    /// Sequence for a template, fetched from the source on first use.
    pub fn markup(&self, template: &str) -> Result<Arc<ElementSequence>> {
        if let Some(sequence) = self.sequences.read().get(template) {
            return Ok(Arc::clone(sequence));
        }

        let sequence = self.source.markup_for(template)?;
        log::debug!(
            "loaded markup for '{}' ({} elements)",
            template,
            sequence.len()
        );
        let mut sequences = self.sequences.write();
        let cached = sequences
            .entry(template.to_string())
            .or_insert(sequence);
        Ok(Arc::clone(cached))
    }

    /// Index of the single `boundary` tag in `sequence`.
    ///
    /// Zero or several matches are fatal. The result is remembered per
    /// (template, boundary) pair, so validation runs once per template.
    pub fn boundary(&self, sequence: &ElementSequence, boundary: &str) -> Result<usize> {
        let key = (sequence.template().to_string(), boundary.to_string());
        if let Some(&index) = self.boundaries.read().get(&key) {
            return Ok(index);
        }

        let found = sequence.find_tags(boundary);
        let index = match found.as_slice() {
            [index] => *index,
            [] => {
                return Err(EngineError::MissingBoundaryTag {
                    template: key.0,
                    boundary: key.1,
                });
            }
            many => {
                return Err(EngineError::AmbiguousBoundaryTag {
                    template: key.0,
                    boundary: key.1,
                    count: many.len(),
                });
            }
        };

        self.boundaries.write().insert(key, index);
        Ok(index)
    }

    /// Drop every cached sequence and boundary (markup reload).
    pub fn clear(&self) {
        self.sequences.write().clear();
        self.boundaries.write().clear();
    }
}

impl std::fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateCache")
            .field("sequences", &self.sequences.read().len())
            .field("boundaries", &self.boundaries.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::SequenceBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        inner: StaticMarkupSource,
        calls: Arc<AtomicUsize>,
    }

    impl MarkupSource for CountingSource {
        fn markup_for(&self, template: &str) -> Result<Arc<ElementSequence>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.markup_for(template)
        }
    }

    fn panel(template: &str, boundaries: usize) -> Arc<ElementSequence> {
        let mut builder = SequenceBuilder::new().raw("lead");
        for _ in 0..boundaries {
            builder = builder.open("spark:panel").raw("x").close("spark:panel");
        }
        builder.build(template).unwrap()
    }

    #[test]
    fn test_markup_is_fetched_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = TemplateCache::new(CountingSource {
            inner: StaticMarkupSource::new().with(panel("P", 1)),
            calls: calls.clone(),
        });

        let first = cache.markup("P").unwrap();
        let second = cache.markup("P").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_template() {
        let cache = TemplateCache::new(StaticMarkupSource::new());
        assert!(matches!(
            cache.markup("Nope"),
            Err(EngineError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn test_boundary_validation() {
        let cache = TemplateCache::new(StaticMarkupSource::new());

        assert_eq!(cache.boundary(&panel("One", 1), "spark:panel").unwrap(), 1);
        assert!(matches!(
            cache.boundary(&panel("None", 0), "spark:panel"),
            Err(EngineError::MissingBoundaryTag { .. })
        ));
        assert!(matches!(
            cache.boundary(&panel("Two", 2), "spark:panel"),
            Err(EngineError::AmbiguousBoundaryTag { count: 2, .. })
        ));
    }
}
