//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use spark_markup::{
    ElementSequence, EngineContext, HeaderResponse, MarkupSink, NodeHooks, RenderSettings,
    RenderToken, StaticMarkupSource, TemplateCache,
};

// =============================================================================
// Context
// =============================================================================

pub fn cache(sequences: Vec<Arc<ElementSequence>>) -> Arc<TemplateCache> {
    let mut source = StaticMarkupSource::new();
    for sequence in sequences {
        source.insert(sequence);
    }
    Arc::new(TemplateCache::new(source))
}

pub fn context(sequences: Vec<Arc<ElementSequence>>) -> EngineContext {
    EngineContext::new(RenderSettings::default(), cache(sequences))
}

// =============================================================================
// Recording sink
// =============================================================================

/// Keeps every emitted fragment separately.
#[derive(Debug, Default)]
pub struct Recorder {
    pub emits: Vec<String>,
}

impl Recorder {
    pub fn text(&self) -> String {
        self.emits.concat()
    }

    pub fn count(&self, fragment: &str) -> usize {
        self.emits.iter().filter(|emit| emit.as_str() == fragment).count()
    }
}

impl MarkupSink for Recorder {
    fn emit(&mut self, text: &str) {
        self.emits.push(text.to_string());
    }
}

// =============================================================================
// Hooks
// =============================================================================

/// Counts lifecycle calls; refuses to render when `render` is false.
#[derive(Clone, Default)]
pub struct Probe {
    pub render: bool,
    pub before: Rc<Cell<usize>>,
    pub after: Rc<Cell<usize>>,
    pub head: Rc<Cell<usize>>,
}

impl Probe {
    pub fn visible() -> Self {
        Self {
            render: true,
            ..Self::default()
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }
}

impl NodeHooks for Probe {
    fn before_render(&mut self) -> bool {
        self.before.set(self.before.get() + 1);
        self.render
    }

    fn after_render(&mut self) {
        self.after.set(self.after.get() + 1);
    }

    fn render_head(&self, _response: &mut HeaderResponse<'_>) {
        self.head.set(self.head.get() + 1);
    }
}

/// Contributes one script reference; counts how often it was actually written.
#[derive(Clone)]
pub struct Script {
    pub url: &'static str,
    pub written: Rc<Cell<usize>>,
}

impl Script {
    pub fn new(url: &'static str) -> Self {
        Self {
            url,
            written: Rc::new(Cell::new(0)),
        }
    }
}

impl NodeHooks for Script {
    fn render_head(&self, response: &mut HeaderResponse<'_>) {
        let written = self.written.clone();
        let url = self.url;
        response.render(RenderToken::JavaScriptReference(url.to_string()), |out| {
            written.set(written.get() + 1);
            out.emit(&format!("<script src=\"{url}\"></script>"));
        });
    }
}
