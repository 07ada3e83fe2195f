//! Header contributions.
//!
//! One [`HeaderTokenSet`] exists per render pass. Nodes contribute through a
//! [`HeaderResponse`]; every contribution is keyed by a [`RenderToken`] and
//! emitted at most once per pass, in first-seen order.

use indexmap::IndexSet;

use crate::types::escape_markup;

use super::output::MarkupSink;

/// Deduplication key for a header contribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderToken {
    JavaScriptReference(String),
    CssReference(String),
    JavaScript(String),
    Css(String),
    Custom(String),
}

impl RenderToken {
    pub fn custom(key: impl Into<String>) -> Self {
        RenderToken::Custom(key.into())
    }
}

/// Insertion-ordered set of tokens already rendered in this pass.
#[derive(Debug, Default, Clone)]
pub struct HeaderTokenSet {
    tokens: IndexSet<RenderToken>,
}

impl HeaderTokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `emit` unless `token` was already rendered. Returns whether it ran.
    pub fn render(&mut self, token: RenderToken, emit: impl FnOnce()) -> bool {
        if self.tokens.contains(&token) {
            return false;
        }
        emit();
        self.tokens.insert(token);
        true
    }

    pub fn was_rendered(&self, token: &RenderToken) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in the order they were first rendered.
    pub fn iter(&self) -> impl Iterator<Item = &RenderToken> {
        self.tokens.iter()
    }
}

// =============================================================================
// HeaderResponse
// =============================================================================

/// What a node's `render_head` hook writes to.
pub struct HeaderResponse<'a> {
    tokens: &'a mut HeaderTokenSet,
    out: &'a mut dyn MarkupSink,
}

impl<'a> HeaderResponse<'a> {
    pub fn new(tokens: &'a mut HeaderTokenSet, out: &'a mut dyn MarkupSink) -> Self {
        Self { tokens, out }
    }

    /// Emit through `f` once per pass for `token`.
    pub fn render(&mut self, token: RenderToken, f: impl FnOnce(&mut dyn MarkupSink)) -> bool {
        let out = &mut *self.out;
        self.tokens.render(token, || f(out))
    }

    /// Write text directly, without deduplication.
    pub fn render_string(&mut self, text: &str) {
        self.out.emit(text);
    }

    pub fn render_javascript_reference(&mut self, url: &str) -> bool {
        self.render(RenderToken::JavaScriptReference(url.to_string()), |out| {
            out.emit(&format!(
                "<script type=\"text/javascript\" src=\"{}\"></script>\n",
                escape_markup(url)
            ));
        })
    }

    pub fn render_css_reference(&mut self, url: &str, media: Option<&str>) -> bool {
        self.render(RenderToken::CssReference(url.to_string()), |out| {
            let mut tag = format!(
                "<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\"",
                escape_markup(url)
            );
            if let Some(media) = media {
                tag.push_str(&format!(" media=\"{}\"", escape_markup(media)));
            }
            tag.push_str(" />\n");
            out.emit(&tag);
        })
    }

    /// Inline script. Keyed by `id` when given, otherwise by the script text.
    pub fn render_javascript(&mut self, script: &str, id: Option<&str>) -> bool {
        let key = id.unwrap_or(script).to_string();
        self.render(RenderToken::JavaScript(key), |out| {
            let open = match id {
                Some(id) => format!("<script type=\"text/javascript\" id=\"{}\">\n", escape_markup(id)),
                None => "<script type=\"text/javascript\">\n".to_string(),
            };
            out.emit(&open);
            out.emit(script);
            out.emit("\n</script>\n");
        })
    }

    /// Inline stylesheet. Keyed by `id` when given, otherwise by the CSS text.
    pub fn render_css(&mut self, css: &str, id: Option<&str>) -> bool {
        let key = id.unwrap_or(css).to_string();
        self.render(RenderToken::Css(key), |out| {
            let open = match id {
                Some(id) => format!("<style type=\"text/css\" id=\"{}\">\n", escape_markup(id)),
                None => "<style type=\"text/css\">\n".to_string(),
            };
            out.emit(&open);
            out.emit(css);
            out.emit("\n</style>\n");
        })
    }

    pub fn was_rendered(&self, token: &RenderToken) -> bool {
        self.tokens.was_rendered(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_renders_once() {
        let mut tokens = HeaderTokenSet::new();
        let mut calls = 0;
        for _ in 0..3 {
            tokens.render(RenderToken::custom("x"), || calls += 1);
        }
        assert_eq!(calls, 1);
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_first_seen_order() {
        let mut tokens = HeaderTokenSet::new();
        tokens.render(RenderToken::Css("b".into()), || {});
        tokens.render(RenderToken::Css("a".into()), || {});
        tokens.render(RenderToken::Css("b".into()), || {});
        let order: Vec<_> = tokens.iter().cloned().collect();
        assert_eq!(order, vec![RenderToken::Css("b".into()), RenderToken::Css("a".into())]);
    }

    #[test]
    fn test_response_helpers() {
        let mut tokens = HeaderTokenSet::new();
        let mut out = String::new();
        let mut response = HeaderResponse::new(&mut tokens, &mut out);

        assert!(response.render_javascript_reference("acme.js"));
        assert!(!response.render_javascript_reference("acme.js"));
        assert!(response.render_css_reference("site.css", Some("print")));
        assert!(response.render_css("p{}", Some("base")));
        assert!(!response.render_css("div{}", Some("base")), "same id is the same token");

        assert_eq!(
            out,
            "<script type=\"text/javascript\" src=\"acme.js\"></script>\n\
             <link rel=\"stylesheet\" type=\"text/css\" href=\"site.css\" media=\"print\" />\n\
             <style type=\"text/css\" id=\"base\">\np{}\n</style>\n"
        );
    }
}
