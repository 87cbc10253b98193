//! Parse, transform and render pipeline.

use pulldown_cmark::Options;

use crate::ast::{Document, Kind};
use crate::html::{HtmlRenderer, NodeRenderer};
use crate::parse::parse_document;

/// Post-parse tree rewrite.
pub trait AstTransformer: Send + Sync {
    /// Mutate the document in place. Runs once, after parsing.
    fn transform(&self, doc: &mut Document);
}

/// Bundle of transformers and node renderers installed together.
pub trait Extension {
    fn extend(self, md: &mut Markdown);
}

/// Configured markdown pipeline.
///
/// # Example
///
/// ```
/// use enclave_renderer::Markdown;
///
/// let html = Markdown::new().convert("# Hello\n\n**Bold** text");
/// assert_eq!(html, "<h1>Hello</h1><p><strong>Bold</strong> text</p>");
/// ```
pub struct Markdown {
    gfm: bool,
    transformers: Vec<Box<dyn AstTransformer>>,
    renderer: HtmlRenderer,
}

impl Markdown {
    /// Create a pipeline with GFM enabled and no extensions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gfm: true,
            transformers: Vec::new(),
            renderer: HtmlRenderer::new(),
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    #[must_use]
    pub fn with_transformer<T: AstTransformer + 'static>(mut self, transformer: T) -> Self {
        self.add_transformer(transformer);
        self
    }

    #[must_use]
    pub fn with_node_renderer<R: NodeRenderer + 'static>(mut self, kind: Kind, renderer: R) -> Self {
        self.register_node_renderer(kind, renderer);
        self
    }

    #[must_use]
    pub fn with_extension<E: Extension>(mut self, extension: E) -> Self {
        extension.extend(&mut self);
        self
    }

    /// Append a transformer; transformers run in insertion order.
    pub fn add_transformer<T: AstTransformer + 'static>(&mut self, transformer: T) {
        self.transformers.push(Box::new(transformer));
    }

    pub fn register_node_renderer<R: NodeRenderer + 'static>(&mut self, kind: Kind, renderer: R) {
        self.renderer.register(kind, renderer);
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Parse markdown and run every transformer over the tree.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Document {
        let mut doc = parse_document(markdown, self.parser_options());
        for transformer in &self.transformers {
            transformer.transform(&mut doc);
        }
        doc
    }

    /// Render a parsed document to an HTML fragment.
    pub fn render(&self, doc: &mut Document) -> String {
        self.renderer.render(doc)
    }

    /// Parse, transform and render in one step.
    #[must_use]
    pub fn convert(&self, markdown: &str) -> String {
        let mut doc = self.parse(markdown);
        self.render(&mut doc)
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeId, NodeKind};
    use crate::html::WalkStatus;
    use pretty_assertions::assert_eq;

    struct Uppercase;

    impl AstTransformer for Uppercase {
        fn transform(&self, doc: &mut Document) {
            let ids: Vec<NodeId> = doc.descendants(doc.root()).collect();
            for id in ids {
                if let NodeKind::Text(text) = doc.kind_mut(id) {
                    *text = text.to_uppercase();
                }
            }
        }
    }

    struct Suffix(&'static str);

    impl AstTransformer for Suffix {
        fn transform(&self, doc: &mut Document) {
            let ids: Vec<NodeId> = doc.descendants(doc.root()).collect();
            for id in ids {
                if let NodeKind::Text(text) = doc.kind_mut(id) {
                    text.push_str(self.0);
                }
            }
        }
    }

    struct Bracketed;

    impl NodeRenderer for Bracketed {
        fn render(
            &self,
            out: &mut String,
            _doc: &mut Document,
            _node: NodeId,
            entering: bool,
        ) -> WalkStatus {
            out.push(if entering { '[' } else { ']' });
            WalkStatus::Continue
        }
    }

    struct Both;

    impl Extension for Both {
        fn extend(self, md: &mut Markdown) {
            md.add_transformer(Uppercase);
            md.register_node_renderer(Kind::Strong, Bracketed);
        }
    }

    #[test]
    fn test_convert_plain() {
        assert_eq!(Markdown::new().convert("Hello"), "<p>Hello</p>");
    }

    #[test]
    fn test_transformers_run_in_order() {
        let md = Markdown::new()
            .with_transformer(Uppercase)
            .with_transformer(Suffix("!"));
        assert_eq!(md.convert("hi"), "<p>HI!</p>");
    }

    #[test]
    fn test_node_renderer_registration() {
        let md = Markdown::new().with_node_renderer(Kind::Strong, Bracketed);
        assert_eq!(md.convert("a **b** c"), "<p>a [b] c</p>");
    }

    #[test]
    fn test_extension_installs_both_hooks() {
        let md = Markdown::new().with_extension(Both);
        assert_eq!(md.convert("a **b**"), "<p>A [B]</p>");
    }

    #[test]
    fn test_gfm_enabled_by_default() {
        let html = Markdown::new().convert("~~gone~~");
        assert!(html.contains("<s>gone</s>"));
    }

    #[test]
    fn test_gfm_disabled() {
        let html = Markdown::new().with_gfm(false).convert("~~gone~~");
        assert!(!html.contains("<s>"));
    }

    #[test]
    fn test_parser_options_without_gfm() {
        assert_eq!(
            Markdown::new().with_gfm(false).parser_options(),
            Options::empty()
        );
    }
}
