//! Keyboard key markup.
//!
//! Raw HTML is escaped by default. [`KbdExtension`] lets the bare `<kbd>` and
//! `</kbd>` tags through so documents can write `<kbd>Ctrl</kbd> + <kbd>C</kbd>`.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Document, Kind, NodeId, NodeKind};
use crate::html::{NodeRenderer, WalkStatus, escape_html};
use crate::markdown::{Extension, Markdown};

static KBD_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?kbd>").unwrap());

/// Escape `html`, keeping `<kbd>` and `</kbd>` tags as markup.
fn escape_except_kbd(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for tag in KBD_TAG.find_iter(html) {
        out.push_str(&escape_html(&html[last..tag.start()]));
        out.push_str(&tag.as_str().to_ascii_lowercase());
        last = tag.end();
    }
    out.push_str(&escape_html(&html[last..]));
    out
}

/// Renders raw HTML nodes with only `<kbd>` tags left intact.
pub struct KbdRenderer;

impl NodeRenderer for KbdRenderer {
    fn render(
        &self,
        out: &mut String,
        doc: &mut Document,
        node: NodeId,
        entering: bool,
    ) -> WalkStatus {
        if entering && let NodeKind::Html(html) = doc.kind(node) {
            out.push_str(&escape_except_kbd(html));
        }
        WalkStatus::SkipChildren
    }
}

/// Installs [`KbdRenderer`] for raw HTML nodes.
pub struct KbdExtension;

impl Extension for KbdExtension {
    fn extend(self, md: &mut Markdown) {
        md.register_node_renderer(Kind::Html, KbdRenderer);
    }
}
