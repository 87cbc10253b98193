//! HTML rendering of a [`Document`] tree.
//!
//! [`HtmlRenderer`] walks the tree depth-first. Each node is visited twice,
//! once entering and once exiting. A [`NodeRenderer`] registered for a node
//! [`Kind`] takes over both visits; every other kind uses the built-in
//! semantic HTML5 output. Raw HTML from the source is escaped unless a
//! renderer for [`Kind::Html`] lets some of it through.

use std::collections::HashMap;
use std::fmt::Write;

use pulldown_cmark::Alignment;

use crate::ast::{Document, Kind, NodeId, NodeKind};

/// What the walker does after an entering visit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    /// Render the node's children.
    Continue,
    /// Skip the node's children; the exiting visit still happens.
    SkipChildren,
}

/// Custom renderer for one node kind.
pub trait NodeRenderer: Send + Sync {
    /// Write HTML for `node`.
    ///
    /// Called with `entering = true` before the children and `false` after.
    /// The renderer may restructure the node's own children on entry.
    fn render(&self, out: &mut String, doc: &mut Document, node: NodeId, entering: bool)
    -> WalkStatus;
}

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Tree walker producing an HTML fragment.
#[derive(Default)]
pub struct HtmlRenderer {
    renderers: HashMap<Kind, Box<dyn NodeRenderer>>,
}

impl HtmlRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer for a node kind, replacing any previous one.
    pub fn register<R: NodeRenderer + 'static>(&mut self, kind: Kind, renderer: R) {
        self.renderers.insert(kind, Box::new(renderer));
    }

    /// Whether a custom renderer is registered for `kind`.
    #[must_use]
    pub fn has_renderer(&self, kind: Kind) -> bool {
        self.renderers.contains_key(&kind)
    }

    /// Render the whole document.
    ///
    /// The walk keeps a cursor instead of recursing, so nesting depth is
    /// bounded only by the tree.
    pub fn render(&self, doc: &mut Document) -> String {
        let mut out = String::new();
        let root = doc.root();
        let mut current = root;
        let mut entering = true;

        loop {
            if entering
                && self.visit(&mut out, doc, current, true) == WalkStatus::Continue
                && let Some(child) = doc.first_child(current)
            {
                current = child;
                continue;
            }

            self.visit(&mut out, doc, current, false);
            if current == root {
                break;
            }
            match doc.next_sibling(current) {
                Some(next) => {
                    current = next;
                    entering = true;
                }
                None => match doc.parent(current) {
                    Some(parent) => {
                        current = parent;
                        entering = false;
                    }
                    None => break,
                },
            }
        }
        out
    }

    fn visit(&self, out: &mut String, doc: &mut Document, id: NodeId, entering: bool) -> WalkStatus {
        match self.renderers.get(&doc.kind(id).kind()) {
            Some(renderer) => renderer.render(out, doc, id, entering),
            None if entering => enter(out, doc, id),
            None => {
                exit(out, doc, id);
                WalkStatus::Continue
            }
        }
    }
}

fn alert_title(class: &str) -> &'static str {
    match class {
        "tip" => "Tip",
        "important" => "Important",
        "warning" => "Warning",
        "caution" => "Caution",
        _ => "Note",
    }
}

fn alignment_style(align: Alignment) -> &'static str {
    match align {
        Alignment::Left => r#" style="text-align:left""#,
        Alignment::Center => r#" style="text-align:center""#,
        Alignment::Right => r#" style="text-align:right""#,
        Alignment::None => "",
    }
}

fn enter(out: &mut String, doc: &Document, id: NodeId) -> WalkStatus {
    match doc.kind(id) {
        NodeKind::Document => {}
        NodeKind::Paragraph => out.push_str("<p>"),
        NodeKind::Heading { level } => write!(out, "<h{level}>").unwrap(),
        NodeKind::BlockQuote { alert: None } => out.push_str("<blockquote>"),
        NodeKind::BlockQuote { alert: Some(class) } => write!(
            out,
            r#"<div class="alert alert-{class}"><div class="alert-title">{}</div><div class="alert-content">"#,
            alert_title(class)
        )
        .unwrap(),
        NodeKind::CodeBlock { language } => {
            let content = escape_html(&doc.text_content(id));
            match language {
                Some(lang) => write!(
                    out,
                    r#"<pre><code class="language-{}">{content}</code></pre>"#,
                    escape_html(lang)
                )
                .unwrap(),
                None => write!(out, "<pre><code>{content}</code></pre>").unwrap(),
            }
            return WalkStatus::SkipChildren;
        }
        NodeKind::List { start } => match start {
            Some(1) => out.push_str("<ol>"),
            Some(n) => write!(out, r#"<ol start="{n}">"#).unwrap(),
            None => out.push_str("<ul>"),
        },
        NodeKind::Item => out.push_str("<li>"),
        NodeKind::TaskListMarker { checked } => {
            if *checked {
                out.push_str(r#"<input type="checkbox" checked disabled>"#);
            } else {
                out.push_str(r#"<input type="checkbox" disabled>"#);
            }
        }
        NodeKind::Table => out.push_str("<table>"),
        NodeKind::TableHead => out.push_str("<thead><tr>"),
        NodeKind::TableRow => out.push_str("<tr>"),
        NodeKind::TableCell { header, align } => {
            let tag = if *header { "th" } else { "td" };
            write!(out, "<{tag}{}>", alignment_style(*align)).unwrap();
        }
        NodeKind::DefinitionList => out.push_str("<dl>"),
        NodeKind::DefinitionTitle => out.push_str("<dt>"),
        NodeKind::DefinitionDetails => out.push_str("<dd>"),
        NodeKind::Emphasis => out.push_str("<em>"),
        NodeKind::Strong => out.push_str("<strong>"),
        NodeKind::Strikethrough => out.push_str("<s>"),
        NodeKind::Superscript => out.push_str("<sup>"),
        NodeKind::Subscript => out.push_str("<sub>"),
        NodeKind::Link { url, title } => {
            write!(out, r#"<a href="{}""#, escape_html(url)).unwrap();
            if !title.is_empty() {
                write!(out, r#" title="{}""#, escape_html(title)).unwrap();
            }
            out.push('>');
        }
        NodeKind::Image { url, title } => {
            write_image(out, url, title, &doc.text_content(id));
            return WalkStatus::SkipChildren;
        }
        NodeKind::Enclave(enclave) => {
            write_image(out, enclave.url.as_str(), &enclave.title, &enclave.alt);
            return WalkStatus::SkipChildren;
        }
        NodeKind::Text(text) => out.push_str(&escape_html(text)),
        NodeKind::Code(code) => write!(out, "<code>{}</code>", escape_html(code)).unwrap(),
        NodeKind::Html(html) => out.push_str(&escape_html(html)),
        NodeKind::SoftBreak => out.push('\n'),
        NodeKind::HardBreak => out.push_str("<br>"),
        NodeKind::Rule => out.push_str("<hr>"),
    }
    WalkStatus::Continue
}

fn exit(out: &mut String, doc: &Document, id: NodeId) {
    match doc.kind(id) {
        NodeKind::Paragraph => out.push_str("</p>"),
        NodeKind::Heading { level } => write!(out, "</h{level}>").unwrap(),
        NodeKind::BlockQuote { alert: None } => out.push_str("</blockquote>"),
        NodeKind::BlockQuote { alert: Some(_) } => out.push_str("</div></div>"),
        NodeKind::List { start: Some(_) } => out.push_str("</ol>"),
        NodeKind::List { start: None } => out.push_str("</ul>"),
        NodeKind::Item => out.push_str("</li>"),
        NodeKind::Table => out.push_str("</tbody></table>"),
        NodeKind::TableHead => out.push_str("</tr></thead><tbody>"),
        NodeKind::TableRow => out.push_str("</tr>"),
        NodeKind::TableCell { header, .. } => {
            out.push_str(if *header { "</th>" } else { "</td>" });
        }
        NodeKind::DefinitionList => out.push_str("</dl>"),
        NodeKind::DefinitionTitle => out.push_str("</dt>"),
        NodeKind::DefinitionDetails => out.push_str("</dd>"),
        NodeKind::Emphasis => out.push_str("</em>"),
        NodeKind::Strong => out.push_str("</strong>"),
        NodeKind::Strikethrough => out.push_str("</s>"),
        NodeKind::Superscript => out.push_str("</sup>"),
        NodeKind::Subscript => out.push_str("</sub>"),
        NodeKind::Link { .. } => out.push_str("</a>"),
        _ => {}
    }
}

fn write_image(out: &mut String, src: &str, title: &str, alt: &str) {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape_html(title))
    };
    write!(
        out,
        r#"<img src="{}"{title_attr} alt="{}">"#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
}
