//! Build a [`Document`] tree from `pulldown-cmark` events.

use pulldown_cmark::{
    Alignment, BlockQuoteKind, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};

use crate::ast::{Document, NodeId, NodeKind};

/// Parse markdown into a document tree using the given parser options.
#[must_use]
pub fn parse_document(markdown: &str, options: Options) -> Document {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, options) {
        builder.event(event);
    }
    builder.finish()
}

/// Convert heading level to its numeric value.
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn alert_class(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "note",
        BlockQuoteKind::Tip => "tip",
        BlockQuoteKind::Important => "important",
        BlockQuoteKind::Warning => "warning",
        BlockQuoteKind::Caution => "caution",
    }
}

/// Table parsing state.
#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell_index: usize,
}

struct TreeBuilder {
    doc: Document,
    stack: Vec<NodeId>,
    table: TableState,
    /// Nesting depth inside constructs that are dropped from the tree.
    skip_depth: usize,
}

impl TreeBuilder {
    fn new() -> Self {
        let doc = Document::new();
        let root = doc.root();
        Self {
            doc,
            stack: vec![root],
            table: TableState::default(),
            skip_depth: 0,
        }
    }

    fn finish(self) -> Document {
        self.doc
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn event(&mut self, event: Event<'_>) {
        if self.skip_depth > 0 {
            match event {
                Event::Start(_) => self.skip_depth += 1,
                Event::End(_) => self.skip_depth -= 1,
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.push_leaf(NodeKind::Code(code.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_leaf(NodeKind::Html(html.into_string()));
            }
            Event::SoftBreak => self.push_leaf(NodeKind::SoftBreak),
            Event::HardBreak => self.push_leaf(NodeKind::HardBreak),
            Event::Rule => self.push_leaf(NodeKind::Rule),
            Event::TaskListMarker(checked) => {
                self.push_leaf(NodeKind::TaskListMarker { checked });
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading {
                level: heading_level_to_num(level),
            },
            Tag::BlockQuote(kind) => NodeKind::BlockQuote {
                alert: kind.map(alert_class),
            },
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(ToOwned::to_owned),
                    CodeBlockKind::Indented => None,
                };
                NodeKind::CodeBlock { language }
            }
            Tag::List(start) => NodeKind::List { start },
            Tag::Item => NodeKind::Item,
            Tag::HtmlBlock => return,
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {
                self.skip_depth = 1;
                return;
            }
            Tag::DefinitionList => NodeKind::DefinitionList,
            Tag::DefinitionListTitle => NodeKind::DefinitionTitle,
            Tag::DefinitionListDefinition => NodeKind::DefinitionDetails,
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..TableState::default()
                };
                NodeKind::Table
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell_index = 0;
                NodeKind::TableHead
            }
            Tag::TableRow => {
                self.table.cell_index = 0;
                NodeKind::TableRow
            }
            Tag::TableCell => NodeKind::TableCell {
                header: self.table.in_head,
                align: self
                    .table
                    .alignments
                    .get(self.table.cell_index)
                    .copied()
                    .unwrap_or(Alignment::None),
            },
            Tag::Emphasis => NodeKind::Emphasis,
            Tag::Strong => NodeKind::Strong,
            Tag::Strikethrough => NodeKind::Strikethrough,
            Tag::Superscript => NodeKind::Superscript,
            Tag::Subscript => NodeKind::Subscript,
            Tag::Link {
                dest_url, title, ..
            } => NodeKind::Link {
                url: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => NodeKind::Image {
                url: dest_url.into_string(),
                title: title.into_string(),
            },
        };

        let id = self.doc.create_node(kind);
        let parent = self.current();
        self.doc.append_child(parent, id);
        self.stack.push(id);
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::HtmlBlock => return,
            TagEnd::TableHead => self.table.in_head = false,
            TagEnd::TableCell => self.table.cell_index += 1,
            _ => {}
        }
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Append text, merging with a directly preceding text node.
    fn push_text(&mut self, text: &str) {
        let parent = self.current();
        if let Some(last) = self.doc.last_child(parent)
            && let NodeKind::Text(existing) = self.doc.kind_mut(last)
        {
            existing.push_str(text);
            return;
        }
        self.push_leaf(NodeKind::Text(text.to_owned()));
    }

    fn push_leaf(&mut self, kind: NodeKind) {
        let id = self.doc.create_node(kind);
        let parent = self.current();
        self.doc.append_child(parent, id);
    }
}
