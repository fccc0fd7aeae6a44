//! `parse-markdown`: source text to [`MdNode`] tree.
//!
//! Built on pulldown-cmark's event stream. Start events push a frame onto a
//! stack, end events pop it and attach the finished node to its parent, the
//! same shape as any SAX-to-DOM builder. Only CommonMark is enabled.

use super::StageError;
use super::mdast::MdNode;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

/// An open container waiting for its end event.
enum Frame {
    Paragraph,
    Heading { depth: u8, line: usize },
    BlockQuote,
    CodeBlock { lang: Option<String> },
    HtmlBlock,
    List { ordered: bool, start: Option<u64> },
    Item,
    Emphasis,
    Strong,
    Link { url: String, title: Option<String> },
    Image { url: String, title: Option<String> },
    /// Extension containers we do not model; their children are spliced into
    /// the parent.
    Transparent,
}

struct TreeBuilder<'s> {
    stack: Vec<(Frame, Vec<MdNode>)>,
    root: Vec<MdNode>,
    line_starts: Vec<usize>,
    source: &'s str,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            stack: Vec::new(),
            root: Vec::new(),
            line_starts,
            source,
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    fn push_node(&mut self, node: MdNode) {
        match self.stack.last_mut() {
            Some((_, children)) => children.push(node),
            None => self.root.push(node),
        }
    }

    fn start(&mut self, tag: Tag<'_>, offset: usize) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { level, .. } => Frame::Heading {
                depth: heading_depth(level),
                line: self.line_of(offset),
            },
            Tag::BlockQuote(_) => Frame::BlockQuote,
            Tag::CodeBlock(kind) => Frame::CodeBlock {
                lang: match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                },
            },
            Tag::HtmlBlock => Frame::HtmlBlock,
            Tag::List(start) => Frame::List {
                ordered: start.is_some(),
                start,
            },
            Tag::Item => Frame::Item,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                url: dest_url.to_string(),
                title: non_empty(&title),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                url: dest_url.to_string(),
                title: non_empty(&title),
            },
            _ => Frame::Transparent,
        };
        self.stack.push((frame, Vec::new()));
    }

    fn end(&mut self, offset: usize) -> Result<(), StageError> {
        let (frame, children) = self.stack.pop().ok_or(StageError::Unbalanced {
            line: self.line_of(offset),
        })?;
        let node = match frame {
            Frame::Paragraph => MdNode::Paragraph(children),
            Frame::Heading { depth, line } => MdNode::Heading {
                depth,
                line,
                children,
            },
            Frame::BlockQuote => MdNode::BlockQuote(children),
            Frame::CodeBlock { lang } => MdNode::Code {
                lang,
                value: concat_text(&children),
            },
            Frame::HtmlBlock => MdNode::Html(concat_text(&children)),
            Frame::List { ordered, start } => MdNode::List {
                ordered,
                start,
                children,
            },
            Frame::Item => MdNode::ListItem(children),
            Frame::Emphasis => MdNode::Emphasis(children),
            Frame::Strong => MdNode::Strong(children),
            Frame::Link { url, title } => MdNode::Link {
                url,
                title,
                children,
            },
            Frame::Image { url, title } => MdNode::Image {
                url,
                title,
                alt: children.iter().map(MdNode::text_content).collect(),
            },
            Frame::Transparent => {
                for child in children {
                    self.push_node(child);
                }
                return Ok(());
            }
        };
        self.push_node(node);
        Ok(())
    }

    fn finish(self) -> Result<MdNode, StageError> {
        if !self.stack.is_empty() {
            return Err(StageError::Unbalanced {
                line: self.line_of(self.source.len()),
            });
        }
        Ok(MdNode::Root(self.root))
    }
}

/// Parse CommonMark source into a tree.
pub fn parse(source: &str) -> Result<MdNode, StageError> {
    let mut builder = TreeBuilder::new(source);
    for (event, range) in Parser::new_ext(source, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(tag) => builder.start(tag, range.start),
            Event::End(_) => builder.end(range.start)?,
            Event::Text(text) => builder.push_node(MdNode::Text(text.into_string())),
            Event::Code(code) => builder.push_node(MdNode::InlineCode(code.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => {
                builder.push_node(MdNode::Html(html.into_string()))
            }
            Event::SoftBreak => builder.push_node(MdNode::Text("\n".to_string())),
            Event::HardBreak => builder.push_node(MdNode::Break),
            Event::Rule => builder.push_node(MdNode::ThematicBreak),
            // Math, footnotes and task lists are extensions we never enable.
            _ => {}
        }
    }
    builder.finish()
}

/// Join the text of leaf children (code and HTML block bodies).
fn concat_text(children: &[MdNode]) -> String {
    children
        .iter()
        .map(|c| match c {
            MdNode::Text(t) | MdNode::Html(t) => t.as_str(),
            _ => "",
        })
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_children(node: MdNode) -> Vec<MdNode> {
        match node {
            MdNode::Root(children) => children,
            other => panic!("expected root, got {other:?}"),
        }
    }

    #[test]
    fn parses_headings_with_depth_and_line() {
        let children = root_children(parse("# Title\n\n## Section\n").unwrap());
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0],
            MdNode::Heading {
                depth: 1,
                line: 1,
                children: vec![MdNode::Text("Title".into())],
            }
        );
        assert!(matches!(
            children[1],
            MdNode::Heading {
                depth: 2,
                line: 3,
                ..
            }
        ));
    }

    #[test]
    fn parses_inline_formatting() {
        let children = root_children(parse("Some **bold** and *em* `code`").unwrap());
        let MdNode::Paragraph(inline) = &children[0] else {
            panic!("expected paragraph");
        };
        assert!(inline.contains(&MdNode::Strong(vec![MdNode::Text("bold".into())])));
        assert!(inline.contains(&MdNode::Emphasis(vec![MdNode::Text("em".into())])));
        assert!(inline.contains(&MdNode::InlineCode("code".into())));
    }

    #[test]
    fn parses_fenced_code_with_lang() {
        let children = root_children(parse("```rust extra\nfn main() {}\n```\n").unwrap());
        assert_eq!(
            children[0],
            MdNode::Code {
                lang: Some("rust".into()),
                value: "fn main() {}\n".into(),
            }
        );
    }

    #[test]
    fn parses_lists() {
        let children = root_children(parse("3. a\n4. b\n").unwrap());
        let MdNode::List {
            ordered,
            start,
            children: items,
        } = &children[0]
        else {
            panic!("expected list");
        };
        assert!(*ordered);
        assert_eq!(*start, Some(3));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn parses_links_and_images() {
        let children =
            root_children(parse("[site](https://x.io \"Home\") ![a *logo*](img/l.png)").unwrap());
        let MdNode::Paragraph(inline) = &children[0] else {
            panic!("expected paragraph");
        };
        assert!(inline.iter().any(|n| matches!(n,
            MdNode::Link { url, title: Some(t), .. } if url == "https://x.io" && t == "Home")));
        assert!(inline.iter().any(|n| matches!(n,
            MdNode::Image { url, alt, title: None } if url == "img/l.png" && alt == "a logo")));
    }

    #[test]
    fn parses_html_block() {
        let children = root_children(parse("<div>\nhi\n</div>\n").unwrap());
        assert!(matches!(&children[0], MdNode::Html(h) if h.contains("<div>")));
    }

    #[test]
    fn empty_source_is_empty_root() {
        assert_eq!(parse("").unwrap(), MdNode::Root(vec![]));
    }

    #[test]
    fn line_lookup_handles_exact_starts() {
        let builder = TreeBuilder::new("a\nb\nc");
        assert_eq!(builder.line_of(0), 1);
        assert_eq!(builder.line_of(2), 2);
        assert_eq!(builder.line_of(3), 2);
        assert_eq!(builder.line_of(4), 3);
    }
}
