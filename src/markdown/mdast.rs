//! Markdown syntax tree.
//!
//! The source document model produced by `parse-markdown` and edited by
//! `generate-table-of-contents`. It covers CommonMark without extensions.

/// A Markdown node.
#[derive(Debug, Clone, PartialEq)]
pub enum MdNode {
    Root(Vec<MdNode>),
    Heading {
        depth: u8,
        /// 1-based source line of the heading.
        line: usize,
        children: Vec<MdNode>,
    },
    Paragraph(Vec<MdNode>),
    BlockQuote(Vec<MdNode>),
    List {
        ordered: bool,
        start: Option<u64>,
        children: Vec<MdNode>,
    },
    ListItem(Vec<MdNode>),
    Code {
        lang: Option<String>,
        value: String,
    },
    Html(String),
    ThematicBreak,
    Text(String),
    Emphasis(Vec<MdNode>),
    Strong(Vec<MdNode>),
    InlineCode(String),
    Break,
    Link {
        url: String,
        title: Option<String>,
        children: Vec<MdNode>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    /// Generated table of contents wrapping a `List`.
    Toc(Box<MdNode>),
}

impl MdNode {
    pub fn children(&self) -> &[MdNode] {
        match self {
            MdNode::Root(c)
            | MdNode::Paragraph(c)
            | MdNode::BlockQuote(c)
            | MdNode::ListItem(c)
            | MdNode::Emphasis(c)
            | MdNode::Strong(c) => c,
            MdNode::Heading { children, .. }
            | MdNode::List { children, .. }
            | MdNode::Link { children, .. } => children,
            MdNode::Toc(list) => std::slice::from_ref(list.as_ref()),
            _ => &[],
        }
    }

    /// Plain text content, as used for heading slugs and TOC labels.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            MdNode::Text(t) | MdNode::InlineCode(t) => out.push_str(t),
            MdNode::Image { .. } => {}
            MdNode::Break => out.push('\n'),
            _ => {
                for child in self.children() {
                    child.push_text(out);
                }
            }
        }
    }
}

/// A heading found while walking a tree, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingInfo {
    pub depth: u8,
    pub line: usize,
    pub text: String,
}

/// Every heading in the tree, in document order (including nested ones).
pub fn headings(root: &MdNode) -> Vec<HeadingInfo> {
    let mut out = Vec::new();
    collect_headings(root, &mut out);
    out
}

fn collect_headings(node: &MdNode, out: &mut Vec<HeadingInfo>) {
    if let MdNode::Heading { depth, line, .. } = node {
        out.push(HeadingInfo {
            depth: *depth,
            line: *line,
            text: node.text_content(),
        });
        return;
    }
    for child in node.children() {
        collect_headings(child, out);
    }
}
