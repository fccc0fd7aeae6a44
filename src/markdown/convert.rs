//! `convert-to-intermediate-tree`: Markdown tree to HTML tree.
//!
//! Block-level siblings are separated by `"\n"` text nodes so the serialized
//! markup has one block per line. Raw HTML from the source is dropped unless
//! `allow_dangerous_html` is set.

use super::hast::{Element, HNode};
use super::mdast::MdNode;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub allow_dangerous_html: bool,
}

/// Convert a whole document.
pub fn to_hast(root: &MdNode, options: ConvertOptions) -> HNode {
    match root {
        MdNode::Root(children) => HNode::Root(blocks(children, options)),
        other => HNode::Root(convert(other, options)),
    }
}

/// Convert block children, one per line.
fn blocks(children: &[MdNode], options: ConvertOptions) -> Vec<HNode> {
    let mut out = Vec::new();
    for child in children {
        let converted = convert(child, options);
        if converted.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(newline());
        }
        out.extend(converted);
    }
    out
}

/// Convert inline children.
fn inlines(children: &[MdNode], options: ConvertOptions) -> Vec<HNode> {
    children.iter().flat_map(|c| convert(c, options)).collect()
}

/// Wrap block content in leading/trailing newlines (`<ul>\n<li>…</li>\n</ul>`).
fn padded(mut inner: Vec<HNode>) -> Vec<HNode> {
    if inner.is_empty() {
        return inner;
    }
    inner.insert(0, newline());
    inner.push(newline());
    inner
}

fn newline() -> HNode {
    HNode::Text("\n".to_string())
}

fn is_block(node: &MdNode) -> bool {
    matches!(
        node,
        MdNode::Paragraph(_)
            | MdNode::Heading { .. }
            | MdNode::BlockQuote(_)
            | MdNode::List { .. }
            | MdNode::Code { .. }
            | MdNode::ThematicBreak
            | MdNode::Toc(_)
    )
}

fn convert(node: &MdNode, options: ConvertOptions) -> Vec<HNode> {
    let el = match node {
        MdNode::Root(children) => return blocks(children, options),
        MdNode::Text(t) => return vec![HNode::Text(t.clone())],
        MdNode::Html(raw) => {
            return if options.allow_dangerous_html {
                vec![HNode::Raw(raw.clone())]
            } else {
                Vec::new()
            };
        }
        MdNode::Break => return vec![Element::new("br").into(), newline()],
        MdNode::Heading {
            depth, children, ..
        } => Element::new(heading_tag(*depth)).with_children(inlines(children, options)),
        MdNode::Paragraph(children) => {
            Element::new("p").with_children(inlines(children, options))
        }
        MdNode::BlockQuote(children) => {
            Element::new("blockquote").with_children(padded(blocks(children, options)))
        }
        MdNode::List {
            ordered,
            start,
            children,
        } => {
            let mut list = Element::new(if *ordered { "ol" } else { "ul" })
                .with_children(padded(blocks(children, options)));
            if let Some(n) = start
                && *n != 1
            {
                list.set_prop("start", n.to_string());
            }
            list
        }
        MdNode::ListItem(children) => {
            // Tight items carry inline content directly; loose ones hold blocks.
            let content = if children.iter().any(is_block) {
                let mut out = Vec::new();
                let mut run = Vec::new();
                for child in children {
                    if is_block(child) {
                        if !run.is_empty() {
                            out.push(newline());
                            out.extend(inlines(&std::mem::take(&mut run), options));
                        }
                        out.push(newline());
                        out.extend(convert(child, options));
                    } else {
                        run.push(child.clone());
                    }
                }
                if !run.is_empty() {
                    out.push(newline());
                    out.extend(inlines(&run, options));
                }
                out.push(newline());
                out
            } else {
                inlines(children, options)
            };
            Element::new("li").with_children(content)
        }
        MdNode::Code { lang, value } => {
            let mut code = Element::new("code").with_children(vec![HNode::Text(value.clone())]);
            if let Some(lang) = lang {
                code.set_prop("class", format!("language-{lang}"));
            }
            Element::new("pre").with_children(vec![code.into()])
        }
        MdNode::ThematicBreak => Element::new("hr"),
        MdNode::Emphasis(children) => Element::new("em").with_children(inlines(children, options)),
        MdNode::Strong(children) => {
            Element::new("strong").with_children(inlines(children, options))
        }
        MdNode::InlineCode(code) => {
            Element::new("code").with_children(vec![HNode::Text(code.clone())])
        }
        MdNode::Link {
            url,
            title,
            children,
        } => {
            let mut a = Element::new("a")
                .with_prop("href", url.clone())
                .with_children(inlines(children, options));
            if let Some(title) = title {
                a.set_prop("title", title.clone());
            }
            a
        }
        MdNode::Image { url, title, alt } => {
            let mut img = Element::new("img")
                .with_prop("src", url.clone())
                .with_prop("alt", alt.clone());
            if let Some(title) = title {
                img.set_prop("title", title.clone());
            }
            img
        }
        MdNode::Toc(list) => Element::new("nav")
            .with_prop("class", "toc")
            .with_children(padded(convert(list, options))),
    };
    vec![el.into()]
}

fn heading_tag(depth: u8) -> &'static str {
    match depth {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}
