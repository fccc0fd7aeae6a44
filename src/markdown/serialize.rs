//! `serialize-to-markup`: HTML tree to an HTML string.
//!
//! [`HNode`] implements maud's [`Render`], so a tree can be dropped straight
//! into an `html!` template or turned into a string with [`to_html`]. Text and
//! attribute values go through maud's escaping; [`HNode::Raw`] is written as is.

use super::hast::{Element, HNode};
use maud::Render;

impl Render for HNode {
    fn render_to(&self, buffer: &mut String) {
        match self {
            HNode::Root(children) => {
                for child in children {
                    child.render_to(buffer);
                }
            }
            HNode::Element(el) => el.render_to(buffer),
            HNode::Text(text) => text.as_str().render_to(buffer),
            HNode::Raw(raw) => buffer.push_str(raw),
        }
    }
}

impl Render for Element {
    fn render_to(&self, buffer: &mut String) {
        buffer.push('<');
        buffer.push_str(self.tag);
        for (name, value) in &self.props {
            buffer.push(' ');
            buffer.push_str(name);
            buffer.push_str("=\"");
            value.as_str().render_to(buffer);
            buffer.push('"');
        }
        buffer.push('>');
        if self.is_void() {
            return;
        }
        for child in &self.children {
            child.render_to(buffer);
        }
        buffer.push_str("</");
        buffer.push_str(self.tag);
        buffer.push('>');
    }
}

/// Serialize a tree to markup.
pub fn to_html(tree: &HNode) -> String {
    let mut out = String::new();
    tree.render_to(&mut out);
    out
}
