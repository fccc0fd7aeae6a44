//! HTML syntax tree.
//!
//! The target, markup-oriented model. Stages 3–5 of the document pipeline
//! work on this tree: it is produced from [`MdNode`](super::mdast::MdNode),
//! slugged in place, and serialized.

/// An HTML node.
#[derive(Debug, Clone, PartialEq)]
pub enum HNode {
    Root(Vec<HNode>),
    Element(Element),
    Text(String),
    /// Markup passed through verbatim (raw HTML from the source).
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub props: Vec<(String, String)>,
    pub children: Vec<HNode>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            props: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_prop(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<HNode>) -> Self {
        self.children = children;
        self
    }

    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_prop(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.props.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.props.push((name.to_string(), value)),
        }
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(HNode::text_content).collect()
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    }

    pub fn is_void(&self) -> bool {
        matches!(self.tag, "br" | "hr" | "img")
    }
}

impl From<Element> for HNode {
    fn from(el: Element) -> Self {
        HNode::Element(el)
    }
}

impl HNode {
    pub fn children(&self) -> &[HNode] {
        match self {
            HNode::Root(c) => c,
            HNode::Element(el) => &el.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<HNode>> {
        match self {
            HNode::Root(c) => Some(c),
            HNode::Element(el) => Some(&mut el.children),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants. Raw markup is skipped.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            HNode::Text(t) => out.push_str(t),
            HNode::Raw(_) => {}
            _ => {
                for child in self.children() {
                    child.push_text(out);
                }
            }
        }
    }

    /// Visit every element in document order.
    pub fn walk_elements<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        if let HNode::Element(el) = self {
            f(el);
        }
        for child in self.children() {
            child.walk_elements(f);
        }
    }

    /// Visit every element mutably in document order.
    pub fn walk_elements_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        if let HNode::Element(el) = self {
            f(el);
        }
        if let Some(children) = self.children_mut() {
            for child in children {
                child.walk_elements_mut(f);
            }
        }
    }

    /// Ids of heading elements, in document order (`None` for headings without one).
    pub fn heading_ids(&self) -> Vec<Option<String>> {
        let mut ids = Vec::new();
        self.walk_elements(&mut |el| {
            if el.is_heading() {
                ids.push(el.prop("id").map(str::to_string));
            }
        });
        ids
    }
}
