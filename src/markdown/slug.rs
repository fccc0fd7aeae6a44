//! Heading slugs.
//!
//! [`Slugger`] produces GitHub-style anchors: lowercase, punctuation removed,
//! spaces turned into dashes, and repeats disambiguated with `-1`, `-2`, ….
//! One slugger is used per document so that the table of contents and the
//! heading ids agree.

use super::hast::HNode;
use std::collections::HashMap;

/// Stateful slug generator; every call reserves the slug it returns.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique slug for `text` within this slugger.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut result = base.clone();
        while self.occurrences.contains_key(&result) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            result = format!("{base}-{count}");
        }
        self.occurrences.insert(result.clone(), 0);
        result
    }
}

/// Stateless slug for `text`, without de-duplication.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// `assign-heading-slugs`: give every heading element without an `id` a unique one.
///
/// Headings that already carry an id keep it and do not reserve a slug.
pub fn assign_slugs(tree: &mut HNode) {
    let mut slugger = Slugger::new();
    let mut headings = Vec::new();
    collect_heading_texts(tree, &mut headings);
    let mut ids = headings.into_iter().map(|text| text.map(|t| slugger.slug(&t)));
    tree.walk_elements_mut(&mut |el| {
        if el.is_heading()
            && let Some(Some(id)) = ids.next()
        {
            el.set_prop("id", id);
        }
    });
}

/// Text of each heading lacking an id, in document order; `None` for headings
/// that already have one.
fn collect_heading_texts(tree: &HNode, out: &mut Vec<Option<String>>) {
    tree.walk_elements(&mut |el| {
        if el.is_heading() {
            out.push(match el.prop("id") {
                Some(_) => None,
                None => Some(el.text_content()),
            });
        }
    });
}
