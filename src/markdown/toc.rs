//! `generate-table-of-contents`: insert or refresh a TOC in the Markdown tree.
//!
//! Runs before conversion so it can see section structure in the source model.
//!
//! - If a top-level heading's text matches the configured TOC heading pattern
//!   (whole text, case-insensitive), everything between it and the next heading
//!   of the same or higher rank is replaced by the generated block. That block
//!   lists the headings that come after the TOC heading.
//! - Otherwise, when `insert_when_missing` is set, the block goes at the very top
//!   and lists every heading.
//!
//! Link targets are slugged with the same [`Slugger`] sequence that
//! `assign-heading-slugs` applies later, over the headings left once the old
//! section is gone, so every `#anchor` resolves.

use super::StageError;
use super::mdast::{self, MdNode};
use super::slug::Slugger;
use crate::config::TocConfig;
use regex::RegexBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    depth: u8,
    text: String,
    slug: String,
}

/// Insert or refresh the table of contents in `root`.
pub fn insert_toc(root: MdNode, options: &TocConfig) -> Result<MdNode, StageError> {
    let MdNode::Root(mut children) = root else {
        return Ok(root);
    };
    let heading_re = RegexBuilder::new(&format!("^(?:{})$", options.heading))
        .case_insensitive(true)
        .build()
        .map_err(|e| StageError::Options(e.to_string()))?;

    let toc_heading = children.iter().enumerate().find_map(|(idx, node)| match node {
        MdNode::Heading { depth, .. } if heading_re.is_match(node.text_content().trim()) => {
            Some((idx, *depth))
        }
        _ => None,
    });

    // Insertion index, and how many headings precede the listed ones.
    let (at, skip) = match toc_heading {
        Some((idx, depth)) => {
            let end = children[idx + 1..]
                .iter()
                .position(|n| matches!(n, MdNode::Heading { depth: d, .. } if *d <= depth))
                .map(|p| idx + 1 + p)
                .unwrap_or(children.len());
            // Headings inside the replaced section disappear with it.
            children.drain(idx + 1..end);
            let through_toc = children[..=idx]
                .iter()
                .map(|n| mdast::headings(n).len())
                .sum::<usize>();
            (idx + 1, through_toc)
        }
        None if options.insert_when_missing => (0, 0),
        None => return Ok(MdNode::Root(children)),
    };

    // Slug the tree as it will reach `assign-heading-slugs`.
    let mut slugger = Slugger::new();
    let all: Vec<Entry> = children
        .iter()
        .flat_map(mdast::headings)
        .map(|h| Entry {
            depth: h.depth,
            slug: slugger.slug(&h.text),
            text: h.text,
        })
        .collect();
    let listed: Vec<Entry> = all
        .into_iter()
        .skip(skip)
        .filter(|e| e.depth <= options.max_depth)
        .collect();
    if !listed.is_empty() {
        children.insert(at, MdNode::Toc(Box::new(build_list(&listed, options))));
    }
    Ok(MdNode::Root(children))
}

/// Nest entries by depth: deeper entries following an entry become its sub-list.
fn build_list(entries: &[Entry], options: &TocConfig) -> MdNode {
    let mut items = Vec::new();
    let mut i = 0;
    while i < entries.len() {
        let entry = &entries[i];
        let mut j = i + 1;
        while j < entries.len() && entries[j].depth > entry.depth {
            j += 1;
        }
        let link = MdNode::Link {
            url: format!("#{}", entry.slug),
            title: None,
            children: vec![MdNode::Text(entry.text.clone())],
        };
        let mut item = vec![if options.tight {
            link
        } else {
            MdNode::Paragraph(vec![link])
        }];
        if j > i + 1 {
            item.push(build_list(&entries[i + 1..j], options));
        }
        items.push(MdNode::ListItem(item));
        i = j;
    }
    MdNode::List {
        ordered: options.ordered,
        start: None,
        children: items,
    }
}
