//! Document-Transformation: Markdown to an HTML fragment.
//!
//! Five stages, always in this order:
//!
//! | # | Stage | Tree |
//! |---|-------|------|
//! | 1 | `parse-markdown` | source → [`mdast`] |
//! | 2 | `generate-table-of-contents` | [`mdast`] → [`mdast`] |
//! | 3 | `convert-to-intermediate-tree` | [`mdast`] → [`hast`] |
//! | 4 | `assign-heading-slugs` | [`hast`] → [`hast`] |
//! | 5 | `serialize-to-markup` | [`hast`] → markup |
//!
//! The markup then goes through the fragment loader ([`DocumentFragment::load`]),
//! which records relative image references for the build to emit.

pub mod convert;
pub mod hast;
pub mod mdast;
pub mod parse;
pub mod serialize;
pub mod slug;
pub mod toc;

use crate::config::MarkdownConfig;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, instrument};

/// One step of the document pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    TableOfContents,
    Convert,
    Slug,
    Serialize,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Parse,
        Stage::TableOfContents,
        Stage::Convert,
        Stage::Slug,
        Stage::Serialize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Parse => "parse-markdown",
            Stage::TableOfContents => "generate-table-of-contents",
            Stage::Convert => "convert-to-intermediate-tree",
            Stage::Slug => "assign-heading-slugs",
            Stage::Serialize => "serialize-to-markup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error("source is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("unbalanced document tree near line {line}")]
    Unbalanced { line: usize },
    #[error("invalid markdown options: {0}")]
    Options(String),
}

#[derive(Error, Debug)]
#[error("{} failed at {stage}: {source}", path.display())]
pub struct PipelineError {
    pub path: PathBuf,
    pub stage: Stage,
    pub source: StageError,
}

/// Heading anchor and the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingAnchor {
    pub id: String,
    pub line: usize,
}

/// Output of the document pipeline for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFragment {
    pub source: String,
    pub html: String,
    /// Relative `img src` values, in order of first appearance.
    pub references: Vec<String>,
    pub headings: Vec<HeadingAnchor>,
}

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("static regex")
});

impl DocumentFragment {
    /// Fragment loader: take serialized markup and record the relative image
    /// references it contains.
    pub fn load(source: &str, html: String, headings: Vec<HeadingAnchor>) -> Self {
        let mut references: Vec<String> = Vec::new();
        for caps in IMG_SRC.captures_iter(&html) {
            let Some(raw) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            let reference = unescape(raw.as_str());
            if is_relative(&reference) && !references.contains(&reference) {
                references.push(reference);
            }
        }
        Self {
            source: source.to_string(),
            html,
            references,
            headings,
        }
    }

    /// Point every `src` attribute equal to `reference` at `public` instead.
    pub fn rewrite_reference(&mut self, reference: &str, public: &str) {
        let escaped = escape(public);
        for quote in ['"', '\''] {
            let from = format!("src={quote}{}{quote}", escape(reference));
            let to = format!("src={quote}{escaped}{quote}");
            self.html = self.html.replace(&from, &to);
            if escape(reference) != reference {
                let from = format!("src={quote}{reference}{quote}");
                self.html = self.html.replace(&from, &to);
            }
        }
    }

    /// JSON sidecar mapping heading ids to source lines.
    pub fn source_map(&self) -> serde_json::Value {
        serde_json::json!({
            "version": 1,
            "source": self.source,
            "headings": self.headings,
        })
    }
}

/// A reference the build should resolve: not absolute, not a scheme URL, not
/// protocol-relative, not an in-page anchor.
pub fn is_relative(reference: &str) -> bool {
    !(reference.is_empty()
        || reference.starts_with('/')
        || reference.starts_with('#')
        || reference.starts_with("data:")
        || reference.contains("://"))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// The Markdown pipeline, configured once and run per file.
#[derive(Debug, Clone, Default)]
pub struct DocumentPipeline {
    options: MarkdownConfig,
}

impl DocumentPipeline {
    pub fn new(options: MarkdownConfig) -> Self {
        Self { options }
    }

    pub fn run(&self, path: &Path, bytes: &[u8]) -> Result<DocumentFragment, PipelineError> {
        self.run_with(path, bytes, |_| {})
    }

    /// Run all stages, calling `on_stage` as each one starts.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn run_with(
        &self,
        path: &Path,
        bytes: &[u8],
        mut on_stage: impl FnMut(Stage),
    ) -> Result<DocumentFragment, PipelineError> {
        let fail = |stage: Stage| {
            let path = path.to_path_buf();
            move |source: StageError| PipelineError {
                path,
                stage,
                source,
            }
        };

        on_stage(Stage::Parse);
        debug!(stage = %Stage::Parse);
        let text = std::str::from_utf8(bytes)
            .map_err(StageError::from)
            .map_err(fail(Stage::Parse))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mdast = parse::parse(text).map_err(fail(Stage::Parse))?;

        on_stage(Stage::TableOfContents);
        debug!(stage = %Stage::TableOfContents);
        let mdast = toc::insert_toc(mdast, &self.options.toc).map_err(fail(Stage::TableOfContents))?;
        let lines: Vec<usize> = mdast::headings(&mdast).iter().map(|h| h.line).collect();

        on_stage(Stage::Convert);
        debug!(stage = %Stage::Convert);
        let mut hast = convert::to_hast(
            &mdast,
            convert::ConvertOptions {
                allow_dangerous_html: self.options.allow_dangerous_html,
            },
        );

        on_stage(Stage::Slug);
        debug!(stage = %Stage::Slug);
        slug::assign_slugs(&mut hast);
        // Generated TOC entries are links, not headings, so the two lists line up.
        let headings = hast
            .heading_ids()
            .into_iter()
            .zip(lines)
            .filter_map(|(id, line)| id.map(|id| HeadingAnchor { id, line }))
            .collect();

        on_stage(Stage::Serialize);
        debug!(stage = %Stage::Serialize);
        let html = serialize::to_html(&hast);

        let fragment = DocumentFragment::load(&path.to_string_lossy(), html, headings);
        debug!(
            bytes = fragment.html.len(),
            references = fragment.references.len(),
            "document transformed"
        );
        Ok(fragment)
    }
}
