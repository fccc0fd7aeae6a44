//! Transform rules and rule-set resolution.
//!
//! A [`RuleSet`] is an ordered list of [`TransformRule`]s built once from the
//! effective [`BuildConfig`](crate::config::BuildConfig). Each rule pairs a path
//! predicate with the pipeline that handles matching files:
//!
//! | Pattern | Pipeline | Stages |
//! |---------|----------|--------|
//! | `\.css$` | Inline-Style-Injection | `collect-text` → `inject-style` |
//! | `\.(eot\|ttf\|woff(2)?\|svg\|png\|glb\|jpeg\|jpg\|mp4\|jsn)$` | Opaque-Resource-Emission | `emit-resource` |
//! | `\.md$` | Document-Transformation | the five [`Stage`]s |
//!
//! Rules are tried in declaration order and the first match wins. A path that
//! matches nothing resolves to `None`, which means pass-through.
//!
//! Patterns are matched against the path with any `?query` or `#fragment`
//! suffix removed, so `font.woff2?v=3` is still a font.

use crate::config::BuildConfig;
use crate::markdown::Stage;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default filename template for emitted resources.
pub const DEFAULT_ASSET_FILENAME: &str = "static/[hash][ext][query]";

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("rule {index}: invalid pattern {pattern:?}: {source}")]
    Pattern {
        index: usize,
        pattern: String,
        source: regex::Error,
    },
}

/// Which pipeline a matched file goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineKind {
    /// Stylesheets: raw text injected into the style context.
    #[serde(rename = "style")]
    InlineStyle,
    /// Binary assets copied to a content-hashed name.
    #[serde(rename = "asset/resource")]
    Resource,
    /// Markdown converted to an HTML fragment.
    #[serde(rename = "document")]
    Document,
}

impl PipelineKind {
    /// Ordered stage names for this pipeline.
    pub fn stages(self) -> Vec<&'static str> {
        match self {
            PipelineKind::InlineStyle => vec!["collect-text", "inject-style"],
            PipelineKind::Resource => vec!["emit-resource"],
            PipelineKind::Document => Stage::ALL.iter().map(|s| s.name()).collect(),
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineKind::InlineStyle => "inline-style-injection",
            PipelineKind::Resource => "opaque-resource-emission",
            PipelineKind::Document => "document-transformation",
        };
        f.write_str(label)
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct TransformRule {
    pattern: Regex,
    kind: PipelineKind,
    filename: Option<String>,
}

impl TransformRule {
    pub fn new(pattern: Regex, kind: PipelineKind, filename: Option<String>) -> Self {
        Self {
            pattern,
            kind,
            filename,
        }
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn stages(&self) -> Vec<&'static str> {
        self.kind.stages()
    }

    /// Output filename template. Only resource rules have one; it falls back
    /// to [`DEFAULT_ASSET_FILENAME`] when the rule doesn't set it.
    pub fn filename_template(&self) -> Option<&str> {
        match self.kind {
            PipelineKind::Resource => {
                Some(self.filename.as_deref().unwrap_or(DEFAULT_ASSET_FILENAME))
            }
            _ => None,
        }
    }

    /// Match a request. A `?query` / `#fragment` suffix is ignored, but a
    /// path that matches as written (such as `c#-intro.md`) still matches.
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path) || self.pattern.is_match(strip_query(path))
    }

    /// Match a file name taken from disk, with no query splitting.
    pub fn matches_file(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Ordered, immutable rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<TransformRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<TransformRule>) -> Self {
        Self { rules }
    }

    /// Compile the `module.rules` table of a config, preserving order.
    pub fn from_config(config: &BuildConfig) -> Result<Self, RuleError> {
        let rules = config
            .module
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let pattern = Regex::new(&rule.test).map_err(|source| RuleError::Pattern {
                    index,
                    pattern: rule.test.clone(),
                    source,
                })?;
                Ok(TransformRule::new(pattern, rule.kind, rule.filename.clone()))
            })
            .collect::<Result<Vec<_>, RuleError>>()?;
        Ok(Self { rules })
    }

    /// First rule matching `path`, if any.
    pub fn resolve(&self, path: &str) -> Option<&TransformRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// First rule matching a walked file. `?` and `#` are ordinary characters.
    pub fn resolve_file(&self, path: &str) -> Option<&TransformRule> {
        self.rules.iter().find(|rule| rule.matches_file(path))
    }

    /// Pipeline for `path`; `None` means pass-through.
    pub fn resolve_pipeline(&self, path: &str) -> Option<PipelineKind> {
        self.resolve(path).map(TransformRule::kind)
    }

    pub fn rules(&self) -> &[TransformRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Drop a `?query` / `#fragment` suffix.
pub fn strip_query(path: &str) -> &str {
    path.find(['?', '#']).map(|i| &path[..i]).unwrap_or(path)
}

/// The `?query` / `#fragment` suffix of a path, including its leading marker.
pub fn query_suffix(path: &str) -> &str {
    path.find(['?', '#']).map(|i| &path[i..]).unwrap_or("")
}
