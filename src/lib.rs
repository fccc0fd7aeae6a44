//! # docpack
//!
//! A rule-driven asset bundler for documentation trees. Every file under the
//! source directory is matched against an ordered rule table and sent through
//! one of three pipelines:
//!
//! ```text
//! \.css$                        → inline-style-injection   (collect-text, inject-style)
//! \.(eot|ttf|woff(2)?|svg|…)$   → asset/resource           (emit-resource)
//! \.md$                         → document                 (five Markdown stages)
//! anything else                 → pass-through
//! ```
//!
//! The first matching rule wins. Files that match nothing are left alone and
//! never cause an error.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Layered TOML config: engine defaults, local overrides, user `docpack.toml` |
//! | [`rules`] | Transform rules, pipeline kinds, `resolve_pipeline` |
//! | [`style`] | Inline-style injection into an ordered style context |
//! | [`emit`] | Content-hashed resource emission under `static/` |
//! | [`markdown`] | The Markdown pipeline: parse, TOC, convert, slug, serialize |
//! | [`bundle`] | Build driver: walk, resolve, run pipelines in parallel, report |
//! | [`output`] | CLI output formatting for build reports and rule lookups |
//!
//! # Design Decisions
//!
//! ## Merge Policy
//!
//! Config layers are merged as TOML values: tables merge recursively, arrays
//! concatenate and scalars are overridden. Rule lists are arrays, so a user
//! `docpack.toml` appends rules after the stock ones rather than replacing
//! them. Since the first match wins, user rules only see paths the stock rules
//! do not claim. See [`config::merge_toml`].
//!
//! ## Two Trees for Markdown
//!
//! The table of contents is generated on the Markdown tree, where sections are
//! still visible, and slugs are assigned on the HTML tree just before
//! serialization. Both use the same slug sequence, so every TOC link resolves.
//!
//! ## Content-Addressed Assets
//!
//! Emitted resource names are derived from a SHA-256 of their bytes. A name
//! that already exists on disk holds the same content and is not rewritten,
//! which makes repeated builds cheap and parallel emission safe.

pub mod bundle;
pub mod config;
pub mod emit;
pub mod markdown;
pub mod output;
pub mod rules;
pub mod style;

#[cfg(test)]
pub(crate) mod test_helpers;
