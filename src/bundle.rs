//! Build driver.
//!
//! Walks a source tree, resolves every file against the [`RuleSet`] and runs
//! the matching pipeline. Files are independent, so they are processed on a
//! rayon pool sized by `processing.max_processes`; results are sorted by path
//! afterwards so the report does not depend on scheduling.
//!
//! ## Outputs
//!
//! ```text
//! dist/
//! ├── guide/intro.html            # document fragment
//! ├── guide/intro.html.map        # heading map (devtool = true)
//! └── static/
//!     └── 9f86d081884c7d659a2f.png  # emitted resource
//! ```
//!
//! Stylesheets are not written; they end up in [`BuildReport::styles`].
//! Relative image references inside documents and relative `url(...)` values
//! inside stylesheets are resolved against the file's directory, emitted
//! through the same rules, and rewritten to `output.public_path` + the emitted
//! name. Every reference of a file must exist before any of them is emitted.

use crate::config::{self, BuildConfig, ConfigError};
use crate::emit::{AssetEmitter, EmitError, EmittedAsset};
use crate::markdown::{DocumentPipeline, PipelineError};
use crate::rules::{
    DEFAULT_ASSET_FILENAME, PipelineKind, RuleError, RuleSet, query_suffix, strip_query,
};
use crate::style::{self, InjectedStyle, StyleContext, StyleError};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("rule error: {0}")]
    Rules(#[from] RuleError),
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Document(#[from] PipelineError),
    #[error("{path} references {reference}, which does not exist")]
    UnresolvedReference { path: String, reference: String },
}

/// A written (or planned) document fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutput {
    pub source: String,
    /// Fragment path relative to the output directory.
    pub output: String,
    /// Heading map path, when `devtool` is on.
    pub map: Option<String>,
    pub size: u64,
    pub headings: usize,
    /// Image references that were emitted and rewritten.
    pub rewritten: Vec<String>,
}

/// Everything a build produced.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub styles: StyleContext,
    pub assets: Vec<EmittedAsset>,
    pub documents: Vec<DocumentOutput>,
    pub passed_through: Vec<String>,
    pub warnings: Vec<String>,
}

enum Outcome {
    Style(InjectedStyle, Vec<EmittedAsset>),
    Asset(EmittedAsset),
    Document(DocumentOutput, Vec<EmittedAsset>),
    PassThrough(String),
}

/// A reference whose file exists and has been read, but not yet emitted.
struct PendingAsset {
    reference: String,
    target: String,
    template: String,
    bytes: Vec<u8>,
}

/// Shared, read-only state for one build.
struct Build<'a> {
    /// Canonical source root.
    source: PathBuf,
    output: Option<&'a Path>,
    config: &'a BuildConfig,
    rules: RuleSet,
    emitter: AssetEmitter,
    documents: DocumentPipeline,
}

/// Build `source` into `output`.
#[instrument(skip_all, fields(source = %source.display(), output = %output.display()))]
pub fn bundle(
    source: &Path,
    output: &Path,
    config: &BuildConfig,
) -> Result<BuildReport, BundleError> {
    run(source, Some(output), config)
}

/// Run every pipeline in memory without writing anything.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn check(source: &Path, config: &BuildConfig) -> Result<BuildReport, BundleError> {
    run(source, None, config)
}

fn run(
    source: &Path,
    output: Option<&Path>,
    config: &BuildConfig,
) -> Result<BuildReport, BundleError> {
    let build = Build::new(source, output, config)?;
    // A missing output dir cannot be inside the tree yet.
    let skip = output.and_then(|out| out.canonicalize().ok());
    let files = walk(&build.source, skip.as_deref())?;
    let threads = config::effective_threads(&config.processing);
    info!(files = files.len(), rules = build.rules.len(), threads, "starting build");

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let outcomes = pool.install(|| {
        files
            .par_iter()
            .map(|rel| build.process(rel))
            .collect::<Result<Vec<_>, BundleError>>()
    })?;

    let report = build.into_report(outcomes);
    info!(
        styles = report.styles.len(),
        assets = report.assets.len(),
        documents = report.documents.len(),
        passed_through = report.passed_through.len(),
        "build finished"
    );
    Ok(report)
}

/// Relative, `/`-separated paths of every file under `source`, sorted.
/// The output directory and the user config file are skipped. Both paths
/// must be canonical for the output comparison to hold.
fn walk(source: &Path, output: Option<&Path>) -> Result<Vec<String>, BundleError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| output.is_none_or(|out| e.path() != out));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(source)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if rel == config::CONFIG_FILENAME {
            continue;
        }
        files.push(rel);
    }
    Ok(files)
}

fn read(path: &Path) -> Result<Vec<u8>, BundleError> {
    fs::read(path).map_err(|source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &[u8]) -> Result<(), BundleError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BundleError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl<'a> Build<'a> {
    fn new(
        source: &Path,
        output: Option<&'a Path>,
        config: &'a BuildConfig,
    ) -> Result<Self, BundleError> {
        config.validate()?;
        let source = source.canonicalize().map_err(|e| BundleError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            emitter: AssetEmitter::new(
                output.unwrap_or(source.as_path()),
                config.output.hash_length,
            ),
            source,
            output,
            config,
            rules: RuleSet::from_config(config)?,
            documents: DocumentPipeline::new(config.markdown.clone()),
        })
    }

    fn process(&self, rel: &str) -> Result<Outcome, BundleError> {
        let Some(rule) = self.rules.resolve_file(rel) else {
            debug!(path = rel, "pass-through");
            return Ok(Outcome::PassThrough(rel.to_string()));
        };
        debug!(path = rel, kind = %rule.kind(), "resolved");
        let bytes = read(&self.source.join(rel))?;
        match rule.kind() {
            PipelineKind::InlineStyle => self.style(rel, bytes),
            PipelineKind::Resource => {
                let template = rule
                    .filename_template()
                    .unwrap_or(DEFAULT_ASSET_FILENAME);
                Ok(Outcome::Asset(self.emit(template, rel, "", &bytes)?))
            }
            PipelineKind::Document => self.document(rel, &bytes),
        }
    }

    fn emit(
        &self,
        template: &str,
        path: &str,
        query: &str,
        bytes: &[u8],
    ) -> Result<EmittedAsset, BundleError> {
        match self.output {
            Some(_) => Ok(self.emitter.emit(template, path, query, bytes)?),
            None => Ok(self.emitter.plan(template, path, query, bytes)),
        }
    }

    /// Resolve the references of `rel` and read every file a resource rule
    /// matches. Fails on the first missing file, before anything is emitted.
    fn resolve_references(
        &self,
        rel: &str,
        references: &[String],
    ) -> Result<Vec<PendingAsset>, BundleError> {
        let mut pending = Vec::new();
        for reference in references {
            let target = resolve_reference(rel, reference);
            let Some(rule) = self
                .rules
                .resolve(strip_query(&target))
                .filter(|r| r.kind() == PipelineKind::Resource)
            else {
                debug!(path = rel, reference = %reference, "reference left as is");
                continue;
            };
            let file = self.source.join(strip_query(&target));
            if !file.is_file() {
                return Err(BundleError::UnresolvedReference {
                    path: rel.to_string(),
                    reference: reference.clone(),
                });
            }
            pending.push(PendingAsset {
                reference: reference.clone(),
                template: rule
                    .filename_template()
                    .unwrap_or(DEFAULT_ASSET_FILENAME)
                    .to_string(),
                bytes: read(&file)?,
                target,
            });
        }
        Ok(pending)
    }

    /// Emit resolved references. Yields `(reference, public url, asset)`.
    fn emit_references(
        &self,
        pending: Vec<PendingAsset>,
    ) -> Result<Vec<(String, String, EmittedAsset)>, BundleError> {
        let mut emitted = Vec::with_capacity(pending.len());
        for p in pending {
            let asset = self.emit(
                &p.template,
                strip_query(&p.target),
                query_suffix(&p.target),
                &p.bytes,
            )?;
            let public = format!("{}{}", self.config.output.public_path, asset.name);
            emitted.push((p.reference, public, asset));
        }
        Ok(emitted)
    }

    fn style(&self, rel: &str, bytes: Vec<u8>) -> Result<Outcome, BundleError> {
        let mut sheet = style::collect_text(rel, bytes)?;
        let pending = self.resolve_references(rel, &sheet.references())?;
        let mut assets = Vec::new();
        for (reference, public, asset) in self.emit_references(pending)? {
            sheet.rewrite_reference(&reference, &public);
            assets.push(asset);
        }
        Ok(Outcome::Style(sheet, assets))
    }

    fn document(&self, rel: &str, bytes: &[u8]) -> Result<Outcome, BundleError> {
        let mut fragment = self.documents.run(Path::new(rel), bytes)?;
        let pending = self.resolve_references(rel, &fragment.references)?;

        let mut assets = Vec::new();
        let mut rewritten = Vec::new();
        for (reference, public, asset) in self.emit_references(pending)? {
            fragment.rewrite_reference(&reference, &public);
            rewritten.push(reference);
            assets.push(asset);
        }

        let out_rel = fragment_path(rel);
        let map_rel = self.config.devtool.then(|| format!("{out_rel}.map"));
        if let Some(output) = self.output {
            write(&output.join(&out_rel), fragment.html.as_bytes())?;
            if let Some(map_rel) = &map_rel {
                let map = serde_json::to_vec_pretty(&fragment.source_map())
                    .map_err(|e| BundleError::Io {
                        path: output.join(map_rel),
                        source: e.into(),
                    })?;
                write(&output.join(map_rel), &map)?;
            }
        }
        let doc = DocumentOutput {
            source: rel.to_string(),
            output: out_rel,
            map: map_rel,
            size: fragment.html.len() as u64,
            headings: fragment.headings.len(),
            rewritten,
        };
        Ok(Outcome::Document(doc, assets))
    }

    fn into_report(self, outcomes: Vec<Outcome>) -> BuildReport {
        let mut report = BuildReport::default();
        // Outcomes arrive in walk order already; styles are injected in that order.
        for outcome in outcomes {
            match outcome {
                Outcome::Style(sheet, assets) => {
                    report.styles.inject(sheet);
                    report.assets.extend(assets);
                }
                Outcome::Asset(asset) => report.assets.push(asset),
                Outcome::Document(doc, assets) => {
                    report.documents.push(doc);
                    report.assets.extend(assets);
                }
                Outcome::PassThrough(rel) => report.passed_through.push(rel),
            }
        }
        merge_assets(&mut report.assets);

        if self.config.performance.hints {
            let limit = self.config.performance.max_asset_size;
            let sizes = report
                .assets
                .iter()
                .map(|a| (a.file.as_str(), a.size))
                .chain(report.documents.iter().map(|d| (d.output.as_str(), d.size)));
            for (file, size) in sizes {
                if size > limit {
                    warn!(file, size, limit, "asset exceeds size limit");
                    report
                        .warnings
                        .push(format!("{file} is {size} bytes, over the {limit} byte limit"));
                }
            }
        }
        report
    }
}

/// Sort by source and name, folding repeated emissions of one asset into a
/// single entry that counts as written if any of them wrote it.
fn merge_assets(assets: &mut Vec<EmittedAsset>) {
    assets.sort_by(|a, b| a.source.cmp(&b.source).then(a.name.cmp(&b.name)));
    assets.dedup_by(|later, kept| {
        let same = later.source == kept.source && later.name == kept.name;
        if same {
            kept.written |= later.written;
        }
        same
    });
}

/// `guide/intro.md` -> `guide/intro.html`
fn fragment_path(rel: &str) -> String {
    match rel.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && !stem.ends_with('/') => format!("{stem}.html"),
        _ => format!("{rel}.html"),
    }
}

/// Resolve `reference` against the directory of `document`, keeping its query.
/// `..` segments that would climb above the root are dropped.
fn resolve_reference(document: &str, reference: &str) -> String {
    let path = strip_query(reference);
    let mut parts: Vec<&str> = document.split('/').collect();
    parts.pop();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    format!("{}{}", parts.join("/"), query_suffix(reference))
}
