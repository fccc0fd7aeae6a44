//! Shared test utilities for the docpack test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let report = bundle::check(tmp.path(), &stock_config()).unwrap();
//! assert_eq!(find_document(&report, "guide/intro.md").headings, 6);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::bundle::{BuildReport, DocumentOutput};
use crate::config::{BuildConfig, effective_config};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Every file under `root`, relative and sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

// =========================================================================
// Config
// =========================================================================

/// Engine defaults merged with the stock local overrides, no user file.
pub fn stock_config() -> BuildConfig {
    effective_config(None).unwrap()
}

// =========================================================================
// Report lookups
// =========================================================================

/// Find a document by source path. Panics if missing.
pub fn find_document<'a>(report: &'a BuildReport, source: &str) -> &'a DocumentOutput {
    report
        .documents
        .iter()
        .find(|d| d.source == source)
        .unwrap_or_else(|| {
            let sources: Vec<&str> = report.documents.iter().map(|d| d.source.as_str()).collect();
            panic!("document '{source}' not found. Available: {sources:?}")
        })
}
