//! Opaque resource emission.
//!
//! Files matched by an `asset/resource` rule are copied byte-for-byte to a
//! content-addressed name under the output directory. Nothing inspects the
//! bytes beyond hashing them.
//!
//! ## Filename templates
//!
//! | Token | Expands to |
//! |-------|------------|
//! | `[hash]`, `[contenthash]` | first `hash_length` hex digits of the SHA-256 of the contents |
//! | `[name]` | file stem, e.g. `logo` for `img/logo.png` |
//! | `[ext]` | extension with its dot, e.g. `.png` (empty if none) |
//! | `[query]` | `?query` / `#fragment` suffix of the request, if any |
//!
//! The stock template `static/[hash][ext][query]` turns `img/logo.png?v=2` into
//! the public name `static/9f86d081884c7d659a2f.png?v=2`, written to disk as
//! `static/9f86d081884c7d659a2f.png`.
//!
//! The path and the query are passed separately. Walked files have no query,
//! so a `#` or `?` in a real file name stays part of `[name]`.
//!
//! Because the name is derived from the content, an existing file at the target
//! path already holds the right bytes and is not rewritten.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of emitting one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Request path relative to the source root (query included).
    pub source: String,
    /// Public name relative to the output root, query preserved.
    pub name: String,
    /// On-disk path relative to the output root.
    pub file: String,
    /// Size in bytes.
    pub size: u64,
    /// False when a file with the same content-addressed name already existed.
    pub written: bool,
}

/// SHA-256 of `bytes` as lowercase hex, truncated to `len` digits.
pub fn content_hash(bytes: &[u8], len: usize) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    digest[..len.min(digest.len())].to_string()
}

/// Expand a filename template for the relative `path` whose contents hash to
/// `hash`. `query` is the `?query` / `#fragment` suffix, or empty.
pub fn render_filename(template: &str, path: &str, query: &str, hash: &str) -> String {
    let path = Path::new(path);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    template
        .replace("[contenthash]", hash)
        .replace("[hash]", hash)
        .replace("[name]", &name)
        .replace("[ext]", &ext)
        .replace("[query]", query)
}

/// Writes resources into an output directory.
#[derive(Debug, Clone)]
pub struct AssetEmitter {
    output_dir: PathBuf,
    hash_length: usize,
}

impl AssetEmitter {
    pub fn new(output_dir: impl Into<PathBuf>, hash_length: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            hash_length,
        }
    }

    /// Compute the emitted names without touching the filesystem.
    pub fn plan(&self, template: &str, path: &str, query: &str, bytes: &[u8]) -> EmittedAsset {
        let hash = content_hash(bytes, self.hash_length);
        let name = render_filename(template, path, query, &hash);
        let file = render_filename(template, path, "", &hash);
        EmittedAsset {
            source: format!("{path}{query}"),
            name,
            file,
            size: bytes.len() as u64,
            written: false,
        }
    }

    /// Emit `bytes` under the name `template` produces for `path`.
    pub fn emit(
        &self,
        template: &str,
        path: &str,
        query: &str,
        bytes: &[u8],
    ) -> Result<EmittedAsset, EmitError> {
        let mut asset = self.plan(template, path, query, bytes);
        let target = self.output_dir.join(&asset.file);
        if target.exists() {
            debug!(source = %asset.source, file = %asset.file, "asset already emitted");
            return Ok(asset);
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| EmitError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, bytes).map_err(|source| EmitError::Io {
            path: target.clone(),
            source,
        })?;
        debug!(source = %asset.source, file = %asset.file, size = asset.size, "asset emitted");
        asset.written = true;
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DEFAULT_ASSET_FILENAME;
    use tempfile::TempDir;

    // sha256("hello")
    const HELLO_SHA: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn content_hash_truncates() {
        assert_eq!(content_hash(b"hello", 20), &HELLO_SHA[..20]);
        assert_eq!(content_hash(b"hello", 64), HELLO_SHA);
        assert_eq!(content_hash(b"hello", 100), HELLO_SHA);
    }

    #[test]
    fn stock_template_is_static_hash_ext() {
        let name = render_filename(DEFAULT_ASSET_FILENAME, "img/logo.png", "", "abc123");
        assert_eq!(name, "static/abc123.png");
    }

    #[test]
    fn template_preserves_query() {
        let name = render_filename(DEFAULT_ASSET_FILENAME, "fonts/a.woff2", "?v=3", "abc");
        assert_eq!(name, "static/abc.woff2?v=3");
    }

    #[test]
    fn template_name_and_contenthash() {
        let name = render_filename("media/[name]-[contenthash][ext]", "v/intro.mp4", "", "ff");
        assert_eq!(name, "media/intro-ff.mp4");
    }

    #[test]
    fn template_without_extension() {
        let name = render_filename(DEFAULT_ASSET_FILENAME, "LICENSE", "", "ab");
        assert_eq!(name, "static/ab");
    }

    #[test]
    fn emit_writes_unmodified_bytes() {
        let tmp = TempDir::new().unwrap();
        let emitter = AssetEmitter::new(tmp.path(), 20);
        let bytes = [0u8, 159, 146, 150, 255];
        let asset = emitter
            .emit(DEFAULT_ASSET_FILENAME, "img/raw.png", "", &bytes)
            .unwrap();

        assert!(asset.written);
        assert_eq!(asset.size, 5);
        assert!(asset.file.starts_with("static/"));
        assert!(asset.file.ends_with(".png"));
        assert_eq!(fs::read(tmp.path().join(&asset.file)).unwrap(), bytes);
    }

    #[test]
    fn emitted_name_matches_static_hash_ext() {
        let tmp = TempDir::new().unwrap();
        let emitter = AssetEmitter::new(tmp.path(), 20);
        let asset = emitter
            .emit(DEFAULT_ASSET_FILENAME, "model.glb", "", b"glTF")
            .unwrap();
        let re = regex::Regex::new(r"^static/[0-9a-f]{20}\.glb$").unwrap();
        assert!(re.is_match(&asset.name), "{}", asset.name);
    }

    #[test]
    fn emit_query_kept_in_name_not_on_disk() {
        let tmp = TempDir::new().unwrap();
        let emitter = AssetEmitter::new(tmp.path(), 8);
        let asset = emitter
            .emit(DEFAULT_ASSET_FILENAME, "f.ttf", "?x=1", b"font")
            .unwrap();
        assert!(asset.name.ends_with(".ttf?x=1"));
        assert!(asset.file.ends_with(".ttf"));
        assert_eq!(asset.source, "f.ttf?x=1");
        assert!(tmp.path().join(&asset.file).exists());
    }

    #[test]
    fn hash_sign_in_file_name_is_not_a_fragment() {
        let tmp = TempDir::new().unwrap();
        let emitter = AssetEmitter::new(tmp.path(), 8);
        let asset = emitter
            .emit("files/[name][ext][query]", "img#1.png", "", b"png")
            .unwrap();
        assert_eq!(asset.source, "img#1.png");
        assert_eq!(asset.name, "files/img#1.png");
        assert_eq!(asset.file, asset.name);
        assert!(tmp.path().join("files/img#1.png").is_file());
    }

    #[test]
    fn identical_content_is_written_once() {
        let tmp = TempDir::new().unwrap();
        let emitter = AssetEmitter::new(tmp.path(), 20);
        let first = emitter.emit(DEFAULT_ASSET_FILENAME, "a/x.png", "", b"same").unwrap();
        let second = emitter.emit(DEFAULT_ASSET_FILENAME, "b/y.png", "", b"same").unwrap();
        assert!(first.written);
        assert!(!second.written);
        assert_eq!(first.file, second.file);
    }

    #[test]
    fn plan_does_not_write() {
        let tmp = TempDir::new().unwrap();
        let emitter = AssetEmitter::new(tmp.path(), 20);
        let asset = emitter.plan(DEFAULT_ASSET_FILENAME, "a.png", "", b"x");
        assert!(!tmp.path().join(&asset.file).exists());
    }
}
