//! Build configuration module.
//!
//! Handles loading, validating, and merging configuration layers. The effective
//! configuration is built from three layers, each merged on top of the previous:
//!
//! ```text
//! engine defaults        ← source maps on, size hints on, no rules
//! local overrides        ← source maps off, hints off, the three stock rules
//! docpack.toml           ← optional user file (explicit --config or <source>/docpack.toml)
//! ```
//!
//! ## Merge Policy
//!
//! [`merge_toml`] is a pure structural merge over `toml::Value`:
//!
//! - Tables are merged key-by-key, recursively.
//! - Arrays concatenate (base first, then overlay), so a user file that declares
//!   `[[module.rules]]` appends rules after the stock ones rather than replacing them.
//! - Any other overlay value replaces the base value.
//!
//! Because rules are matched first-match-wins in declaration order, appended user
//! rules only see files the stock rules did not claim.
//!
//! ## Configuration Options
//!
//! ```toml
//! devtool = false               # heading source-map sidecars for documents
//!
//! [performance]
//! hints = false                 # warn about emitted files above max_asset_size
//! max_asset_size = 250000
//!
//! [output]
//! hash_length = 20              # hex digits used for [hash]
//! public_path = "/"             # prefix for rewritten asset URLs
//!
//! [markdown]
//! allow_dangerous_html = false
//!
//! [markdown.toc]
//! heading = "(table[ -]of[ -])?contents?|toc"
//! max_depth = 6
//! tight = true
//! ordered = false
//! insert_when_missing = true
//!
//! [processing]
//! max_processes = 4             # omit for auto = CPU cores
//!
//! [[module.rules]]
//! test = '\.txt$'
//! kind = "asset/resource"
//! filename = "static/[name].[hash][ext]"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::rules::PipelineKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the user configuration file looked up in the source directory.
pub const CONFIG_FILENAME: &str = "docpack.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Effective build configuration.
///
/// `Default` is the engine-default layer: source maps and size hints enabled,
/// no rules. The stock behavior comes from [`local_overrides_value`] merged on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Emit heading source-map sidecars next to document fragments.
    pub devtool: bool,
    /// Asset size reporting.
    pub performance: PerformanceConfig,
    /// Transform rules, in declaration order.
    pub module: ModuleConfig,
    /// Asset naming and public URLs.
    pub output: OutputConfig,
    /// Document-Transformation options.
    pub markdown: MarkdownConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            devtool: true,
            performance: PerformanceConfig::default(),
            module: ModuleConfig::default(),
            output: OutputConfig::default(),
            markdown: MarkdownConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=64).contains(&self.output.hash_length) {
            return Err(ConfigError::Validation(
                "output.hash_length must be 1-64".into(),
            ));
        }
        if !(1..=6).contains(&self.markdown.toc.max_depth) {
            return Err(ConfigError::Validation(
                "markdown.toc.max_depth must be 1-6".into(),
            ));
        }
        if let Err(e) = Regex::new(&self.markdown.toc.heading) {
            return Err(ConfigError::Validation(format!(
                "markdown.toc.heading is not a valid pattern: {e}"
            )));
        }
        for (idx, rule) in self.module.rules.iter().enumerate() {
            if let Err(e) = Regex::new(&rule.test) {
                return Err(ConfigError::Validation(format!(
                    "module.rules[{idx}].test is not a valid pattern: {e}"
                )));
            }
            if rule.filename.is_some() && rule.kind != PipelineKind::Resource {
                return Err(ConfigError::Validation(format!(
                    "module.rules[{idx}].filename is only allowed on asset/resource rules"
                )));
            }
        }
        Ok(())
    }
}

/// Bundle-size reporting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceConfig {
    /// Report emitted files larger than `max_asset_size`.
    pub hints: bool,
    /// Size threshold in bytes.
    pub max_asset_size: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            hints: true,
            max_asset_size: 250_000,
        }
    }
}

/// Rule table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    pub rules: Vec<RuleConfig>,
}

/// A single `[[module.rules]]` entry as written in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Regular expression matched against the file path (query stripped).
    pub test: String,
    /// Pipeline the matched files go through.
    pub kind: PipelineKind,
    /// Output filename template, asset rules only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Asset naming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Number of hex digits of the content digest used for `[hash]`.
    pub hash_length: usize,
    /// Prefix for asset URLs rewritten into document fragments.
    pub public_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            hash_length: 20,
            public_path: "/".to_string(),
        }
    }
}

/// Markdown document options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Keep raw HTML from the source instead of dropping it.
    pub allow_dangerous_html: bool,
    /// Table-of-contents generation.
    pub toc: TocConfig,
}

/// Table-of-contents settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    /// Heading text (case-insensitive, whole text) that marks an existing TOC section.
    pub heading: String,
    /// Deepest heading level listed.
    pub max_depth: u8,
    /// Tight list items (links directly in `li`, no paragraphs).
    pub tight: bool,
    /// Ordered (`ol`) instead of bullet (`ul`) list.
    pub ordered: bool,
    /// Insert a TOC at the top when no TOC heading exists.
    pub insert_when_missing: bool,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            heading: "(table[ -]of[ -])?contents?|toc".to_string(),
            max_depth: 6,
            tight: true,
            ordered: false,
            insert_when_missing: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config layers, merging, and loading
// =============================================================================

/// The local override layer: the stock rule table plus the flags that turn off
/// source maps and size hints.
const LOCAL_OVERRIDES: &str = r#"
devtool = false

[performance]
hints = false

[[module.rules]]
test = '\.css$'
kind = "style"

[[module.rules]]
test = '\.(eot|ttf|woff(2)?|svg|png|glb|jpeg|jpg|mp4|jsn)$'
kind = "asset/resource"
filename = "static/[hash][ext][query]"

[[module.rules]]
test = '\.md$'
kind = "document"
"#;

/// Returns the engine defaults as a `toml::Value::Table`.
pub fn engine_defaults_value() -> toml::Value {
    toml::Value::try_from(BuildConfig::default()).expect("default config must serialize")
}

/// Returns the local override layer as a `toml::Value::Table`.
pub fn local_overrides_value() -> toml::Value {
    toml::from_str(LOCAL_OVERRIDES).expect("local overrides must parse")
}

/// The stock base every user file is merged onto: engine defaults with the
/// local overrides applied.
pub fn stock_value() -> toml::Value {
    merge_toml(engine_defaults_value(), local_overrides_value())
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Arrays are concatenated, base elements first.
/// - Other overlay values replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (toml::Value::Array(mut base_items), toml::Value::Array(overlay_items)) => {
            base_items.extend(overlay_items);
            toml::Value::Array(base_items)
        }
        (_, overlay) => overlay,
    }
}

/// Load `docpack.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    load_config_file(&config_path).map(Some)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Resolve the effective configuration for a user layer.
pub fn effective_config(user: Option<toml::Value>) -> Result<BuildConfig, ConfigError> {
    resolve_config(stock_value(), user)
}

/// Load the effective configuration with `<dir>/docpack.toml` as the user layer.
pub fn load_config(dir: &Path) -> Result<BuildConfig, ConfigError> {
    let overlay = load_raw_config(dir)?;
    effective_config(overlay)
}

/// Render a config as TOML (used by `show-config`).
pub fn to_toml_string(config: &BuildConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

/// Returns a fully-commented stock `docpack.toml`.
///
/// Used by the `gen-config` CLI command. Every value shown is already the
/// effective default, so the file is a no-op until edited.
pub fn stock_config_toml() -> &'static str {
    r##"# docpack configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the effective defaults.
#
# This file is merged on top of the built-in configuration:
#   - tables merge key by key
#   - arrays append (so [[module.rules]] entries are added AFTER the stock rules)
#   - everything else is replaced
#
# Unknown keys will cause an error.

# Write <fragment>.map sidecars mapping heading anchors to source lines.
devtool = false

# ---------------------------------------------------------------------------
# Size reporting
# ---------------------------------------------------------------------------
[performance]
# Warn about emitted files larger than max_asset_size (bytes).
hints = false
max_asset_size = 250000

# ---------------------------------------------------------------------------
# Asset naming
# ---------------------------------------------------------------------------
[output]
# Hex digits of the SHA-256 content digest used for [hash] (1-64).
hash_length = 20

# Prefix for asset URLs rewritten into document fragments.
public_path = "/"

# ---------------------------------------------------------------------------
# Markdown documents
# ---------------------------------------------------------------------------
[markdown]
# Pass raw HTML in Markdown through instead of dropping it.
allow_dangerous_html = false

[markdown.toc]
# Heading text that marks an existing table-of-contents section.
heading = "(table[ -]of[ -])?contents?|toc"
# Deepest heading level listed (1-6).
max_depth = 6
tight = true
ordered = false
# Insert a table of contents at the top when no TOC heading exists.
insert_when_missing = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Extra rules (appended after the stock css / asset / md rules)
# ---------------------------------------------------------------------------
# [[module.rules]]
# test = '\.txt$'
# kind = "asset/resource"
# filename = "static/[name].[hash][ext]"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn engine_defaults_enable_devtool_and_hints() {
        let config = BuildConfig::default();
        assert!(config.devtool);
        assert!(config.performance.hints);
        assert!(config.module.rules.is_empty());
    }

    #[test]
    fn effective_config_applies_local_overrides() {
        let config = effective_config(None).unwrap();
        assert!(!config.devtool);
        assert!(!config.performance.hints);
        assert_eq!(config.module.rules.len(), 3);
        assert_eq!(config.module.rules[0].test, r"\.css$");
        assert_eq!(config.module.rules[0].kind, PipelineKind::InlineStyle);
        assert_eq!(config.module.rules[1].kind, PipelineKind::Resource);
        assert_eq!(
            config.module.rules[1].filename.as_deref(),
            Some("static/[hash][ext][query]")
        );
        assert_eq!(config.module.rules[2].kind, PipelineKind::Document);
    }

    #[test]
    fn asset_pattern_keeps_jsn_token() {
        let config = effective_config(None).unwrap();
        assert!(config.module.rules[1].test.contains("|jsn)"));
        assert!(!config.module.rules[1].test.contains("json"));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[markdown.toc]
max_depth = 3
"#;
        let config: BuildConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.markdown.toc.max_depth, 3);
        assert!(config.markdown.toc.tight);
        assert_eq!(config.output.hash_length, 20);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"devtool = true"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"devtool = false"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("devtool").unwrap().as_bool(), Some(false));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[performance]
hints = true
max_asset_size = 100
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[performance]
hints = false
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let perf = merged.get("performance").unwrap();
        assert_eq!(perf.get("hints").unwrap().as_bool(), Some(false));
        assert_eq!(perf.get("max_asset_size").unwrap().as_integer(), Some(100));
    }

    #[test]
    fn merge_toml_arrays_concatenate() {
        let base: toml::Value = toml::from_str(
            r#"
[[module.rules]]
test = 'a'
kind = "style"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[[module.rules]]
test = 'b'
kind = "document"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let rules = merged
            .get("module")
            .unwrap()
            .get("rules")
            .unwrap()
            .as_array()
            .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].get("test").unwrap().as_str(), Some("a"));
        assert_eq!(rules[1].get("test").unwrap().as_str(), Some("b"));
    }

    #[test]
    fn merge_toml_idempotent_for_scalars_and_tables() {
        let base = engine_defaults_value();
        let overlay: toml::Value = toml::from_str(
            r#"
devtool = false
[output]
hash_length = 8
"#,
        )
        .unwrap();
        let once = merge_toml(base.clone(), overlay.clone());
        let twice = merge_toml(once.clone(), overlay);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_twice_appends_rules_again() {
        let once = merge_toml(engine_defaults_value(), local_overrides_value());
        let twice = merge_toml(once.clone(), local_overrides_value());
        let once_cfg: BuildConfig = once.try_into().unwrap();
        let twice_cfg: BuildConfig = twice.try_into().unwrap();
        assert_eq!(once_cfg.devtool, twice_cfg.devtool);
        assert_eq!(once_cfg.performance.hints, twice_cfg.performance.hints);
        assert_eq!(once_cfg.module.rules.len(), 3);
        assert_eq!(twice_cfg.module.rules.len(), 6);
        assert_eq!(twice_cfg.module.rules[..3], twice_cfg.module.rules[3..]);
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
a = 1
b = 2
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(r#"a = 10"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(10));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(2));
    }

    #[test]
    fn merge_toml_overlay_scalar_replaces_table() {
        let base: toml::Value = toml::from_str("[a]\nb = 1").unwrap();
        let overlay: toml::Value = toml::from_str("a = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn user_rules_are_appended_after_stock_rules() {
        let user: toml::Value = toml::from_str(
            r#"
[[module.rules]]
test = '\.txt$'
kind = "asset/resource"
"#,
        )
        .unwrap();
        let config = effective_config(Some(user)).unwrap();
        assert_eq!(config.module.rules.len(), 4);
        assert_eq!(config.module.rules[3].test, r"\.txt$");
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_config_returns_stock_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert!(!config.devtool);
        assert_eq!(config.module.rules.len(), 3);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
devtool = true

[output]
public_path = "/assets/"
"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert!(config.devtool);
        assert_eq!(config.output.public_path, "/assets/");
        assert_eq!(config.output.hash_length, 20);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_file_missing_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[output]
hash_lenght = 8
"#;
        let result: Result<BuildConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_rule_kind_rejected() {
        let user: toml::Value = toml::from_str(
            r#"
[[module.rules]]
test = 'x'
kind = "javascript/auto"
"#,
        )
        .unwrap();
        assert!(effective_config(Some(user)).is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_stock_config_passes() {
        let config = effective_config(None).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_hash_length_bounds() {
        let mut config = BuildConfig::default();
        config.output.hash_length = 0;
        assert!(config.validate().is_err());
        config.output.hash_length = 65;
        assert!(config.validate().is_err());
        config.output.hash_length = 64;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_toc_depth() {
        let mut config = BuildConfig::default();
        config.markdown.toc.max_depth = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn validate_bad_rule_pattern() {
        let mut config = BuildConfig::default();
        config.module.rules.push(RuleConfig {
            test: "(".to_string(),
            kind: PipelineKind::InlineStyle,
            filename: None,
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("module.rules[0]"));
    }

    #[test]
    fn validate_filename_only_on_assets() {
        let mut config = BuildConfig::default();
        config.module.rules.push(RuleConfig {
            test: r"\.md$".to_string(),
            kind: PipelineKind::Document,
            filename: Some("x/[hash]".to_string()),
        });
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[output]\nhash_length = 200\n",
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Processing / stock file
    // =========================================================================

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn stock_config_toml_is_noop_overlay() {
        let user: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let with_file = effective_config(Some(user)).unwrap();
        let without = effective_config(None).unwrap();
        assert_eq!(with_file.devtool, without.devtool);
        assert_eq!(with_file.output.hash_length, without.output.hash_length);
        assert_eq!(with_file.module.rules, without.module.rules);
    }

    #[test]
    fn config_roundtrips_through_toml_string() {
        let config = effective_config(None).unwrap();
        let text = to_toml_string(&config).unwrap();
        let parsed: BuildConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.module.rules, config.module.rules);
    }
}
