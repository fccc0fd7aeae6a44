//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Resolve
//!
//! ```text
//! site.css → inline-style-injection
//!     Rule: \.css$
//!     Stages: collect-text → inject-style
//! notes.txt → pass-through
//! ```
//!
//! ## Build / Check
//!
//! ```text
//! Styles
//! 001 site.css (42 bytes)
//!
//! Assets
//! 001 img/logo.svg → static/9f86d081884c7d659a2f.svg
//!
//! Documents
//! 001 guide/intro.md → guide/intro.html
//!     Headings: 3
//!     Map: guide/intro.html.map
//!     Rewritten: img/logo.svg
//!
//! Pass-through
//! 001 notes.txt
//!
//! Built 1 stylesheet, 1 asset, 1 document, 1 passed through
//! ```
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::bundle::BuildReport;
use crate::rules::TransformRule;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// Resolve
// ============================================================================

/// Format the pipeline lookup for one path.
pub fn format_resolve(path: &str, rule: Option<&TransformRule>) -> Vec<String> {
    let Some(rule) = rule else {
        return vec![format!("{} → pass-through", path)];
    };
    let mut lines = vec![
        format!("{} → {}", path, rule.kind()),
        format!("{}Rule: {}", indent(1), rule.pattern()),
        format!("{}Stages: {}", indent(1), rule.stages().join(" → ")),
    ];
    if let Some(template) = rule.filename_template() {
        lines.push(format!("{}Filename: {}", indent(1), template));
    }
    lines
}

pub fn print_resolve(path: &str, rule: Option<&TransformRule>) {
    for line in format_resolve(path, rule) {
        println!("{}", line);
    }
}

// ============================================================================
// Build report
// ============================================================================

/// Format a build (or check) report, one section per pipeline kind.
pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.styles.is_empty() {
        lines.push("Styles".to_string());
        for (i, sheet) in report.styles.styles().iter().enumerate() {
            lines.push(format!(
                "{} {} ({} bytes)",
                format_index(i + 1),
                sheet.source,
                sheet.css.len()
            ));
        }
        lines.push(String::new());
    }

    if !report.assets.is_empty() {
        lines.push("Assets".to_string());
        for (i, asset) in report.assets.iter().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                asset.source,
                asset.name
            ));
        }
        lines.push(String::new());
    }

    if !report.documents.is_empty() {
        lines.push("Documents".to_string());
        for (i, doc) in report.documents.iter().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                doc.source,
                doc.output
            ));
            lines.push(format!("{}Headings: {}", indent(1), doc.headings));
            if let Some(map) = &doc.map {
                lines.push(format!("{}Map: {}", indent(1), map));
            }
            if !doc.rewritten.is_empty() {
                lines.push(format!("{}Rewritten: {}", indent(1), doc.rewritten.join(", ")));
            }
        }
        lines.push(String::new());
    }

    if !report.passed_through.is_empty() {
        lines.push("Pass-through".to_string());
        for (i, path) in report.passed_through.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), path));
        }
        lines.push(String::new());
    }

    if !report.warnings.is_empty() {
        lines.push("Warnings".to_string());
        for warning in &report.warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Built {}, {}, {}, {} passed through",
        plural(report.styles.len(), "stylesheet", "stylesheets"),
        plural(report.assets.len(), "asset", "assets"),
        plural(report.documents.len(), "document", "documents"),
        report.passed_through.len()
    ));
    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}
