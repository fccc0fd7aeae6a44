//! Inline style injection.
//!
//! Stylesheets go through two stages:
//!
//! 1. `collect-text`: read the raw stylesheet as UTF-8 (a leading BOM is dropped).
//! 2. `inject-style`: add it to a [`StyleContext`], the ordered set of styles
//!    the rendered page applies at load time.
//!
//! Nothing is written to disk. The context renders as one `<style>` element per
//! source, tagged with `data-source` so a reload can replace it in place.
//!
//! Relative `url(...)` values are listed by [`InjectedStyle::references`] so the
//! build can emit them as resources and point the CSS at the emitted names.
//! `@import` is left alone.

use crate::markdown::is_relative;
use maud::{Markup, PreEscaped, html};
use regex::{Captures, Regex};
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("stylesheet {} is not valid UTF-8: {source}", path.display())]
    Encoding {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
}

/// A stylesheet after `collect-text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedStyle {
    /// Source path relative to the source root.
    pub source: String,
    /// Raw CSS text.
    pub css: String,
}

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\burl\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]+))\s*\)"#).expect("static regex")
});

fn url_value<'h>(caps: &Captures<'h>) -> Option<(&'h str, &'static str)> {
    caps.get(1)
        .map(|m| (m.as_str(), "\""))
        .or_else(|| caps.get(2).map(|m| (m.as_str(), "'")))
        .or_else(|| caps.get(3).map(|m| (m.as_str(), "")))
}

impl InjectedStyle {
    /// Relative `url(...)` values in first-seen order, without duplicates.
    pub fn references(&self) -> Vec<String> {
        let mut references: Vec<String> = Vec::new();
        for caps in CSS_URL.captures_iter(&self.css) {
            let Some((value, _)) = url_value(&caps) else {
                continue;
            };
            if is_relative(value) && !references.iter().any(|r| r == value) {
                references.push(value.to_string());
            }
        }
        references
    }

    /// Point every `url(reference)` at `public`, keeping the original quoting.
    pub fn rewrite_reference(&mut self, reference: &str, public: &str) {
        let css = CSS_URL.replace_all(&self.css, |caps: &Captures| match url_value(caps) {
            Some((value, quote)) if value == reference => format!("url({quote}{public}{quote})"),
            _ => caps[0].to_string(),
        });
        self.css = css.into_owned();
    }
}

/// Stage 1: collect the raw stylesheet text.
pub fn collect_text(source: &str, bytes: Vec<u8>) -> Result<InjectedStyle, StyleError> {
    let mut css = String::from_utf8(bytes).map_err(|e| StyleError::Encoding {
        path: PathBuf::from(source),
        source: e,
    })?;
    if css.starts_with('\u{feff}') {
        css.drain(..'\u{feff}'.len_utf8());
    }
    Ok(InjectedStyle {
        source: source.to_string(),
        css,
    })
}

/// Ordered collection of injected stylesheets.
///
/// Injecting a source that is already present replaces its text but keeps its
/// original position, matching how a hot-reloaded `<style>` tag is updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleContext {
    styles: Vec<InjectedStyle>,
}

impl StyleContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage 2: inject a collected stylesheet.
    pub fn inject(&mut self, style: InjectedStyle) {
        match self.styles.iter_mut().find(|s| s.source == style.source) {
            Some(existing) => existing.css = style.css,
            None => self.styles.push(style),
        }
    }

    pub fn styles(&self) -> &[InjectedStyle] {
        &self.styles
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Render every injected stylesheet as a `<style>` element, in injection order.
    pub fn render(&self) -> Markup {
        html! {
            @for sheet in &self.styles {
                style data-source=(sheet.source) { (PreEscaped(&sheet.css)) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_text_reads_utf8() {
        let style = collect_text("a.css", b"body { color: red; }".to_vec()).unwrap();
        assert_eq!(style.source, "a.css");
        assert_eq!(style.css, "body { color: red; }");
    }

    #[test]
    fn collect_text_strips_bom() {
        let mut bytes = "\u{feff}p{}".as_bytes().to_vec();
        bytes.extend_from_slice(b"\n");
        let style = collect_text("a.css", bytes).unwrap();
        assert_eq!(style.css, "p{}\n");
    }

    #[test]
    fn collect_text_rejects_invalid_utf8() {
        let err = collect_text("bad.css", vec![0xff, 0xfe, 0x00]).unwrap_err();
        assert!(err.to_string().contains("bad.css"));
    }

    #[test]
    fn inject_keeps_order_and_replaces_in_place() {
        let mut ctx = StyleContext::new();
        ctx.inject(collect_text("a.css", b"a{}".to_vec()).unwrap());
        ctx.inject(collect_text("b.css", b"b{}".to_vec()).unwrap());
        ctx.inject(collect_text("a.css", b"a{color:red}".to_vec()).unwrap());

        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.styles()[0].source, "a.css");
        assert_eq!(ctx.styles()[0].css, "a{color:red}");
        assert_eq!(ctx.styles()[1].source, "b.css");
    }

    #[test]
    fn render_emits_style_elements() {
        let mut ctx = StyleContext::new();
        ctx.inject(collect_text("css/main.css", b"a > b { x: y }".to_vec()).unwrap());
        let html = ctx.render().into_string();
        assert_eq!(
            html,
            r#"<style data-source="css/main.css">a > b { x: y }</style>"#
        );
    }

    #[test]
    fn references_lists_relative_urls_once() {
        let css = r#"
            @font-face { src: url("fonts/a.woff2") format("woff2"), url('fonts/a.ttf'); }
            .logo { background: URL( img/logo.svg#mark ) }
            .again { background: url(img/logo.svg#mark) }
            .skip { background: url(/abs.png), url(data:image/png;base64,AA), url(https://x/y.png) }
        "#;
        let style = collect_text("site.css", css.as_bytes().to_vec()).unwrap();
        assert_eq!(
            style.references(),
            vec!["fonts/a.woff2", "fonts/a.ttf", "img/logo.svg#mark"]
        );
    }

    #[test]
    fn rewrite_reference_keeps_quotes() {
        let css = r#"a { src: url("x.png"); b: url('x.png'); c: url(x.png); d: url(y.png) }"#;
        let mut style = collect_text("a.css", css.as_bytes().to_vec()).unwrap();
        style.rewrite_reference("x.png", "/static/ab.png");
        assert_eq!(
            style.css,
            r#"a { src: url("/static/ab.png"); b: url('/static/ab.png'); c: url(/static/ab.png); d: url(y.png) }"#
        );
    }

    #[test]
    fn render_empty_context_is_empty() {
        assert_eq!(StyleContext::new().render().into_string(), "");
    }
}
