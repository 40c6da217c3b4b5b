use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, html};
use thiserror::Error;

use crate::error::ErrorKind;

/// Deepest element nesting accepted before input is considered malformed.
pub const MAX_NESTING: usize = 64;

static EMOJI_REPLACER: LazyLock<gh_emoji::Replacer> = LazyLock::new(gh_emoji::Replacer::new);

/// Why a body could not be converted. Callers keep the raw text instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("markup nests deeper than {limit} levels")]
    TooDeep { limit: usize },
    #[error("markdown renderer panicked")]
    Panicked,
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ConversionWarning
    }
}

/// Expand GitHub emoji shortcodes (e.g. `:tada:` → 🎉) in the given text.
///
/// Returns `Cow::Borrowed` when no shortcodes are found, avoiding allocation.
pub fn expand_emoji(text: &str) -> Cow<'_, str> {
    EMOJI_REPLACER.replace_all(text)
}

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Render GitHub-flavoured Markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> Result<String, ConversionError> {
    let text = expand_emoji(markdown);
    panic::catch_unwind(AssertUnwindSafe(|| render(&text)))
        .map_err(|_| ConversionError::Panicked)?
}

fn render(text: &str) -> Result<String, ConversionError> {
    let mut depth = 0_usize;
    let mut events = Vec::new();
    for event in Parser::new_ext(text, options()) {
        match &event {
            Event::Start(_) => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(ConversionError::TooDeep { limit: MAX_NESTING });
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        events.push(event);
    }

    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, events.into_iter());
    Ok(out)
}

/// The body as it goes into the sheet: HTML when `html` is set, otherwise
/// untouched. A failed conversion is logged and falls back to the raw text.
pub fn render_body(number: u64, body: &str, html: bool) -> String {
    if !html {
        return body.to_owned();
    }
    match markdown_to_html(body) {
        Ok(out) => out,
        Err(err) => {
            tracing::warn!(number, kind = ?err.kind(), error = %err, "keeping raw issue body");
            body.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_renders_as_strong() {
        let out = markdown_to_html("**bold**").unwrap();
        assert!(out.contains("<strong>bold</strong>"), "{out}");
    }

    #[test]
    fn headers_links_and_lists() {
        let out = markdown_to_html("# Title\n\n- one\n- [two](https://example.com)\n").unwrap();
        assert!(out.contains("<h1>Title</h1>"), "{out}");
        assert!(out.contains("<li>one</li>"), "{out}");
        assert!(out.contains(r#"<a href="https://example.com">two</a>"#), "{out}");
    }

    #[test]
    fn shortcodes_are_expanded() {
        let out = markdown_to_html("Shipped :tada:").unwrap();
        assert!(out.contains("Shipped 🎉"), "{out}");
    }

    #[test]
    fn unknown_shortcode_is_left_as_is() {
        assert_eq!(
            expand_emoji(":not_a_real_emoji:").as_ref(),
            ":not_a_real_emoji:"
        );
    }

    #[test]
    fn text_without_shortcodes_is_borrowed() {
        assert!(matches!(expand_emoji("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn pathological_nesting_is_rejected() {
        let body = format!("{} deep", ">".repeat(MAX_NESTING + 36));
        assert_eq!(
            markdown_to_html(&body),
            Err(ConversionError::TooDeep { limit: MAX_NESTING })
        );
    }

    #[test]
    fn failed_conversion_falls_back_to_raw_text() {
        let body = format!("{} deep", ">".repeat(MAX_NESTING + 36));
        assert_eq!(render_body(5, &body, true), body);
    }

    #[test]
    fn html_off_passes_body_through() {
        assert_eq!(render_body(1, "**bold** :tada:", false), "**bold** :tada:");
    }

    #[test]
    fn unbalanced_markup_still_renders() {
        let out = render_body(1, "**unclosed _emphasis [link](", true);
        assert!(out.starts_with("<p>"), "{out}");
    }
}
