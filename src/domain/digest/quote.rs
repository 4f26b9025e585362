//! Forum quote markup: `[quote author=...]text[/quote]` -> styled blockquote.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::html::{escape_html, nl2br, strip_tags};

static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\[quote([^\]]*)\](.*?)\[/quote\]").expect("quote pattern is valid")
});

/// Replace each quote block with `<blockquote class="forum-quote">`.
/// The quoted text is reduced to plain text, escaped, and keeps its line breaks.
pub fn format_quotes(text: &str) -> String {
    QUOTE_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let inner = strip_tags(&caps[2]);
            format!(
                "<blockquote class=\"forum-quote\">{}</blockquote>",
                nl2br(&escape_html(inner.trim()))
            )
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_quote_with_attributes() {
        let out = format_quotes(r#"Before [quote data-userid="3"]<p>Hi & bye</p>[/quote] after"#);
        assert_eq!(
            out,
            "Before <blockquote class=\"forum-quote\">Hi &amp; bye</blockquote> after"
        );
    }

    #[test]
    fn keeps_line_breaks_and_is_case_insensitive() {
        let out = format_quotes("[QUOTE]line one\nline two[/Quote]");
        assert_eq!(
            out,
            "<blockquote class=\"forum-quote\">line one<br />\nline two</blockquote>"
        );
    }

    #[test]
    fn handles_several_quotes_and_unclosed_markup() {
        let out = format_quotes("[quote]a[/quote] mid [quote]b[/quote] [quote]open");
        assert_eq!(out.matches("<blockquote").count(), 2);
        assert!(out.ends_with("[quote]open"));
    }
}
