//! Small HTML text helpers shared by the assembler.

/// Escape text for element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Insert `<br />` before every line break.
pub fn nl2br(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\n', "<br />\n")
}

/// Remove every markup tag, keeping the text between them.
///
/// A `<` that does not open a tag (`a < b`) is kept as text.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(idx) = rest.find('<') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx..];
        if opens_tag(after) {
            match after.find('>') {
                Some(end) => rest = &after[end + 1..],
                None => {
                    rest = "";
                }
            }
        } else {
            out.push('<');
            rest = &after[1..];
        }
    }
    out.push_str(rest);
    out
}

/// True when `s` (starting at `<`) looks like a tag, closing tag, comment or declaration.
pub(crate) fn opens_tag(s: &str) -> bool {
    s.chars()
        .nth(1)
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?')
}

/// Escaped URL for an `href`/`src` attribute. Anything but http(s), mailto
/// and site-relative links collapses to `#`.
pub fn safe_url(url: &str) -> String {
    let u = url.trim();
    let lower = u.to_ascii_lowercase();
    let ok = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || (lower.starts_with('/') && !lower.starts_with("//"));
    if ok { escape_html(u) } else { "#".to_string() }
}
