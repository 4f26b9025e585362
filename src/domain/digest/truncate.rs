//! Word truncation of rich text that keeps a small set of inline tags.
//!
//! The input is split into a stream of tag, word and space tokens. Words are counted,
//! whitelisted tags are re-emitted in a normalised form, everything else is
//! dropped. Open tags are always closed so the excerpt is well-formed.

use super::html::opens_tag;

/// Tags that survive truncation.
pub const ALLOWED_TAGS: &[&str] = &["blockquote", "b", "strong", "i", "em", "br"];

/// Inline tags do not separate words: `he<b>llo</b>` is one word.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "em", "font", "i", "mark", "s", "small", "span", "strong", "sub",
    "sup", "u",
];

/// Elements whose content is never text.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    /// `<br/>` or a void element.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lower-case element name.
    pub name: String,
    pub kind: TagKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Tag(Tag),
    /// A run of non-whitespace text up to whitespace or the next tag.
    Word(&'a str),
    /// One or more whitespace characters.
    Space,
}

/// Streaming tokenizer over an HTML fragment.
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Skip past the end of a raw-text element such as `<script>`.
    fn skip_raw_text(&mut self, name: &str) {
        let closing = format!("</{}", name);
        let rest = self.rest();
        let lower = rest.to_ascii_lowercase();
        match lower.find(&closing) {
            Some(idx) => {
                let after = &rest[idx..];
                let end = after.find('>').map(|e| e + 1).unwrap_or(after.len());
                self.pos += idx + end;
            }
            None => self.pos = self.src.len(),
        }
    }
}

fn parse_tag(raw: &str) -> Option<Tag> {
    // raw is the text between '<' and '>'
    let body = raw.trim();
    let (closing, body) = match body.strip_prefix('/') {
        Some(b) => (true, b.trim_start()),
        None => (false, body),
    };
    let name: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }
    let kind = if closing {
        TagKind::Close
    } else if body.ends_with('/') || matches!(name.as_str(), "br" | "hr" | "img" | "wbr") {
        TagKind::Empty
    } else {
        TagKind::Open
    };
    Some(Tag { name, kind })
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let rest = self.rest();
            let first = rest.chars().next()?;

            if first.is_whitespace() {
                let len = rest
                    .char_indices()
                    .find(|(_, c)| !c.is_whitespace())
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                self.pos += len;
                return Some(Token::Space);
            }

            if first == '<' && opens_tag(rest) {
                if rest.starts_with("<!--") {
                    self.pos += rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
                    continue;
                }
                let Some(end) = rest.find('>') else {
                    // Unterminated tag: drop the remainder.
                    self.pos = self.src.len();
                    return None;
                };
                self.pos += end + 1;
                let Some(tag) = parse_tag(&rest[1..end]) else {
                    continue;
                };
                if tag.kind == TagKind::Open && RAW_TEXT_TAGS.contains(&tag.name.as_str()) {
                    self.skip_raw_text(&tag.name);
                }
                return Some(Token::Tag(tag));
            }

            let mut len = 0;
            for (i, c) in rest.char_indices() {
                if c.is_whitespace() || (c == '<' && i > 0 && opens_tag(&rest[i..])) {
                    break;
                }
                len = i + c.len_utf8();
            }
            self.pos += len;
            return Some(Token::Word(&rest[..len]));
        }
    }
}

fn push_open(out: &mut String, name: &str) {
    match name {
        "blockquote" => out.push_str("<blockquote class=\"forum-quote\">"),
        _ => {
            out.push('<');
            out.push_str(name);
            out.push('>');
        }
    }
}

fn push_close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn push_word(out: &mut String, text: &str) {
    // Entities in the source are kept; only bare angle brackets are escaped.
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Keep the first `max_words` words of `html`, preserving `ALLOWED_TAGS`.
///
/// When words were cut off, `...<br />` is appended after the closing tags.
pub fn truncate_html_words(html: &str, max_words: usize) -> String {
    let mut out = String::new();
    let mut open: Vec<String> = Vec::new();
    let mut count = 0usize;
    // Last output was a word fragment with nothing separating it from the next one.
    let mut in_word = false;
    // A separator is owed before the next word or opening tag.
    let mut need_space = false;
    let mut truncated = false;

    for token in Tokenizer::new(html) {
        match token {
            Token::Space => {
                in_word = false;
                need_space = count > 0;
            }
            Token::Tag(tag) => {
                if !INLINE_TAGS.contains(&tag.name.as_str()) {
                    in_word = false;
                    need_space = count > 0;
                }
                if !ALLOWED_TAGS.contains(&tag.name.as_str()) {
                    continue;
                }
                match (tag.kind, tag.name.as_str()) {
                    (TagKind::Close, _) => {
                        // Unmatched closers are dropped; a matched one also
                        // closes anything left open inside it.
                        if let Some(idx) = open.iter().rposition(|n| *n == tag.name) {
                            while open.len() > idx {
                                if let Some(name) = open.pop() {
                                    push_close(&mut out, &name);
                                }
                            }
                        }
                    }
                    (_, "br") => out.push_str("<br />"),
                    (TagKind::Empty, _) => {}
                    // Budget spent between words: nothing may follow, so
                    // the tag would only ever wrap an empty run.
                    (TagKind::Open, _) if count == max_words && !in_word => {}
                    (TagKind::Open, _) => {
                        if need_space {
                            out.push(' ');
                            need_space = false;
                        }
                        push_open(&mut out, &tag.name);
                        open.push(tag.name.clone());
                    }
                }
            }
            Token::Word(text) => {
                if !in_word {
                    if count == max_words {
                        truncated = true;
                        break;
                    }
                    if need_space {
                        out.push(' ');
                    }
                    count += 1;
                }
                push_word(&mut out, text);
                in_word = true;
                need_space = false;
            }
        }
    }

    while let Some(name) = open.pop() {
        push_close(&mut out, &name);
    }
    if truncated {
        out.push_str("...<br />");
    }
    out
}
