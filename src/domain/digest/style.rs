//! Design tokens -> validated theme -> CSS for the digest `<style>` block.

use crate::domain::settings::DesignTokens;

/// Design tokens after validation. Every field is safe to paste into CSS.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub header_color: String,
    pub accent_color: String,
    pub text_color: String,
    pub background_color: String,
    pub link_color: String,
    pub font_family: String,
    pub card_bg_color: String,
    pub card_border_color: String,
    pub meta_color: String,
    pub header_text_size: u32,
    pub content_padding: u32,
    pub card_radius: u32,
    pub line_height: f32,
}

fn is_hex_color(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn color(value: &str, fallback: &str) -> String {
    let v = value.trim();
    if is_hex_color(v) {
        v.to_ascii_lowercase()
    } else {
        fallback.to_string()
    }
}

/// Accepts `12`, `12px`, `12.5`; rounds and clamps to `[0, max]`.
fn pixels(value: &str, fallback: &str, max: u32) -> u32 {
    let parse = |s: &str| -> Option<u32> {
        let n: f32 = s.trim().trim_end_matches("px").trim().parse().ok()?;
        (n.is_finite() && n >= 0.0).then(|| (n.round() as u32).min(max))
    };
    parse(value).or_else(|| parse(fallback)).unwrap_or(0)
}

fn font(value: &str, fallback: &str) -> String {
    let v = value.trim();
    let bad = |c: char| matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\\' | '(' | ')');
    if v.is_empty() || v.chars().any(bad) {
        fallback.to_string()
    } else {
        v.to_string()
    }
}

impl Theme {
    pub fn from_tokens(tokens: &DesignTokens) -> Self {
        let d = DesignTokens::default();
        let line_height = tokens
            .line_height
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite() && (0.8..=3.0).contains(v))
            .unwrap_or(1.5);
        Self {
            header_color: color(&tokens.header_color, &d.header_color),
            accent_color: color(&tokens.accent_color, &d.accent_color),
            text_color: color(&tokens.text_color, &d.text_color),
            background_color: color(&tokens.background_color, &d.background_color),
            link_color: color(&tokens.link_color, &d.link_color),
            font_family: font(&tokens.font_family, &d.font_family),
            card_bg_color: color(&tokens.card_bg_color, &d.card_bg_color),
            card_border_color: color(&tokens.card_border_color, &d.card_border_color),
            meta_color: color(&tokens.meta_color, &d.meta_color),
            header_text_size: pixels(&tokens.header_text_size, &d.header_text_size, 96),
            content_padding: pixels(&tokens.content_padding, &d.content_padding, 120),
            card_radius: pixels(&tokens.card_radius, &d.card_radius, 60),
            line_height,
        }
    }

    /// Stylesheet for the digest document.
    pub fn css(&self) -> String {
        format!(
            "body {{background:{bg}; font-family:{font}; margin:0; color:{text};}}
.content {{color:{text}; background:#ffffff; padding:{pad}px; margin:2em auto; border-radius:10px; max-width:700px;}}
.header {{border-bottom:2px solid {accent}; margin-bottom:1em; padding-bottom:0.4em;}}
.header h1 {{color:{header}; font-size:{hsize}px; margin:0 0 0.2em 0;}}
.header .subtitle {{color:{meta}; margin:0;}}
.header img.logo {{max-width:100%; height:auto; display:block;}}
.intro {{font-size:1.1em; margin-bottom:1.2em;}}
.section-title {{color:{header}; font-size:1.45em; margin-top:1.5em; margin-bottom:0.8em; font-weight:700;}}
.card {{background:{card_bg}; border:1px solid {card_border}; border-radius:{radius}px; margin-bottom:1.5em; padding:0.9em 1em; box-sizing:border-box;}}
.forum-header, .thread-header {{margin-top:1.2em; margin-bottom:0.7em;}}
.category-label {{color:#ffffff; background:{header}; display:inline-block; padding:0.18em 0.7em; border-radius:6px; font-weight:600; margin-right:0.6em;}}
.topic-label {{color:#ffffff; background:{accent}; display:inline-block; padding:0.13em 0.6em; border-radius:6px; font-weight:600; margin-right:0.6em;}}
.forum-name {{font-size:1.1em; font-weight:bold; color:{header};}}
.thread-name {{font-weight:bold; color:{text};}}
.post-title {{font-size:1.06em; font-weight:600; color:{header}; margin-bottom:0.15em;}}
.post-title a {{color:{header}; text-decoration:none;}}
.reply-label {{color:{accent}; font-weight:600;}}
.post-meta {{color:{meta}; font-size:0.95em; margin-bottom:0.3em;}}
.post-excerpt {{line-height:{lh}; margin:0.1em 0 0.7em 0;}}
.forum-quote {{border-left:3px solid {accent}; background:#fffbe7; color:#444444; margin:0.5em 0 0.7em 0; padding:0.5em 0.8em; font-style:italic; border-radius:5px;}}
.post-readmore a, .empty-links a {{color:{link}; font-weight:600; text-decoration:underline;}}
.empty {{text-align:center; padding:2em 1em;}}
.empty .message {{font-size:1.2em; color:{meta};}}
.empty-links a {{margin:0 0.75em;}}
.footer {{color:{meta}; font-size:0.9em; border-top:1px solid {card_border}; margin-top:2em; padding-top:1em; line-height:{lh};}}
@media (max-width: 600px) {{ .content {{padding:0.5em;}} }}",
            bg = self.background_color,
            font = self.font_family,
            text = self.text_color,
            pad = self.content_padding,
            accent = self.accent_color,
            header = self.header_color,
            hsize = self.header_text_size,
            meta = self.meta_color,
            card_bg = self.card_bg_color,
            card_border = self.card_border_color,
            radius = self.card_radius,
            lh = self.line_height,
            link = self.link_color,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_tokens_pass_through() {
        let mut t = DesignTokens::default();
        t.header_color = "#ABC".into();
        t.card_radius = "12px".into();
        t.line_height = "1.8".into();
        let theme = Theme::from_tokens(&t);
        assert_eq!(theme.header_color, "#abc");
        assert_eq!(theme.card_radius, 12);
        assert!((theme.line_height - 1.8).abs() < f32::EPSILON);
        assert!(theme.css().contains("border-radius:12px"));
    }

    #[test]
    fn malformed_tokens_fall_back() {
        let mut t = DesignTokens::default();
        t.text_color = "red; } body { display:none".into();
        t.font_family = "Arial\"; }</style><script>".into();
        t.content_padding = "lots".into();
        t.line_height = "99".into();
        t.header_text_size = "-4".into();
        let theme = Theme::from_tokens(&t);
        assert_eq!(theme.text_color, "#222222");
        assert_eq!(theme.font_family, "Segoe UI, Arial, sans-serif");
        assert_eq!(theme.content_padding, 24);
        assert!((theme.line_height - 1.5).abs() < f32::EPSILON);
        assert_eq!(theme.header_text_size, 28);
    }
}
