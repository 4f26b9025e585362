//! Server-rendered admin pages: tabs, forms, notices.

use crate::domain::digest::html::escape_html;
use crate::domain::settings::keys;
use crate::domain::Settings;

/// Roles offered in the settings form; configured extras are appended.
const KNOWN_ROLES: &[&str] = &["subscriber", "contributor", "author", "editor", "administrator"];

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Settings,
    Configuration,
    Design,
    Preview,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Settings, Tab::Configuration, Tab::Design, Tab::Preview];

    /// Unknown or missing tab names select the settings tab.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            Some("configuration") => Self::Configuration,
            Some("design") => Self::Design,
            Some("preview") => Self::Preview,
            _ => Self::Settings,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Configuration => "configuration",
            Self::Design => "design",
            Self::Preview => "preview",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Settings => "Settings",
            Self::Configuration => "Configuration",
            Self::Design => "Email design",
            Self::Preview => "Preview",
        }
    }

    /// Checkbox fields of the tab. Browsers omit unchecked boxes.
    pub fn checkboxes(self) -> &'static [&'static str] {
        match self {
            Self::Settings => &[keys::ENABLED, keys::INCLUDE_FORUM, keys::INCLUDE_WP],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub struct PageContext<'a> {
    pub tab: Tab,
    pub settings: &'a Settings,
    /// Already formatted in site time.
    pub next_send: Option<String>,
    pub notice: Option<Notice>,
    pub token: Option<&'a str>,
}

/// Path with the access token and extra query pairs appended, HTML-escaped.
pub fn href(path: &str, token: Option<&str>, extra: &[(&str, &str)]) -> String {
    let mut pairs: Vec<String> = extra
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    if let Some(t) = token {
        pairs.push(format!("token={}", urlencoding::encode(t)));
    }
    let url = if pairs.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, pairs.join("&"))
    };
    escape_html(&url)
}

fn text_input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<p><label for=\"{name}\">{label}</label><br /><input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{}\" /></p>",
        escape_html(value)
    )
}

fn color_input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<p><label for=\"{name}\">{label}</label> <input type=\"color\" id=\"{name}\" name=\"{name}\" value=\"{}\" /></p>",
        escape_html(value)
    )
}

fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        "<p><label><input type=\"checkbox\" name=\"{name}\" value=\"1\"{} /> {label}</label></p>",
        if checked { " checked" } else { "" }
    )
}

fn select(name: &str, label: &str, options: &[(&str, &str)], current: &str) -> String {
    let opts: String = options
        .iter()
        .map(|(value, text)| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                escape_html(value),
                if *value == current { " selected" } else { "" },
                escape_html(text)
            )
        })
        .collect();
    format!("<p><label for=\"{name}\">{label}</label><br /><select id=\"{name}\" name=\"{name}\">{opts}</select></p>")
}

fn settings_tab(ctx: &PageContext<'_>) -> String {
    let s = ctx.settings;
    let mut roles: Vec<&str> = KNOWN_ROLES.to_vec();
    for r in &s.roles {
        if !roles.contains(&r.as_str()) {
            roles.push(r);
        }
    }
    let role_boxes: String = roles
        .iter()
        .map(|r| {
            format!(
                "<label><input type=\"checkbox\" name=\"{}\" value=\"{}\"{} /> {}</label> ",
                keys::ROLES,
                escape_html(r),
                if s.roles.iter().any(|x| x == r) { " checked" } else { "" },
                escape_html(r)
            )
        })
        .collect();
    let days: Vec<(&str, &str)> = WEEKDAYS.iter().map(|d| (*d, *d)).collect();

    let mut out = format!(
        "<form method=\"post\" action=\"{}\">",
        href("/admin/options", ctx.token, &[("tab", "settings")])
    );
    out.push_str(&text_input(keys::SUBJECT, "Subject", &s.subject));
    out.push_str(&text_input(keys::FROM_NAME, "Sender name", &s.from_name));
    out.push_str(&format!("<p>Recipient roles<br />{}</p>", role_boxes));
    out.push_str(&checkbox(keys::ENABLED, "Send automatically", s.enabled));
    out.push_str(&checkbox(keys::INCLUDE_FORUM, "Include forum posts", s.include_forum));
    out.push_str(&checkbox(keys::INCLUDE_WP, "Include blog posts", s.include_wp));
    out.push_str(&select(
        keys::DATE_RANGE_TYPE,
        "Date range",
        &[("week", "Last 7 days"), ("custom", "Custom range")],
        &s.date_range_type.to_string(),
    ));
    out.push_str(&format!(
        "<p><label>From <input type=\"date\" name=\"{}\" value=\"{}\" /></label> \
         <label>To <input type=\"date\" name=\"{}\" value=\"{}\" /></label></p>",
        keys::DATE_FROM,
        escape_html(&s.date_from),
        keys::DATE_TO,
        escape_html(&s.date_to)
    ));
    out.push_str(&select(keys::SEND_DAY, "Send day", &days, &s.send_day));
    out.push_str(&format!(
        "<p><label for=\"{0}\">Send time</label><br /><input type=\"time\" id=\"{0}\" name=\"{0}\" value=\"{1}\" /></p>",
        keys::SEND_TIME,
        escape_html(&s.send_time)
    ));
    out.push_str(&select(
        keys::LANGUAGE,
        "Digest language",
        &[("en", "English"), ("sk", "Slovenčina")],
        &s.language.to_string(),
    ));
    out.push_str("<p><button type=\"submit\">Save settings</button></p></form>");

    let next = match (&ctx.next_send, s.enabled) {
        (Some(at), _) => format!("Next automatic send: {}", escape_html(at)),
        (None, true) => "No send is scheduled. Check the send day and time.".to_string(),
        (None, false) => "Automatic sending is off.".to_string(),
    };
    out.push_str(&format!("<p class=\"next-send\">{}</p>", next));
    out.push_str(&format!(
        "<form method=\"post\" action=\"{}\"><button type=\"submit\">Send now</button></form>",
        href("/admin/send-now", ctx.token, &[])
    ));
    out.push_str(&format!(
        "<form method=\"post\" action=\"{}\"><input type=\"email\" name=\"email\" placeholder=\"you@example.org\" required /> \
         <button type=\"submit\">Send test</button></form>",
        href("/admin/send-test", ctx.token, &[])
    ));
    out
}

fn configuration_tab(ctx: &PageContext<'_>) -> String {
    let m = &ctx.settings.mail;
    let mut out = format!(
        "<form method=\"post\" action=\"{}\">",
        href("/admin/options", ctx.token, &[("tab", "configuration")])
    );
    out.push_str(&select(
        keys::MAIL_TYPE,
        "Mail transport",
        &[("wordpress", "Default (sendmail)"), ("smtp", "SMTP")],
        &m.mail_type.to_string(),
    ));
    out.push_str(&text_input(keys::SMTP_HOST, "SMTP host", &m.smtp_host));
    out.push_str(&text_input(keys::SMTP_PORT, "SMTP port", &m.smtp_port.to_string()));
    out.push_str(&text_input(keys::SMTP_USERNAME, "SMTP username", &m.smtp_username));
    let placeholder = if m.smtp_password.is_empty() {
        ""
    } else {
        " placeholder=\"(unchanged)\""
    };
    out.push_str(&format!(
        "<p><label for=\"{0}\">SMTP password</label><br /><input type=\"password\" id=\"{0}\" name=\"{0}\" value=\"\" autocomplete=\"new-password\"{1} /></p>",
        keys::SMTP_PASSWORD,
        placeholder
    ));
    out.push_str(&select(
        keys::SMTP_ENCRYPTION,
        "Encryption",
        &[("none", "None"), ("ssl", "SSL"), ("tls", "TLS (STARTTLS)")],
        &m.smtp_encryption.to_string(),
    ));
    out.push_str("<p><button type=\"submit\">Save configuration</button></p></form>");
    out
}

fn design_tab(ctx: &PageContext<'_>) -> String {
    let d = &ctx.settings.design;
    let mut out = format!(
        "<form id=\"design-form\" method=\"post\" action=\"{}\" data-preview=\"{}\">",
        href("/admin/options", ctx.token, &[("tab", "design")]),
        href("/admin/preview", ctx.token, &[])
    );
    out.push_str(&text_input(keys::HEADER_TITLE, "Header title", &d.header_title));
    out.push_str(&text_input(keys::HEADER_SUBTITLE, "Header subtitle", &d.header_subtitle));
    out.push_str(&text_input(keys::LOGO_URL, "Logo URL (replaces the title)", &d.logo_url));
    out.push_str(&text_input(keys::INTRO_TEXT, "Intro text ({count} = number of posts)", &d.intro_text));
    out.push_str(&color_input(keys::HEADER_COLOR, "Header colour", &d.header_color));
    out.push_str(&color_input(keys::ACCENT_COLOR, "Accent colour", &d.accent_color));
    out.push_str(&color_input(keys::TEXT_COLOR, "Text colour", &d.text_color));
    out.push_str(&color_input(keys::BACKGROUND_COLOR, "Background colour", &d.background_color));
    out.push_str(&color_input(keys::LINK_COLOR, "Link colour", &d.link_color));
    out.push_str(&color_input(keys::CARD_BG_COLOR, "Card background", &d.card_bg_color));
    out.push_str(&color_input(keys::CARD_BORDER_COLOR, "Card border", &d.card_border_color));
    out.push_str(&color_input(keys::META_COLOR, "Meta text colour", &d.meta_color));
    out.push_str(&text_input(keys::FONT_FAMILY, "Font family", &d.font_family));
    out.push_str(&text_input(keys::HEADER_TEXT_SIZE, "Header text size (px)", &d.header_text_size));
    out.push_str(&text_input(keys::CONTENT_PADDING, "Content padding (px)", &d.content_padding));
    out.push_str(&text_input(keys::CARD_RADIUS, "Card radius (px)", &d.card_radius));
    out.push_str(&text_input(keys::LINE_HEIGHT, "Line height", &d.line_height));
    out.push_str(&format!(
        "<p><label for=\"{0}\">Footer text</label><br /><textarea id=\"{0}\" name=\"{0}\" rows=\"4\" cols=\"60\">{1}</textarea></p>",
        keys::FOOTER_TEXT,
        escape_html(&d.footer_text)
    ));
    out.push_str(
        "<p><button type=\"submit\">Save design</button> \
         <button type=\"button\" id=\"preview-btn\">Refresh preview</button></p></form>\
         <p id=\"preview-error\" class=\"notice error\" hidden></p>\
         <iframe id=\"preview-frame\" title=\"Preview\" style=\"width:100%;height:900px;border:1px solid #ccc\"></iframe>",
    );
    out.push_str(PREVIEW_SCRIPT);
    out
}

/// Posts the unsaved design form and shows the returned document.
const PREVIEW_SCRIPT: &str = r#"<script>
(function () {
  var form = document.getElementById('design-form');
  var frame = document.getElementById('preview-frame');
  var error = document.getElementById('preview-error');
  function refresh() {
    fetch(form.dataset.preview, { method: 'POST', body: new URLSearchParams(new FormData(form)) })
      .then(function (r) { return r.json(); })
      .then(function (data) {
        if (data.html) { frame.srcdoc = data.html; error.hidden = true; }
        else { error.textContent = data.error || 'Preview failed.'; error.hidden = false; }
      })
      .catch(function (e) { error.textContent = String(e); error.hidden = false; });
  }
  document.getElementById('preview-btn').addEventListener('click', refresh);
  refresh();
})();
</script>"#;

fn preview_tab(ctx: &PageContext<'_>) -> String {
    format!(
        "<p>Digest as it would be sent now with the saved settings.</p>\
         <iframe title=\"Preview\" src=\"{}\" style=\"width:100%;height:900px;border:1px solid #ccc\"></iframe>",
        href("/admin/preview/frame", ctx.token, &[])
    )
}

/// Full admin document for one tab.
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let nav: String = Tab::ALL
        .iter()
        .map(|t| {
            format!(
                "<a class=\"nav-tab{}\" href=\"{}\">{}</a>",
                if *t == ctx.tab { " nav-tab-active" } else { "" },
                href("/admin", ctx.token, &[("tab", t.slug())]),
                t.title()
            )
        })
        .collect();
    let notice = match &ctx.notice {
        Some(Notice::Success(m)) => format!("<div class=\"notice success\">{}</div>", escape_html(m)),
        Some(Notice::Error(m)) => format!("<div class=\"notice error\">{}</div>", escape_html(m)),
        None => String::new(),
    };
    let body = match ctx.tab {
        Tab::Settings => settings_tab(ctx),
        Tab::Configuration => configuration_tab(ctx),
        Tab::Design => design_tab(ctx),
        Tab::Preview => preview_tab(ctx),
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>Weekly digest</title>\n<style>{}</style>\n</head>\n<body>\n\
         <h1>Weekly digest</h1>\n<nav>{}</nav>\n{}\n<main>{}</main>\n</body>\n</html>\n",
        ADMIN_CSS, nav, notice, body
    )
}

/// Minimal error document for the preview frame.
pub fn render_inline_error(message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\" /></head><body>\
         <p class=\"notice error\" style=\"color:#b32d2e\">Preview unavailable: {}</p></body></html>\n",
        escape_html(message)
    )
}

const ADMIN_CSS: &str = "body{font-family:-apple-system,Segoe UI,Arial,sans-serif;margin:2em;max-width:1000px;color:#1d2327}\
nav{border-bottom:1px solid #c3c4c7;margin-bottom:1em}\
.nav-tab{display:inline-block;padding:.5em 1em;text-decoration:none;color:#50575e;border:1px solid transparent}\
.nav-tab-active{border-color:#c3c4c7;border-bottom-color:#fff;background:#fff;color:#1d2327}\
.notice{padding:.6em 1em;border-left:4px solid}\
.notice.success{border-color:#00a32a;background:#edfaef}\
.notice.error{border-color:#d63638;background:#fcf0f1}\
input[type=text],select,textarea{min-width:320px}";
