//! Digest settings. A flat key/value namespace with a usable default for every key.
//!
//! Values travel as text (`"1"`/`"0"` for flags, JSON arrays for lists) so any
//! key/value store can hold them. Unknown or malformed values never make the
//! settings unusable: `from_options` keeps the default for such keys.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::errors::DomainError;

/// Option names as stored.
pub mod keys {
    pub const SUBJECT: &str = "subject";
    pub const ROLES: &str = "roles";
    pub const ENABLED: &str = "enabled";
    pub const DATE_RANGE_TYPE: &str = "date_range_type";
    pub const DATE_FROM: &str = "date_from";
    pub const DATE_TO: &str = "date_to";
    pub const SEND_DAY: &str = "send_day";
    pub const SEND_TIME: &str = "send_time";
    pub const INCLUDE_FORUM: &str = "include_forum";
    pub const INCLUDE_WP: &str = "include_wp";
    pub const FROM_NAME: &str = "from_name";
    pub const LANGUAGE: &str = "language";

    pub const MAIL_TYPE: &str = "mail_type";
    pub const SMTP_HOST: &str = "smtp_host";
    pub const SMTP_PORT: &str = "smtp_port";
    pub const SMTP_USERNAME: &str = "smtp_username";
    pub const SMTP_PASSWORD: &str = "smtp_password";
    pub const SMTP_ENCRYPTION: &str = "smtp_encryption";

    pub const HEADER_COLOR: &str = "email_header_color";
    pub const ACCENT_COLOR: &str = "email_accent_color";
    pub const TEXT_COLOR: &str = "email_text_color";
    pub const BACKGROUND_COLOR: &str = "email_background_color";
    pub const LINK_COLOR: &str = "email_link_color";
    pub const FONT_FAMILY: &str = "email_font_family";
    pub const LOGO_URL: &str = "email_logo_url";
    pub const FOOTER_TEXT: &str = "email_footer_text";
    pub const CARD_BG_COLOR: &str = "email_card_bg_color";
    pub const CARD_BORDER_COLOR: &str = "email_card_border_color";
    pub const HEADER_TEXT_SIZE: &str = "email_header_text_size";
    pub const CONTENT_PADDING: &str = "email_content_padding";
    pub const CARD_RADIUS: &str = "email_card_radius";
    pub const LINE_HEIGHT: &str = "email_line_height";
    pub const META_COLOR: &str = "email_meta_color";
    pub const HEADER_TITLE: &str = "email_header_title";
    pub const HEADER_SUBTITLE: &str = "email_header_subtitle";
    pub const INTRO_TEXT: &str = "email_intro_text";

    /// Every key owned by the service; uninstall deletes exactly these.
    pub const ALL: &[&str] = &[
        SUBJECT,
        ROLES,
        ENABLED,
        DATE_RANGE_TYPE,
        DATE_FROM,
        DATE_TO,
        SEND_DAY,
        SEND_TIME,
        INCLUDE_FORUM,
        INCLUDE_WP,
        FROM_NAME,
        LANGUAGE,
        MAIL_TYPE,
        SMTP_HOST,
        SMTP_PORT,
        SMTP_USERNAME,
        SMTP_PASSWORD,
        SMTP_ENCRYPTION,
        HEADER_COLOR,
        ACCENT_COLOR,
        TEXT_COLOR,
        BACKGROUND_COLOR,
        LINK_COLOR,
        FONT_FAMILY,
        LOGO_URL,
        FOOTER_TEXT,
        CARD_BG_COLOR,
        CARD_BORDER_COLOR,
        HEADER_TEXT_SIZE,
        CONTENT_PADDING,
        CARD_RADIUS,
        LINE_HEIGHT,
        META_COLOR,
        HEADER_TITLE,
        HEADER_SUBTITLE,
        INTRO_TEXT,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRangeType {
    /// The last seven days up to today.
    #[default]
    Week,
    /// Explicit `date_from` / `date_to`.
    Custom,
}

impl FromStr for DateRangeType {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "custom" => Ok(Self::Custom),
            other => Err(DomainError::Settings(format!(
                "unknown date range type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DateRangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Week => "week",
            Self::Custom => "custom",
        })
    }
}

/// Label language of the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sk,
}

impl FromStr for Language {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en_us" | "en_gb" => Ok(Self::En),
            "sk" | "sk_sk" => Ok(Self::Sk),
            other => Err(DomainError::Settings(format!("unknown language '{}'", other))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::En => "en",
            Self::Sk => "sk",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailType {
    /// Local default transport (sendmail).
    #[default]
    Wordpress,
    Smtp,
}

impl FromStr for MailType {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wordpress" | "default" | "sendmail" => Ok(Self::Wordpress),
            "smtp" => Ok(Self::Smtp),
            other => Err(DomainError::Settings(format!("unknown mail type '{}'", other))),
        }
    }
}

impl fmt::Display for MailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Wordpress => "wordpress",
            Self::Smtp => "smtp",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpEncryption {
    None,
    /// Implicit TLS (usually port 465).
    Ssl,
    /// STARTTLS (usually port 587).
    #[default]
    Tls,
}

impl FromStr for SmtpEncryption {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "ssl" => Ok(Self::Ssl),
            "tls" | "starttls" => Ok(Self::Tls),
            other => Err(DomainError::Settings(format!(
                "unknown smtp encryption '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SmtpEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Ssl => "ssl",
            Self::Tls => "tls",
        })
    }
}

/// Stored mail transport settings. `smtp_password` is the encrypted blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailSettings {
    pub mail_type: MailType,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_encryption: SmtpEncryption,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            mail_type: MailType::Wordpress,
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_encryption: SmtpEncryption::Tls,
        }
    }
}

/// Visual parameters of the digest. Kept as entered; the assembler validates
/// each token and falls back to the default for malformed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignTokens {
    pub header_color: String,
    pub accent_color: String,
    pub text_color: String,
    pub background_color: String,
    pub link_color: String,
    pub font_family: String,
    pub logo_url: String,
    pub footer_text: String,
    pub card_bg_color: String,
    pub card_border_color: String,
    /// Pixels.
    pub header_text_size: String,
    /// Pixels.
    pub content_padding: String,
    /// Pixels.
    pub card_radius: String,
    pub line_height: String,
    pub meta_color: String,
    pub header_title: String,
    pub header_subtitle: String,
    /// `{count}` is replaced with the number of items.
    pub intro_text: String,
}

impl Default for DesignTokens {
    fn default() -> Self {
        Self {
            header_color: "#171f57".into(),
            accent_color: "#f7b32b".into(),
            text_color: "#222222".into(),
            background_color: "#f6f8fa".into(),
            link_color: "#357ae8".into(),
            font_family: "Segoe UI, Arial, sans-serif".into(),
            logo_url: String::new(),
            footer_text: String::new(),
            card_bg_color: "#f8f9fb".into(),
            card_border_color: "#e5e5e5".into(),
            header_text_size: "28".into(),
            content_padding: "24".into(),
            card_radius: "7".into(),
            line_height: "1.5".into(),
            meta_color: "#888888".into(),
            header_title: "Forum & News".into(),
            header_subtitle: "Weekly digest".into(),
            intro_text: "Activity: {count} new posts in the last week.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub subject: String,
    pub roles: Vec<String>,
    pub enabled: bool,
    pub date_range_type: DateRangeType,
    pub date_from: String,
    pub date_to: String,
    /// Weekday name; validated when the schedule is computed.
    pub send_day: String,
    /// `HH:MM`; validated when the schedule is computed.
    pub send_time: String,
    pub include_forum: bool,
    pub include_wp: bool,
    pub from_name: String,
    pub language: Language,
    pub mail: MailSettings,
    pub design: DesignTokens,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            subject: "Forum & News - weekly digest".into(),
            roles: vec!["subscriber".into(), "administrator".into()],
            enabled: true,
            date_range_type: DateRangeType::Week,
            date_from: String::new(),
            date_to: String::new(),
            send_day: "monday".into(),
            send_time: "08:00".into(),
            include_forum: true,
            include_wp: true,
            from_name: "Forum & News".into(),
            language: Language::En,
            mail: MailSettings::default(),
            design: DesignTokens::default(),
        }
    }
}

fn parse_flag(value: &str) -> Result<bool, DomainError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "" | "0" | "false" | "off" | "no" => Ok(false),
        other => Err(DomainError::Settings(format!("not a flag: '{}'", other))),
    }
}

fn flag(v: bool) -> String {
    if v { "1".into() } else { "0".into() }
}

/// Roles are stored as a JSON array; a bare comma list is accepted too.
fn parse_roles(value: &str) -> Result<Vec<String>, DomainError> {
    let trimmed = value.trim();
    let roles: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| DomainError::Settings(e.to_string()))?
    } else {
        trimmed.split(',').map(|s| s.trim().to_string()).collect()
    };
    Ok(roles.into_iter().filter(|r| !r.is_empty()).collect())
}

impl Settings {
    /// Build settings from stored options. Absent and malformed keys keep their default.
    pub fn from_options(options: &HashMap<String, String>) -> Self {
        let mut settings = Self::default();
        for (key, value) in options {
            // Unknown keys (other tools' options) are ignored.
            if keys::ALL.contains(&key.as_str()) {
                if let Err(e) = settings.set(key, value) {
                    tracing::warn!(key = %key, error = %e, "malformed setting; using default");
                }
            }
        }
        settings
    }

    /// Set one option from its stored text form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), DomainError> {
        let d = &mut self.design;
        match key {
            keys::SUBJECT => self.subject = value.to_string(),
            keys::ROLES => self.roles = parse_roles(value)?,
            keys::ENABLED => self.enabled = parse_flag(value)?,
            keys::DATE_RANGE_TYPE => self.date_range_type = value.parse()?,
            keys::DATE_FROM => self.date_from = value.trim().to_string(),
            keys::DATE_TO => self.date_to = value.trim().to_string(),
            keys::SEND_DAY => self.send_day = value.trim().to_ascii_lowercase(),
            keys::SEND_TIME => self.send_time = value.trim().to_string(),
            keys::INCLUDE_FORUM => self.include_forum = parse_flag(value)?,
            keys::INCLUDE_WP => self.include_wp = parse_flag(value)?,
            keys::FROM_NAME => self.from_name = value.to_string(),
            keys::LANGUAGE => self.language = value.parse()?,
            keys::MAIL_TYPE => self.mail.mail_type = value.parse()?,
            keys::SMTP_HOST => self.mail.smtp_host = value.trim().to_string(),
            keys::SMTP_PORT => {
                self.mail.smtp_port = value
                    .trim()
                    .parse()
                    .map_err(|_| DomainError::Settings(format!("invalid port '{}'", value)))?
            }
            keys::SMTP_USERNAME => self.mail.smtp_username = value.trim().to_string(),
            keys::SMTP_PASSWORD => self.mail.smtp_password = value.to_string(),
            keys::SMTP_ENCRYPTION => self.mail.smtp_encryption = value.parse()?,
            keys::HEADER_COLOR => d.header_color = value.trim().to_string(),
            keys::ACCENT_COLOR => d.accent_color = value.trim().to_string(),
            keys::TEXT_COLOR => d.text_color = value.trim().to_string(),
            keys::BACKGROUND_COLOR => d.background_color = value.trim().to_string(),
            keys::LINK_COLOR => d.link_color = value.trim().to_string(),
            keys::FONT_FAMILY => d.font_family = value.trim().to_string(),
            keys::LOGO_URL => d.logo_url = value.trim().to_string(),
            keys::FOOTER_TEXT => d.footer_text = value.to_string(),
            keys::CARD_BG_COLOR => d.card_bg_color = value.trim().to_string(),
            keys::CARD_BORDER_COLOR => d.card_border_color = value.trim().to_string(),
            keys::HEADER_TEXT_SIZE => d.header_text_size = value.trim().to_string(),
            keys::CONTENT_PADDING => d.content_padding = value.trim().to_string(),
            keys::CARD_RADIUS => d.card_radius = value.trim().to_string(),
            keys::LINE_HEIGHT => d.line_height = value.trim().to_string(),
            keys::META_COLOR => d.meta_color = value.trim().to_string(),
            keys::HEADER_TITLE => d.header_title = value.to_string(),
            keys::HEADER_SUBTITLE => d.header_subtitle = value.to_string(),
            keys::INTRO_TEXT => d.intro_text = value.to_string(),
            other => {
                return Err(DomainError::Settings(format!("unknown setting '{}'", other)));
            }
        }
        Ok(())
    }

    /// Stored text form of every option, in `keys::ALL` order.
    pub fn to_options(&self) -> Vec<(String, String)> {
        let d = &self.design;
        let m = &self.mail;
        let roles = serde_json::to_string(&self.roles).unwrap_or_else(|_| "[]".into());
        let values: [String; 36] = [
            self.subject.clone(),
            roles,
            flag(self.enabled),
            self.date_range_type.to_string(),
            self.date_from.clone(),
            self.date_to.clone(),
            self.send_day.clone(),
            self.send_time.clone(),
            flag(self.include_forum),
            flag(self.include_wp),
            self.from_name.clone(),
            self.language.to_string(),
            m.mail_type.to_string(),
            m.smtp_host.clone(),
            m.smtp_port.to_string(),
            m.smtp_username.clone(),
            m.smtp_password.clone(),
            m.smtp_encryption.to_string(),
            d.header_color.clone(),
            d.accent_color.clone(),
            d.text_color.clone(),
            d.background_color.clone(),
            d.link_color.clone(),
            d.font_family.clone(),
            d.logo_url.clone(),
            d.footer_text.clone(),
            d.card_bg_color.clone(),
            d.card_border_color.clone(),
            d.header_text_size.clone(),
            d.content_padding.clone(),
            d.card_radius.clone(),
            d.line_height.clone(),
            d.meta_color.clone(),
            d.header_title.clone(),
            d.header_subtitle.clone(),
            d.intro_text.clone(),
        ];
        keys::ALL
            .iter()
            .zip(values)
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// True when a field that drives the schedule differs.
    pub fn schedule_differs(&self, other: &Settings) -> bool {
        self.enabled != other.enabled
            || self.send_day != other.send_day
            || self.send_time != other.send_time
    }
}
