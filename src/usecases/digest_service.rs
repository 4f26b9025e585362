//! Digest composition: collected content + settings -> subject and HTML.

use chrono::{DateTime, Utc};

use crate::domain::digest::{RenderOptions, SiteLinks, compose_subject, render_digest};
use crate::domain::{DateWindow, Digest, DomainError, Settings};
use crate::usecases::content_service::ContentService;

/// A rendered digest, ready to mail or show.
#[derive(Debug, Clone)]
pub struct RenderedDigest {
    pub subject: String,
    pub html: String,
    /// Blog plus forum posts.
    pub items: usize,
    pub window: Option<DateWindow>,
}

pub struct DigestService {
    content: ContentService,
    links: SiteLinks,
}

impl DigestService {
    pub fn new(content: ContentService, links: SiteLinks) -> Self {
        Self { content, links }
    }

    pub async fn build(&self, settings: &Settings) -> Result<RenderedDigest, DomainError> {
        self.build_at(settings, Utc::now()).await
    }

    pub async fn build_at(
        &self,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<RenderedDigest, DomainError> {
        let digest = self.content.collect_at(settings, now).await?;
        Ok(self.render(&digest, settings))
    }

    pub fn render(&self, digest: &Digest, settings: &Settings) -> RenderedDigest {
        let opts = RenderOptions {
            design: &settings.design,
            language: settings.language,
            links: &self.links,
            include_wp: settings.include_wp,
            include_forum: settings.include_forum,
        };
        RenderedDigest {
            subject: compose_subject(&settings.subject, digest.window.as_ref()),
            html: render_digest(digest, &opts),
            items: digest.item_count(),
            window: digest.window,
        }
    }
}
