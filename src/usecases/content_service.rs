//! Content aggregation: resolve the date window and collect both sources into a Digest.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::domain::window::WEEK_DAYS;
use crate::domain::{DateRangeType, DateWindow, Digest, DomainError, Settings, group_forum_posts};
use crate::ports::ContentSource;

/// Blog posts per digest.
pub const BLOG_POST_LIMIT: usize = 20;

/// Window for the configured range type. A custom range with unparsable
/// dates falls back to the last week.
pub fn resolve_window(settings: &Settings, today: NaiveDate) -> DateWindow {
    match settings.date_range_type {
        DateRangeType::Week => DateWindow::last_days(today, WEEK_DAYS),
        DateRangeType::Custom => DateWindow::parse(&settings.date_from, &settings.date_to)
            .unwrap_or_else(|e| {
                warn!(error = %e, "custom date range unusable; using the last week");
                DateWindow::last_days(today, WEEK_DAYS)
            }),
    }
}

pub struct ContentService {
    source: Arc<dyn ContentSource>,
    tz: FixedOffset,
}

impl ContentService {
    pub fn new(source: Arc<dyn ContentSource>, tz: FixedOffset) -> Self {
        Self { source, tz }
    }

    pub async fn collect(&self, settings: &Settings) -> Result<Digest, DomainError> {
        self.collect_at(settings, Utc::now()).await
    }

    /// Fetch the enabled sources for the window seen from `now` (site timezone).
    pub async fn collect_at(
        &self,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<Digest, DomainError> {
        let today = now.with_timezone(&self.tz).date_naive();
        let window = resolve_window(settings, today);

        let forums = if settings.include_forum {
            group_forum_posts(self.source.forum_posts(&window).await?)
        } else {
            Vec::new()
        };
        let blog_posts = if settings.include_wp {
            self.source.blog_posts(&window, BLOG_POST_LIMIT).await?
        } else {
            Vec::new()
        };

        let digest = Digest {
            window: Some(window),
            forums,
            blog_posts,
        };
        debug!(
            range = %window,
            forums = digest.forums.len(),
            forum_posts = digest.forum_post_count(),
            blog_posts = digest.blog_posts.len(),
            "content collected"
        );
        Ok(digest)
    }
}
