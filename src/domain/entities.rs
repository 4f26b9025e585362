//! Domain entities. Pure data structures for the core business.
//!
//! No database/IO types here; adapters map rows into these.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::window::DateWindow;

/// A published WordPress post of type `post`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    /// Raw `post_content` (HTML, block comments included).
    pub content: String,
    /// First category as WordPress orders them (by name). None = uncategorized.
    pub category: Option<Category>,
    pub published: NaiveDateTime,
    pub permalink: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

/// A single wpForo post, joined with its thread and forum titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: i64,
    pub topic_id: i64,
    pub forum_id: i64,
    pub author_id: Option<i64>,
    /// Display name of the author; empty when the user no longer exists.
    pub author_name: String,
    pub title: String,
    /// Body HTML, may contain `[quote]...[/quote]` markup.
    pub body: String,
    pub created: NaiveDateTime,
    pub thread_subject: String,
    pub forum_name: String,
    /// Link to the thread on the forum.
    pub url: String,
}

impl ForumPost {
    /// Best-effort reply detection: wpForo stores replies either untitled or
    /// titled "RE: <topic>". Not a guaranteed classification.
    pub fn is_reply(&self) -> bool {
        is_reply_title(&self.title)
    }
}

/// True for an empty title or one starting with `RE:` (any case).
pub fn is_reply_title(title: &str) -> bool {
    let t = title.trim();
    t.is_empty() || t.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("re:"))
}

/// Posts of one thread, in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadGroup {
    pub topic_id: i64,
    pub subject: String,
    pub posts: Vec<ForumPost>,
}

/// Threads of one forum, in the order the source returned them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumGroup {
    pub forum_id: i64,
    pub name: String,
    pub threads: Vec<ThreadGroup>,
}

impl ForumGroup {
    pub fn post_count(&self) -> usize {
        self.threads.iter().map(|t| t.posts.len()).sum()
    }
}

/// Nest an ordered post list into forum -> thread -> post.
///
/// Order of first appearance is kept at every level, so a list sorted by
/// forum title, thread title, creation time renders in that order.
pub fn group_forum_posts(posts: Vec<ForumPost>) -> Vec<ForumGroup> {
    let mut forums: Vec<ForumGroup> = Vec::new();
    let mut forum_index: HashMap<i64, usize> = HashMap::new();
    let mut thread_index: HashMap<(i64, i64), usize> = HashMap::new();

    for post in posts {
        let fi = *forum_index.entry(post.forum_id).or_insert_with(|| {
            forums.push(ForumGroup {
                forum_id: post.forum_id,
                name: post.forum_name.clone(),
                threads: Vec::new(),
            });
            forums.len() - 1
        });
        let forum = &mut forums[fi];
        let ti = *thread_index
            .entry((post.forum_id, post.topic_id))
            .or_insert_with(|| {
                forum.threads.push(ThreadGroup {
                    topic_id: post.topic_id,
                    subject: post.thread_subject.clone(),
                    posts: Vec::new(),
                });
                forum.threads.len() - 1
            });
        forum.threads[ti].posts.push(post);
    }
    forums
}

/// Content of one send (or preview) cycle. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct Digest {
    pub window: Option<DateWindow>,
    pub forums: Vec<ForumGroup>,
    pub blog_posts: Vec<BlogPost>,
}

impl Digest {
    pub fn forum_post_count(&self) -> usize {
        self.forums.iter().map(ForumGroup::post_count).sum()
    }

    /// Blog posts plus forum posts.
    pub fn item_count(&self) -> usize {
        self.blog_posts.len() + self.forum_post_count()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::NaiveDate;

    pub fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    pub fn forum_post(id: i64, forum: (i64, &str), topic: (i64, &str), title: &str) -> ForumPost {
        ForumPost {
            id,
            topic_id: topic.0,
            forum_id: forum.0,
            author_id: Some(7),
            author_name: "Jana".to_string(),
            title: title.to_string(),
            body: format!("Body of post {}", id),
            created: at(4, 9),
            thread_subject: topic.1.to_string(),
            forum_name: forum.1.to_string(),
            url: format!("https://example.org/community/topic/{}", topic.0),
        }
    }

    pub fn blog_post(id: i64, title: &str, category: Option<(&str, &str)>) -> BlogPost {
        BlogPost {
            id,
            title: title.to_string(),
            content: "<!-- wp:paragraph --><p>Some <b>bold</b> news.</p><!-- /wp:paragraph -->"
                .to_string(),
            category: category.map(|(name, slug)| Category {
                name: name.to_string(),
                slug: slug.to_string(),
            }),
            published: at(5, 12),
            permalink: format!("https://example.org/?p={}", id),
        }
    }
}
