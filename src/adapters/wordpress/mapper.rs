//! Map WordPress / wpForo rows to domain entities.

use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::domain::{BlogPost, Category, ForumPost};

/// One row of the forum post query (post joined with topic, forum and author).
#[derive(Debug, Clone, FromRow)]
pub struct ForumPostRow {
    pub id: i64,
    pub topic_id: i64,
    pub forum_id: i64,
    pub author_id: Option<i64>,
    pub author_name: String,
    pub title: String,
    pub body: String,
    pub created: NaiveDateTime,
    pub thread_subject: String,
    pub forum_name: String,
}

/// One row of the blog post query with the alphabetically first category.
#[derive(Debug, Clone, FromRow)]
pub struct BlogPostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: NaiveDateTime,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

/// Thread link below the forum base URL (trailing slash expected).
pub fn topic_url(forum_url: &str, topic_id: i64) -> String {
    format!("{}topic/{}", forum_url, topic_id)
}

/// Permalink that resolves under every permalink structure.
pub fn post_permalink(site_url: &str, id: i64) -> String {
    format!("{}?p={}", site_url, id)
}

pub fn forum_post_to_domain(row: ForumPostRow, forum_url: &str) -> ForumPost {
    ForumPost {
        url: topic_url(forum_url, row.topic_id),
        id: row.id,
        topic_id: row.topic_id,
        forum_id: row.forum_id,
        author_id: row.author_id.filter(|id| *id > 0),
        author_name: row.author_name,
        title: row.title,
        body: row.body,
        created: row.created,
        thread_subject: row.thread_subject,
        forum_name: row.forum_name,
    }
}

pub fn blog_post_to_domain(row: BlogPostRow, site_url: &str) -> BlogPost {
    let category = match (row.category_name, row.category_slug) {
        (Some(name), Some(slug)) if !name.is_empty() => Some(Category { name, slug }),
        _ => None,
    };
    BlogPost {
        permalink: post_permalink(site_url, row.id),
        id: row.id,
        title: row.title,
        content: row.content,
        category,
        published: row.published,
    }
}

/// Lower-cased, trimmed, de-duplicated addresses in first-seen order.
pub fn dedup_emails(emails: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(emails.len());
    for e in emails {
        let e = e.trim().to_ascii_lowercase();
        if !e.is_empty() && !out.contains(&e) {
            out.push(e);
        }
    }
    out
}

/// `LIKE` pattern matching a role inside the serialized capabilities array.
pub fn capability_pattern(role: &str) -> String {
    let escaped: String = role
        .chars()
        .flat_map(|c| match c {
            '%' | '_' | '\\' => vec!['\\', c],
            c => vec![c],
        })
        .collect();
    format!("%\"{}\"%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fixtures::at;

    #[test]
    fn blog_row_without_category_is_uncategorized() {
        let row = BlogPostRow {
            id: 12,
            title: "T".into(),
            content: "C".into(),
            published: at(5, 12),
            category_name: None,
            category_slug: None,
        };
        let post = blog_post_to_domain(row, "https://example.org/");
        assert!(post.category.is_none());
        assert_eq!(post.permalink, "https://example.org/?p=12");
    }

    #[test]
    fn forum_row_links_to_topic() {
        let row = ForumPostRow {
            id: 1,
            topic_id: 44,
            forum_id: 2,
            author_id: Some(0),
            author_name: String::new(),
            title: "RE: x".into(),
            body: "b".into(),
            created: at(4, 9),
            thread_subject: "x".into(),
            forum_name: "General".into(),
        };
        let post = forum_post_to_domain(row, "https://example.org/community/");
        assert_eq!(post.url, "https://example.org/community/topic/44");
        assert_eq!(post.author_id, None);
        assert!(post.is_reply());
    }

    #[test]
    fn emails_and_patterns() {
        let emails = dedup_emails(vec![
            "A@example.org".into(),
            "a@example.org ".into(),
            "".into(),
            "b@example.org".into(),
        ]);
        assert_eq!(emails, vec!["a@example.org", "b@example.org"]);
        assert_eq!(capability_pattern("subscriber"), "%\"subscriber\"%");
        assert_eq!(capability_pattern("shop_manager"), "%\"shop\\_manager\"%");
    }
}
