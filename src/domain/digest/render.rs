//! Digest assembler: content + design -> one self-contained HTML document.

use crate::domain::entities::{BlogPost, Digest, ForumPost};
use crate::domain::settings::{DesignTokens, Language};
use crate::domain::window::DateWindow;

use super::html::{escape_html, nl2br, safe_url};
use super::labels::Labels;
use super::quote::format_quotes;
use super::style::Theme;
use super::truncate::truncate_html_words;

/// Words kept in each excerpt.
pub const EXCERPT_WORDS: usize = 40;

/// Placeholder in the intro text.
pub const COUNT_PLACEHOLDER: &str = "{count}";

/// Links back to the site used by the "nothing new" card.
#[derive(Debug, Clone)]
pub struct SiteLinks {
    pub home_url: String,
    pub forum_url: String,
}

/// Everything besides content that shapes the document.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub design: &'a DesignTokens,
    pub language: Language,
    pub links: &'a SiteLinks,
    pub include_wp: bool,
    pub include_forum: bool,
}

/// Replace every `{count}` with `count`.
pub fn substitute_count(intro: &str, count: usize) -> String {
    intro.replace(COUNT_PLACEHOLDER, &count.to_string())
}

/// Mail subject: the configured subject plus the covered date range.
pub fn compose_subject(subject: &str, window: Option<&DateWindow>) -> String {
    match window {
        Some(w) => format!("{} ({})", subject.trim(), w),
        None => subject.trim().to_string(),
    }
}

/// Render the digest. Sources switched off in `opts` render as empty.
pub fn render_digest(digest: &Digest, opts: &RenderOptions<'_>) -> String {
    let labels = Labels::for_language(opts.language);
    let design = opts.design;
    let theme = Theme::from_tokens(design);

    let blog: &[BlogPost] = if opts.include_wp { &digest.blog_posts } else { &[] };
    let forum_count = if opts.include_forum { digest.forum_post_count() } else { 0 };
    let count = blog.len() + forum_count;

    let title = escape_html(design.header_title.trim());
    let mut body = String::new();

    body.push_str("<div class=\"header\">");
    if design.logo_url.trim().is_empty() {
        body.push_str(&format!("<h1>{}</h1>", title));
        if !design.header_subtitle.trim().is_empty() {
            body.push_str(&format!(
                "<p class=\"subtitle\">{}</p>",
                escape_html(design.header_subtitle.trim())
            ));
        }
    } else {
        body.push_str(&format!(
            "<img class=\"logo\" src=\"{}\" alt=\"{}\" />",
            safe_url(&design.logo_url),
            title
        ));
    }
    body.push_str("</div>");

    let intro = substitute_count(&design.intro_text, count);
    if !intro.trim().is_empty() {
        body.push_str(&format!(
            "<div class=\"intro\"><strong>{}</strong></div>",
            escape_html(&intro)
        ));
    }

    if count == 0 {
        render_empty(&mut body, labels, opts.links);
    } else {
        if !blog.is_empty() {
            render_blog_section(&mut body, labels, blog);
        }
        if forum_count > 0 {
            render_forum_section(&mut body, labels, digest);
        }
    }

    if !design.footer_text.trim().is_empty() {
        body.push_str(&format!(
            "<div class=\"footer\">{}</div>",
            nl2br(&escape_html(design.footer_text.trim()))
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
         <title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n<div class=\"content\">\n{}\n</div>\n</body>\n</html>\n",
        title,
        theme.css(),
        body
    )
}

fn render_empty(out: &mut String, labels: &Labels, links: &SiteLinks) {
    out.push_str(&format!(
        "<div class=\"card empty\"><p class=\"message\">{}</p>\
         <p class=\"empty-links\"><a href=\"{}\">{}</a><a href=\"{}\">{}</a></p>\
         <p class=\"hint\">{}</p></div>",
        escape_html(labels.nothing_new),
        safe_url(&links.home_url),
        escape_html(labels.go_to_site),
        safe_url(&links.forum_url),
        escape_html(labels.go_to_forum),
        escape_html(labels.nothing_new_hint),
    ));
}

/// Group by first category in order of first appearance.
fn group_by_category<'a>(posts: &'a [BlogPost], uncategorized: &str) -> Vec<(String, Vec<&'a BlogPost>)> {
    let mut groups: Vec<(String, String, Vec<&BlogPost>)> = Vec::new();
    for post in posts {
        let (slug, name) = match &post.category {
            Some(c) => (c.slug.clone(), c.name.clone()),
            None => (String::new(), uncategorized.to_string()),
        };
        match groups.iter_mut().find(|(s, _, _)| *s == slug) {
            Some((_, _, list)) => list.push(post),
            None => groups.push((slug, name, vec![post])),
        }
    }
    groups.into_iter().map(|(_, name, list)| (name, list)).collect()
}

fn excerpt(html: &str) -> String {
    truncate_html_words(&format_quotes(html), EXCERPT_WORDS)
}

fn render_blog_section(out: &mut String, labels: &Labels, posts: &[BlogPost]) {
    out.push_str(&format!(
        "<section class=\"wp-posts\"><h2 class=\"section-title\">{}</h2>",
        escape_html(labels.blog_section)
    ));
    for (category, list) in group_by_category(posts, labels.uncategorized) {
        out.push_str(&format!(
            "<div class=\"forum-header\"><span class=\"category-label\">{}</span></div>",
            escape_html(&category)
        ));
        for post in list {
            let url = safe_url(&post.permalink);
            out.push_str("<div class=\"card post-card\">");
            out.push_str(&format!(
                "<div class=\"post-title\"><a href=\"{}\">{}</a></div>",
                url,
                escape_html(&post.title)
            ));
            out.push_str(&format!(
                "<div class=\"post-meta\">{}</div>",
                post.published.format("%d.%m.%Y")
            ));
            out.push_str(&format!(
                "<div class=\"post-excerpt\">{}</div>",
                excerpt(&post.content)
            ));
            out.push_str(&format!(
                "<div class=\"post-readmore\"><a href=\"{}\">{}</a></div>",
                url,
                escape_html(labels.read_more_blog)
            ));
            out.push_str("</div>");
        }
    }
    out.push_str("</section>");
}

fn render_forum_section(out: &mut String, labels: &Labels, digest: &Digest) {
    out.push_str(&format!(
        "<section class=\"forum-section\"><h2 class=\"section-title\">{}</h2>",
        escape_html(labels.forum_section)
    ));
    for forum in &digest.forums {
        out.push_str(&format!(
            "<div class=\"forum-header\"><span class=\"category-label\">{}</span><span class=\"forum-name\">{}</span></div>",
            escape_html(labels.category),
            escape_html(&forum.name)
        ));
        for thread in &forum.threads {
            out.push_str(&format!(
                "<div class=\"thread-header\"><span class=\"topic-label\">{}</span><span class=\"thread-name\">{}</span></div>",
                escape_html(labels.topic),
                escape_html(&thread.subject)
            ));
            for post in &thread.posts {
                render_forum_post(out, labels, post);
            }
        }
    }
    out.push_str("</section>");
}

fn render_forum_post(out: &mut String, labels: &Labels, post: &ForumPost) {
    let url = safe_url(&post.url);
    out.push_str("<div class=\"card forum-post\">");
    if post.is_reply() {
        out.push_str(&format!(
            "<div class=\"post-title\"><span class=\"reply-label\">{}</span></div>",
            escape_html(labels.reply)
        ));
    } else {
        out.push_str(&format!(
            "<div class=\"post-title\"><a href=\"{}\">{}</a></div>",
            url,
            escape_html(&post.title)
        ));
    }
    let when = post.created.format("%d.%m.%Y %H:%M");
    let meta = if post.author_name.trim().is_empty() {
        when.to_string()
    } else {
        format!("{} &middot; {}", escape_html(post.author_name.trim()), when)
    };
    out.push_str(&format!("<div class=\"post-meta\">{}</div>", meta));
    out.push_str(&format!(
        "<div class=\"post-excerpt\">{}</div>",
        excerpt(&post.body)
    ));
    out.push_str(&format!(
        "<div class=\"post-readmore\"><a href=\"{}\">{}</a></div>",
        url,
        escape_html(labels.read_more_forum)
    ));
    out.push_str("</div>");
}
