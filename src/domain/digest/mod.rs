//! Digest assembly. Pure string building, no I/O.

pub mod html;
pub mod labels;
pub mod quote;
pub mod render;
pub mod style;
pub mod truncate;

pub use render::{
    EXCERPT_WORDS, RenderOptions, SiteLinks, compose_subject, render_digest, substitute_count,
};
pub use truncate::truncate_html_words;
