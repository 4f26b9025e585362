//! Core domain layer. No external I/O dependencies.
//!
//! Entities, settings and the digest assembler live here. Dependencies flow inward.

pub mod digest;
pub mod entities;
pub mod errors;
pub mod mail;
pub mod schedule;
pub mod settings;
pub mod window;

pub use entities::{
    BlogPost, Category, Digest, ForumGroup, ForumPost, ThreadGroup, group_forum_posts,
};
pub use errors::DomainError;
pub use mail::{DispatchReport, OutgoingMail, SendOutcome, SmtpParams};
pub use schedule::ScheduledJob;
pub use settings::{
    DateRangeType, DesignTokens, Language, MailSettings, MailType, Settings, SmtpEncryption,
};
pub use window::DateWindow;
