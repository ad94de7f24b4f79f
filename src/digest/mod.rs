//! # Digest
//!
//! HTML rendering of a ranking report and its delivery over SMTP.

pub mod mail;
pub mod render;

pub use mail::{subject_for, MailSettings, Mailer};
pub use render::{escape_html, render_digest};
