//! Host-side reminder plumbing.
//!
//! # Responsibility
//! - Turn repeated due-date classifications into one-shot notices.
//! - Compose and hand off reminder mail.
//!
//! # Invariants
//! - Bucket membership is always decided by `schedule::classify_due`; this
//!   module only deduplicates and delivers.

pub mod mailer;
pub mod tracker;

pub use mailer::{reminder_mail, LogMailer, MailError, Mailer, OutgoingMail};
pub use tracker::{ReminderNotice, ReminderTracker};
