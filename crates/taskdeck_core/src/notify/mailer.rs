//! Outbound reminder mail.
//!
//! # Responsibility
//! - Define the mail hand-off seam used by hosts.
//! - Compose one digest message from a batch of reminder notices.
//!
//! # Invariants
//! - Log lines carry mail metadata only, never addresses or bodies.

use super::tracker::ReminderNotice;
use crate::model::task::Task;
use log::info;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug)]
pub enum MailError {
    /// Recipient or sender address could not be parsed.
    InvalidAddress(String),
    /// Message could not be assembled.
    Build(String),
    /// Transport rejected or failed to deliver the message.
    Transport(String),
}

impl Display for MailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAddress(details) => write!(f, "invalid mail address: {details}"),
            Self::Build(details) => write!(f, "failed to build mail: {details}"),
            Self::Transport(details) => write!(f, "mail transport failed: {details}"),
        }
    }
}

impl Error for MailError {}

pub trait Mailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Mailer that records messages and logs their hand-off.
#[derive(Debug, Default)]
pub struct LogMailer {
    sent: RefCell<Vec<OutgoingMail>>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.borrow().clone()
    }
}

impl Mailer for LogMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if mail.to.trim().is_empty() {
            return Err(MailError::InvalidAddress("recipient is empty".to_string()));
        }
        info!(
            "event=mail_send module=notify status=ok transport=log body_chars={}",
            mail.body.chars().count()
        );
        self.sent.borrow_mut().push(mail.clone());
        Ok(())
    }
}

#[cfg(feature = "smtp")]
pub use smtp::SmtpMailer;

#[cfg(feature = "smtp")]
mod smtp {
    use super::{MailError, Mailer, OutgoingMail};
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{Message, SmtpTransport, Transport};
    use log::info;

    /// Mailer delivering through an SMTP relay.
    pub struct SmtpMailer {
        transport: SmtpTransport,
        from: String,
    }

    impl SmtpMailer {
        pub fn new(host: &str, user: &str, password: &str, from: &str) -> Result<Self, MailError> {
            let credentials = Credentials::new(user.to_string(), password.to_string());
            let transport = SmtpTransport::relay(host)
                .map_err(|err| MailError::Transport(err.to_string()))?
                .credentials(credentials)
                .build();
            Ok(Self {
                transport,
                from: from.to_string(),
            })
        }
    }

    impl Mailer for SmtpMailer {
        fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
            let message = Message::builder()
                .from(
                    self.from
                        .parse()
                        .map_err(|err| MailError::InvalidAddress(format!("{err}")))?,
                )
                .to(mail
                    .to
                    .parse()
                    .map_err(|err| MailError::InvalidAddress(format!("{err}")))?)
                .subject(mail.subject.clone())
                .body(mail.body.clone())
                .map_err(|err| MailError::Build(err.to_string()))?;

            self.transport
                .send(&message)
                .map_err(|err| MailError::Transport(err.to_string()))?;
            info!("event=mail_send module=notify status=ok transport=smtp");
            Ok(())
        }
    }
}

/// Composes a reminder digest for `notices`.
///
/// `tasks` resolves overdue task IDs to titles and due dates. Returns `None`
/// when there is nothing to announce.
pub fn reminder_mail(recipient: &str, notices: &[ReminderNotice], tasks: &[Task]) -> Option<OutgoingMail> {
    if notices.is_empty() {
        return None;
    }

    let mut overdue = 0;
    let mut lines = Vec::with_capacity(notices.len());
    for notice in notices {
        match notice {
            ReminderNotice::Overdue { task } => {
                overdue += 1;
                let found = tasks.iter().find(|candidate| candidate.id == *task);
                let line = match found {
                    Some(task) => match task.due_at {
                        Some(due) => format!(
                            "Task \"{}\" is overdue (due {}).",
                            task.title,
                            due.format("%Y-%m-%d")
                        ),
                        None => format!("Task \"{}\" is overdue.", task.title),
                    },
                    None => format!("Task {task} is overdue."),
                };
                lines.push(line);
            }
            ReminderNotice::DueToday { count } => {
                lines.push(format!("{count} task(s) due today."));
            }
            ReminderNotice::DueTomorrow { count } => {
                lines.push(format!("{count} task(s) due tomorrow."));
            }
        }
    }

    let subject = if overdue > 0 {
        format!("Task reminders: {overdue} overdue")
    } else {
        "Task reminders".to_string()
    };

    Some(OutgoingMail {
        to: recipient.to_string(),
        subject,
        body: lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::{reminder_mail, LogMailer, Mailer, OutgoingMail};
    use crate::model::task::Task;
    use crate::notify::ReminderNotice;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn reminder_mail_lists_overdue_titles_and_counts() {
        let due = NaiveDate::from_ymd_opt(2024, 6, 8)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let task = Task::new(Uuid::new_v4(), "File taxes", due).with_due(due);
        let notices = [
            ReminderNotice::Overdue { task: task.id },
            ReminderNotice::DueToday { count: 2 },
        ];

        let mail = reminder_mail("me@example.com", &notices, &[task]).unwrap();
        assert_eq!(mail.subject, "Task reminders: 1 overdue");
        assert_eq!(
            mail.body,
            "Task \"File taxes\" is overdue (due 2024-06-08).\n2 task(s) due today."
        );
        assert!(reminder_mail("me@example.com", &[], &[]).is_none());
    }

    #[test]
    fn log_mailer_records_and_rejects_blank_recipient() {
        let mailer = LogMailer::new();
        let mail = OutgoingMail {
            to: "me@example.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        mailer.send(&mail).unwrap();
        assert_eq!(mailer.sent(), vec![mail]);

        let blank = OutgoingMail {
            to: " ".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        assert!(mailer.send(&blank).is_err());
    }
}
