//! `taskdeck reminders` command implementation

use anyhow::{bail, Result};
use clap::Args;
use log::info;
use taskdeck_core::db::Connection;
use taskdeck_core::notify::{reminder_mail, LogMailer, Mailer, ReminderNotice, ReminderTracker};
use taskdeck_core::{SqliteTaskRepository, Task, TaskFilter, TaskService};

use super::{now, project_service};
use crate::config::{Config, MailConfig};

#[derive(Args)]
pub struct RemindersArgs {
    /// Send the digest to the configured recipient
    #[arg(long)]
    email: bool,

    /// Recipient override
    #[arg(long, requires = "email")]
    to: Option<String>,
}

pub fn run(conn: &Connection, config: &Config, args: RemindersArgs) -> Result<()> {
    let at = now();
    let tasks = TaskService::new(SqliteTaskRepository::try_new(conn)?)
        .all_tasks(&TaskFilter::default())?;

    let mut tracker = ReminderTracker::new();
    let notices = tracker.observe(&tasks, at);
    let projects = project_service(conn)?.due_project_reminders(at.date())?;

    if notices.is_empty() && projects.is_empty() {
        println!("No reminders.");
    }
    for notice in &notices {
        println!("{}", describe(notice, &tasks));
    }
    for project in &projects {
        println!("Project reminder: {}", project.title);
    }

    if !args.email {
        return Ok(());
    }

    let recipient = match args.to.as_deref().or(config.mail.recipient.as_deref()) {
        Some(recipient) => recipient.to_string(),
        None => bail!("No mail recipient: set [mail] recipient in config.toml or pass --to"),
    };
    let Some(mail) = reminder_mail(&recipient, &notices, &tasks) else {
        println!("Nothing to send.");
        return Ok(());
    };

    let mailer = build_mailer(&config.mail)?;
    mailer.send(&mail)?;
    info!(
        "event=reminder_mail module=cli status=ok notices={}",
        notices.len()
    );
    println!("Sent reminder digest ({} notices)", notices.len());
    Ok(())
}

fn describe(notice: &ReminderNotice, tasks: &[Task]) -> String {
    match notice {
        ReminderNotice::Overdue { task } => {
            let title = tasks
                .iter()
                .find(|candidate| candidate.id == *task)
                .map(|candidate| candidate.title.as_str())
                .unwrap_or("?");
            format!("Task \"{title}\" is overdue!")
        }
        ReminderNotice::DueToday { count } => format!("{count} task(s) due today!"),
        ReminderNotice::DueTomorrow { count } => format!("{count} task(s) due tomorrow."),
    }
}

#[cfg(feature = "smtp")]
fn build_mailer(mail: &MailConfig) -> Result<Box<dyn Mailer>> {
    use taskdeck_core::notify::mailer::SmtpMailer;

    match (&mail.smtp_host, &mail.from) {
        (Some(host), Some(from)) => Ok(Box::new(SmtpMailer::new(
            host,
            mail.smtp_user.as_deref().unwrap_or_default(),
            mail.smtp_password.as_deref().unwrap_or_default(),
            from,
        )?)),
        _ => Ok(Box::new(LogMailer::new())),
    }
}

#[cfg(not(feature = "smtp"))]
fn build_mailer(mail: &MailConfig) -> Result<Box<dyn Mailer>> {
    if mail.smtp_host.is_some() {
        log::warn!("event=mailer_select module=cli status=fallback reason=smtp_feature_disabled");
    }
    Ok(Box::new(LogMailer::new()))
}
