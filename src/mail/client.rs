use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;
use walkdir::WalkDir;

use super::connect::{Mailbox, MessageIter};
use super::types::{Address, InboxMessage};

/// Inbox read straight off a maildir on disk, newest delivery first.
pub struct MaildirMailbox {
    root: PathBuf,
}

impl MaildirMailbox {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl Mailbox for MaildirMailbox {
    fn name(&self) -> String {
        self.root.display().to_string()
    }

    fn messages(&self) -> Result<MessageIter<'_>> {
        // cur/ holds seen mail, new/ unseen; both belong to the inbox
        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        for subdir in ["cur", "new"] {
            let dir = self.root.join(subdir);
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).into_iter().flatten() {
                if !entry.file_type().is_file() {
                    continue;
                }
                let mtime = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                files.push((mtime, entry.into_path()));
            }
        }

        // maildir delivery stamps the mtime, so mtime order is receive order
        files.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(Box::new(files.into_iter().map(|(_, path)| {
            parse_mail_file(&path).with_context(|| format!("could not process {}", path.display()))
        })))
    }
}

/// Inbox listed through the user's notmuch index.
pub struct NotmuchMailbox;

impl NotmuchMailbox {
    /// Cheap probe for a working notmuch database.
    pub fn available() -> Result<()> {
        let output = Command::new("notmuch")
            .args(["count", "*"])
            .output()
            .context("failed to run notmuch")?;
        if !output.status.success() {
            return Err(anyhow!(
                "notmuch count failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(())
    }
}

impl Mailbox for NotmuchMailbox {
    fn name(&self) -> String {
        "notmuch".to_string()
    }

    fn messages(&self) -> Result<MessageIter<'_>> {
        // notmuch does the sorting; files come back one per line
        let output = Command::new("notmuch")
            .args(["search", "--output=files", "--sort=newest-first", "*"])
            .output()
            .context("failed to run notmuch")?;
        if !output.status.success() {
            return Err(anyhow!(
                "notmuch search failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let files: Vec<PathBuf> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(PathBuf::from)
            .collect();

        Ok(Box::new(files.into_iter().map(|path| {
            parse_mail_file(&path).with_context(|| format!("could not process {}", path.display()))
        })))
    }
}

/// Extract the fields we keep from one on-disk message.
fn parse_mail_file(path: &Path) -> Result<InboxMessage> {
    let raw = std::fs::read(path)?;
    let message = mail_parser::MessageParser::default()
        .parse(&raw)
        .ok_or_else(|| anyhow!("unparseable message"))?;

    let received = message
        .date()
        .and_then(|d| local_naive(d.to_timestamp()))
        .ok_or_else(|| anyhow!("missing or invalid Date header"))?;

    let sender = message
        .from()
        .and_then(|a| a.first())
        .map(|addr| Address {
            name: addr.name().map(str::to_string),
            addr: addr.address().unwrap_or_default().to_string(),
        })
        .ok_or_else(|| anyhow!("missing From header"))?;

    let subject = message.subject().unwrap_or_default().to_string();
    let body = message_body(&message)?;

    Ok(InboxMessage {
        subject,
        sender,
        body,
        received,
    })
}

fn local_naive(ts: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&Local).naive_local())
}

/// Prefer the plain-text body; render HTML when that is all there is.
fn message_body(message: &mail_parser::Message) -> Result<String> {
    if let Some(text) = message.body_text(0) {
        return Ok(text.to_string());
    }
    if let Some(html) = message.body_html(0) {
        return render_html(&html);
    }
    Ok(String::new())
}

/// Dump HTML to plain text via w3m, falling back to the raw markup when
/// w3m is not installed.
pub(crate) fn render_html(html: &str) -> Result<String> {
    use std::io::Write;
    use std::process::Stdio;

    let child = Command::new("w3m")
        .args(["-dump", "-T", "text/html", "-cols", "120"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn();

    let mut child = match child {
        Ok(c) => c,
        Err(_) => return Ok(html.to_string()),
    };

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(html.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
