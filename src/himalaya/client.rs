use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDateTime};
use std::process::Command;

use super::types::{Account, Envelope};
use crate::config::HimalayaConfig;
use crate::mail::client::render_html;
use crate::mail::connect::{Mailbox, MessageIter};
use crate::mail::types::{Address, InboxMessage};

pub fn list_accounts() -> Result<Vec<Account>> {
    let output = Command::new("himalaya")
        .args(["account", "list", "--output", "json"])
        .output()
        .context("failed to run himalaya")?;
    if !output.status.success() {
        return Err(anyhow!(
            "himalaya account list failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let accounts: Vec<Account> = serde_json::from_slice(&output.stdout)?;
    Ok(accounts)
}

pub fn list_envelopes(opts: &HimalayaConfig) -> Result<Vec<Envelope>> {
    let mut cmd = Command::new("himalaya");
    cmd.args(["envelope", "list", "--output", "json"]);
    cmd.args(["--folder", &opts.folder]);
    cmd.args(["--page-size", &opts.page_size.to_string()]);
    if let Some(acc) = &opts.account {
        cmd.args(["--account", acc]);
    }

    let output = cmd.output().context("failed to run himalaya")?;
    if !output.status.success() {
        return Err(anyhow!(
            "himalaya envelope list failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let envelopes: Vec<Envelope> = serde_json::from_slice(&output.stdout)?;
    Ok(envelopes)
}

pub fn read_message(id: &str, account: Option<&str>) -> Result<String> {
    let mut cmd = Command::new("himalaya");
    cmd.args(["message", "read", id]);
    if let Some(acc) = account {
        cmd.args(["--account", acc]);
    }

    let output = cmd.output().context("failed to run himalaya")?;
    if !output.status.success() {
        return Err(anyhow!(
            "himalaya message read {} failed: {}",
            id,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let raw = String::from_utf8_lossy(&output.stdout).to_string();
    if looks_like_html(&raw) {
        render_html(&raw)
    } else {
        Ok(raw)
    }
}

fn looks_like_html(content: &str) -> bool {
    content.contains("<html")
        || content.contains("<HTML")
        || content.contains("<div")
        || content.contains("<p>")
}

/// himalaya prints envelope dates like "2024-03-08 09:15+01:00"; some
/// versions emit RFC 3339 or drop the offset entirely.
fn parse_envelope_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    None
}

/// Inbox behind the user's configured himalaya session. Envelopes are
/// listed up front (cheap); bodies are fetched one message at a time while
/// iterating, so stopping early skips the expensive reads.
pub struct HimalayaMailbox {
    opts: HimalayaConfig,
}

impl HimalayaMailbox {
    pub fn new(opts: HimalayaConfig) -> Self {
        Self { opts }
    }
}

impl Mailbox for HimalayaMailbox {
    fn name(&self) -> String {
        match &self.opts.account {
            Some(acc) => format!("{} ({})", self.opts.folder, acc),
            None => self.opts.folder.clone(),
        }
    }

    fn messages(&self) -> Result<MessageIter<'_>> {
        let listed = list_envelopes(&self.opts)?;

        let mut undated: Vec<anyhow::Result<InboxMessage>> = Vec::new();
        let mut dated: Vec<(NaiveDateTime, Envelope)> = Vec::new();
        for envelope in listed {
            match envelope.date.as_deref().and_then(parse_envelope_date) {
                Some(received) => dated.push((received, envelope)),
                None => undated.push(Err(anyhow!(
                    "envelope {}: unparseable date {:?}",
                    envelope.id,
                    envelope.date
                ))),
            }
        }
        dated.sort_by(|a, b| b.0.cmp(&a.0));

        let account = self.opts.account.clone();
        let bodies = dated.into_iter().map(move |(received, envelope)| {
            let body = read_message(&envelope.id, account.as_deref())
                .with_context(|| format!("could not read message {}", envelope.id))?;
            Ok(InboxMessage {
                subject: envelope.subject.unwrap_or_default(),
                sender: envelope.from.unwrap_or(Address {
                    name: None,
                    addr: String::new(),
                }),
                body,
                received,
            })
        });

        Ok(Box::new(undated.into_iter().chain(bodies)))
    }
}
