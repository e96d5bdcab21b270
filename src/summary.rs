use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::mail::types::Message;

pub const RECORDS_FILE: &str = "emails.json";
pub const PROMPT_FILE: &str = "email_summary_prompt.txt";

/// Per-date output directory, created on demand.
pub fn date_dir(output_dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let dir = output_dir.join(date.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&dir).with_context(|| format!("could not create {}", dir.display()))?;
    Ok(dir)
}

/// Write the day batch as pretty-printed JSON, replacing any previous run's
/// file for the same date.
pub fn write_records(dir: &Path, batch: &[Message]) -> Result<PathBuf> {
    let path = dir.join(RECORDS_FILE);
    let file =
        fs::File::create(&path).with_context(|| format!("could not create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), batch)
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(path)
}

/// Render the summarization prompt for one day batch: a dated header, then
/// one block per message in fetch order, separated by a 50-dash rule.
pub fn render_prompt(date: NaiveDate, batch: &[Message]) -> String {
    let mut prompt = format!(
        "Please summarize the following emails from {}.\n\
         Group them by topic and highlight important information:\n",
        date.format("%m/%d/%Y")
    );

    for (i, message) in batch.iter().enumerate() {
        prompt.push_str(&format!("\nEmail {}:\n", i + 1));
        prompt.push_str(&format!("From: {} ({})\n", message.sender, message.sender_email));
        prompt.push_str(&format!("Subject: {}\n", message.subject));
        prompt.push_str(&format!("Received at: {}\n", message.received.format("%H:%M:%S")));
        prompt.push_str(&format!("Content: {}\n", message.body));
        prompt.push_str(&"-".repeat(50));
        prompt.push('\n');
    }

    prompt
}

pub fn write_prompt(dir: &Path, prompt: &str) -> Result<PathBuf> {
    let path = dir.join(PROMPT_FILE);
    fs::write(&path, prompt).with_context(|| format!("could not write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn batch() -> Vec<Message> {
        vec![
            Message {
                subject: "Deploy window".to_string(),
                sender: "Dana Ortiz".to_string(),
                sender_email: "dana@example.com".to_string(),
                body: "We deploy at noon.".to_string(),
                received: NaiveTime::from_hms_opt(11, 2, 33).expect("valid time"),
            },
            Message {
                subject: "Re: Deploy window".to_string(),
                sender: "Sam Lee".to_string(),
                sender_email: "sam@example.com".to_string(),
                body: "Works for me.".to_string(),
                received: NaiveTime::from_hms_opt(10, 15, 0).expect("valid time"),
            },
        ]
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).expect("valid date")
    }

    #[test]
    fn records_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let date_dir = date_dir(dir.path(), day()).expect("creates dir");
        assert!(date_dir.ends_with("2026-08-07"));

        let written = batch();
        let path = write_records(&date_dir, &written).expect("writes");
        let content = fs::read_to_string(&path).expect("reads back");
        let read: Vec<Message> = serde_json::from_str(&content).expect("decodes");
        assert_eq!(read, written);
    }

    #[test]
    fn rerun_overwrites_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let date_dir = date_dir(dir.path(), day()).expect("creates dir");

        write_records(&date_dir, &batch()).expect("first write");
        let second = vec![batch().remove(1)];
        let path = write_records(&date_dir, &second).expect("second write");

        let read: Vec<Message> =
            serde_json::from_str(&fs::read_to_string(&path).expect("reads")).expect("decodes");
        assert_eq!(read, second);
    }

    #[test]
    fn prompt_has_header_blocks_and_rule() {
        let prompt = render_prompt(day(), &batch());

        assert!(prompt.starts_with("Please summarize the following emails from 08/07/2026.\n"));
        assert!(prompt.contains("Group them by topic and highlight important information:\n"));
        assert!(prompt.contains("\nEmail 1:\nFrom: Dana Ortiz (dana@example.com)\n"));
        assert!(prompt.contains("Subject: Deploy window\n"));
        assert!(prompt.contains("Received at: 11:02:33\n"));
        assert!(prompt.contains("Content: We deploy at noon.\n"));
        assert!(prompt.contains("\nEmail 2:\n"));
        assert_eq!(prompt.matches(&"-".repeat(50)).count(), 2);
    }

    #[test]
    fn prompt_for_empty_batch_is_just_the_header() {
        let prompt = render_prompt(day(), &[]);
        assert!(prompt.contains("08/07/2026"));
        assert!(!prompt.contains("Email 1:"));
    }

    #[test]
    fn prompt_file_lands_next_to_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let date_dir = date_dir(dir.path(), day()).expect("creates dir");
        let path = write_prompt(&date_dir, "prompt text").expect("writes");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(PROMPT_FILE));
        assert_eq!(fs::read_to_string(path).expect("reads"), "prompt text");
    }
}
