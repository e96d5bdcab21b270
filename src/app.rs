use anyhow::{Result, bail};
use chrono::{Duration, Local, NaiveDate};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::mail::connect::{self, Mailbox};
use crate::mail::fetch;
use crate::mail::filter::ExclusionList;
use crate::summary;

const DAYS_PROMPT: &str =
    "How many days back would you like to retrieve emails for? (0 = today only): ";

/// Ask the operator for the day count, re-prompting until a line parses as
/// a non-negative integer.
pub fn prompt_days(input: &mut impl BufRead, output: &mut impl Write) -> Result<u32> {
    loop {
        write!(output, "{DAYS_PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("input closed before a day count was given");
        }

        match line.trim().parse::<i64>() {
            Ok(n) if n < 0 => writeln!(output, "Please enter a positive number or 0.")?,
            Ok(n) => match u32::try_from(n) {
                Ok(days) => return Ok(days),
                Err(_) => writeln!(output, "Please enter a valid number.")?,
            },
            Err(_) => writeln!(output, "Please enter a valid number.")?,
        }
    }
}

/// The dates to process: today, then one per extra day going back.
pub fn dates_back(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..=i64::from(days))
        .map(|offset| today - Duration::days(offset))
        .collect()
}

/// Process `days` back from today over a single mail session. A day that
/// fails is reported and does not stop the days after it.
pub fn run(config: &Config, days: u32) -> Result<()> {
    let mailbox = connect::connect(config)?;
    let exclusions = ExclusionList::new(&config.excluded_senders);
    let output_dir = config.output_path();

    for date in dates_back(Local::now().date_naive(), days) {
        if let Err(e) = process_date(mailbox.as_ref(), &exclusions, &output_dir, date) {
            eprintln!("Error processing {}: {:#}", date.format("%m/%d/%Y"), e);
        }
    }

    println!("\nProcessing completed!");
    println!("You can find the files in {}.", output_dir.display());
    Ok(())
}

fn process_date(
    mailbox: &dyn Mailbox,
    exclusions: &ExclusionList,
    output_dir: &Path,
    date: NaiveDate,
) -> Result<()> {
    println!("\nProcessing emails for {}...", date.format("%m/%d/%Y"));

    let batch = fetch::day_batch(mailbox, date)?;
    let (kept, excluded) = exclusions.apply(batch);
    println!("Filtered emails for {}: {}", date.format("%Y-%m-%d"), excluded);

    if kept.is_empty() {
        println!("No emails found for {}.", date.format("%m/%d/%Y"));
        return Ok(());
    }

    println!("{} relevant emails found.", kept.len());

    let dir = summary::date_dir(output_dir, date)?;
    let records = summary::write_records(&dir, &kept)?;
    println!("Emails have been saved to {}", records.display());

    let prompt = summary::render_prompt(date, &kept);
    let prompt_path = summary::write_prompt(&dir, &prompt)?;
    println!("Prompt has been saved to {}", prompt_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::connect::MessageIter;
    use crate::mail::types::{Address, InboxMessage, Message};
    use chrono::NaiveDateTime;
    use std::fs;
    use std::io::Cursor;

    fn ask(input: &str) -> (Result<u32>, String) {
        let mut output = Vec::new();
        let days = prompt_days(&mut Cursor::new(input), &mut output);
        (days, String::from_utf8(output).expect("utf8 output"))
    }

    #[test]
    fn accepts_zero_and_positive_counts() {
        let (days, _) = ask("0\n");
        assert_eq!(days.expect("valid input"), 0);
        let (days, _) = ask("5\n");
        assert_eq!(days.expect("valid input"), 5);
    }

    #[test]
    fn reprompts_on_junk() {
        let (days, output) = ask("three\n2\n");
        assert_eq!(days.expect("eventually valid"), 2);
        assert!(output.contains("Please enter a valid number."));
        assert_eq!(output.matches(DAYS_PROMPT).count(), 2);
    }

    #[test]
    fn reprompts_on_negative() {
        let (days, output) = ask("-3\n1\n");
        assert_eq!(days.expect("eventually valid"), 1);
        assert!(output.contains("Please enter a positive number or 0."));
    }

    #[test]
    fn closed_input_is_an_error() {
        let (days, _) = ask("");
        assert!(days.is_err());
    }

    #[test]
    fn zero_days_means_today_only() {
        let today = "2026-08-07".parse().expect("valid date");
        assert_eq!(dates_back(today, 0), vec![today]);
    }

    #[test]
    fn dates_go_back_one_per_day() {
        let today: NaiveDate = "2026-08-07".parse().expect("valid date");
        let dates = dates_back(today, 2);
        let expected: Vec<NaiveDate> = ["2026-08-07", "2026-08-06", "2026-08-05"]
            .iter()
            .map(|s| s.parse().expect("valid date"))
            .collect();
        assert_eq!(dates, expected);
    }

    struct Scripted(Vec<InboxMessage>);

    impl Mailbox for Scripted {
        fn name(&self) -> String {
            "scripted".to_string()
        }

        fn messages(&self) -> Result<MessageIter<'_>> {
            Ok(Box::new(self.0.clone().into_iter().map(Ok)))
        }
    }

    fn on_day(ts: &str, addr: &str) -> InboxMessage {
        InboxMessage {
            subject: format!("from {addr}"),
            sender: Address {
                name: None,
                addr: addr.to_string(),
            },
            body: "body".to_string(),
            received: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
                .expect("valid timestamp"),
        }
    }

    #[test]
    fn empty_day_leaves_no_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let date = "2026-08-07".parse().expect("valid date");

        let mailbox = Scripted(vec![]);
        process_date(&mailbox, &ExclusionList::new(&[]), dir.path(), date).expect("processes");

        assert_eq!(fs::read_dir(dir.path()).expect("lists").count(), 0);
    }

    #[test]
    fn day_with_mail_writes_filtered_records_and_prompt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let date = "2026-08-07".parse().expect("valid date");

        // three on the day, one of them from an excluded sender
        let mailbox = Scripted(vec![
            on_day("2026-08-07 16:20:00", "dana@example.com"),
            on_day("2026-08-07 11:05:00", "noreply@example.com"),
            on_day("2026-08-07 08:40:00", "sam@example.com"),
        ]);
        let exclusions = ExclusionList::new(&["NOREPLY@example.com".to_string()]);
        process_date(&mailbox, &exclusions, dir.path(), date).expect("processes");

        let date_dir = dir.path().join("2026-08-07");
        let records: Vec<Message> = serde_json::from_str(
            &fs::read_to_string(date_dir.join(summary::RECORDS_FILE)).expect("records written"),
        )
        .expect("valid json");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.sender_email != "noreply@example.com"));

        let prompt = fs::read_to_string(date_dir.join(summary::PROMPT_FILE)).expect("prompt written");
        assert!(prompt.contains("Email 2:"));
        assert!(!prompt.contains("noreply@example.com"));
    }
}
