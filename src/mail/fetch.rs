use anyhow::Result;
use chrono::NaiveDate;

use super::connect::Mailbox;
use super::types::Message;

/// Collect the day batch for `target`: every message received on that
/// calendar date, in fetch order (newest first).
///
/// The mailbox iterates in descending received order, so the first message
/// dated strictly before the target day ends the walk and nothing past it
/// is pulled from the iterator. Messages that fail extraction are skipped
/// with a warning.
pub fn day_batch(mailbox: &dyn Mailbox, target: NaiveDate) -> Result<Vec<Message>> {
    println!("Searching inbox: {}", mailbox.name());

    let mut batch = Vec::new();
    for item in mailbox.messages()? {
        match item {
            Ok(msg) => {
                let date = msg.received.date();
                if date == target {
                    batch.push(Message::from(msg));
                } else if date < target {
                    break;
                }
                // received after the target day: keep walking down
            }
            Err(e) => eprintln!("Warning: could not process email: {:#}", e),
        }
    }

    Ok(batch)
}
