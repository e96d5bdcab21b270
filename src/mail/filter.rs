use std::collections::HashSet;

use super::types::Message;

/// Configured senders to leave out of the output. Addresses are compared
/// case-insensitively, whole-address.
pub struct ExclusionList {
    addresses: HashSet<String>,
}

impl ExclusionList {
    pub fn new(addresses: &[String]) -> Self {
        Self {
            addresses: addresses.iter().map(|a| a.trim().to_lowercase()).collect(),
        }
    }

    pub fn is_excluded(&self, sender_email: &str) -> bool {
        self.addresses.contains(&sender_email.to_lowercase())
    }

    /// Split a day batch into the records to keep and the number dropped.
    /// Keeps fetch order; no side effects.
    pub fn apply(&self, batch: Vec<Message>) -> (Vec<Message>, usize) {
        let before = batch.len();
        let kept: Vec<Message> = batch
            .into_iter()
            .filter(|m| !self.is_excluded(&m.sender_email))
            .collect();
        let excluded = before - kept.len();
        (kept, excluded)
    }
}
