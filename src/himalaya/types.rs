use serde::Deserialize;

use crate::mail::types::Address;

/// One row of `himalaya envelope list --output json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub id: String,
    pub subject: Option<String>,
    pub from: Option<Address>,
    pub date: Option<String>,
}

/// One row of `himalaya account list --output json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub name: String,
    pub backend: String,
    pub default: bool,
}
