use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Address {
    pub name: Option<String>,
    pub addr: String,
}

impl Address {
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.addr.clone())
    }
}

/// A message as a backend hands it over: decoded headers and body, plus the
/// full receive timestamp in local time so the fetcher can window on it.
#[derive(Debug, Clone)]
pub struct InboxMessage {
    pub subject: String,
    pub sender: Address,
    pub body: String,
    pub received: NaiveDateTime,
}

/// One record of a day batch, immutable once extracted. Struct order is the
/// on-disk JSON field order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub sender: String,
    pub sender_email: String,
    pub body: String,
    #[serde(with = "hms")]
    pub received: NaiveTime,
}

impl From<InboxMessage> for Message {
    fn from(msg: InboxMessage) -> Self {
        // records keep whole seconds only, same as the HH:MM:SS on disk
        let t = msg.received.time();
        let received = NaiveTime::from_hms_opt(t.hour(), t.minute(), t.second()).unwrap_or(t);
        Self {
            subject: msg.subject,
            sender: msg.sender.display_name(),
            sender_email: msg.sender.addr,
            body: msg.body,
            received,
        }
    }
}

/// HH:MM:SS (de)serialization for the record's received time
mod hms {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
