use anyhow::{Result, bail};

use super::client::{MaildirMailbox, NotmuchMailbox};
use super::types::InboxMessage;
use crate::config::Config;
use crate::himalaya;
use crate::himalaya::client::HimalayaMailbox;

/// Iterator over a mailbox, newest message first. Item errors are
/// per-message extraction failures; the caller decides how to react.
pub type MessageIter<'a> = Box<dyn Iterator<Item = Result<InboxMessage>> + 'a>;

/// Read-only handle to an inbox, sorted by received time descending.
pub trait Mailbox {
    /// Display name of the inbox being searched
    fn name(&self) -> String;
    fn messages(&self) -> Result<MessageIter<'_>>;
}

/// One way of getting hold of the user's mail.
pub trait ConnectStrategy {
    fn name(&self) -> &'static str;
    fn connect(&self, config: &Config) -> Result<Box<dyn Mailbox>>;
}

/// Strategies in precedence order: the user's himalaya session first, then
/// the notmuch index, then a raw maildir scan as the generic last resort.
pub fn default_strategies() -> Vec<Box<dyn ConnectStrategy>> {
    vec![
        Box::new(HimalayaStrategy),
        Box::new(NotmuchStrategy),
        Box::new(MaildirStrategy),
    ]
}

pub fn connect(config: &Config) -> Result<Box<dyn Mailbox>> {
    connect_with(&default_strategies(), config)
}

/// Try each strategy in order, reporting the ones that fall through, and
/// hand back the first mailbox that connects.
pub fn connect_with(
    strategies: &[Box<dyn ConnectStrategy>],
    config: &Config,
) -> Result<Box<dyn Mailbox>> {
    for strategy in strategies {
        match strategy.connect(config) {
            Ok(mailbox) => {
                println!("Connected to mail via {}", strategy.name());
                return Ok(mailbox);
            }
            Err(e) => eprintln!("Warning: {} backend unavailable: {:#}", strategy.name(), e),
        }
    }
    bail!("every connection strategy failed")
}

struct HimalayaStrategy;

impl ConnectStrategy for HimalayaStrategy {
    fn name(&self) -> &'static str {
        "himalaya"
    }

    fn connect(&self, config: &Config) -> Result<Box<dyn Mailbox>> {
        let accounts = himalaya::client::list_accounts()?;
        if accounts.is_empty() {
            bail!("no accounts configured");
        }
        Ok(Box::new(HimalayaMailbox::new(config.himalaya.clone())))
    }
}

struct NotmuchStrategy;

impl ConnectStrategy for NotmuchStrategy {
    fn name(&self) -> &'static str {
        "notmuch"
    }

    fn connect(&self, _config: &Config) -> Result<Box<dyn Mailbox>> {
        NotmuchMailbox::available()?;
        Ok(Box::new(NotmuchMailbox))
    }
}

struct MaildirStrategy;

impl ConnectStrategy for MaildirStrategy {
    fn name(&self) -> &'static str {
        "maildir"
    }

    fn connect(&self, config: &Config) -> Result<Box<dyn Mailbox>> {
        let root = config.maildir_path();
        if !root.join("cur").is_dir() && !root.join("new").is_dir() {
            bail!("{} is not a maildir", root.display());
        }
        Ok(Box::new(MaildirMailbox::new(root)))
    }
}
