use colored::Colorize;
use stno::api::{CmdMessage, ListedEntry, MessageLevel};
use stno::config::{StnoConfig, CONFIG_KEYS};
use stno::document::Document;
use stno::error::Result;

/// Info and success go to stdout; warnings and errors to stderr so that
/// printed documents stay machine readable.
pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => eprintln!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_uids(uids: &[String]) {
    for uid in uids {
        println!("{}", uid);
    }
}

pub(super) fn print_entries(entries: &[ListedEntry]) -> Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        println!("{}", entry.uid.yellow().bold());
        println!("--------------------------------");
        print!("{}", entry.document.to_toml_string()?);
    }
    Ok(())
}

pub(super) fn print_document(document: &Document) -> Result<()> {
    if !document.is_empty() {
        print!("{}", document.to_toml_string()?);
    }
    Ok(())
}

pub(super) fn print_config(config: &StnoConfig) {
    for key in CONFIG_KEYS {
        let value = config.get(key).unwrap_or_default();
        if value.contains('\n') {
            println!("{} =", key.bold());
            for line in value.lines() {
                println!("    {}", line);
            }
        } else {
            println!("{} = {}", key.bold(), value);
        }
    }
}
