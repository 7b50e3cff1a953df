//! Command parsing and execution.
//!
//! Commands:
//! - `list [prefix]` - Flat listing of records under a prefix
//! - `tree [prefix]` - The same records folded into a path tree
//! - `put <key> <value>` - Write a value
//! - `delete <key>` - Remove a key

use std::io::Write;

use clap::Subcommand;
use serde_json::json;

use kvtree_core::{build_tree_with, list, RecordStore, TrailingSeparator};

use crate::config::Output;
use crate::error::Error;
use crate::render;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List records whose key starts with a prefix
    #[command(alias = "ls")]
    List {
        /// Key prefix; empty lists everything
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Show records under a prefix as a tree
    Tree {
        /// Key prefix; empty shows everything
        #[arg(default_value = "")]
        prefix: String,

        /// Treat `/a/b/` and `/a/b` as the same node
        #[arg(long)]
        normalize: bool,
    },
    /// Write a value at a key
    #[command(alias = "set")]
    Put { key: String, value: String },
    /// Delete a key
    #[command(alias = "rm")]
    Delete { key: String },
}

/// Run a command against a store, printing the result to `out`.
pub fn execute<S>(
    command: &Command,
    output: Output,
    store: &mut S,
    out: &mut dyn Write,
) -> Result<(), Error>
where
    S: RecordStore + ?Sized,
{
    match command {
        Command::List { prefix } => {
            let records = list(store, prefix)?;
            match output {
                Output::Text => write!(out, "{}", render::render_records(&records))?,
                Output::Json => print_json(out, &records)?,
            }
        }
        Command::Tree { prefix, normalize } => {
            let policy = if *normalize {
                TrailingSeparator::Normalize
            } else {
                TrailingSeparator::Preserve
            };
            let tree = build_tree_with(store, prefix, policy)?;
            match output {
                Output::Text => write!(out, "{}", render::render_tree(&tree))?,
                Output::Json => print_json(out, &tree)?,
            }
        }
        Command::Put { key, value } => {
            store.put(key, value)?;
            log::info!("put {}", key);
            match output {
                Output::Text => writeln!(out, "OK")?,
                Output::Json => print_json(out, &json!({ "key": key, "ok": true }))?,
            }
        }
        Command::Delete { key } => {
            let deleted = store.delete(key)?;
            log::info!("delete {}: {}", key, if deleted { "removed" } else { "absent" });
            match output {
                Output::Text if deleted => writeln!(out, "deleted {}", key)?,
                Output::Text => writeln!(out, "not found: {}", key)?,
                Output::Json => print_json(out, &json!({ "key": key, "deleted": deleted }))?,
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
