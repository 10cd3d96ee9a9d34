//! Reference command - inspect reference records.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use docverify_core::reference::ReferenceLookup;

use super::{load_config, load_references};

/// Arguments for the reference command.
#[derive(Args)]
pub struct ReferenceArgs {
    /// Reference records JSON file (overrides the config)
    #[arg(short, long, global = true)]
    reference: Option<PathBuf>,

    #[command(subcommand)]
    command: ReferenceCommand,
}

#[derive(Subcommand)]
enum ReferenceCommand {
    /// List record identifiers
    List,

    /// Show one record
    Show {
        /// Record identifier (e.g., "S001")
        id: String,
    },
}

pub fn run(args: ReferenceArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = load_references(&config, args.reference.as_deref())?;

    match args.command {
        ReferenceCommand::List => {
            let source = args
                .reference
                .as_ref()
                .or(config.reference.path.as_ref())
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in sample data".to_string());
            println!(
                "{} {} reference records ({})",
                style("ℹ").blue(),
                store.len(),
                source
            );
            for id in store.ids() {
                println!("{}", id);
            }
        }
        ReferenceCommand::Show { id } => {
            let record = store
                .lookup(&id)
                .ok_or_else(|| anyhow::anyhow!("No reference record for {:?}", id))?;
            println!("{}", serde_json::to_string_pretty(record)?);
        }
    }

    Ok(())
}
