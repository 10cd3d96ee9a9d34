//! Parse command - run the field parser over plain text.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use docverify_core::fields::FieldParser;

use super::load_config;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file to parse, or "-" for stdin
    #[arg(required = true)]
    input: PathBuf,
}

pub fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let parser = FieldParser::new(&config.fields)?;

    let text = if args.input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(&args.input).map_err(|e| {
            anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e)
        })?
    };

    let record = parser.parse(&text);
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
