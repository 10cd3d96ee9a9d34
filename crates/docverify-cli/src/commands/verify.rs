//! Verify command - check a single document against the reference records.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docverify_core::models::report::ReportStatus;
use docverify_core::verifier::Upload;

use super::{build_verifier, load_config};
use crate::output::{OutputFormat, format_report};

/// Arguments for the verify command.
#[derive(Args)]
pub struct VerifyArgs {
    /// Input file (image, PDF or DOCX)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Reference records JSON file (overrides the config)
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Include the extracted text in text output
    #[arg(long)]
    show_text: bool,
}

pub async fn run(args: VerifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let verifier = build_verifier(&config, args.reference.as_deref())?;
    let upload = Upload::from_path(&args.input)?;

    info!("Verifying file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Verifying {}...", upload.filename));

    let report = verifier.verify(&upload).await;

    pb.finish_and_clear();

    let output = format_report(
        &report,
        args.format,
        verifier.comparator().identifier(),
        args.show_text,
    )?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        let marker = match report.status() {
            ReportStatus::Verified => style("✓").green(),
            ReportStatus::Mismatch => style("!").yellow(),
            _ => style("✗").red(),
        };
        println!(
            "{} {}: {} (output written to {})",
            marker,
            report.filename,
            report.status(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
