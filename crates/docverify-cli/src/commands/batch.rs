//! Batch command for verifying multiple documents.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::pin::pin;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::StreamExt;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use docverify_core::extract::DocumentKind;
use docverify_core::models::report::{FileReport, ReportStatus};
use docverify_core::verifier::Upload;

use super::{build_verifier, load_config};
use crate::output::{OutputFormat, format_report, write_summary};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files verified concurrently (default from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Reference records JSON file (overrides the config)
    #[arg(short, long)]
    reference: Option<PathBuf>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!(
            "No input files found for: {}",
            args.inputs.join(", ")
        );
    }

    println!(
        "{} Found {} files to verify",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let verifier = build_verifier(&config, args.reference.as_deref())?;
    let identifier_field = verifier.comparator().identifier().to_string();
    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    debug!("Verifying with {} concurrent jobs", jobs);

    let mut uploads = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    for path in &files {
        match Upload::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                unreadable.push(FileReport::failed(name, format!("Failed to read file: {}", e)));
            }
        }
    }

    let pb = ProgressBar::new(uploads.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let mut reports = Vec::with_capacity(files.len());
    let mut stream = pin!(verifier.verify_stream(&uploads, jobs));
    while let Some(report) = stream.next().await {
        pb.set_message(report.filename.clone());
        pb.inc(1);
        reports.push(report);
    }
    reports.extend(unreadable);

    pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        let mut used = HashSet::new();
        for report in &reports {
            let output_path = output_dir.join(output_name(
                &mut used,
                &report.filename,
                args.format.extension(),
            ));
            let content = format_report(report, args.format, &identifier_field, false)?;
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &reports, &identifier_field)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_summary(&reports, start);

    Ok(())
}

/// Expand inputs into files, keeping first-seen order.
///
/// Wildcard matches are limited to supported extensions. Literal paths are
/// kept as given so that an unsupported or unreadable file still gets a report.
fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        if !is_glob(pattern) {
            let path = PathBuf::from(pattern);
            if path.is_dir() {
                debug!("Skipping directory {}", path.display());
            } else if seen.insert(path.clone()) {
                files.push(path);
            }
            continue;
        }

        for path in glob(pattern)?.filter_map(|r| r.ok()) {
            if !path.is_file() {
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if DocumentKind::from_filename(name) == DocumentKind::Unsupported {
                debug!("Skipping unsupported file {}", path.display());
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Output file name for a report, suffixed `-1`, `-2`, ... when an earlier
/// report in the batch already took it.
fn output_name(used: &mut HashSet<String>, filename: &str, extension: &str) -> String {
    let mut name = format!("{}.{}", filename, extension);
    let mut n = 0;
    while !used.insert(name.clone()) {
        n += 1;
        name = format!("{}-{}.{}", filename, n, extension);
    }
    name
}

fn print_summary(reports: &[FileReport], start: Instant) {
    let mut counts: BTreeMap<ReportStatus, usize> = BTreeMap::new();
    for report in reports {
        *counts.entry(report.status()).or_default() += 1;
    }

    let accuracies: Vec<f64> = reports.iter().filter_map(FileReport::accuracy).collect();

    println!();
    println!(
        "{} Verified {} files in {:?}",
        style("✓").green(),
        reports.len(),
        start.elapsed()
    );
    for (status, count) in &counts {
        let count = match status {
            ReportStatus::Verified => style(*count).green(),
            ReportStatus::Mismatch => style(*count).yellow(),
            _ => style(*count).red(),
        };
        println!("   {}: {}", status, count);
    }
    if !accuracies.is_empty() {
        let mean = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
        println!("   mean accuracy: {:.2}%", mean);
    }

    let failed: Vec<_> = reports
        .iter()
        .filter(|r| r.status() != ReportStatus::Verified && r.error().is_some())
        .collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Problems:").red());
        for report in failed {
            println!(
                "  - {}: {}",
                report.filename,
                report.error().unwrap_or("unknown error")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name_suffixes_collisions() {
        let mut used = HashSet::new();
        assert_eq!(output_name(&mut used, "form.docx", "json"), "form.docx.json");
        assert_eq!(output_name(&mut used, "form.docx", "json"), "form.docx-1.json");
        assert_eq!(output_name(&mut used, "form.docx", "json"), "form.docx-2.json");
        assert_eq!(output_name(&mut used, "form.pdf", "json"), "form.pdf.json");
    }

    #[test]
    fn test_is_glob() {
        assert!(is_glob("inputs/*.png"));
        assert!(is_glob("scan?.pdf"));
        assert!(is_glob("form[12].docx"));
        assert!(!is_glob("inputs/notes.txt"));
    }

    #[test]
    fn test_output_name_avoids_literal_suffixed_names() {
        let mut used = HashSet::new();
        assert_eq!(output_name(&mut used, "a-1", "csv"), "a-1.csv");
        assert_eq!(output_name(&mut used, "a", "csv"), "a.csv");
        assert_eq!(output_name(&mut used, "a", "csv"), "a-2.csv");
    }
}
