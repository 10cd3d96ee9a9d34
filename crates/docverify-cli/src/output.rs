//! Report formatting.

use std::fmt::Write as _;
use std::path::Path;

use docverify_core::models::report::{ComparisonStage, FileReport};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for per-file outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

const CSV_HEADER: [&str; 8] = [
    "filename",
    "kind",
    "status",
    "identifier",
    "accuracy",
    "mismatches",
    "error",
    "processing_time_ms",
];

/// Render one report.
pub fn format_report(
    report: &FileReport,
    format: OutputFormat,
    identifier_field: &str,
    show_text: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(CSV_HEADER)?;
            wtr.write_record(csv_row(report, identifier_field))?;
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(format_text(report, identifier_field, show_text)),
    }
}

/// Write one CSV row per report.
pub fn write_summary(
    path: &Path,
    reports: &[FileReport],
    identifier_field: &str,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(CSV_HEADER)?;
    for report in reports {
        wtr.write_record(csv_row(report, identifier_field))?;
    }
    wtr.flush()?;
    Ok(())
}

fn csv_row(report: &FileReport, identifier_field: &str) -> [String; 8] {
    let mismatches = report
        .comparison_result()
        .map(|result| result.mismatches.keys().collect::<Vec<_>>().join(";"))
        .unwrap_or_default();

    [
        report.filename.clone(),
        report.kind.as_str().to_string(),
        report.status().to_string(),
        report.identifier(identifier_field).unwrap_or("").to_string(),
        report
            .accuracy()
            .map(|a| format!("{:.2}", a))
            .unwrap_or_default(),
        mismatches,
        report.error().unwrap_or("").to_string(),
        report.processing_time_ms.to_string(),
    ]
}

fn format_text(report: &FileReport, identifier_field: &str, show_text: bool) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "File: {} ({})", report.filename, report.kind.as_str());
    let _ = writeln!(output, "Status: {}", report.status());
    if let Some(identifier) = report.identifier(identifier_field) {
        let _ = writeln!(output, "{}: {}", identifier_field, identifier);
    }
    if let Some(accuracy) = report.accuracy() {
        let _ = writeln!(output, "Accuracy: {:.2}%", accuracy);
    }

    if let Some(record) = &report.structured_data {
        output.push_str("\nExtracted fields:\n");
        for (field, value) in record.iter() {
            let _ = writeln!(output, "  {}: {}", field, value.as_deref().unwrap_or("-"));
        }
    }

    if let ComparisonStage::Completed(result) = &report.comparison {
        if !result.mismatches.is_empty() {
            output.push_str("\nMismatches:\n");
            for (field, mismatch) in result.mismatches.iter() {
                let _ = writeln!(
                    output,
                    "  {}: expected {:?}, found {}",
                    field,
                    mismatch.expected,
                    mismatch
                        .actual
                        .as_ref()
                        .map(|a| format!("{:?}", a))
                        .unwrap_or_else(|| "nothing".to_string())
                );
            }
        }
    }

    if let Some(error) = report.error() {
        let _ = writeln!(output, "\nError: {}", error);
    }

    if show_text {
        if let Some(text) = &report.extracted_text {
            let _ = writeln!(output, "\nExtracted text:\n{}", text);
        }
    }

    output
}
