//! Batch processing command for multiple boletos.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{error, warn};

use boleto_core::{BoletoPipeline, PipelineReport};

use super::process::{format_report, process_file, OutputFormat};
use super::{evaluation_date, load_config, Overrides};

const SUPPORTED_EXTENSIONS: [&str; 9] = ["pdf", "png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp", "txt"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of documents processed in parallel
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Evaluation date for due dates (YYYY-MM-DD, default: today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Skip OCR and use only embedded or plain text
    #[arg(long)]
    text_only: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Verify payment line check digits
    #[arg(long)]
    strict: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    report: Option<PipelineReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    Overrides {
        text_only: args.text_only,
        model_dir: args.model_dir.clone(),
        strict: args.strict,
    }
    .apply(&mut config);

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Each document runs its own pipeline pass; at most `jobs` at a time
    let pipeline = Arc::new(BoletoPipeline::new(config));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let date = evaluation_date(args.date);

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let pipeline = Arc::clone(&pipeline);
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let file_start = Instant::now();
            let task_path = path.clone();
            let result = tokio::task::spawn_blocking(move || process_file(&pipeline, &task_path, date)).await?;
            anyhow::Ok((path, result, file_start.elapsed().as_millis() as u64))
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let (path, result, processing_time_ms) = handle.await??;

        match result {
            Ok(report) => {
                results.push(ProcessResult {
                    path,
                    report: Some(report),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        report: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    // Write outputs
    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(report) = &result.report {
                let output_path = output_dir.join(output_file_name(&result.path, args.format.extension()));
                fs::write(&output_path, format_report(report, &result.path, args.format)?)?;
            }
        }
    }

    if args.summary {
        let summary_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let summary_path = summary_dir.join("summary.csv");
        write_summary(&results, &summary_path)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.report.is_some()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let approved = results
        .iter()
        .filter_map(|r| r.report.as_ref())
        .filter(|r| r.outcome.overall_status == boleto_core::OverallStatus::Approved)
        .count();

    println!();
    println!(
        "{} Processed {} files in {:.1}s",
        style("✓").green(),
        results.len(),
        start.elapsed().as_secs_f64()
    );
    println!(
        "  {} read, {} approved, {} failed",
        style(successful).green(),
        style(approved).cyan(),
        if failed > 0 { style(failed).red() } else { style(failed).dim() }
    );

    for result in results.iter().filter(|r| r.error.is_some()) {
        println!(
            "  {} {}: {}",
            style("✗").red(),
            result.path.display(),
            result.error.as_deref().unwrap_or_default()
        );
    }

    Ok(())
}

fn write_summary(results: &[ProcessResult], path: &std::path::Path) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "status",
        "payment_line_valid",
        "cnpj_valid",
        "beneficiary_matches",
        "due_status",
        "engine",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let file = result.path.display().to_string();
        let time = result.processing_time_ms.to_string();
        match &result.report {
            Some(report) => {
                let v = &report.outcome.validations;
                wtr.write_record([
                    file,
                    report.outcome.overall_status.wire_code().to_string(),
                    v.payment_line.valid.to_string(),
                    v.beneficiary_tax_id.valid.to_string(),
                    v.beneficiary_correspondence.valid.to_string(),
                    v.due_date.detail.clone(),
                    report.recognition.engine_id.clone(),
                    time,
                    String::new(),
                ])?;
            }
            None => {
                wtr.write_record([
                    file,
                    "ERROR".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    time,
                    result.error.clone().unwrap_or_default(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Report name for an input, keeping its extension so `a.pdf` and `a.png`
/// do not overwrite each other.
fn output_file_name(input: &Path, extension: &str) -> String {
    let name = input.file_name().and_then(|s| s.to_str()).unwrap_or("boleto");
    format!("{}.{}", name, extension)
}
