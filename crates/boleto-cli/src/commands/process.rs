//! Process command - read and validate a single boleto.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use boleto_core::boleto::rules::bank_name;
use boleto_core::models::fields::{Amount, FieldName};
use boleto_core::{BoletoPipeline, Document, PipelineReport};

use super::{evaluation_date, load_config, Overrides};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, image or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Evaluation date for the due date (YYYY-MM-DD, default: today)
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

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full report as JSON
    Json,
    /// Status JSON for HTTP clients
    Wire,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::Wire => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    Overrides {
        text_only: args.text_only,
        model_dir: args.model_dir.clone(),
        strict: args.strict,
    }
    .apply(&mut config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Reading document...");

    let pipeline = BoletoPipeline::new(config);
    let result = process_file(&pipeline, &args.input, evaluation_date(args.date));
    pb.finish_and_clear();
    let report = result?;

    let output = format_report(&report, &args.input, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Run the pipeline on one file. Unreadable documents become a plain error.
pub fn process_file(pipeline: &BoletoPipeline, path: &Path, date: NaiveDate) -> anyhow::Result<PipelineReport> {
    let document = Document::from_path(path)?;
    debug!("Detected {:?} document ({} bytes)", document.media_type(), document.len());

    match pipeline.process(document, date) {
        Ok(report) => Ok(report),
        Err(e) if e.is_unreadable() => anyhow::bail!("could not read document: {}", path.display()),
        Err(e) => Err(e.into()),
    }
}

pub fn format_report(report: &PipelineReport, path: &Path, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Wire => Ok(serde_json::to_string_pretty(&report.outcome.to_wire())?),
        OutputFormat::Csv => format_csv(report, path),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

const CSV_HEADER: [&str; 11] = [
    "file",
    "status",
    "payment_line",
    "amount",
    "due_date",
    "beneficiary_name",
    "beneficiary_tax_id",
    "bank_code",
    "payment_line_valid",
    "cnpj_valid",
    "due_status",
];

fn format_csv(report: &PipelineReport, path: &Path) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;

    let fields = &report.fields;
    let validations = &report.outcome.validations;
    let value = |name: FieldName| fields.value(name).unwrap_or_default().to_string();

    wtr.write_record([
        path.display().to_string(),
        report.outcome.overall_status.wire_code().to_string(),
        value(FieldName::PaymentLine),
        value(FieldName::Amount),
        value(FieldName::DueDate),
        value(FieldName::BeneficiaryName),
        value(FieldName::BeneficiaryTaxId),
        value(FieldName::BankCode),
        validations.payment_line.valid.to_string(),
        validations.beneficiary_tax_id.valid.to_string(),
        validations.due_date.detail.clone(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &PipelineReport) -> String {
    let fields = &report.fields;
    let outcome = &report.outcome;
    let show = |name: FieldName| fields.value(name).unwrap_or("-").to_string();

    let mut output = String::new();
    output.push_str(&format!("Status: {}\n", outcome.overall_status.wire_code()));
    output.push_str(&format!("{}\n\n", outcome.action_message));

    let bank = match fields.value(FieldName::BankCode) {
        Some(code) => match bank_name(code) {
            Some(name) => format!("{} ({})", code, name),
            None => code.to_string(),
        },
        None => "-".to_string(),
    };
    let amount = fields
        .amount_value()
        .map(|a: Amount| a.to_string())
        .unwrap_or_else(|| "-".to_string());

    output.push_str(&format!("Payment line: {}\n", show(FieldName::PaymentLine)));
    output.push_str(&format!("Bank:         {}\n", bank));
    output.push_str(&format!("Amount:       {}\n", amount));
    output.push_str(&format!("Due date:     {}\n", show(FieldName::DueDate)));
    output.push_str(&format!("Beneficiary:  {}\n", show(FieldName::BeneficiaryName)));
    output.push_str(&format!("CNPJ:         {}\n", show(FieldName::BeneficiaryTaxId)));
    output.push_str(&format!("Payer:        {}\n", show(FieldName::PayerName)));
    output.push_str(&format!("Our number:   {}\n", show(FieldName::OurNumber)));
    output.push('\n');

    output.push_str("Validations:\n");
    let v = &outcome.validations;
    for (label, validation) in [
        ("payment line", &v.payment_line),
        ("cnpj", &v.beneficiary_tax_id),
        ("beneficiary", &v.beneficiary_correspondence),
        ("due date", &v.due_date),
        ("amount", &v.amount),
        ("bank code", &v.bank_code),
    ] {
        let mark = if validation.valid { "ok" } else { "--" };
        output.push_str(&format!("  [{}] {:<13} {}\n", mark, label, validation.detail));
    }

    if !outcome.notes.is_empty() {
        output.push_str("\nNotes:\n");
        for note in &outcome.notes {
            output.push_str(&format!("  - {}\n", note));
        }
    }

    output.push_str(&format!(
        "\nRead by {} at {} ({} characters{})\n",
        report.recognition.engine_id,
        report.recognition.resolution,
        report.recognition.character_count,
        if report.recognition.degraded { ", degraded" } else { "" }
    ));

    output
}
