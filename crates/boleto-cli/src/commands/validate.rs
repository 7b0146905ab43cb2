//! Validate command - score fields that were extracted elsewhere.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;

use boleto_core::models::config::ValidationMode;
use boleto_core::{ExtractedFields, FieldValidator};

use super::{evaluation_date, load_config};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// JSON file with the extracted fields
    #[arg(required = true)]
    input: PathBuf,

    /// Evaluation date for the due date (YYYY-MM-DD, default: today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Print only the status JSON for HTTP clients
    #[arg(long)]
    wire: bool,

    /// Verify payment line check digits
    #[arg(long)]
    strict: bool,
}

pub async fn run(args: ValidateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let content = fs::read_to_string(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e))?;
    let fields: ExtractedFields = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid fields JSON in {}: {}", args.input.display(), e))?;

    let mut validator = FieldValidator::new(config.validation);
    if args.strict {
        validator = validator.with_mode(ValidationMode::Strict);
    }

    let outcome = validator.validate_and_score(&fields, evaluation_date(args.date));

    let output = if args.wire {
        serde_json::to_string_pretty(&outcome.to_wire())?
    } else {
        serde_json::to_string_pretty(&outcome)?
    };
    println!("{}", output);

    Ok(())
}
