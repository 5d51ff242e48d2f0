//! fieldcheck - validate form field values from the command line.
//!
//! Commands:
//! - `fieldcheck check <FILE>`: check every form of a JSON form definition
//! - `fieldcheck eval <RULES> [VALUE]`: evaluate one rule chain
//!
//! Exit codes:
//! - 0: Everything valid
//! - 1: Something invalid
//! - 2: Error

mod cli;
mod definition;

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use fieldcheck_lib::summary::ValidationSummaryEntry;
use fieldcheck_lib::{ConfigurationError, FieldRegistration, ValidationContext};
use log::{debug, warn};
use serde::Serialize;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use cli::{Cli, Commands};
use definition::FormDefinition;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Cannot install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

#[derive(Debug, Serialize)]
struct FormResult {
    valid: bool,
    errors: Vec<ValidationSummaryEntry>,
}

fn init_logging(cli: &Cli) -> Result<(), CliError> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?,
    }
    Ok(())
}

/// Registers every field of the definition and checks each form.
async fn check(path: &Path, json: bool) -> Result<bool, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let def: FormDefinition = serde_json::from_str(&text)?;

    let ctx = ValidationContext::builder()
        .with_messages(def.message_table())
        .with_config(def.config.clone())
        .build();

    let mut loose = Vec::new();
    for field in def.fields {
        let registration: FieldRegistration = field.into();
        if registration.form.is_none() {
            loose.push(registration.name.clone());
        }
        debug!("Registering {}", registration.name);
        ctx.register_field(registration).await?;
    }

    let mut results = BTreeMap::new();
    for form in ctx.forms() {
        let valid = ctx.check_form_validity(&form).await?;
        let errors = ctx.summary_by_form(&form);
        results.insert(form, FormResult { valid, errors });
    }
    for name in loose {
        let report = ctx.validate_field(&name).await?;
        if !report.is_valid {
            let entry = ValidationSummaryEntry::new(&report.name, &report.message)
                .with_friendly_name(&report.friendly_name);
            let result = results.entry(String::new()).or_insert(FormResult {
                valid: true,
                errors: Vec::new(),
            });
            result.valid = false;
            result.errors.push(entry);
        }
    }

    for err in ctx.take_errors() {
        warn!("{err}");
    }

    let all_valid = results.values().all(|r| r.valid);
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for (form, result) in &results {
            let label = if form.is_empty() { "(no form)" } else { form.as_str() };
            println!("{label}: {}", if result.valid { "valid" } else { "invalid" });
            for entry in &result.errors {
                println!("  {}: {}", entry.friendly_name, entry.message);
            }
        }
    }
    Ok(all_valid)
}

/// Evaluates one rule chain against one value.
async fn eval(rules: &str, value: Option<String>) -> Result<bool, CliError> {
    let ctx = ValidationContext::new();
    let mut registration = FieldRegistration::new("value", rules);
    registration.value = value;
    ctx.register_field(registration).await?;

    let report = ctx.validate_field("value").await?;
    if report.is_valid {
        println!("valid");
    } else {
        println!("invalid: {}", report.message);
    }
    Ok(report.is_valid)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let result = match &cli.command {
        Commands::Check { file, json } => check(file, *json).await,
        Commands::Eval { rules, value } => eval(rules, value.clone()).await,
    };

    let code = match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };
    std::process::exit(code);
}
