//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - runs the fit pipeline or a single conversion
//! - prints reports

use clap::Parser;

use crate::cli::{Command, ConvertArgs, FitArgs};
use crate::domain::PipelineConfig;
use crate::error::{AppError, RegressionError};

pub mod pipeline;

/// Entry point for the `rb` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    crate::logging::init();

    // `rb` and `rb --cross x.csv` behave like `rb fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Convert(args) => handle_convert(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    if config.summary {
        println!("{}", crate::report::format_run_summary(&run, &config));
    }
    Ok(())
}

fn handle_convert(args: ConvertArgs) -> Result<(), AppError> {
    let document = crate::io::document::read_document(&args.regressions)?;
    let regression = document.get(&args.category).ok_or_else(|| {
        RegressionError::InvalidDocument(format!(
            "{} has no entry for {}",
            args.regressions.display(),
            args.category
        ))
    })?;

    let conversion = crate::report::convert_rating(args.category, regression, args.rating);
    print!("{}", crate::report::format_conversion(&conversion, regression));
    Ok(())
}

pub fn config_from_args(args: &FitArgs) -> PipelineConfig {
    PipelineConfig {
        cross_table: args.cross.clone(),
        internal_table: args.internal.clone(),
        output: args.output.clone(),
        summary: !args.quiet,
    }
}

/// Rewrite argv so `rb` defaults to `rb fit`.
///
/// Rules:
/// - `rb`                      -> `rb fit`
/// - `rb --cross a.csv ...`    -> `rb fit --cross a.csv ...`
/// - `rb --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
    }
    argv
}
