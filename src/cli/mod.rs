//! Command-line parsing for the rating regression tool.
//!
//! Argument parsing and command dispatch live apart from the fitting code.
//! Every path option falls back to an environment variable (which may come
//! from a `.env` file) and then to a default in the working directory.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Category;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "rb",
    version,
    about = "Fit rating-conversion regressions between two chess platforms"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every category and write the regressions document.
    Fit(FitArgs),
    /// Convert a single rating with a previously written document.
    Convert(ConvertArgs),
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Platform-1 vs platform-2 cross table (CSV).
    #[arg(long, env = "RB_CROSS_TABLE", default_value = "lichess_to_chess_com_data.csv")]
    pub cross: PathBuf,

    /// Platform-2 internal table holding the bridge column (CSV).
    #[arg(long, env = "RB_INTERNAL_TABLE", default_value = "chess_com_to_chess_com_data.csv")]
    pub internal: PathBuf,

    /// Where to write the regressions document.
    #[arg(short = 'o', long, env = "RB_OUTPUT", default_value = "regressions.json")]
    pub output: PathBuf,

    /// Skip the run summary.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ConvertArgs {
    /// Regressions document produced by `rb fit`.
    #[arg(long, env = "RB_REGRESSIONS", default_value = "regressions.json")]
    pub regressions: PathBuf,

    /// Category to convert in.
    #[arg(short = 'c', long, value_enum, ignore_case = true)]
    pub category: Category,

    /// Platform-1 rating.
    #[arg(short = 'r', long)]
    pub rating: f64,
}
