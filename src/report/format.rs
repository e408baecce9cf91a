//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{CategoryFit, RunOutput};
use crate::domain::{CandidateModel, FittedRegression, PipelineConfig};
use crate::report::Conversion;

/// Format the full run summary (inputs + per-category diagnostics + chosen models).
pub fn format_run_summary(run: &RunOutput, config: &PipelineConfig) -> String {
    let mut out = String::new();

    out.push_str("=== rb - rating regression fit ===\n");
    out.push_str(&format!("Cross table   : {}\n", config.cross_table.display()));
    out.push_str(&format!("Internal table: {}\n", config.internal_table.display()));
    out.push_str(&format!("Output        : {}\n", config.output.display()));

    for fit in &run.fits {
        out.push('\n');
        out.push_str(&format_category(fit));
    }

    out
}

fn format_category(fit: &CategoryFit) -> String {
    let mut out = String::new();
    let prepared = &fit.prepared;

    let source = if prepared.bridged {
        format!(
            "bridged, {} clamped (below={}, above={})",
            prepared.clamps.total(),
            prepared.clamps.below,
            prepared.clamps.above
        )
    } else {
        "direct".to_string()
    };
    out.push_str(&format!(
        "{} | n={} | {source}\n",
        fit.category,
        prepared.sample.len()
    ));

    for candidate in &fit.selection.candidates {
        let chosen = if candidate.kind == fit.selection.best.kind { "*" } else { " " };
        out.push_str(&format_candidate(chosen, candidate));
    }

    out.push_str(&format!(
        "  -> {}\n",
        fmt_regression(&fit.selection.regression())
    ));
    out
}

fn format_candidate(chosen: &str, c: &CandidateModel) -> String {
    format!(
        "{chosen} {:<10} MSE={:<14} AIC={}\n",
        c.kind.as_str(),
        format!("{:.4}", c.mse),
        fmt_aic(c.aic),
    )
}

/// Format a single conversion for the `convert` command.
pub fn format_conversion(c: &Conversion, regression: &FittedRegression) -> String {
    format!(
        "{} {:.0} -> {} (raw {:.2}, {})\n",
        c.category,
        c.rating,
        c.display,
        c.raw,
        fmt_regression(regression)
    )
}

fn fmt_regression(r: &FittedRegression) -> String {
    format!("{} {}", r.kind, fmt_vec(&r.params))
}

fn fmt_aic(aic: f64) -> String {
    if aic == f64::NEG_INFINITY {
        "-inf (exact fit)".to_string()
    } else {
        format!("{aic:.3}")
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
