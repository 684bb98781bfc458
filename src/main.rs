/*
    Project: ctxpack CLI
    Context: Turns a tracked source tree into a single redacted,
    token-budgeted Markdown prompt for feeding into an LLM.

    Architecture:
    1. CLI Parsing (Clap)
    2. Configuration Translation (ctxpack_core::config)
    3. Pipeline Execution (ctxpack_core::pipeline)
    4. Output Persistence
*/

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ctxpack_core::{run_pipeline, Cli, PipelineOptions};

// =============================================================================
// MODULE: LOGGING
// =============================================================================

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let quiet = cli.quiet;
    let output_file_path = cli.output_file_path.clone();
    let options = PipelineOptions::from_cli(cli);

    let start = Instant::now();
    let report = run_pipeline(&options);

    if !report.success {
        eprintln!("ctxpack: {}", report.error.as_deref().unwrap_or("pipeline failed"));
        return Ok(ExitCode::FAILURE);
    }

    std::fs::write(&output_file_path, &report.rendered)
        .with_context(|| format!("failed to write {}", output_file_path.display()))?;

    if !quiet {
        eprintln!(
            "Done. Wrote {} ({} tokens) to {} in {:.2?}",
            plural(report.chunks.len(), "chunk"),
            report.token_count,
            output_file_path.display(),
            start.elapsed()
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
