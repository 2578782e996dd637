//! fastagen CLI entry point

use anyhow::{Context, Result};
use fastagen::config::cli::Cli;
use fastagen::config::{toml::load_config, validator::validate_config, Config};
use fastagen::output::json::{build_report, write_json_output, RunMode};
use fastagen::output::text::print_summary;
use fastagen::stats::SectionSummary;
use fastagen::{Benchmark, Pipeline};
use std::io::{self, BufWriter};
use std::process::ExitCode;
use tracing_subscriber::prelude::*;

/// Buffered stdout capacity
const STDOUT_BUFFER: usize = 1 << 16;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_args();
    let config = load_config(&cli)?;
    init_tracing(config.runtime.log_level.as_directive());

    validate_config(&config).context("Configuration validation failed")?;
    tracing::debug!("{}", config);

    let pipeline = Pipeline::new(config.to_pipeline_config())?;
    let benchmark = Benchmark::new(pipeline, config.generator.seed);

    if config.runtime.verify {
        run_verify(&config, &benchmark)
    } else {
        run_generate(&config, &benchmark)
    }
}

fn init_tracing(log_level: &str) {
    // stdout carries the sequences, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Write all sections to stdout
fn run_generate(config: &Config, benchmark: &Benchmark) -> Result<ExitCode> {
    let mut stdout = BufWriter::with_capacity(STDOUT_BUFFER, io::stdout());
    let sections = benchmark
        .run(config.generator.length, &mut stdout)
        .context("Failed to generate sequences")?;

    report(config, RunMode::Generate, sections)?;
    Ok(ExitCode::SUCCESS)
}

/// Compare pipeline output with the sequential reference
fn run_verify(config: &Config, benchmark: &Benchmark) -> Result<ExitCode> {
    let sections = benchmark
        .verify(config.generator.length)
        .context("Verification run failed")?;

    let mut passed = true;
    for section in &sections {
        if let Some(result) = &section.verification {
            if result.is_success() {
                eprintln!("{}: {}", section.id, result);
            } else {
                eprintln!("{}: FAILED, {}", section.id, result);
                passed = false;
            }
        }
    }

    report(config, RunMode::Verify, sections)?;
    Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn report(config: &Config, mode: RunMode, sections: Vec<SectionSummary>) -> Result<()> {
    if config.output.summary {
        print_summary(&sections).context("Failed to write run summary")?;
    }

    if let Some(path) = &config.output.json_output {
        let report = build_report(config, mode, sections);
        write_json_output(path, &report, config.output.json_pretty)
            .with_context(|| format!("Failed to write JSON report: {}", path.display()))?;
    }

    Ok(())
}
