//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents).context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Config {
    let gen = &mut config.generator;
    if let Some(length) = cli.length {
        gen.length = length;
    }
    if let Some(line_width) = cli.line_width {
        gen.line_width = line_width;
    }
    if let Some(chunk_lines) = cli.chunk_lines {
        gen.chunk_lines = chunk_lines;
    }
    if let Some(slots) = cli.slots {
        gen.pool_slots = slots;
    }
    if cli.threads.is_some() {
        gen.consumer_threads = cli.threads;
    }
    if let Some(seed) = cli.seed {
        gen.seed = seed;
    }

    if cli.json_output.is_some() {
        config.output.json_output = cli.json_output.clone();
    }
    // Flags can only switch these on
    config.output.summary |= cli.summary;
    config.runtime.verify |= cli.verify;

    if let Some(level) = cli.log_level {
        config.runtime.log_level = level;
    }

    config
}

/// Build the effective configuration from the CLI and its optional config file
pub fn load_config(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => Config::default(),
    };
    Ok(merge_cli_with_config(cli, base))
}
