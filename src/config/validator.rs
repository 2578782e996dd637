//! Configuration validation

use super::*;
use crate::coordinator::benchmark::SECTIONS;
use crate::util::buffer::MAX_SLOTS;
use anyhow::{Context, Result};

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_generator(&config.generator)?;
    validate_output(&config.output)?;

    // Geometry checks shared with the library entry points
    config
        .to_pipeline_config()
        .validate()
        .context("Invalid pipeline configuration")?;

    Ok(())
}

/// Validate generator configuration
pub fn validate_generator(gen: &GeneratorConfig) -> Result<()> {
    if gen.line_width == 0 {
        anyhow::bail!("line_width must be greater than 0");
    }

    if gen.chunk_lines == 0 {
        anyhow::bail!("chunk_lines must be greater than 0");
    }

    if gen.pool_slots == 0 || !gen.pool_slots.is_power_of_two() || gen.pool_slots > MAX_SLOTS {
        anyhow::bail!(
            "pool_slots must be a power of two between 1 and {}, got {}",
            MAX_SLOTS,
            gen.pool_slots
        );
    }

    if gen.consumer_threads == Some(0) {
        anyhow::bail!("consumer_threads must be at least 1 if specified");
    }

    if gen.chunk_lines.checked_mul(gen.line_width).is_none() {
        anyhow::bail!(
            "chunk_lines * line_width overflows ({} * {})",
            gen.chunk_lines,
            gen.line_width
        );
    }

    for section in &SECTIONS {
        if section.length(gen.length).is_err() {
            anyhow::bail!("length {} is too large for section {}", gen.length, section.id);
        }
    }

    Ok(())
}

/// Validate output configuration
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if let Some(path) = &output.json_output {
        if path.as_os_str().is_empty() {
            anyhow::bail!("json_output must not be empty");
        }
        if path.is_dir() {
            anyhow::bail!("json_output must be a file, {} is a directory", path.display());
        }
    }

    Ok(())
}
