//! JSON report output
//!
//! A report records the effective configuration of a run together with the
//! per-section summaries, so results from different pool depths and thread
//! counts can be compared offline.

use crate::config::Config;
use crate::stats::SectionSummary;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// How the run was executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Sequences written to stdout
    Generate,
    /// Sequences compared against the sequential reference in memory
    Verify,
}

/// Effective generator settings of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRunConfig {
    pub length: usize,
    pub seed: u32,
    pub line_width: usize,
    pub chunk_lines: usize,
    pub slots: usize,
    pub consumer_threads: usize,
}

/// Top-level JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    /// RFC 3339 timestamp of report creation
    pub generated_at: String,
    /// Crate version that produced the report
    pub version: String,
    pub mode: RunMode,
    pub config: JsonRunConfig,
    pub sections: Vec<SectionSummary>,
    /// Whether every verified section matched (absent in generate mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// Build a report from the effective configuration and section summaries
pub fn build_report(config: &Config, mode: RunMode, sections: Vec<SectionSummary>) -> JsonReport {
    let pipeline = config.to_pipeline_config();
    let verified = match mode {
        RunMode::Generate => None,
        RunMode::Verify => Some(
            sections
                .iter()
                .filter_map(|s| s.verification.as_ref())
                .all(|v| v.is_success()),
        ),
    };

    JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode,
        config: JsonRunConfig {
            length: config.generator.length,
            seed: config.generator.seed,
            line_width: pipeline.line_width,
            chunk_lines: pipeline.chunk_lines,
            slots: pipeline.slots,
            consumer_threads: pipeline.consumer_threads,
        },
        sections,
        verified,
    }
}

/// Write a report to `output_path`
pub fn write_json_output(output_path: &Path, report: &JsonReport, pretty: bool) -> Result<()> {
    let mut file = BufWriter::new(File::create(output_path)?);

    if pretty {
        serde_json::to_writer_pretty(&mut file, report)?;
    } else {
        serde_json::to_writer(&mut file, report)?;
    }
    file.flush()?;

    tracing::info!(path = %output_path.display(), "JSON report written");
    Ok(())
}
