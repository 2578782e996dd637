//! Human-readable run summary
//!
//! Standard output carries the generated sequences, so the summary always
//! goes to standard error.

use crate::stats::SectionSummary;
use std::io::{self, Write};

/// Print the summary of a run to stderr
pub fn print_summary(sections: &[SectionSummary]) -> io::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_summary(&mut out, sections)?;
    out.flush()
}

/// Render the summary of a run
///
/// Lists every section with its size, followed by pipeline counters and,
/// in verify mode, the comparison result and observed symbol frequencies.
pub fn write_summary<W: Write + ?Sized>(out: &mut W, sections: &[SectionSummary]) -> io::Result<()> {
    writeln!(out, "═══════════════════════════════════════════════════════════")?;
    writeln!(out, "                    RUN SUMMARY")?;
    writeln!(out, "═══════════════════════════════════════════════════════════")?;

    let mut total_symbols = 0;
    let mut total_bytes = 0;

    for section in sections {
        total_symbols += section.symbols;
        total_bytes += section.bytes;

        writeln!(out)?;
        writeln!(out, ">{} {}", section.id, section.title)?;
        writeln!(
            out,
            "  Symbols: {} ({})",
            format_number(section.symbols),
            format_bytes(section.bytes)
        )?;

        if let Some(pipeline) = &section.pipeline {
            writeln!(
                out,
                "  Chunks:  {} over {} slots, {} consumer threads",
                format_number(pipeline.chunks),
                pipeline.slots,
                pipeline.consumer_threads
            )?;
            writeln!(
                out,
                "  Reorder: {} out-of-order blocks, peak deferred {}",
                format_number(pipeline.out_of_order),
                pipeline.peak_deferred
            )?;
        }

        if let Some(result) = &section.verification {
            let status = if result.is_success() { "PASS" } else { "FAIL" };
            writeln!(out, "  Verify:  {} ({})", status, result)?;
        }

        if let Some(hist) = &section.histogram {
            if hist.total() > 0 {
                writeln!(out, "  Frequencies:")?;
                for (symbol, count) in hist.observed() {
                    writeln!(
                        out,
                        "    {} {:>8.3}%  {}",
                        char::from(symbol),
                        hist.frequency(symbol) * 100.0,
                        format_number(count)
                    )?;
                }
            }
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Total: {} symbols ({})",
        format_number(total_symbols),
        format_bytes(total_bytes)
    )?;
    writeln!(out, "═══════════════════════════════════════════════════════════")?;
    Ok(())
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

/// Format bytes with appropriate units
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
