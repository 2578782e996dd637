//! Three-section FASTA benchmark
//!
//! Emits the classical benchmark output for a length multiplier `n`:
//!
//! ```text
//! >ONE Homo sapiens alu            2n symbols of ALU repeated
//! >TWO IUB ambiguity codes         3n symbols sampled from IUB
//! >THREE Homo sapiens frequency    5n symbols sampled from Homo sapiens
//! ```
//!
//! Both random sections draw from one deterministic source, so the third
//! section continues the stream where the second stopped.

use super::Pipeline;
use crate::distribution::alphabet::{AlphabetKind, ALU};
use crate::distribution::lcg::Lcg;
use crate::distribution::weighted::ThresholdTable;
use crate::distribution::RandomSource;
use crate::error::{FastaError, FastaResult};
use crate::output::repeat::write_repeat;
use crate::stats::{SectionSummary, SymbolHistogram};
use crate::util::verification::{compare_streams, sequential_reference};
use std::io::Write;

/// Content of a benchmark section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Fixed sequence cycled end to end
    Repeat { sequence: &'static [u8] },
    /// Symbols sampled through the pipeline
    Random { alphabet: AlphabetKind },
}

/// One titled section of the benchmark output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub id: &'static str,
    pub title: &'static str,
    /// Section length as a multiple of `n`
    pub multiplier: usize,
    pub kind: SectionKind,
}

impl Section {
    /// Header line including the trailing newline
    pub fn header(&self) -> String {
        format!(">{} {}\n", self.id, self.title)
    }

    /// Symbols in this section for length multiplier `n`
    pub fn length(&self, n: usize) -> FastaResult<usize> {
        n.checked_mul(self.multiplier).ok_or_else(|| {
            FastaError::config(format!("length {} overflows section {}", n, self.id))
        })
    }
}

/// The benchmark sections in output order
pub const SECTIONS: [Section; 3] = [
    Section {
        id: "ONE",
        title: "Homo sapiens alu",
        multiplier: 2,
        kind: SectionKind::Repeat { sequence: ALU },
    },
    Section {
        id: "TWO",
        title: "IUB ambiguity codes",
        multiplier: 3,
        kind: SectionKind::Random {
            alphabet: AlphabetKind::Iub,
        },
    },
    Section {
        id: "THREE",
        title: "Homo sapiens frequency",
        multiplier: 5,
        kind: SectionKind::Random {
            alphabet: AlphabetKind::HomoSapiens,
        },
    },
];

/// Section content ready to emit
enum Content {
    Repeat(&'static [u8]),
    Random(ThresholdTable),
}

/// Benchmark driver over a configured pipeline
#[derive(Debug, Clone)]
pub struct Benchmark {
    pipeline: Pipeline,
    seed: u32,
}

impl Benchmark {
    pub fn new(pipeline: Pipeline, seed: u32) -> Self {
        Self { pipeline, seed }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Write all three sections to `sink`
    ///
    /// Section lengths, sampling tables and the buffer pool are all set up
    /// before the first byte is written, so a configuration or allocation
    /// error leaves `sink` untouched.
    pub fn run<W: Write + Send + ?Sized>(&self, n: usize, sink: &mut W) -> FastaResult<Vec<SectionSummary>> {
        let line_width = self.pipeline.config().line_width;
        let mut rng = Lcg::with_seed(self.seed);
        let plans = self.prepare(n, rng.modulus())?;
        let pool = self.pipeline.allocate_pool()?;
        let mut summaries = Vec::with_capacity(SECTIONS.len());

        for (section, (length, content)) in SECTIONS.iter().zip(&plans) {
            let length = *length;
            let _span = tracing::info_span!("section", id = section.id, length).entered();

            let header = section.header();
            sink.write_all(header.as_bytes())?;

            let (bytes, pipeline) = match content {
                Content::Repeat(sequence) => (write_repeat(sink, sequence, length, line_width)?, None),
                Content::Random(table) => {
                    let summary = self.pipeline.run_in_pool(&pool, &mut rng, length, table, sink)?;
                    (summary.bytes, Some(summary))
                }
            };
            tracing::debug!(bytes, "Section written");

            summaries.push(SectionSummary {
                id: section.id.to_string(),
                title: section.title.to_string(),
                symbols: length as u64,
                bytes: header.len() as u64 + bytes,
                pipeline,
                histogram: None,
                verification: None,
            });
        }

        sink.flush()?;
        Ok(summaries)
    }

    /// Length and resolved content of every section
    fn prepare(&self, n: usize, modulus: u32) -> FastaResult<Vec<(usize, Content)>> {
        SECTIONS
            .iter()
            .map(|section| {
                let content = match section.kind {
                    SectionKind::Repeat { sequence } => Content::Repeat(sequence),
                    SectionKind::Random { alphabet } => {
                        Content::Random(ThresholdTable::build(alphabet.entries(), modulus)?)
                    }
                };
                Ok((section.length(n)?, content))
            })
            .collect()
    }

    /// Run every random section in memory and compare it with the
    /// sequential reference
    ///
    /// Returns one summary per section, carrying the verification result and
    /// the observed symbol histogram. Nothing is written to any output.
    pub fn verify(&self, n: usize) -> FastaResult<Vec<SectionSummary>> {
        let line_width = self.pipeline.config().line_width;
        let mut pipeline_rng = Lcg::with_seed(self.seed);
        let mut reference_rng = Lcg::with_seed(self.seed);
        let plans = self.prepare(n, pipeline_rng.modulus())?;
        let pool = self.pipeline.allocate_pool()?;
        let mut summaries = Vec::with_capacity(SECTIONS.len());

        for (section, (length, content)) in SECTIONS.iter().zip(&plans) {
            let length = *length;
            let _span = tracing::info_span!("verify", id = section.id, length).entered();
            let mut out = Vec::new();

            let (pipeline, verification) = match content {
                Content::Random(table) => {
                    let summary = self.pipeline.run_in_pool(&pool, &mut pipeline_rng, length, table, &mut out)?;
                    let expected = sequential_reference(&mut reference_rng, length, table, line_width);
                    let result = compare_streams(&expected, &out);
                    if result.is_success() {
                        tracing::info!("Pipeline output matches sequential reference");
                    } else {
                        tracing::warn!(%result, "Pipeline output diverges from sequential reference");
                    }
                    (Some(summary), Some(result))
                }
                Content::Repeat(sequence) => {
                    write_repeat(&mut out, sequence, length, line_width)?;
                    (None, None)
                }
            };

            summaries.push(SectionSummary {
                id: section.id.to_string(),
                title: section.title.to_string(),
                symbols: length as u64,
                bytes: (section.header().len() + out.len()) as u64,
                pipeline,
                histogram: Some(SymbolHistogram::from_bytes(&out)),
                verification,
            });
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::PipelineConfig;

    fn benchmark(slots: usize, threads: usize) -> Benchmark {
        let config = PipelineConfig {
            line_width: 60,
            chunk_lines: 4,
            slots,
            consumer_threads: threads,
        };
        Benchmark::new(Pipeline::new(config).unwrap(), crate::distribution::lcg::DEFAULT_SEED)
    }

    #[test]
    fn test_section_headers() {
        assert_eq!(SECTIONS[0].header(), ">ONE Homo sapiens alu\n");
        assert_eq!(SECTIONS[1].header(), ">TWO IUB ambiguity codes\n");
        assert_eq!(SECTIONS[2].header(), ">THREE Homo sapiens frequency\n");
    }

    #[test]
    fn test_section_length_overflow() {
        assert!(SECTIONS[2].length(usize::MAX).unwrap_err().is_configuration());
        assert_eq!(SECTIONS[1].length(1000).unwrap(), 3000);
    }

    #[test]
    fn test_run_layout() {
        let mut out = Vec::new();
        let summaries = benchmark(4, 2).run(100, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let headers: Vec<&str> = text.lines().filter(|l| l.starts_with('>')).collect();
        assert_eq!(
            headers,
            vec![">ONE Homo sapiens alu", ">TWO IUB ambiguity codes", ">THREE Homo sapiens frequency"]
        );
        assert!(text.lines().all(|l| l.len() <= 60 || l.starts_with('>')));
        assert!(!text.contains("\n\n"));

        let symbols: Vec<u64> = summaries.iter().map(|s| s.symbols).collect();
        assert_eq!(symbols, vec![200, 300, 500]);
        let bytes: u64 = summaries.iter().map(|s| s.bytes).sum();
        assert_eq!(bytes, text.len() as u64);
        assert!(summaries[0].pipeline.is_none());
        assert!(summaries[1].pipeline.is_some());
    }

    #[test]
    fn test_allocation_failure_writes_nothing() {
        // Passes geometry validation, but four u32 per symbol overflow usize
        let config = PipelineConfig {
            line_width: 60,
            chunk_lines: usize::MAX / 60,
            slots: 4,
            consumer_threads: 2,
        };
        let bench = Benchmark::new(Pipeline::new(config).unwrap(), crate::distribution::lcg::DEFAULT_SEED);

        let mut out = Vec::new();
        let err = bench.run(10, &mut out).unwrap_err();
        assert!(matches!(err, FastaError::Allocation { slots: 4, .. }));
        assert!(out.is_empty());

        assert!(matches!(bench.verify(10).unwrap_err(), FastaError::Allocation { .. }));
    }

    #[test]
    fn test_length_overflow_writes_nothing() {
        let mut out = Vec::new();
        let err = benchmark(4, 2).run(usize::MAX / 4, &mut out).unwrap_err();
        assert!(err.is_configuration());
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_is_idempotent_and_independent_of_parallelism() {
        let mut first = Vec::new();
        benchmark(4, 4).run(1000, &mut first).unwrap();

        let mut second = Vec::new();
        benchmark(4, 4).run(1000, &mut second).unwrap();
        assert_eq!(first, second);

        let mut serial = Vec::new();
        benchmark(1, 1).run(1000, &mut serial).unwrap();
        assert_eq!(first, serial);
    }

    #[test]
    fn test_verify_reports_success() {
        let summaries = benchmark(2, 3).verify(2000).unwrap();
        assert_eq!(summaries.len(), 3);
        assert!(summaries[0].verification.is_none());
        for summary in &summaries[1..] {
            assert_eq!(summary.verification, Some(crate::util::verification::VerificationResult::Success));
            let hist = summary.histogram.as_ref().unwrap();
            assert_eq!(hist.total(), summary.symbols);
        }
    }

    #[test]
    fn test_verify_matches_run_bytes() {
        let mut out = Vec::new();
        let run = benchmark(4, 2).run(500, &mut out).unwrap();
        let verified = benchmark(4, 2).verify(500).unwrap();

        for (a, b) in run.iter().zip(&verified) {
            assert_eq!(a.bytes, b.bytes);
        }
    }
}
