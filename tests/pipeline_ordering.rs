//! Output ordering across pool depths, thread counts and completion orders

use fastagen::coordinator::{Pipeline, PipelineConfig};
use fastagen::distribution::alphabet::{HOMO_SAPIENS, IUB};
use fastagen::distribution::lcg::{Lcg, IM};
use fastagen::distribution::weighted::ThresholdTable;
use fastagen::util::buffer::{BlockIndex, BufferPool};
use fastagen::util::verification::{compare_streams, sequential_reference, VerificationResult};
use fastagen::worker::writer::Writer;
use fastagen::worker::FormattedBlock;
use fastagen::{Benchmark, FastaError};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn pipeline_matches_sequential_reference(
        slots_pow in 0u32..4,
        threads in 1usize..6,
        line_width in 1usize..80,
        chunk_lines in 1usize..4,
        total in 0usize..3000,
        seed in 0u32..IM,
    ) {
        let config = PipelineConfig {
            line_width,
            chunk_lines,
            slots: 1 << slots_pow,
            consumer_threads: threads,
        };
        let pipeline = Pipeline::new(config).unwrap();
        let table = ThresholdTable::build(&IUB, IM).unwrap();

        let mut out = Vec::new();
        let summary = pipeline
            .run_with_table(&mut Lcg::with_seed(seed), total, &table, &mut out)
            .unwrap();
        let expected = sequential_reference(&mut Lcg::with_seed(seed), total, &table, line_width);

        prop_assert_eq!(compare_streams(&expected, &out), VerificationResult::Success);
        prop_assert_eq!(summary.symbols, total as u64);
        prop_assert_eq!(summary.bytes as usize, total + total.div_ceil(line_width));
    }
}

/// Drive a writer with blocks completing in a random order that the permits
/// allow: block `k` can only be formatted once block `k - slots` is written.
fn simulate_completion_order(slots: usize, blocks: u64, seed: u64) -> Vec<u8> {
    let pool = BufferPool::allocate(slots, 16, 16).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut sink = Vec::new();
    let mut writer = Writer::new(&pool, &mut sink, blocks);
    let mut pending: Vec<BlockIndex> = Vec::new();
    let mut next_unissued: BlockIndex = 0;

    while writer.state().next_to_write < blocks {
        // Every block whose slot has been written back is eligible
        let horizon = (writer.state().next_to_write + slots as u64).min(blocks);
        while next_unissued < horizon {
            pending.push(next_unissued);
            next_unissued += 1;
        }

        let block = pending.swap_remove(rng.gen_range(0..pending.len()));
        let slot = pool.slot_for(block);
        let mut output = pool
            .slot(slot)
            .write
            .try_acquire()
            .expect("write permit must be free for an eligible block");
        output.reset(2).copy_from_slice(&[b'a' + (block % 26) as u8, b'\n']);

        writer.on_ready(FormattedBlock {
            block,
            slot,
            symbols: 1,
            output,
        });
    }

    writer.finish().unwrap();
    assert!(pool.is_idle());
    sink
}

#[test]
fn writer_reorders_any_permitted_completion_order() {
    let blocks = 200u64;
    let expected: Vec<u8> = (0..blocks)
        .flat_map(|b| [b'a' + (b % 26) as u8, b'\n'])
        .collect();

    for slots in [1, 2, 4, 8, 16] {
        for seed in 0..20 {
            let out = simulate_completion_order(slots, blocks, seed);
            assert_eq!(out, expected, "slots={} seed={}", slots, seed);
        }
    }
}

#[test]
fn benchmark_output_is_idempotent() {
    let run = |slots, threads| {
        let config = PipelineConfig {
            line_width: 60,
            chunk_lines: 8,
            slots,
            consumer_threads: threads,
        };
        let mut out = Vec::new();
        Benchmark::new(Pipeline::new(config).unwrap(), 42)
            .run(2500, &mut out)
            .unwrap();
        out
    };

    let first = run(4, 4);
    assert_eq!(first, run(4, 4));
    assert_eq!(first, run(1, 1));
    assert_eq!(first, run(16, 7));
}

#[test]
fn benchmark_sections_continue_one_stream() {
    let config = PipelineConfig {
        line_width: 60,
        chunk_lines: 2,
        slots: 2,
        consumer_threads: 3,
    };
    let mut out = Vec::new();
    Benchmark::new(Pipeline::new(config).unwrap(), 42)
        .run(100, &mut out)
        .unwrap();

    // TWO consumes 300 values, THREE picks up the stream right after them
    let mut rng = Lcg::new();
    let iub = ThresholdTable::build(&IUB, IM).unwrap();
    let homo = ThresholdTable::build(&HOMO_SAPIENS, IM).unwrap();
    let two = sequential_reference(&mut rng, 300, &iub, 60);
    let three = sequential_reference(&mut rng, 500, &homo, 60);

    let text = String::from_utf8(out).unwrap();
    let two_start = text.find(">TWO IUB ambiguity codes\n").unwrap() + ">TWO IUB ambiguity codes\n".len();
    let three_header = text.find(">THREE Homo sapiens frequency\n").unwrap();
    let three_start = three_header + ">THREE Homo sapiens frequency\n".len();

    assert_eq!(&text.as_bytes()[two_start..three_header], two.as_slice());
    assert_eq!(&text.as_bytes()[three_start..], three.as_slice());
}

#[test]
fn non_power_of_two_pool_is_rejected() {
    let config = PipelineConfig {
        slots: 3,
        ..PipelineConfig::default()
    };
    let err = Pipeline::new(config).unwrap_err();
    assert!(matches!(err, FastaError::Configuration(_)));
    assert!(err.to_string().contains("power of two"));
}
