//! Benchmarks for chatdonate transcript parsing and summaries.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench parsing -- detect`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chatdonate::Record;
use chatdonate::chat::{AnonymizationMapping, ChatParser, GrammarCatalog, ParticipantSet, project};
use chatdonate::output::to_json;
use chatdonate::record::remove_empty;

const MEMBERS: &[&str] = &["Alice", "Bob", "Carol", "Dave", "Eve"];

// =============================================================================
// Test Data Generators
// =============================================================================

/// Bracketed locale, so detection has to skip past the US grammar first.
fn generate_lines(count: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(count + count / 5);
    for i in 0..count {
        let sender = MEMBERS[i % MEMBERS.len()];
        lines.push(format!(
            "[{:02}/01/2024, {:02}:{:02}:00] {}: Message number {}",
            i % 28 + 1,
            i % 24,
            i % 60,
            sender,
            i
        ));
        if i % 5 == 0 {
            lines.push("with a second line".to_string());
        }
    }
    lines
}

fn generate_export(count: usize) -> Vec<u8> {
    let mut text = String::from("Messages and calls are end-to-end encrypted.\n");
    text.push_str(&generate_lines(count).join("\n"));
    text.into_bytes()
}

fn generate_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new(
                format!("24-1-{}", i % 28 + 1),
                MEMBERS[(i * 7) % MEMBERS.len()],
                "some words in a message",
            )
        })
        .collect()
}

// =============================================================================
// Parsing Benchmarks
// =============================================================================

fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");
    let catalog = GrammarCatalog::builtin();

    for size in [10_usize, 100, 1_000] {
        let lines = generate_lines(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| black_box(catalog.detect(black_box(lines), None).unwrap()));
        });
    }
    group.finish();
}

fn bench_parse_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_lines");
    let parser = ChatParser::new();

    for size in [100_usize, 1_000, 10_000, 50_000] {
        let lines = generate_lines(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| {
                let records = parser.parse_lines(black_box(lines)).unwrap();
                black_box(records)
            });
        });
    }
    group.finish();
}

// =============================================================================
// Summary Benchmarks
// =============================================================================

fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");
    let names: Vec<String> = MEMBERS.iter().map(|m| m.to_string()).collect();
    let mapping = AnonymizationMapping::new(&names, "Carol").unwrap();

    for size in [1_000_usize, 10_000, 50_000] {
        let records = generate_records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(project(black_box(records.clone()), &mapping)));
        });
    }
    group.finish();
}

// =============================================================================
// End-to-End Pipeline Benchmark
// =============================================================================

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    let parser = ChatParser::new();

    for size in [1_000_usize, 10_000, 50_000] {
        let bytes = generate_export(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| {
                // Full pipeline: parse -> classify -> anonymize -> output
                let records = remove_empty(parser.parse_bytes(black_box(bytes.clone())).unwrap());
                let members = ParticipantSet::classify(&records);
                let records = members.keep_real(records);
                let mapping = AnonymizationMapping::new(&members.real, "Alice").unwrap();
                let json = to_json(&project(records, &mapping)).unwrap();
                black_box(json)
            });
        });
    }
    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_detect,
    bench_parse_lines,
    bench_project,
    bench_full_pipeline,
);

criterion_main!(benches);
