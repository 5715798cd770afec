//! Benchmark – buffered writers over in-memory destinations
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use recio::{BytesWriter, FileWriter, FlushType, MemoryFile, Writer, WriterOptions};

const TOTAL: usize = 1 << 20;

/// Deterministic payload of `len` bytes.
#[allow(clippy::cast_possible_truncation)]
fn make_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Write `TOTAL` bytes as copies of `record` and return the final position
/// so Criterion cannot optimise the work away.
fn run_file_writer(record: &[u8], buffer_size: usize) -> u64 {
    let options = WriterOptions::default().with_buffer_size(buffer_size);
    let mut writer = FileWriter::new(MemoryFile::new(), &options);
    for _ in 0..TOTAL / record.len() {
        writer.write(record).expect("in-memory write");
    }
    writer.flush(FlushType::FromObject).expect("in-memory flush");
    writer.pos()
}

fn run_bytes_writer(record: &[u8]) -> usize {
    let mut writer = BytesWriter::new();
    for _ in 0..TOTAL / record.len() {
        writer.write(record).expect("in-memory write");
    }
    writer.into_bytes().expect("healthy writer").len()
}

fn bench_file_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_writer");
    group.throughput(Throughput::Bytes(TOTAL as u64));
    group.measurement_time(Duration::from_secs(5));
    for &record_len in &[8usize, 100, 4096, 100_000] {
        let record = make_payload(record_len);
        group.bench_with_input(
            BenchmarkId::new("records", record_len),
            &record,
            |b, record| b.iter(|| black_box(run_file_writer(black_box(record), 64 << 10))),
        );
    }
    group.finish();
}

fn bench_bytes_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("bytes_writer");
    group.throughput(Throughput::Bytes(TOTAL as u64));
    for &record_len in &[8usize, 4096] {
        let record = make_payload(record_len);
        group.bench_with_input(
            BenchmarkId::new("records", record_len),
            &record,
            |b, record| b.iter(|| black_box(run_bytes_writer(black_box(record)))),
        );
    }
    group.finish();
}

fn bench_options(c: &mut Criterion) {
    c.bench_function("writer_options_parse", |b| {
        b.iter(|| WriterOptions::parse(black_box("buffer_size:1.5M,append:true")));
    });
}

criterion_group!(benches, bench_file_writer, bench_bytes_writer, bench_options);
criterion_main!(benches);
