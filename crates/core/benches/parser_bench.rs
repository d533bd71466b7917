//! Parser Throughput Benchmark
//!
//! Measures line parsing and chunked reading over a synthetic log.

use accesslog_core::{ChunkedReader, LogParser};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::Cursor;

const VALID: &str = r#"192.168.10.4 - frank [10/Oct/2020:13:55:36 -0700] "GET /api/v1/items?page=2 HTTP/1.1" 200 5120 "https://example.com/" "Mozilla/5.0 (X11; Linux x86_64)" 48213"#;
const INVALID: &str = r#"192.168.10.4 - frank [10/Oct/2020:13:55:36 -0700] "GET /api/v1/items HTTP/1.1 200 5120 "-" "-" 48213"#;

fn synthetic_log(lines: usize) -> String {
    (0..lines)
        .map(|i| if i % 50 == 0 { INVALID } else { VALID })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Benchmark single-line parsing
fn bench_parse_line(c: &mut Criterion) {
    let parser = LogParser::new().unwrap();

    c.bench_function("parse_valid_line", |b| {
        b.iter(|| black_box(parser.parse(black_box(VALID)).is_ok()));
    });

    c.bench_function("parse_invalid_line", |b| {
        b.iter(|| black_box(parser.parse(black_box(INVALID)).is_err()));
    });
}

/// Benchmark reading and parsing a whole in-memory log
fn bench_chunked_parse(c: &mut Criterion) {
    let parser = LogParser::new().unwrap();
    let log = synthetic_log(10_000);

    c.bench_function("chunked_parse_10k", |b| {
        b.iter(|| {
            let mut parsed = 0_usize;
            for chunk in ChunkedReader::new(Cursor::new(log.as_bytes()), 1024).unwrap() {
                for line in chunk.unwrap() {
                    if parser.parse(&line).is_ok() {
                        parsed += 1;
                    }
                }
            }
            black_box(parsed)
        });
    });
}

criterion_group!(parser_benches, bench_parse_line, bench_chunked_parse);
criterion_main!(parser_benches);
