//! Reader and parser working together over files on disk

#![allow(clippy::unwrap_used)] // Tests are allowed to use unwrap for simplicity
#![allow(clippy::indexing_slicing)] // Chunk lookups in assertions

use accesslog_core::{ChunkedReader, CoreResult, LogParser, ParseFailureKind};
use std::io::Write;

const LINES: [&str; 5] = [
    r#"127.0.0.1 - - [10/Oct/2020:13:55:36 -0700] "GET /index.html HTTP/1.0" 200 1024 "-" "-" 150"#,
    r#"10.1.1.7 - frank [10/Oct/2020:13:56:01 -0700] "POST /login HTTP/1.1" 302 - "https://example.com/" "Mozilla/5.0" 42"#,
    "",
    r#"10.1.1.8 - - [10/Oct/2020:13:57:00 -0700] "HEAD / HTTP/1.1" 200 0 "-" "-" not-a-number"#,
    r#"10.1.1.9 - - [10/Oct/2020:13:58:00 +0200] "DELETE /item/7 HTTP/1.1" 204 0 "-" "-" 3"#,
];

fn log_file(contents: &str) -> CoreResult<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_file_parses_in_chunks_and_order() -> CoreResult<()> {
    let file = log_file(&LINES.join("\r\n"))?;
    let parser = LogParser::new()?;

    let chunks: Vec<Vec<String>> =
        ChunkedReader::open(file.path(), 2)?.collect::<CoreResult<_>>()?;
    assert_eq!(chunks.iter().map(Vec::len).collect::<Vec<_>>(), [2, 2, 1]);

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for line in chunks.iter().flatten() {
        match parser.parse(line) {
            Ok(record) => records.push(record),
            Err(failure) => failures.push(failure),
        }
    }

    let methods: Vec<&str> = records.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, ["GET", "POST", "DELETE"]);
    assert_eq!(records[1].bytes, 0);
    assert_eq!(records[1].status, 302);
    assert_eq!(records[2].date.offset().local_minus_utc(), 7200);

    let kinds: Vec<ParseFailureKind> = failures.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, [ParseFailureKind::Grammar, ParseFailureKind::Duration]);
    assert_eq!(failures[0].line, "");
    Ok(())
}

#[test]
fn test_trailing_newline_adds_no_line() -> CoreResult<()> {
    let file = log_file(&format!("{}\n{}\n", LINES[0], LINES[1]))?;
    let lines: Vec<String> = ChunkedReader::open(file.path(), 10)?
        .collect::<CoreResult<Vec<_>>>()?
        .concat();
    assert_eq!(lines.len(), 2);
    Ok(())
}
