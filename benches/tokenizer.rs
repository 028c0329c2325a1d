//! Tokenizer benchmarks

use std::io::Cursor;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vtx_terminal::parser::{Token, TokenTable, Tokenizer};

/// Tokenize `input` to EOF, returning the token count
fn drain(table: &Arc<TokenTable>, input: &[u8]) -> usize {
    let mut tokenizer = Tokenizer::new(Cursor::new(input), Arc::clone(table));
    let mut count = 0;
    while let Ok(token) = tokenizer.next_token() {
        if token == Token::Eof {
            break;
        }
        count += 1;
    }
    count
}

fn bench_tokenize(c: &mut Criterion) {
    let table = Arc::new(TokenTable::standard().expect("standard table"));
    let mut group = c.benchmark_group("tokenizer");

    let inputs = [
        ("plain_text", "Hello, World! ".repeat(1000)),
        ("csi_sequences", "\x1b[1;31mRed\x1b[0m \x1b[5;10H\x1b[2J".repeat(100)),
        (
            "mixed_content",
            "Line 1: \x1b[32mOK\x1b[0m\r\nLine 2: \x1b[31mERROR\x1b[0m\r\n".repeat(500),
        ),
        ("utf8_content", "Hello, \u{4e16}\u{754c}! \u{1f389} ".repeat(500)),
        ("osc_titles", "\x1b]0;user@host: ~/src\x07$ ".repeat(200)),
    ];

    for (name, input) in &inputs {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(*name, |b| b.iter(|| drain(&table, black_box(input.as_bytes()))));
    }

    group.finish();
}

fn bench_table_build(c: &mut Criterion) {
    c.bench_function("tokenizer/table_build", |b| {
        b.iter(|| black_box(TokenTable::standard().expect("standard table")))
    });
}

criterion_group!(benches, bench_tokenize, bench_table_build);
criterion_main!(benches);
