//! Emulator benchmarks

use std::io::{self, Cursor};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vtx_terminal::core::Screen;
use vtx_terminal::emulator::Emulator;
use vtx_terminal::parser::TokenTable;

fn run(table: &Arc<TokenTable>, input: &[u8]) -> Screen {
    let mut emulator = Emulator::with_table(
        Screen::new(80, 24),
        Cursor::new(input),
        io::sink(),
        Arc::clone(table),
    );
    emulator.start();
    emulator.into_terminal()
}

fn bench_emulator(c: &mut Criterion) {
    let table = Arc::new(TokenTable::standard().expect("standard table"));
    let mut group = c.benchmark_group("emulator");

    let print = "Hello, World! ".repeat(1000);
    group.throughput(Throughput::Bytes(print.len() as u64));
    group.bench_function("print_chars", |b| b.iter(|| run(&table, black_box(print.as_bytes()))));

    let mut scroll = String::new();
    for i in 0..500 {
        scroll.push_str(&format!("Line {}: Some text content here\r\n", i));
    }
    group.throughput(Throughput::Bytes(scroll.len() as u64));
    group.bench_function("scroll", |b| b.iter(|| run(&table, black_box(scroll.as_bytes()))));

    let csi = "\x1b[H\x1b[2J\x1b[1;31mHello\x1b[0m\x1b[10;20H\x1b[K".repeat(200);
    group.throughput(Throughput::Bytes(csi.len() as u64));
    group.bench_function("csi_apply", |b| b.iter(|| run(&table, black_box(csi.as_bytes()))));

    let region = "\x1b[5;20r\x1b[20;1H".to_string() + &"scrolling in a region\r\n".repeat(500);
    group.throughput(Throughput::Bytes(region.len() as u64));
    group.bench_function("scroll_region", |b| b.iter(|| run(&table, black_box(region.as_bytes()))));

    group.finish();
}

criterion_group!(benches, bench_emulator);
criterion_main!(benches);
