//! Criterion benchmarks for text translation and command rendering.
//!
//! Translation runs on the request path before the HTTP handler answers, so
//! it should stay well under a millisecond even for long search phrases.
//!
//! Run with:
//! ```bash
//! cargo bench --package roku-core --bench translate_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use roku_core::{format_command, translate, Step};

/// Search phrases of increasing length, as a voice assistant would send them.
const PHRASES: &[&str] = &[
    "up",
    "the office",
    "star trek the next generation",
    "the quick brown fox jumps over the lazy dog again and again and again",
];

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    for phrase in PHRASES {
        group.bench_with_input(BenchmarkId::from_parameter(phrase.len()), phrase, |b, p| {
            b.iter(|| translate(black_box(p)))
        });
    }
    group.finish();
}

fn bench_render_urls(c: &mut Criterion) {
    let seq = translate("star trek: the next generation");
    let base = "http://192.168.1.20:8060/";

    c.bench_function("render_urls", |b| {
        b.iter(|| {
            seq.steps()
                .iter()
                .filter_map(|s| match s {
                    Step::Action(cmd) => Some(format_command(black_box(base), &cmd.path())),
                    Step::Delay(_) => None,
                })
                .count()
        })
    });
}

criterion_group!(benches, bench_translate, bench_render_urls);
criterion_main!(benches);
