use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lipi_core::convert::explain::explain;
use lipi_core::convert::transliterate;
use lipi_core::script::embedded;
use lipi_core::segment::segment;
use lipi_core::ScriptDefinition;

fn script(code: &str) -> ScriptDefinition {
    ScriptDefinition::from_toml(embedded(code).unwrap()).unwrap()
}

static INPUTS: &[(&str, &str)] = &[
    ("short", "राम"),
    ("medium", "ॐ नमः शिवाय। नमस्ते"),
    (
        "long",
        "धर्मक्षेत्रे कुरुक्षेत्रे समवेता युयुत्सवः। मामकाः पाण्डवाश्चैव किमकुर्वत सञ्जय॥",
    ),
];

static TARGETS: &[&str] = &["kn", "ta", "ro", "nr"];

fn bench_segment(c: &mut Criterion) {
    let de = script("de");
    let mut group = c.benchmark_group("segment/de");
    for &(label, text) in INPUTS {
        group.bench_with_input(BenchmarkId::new(label, text.len()), &text, |b, &text| {
            b.iter(|| segment(text, &de));
        });
    }
    group.finish();
}

fn bench_transliterate(c: &mut Criterion) {
    let de = script("de");
    let (_, long) = INPUTS[2];
    let mut group = c.benchmark_group("transliterate/de");
    for &code in TARGETS {
        let target = script(code);
        group.bench_with_input(BenchmarkId::new(code, long.len()), &long, |b, &text| {
            b.iter(|| transliterate(text, &de, &target));
        });
    }
    group.finish();
}

fn bench_explain(c: &mut Criterion) {
    let (de, kn) = (script("de"), script("kn"));
    let mut group = c.benchmark_group("explain/de-kn");
    for &(label, text) in INPUTS {
        group.bench_with_input(BenchmarkId::new(label, text.len()), &text, |b, &text| {
            b.iter(|| explain(text, &de, &kn));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_segment, bench_transliterate, bench_explain);
criterion_main!(benches);
