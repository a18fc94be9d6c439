//! Performance benchmarks for ferro-csq
//!
//! Run with: cargo bench
//! Run specific benchmark: cargo bench -- classify

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ferro_csq::coding::TranscriptLayout;
use ferro_csq::{
    AnnotationConfig, CodingContextResolver, ImpactClassifier, MockProvider,
    PhasedVariantMerger, ReferenceProvider, Variant,
};

/// A substitution at `pos` to a base different from the reference
fn snv(provider: &MockProvider, pos: u64) -> Variant {
    let base = provider.get_bases("1", pos, pos).unwrap();
    let alt = if base == "A" { "C" } else { "A" };
    Variant::new("1", pos, &base, alt).unwrap()
}

fn padded_insertion(provider: &MockProvider, pos: u64, inserted: &str) -> Variant {
    let base = provider.get_bases("1", pos, pos).unwrap();
    Variant::new("1", pos, &base, &format!("{}{}", base, inserted)).unwrap()
}

fn padded_deletion(provider: &MockProvider, pos: u64, len: u64) -> Variant {
    let bases = provider.get_bases("1", pos, pos + len).unwrap();
    Variant::new("1", pos, &bases, &bases[..1]).unwrap()
}

// =============================================================================
// Coding context benchmarks
// =============================================================================

fn bench_resolve(c: &mut Criterion) {
    let provider = MockProvider::with_test_data();
    let config = AnnotationConfig::default();
    let mut group = c.benchmark_group("resolve");

    for (name, tx_id, pos) in [
        ("plus_coding", "TX_B", 320),
        ("plus_intronic", "TX_B", 400),
        ("minus_coding", "TX_C", 880),
        ("upstream", "TX_A", 40),
    ] {
        let transcript = provider.get_transcript(tx_id).unwrap();
        let layout = TranscriptLayout::new(&transcript);
        let resolver = CodingContextResolver::new(&layout, &config);
        let variant = snv(&provider, pos);
        group.bench_with_input(BenchmarkId::new("region", name), &variant, |b, v| {
            b.iter(|| resolver.resolve(black_box(v)))
        });
    }
    group.finish();
}

// =============================================================================
// Classification benchmarks
// =============================================================================

/// Benchmark full classification for different variant shapes
fn bench_classify(c: &mut Criterion) {
    let provider = MockProvider::with_test_data();
    let classifier = ImpactClassifier::default();
    let tx_b = provider.get_transcript("TX_B").unwrap();

    let variants = vec![
        ("snv", snv(&provider, 322)),
        ("inframe_ins", padded_insertion(&provider, 320, "GCA")),
        ("inframe_del", padded_deletion(&provider, 320, 3)),
        ("frameshift", padded_deletion(&provider, 320, 1)),
        ("splice_donor", snv(&provider, 361)),
    ];

    let mut group = c.benchmark_group("classify");
    for (name, variant) in &variants {
        group.bench_with_input(BenchmarkId::new("shape", name), variant, |b, v| {
            b.iter(|| classifier.classify(black_box(v), &tx_b, &provider))
        });
    }
    group.finish();
}

/// Benchmark gene-cache driven annotation across the test chromosome
fn bench_annotate_throughput(c: &mut Criterion) {
    let provider = MockProvider::with_test_data();
    let classifier = ImpactClassifier::default();
    let variants: Vec<Variant> = (50..1150).step_by(11).map(|p| snv(&provider, p)).collect();

    let mut group = c.benchmark_group("annotate_throughput");
    group.throughput(Throughput::Elements(variants.len() as u64));
    group.bench_function("sequential", |b| {
        b.iter(|| {
            for v in &variants {
                let _ = classifier.annotate(black_box(v), &provider, &provider);
            }
        })
    });

    #[cfg(feature = "parallel")]
    group.bench_function("parallel", |b| {
        b.iter(|| {
            ferro_csq::parallel::annotate_parallel(
                &classifier,
                black_box(&variants),
                &provider,
                &provider,
            )
        })
    });
    group.finish();
}

// =============================================================================
// Phased merge benchmarks
// =============================================================================

fn bench_phased_merge(c: &mut Criterion) {
    let provider = MockProvider::with_test_data();
    let classifier =
        ImpactClassifier::new(AnnotationConfig::default().with_realign_indels(false));
    let members: Vec<_> = [
        padded_insertion(&provider, 105, "A").with_phase_id(1),
        padded_insertion(&provider, 114, "GG").with_phase_id(1),
    ]
    .into_iter()
    .map(|v| {
        let impacts = classifier.annotate(&v, &provider, &provider).unwrap();
        (v, impacts)
    })
    .collect();

    c.bench_function("phased_merge", |b| {
        b.iter(|| {
            let mut merger = PhasedVariantMerger::new(AnnotationConfig::default());
            for (variant, impacts) in &members {
                let _ = merger.add_if_phased(variant, impacts);
            }
            for mut group in merger.flush_all() {
                let _ = merger.merge_group(black_box(&mut group), &provider, &provider);
            }
        })
    });
}

criterion_group!(
    benches,
    bench_resolve,
    bench_classify,
    bench_annotate_throughput,
    bench_phased_merge,
);
criterion_main!(benches);
