use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use vcf_diff::diff::{column_tree, prune_columns, DiffView, PositionMatchingPairs};
use vcf_diff::encoder::VcfEncoder;
use vcf_diff::feed::MultiSourceFeed;

const LEFT: &str = "resources/oldqual.vcf";
const RIGHT: &str = "resources/newqual.vcf";

fn feed() -> MultiSourceFeed {
    MultiSourceFeed::from_paths(&[
        ("left".to_owned(), LEFT),
        ("right".to_owned(), RIGHT),
    ])
    .unwrap()
}

fn pair_count() -> usize {
    PositionMatchingPairs::new(feed()).count()
}

fn prune() -> usize {
    let feed = feed();
    let header = feed.header_rc();
    let view = DiffView::materialize(feed, VcfEncoder::new(header.clone())).unwrap();
    let tree = column_tree(&header);
    let map = prune_columns(&tree, view.all_pairs(), None);
    map.hidden_keys().count()
}

fn benchmark_pairing(c: &mut Criterion) {
    let mut group = c.benchmark_group("PAIRING");
    group.bench_with_input(BenchmarkId::new("PAIR_COUNT", LEFT), &LEFT, |b, _| {
        b.iter(pair_count)
    });
}

fn benchmark_pruning(c: &mut Criterion) {
    let mut group = c.benchmark_group("PRUNING");
    group.bench_with_input(BenchmarkId::new("HIDDEN_KEYS", LEFT), &LEFT, |b, _| {
        b.iter(prune)
    });
}

criterion_group!(benches, benchmark_pairing, benchmark_pruning);
criterion_main!(benches);
