//! FILENAME: core/crosstab-engine/benches/crosstab_build.rs
//! Build + evaluate throughput for growing record counts and grouping depths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use crosstab_engine::{
    build_tree, cross_table, BuiltinMethod, CrossTabDefinition, Record, StatMethod, StatValue,
    StatisticSpec,
};

const REGIONS: [&str; 6] = ["North", "South", "East", "West", "Central", "Overseas"];
const PRODUCTS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

fn generate_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new()
                .with("region", REGIONS[i % REGIONS.len()])
                .with("product", PRODUCTS[(i / 3) % PRODUCTS.len()])
                .with("year", 2015 + (i % 10) as i64)
                .with("month", 1 + (i % 12) as i64)
                .with("amount", (i % 997) as f64 * 1.25)
                .with("quantity", (i % 13) as i64)
        })
        .collect()
}

fn definition(depth: usize) -> CrossTabDefinition {
    let keys = ["region", "product", "year", "month"];
    let mut def = CrossTabDefinition::new();
    def.row_keys = keys[..depth.min(2)].iter().map(|s| s.to_string()).collect();
    def.column_keys = keys[depth.min(2)..depth].iter().map(|s| s.to_string()).collect();
    def.statistics = vec![
        StatisticSpec::new("amount", "Sum of Amount", BuiltinMethod::Sum),
        StatisticSpec::new("amount", "Average Amount", BuiltinMethod::Avg),
        StatisticSpec::new("quantity", "Orders", BuiltinMethod::Count2),
        StatisticSpec::new(
            "amount",
            "Amount per Order",
            StatMethod::custom(|stats, _| {
                let amount = stats.get("Sum of Amount").map(StatValue::as_number).unwrap_or(0.0);
                let orders = stats.get("Orders").map(StatValue::as_number).unwrap_or(0.0);
                StatValue::Number(amount / orders)
            }),
        ),
    ];
    def
}

fn bench_build_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tree");
    for &count in &[1_000usize, 10_000, 100_000] {
        let records = generate_records(count);
        let def = definition(4);
        let keys = def.group_keys();
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| build_tree(black_box(records), &keys, &def.statistics));
        });
    }
    group.finish();
}

fn bench_cross_table_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_table_depth");
    let records = generate_records(50_000);
    for depth in 0..=4 {
        let def = definition(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &def, |b, def| {
            b.iter(|| cross_table(black_box(&records), def));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_tree, bench_cross_table_depth);
criterion_main!(benches);
