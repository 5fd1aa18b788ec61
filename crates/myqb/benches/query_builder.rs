use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use myqb::prelude::*;
use myqb::{QueryBuilder, Value};

/// SELECT col0, col1, ... FROM t WHERE `col0` = :p0 AND `col1` = :p1 ...
fn build_select(n: usize) -> QueryBuilder {
    let cols: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let conds: Vec<Condition> = (0..n)
        .map(|i| eq(format!("col{i}"), bind(format!("p{i}"), i as i64)))
        .collect();
    table("t").select(cols).where_all(conds).limit(100)
}

fn bench_render_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/render_select");

    for n in [1, 5, 10, 50, 100] {
        let qb = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.build()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/build_and_render");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).build()));
        });
    }

    group.finish();
}

fn bench_join_subquery(c: &mut Criterion) {
    c.bench_function("query_builder/join_subquery", |b| {
        b.iter(|| {
            let u = table("t_user").alias("u");
            let orders = table("t_order")
                .select(["user_id", "SUM(amount) AS total"])
                .and_where(gt("amount", bind("min_amount", 10)))
                .group(["user_id"])
                .label("o");
            let on = u.field("id").eq(orders.field("user_id"));
            let total = orders.field("total").gt(bind("min_total", 100));
            black_box(u.inner_join(&orders, on).and_where(total).build())
        });
    });
}

fn bench_insert_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/insert_many");

    for n in [10, 100, 1000] {
        let rows: Vec<Vec<(String, Value)>> = (0..n)
            .map(|i| row! { "id" => i as i64, "name" => format!("user{i}"), "age" => 20 })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| black_box(table("t_user").insert_many(rows.clone()).build()));
        });
    }

    group.finish();
}

fn bench_to_positional(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/to_positional");

    for n in [5, 20, 100, 500] {
        let ids: Vec<i64> = (0..n).collect();
        let built = table("t")
            .and_where(in_("id", bind("ids", ids)))
            .build()
            .expect("valid query");
        group.bench_with_input(BenchmarkId::from_parameter(n), &built, |b, built| {
            b.iter(|| black_box(built.to_positional()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render_select,
    bench_build_and_render,
    bench_join_subquery,
    bench_insert_many,
    bench_to_positional
);
criterion_main!(benches);
