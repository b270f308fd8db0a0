use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tessera::{Column, ColumnRef, Dest, SelectStmt, Table, and, flatten, or, select};

/// SELECT col0 .. col{n-1} FROM t WHERE col0 = ? AND ( col1 > ? OR col1 < ? ) AND ...
fn build_select(n: usize) -> SelectStmt {
    let t = Table::new("t");
    let cols: Vec<Column<i64>> = (0..n).map(|i| t.column(format!("col{i}"))).collect();
    let refs: Vec<ColumnRef> = cols.iter().map(Column::to_ref).collect();

    let filters = cols.iter().enumerate().map(|(i, c)| {
        let i = i as i64;
        if i % 2 == 0 {
            c.eq(i)
        } else {
            or([c.gt(i), c.lt(-i)])
        }
    });
    select(&[&refs]).where_([and(filters)])
}

/// Same shape over two tables, so every column is qualified.
fn build_join(n: usize) -> SelectStmt {
    let a = Table::new("a");
    let b = Table::new("b");
    let left: Vec<Column<i64>> = (0..n).map(|i| a.column(format!("x{i}"))).collect();
    let right: Vec<Column<i64>> = (0..n).map(|i| b.column(format!("y{i}"))).collect();

    let joins: Vec<_> = left
        .iter()
        .zip(&right)
        .map(|(l, r)| l.eq_column(r))
        .collect();
    select(&[&left, &right]).where_(joins)
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("select/compile");

    for n in [1, 5, 10, 50, 100] {
        let stmt = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.compile()));
        });
    }

    group.finish();
}

fn bench_compile_qualified(c: &mut Criterion) {
    let mut group = c.benchmark_group("select/compile_qualified");

    for n in [1, 10, 100] {
        let stmt = build_join(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.compile()));
        });
    }

    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan/flatten");

    group.bench_function("tuple8", |b| {
        let mut row = (0i64, 0i64, 0i64, 0i64, String::new(), String::new(), 0i32, 0f64);
        b.iter(|| {
            let targets = flatten(vec![Dest::record(&mut row)]).unwrap();
            black_box(targets.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_compile_qualified, bench_flatten);
criterion_main!(benches);
