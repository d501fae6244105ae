use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use catalog_core::ProductId;
use catalog_infra::{InMemoryProductStore, ProductCatalog};
use catalog_products::{CreateProduct, Pagination};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn seeded_catalog(rt: &tokio::runtime::Runtime, count: usize) -> ProductCatalog<InMemoryProductStore> {
    let catalog = ProductCatalog::new(InMemoryProductStore::new());
    rt.block_on(async {
        for i in 0..count {
            catalog
                .create(CreateProduct::new(format!("product-{i}"), i as f64))
                .await
                .unwrap();
        }
    });
    catalog
}

fn bench_create_latency(c: &mut Criterion) {
    let rt = runtime();
    let catalog = ProductCatalog::new(InMemoryProductStore::new());

    c.bench_function("create_product", |b| {
        b.iter(|| {
            let product = rt
                .block_on(catalog.create(CreateProduct::new("Widget", 9.99)))
                .unwrap();
            black_box(product);
        });
    });
}

fn bench_find_all_by_table_size(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("find_all_products");

    for size in [100usize, 1_000, 10_000].iter() {
        let catalog = seeded_catalog(&rt, *size);
        let last = Pagination::new((*size / 10) as i64, 10).unwrap();

        group.bench_with_input(BenchmarkId::new("first_page", size), size, |b, _| {
            b.iter(|| black_box(rt.block_on(catalog.find_all(Pagination::default())).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("last_page", size), size, |b, _| {
            b.iter(|| black_box(rt.block_on(catalog.find_all(last)).unwrap()));
        });
    }

    group.finish();
}

fn bench_validate_throughput(c: &mut Criterion) {
    let rt = runtime();
    let catalog = seeded_catalog(&rt, 10_000);
    let mut group = c.benchmark_group("validate_products");

    for batch in [1i32, 10, 100, 1_000].iter() {
        let ids: Vec<ProductId> = (1..=*batch).map(ProductId::new).collect();
        group.throughput(Throughput::Elements(*batch as u64));
        group.bench_with_input(BenchmarkId::new("all_present", batch), &ids, |b, ids| {
            b.iter(|| black_box(rt.block_on(catalog.validate_products(ids)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_create_latency,
    bench_find_all_by_table_size,
    bench_validate_throughput
);
criterion_main!(benches);
