use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use kidstock_core::{BoundedName, ChildId};
use kidstock_infra::services::StockService;
use kidstock_infra::store::{EntityStore, InMemoryEntityStore};
use kidstock_inventory::{default_catalog, Child, ClothingCategoryId, Group, StockAdjustment};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

/// A seeded store holding one group with `children` children.
fn seeded_store(rt: &Runtime, children: usize) -> (Arc<InMemoryEntityStore>, Vec<ChildId>) {
    rt.block_on(async {
        let store = Arc::new(InMemoryEntityStore::new());
        for category in default_catalog() {
            store.upsert_category(category).await.unwrap();
        }
        let now = Utc::now();
        let group = store
            .insert_group(Group::new(BoundedName::parse("name", "Bench").unwrap(), now))
            .await
            .unwrap();
        let mut ids = Vec::with_capacity(children);
        for i in 0..children {
            let name = BoundedName::parse("name", &format!("child-{i}")).unwrap();
            let child = store.insert_child(Child::new(group.id, name, now)).await.unwrap();
            ids.push(child.id);
        }
        (store, ids)
    })
}

fn bench_adjustment_latency(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("stock_adjustment_latency");
    group.sample_size(1000);

    group.bench_function("increment", |b| {
        let (store, children) = seeded_store(&rt, 1);
        let svc = StockService::new(store);
        let child = children[0];
        b.iter(|| {
            rt.block_on(svc.increment(black_box(child), ClothingCategoryId(1), 1))
                .unwrap()
        });
    });

    group.bench_function("increment_then_decrement", |b| {
        let (store, children) = seeded_store(&rt, 1);
        let svc = StockService::new(store);
        let child = children[0];
        b.iter(|| {
            rt.block_on(async {
                svc.increment(child, ClothingCategoryId(2), 3).await.unwrap();
                svc.decrement(child, ClothingCategoryId(2), 3).await.unwrap()
            })
        });
    });

    group.bench_function("rejected_decrement", |b| {
        let (store, children) = seeded_store(&rt, 1);
        let svc = StockService::new(store);
        let child = children[0];
        b.iter(|| {
            rt.block_on(svc.decrement(black_box(child), ClothingCategoryId(3), 1))
                .unwrap_err()
        });
    });

    group.finish();
}

fn bench_contended_decrements(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("contended_decrements");

    for tasks in [2usize, 8, 32].iter() {
        group.throughput(Throughput::Elements(*tasks as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tasks), tasks, |b, &tasks| {
            let (store, children) = seeded_store(&rt, 1);
            let child = children[0];
            b.iter(|| {
                rt.block_on(async {
                    store
                        .adjust_stock(
                            child,
                            ClothingCategoryId(4),
                            StockAdjustment::increment(tasks as i64).unwrap(),
                            Utc::now(),
                        )
                        .await
                        .unwrap();
                    let handles: Vec<_> = (0..tasks)
                        .map(|_| {
                            let store = store.clone();
                            tokio::spawn(async move {
                                store
                                    .adjust_stock(
                                        child,
                                        ClothingCategoryId(4),
                                        StockAdjustment::decrement(1).unwrap(),
                                        Utc::now(),
                                    )
                                    .await
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.await.unwrap().unwrap();
                    }
                })
            });
        });
    }

    group.finish();
}

fn bench_stock_listing(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("stock_listing");

    for children in [1usize, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(children), children, |b, &children| {
            let (store, ids) = seeded_store(&rt, children);
            rt.block_on(async {
                for id in &ids {
                    for category in 1..=8 {
                        store
                            .adjust_stock(
                                *id,
                                ClothingCategoryId(category),
                                StockAdjustment::increment(category).unwrap(),
                                Utc::now(),
                            )
                            .await
                            .unwrap();
                    }
                }
            });
            let svc = StockService::new(store);
            let target = ids[ids.len() / 2];
            b.iter(|| rt.block_on(svc.child_stock(black_box(target))).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_adjustment_latency,
    bench_contended_decrements,
    bench_stock_listing
);
criterion_main!(benches);
