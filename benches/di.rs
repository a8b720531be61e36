use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_ioc::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let ioc = Container::new();
    ioc.bind::<u64>().single_instance().to_instance(Arc::new(42));

    // Prime the singleton
    let _ = ioc.resolve::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = ioc.resolve::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let ioc = Container::new();
                ioc.bind::<ExpensiveToCreate>().single_instance().to_factory(|| {
                    Arc::new(ExpensiveToCreate {
                        data: (0..1000).collect(),
                    })
                });
                ioc
            },
            |ioc| {
                let v = ioc.resolve::<ExpensiveToCreate>().unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_concrete_vs_trait(c: &mut Criterion) {
    trait Service: Send + Sync {
        fn value(&self) -> u64;
    }
    struct Impl;
    impl Service for Impl {
        fn value(&self) -> u64 {
            7
        }
    }
    impl Injectable for Impl {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|_| Ok(Impl))]
        }
    }
    implements!(Impl => dyn Service);

    let mut group = c.benchmark_group("concrete_vs_trait");

    let ioc = Container::new();
    ioc.bind::<dyn Service>().to::<Impl>();

    group.bench_function("injectable", |b| {
        b.iter(|| black_box(ioc.resolve_injectable::<Impl>().unwrap().value()))
    });
    group.bench_function("trait_binding", |b| {
        b.iter(|| black_box(ioc.resolve::<dyn Service>().unwrap().value()))
    });

    group.finish();
}

fn bench_constructor_matching(c: &mut Criterion) {
    struct Leaf;
    impl Injectable for Leaf {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|_| Ok(Leaf))]
        }
    }
    struct Middle {
        _left: Arc<Leaf>,
        _right: Arc<Leaf>,
    }
    impl Injectable for Middle {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|args| {
                Ok(Middle {
                    _left: args.next()?,
                    _right: args.next()?,
                })
            })
            .inject::<Leaf>()
            .inject::<Leaf>()]
        }
    }
    struct Root {
        _a: Arc<Middle>,
        _b: Arc<Middle>,
        _config: Arc<String>,
    }
    impl Injectable for Root {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![
                Constructor::new(|args| {
                    Ok(Root {
                        _a: args.next()?,
                        _b: args.next()?,
                        _config: args.next()?,
                    })
                })
                .inject::<Middle>()
                .inject::<Middle>()
                .param::<String>(),
                // Never satisfiable: exercises constructor fallback.
                Constructor::new(|_| Err("unreachable".into())).keyed::<u8>("missing"),
            ]
        }
    }

    let ioc = Container::new();
    ioc.bind::<String>().single_instance().to_instance(Arc::new("config".into()));

    c.bench_function("construct_tree_depth_3", |b| {
        b.iter(|| black_box(ioc.resolve_injectable::<Root>().unwrap()))
    });
}

fn bench_keyed_lookup_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_lookup_scaling");

    for bindings in [1usize, 16, 256] {
        let ioc = Container::new();
        for i in 0..bindings {
            ioc.bind::<u64>().keyed(format!("k{}", i)).to_instance(Arc::new(i as u64));
        }
        let last = format!("k{}", bindings - 1);

        group.bench_with_input(BenchmarkId::from_parameter(bindings), &last, |b, key| {
            b.iter(|| black_box(ioc.resolve_keyed::<u64>(key).unwrap()))
        });
    }

    group.finish();
}

fn bench_resolve_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_all");

    for bindings in [1usize, 8, 64] {
        let ioc = Container::new();
        for i in 0..bindings {
            ioc.bind::<u32>()
                .keyed(format!("plugin{}", i))
                .single_instance()
                .to_instance(Arc::new(i as u32));
        }

        group.bench_with_input(BenchmarkId::from_parameter(bindings), &ioc, |b, ioc| {
            b.iter(|| black_box(ioc.resolve_all::<u32>().unwrap().len()))
        });
    }

    group.finish();
}

// ===== Macro Benchmarks =====

fn bench_parent_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("parent_chain");

    for depth in [1usize, 4, 16] {
        let root = Container::new();
        root.bind::<u64>().single_instance().to_instance(Arc::new(1));

        let mut leaf = root.clone();
        for _ in 0..depth {
            leaf = leaf.child();
        }

        group.bench_with_input(BenchmarkId::from_parameter(depth), &leaf, |b, leaf| {
            b.iter(|| black_box(leaf.resolve::<u64>().unwrap()))
        });
    }

    group.finish();
}

fn bench_concurrent_singleton(c: &mut Criterion) {
    let ioc = Container::new();
    ioc.bind::<Vec<u8>>()
        .single_instance()
        .to_factory(|| Arc::new(vec![0u8; 1024]));
    let _ = ioc.resolve::<Vec<u8>>().unwrap();

    c.bench_function("concurrent_singleton_4_threads", |b| {
        b.iter(|| {
            std::thread::scope(|scope| {
                for _ in 0..4 {
                    scope.spawn(|| {
                        for _ in 0..100 {
                            black_box(ioc.resolve::<Vec<u8>>().unwrap());
                        }
                    });
                }
            })
        })
    });
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_concrete_vs_trait,
    bench_constructor_matching,
    bench_keyed_lookup_scaling,
    bench_resolve_all
);

criterion_group!(macro_benches, bench_parent_chain, bench_concurrent_singleton);

criterion_main!(micro_benches, macro_benches);
