//! Lazy resolution benchmarks.
//!
//! Measures first-access cost of class hierarchies and member scopes, and
//! the cost of hitting already-computed cells.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use descry::resolver::metadata::TypeRef;
use descry::resolver::test_fixtures::{FakeClass, TestWorld, method};
use descry::{ClassId, Name, PrimitiveType};

/// `org.sample.C0` through `org.sample.C{depth}`, each extending the
/// previous one.
fn chain(depth: usize) -> Vec<FakeClass> {
    (0..=depth)
        .map(|i| {
            let parent = if i == 0 {
                TypeRef::class("java.lang.Object")
            } else {
                TypeRef::class(&format!("org.sample.C{}", i - 1))
            };
            FakeClass::class(&format!("org.sample.C{i}"))
                .open()
                .supertypes(vec![parent])
                .method(method(
                    &format!("step{i}"),
                    &[("n", TypeRef::Primitive(PrimitiveType::Int))],
                    Some(TypeRef::Primitive(PrimitiveType::Int)),
                    "(I)I",
                ))
        })
        .collect()
}

fn bench_cold_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_cold_hierarchy");

    for depth in [4, 16, 64] {
        let top = format!("org.sample.C{depth}");
        group.bench_with_input(BenchmarkId::new("closure", depth), &top, |b, top| {
            b.iter(|| {
                let world = TestWorld::new(chain(depth));
                let class = world.class(top);
                black_box(class.supertype_closure(world.cx()).unwrap().len())
            });
        });
    }

    group.finish();
}

fn bench_warm_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_warm");
    let world = TestWorld::new(chain(16));
    let cx = world.cx();
    let class_id = ClassId::from_binary_name("org.sample.C16");
    let class = world.class("org.sample.C16");
    class.supertype_closure(cx).unwrap();
    let scope = class.member_scope(cx).unwrap();
    let step = Name::identifier("step16");
    scope.functions_named(cx, step).unwrap();

    group.bench_function("find_class", |b| {
        b.iter(|| {
            black_box(
                world
                    .resolver
                    .find_class(world.module, black_box(&class_id))
                    .unwrap(),
            )
        });
    });
    group.bench_function("supertypes", |b| {
        b.iter(|| black_box(class.supertypes(cx).unwrap()));
    });
    group.bench_function("functions_named", |b| {
        b.iter(|| black_box(scope.functions_named(cx, black_box(step)).unwrap()));
    });

    group.finish();
}

fn bench_cold_member_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_cold_member_scope");

    group.bench_function("all_descriptors", |b| {
        b.iter(|| {
            let world = TestWorld::new(chain(8));
            let class = world.class("org.sample.C8");
            let scope = class.member_scope(world.cx()).unwrap();
            black_box(scope.all_descriptors(world.cx()).unwrap().len())
        });
    });

    group.finish();
}

criterion_group!(
    resolve_benches,
    bench_cold_hierarchy,
    bench_warm_lookups,
    bench_cold_member_scope
);
criterion_main!(resolve_benches);
