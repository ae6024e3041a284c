//! Concurrent queries against one resolver.
//!
//! Lazy cells must run each computation once no matter how many threads
//! race for it, and every thread must observe the same descriptors.

use descry::resolver::metadata::{TypeArgRef, TypeRef};
use descry::resolver::test_fixtures::{FakeClass, TestWorld};
use descry::{ClassId, DiagnosticCategory, Name, TypeId};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::sync::Arc;

const THREADS: usize = 64;

fn widgets(count: usize) -> Vec<FakeClass> {
    let mut classes = vec![
        FakeClass::class("org.sample.Base")
            .open()
            .type_parameter("T", Vec::new())
            .supertypes(vec![TypeRef::generic(
                "java.lang.Comparable",
                vec![TypeArgRef::Type(TypeRef::Parameter("T".to_string()))],
            )]),
    ];
    for i in 0..count {
        classes.push(FakeClass::class(&format!("org.sample.Widget{i}")).supertypes(vec![
            TypeRef::generic(
                "org.sample.Base",
                vec![TypeArgRef::Type(TypeRef::class("java.lang.String"))],
            ),
        ]));
    }
    classes
}

#[test]
fn test_racing_lookups_share_one_descriptor() {
    let world = TestWorld::new(widgets(1));
    let class_id = ClassId::from_binary_name("org.sample.Widget0");

    let found: Vec<_> = (0..THREADS)
        .into_par_iter()
        .map(|_| {
            world
                .resolver
                .find_class(world.module, &class_id)
                .unwrap()
                .unwrap()
        })
        .collect();

    let first = &found[0];
    assert!(found.iter().all(|class| Arc::ptr_eq(class, first)));
}

#[test]
fn test_supertypes_computed_once_under_contention() {
    let world = TestWorld::new(widgets(8));
    let cx = world.cx();
    let names: Vec<String> = (0..8).map(|i| format!("org.sample.Widget{i}")).collect();

    let rendered: Vec<SmallVec<[String; 2]>> = (0..THREADS)
        .into_par_iter()
        .map(|i| {
            let class = world.class(&names[i % names.len()]);
            class
                .supertypes(cx)
                .unwrap()
                .iter()
                .map(|&ty| cx.types().render(ty))
                .collect()
        })
        .collect();

    assert!(rendered.iter().all(|supertypes| supertypes.as_slice() == ["Base<String>"]));
    for name in &names {
        assert_eq!(world.class(name).supertype_computations(), 1, "{name}");
    }
    assert_eq!(world.class("org.sample.Base").supertype_computations(), 1);
    assert!(world.reporter.is_empty());
}

#[test]
fn test_member_scope_lookups_under_contention() {
    let world = TestWorld::new(vec![
        FakeClass::enum_class("org.sample.Color", &["RED", "GREEN", "BLUE"]),
    ]);
    let cx = world.cx();
    let color = world.class("org.sample.Color");

    let sizes: Vec<usize> = (0..THREADS)
        .into_par_iter()
        .map(|i| {
            let scope = color.member_scope(cx).unwrap();
            let name = if i % 2 == 0 { "values" } else { "valueOf" };
            scope.functions_named(cx, Name::identifier(name)).unwrap().len()
        })
        .collect();

    assert!(sizes.iter().all(|&size| size == 1));
    assert_eq!(color.member_scope_computations(), 1);
    assert_eq!(color.member_scope(cx).unwrap().computations(), 2);
}

#[test]
fn test_parallel_cycle_reports_once() {
    let world = TestWorld::new(vec![
        FakeClass::interface("org.sample.A").supertypes(vec![TypeRef::class("org.sample.B")]),
        FakeClass::interface("org.sample.B").supertypes(vec![TypeRef::class("org.sample.A")]),
    ]);
    let cx = world.cx();

    let results: Vec<Arc<[TypeId]>> = (0..THREADS)
        .into_par_iter()
        .map(|i| {
            let name = if i % 2 == 0 { "org.sample.A" } else { "org.sample.B" };
            world.class(name).supertypes(cx).unwrap()
        })
        .collect();

    let cut = results
        .iter()
        .filter(|supertypes| supertypes[..] == [TypeId::ANY])
        .count();
    assert!(cut > 0 && cut < THREADS, "exactly one class loses its edge");

    let diagnostics = world.reporter.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].category, DiagnosticCategory::CyclicHierarchy);
}
