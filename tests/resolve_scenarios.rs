//! End-to-end resolution scenarios
//!
//! These tests drive the public `descry` surface the way an embedder would:
//! - Building modules and wiring dependencies
//! - Resolving reflective classes and their hierarchies lazily
//! - Reading serialized package parts next to reflective classes
//! - Collecting soft diagnostics

use descry::resolver::builtin_members::signature;
use descry::resolver::metadata::{
    ContainerMetadata, FunctionRecord, StringTable, TypeArgRef, TypeRecord, TypeRef,
};
use descry::resolver::test_fixtures::{
    FakeClass, FakeClassLookup, FakePackageParts, MAIN_MODULE, TestWorld, method,
};
use descry::solver::{BuiltinClass, TypeProjection};
use descry::{
    ClassId, DiagnosticCategory, FqName, ModuleError, Name, PrimitiveType, ResolveError, Resolver,
    ResolverOptions, TypeId,
};
use std::sync::Arc;

fn list_of(param: &str) -> TypeRef {
    TypeRef::generic(
        "java.util.List",
        vec![TypeArgRef::Type(TypeRef::Parameter(param.to_string()))],
    )
}

/// `java.util.AbstractList<E>` and `java.util.ArrayList<E>` as the host
/// reports them.
fn host_collections() -> Vec<FakeClass> {
    vec![
        FakeClass::class("java.util.AbstractList")
            .abstract_class()
            .type_parameter("E", Vec::new())
            .supertypes(vec![TypeRef::class("java.lang.Object"), list_of("E")]),
        FakeClass::class("java.util.ArrayList")
            .open()
            .type_parameter("E", Vec::new())
            .supertypes(vec![
                TypeRef::generic(
                    "java.util.AbstractList",
                    vec![TypeArgRef::Type(TypeRef::Parameter("E".to_string()))],
                ),
                list_of("E"),
            ])
            .method(method(
                "remove",
                &[("index", TypeRef::Primitive(PrimitiveType::Int))],
                Some(TypeRef::Parameter("E".to_string())),
                "(I)Ljava/lang/Object;",
            )),
    ]
}

fn rendered(resolver: &Resolver, types: &[TypeId]) -> Vec<String> {
    types.iter().map(|&ty| resolver.render(ty)).collect()
}

#[test]
fn test_collection_hierarchy_end_to_end() {
    let world = TestWorld::new(host_collections());
    let cx = world.cx();
    let array_list = world.class("java.util.ArrayList");

    let supertypes = array_list.supertypes(cx).unwrap();
    assert_eq!(
        rendered(&world.resolver, &supertypes),
        vec!["AbstractList<E>", "MutableList<E>"]
    );
    assert!(array_list.inherits_builtin(cx, BuiltinClass::Collection).unwrap());

    let types = cx.types();
    let of_strings = types.class_type(
        array_list.type_constructor(),
        Arc::from([TypeProjection::invariant(TypeId::STRING)].as_slice()),
        false,
    );
    let collection_of_any = types.builtin_type(
        BuiltinClass::Collection,
        &[TypeProjection::invariant(TypeId::ANY)],
    );
    let mutable_list_of_any = types.builtin_type(
        BuiltinClass::MutableList,
        &[TypeProjection::invariant(TypeId::ANY)],
    );
    assert!(world.resolver.is_subtype_of(of_strings, collection_of_any));
    assert!(!world.resolver.is_subtype_of(of_strings, mutable_list_of_any));
    assert!(world.reporter.is_empty());
}

#[test]
fn test_renamed_member_round_trip() {
    let world = TestWorld::new(host_collections());
    let cx = world.cx();
    let scope = world.class("java.util.ArrayList").member_scope(cx).unwrap();

    let remove_at = scope.functions_named(cx, Name::identifier("removeAt")).unwrap();
    assert_eq!(remove_at.len(), 1);
    let remove_at = cx.descriptors().function(remove_at[0]).unwrap();
    assert!(remove_at.is_renamed_on_host());

    let tables = cx.tables();
    let key = signature("java/util/List", "removeAt", "(I)Ljava/lang/Object;");
    let host_name = tables.host_name(&key).unwrap();
    assert_eq!(remove_at.host_name, Name::identifier(&host_name));
    assert!(
        tables
            .logical_names(&host_name)
            .iter()
            .any(|name| remove_at.name == Name::identifier(name))
    );
    assert!(tables.is_remove_at_by_index("removeAt", "(I)Ljava/lang/Object;"));
}

#[test]
fn test_serialized_and_reflective_content_side_by_side() {
    let table = Arc::new(StringTable::new());
    let mut metadata = ContainerMetadata::new(table.clone());
    metadata.functions = vec![FunctionRecord {
        name: table.intern("render"),
        return_type: Some(TypeRecord {
            class_id: table.intern("kotlin/String"),
            nullable: false,
        }),
        ..Default::default()
    }];
    let parts = FakePackageParts::new();
    parts.add_part("org.sample", "org/sample/RenderKt", metadata);

    let world = TestWorld::with_parts(vec![FakeClass::class("org.sample.Widget")], parts.clone());
    let cx = world.cx();
    let package = FqName::parse("org.sample");

    let fragments = world.resolver.package_fragments(world.module, &package).unwrap();
    assert_eq!(fragments.len(), 2);
    let scope = fragments
        .iter()
        .filter_map(|&id| cx.descriptors().package_fragment(id))
        .find_map(|fragment| fragment.member_scope().cloned())
        .unwrap();
    let render = scope.functions_named(cx, Name::identifier("render")).unwrap();
    assert_eq!(render.len(), 1);
    assert_eq!(cx.descriptors().function(render[0]).unwrap().return_type, TypeId::STRING);
    assert_eq!(parts.reads(), 1);

    let widget = world
        .resolver
        .find_class(world.module, &ClassId::from_binary_name("org.sample.Widget"))
        .unwrap();
    assert!(widget.is_some());
}

#[test]
fn test_dependency_order_does_not_poison_queries() {
    let resolver = Resolver::new();
    let app = resolver.create_module("<app>").unwrap();
    let library = resolver.create_module("<library>").unwrap();
    resolver.set_dependencies(app, &[app, library]).unwrap();
    resolver.set_dependencies(library, &[library]).unwrap();
    resolver
        .initialize(app, resolver.reflect_provider(app, FakeClassLookup::new()))
        .unwrap();

    let widget = ClassId::from_binary_name("org.sample.Widget");
    let err = resolver.find_class(app, &widget).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Module(ModuleError::DependencyNotInitialized { .. })
    ));

    let lookup = FakeClassLookup::new();
    lookup.add(FakeClass::class("org.sample.Widget"));
    resolver
        .initialize(library, resolver.reflect_provider(library, lookup))
        .unwrap();
    let class = resolver.find_class(app, &widget).unwrap().unwrap();
    assert_eq!(class.module(), library);
}

#[test]
fn test_incomplete_hierarchy_diagnostics_as_json() {
    let world = TestWorld::new(vec![
        FakeClass::class("org.sample.Broken").supertypes(vec![
            TypeRef::class("org.missing.Base"),
            TypeRef::class("java.lang.Object"),
        ]),
    ]);
    let cx = world.cx();
    let broken = world.class("org.sample.Broken");

    assert_eq!(&*broken.supertypes(cx).unwrap(), &[TypeId::ANY]);
    broken.supertypes(cx).unwrap();

    let diagnostics = world.reporter.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].category, DiagnosticCategory::IncompleteHierarchy);
    assert_eq!(diagnostics[0].supertypes, vec!["org.missing.Base"]);

    let json = world.reporter.to_json().unwrap();
    assert!(json.contains("\"incomplete-hierarchy\""), "{json}");
    assert!(json.contains("org.missing.Base"), "{json}");
}

#[test]
fn test_options_from_json_extend_pure_implementations() {
    let options = ResolverOptions::from_json(
        r#"{
            "pure_implementations": {
                "kotlin.collections.MutableList": ["org.sample.Buffer"]
            }
        }"#,
    )
    .unwrap();
    assert_eq!(
        options.host_classes.get("java.lang.Object").map(String::as_str),
        Some("kotlin.Any")
    );

    let resolver = Resolver::builder().options(options).build();
    let lookup = FakeClassLookup::new();
    lookup.add(
        FakeClass::class("org.sample.Buffer")
            .type_parameter("T", Vec::new())
            .supertypes(vec![TypeRef::class("java.lang.Object")]),
    );
    let module = resolver.create_module(MAIN_MODULE).unwrap();
    resolver.set_dependencies(module, &[module]).unwrap();
    resolver
        .initialize(module, resolver.reflect_provider(module, lookup))
        .unwrap();

    let buffer = resolver
        .find_class(module, &ClassId::from_binary_name("org.sample.Buffer"))
        .unwrap()
        .unwrap();
    let supertypes = buffer.supertypes(resolver.components()).unwrap();
    assert_eq!(rendered(&resolver, &supertypes), vec!["MutableList<T>"]);
}

#[test]
fn test_unknown_builtin_in_options_is_rejected() {
    let err = ResolverOptions::from_json(r#"{"host_classes": {"org.sample.Text": "kotlin.Text"}}"#)
        .unwrap_err();
    assert!(err.to_string().contains("kotlin.Text"));
}
