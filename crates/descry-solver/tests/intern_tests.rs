use super::*;

#[test]
fn test_canonical_ids_are_stable() {
    let interner = TypeInterner::new();
    assert_eq!(interner.data(TypeId::ERROR), TypeData::Error);
    assert!(interner.is_builtin(TypeId::ANY, BuiltinClass::Any));
    assert!(!interner.is_nullable(TypeId::ANY));
    assert!(interner.is_nullable(TypeId::NULLABLE_ANY));
    assert!(interner.is_builtin(TypeId::STRING, BuiltinClass::String));
    assert!(interner.is_builtin(TypeId::INT_ARRAY, BuiltinClass::IntArray));
    assert_eq!(interner.with_nullability(TypeId::ANY, true), TypeId::NULLABLE_ANY);
    assert_eq!(interner.with_nullability(TypeId::NULLABLE_NOTHING, false), TypeId::NOTHING);
}

#[test]
fn test_interning_deduplicates_structurally() {
    let interner = TypeInterner::new();
    let a = interner.builtin_type(BuiltinClass::List, &[TypeProjection::covariant(TypeId::STRING)]);
    let b = interner.builtin_type(BuiltinClass::List, &[TypeProjection::covariant(TypeId::STRING)]);
    let c = interner.builtin_type(BuiltinClass::List, &[TypeProjection::invariant(TypeId::STRING)]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.render(a), "List<out String>");
}

#[test]
fn test_builtin_parameters_and_supertypes() {
    let interner = TypeInterner::new();
    let list = BuiltinClass::MutableList.constructor();
    let params = interner.parameters_of(list);
    assert_eq!(params.len(), 1);
    let param = interner.type_param(params[0]);
    assert_eq!(param.owner, list);
    assert_eq!(param.variance, Variance::Invariant);
    assert_eq!(interner.upper_bound(params[0]), TypeId::NULLABLE_ANY);

    let supertypes = interner
        .constructor(list)
        .static_supertypes()
        .expect("built-ins have static supertypes");
    let rendered: Vec<String> = supertypes.iter().map(|&ty| interner.render(ty)).collect();
    assert_eq!(rendered, vec!["List<E>", "MutableCollection<E>"]);

    let int_supers = interner
        .constructor(BuiltinClass::Int.constructor())
        .static_supertypes()
        .expect("Int has supertypes");
    let rendered: Vec<String> = int_supers.iter().map(|&ty| interner.render(ty)).collect();
    assert_eq!(rendered, vec!["Number", "Comparable<Int>"]);
}

#[test]
fn test_arrays() {
    let interner = TypeInterner::new();
    assert_eq!(interner.array_of(TypeId::INT), TypeId::INT_ARRAY);
    let strings = interner.array_of(TypeId::STRING);
    assert!(interner.is_array(strings));
    assert!(interner.is_array(TypeId::DOUBLE_ARRAY));
    assert!(!interner.is_array(TypeId::STRING));
    assert_eq!(interner.array_element_type(strings), Some(TypeId::STRING));
    assert_eq!(interner.array_element_type(TypeId::BYTE_ARRAY), Some(TypeId::BYTE));
    assert_eq!(interner.array_element_type(TypeId::STRING), None);
}

#[test]
fn test_not_found_constructor() {
    let interner = TypeInterner::new();
    let class_id = ClassId::from_string("org/sample/Missing");
    let ctor = interner.register_not_found(class_id.clone(), 2);
    let info = interner.constructor(ctor);
    assert!(info.is_not_found());
    assert_eq!(info.declaration, Declaration::NotFound(class_id));
    assert_eq!(interner.parameters_of(ctor).len(), 2);
    assert_eq!(info.static_supertypes().as_deref(), Some(&[TypeId::ANY][..]));
    assert_eq!(interner.render(interner.default_type(ctor)), "Missing<T0, T1>");
}

#[test]
fn test_upper_bound_is_write_once() {
    let interner = TypeInterner::new();
    let ctor = interner.register_constructor(TypeConstructorInfo::new(
        FqName::parse("org.sample.Box"),
        Declaration::NotFound(ClassId::from_string("org/sample/Box")),
    ));
    let param = interner.register_type_param(Name::identifier("T"), 0, Variance::Out, ctor);
    assert_eq!(interner.upper_bound(param), TypeId::NULLABLE_ANY);
    assert!(interner.set_upper_bound(param, TypeId::NUMBER));
    assert!(!interner.set_upper_bound(param, TypeId::STRING));
    assert_eq!(interner.upper_bound(param), TypeId::NUMBER);
}
