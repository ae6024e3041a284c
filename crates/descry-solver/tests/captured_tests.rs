use super::*;
use crate::builtins::BuiltinClass;

fn param_of(interner: &TypeInterner, builtin: BuiltinClass) -> TypeParamId {
    interner.parameters_of(builtin.constructor())[0]
}

#[test]
fn test_covariant_capture_representatives() {
    let interner = TypeInterner::new();
    let captured = capture(&interner, TypeProjection::covariant(TypeId::STRING));
    assert!(is_captured(&interner, captured));
    assert_eq!(upper_representative(&interner, captured), Some(TypeId::STRING));
    assert_eq!(lower_representative(&interner, captured), Some(TypeId::NOTHING));
}

#[test]
fn test_contravariant_capture_representatives() {
    let interner = TypeInterner::new();
    let captured = capture(&interner, TypeProjection::contravariant(TypeId::INT));
    assert_eq!(upper_representative(&interner, captured), Some(TypeId::NULLABLE_ANY));
    assert_eq!(lower_representative(&interner, captured), Some(TypeId::INT));
}

#[test]
fn test_star_capture_is_out_nullable_any() {
    let interner = TypeInterner::new();
    let captured = capture(&interner, TypeProjection::Star);
    assert_eq!(upper_representative(&interner, captured), Some(TypeId::NULLABLE_ANY));
    assert_eq!(lower_representative(&interner, captured), Some(TypeId::NOTHING));
}

#[test]
#[should_panic(expected = "only nontrivial projections can be captured")]
fn test_capturing_invariant_projection_panics() {
    let interner = TypeInterner::new();
    capture(&interner, TypeProjection::invariant(TypeId::STRING));
}

#[test]
fn test_each_capture_is_fresh() {
    let interner = TypeInterner::new();
    let a = capture(&interner, TypeProjection::covariant(TypeId::STRING));
    let b = capture(&interner, TypeProjection::covariant(TypeId::STRING));
    assert_ne!(a, b);
    assert!(same_type_constructor(&interner, a, b));

    let c = capture(&interner, TypeProjection::covariant(TypeId::INT));
    assert!(!same_type_constructor(&interner, a, c));
    assert!(!same_type_constructor(&interner, a, TypeId::STRING));
}

#[test]
fn test_nullable_captured_keeps_nullability_in_representatives() {
    let interner = TypeInterner::new();
    let captured = capture(&interner, TypeProjection::covariant(TypeId::STRING));
    let nullable = interner.with_nullability(captured, true);
    let upper = upper_representative(&interner, nullable).expect("captured");
    assert!(interner.is_nullable(upper));
    assert_eq!(interner.with_nullability(upper, false), TypeId::STRING);
}

#[test]
fn test_non_captured_types_have_no_representatives() {
    let interner = TypeInterner::new();
    assert!(!is_captured(&interner, TypeId::STRING));
    assert_eq!(upper_representative(&interner, TypeId::STRING), None);
    assert_eq!(lower_representative(&interner, TypeId::STRING), None);
}

#[test]
fn test_create_captured_if_needed_without_parameter_is_identity() {
    let interner = TypeInterner::new();
    let projection = TypeProjection::contravariant(TypeId::STRING);
    assert_eq!(create_captured_if_needed(&interner, projection, None), projection);
    assert_eq!(
        create_captured_if_needed(&interner, TypeProjection::Star, None),
        TypeProjection::Star
    );
}

#[test]
fn test_create_captured_if_needed_keeps_invariant() {
    let interner = TypeInterner::new();
    let param = param_of(&interner, BuiltinClass::MutableList);
    let projection = TypeProjection::invariant(TypeId::STRING);
    assert_eq!(create_captured_if_needed(&interner, projection, Some(param)), projection);
}

#[test]
fn test_create_captured_if_needed_collapses_star_to_upper_bound() {
    let interner = TypeInterner::new();
    let param = param_of(&interner, BuiltinClass::List);
    assert_eq!(
        create_captured_if_needed(&interner, TypeProjection::Star, Some(param)),
        TypeProjection::invariant(TypeId::NULLABLE_ANY)
    );
}

#[test]
fn test_create_captured_if_needed_collapses_consistent_variance() {
    let interner = TypeInterner::new();
    // List<out E>: `out String` adds nothing to the declared variance.
    let list_param = param_of(&interner, BuiltinClass::List);
    assert_eq!(
        create_captured_if_needed(&interner, TypeProjection::covariant(TypeId::STRING), Some(list_param)),
        TypeProjection::invariant(TypeId::STRING)
    );

    // Comparable<in T>.
    let comparable_param = param_of(&interner, BuiltinClass::Comparable);
    assert_eq!(
        create_captured_if_needed(&interner, TypeProjection::contravariant(TypeId::INT), Some(comparable_param)),
        TypeProjection::invariant(TypeId::INT)
    );
}

#[test]
fn test_create_captured_if_needed_captures_use_site_variance() {
    let interner = TypeInterner::new();
    let param = param_of(&interner, BuiltinClass::MutableList);
    let result = create_captured_if_needed(&interner, TypeProjection::contravariant(TypeId::STRING), Some(param));
    let TypeProjection::Projected { variance, ty } = result else {
        panic!("expected a projected type, got {result:?}");
    };
    assert_eq!(variance, Variance::Invariant);
    assert!(is_captured(&interner, ty));
    assert_eq!(lower_representative(&interner, ty), Some(TypeId::STRING));
}
