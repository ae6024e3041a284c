use super::*;
use crate::builtins::BuiltinClass;
use crate::captured::is_captured;

fn param_of(interner: &TypeInterner, builtin: BuiltinClass) -> TypeParamId {
    interner.parameters_of(builtin.constructor())[0]
}

#[test]
fn test_empty_substitution_is_identity() {
    let interner = TypeInterner::new();
    let list = interner.default_type(BuiltinClass::List.constructor());
    let substitution = TypeSubstitution::empty();
    assert!(substitution.is_empty());
    assert_eq!(substitution.substitute(&interner, list), list);
}

#[test]
fn test_from_arguments_pairs_positionally() {
    let interner = TypeInterner::new();
    let map_params = interner.parameters_of(BuiltinClass::Map.constructor());
    let substitution = TypeSubstitution::from_arguments(
        &map_params,
        &[
            TypeProjection::invariant(TypeId::STRING),
            TypeProjection::invariant(TypeId::INT),
            TypeProjection::invariant(TypeId::LONG),
        ],
    );
    assert_eq!(substitution.len(), 2);
    let map = interner.default_type(BuiltinClass::Map.constructor());
    assert_eq!(interner.render(substitution.substitute(&interner, map)), "Map<String, Int>");
}

#[test]
fn test_replacement_projection_lands_in_invariant_position() {
    let interner = TypeInterner::new();
    let e = param_of(&interner, BuiltinClass::MutableList);
    let mut substitution = TypeSubstitution::empty();
    substitution.insert(e, TypeProjection::covariant(TypeId::STRING));

    let list = interner.default_type(BuiltinClass::MutableList.constructor());
    let result = substitution.substitute(&interner, list);
    assert_eq!(interner.render(result), "MutableList<out String>");
}

#[test]
fn test_conflicting_projection_becomes_star() {
    let interner = TypeInterner::new();
    let e = param_of(&interner, BuiltinClass::MutableList);
    let mut substitution = TypeSubstitution::empty();
    substitution.insert(e, TypeProjection::contravariant(TypeId::STRING));

    let out_e = interner.builtin_type(
        BuiltinClass::MutableList,
        &[TypeProjection::covariant(interner.parameter_type(e, false))],
    );
    let result = substitution.substitute(&interner, out_e);
    assert_eq!(interner.render(result), "MutableList<*>");
}

#[test]
fn test_invariant_replacement_takes_position_variance() {
    let interner = TypeInterner::new();
    let e = param_of(&interner, BuiltinClass::MutableList);
    let mut substitution = TypeSubstitution::empty();
    substitution.insert(e, TypeProjection::invariant(TypeId::STRING));

    let out_e = interner.builtin_type(
        BuiltinClass::MutableList,
        &[TypeProjection::covariant(interner.parameter_type(e, false))],
    );
    assert_eq!(
        interner.render(substitution.substitute(&interner, out_e)),
        "MutableList<out String>"
    );
}

#[test]
fn test_nullable_parameter_keeps_nullability() {
    let interner = TypeInterner::new();
    let e = param_of(&interner, BuiltinClass::List);
    let mut substitution = TypeSubstitution::empty();
    substitution.insert(e, TypeProjection::invariant(TypeId::STRING));
    let nullable_e = interner.parameter_type(e, true);
    assert_eq!(
        substitution.substitute(&interner, nullable_e),
        interner.with_nullability(TypeId::STRING, true)
    );
}

#[test]
fn test_top_level_star_uses_upper_bound() {
    let interner = TypeInterner::new();
    let e = param_of(&interner, BuiltinClass::List);
    let mut substitution = TypeSubstitution::empty();
    substitution.insert(e, TypeProjection::Star);
    assert_eq!(
        substitution.substitute(&interner, interner.parameter_type(e, false)),
        TypeId::NULLABLE_ANY
    );
}

#[test]
fn test_unmapped_parameters_are_untouched() {
    let interner = TypeInterner::new();
    let list_e = param_of(&interner, BuiltinClass::List);
    let set_e = param_of(&interner, BuiltinClass::Set);
    let mut substitution = TypeSubstitution::empty();
    substitution.insert(list_e, TypeProjection::invariant(TypeId::INT));
    let set = interner.default_type(BuiltinClass::Set.constructor());
    assert_eq!(substitution.substitute(&interner, set), set);
    assert_eq!(substitution.get(set_e), None);
}

#[test]
fn test_compose_applies_outer_after_inner() {
    let interner = TypeInterner::new();
    let list_e = param_of(&interner, BuiltinClass::List);
    let set_e = param_of(&interner, BuiltinClass::Set);

    let mut inner = TypeSubstitution::empty();
    inner.insert(list_e, TypeProjection::invariant(interner.parameter_type(set_e, false)));
    let mut outer = TypeSubstitution::empty().with_approximate_contravariant_captured(true);
    outer.insert(set_e, TypeProjection::invariant(TypeId::CHAR));

    let composed = inner.compose(&interner, &outer);
    assert!(composed.approximates_contravariant_captured());
    assert_eq!(composed.get(list_e), Some(TypeProjection::invariant(TypeId::CHAR)));
    assert_eq!(composed.get(set_e), Some(TypeProjection::invariant(TypeId::CHAR)));

    let list = interner.default_type(BuiltinClass::List.constructor());
    assert_eq!(interner.render(composed.substitute(&interner, list)), "List<Char>");
}

#[test]
fn test_compose_without_flags_stays_exact() {
    let interner = TypeInterner::new();
    let composed = TypeSubstitution::empty().compose(&interner, &TypeSubstitution::empty());
    assert!(!composed.approximates_contravariant_captured());
}

#[test]
fn test_capturing_substitution_approximates_contravariant_positions() {
    let interner = TypeInterner::new();
    let e = param_of(&interner, BuiltinClass::MutableList);
    let mut base = TypeSubstitution::empty();
    base.insert(e, TypeProjection::contravariant(TypeId::STRING));

    // Comparable<in T> puts E in a contravariant position.
    let comparable_e = interner.builtin_type(
        BuiltinClass::Comparable,
        &[TypeProjection::invariant(interner.parameter_type(e, false))],
    );

    let approximating = base.with_capturing(&interner, true);
    assert!(approximating.approximates_contravariant_captured());
    assert_eq!(
        interner.render(approximating.substitute(&interner, comparable_e)),
        "Comparable<in String>"
    );

    let exact = base.with_capturing(&interner, false);
    let result = exact.substitute(&interner, comparable_e);
    let argument = interner.arguments_of(result)[0];
    let captured = argument.ty().expect("projected");
    assert!(is_captured(&interner, captured));
}

#[test]
fn test_capturing_collapses_consistent_projection() {
    let interner = TypeInterner::new();
    let e = param_of(&interner, BuiltinClass::List);
    let mut base = TypeSubstitution::empty();
    base.insert(e, TypeProjection::covariant(TypeId::STRING));
    let capturing = base.with_capturing(&interner, false);
    assert_eq!(capturing.get(e), Some(TypeProjection::invariant(TypeId::STRING)));
}
