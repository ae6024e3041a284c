use super::*;
use crate::test_fixtures::{FakeClass, FakeClassLookup, reflect_module};
use descry_solver::captured::{is_captured, lower_representative, upper_representative};

/// A resolver over `org.sample.Box<T>` with the given approximation flag.
fn box_resolver(approximate: bool) -> (Resolver, Arc<LazyClassDescriptor>) {
    let options = ResolverOptions {
        approximate_contravariant_captured: approximate,
        ..ResolverOptions::default()
    };
    let resolver = Resolver::builder().options(options).build();
    let lookup = FakeClassLookup::new();
    lookup.add(FakeClass::class("org.sample.Box").type_parameter("T", Vec::new()));
    let module = reflect_module(&resolver, lookup).unwrap();
    let class = resolver
        .find_class(module, &ClassId::from_binary_name("org.sample.Box"))
        .unwrap()
        .unwrap();
    (resolver, class)
}

fn box_of(resolver: &Resolver, class: &LazyClassDescriptor, argument: TypeProjection) -> TypeId {
    resolver
        .components()
        .types()
        .class_type(class.type_constructor(), Arc::from([argument].as_slice()), false)
}

fn parameter_t(resolver: &Resolver, class: &LazyClassDescriptor) -> TypeId {
    let cx = resolver.components();
    let params = class.type_parameters(cx).unwrap().params;
    cx.types().parameter_type(params[0], false)
}

#[test]
fn test_member_type_through_out_projection_is_captured() {
    let (resolver, class) = box_resolver(false);
    let types = resolver.components().types();
    let receiver = box_of(&resolver, &class, TypeProjection::covariant(TypeId::STRING));

    let member = resolver.member_type(receiver, parameter_t(&resolver, &class));
    assert!(is_captured(types, member));
    assert_eq!(upper_representative(types, member), Some(TypeId::STRING));
    assert_eq!(lower_representative(types, member), Some(TypeId::NOTHING));
}

#[test]
fn test_member_type_through_in_projection_is_captured() {
    let (resolver, class) = box_resolver(false);
    let types = resolver.components().types();
    let receiver = box_of(&resolver, &class, TypeProjection::contravariant(TypeId::STRING));

    let member = resolver.member_type(receiver, parameter_t(&resolver, &class));
    assert!(is_captured(types, member));
    assert_eq!(upper_representative(types, member), Some(TypeId::NULLABLE_ANY));
    assert_eq!(lower_representative(types, member), Some(TypeId::STRING));
}

#[test]
fn test_invariant_receiver_substitutes_plainly() {
    let (resolver, class) = box_resolver(true);
    let receiver = box_of(&resolver, &class, TypeProjection::invariant(TypeId::STRING));
    assert_eq!(
        resolver.member_type(receiver, parameter_t(&resolver, &class)),
        TypeId::STRING
    );
}

#[test]
fn test_contravariant_captured_argument_is_approximated_when_enabled() {
    for approximate in [false, true] {
        let (resolver, class) = box_resolver(approximate);
        let types = resolver.components().types();
        let receiver = box_of(&resolver, &class, TypeProjection::contravariant(TypeId::STRING));
        // `Comparable<T>`: T lands in a contravariant position.
        let comparable_t = types.builtin_type(
            BuiltinClass::Comparable,
            &[TypeProjection::invariant(parameter_t(&resolver, &class))],
        );

        let member = resolver.member_type(receiver, comparable_t);
        assert_eq!(types.constructor_of(member), Some(BuiltinClass::Comparable.constructor()));
        let argument = types.arguments_of(member)[0];
        if approximate {
            assert_eq!(argument, TypeProjection::contravariant(TypeId::STRING));
        } else {
            let captured = argument.ty().unwrap();
            assert!(is_captured(types, captured), "{}", types.render_projection(argument));
            assert_eq!(lower_representative(types, captured), Some(TypeId::STRING));
        }
    }
}

#[test]
fn test_member_type_without_receiver_arguments_is_unchanged() {
    let (resolver, class) = box_resolver(true);
    let t = parameter_t(&resolver, &class);
    assert_eq!(resolver.member_type(TypeId::STRING, t), t);
}
