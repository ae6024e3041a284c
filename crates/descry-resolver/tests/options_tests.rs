use super::*;

#[test]
fn test_default_tables_name_real_builtins() {
    let options = ResolverOptions::default();
    options.validate().expect("defaults are valid");
    assert!(!options.approximate_contravariant_captured);
    assert_eq!(
        options.builtin_for_host_class("java.lang.Object"),
        Some(BuiltinClass::Any)
    );
    assert_eq!(
        options.builtin_for_host_class("java.util.List"),
        Some(BuiltinClass::MutableList)
    );
    assert_eq!(options.builtin_for_host_class("java.util.ArrayList"), None);
}

#[test]
fn test_pure_implementation_fallback_table() {
    let options = ResolverOptions::default();
    assert_eq!(
        options.pure_implementation_of("java.util.ArrayList"),
        Some("kotlin.collections.MutableList")
    );
    assert_eq!(
        options.pure_implementation_of("java.util.concurrent.ConcurrentHashMap"),
        Some("kotlin.collections.MutableMap")
    );
    assert_eq!(options.pure_implementation_of("org.sample.Foo"), None);
}

#[test]
fn test_from_json_keeps_omitted_defaults() {
    let options = ResolverOptions::from_json(
        r#"{ "approximate_contravariant_captured": true,
             "pure_implementations": { "kotlin.collections.MutableList": ["org.sample.Bag"] } }"#,
    )
    .expect("valid options");
    assert!(options.approximate_contravariant_captured);
    assert_eq!(
        options.pure_implementation_of("org.sample.Bag"),
        Some("kotlin.collections.MutableList")
    );
    assert_eq!(options.pure_implementation_of("java.util.ArrayList"), None);
    assert_eq!(options.host_classes, ResolverOptions::default().host_classes);
}

#[test]
fn test_from_json_rejects_unknown_builtin() {
    let err = ResolverOptions::from_json(r#"{ "host_classes": { "java.lang.Object": "kotlin.Thing" } }"#)
        .expect_err("kotlin.Thing is not a built-in");
    assert!(matches!(err, ConfigError::UnknownBuiltin(ref name) if name == "kotlin.Thing"));
}

#[test]
fn test_from_json_rejects_malformed_input() {
    let err = ResolverOptions::from_json("{ not json").expect_err("malformed");
    assert!(matches!(err, ConfigError::Json(_)));
}
