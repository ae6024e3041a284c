use super::*;

#[test]
fn test_renamed_method_round_trip() {
    let catalog = BuiltinMemberCatalog::default();
    let tables = BuiltinMemberTables::compile(&catalog);
    for method in &catalog.renamed_methods {
        let key = signature(&method.host_owner, &method.name, &method.descriptor);
        let host_name = tables.host_name(&key).expect("renamed method has a host name");
        assert_eq!(&*host_name, method.host_name.as_str());
        assert!(
            tables
                .logical_names(&host_name)
                .iter()
                .any(|name| **name == *method.name),
            "{} must be a candidate for {}",
            method.name,
            method.host_name
        );
    }
}

#[test]
fn test_examples_from_the_standard_catalogue() {
    let tables = BuiltinMemberTables::standard();
    assert_eq!(
        tables.host_name("java/lang/Number.toInt()I").as_deref(),
        Some("intValue")
    );
    assert_eq!(
        tables
            .host_name("java/util/List.removeAt(I)Ljava/lang/Object;")
            .as_deref(),
        Some("remove")
    );
    assert_eq!(tables.host_name("java/util/List.add(Ljava/lang/Object;)Z"), None);
    assert!(tables.logical_names("add").is_empty());
    assert!(tables.is_renamed_host_name("charAt"));
}

#[test]
fn test_special_properties_both_directions() {
    let tables = BuiltinMemberTables::standard();
    assert_eq!(
        tables
            .property_getter("kotlin.collections.Map", "keys")
            .as_deref(),
        Some("keySet")
    );
    assert_eq!(
        tables
            .property_getter("kotlin.collections.Collection", "size")
            .as_deref(),
        Some("size")
    );
    let names: Vec<&str> = tables
        .property_names_for_getter("entrySet")
        .iter()
        .map(|name| &**name)
        .collect();
    assert_eq!(names, vec!["entries"]);
    assert_eq!(tables.special_properties_of("kotlin.Enum").len(), 2);
}

#[test]
fn test_remapped_members_per_builtin() {
    let tables = BuiltinMemberTables::standard();
    assert!(tables.has_remapped_members("kotlin.Number"));
    assert!(tables.has_remapped_members("kotlin.collections.Map"));
    assert!(!tables.has_remapped_members("kotlin.collections.Iterable"));
    assert_eq!(tables.renamed_methods_of("kotlin.Number").len(), 6);
}

#[test]
fn test_erased_parameter_defaults() {
    let tables = BuiltinMemberTables::standard();
    assert_eq!(
        tables.default_value("java/util/Collection.contains(Ljava/lang/Object;)Z"),
        Some(DefaultValue::False)
    );
    assert_eq!(
        tables.default_value("java/util/Map.get(Ljava/lang/Object;)Ljava/lang/Object;"),
        Some(DefaultValue::Null)
    );
    assert_eq!(
        tables.default_value("java/util/List.indexOf(Ljava/lang/Object;)I"),
        Some(DefaultValue::Index(-1))
    );
    assert_eq!(
        tables.default_value("java/util/Collection.containsAll(Ljava/util/Collection;)Z"),
        None
    );
}

#[test]
fn test_special_signature_info() {
    let tables = BuiltinMemberTables::standard();
    assert_eq!(
        tables.special_signature_info("java/util/Collection.removeAll(Ljava/util/Collection;)Z"),
        Some(SpecialSignatureInfo::OneCollectionParameter)
    );
    assert_eq!(
        tables.special_signature_info("java/util/Map.remove(Ljava/lang/Object;)Ljava/lang/Object;"),
        Some(SpecialSignatureInfo::ObjectParameterGeneric)
    );
    assert_eq!(
        tables.special_signature_info("java/util/Map.containsKey(Ljava/lang/Object;)Z"),
        Some(SpecialSignatureInfo::ObjectParameterNonGeneric)
    );
    assert_eq!(tables.special_signature_info("java/util/Map.size()I"), None);
}

#[test]
fn test_remove_at_by_index() {
    let tables = BuiltinMemberTables::standard();
    assert!(tables.is_remove_at_by_index("removeAt", "(I)Ljava/lang/Object;"));
    assert!(!tables.is_remove_at_by_index("remove", "(I)Ljava/lang/Object;"));
    assert!(!tables.is_remove_at_by_index("removeAt", "(Ljava/lang/Object;)Z"));
}

#[test]
fn test_catalogue_loads_from_json() {
    let json = r#"{
        "renamed_methods": [{
            "builtin": "kotlin.Number",
            "host_owner": "host/Number",
            "name": "toInt",
            "descriptor": "()I",
            "host_name": "asInt"
        }],
        "erased_members": [{
            "host_owner": "host/Bag",
            "name": "has",
            "descriptor": "(Ljava/lang/Object;)Z",
            "kind": { "object_parameter": "false" }
        }]
    }"#;
    let catalog: BuiltinMemberCatalog = serde_json::from_str(json).expect("valid catalogue");
    // Omitted tables keep the standard entries.
    assert_eq!(
        catalog.special_properties,
        BuiltinMemberCatalog::default().special_properties
    );
    let tables = BuiltinMemberTables::compile(&catalog);
    assert_eq!(tables.host_name("host/Number.toInt()I").as_deref(), Some("asInt"));
    assert_eq!(
        tables.default_value("host/Bag.has(Ljava/lang/Object;)Z"),
        Some(DefaultValue::False)
    );
}
