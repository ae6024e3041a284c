use super::*;
use descry_common::FqName;

#[test]
fn test_static_types_of_primitive_constants() {
    assert_eq!(ConstantValue::Byte(1).ty(), TypeId::BYTE);
    assert_eq!(ConstantValue::Char('a').ty(), TypeId::CHAR);
    assert_eq!(ConstantValue::Long(1).ty(), TypeId::LONG);
    assert_eq!(ConstantValue::String(Arc::from("x")).ty(), TypeId::STRING);
    assert_eq!(ConstantValue::error("boom").ty(), TypeId::ERROR);
}

#[test]
fn test_error_marker() {
    let value = ConstantValue::error("Unexpected argument value");
    assert!(value.is_error());
    assert!(!ConstantValue::Int(3).is_error());
    assert_eq!(value.to_string(), "<error: Unexpected argument value>");
}

#[test]
fn test_display() {
    assert_eq!(ConstantValue::Int(42).to_string(), "42");
    assert_eq!(ConstantValue::Long(42).to_string(), "42L");
    assert_eq!(ConstantValue::Float(1.5).to_string(), "1.5f");
    assert_eq!(ConstantValue::String(Arc::from("a\"b")).to_string(), "\"a\\\"b\"");

    let class_id = ClassId::top_level(&FqName::parse("org.sample.Color"));
    let entry = ConstantValue::Enum {
        ty: TypeId::ANY,
        class_id: class_id.clone(),
        entry: Name::identifier("RED"),
    };
    assert_eq!(entry.to_string(), "Color.RED");

    let array = ConstantValue::Array {
        ty: TypeId::INT_ARRAY,
        element_type: TypeId::INT,
        elements: vec![ConstantValue::Int(1), ConstantValue::Int(2)],
    };
    assert_eq!(array.to_string(), "[1, 2]");
}

#[test]
fn test_annotation_arguments_keep_order() {
    let class_id = ClassId::top_level(&FqName::parse("org.sample.Tag"));
    let mut annotation = AnnotationValue::new(TypeId::ANNOTATION, class_id);
    annotation
        .arguments
        .insert(Name::identifier("b"), ConstantValue::Boolean(true));
    annotation
        .arguments
        .insert(Name::identifier("a"), ConstantValue::Int(1));

    assert_eq!(annotation.argument("a"), Some(&ConstantValue::Int(1)));
    assert_eq!(annotation.argument("c"), None);
    assert_eq!(annotation.to_string(), "@Tag(b = true, a = 1)");
}
