//! Annotation and constant decoding.
//!
//! Serialized argument values are checked against the type the annotation
//! class declares for the parameter. Problems the caller can live with
//! (unknown enum entries, values of the wrong type) become
//! [`ConstantValue::Error`]; constructs the model cannot express (class
//! literals, arrays of arrays) are [`DecodeError`]s.

use crate::class::ClassKind;
use crate::constants::{AnnotationValue, ConstantValue};
use crate::descriptors::Descriptor;
use crate::error::{DecodeError, ResolveError};
use crate::metadata::{AnnotationRecord, NameResolver, ReflectAnnotation, ReflectValue, ValueRecord, ValueTag};
use crate::resolver::Components;
use descry_common::limits::MAX_ANNOTATION_NESTING;
use descry_common::{ClassId, DescriptorId, Name};
use descry_solver::TypeId;
use std::sync::Arc;
use tracing::debug;

pub struct AnnotationDecoder<'a> {
    cx: &'a Components,
    module: DescriptorId,
}

impl<'a> AnnotationDecoder<'a> {
    /// Annotation and enum classes are looked up from `module`.
    pub fn new(cx: &'a Components, module: DescriptorId) -> Self {
        AnnotationDecoder { cx, module }
    }

    /// Decode one annotation. Arguments are kept only when the annotation
    /// class resolves to an annotation class with exactly one constructor;
    /// arguments naming no parameter are dropped.
    pub fn decode_annotation(
        &self,
        record: &AnnotationRecord,
        names: &dyn NameResolver,
    ) -> Result<AnnotationValue, ResolveError> {
        self.decode_annotation_at(record, names, 0)
    }

    fn decode_annotation_at(
        &self,
        record: &AnnotationRecord,
        names: &dyn NameResolver,
        depth: u32,
    ) -> Result<AnnotationValue, ResolveError> {
        let cx = self.cx;
        let class_id = names.class_id(record.class_id);
        let ty = cx.class_type(self.module, &class_id)?;
        let mut value = AnnotationValue::new(ty, class_id);
        if record.arguments.is_empty() {
            return Ok(value);
        }

        let Some(class) = cx.module(self.module)?.find_class(cx, &value.class_id)? else {
            return Ok(value);
        };
        if class.kind() != ClassKind::AnnotationClass {
            return Ok(value);
        }
        let constructors = class.constructors(cx)?;
        let [constructor] = &*constructors else {
            return Ok(value);
        };
        let Some(Descriptor::Constructor(constructor)) = cx.descriptors().get(*constructor) else {
            return Ok(value);
        };

        for argument in &record.arguments {
            let name = names.name(argument.name);
            let Some(parameter) = constructor
                .value_parameters
                .iter()
                .find(|parameter| parameter.name == name)
            else {
                debug!(annotation = %value.class_id, argument = %name, "AnnotationDecoder: no such parameter");
                continue;
            };
            let decoded = self.decode_value_at(parameter.ty, &argument.value, names, depth)?;
            value.arguments.insert(name, decoded);
        }
        Ok(value)
    }

    /// Decode `value` and check it against `expected`.
    pub fn decode_value(
        &self,
        expected: TypeId,
        value: &ValueRecord,
        names: &dyn NameResolver,
    ) -> Result<ConstantValue, ResolveError> {
        self.decode_value_at(expected, value, names, 0)
    }

    fn decode_value_at(
        &self,
        expected: TypeId,
        value: &ValueRecord,
        names: &dyn NameResolver,
        depth: u32,
    ) -> Result<ConstantValue, ResolveError> {
        let decoded = match value.tag {
            ValueTag::Byte => ConstantValue::Byte(value.int_value as i8),
            ValueTag::Char => ConstantValue::Char(
                char::from_u32(u32::from(value.int_value as u16)).unwrap_or(char::REPLACEMENT_CHARACTER),
            ),
            ValueTag::Short => ConstantValue::Short(value.int_value as i16),
            ValueTag::Int => ConstantValue::Int(value.int_value as i32),
            ValueTag::Long => ConstantValue::Long(value.int_value),
            ValueTag::Float => ConstantValue::Float(value.float_value),
            ValueTag::Double => ConstantValue::Double(value.double_value),
            ValueTag::Boolean => ConstantValue::Boolean(value.int_value != 0),
            ValueTag::String => ConstantValue::String(names.string(value.string_value)),
            ValueTag::Class => {
                return Err(DecodeError::ClassLiteral {
                    class_id: names.class_id(value.class_id).to_string(),
                }
                .into());
            }
            ValueTag::Enum => self.resolve_enum(names.class_id(value.class_id), names.name(value.enum_value))?,
            ValueTag::Annotation => match &value.annotation {
                Some(_) if depth >= MAX_ANNOTATION_NESTING => ConstantValue::error("Annotation nesting is too deep"),
                Some(record) => ConstantValue::Annotation(self.decode_annotation_at(record, names, depth + 1)?),
                None => ConstantValue::error("Missing annotation value"),
            },
            ValueTag::Array => self.decode_array(expected, value, names, depth)?,
        };
        Ok(self.check_type(expected, decoded))
    }

    fn decode_array(
        &self,
        expected: TypeId,
        value: &ValueRecord,
        names: &dyn NameResolver,
        depth: u32,
    ) -> Result<ConstantValue, ResolveError> {
        let types = self.cx.types();
        let expected_element = types.array_element_type(expected);
        let ty = match value.array_elements.first() {
            Some(first) => types.array_of(self.element_type(first, names)?),
            None if expected_element.is_some() => expected,
            None => types.array_of(TypeId::ANY),
        };
        let element_type = types.array_element_type(ty).unwrap_or(TypeId::ANY);
        let elements = value
            .array_elements
            .iter()
            .map(|element| self.decode_value_at(expected_element.unwrap_or(element_type), element, names, depth))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConstantValue::Array {
            ty,
            element_type,
            elements,
        })
    }

    /// Static type of an array element, from its tag alone.
    fn element_type(&self, element: &ValueRecord, names: &dyn NameResolver) -> Result<TypeId, ResolveError> {
        Ok(match element.tag {
            ValueTag::Byte => TypeId::BYTE,
            ValueTag::Char => TypeId::CHAR,
            ValueTag::Short => TypeId::SHORT,
            ValueTag::Int => TypeId::INT,
            ValueTag::Long => TypeId::LONG,
            ValueTag::Float => TypeId::FLOAT,
            ValueTag::Double => TypeId::DOUBLE,
            ValueTag::Boolean => TypeId::BOOLEAN,
            ValueTag::String => TypeId::STRING,
            ValueTag::Class => return Err(DecodeError::ArrayOfClassLiterals.into()),
            ValueTag::Enum => self.cx.class_type(self.module, &names.class_id(element.class_id))?,
            ValueTag::Annotation => match &element.annotation {
                Some(record) => self.cx.class_type(self.module, &names.class_id(record.class_id))?,
                None => TypeId::ERROR,
            },
            ValueTag::Array => return Err(DecodeError::ArrayOfArrays.into()),
        })
    }

    fn resolve_enum(&self, class_id: ClassId, entry: Name) -> Result<ConstantValue, ResolveError> {
        let cx = self.cx;
        let ty = cx.class_type(self.module, &class_id)?;
        let class = cx.module(self.module)?.find_class(cx, &class_id)?;
        let resolved = match &class {
            Some(class) => class.kind() == ClassKind::Enum && class.has_enum_entry(cx, entry)?,
            None => false,
        };
        if !resolved {
            debug!(class = %class_id, entry = %entry, "AnnotationDecoder: unresolved enum entry");
            return Ok(ConstantValue::error(format!(
                "Unresolved enum entry: {}.{entry}",
                class_id.as_single_fq_name()
            )));
        }
        Ok(ConstantValue::Enum {
            ty,
            class_id,
            entry,
        })
    }

    fn check_type(&self, expected: TypeId, value: ConstantValue) -> ConstantValue {
        if value.is_error() || self.cx.is_subtype_of(value.ty(), expected) {
            return value;
        }
        debug!(
            expected = %self.cx.types().render(expected),
            actual = %self.cx.types().render(value.ty()),
            "AnnotationDecoder: unexpected argument value"
        );
        ConstantValue::error("Unexpected argument value")
    }

    // -------------------------------------------------------------------------
    // Reflection
    // -------------------------------------------------------------------------

    /// Convert an annotation reported by reflection. Values come typed, so
    /// nothing is checked against parameter types.
    pub fn convert_reflect_annotation(&self, annotation: &ReflectAnnotation) -> Result<AnnotationValue, ResolveError> {
        self.convert_reflect_annotation_at(annotation, 0)
    }

    fn convert_reflect_annotation_at(
        &self,
        annotation: &ReflectAnnotation,
        depth: u32,
    ) -> Result<AnnotationValue, ResolveError> {
        let class_id = ClassId::from_binary_name(&annotation.class_name);
        let ty = self.cx.class_type(self.module, &class_id)?;
        let mut value = AnnotationValue::new(ty, class_id);
        for (name, argument) in &annotation.arguments {
            let converted = self.convert_reflect_value(argument, depth)?;
            value.arguments.insert(Name::identifier(name), converted);
        }
        Ok(value)
    }

    fn convert_reflect_value(&self, value: &ReflectValue, depth: u32) -> Result<ConstantValue, ResolveError> {
        let types = self.cx.types();
        Ok(match value {
            ReflectValue::Boolean(v) => ConstantValue::Boolean(*v),
            ReflectValue::Char(v) => ConstantValue::Char(*v),
            ReflectValue::Byte(v) => ConstantValue::Byte(*v),
            ReflectValue::Short(v) => ConstantValue::Short(*v),
            ReflectValue::Int(v) => ConstantValue::Int(*v),
            ReflectValue::Long(v) => ConstantValue::Long(*v),
            ReflectValue::Float(v) => ConstantValue::Float(*v),
            ReflectValue::Double(v) => ConstantValue::Double(*v),
            ReflectValue::String(v) => ConstantValue::String(Arc::from(v.as_str())),
            ReflectValue::Enum { class_name, entry } => {
                self.resolve_enum(ClassId::from_binary_name(class_name), Name::identifier(entry))?
            }
            ReflectValue::Annotation(_) if depth >= MAX_ANNOTATION_NESTING => {
                ConstantValue::error("Annotation nesting is too deep")
            }
            ReflectValue::Annotation(nested) => {
                ConstantValue::Annotation(self.convert_reflect_annotation_at(nested, depth + 1)?)
            }
            ReflectValue::Array(items) => {
                let elements = items
                    .iter()
                    .map(|item| self.convert_reflect_value(item, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                if elements.iter().any(|element| matches!(element, ConstantValue::Array { .. })) {
                    return Err(DecodeError::ArrayOfArrays.into());
                }
                let element_type = elements.first().map(ConstantValue::ty).unwrap_or(TypeId::ANY);
                ConstantValue::Array {
                    ty: types.array_of(element_type),
                    element_type,
                    elements,
                }
            }
            ReflectValue::Class(name) => {
                return Err(DecodeError::ClassLiteral {
                    class_id: name.clone(),
                }
                .into());
            }
        })
    }
}

#[cfg(test)]
#[path = "../tests/annotations_tests.rs"]
mod tests;
