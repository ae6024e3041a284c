//! Typed compile-time constants and annotation values.

use descry_common::{ClassId, Name};
use descry_solver::TypeId;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A decoded constant.
///
/// [`ConstantValue::Error`] is the soft failure marker: it replaces values
/// that could not be resolved or do not fit the expected type, and carries a
/// message for downstream diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(Arc<str>),
    Enum {
        ty: TypeId,
        class_id: ClassId,
        entry: Name,
    },
    Annotation(AnnotationValue),
    Array {
        ty: TypeId,
        element_type: TypeId,
        elements: Vec<ConstantValue>,
    },
    Error(String),
}

impl ConstantValue {
    pub fn error(message: impl Into<String>) -> Self {
        ConstantValue::Error(message.into())
    }

    /// Static type of the value.
    pub fn ty(&self) -> TypeId {
        match self {
            ConstantValue::Byte(_) => TypeId::BYTE,
            ConstantValue::Char(_) => TypeId::CHAR,
            ConstantValue::Short(_) => TypeId::SHORT,
            ConstantValue::Int(_) => TypeId::INT,
            ConstantValue::Long(_) => TypeId::LONG,
            ConstantValue::Float(_) => TypeId::FLOAT,
            ConstantValue::Double(_) => TypeId::DOUBLE,
            ConstantValue::Boolean(_) => TypeId::BOOLEAN,
            ConstantValue::String(_) => TypeId::STRING,
            ConstantValue::Enum { ty, .. } => *ty,
            ConstantValue::Annotation(annotation) => annotation.ty,
            ConstantValue::Array { ty, .. } => *ty,
            ConstantValue::Error(_) => TypeId::ERROR,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ConstantValue::Error(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(text) => Some(text),
            _ => None,
        }
    }
}

/// An annotation instance: its class and the arguments given explicitly.
///
/// Parameters left at their declared default are absent from `arguments`.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationValue {
    pub ty: TypeId,
    pub class_id: ClassId,
    pub arguments: IndexMap<Name, ConstantValue>,
}

impl AnnotationValue {
    pub fn new(ty: TypeId, class_id: ClassId) -> Self {
        AnnotationValue {
            ty,
            class_id,
            arguments: IndexMap::new(),
        }
    }

    pub fn argument(&self, name: &str) -> Option<&ConstantValue> {
        self.arguments.get(&Name::identifier(name))
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Byte(value) => write!(f, "{value}.toByte()"),
            ConstantValue::Char(value) => write!(f, "'{}'", value.escape_default()),
            ConstantValue::Short(value) => write!(f, "{value}.toShort()"),
            ConstantValue::Int(value) => write!(f, "{value}"),
            ConstantValue::Long(value) => write!(f, "{value}L"),
            ConstantValue::Float(value) => write!(f, "{value:?}f"),
            ConstantValue::Double(value) => write!(f, "{value:?}"),
            ConstantValue::Boolean(value) => write!(f, "{value}"),
            ConstantValue::String(value) => write!(f, "\"{}\"", value.escape_default()),
            ConstantValue::Enum {
                class_id, entry, ..
            } => write!(f, "{}.{entry}", class_id.short_class_name()),
            ConstantValue::Annotation(annotation) => write!(f, "{annotation}"),
            ConstantValue::Array { elements, .. } => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            ConstantValue::Error(message) => write!(f, "<error: {message}>"),
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.class_id.short_class_name())?;
        if self.arguments.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, (name, value)) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
#[path = "../tests/constants_tests.rs"]
mod tests;
