//! External collaborators and the records they produce.
//!
//! Two metadata sources feed the resolver:
//!
//! - **Serialized metadata**: a [`MetadataReader`] hands out already-parsed
//!   per-container records whose names and class references are indices into
//!   a [`NameResolver`].
//! - **Reflection**: a [`ClassLookup`] turns a binary class name into an
//!   opaque [`ClassHandle`] with cheap flag queries and structural accessors.
//!
//! Both are capabilities supplied by the embedder; nothing here parses bytes.

use crate::error::DecodeError;
use descry_common::{ClassId, FqName, Name};
use descry_solver::PrimitiveType;
use rustc_hash::FxHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Serialized metadata
// =============================================================================

/// Index-to-name resolution for one serialized container.
pub trait NameResolver: Send + Sync {
    fn string(&self, index: u32) -> Arc<str>;

    fn name(&self, index: u32) -> Name {
        Name::guess(&self.string(index))
    }

    /// Class reference in serialized form (`org/sample/Outer.Inner`).
    fn class_id(&self, index: u32) -> ClassId {
        ClassId::from_string(&self.string(index))
    }
}

/// Append-only string table; the simplest [`NameResolver`].
///
/// Unknown indices resolve to the empty string.
#[derive(Default)]
pub struct StringTable {
    strings: RwLock<Vec<Arc<str>>>,
    index: RwLock<FxHashMap<Arc<str>, u32>>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `text`, adding it if needed.
    pub fn intern(&self, text: &str) -> u32 {
        if let Some(&index) = self.index.read().get(text) {
            return index;
        }
        let mut index = self.index.write();
        if let Some(&existing) = index.get(text) {
            return existing;
        }
        let mut strings = self.strings.write();
        let id = strings.len() as u32;
        let text: Arc<str> = Arc::from(text);
        strings.push(Arc::clone(&text));
        index.insert(text, id);
        id
    }

    pub fn len(&self) -> usize {
        self.strings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.read().is_empty()
    }
}

impl NameResolver for StringTable {
    fn string(&self, index: u32) -> Arc<str> {
        self.strings
            .read()
            .get(index as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }
}

/// Wire tag of an annotation argument value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueTag {
    #[default]
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
    Class,
    Enum,
    Annotation,
    Array,
}

impl ValueTag {
    pub fn from_wire(tag: u8) -> Result<Self, DecodeError> {
        Ok(match tag {
            0 => ValueTag::Byte,
            1 => ValueTag::Char,
            2 => ValueTag::Short,
            3 => ValueTag::Int,
            4 => ValueTag::Long,
            5 => ValueTag::Float,
            6 => ValueTag::Double,
            7 => ValueTag::Boolean,
            8 => ValueTag::String,
            9 => ValueTag::Class,
            10 => ValueTag::Enum,
            11 => ValueTag::Annotation,
            12 => ValueTag::Array,
            _ => return Err(DecodeError::UnknownTag { tag }),
        })
    }
}

/// One serialized annotation argument value. Which fields are meaningful
/// depends on `tag`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueRecord {
    pub tag: ValueTag,
    pub int_value: i64,
    pub float_value: f32,
    pub double_value: f64,
    /// String-table index.
    pub string_value: u32,
    /// Class-id index (enum class, class literal).
    pub class_id: u32,
    /// Name index of the enum entry.
    pub enum_value: u32,
    pub annotation: Option<Box<AnnotationRecord>>,
    pub array_elements: Vec<ValueRecord>,
}

impl ValueRecord {
    pub fn int(tag: ValueTag, value: i64) -> Self {
        ValueRecord {
            tag,
            int_value: value,
            ..Default::default()
        }
    }

    pub fn string(index: u32) -> Self {
        ValueRecord {
            tag: ValueTag::String,
            string_value: index,
            ..Default::default()
        }
    }

    pub fn enum_entry(class_id: u32, entry: u32) -> Self {
        ValueRecord {
            tag: ValueTag::Enum,
            class_id,
            enum_value: entry,
            ..Default::default()
        }
    }

    pub fn annotation(record: AnnotationRecord) -> Self {
        ValueRecord {
            tag: ValueTag::Annotation,
            annotation: Some(Box::new(record)),
            ..Default::default()
        }
    }

    pub fn array(elements: Vec<ValueRecord>) -> Self {
        ValueRecord {
            tag: ValueTag::Array,
            array_elements: elements,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArgumentRecord {
    /// Name index of the annotation parameter.
    pub name: u32,
    pub value: ValueRecord,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationRecord {
    /// Class-id index of the annotation class.
    pub class_id: u32,
    pub arguments: Vec<ArgumentRecord>,
}

/// A class-typed reference: class-id index plus nullability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeRecord {
    pub class_id: u32,
    pub nullable: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValueParameterRecord {
    pub name: u32,
    pub ty: TypeRecord,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionRecord {
    pub name: u32,
    /// Present for extension functions.
    pub receiver_type: Option<TypeRecord>,
    pub value_parameters: Vec<ValueParameterRecord>,
    pub return_type: Option<TypeRecord>,
    /// String index of the host signature (`java/util/List.removeAt(I)Ljava/lang/Object;`).
    pub host_signature: Option<u32>,
    pub annotations: Vec<AnnotationRecord>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyRecord {
    pub name: u32,
    pub receiver_type: Option<TypeRecord>,
    pub return_type: Option<TypeRecord>,
    pub host_signature: Option<u32>,
    /// Compile-time constant initializer.
    pub constant: Option<ValueRecord>,
    pub annotations: Vec<AnnotationRecord>,
}

/// Supplier of nested-class simple names, invoked lazily and at most once
/// per scope.
pub type ClassNamesSupplier = Arc<dyn Fn() -> Vec<Name> + Send + Sync>;

/// Everything the reader knows about one container.
#[derive(Clone)]
pub struct ContainerMetadata {
    pub functions: Vec<FunctionRecord>,
    pub properties: Vec<PropertyRecord>,
    pub class_names: ClassNamesSupplier,
    pub name_resolver: Arc<dyn NameResolver>,
    /// Host-visible facade grouping several compiled parts, if any.
    pub facade: Option<String>,
}

impl ContainerMetadata {
    pub fn new(name_resolver: Arc<dyn NameResolver>) -> Self {
        ContainerMetadata {
            functions: Vec::new(),
            properties: Vec::new(),
            class_names: Arc::new(Vec::new),
            name_resolver,
            facade: None,
        }
    }
}

impl fmt::Debug for ContainerMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerMetadata")
            .field("functions", &self.functions.len())
            .field("properties", &self.properties.len())
            .field("facade", &self.facade)
            .finish_non_exhaustive()
    }
}

/// Decoder of binary metadata, already parsed into records.
pub trait MetadataReader: Send + Sync {
    /// Records of the package part `part` (internal name, `org/sample/UtilsKt`).
    fn read_package_part(&self, package: &FqName, part: &str) -> Option<ContainerMetadata>;
}

/// Which compiled package parts make up a package.
pub trait PackagePartProvider: Send + Sync {
    fn find_package_parts(&self, package: &FqName) -> Vec<String>;

    fn sub_package_names(&self, _package: &FqName) -> Vec<Name> {
        Vec::new()
    }
}

// =============================================================================
// Reflection
// =============================================================================

/// Given a binary name (`org.sample.Outer$Inner`), an optional class handle.
pub trait ClassLookup: Send + Sync {
    fn find_class(&self, binary_name: &str) -> Option<Arc<dyn ClassHandle>>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    /// Visible inside the declaring package.
    Package,
    Internal,
    Private,
}

/// A type as written in a reflective signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    /// Binary class name plus type arguments.
    Class {
        name: String,
        arguments: Vec<TypeArgRef>,
    },
    /// A type variable, by name.
    Parameter(String),
    Array(Box<TypeRef>),
    Primitive(PrimitiveType),
}

impl TypeRef {
    pub fn class(name: &str) -> Self {
        TypeRef::Class {
            name: name.to_string(),
            arguments: Vec::new(),
        }
    }

    pub fn generic(name: &str, arguments: Vec<TypeArgRef>) -> Self {
        TypeRef::Class {
            name: name.to_string(),
            arguments,
        }
    }

    /// Source-like rendering used in diagnostics.
    pub fn presentable_text(&self) -> String {
        match self {
            TypeRef::Class { name, arguments } => {
                if arguments.is_empty() {
                    return name.clone();
                }
                let rendered: Vec<String> = arguments.iter().map(TypeArgRef::presentable_text).collect();
                format!("{name}<{}>", rendered.join(", "))
            }
            TypeRef::Parameter(name) => name.clone(),
            TypeRef::Array(element) => format!("{}[]", element.presentable_text()),
            TypeRef::Primitive(primitive) => primitive.host_keyword().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeArgRef {
    Type(TypeRef),
    /// `? extends T`
    Extends(TypeRef),
    /// `? super T`
    Super(TypeRef),
    /// `?`
    Wildcard,
}

impl TypeArgRef {
    pub fn presentable_text(&self) -> String {
        match self {
            TypeArgRef::Type(ty) => ty.presentable_text(),
            TypeArgRef::Extends(ty) => format!("? extends {}", ty.presentable_text()),
            TypeArgRef::Super(ty) => format!("? super {}", ty.presentable_text()),
            TypeArgRef::Wildcard => "?".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameterRef {
    pub name: String,
    pub bounds: Vec<TypeRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterRef {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstructorRef {
    pub parameters: Vec<ParameterRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRef {
    pub name: String,
    pub parameters: Vec<ParameterRef>,
    pub return_type: Option<TypeRef>,
    /// Host method descriptor (`(I)Ljava/lang/Object;`).
    pub descriptor: String,
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRef {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
}

/// An annotation as reported by reflection.
#[derive(Clone, Debug, PartialEq)]
pub struct ReflectAnnotation {
    pub class_name: String,
    pub arguments: Vec<(String, ReflectValue)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReflectValue {
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Enum { class_name: String, entry: String },
    Annotation(ReflectAnnotation),
    Array(Vec<ReflectValue>),
    /// Class literal, by binary name.
    Class(String),
}

/// Opaque reflective class.
///
/// Flag queries must be cheap; structural accessors may be slow and are
/// called at most once per descriptor.
pub trait ClassHandle: Send + Sync {
    fn binary_name(&self) -> String;

    fn simple_name(&self) -> String {
        let binary = self.binary_name();
        let tail = binary.rsplit(['.', '$']).next().unwrap_or(&binary);
        tail.to_string()
    }

    fn is_interface(&self) -> bool;
    fn is_enum(&self) -> bool;
    fn is_abstract(&self) -> bool;
    fn is_final(&self) -> bool;
    fn is_annotation_type(&self) -> bool;
    fn is_static(&self) -> bool;

    fn is_sealed(&self) -> bool {
        false
    }

    fn outer_class(&self) -> Option<Arc<dyn ClassHandle>>;
    fn visibility(&self) -> Visibility;
    fn supertypes(&self) -> Vec<TypeRef>;
    fn type_parameters(&self) -> Vec<TypeParameterRef>;

    fn annotations(&self) -> Vec<ReflectAnnotation> {
        Vec::new()
    }

    fn constructors(&self) -> Vec<ConstructorRef> {
        Vec::new()
    }

    fn methods(&self) -> Vec<MethodRef> {
        Vec::new()
    }

    fn fields(&self) -> Vec<FieldRef> {
        Vec::new()
    }

    /// Enum constant names, in declaration order.
    fn enum_entries(&self) -> Vec<String> {
        Vec::new()
    }

    /// Simple names of member classes, in declaration order.
    fn inner_class_names(&self) -> Vec<String> {
        Vec::new()
    }
}
