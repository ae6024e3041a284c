//! The fixed catalogue of built-in classes.
//!
//! Built-ins have no backing class handle; their shape (parameters, declared
//! variance, supertypes) is static and registered by the
//! [`TypeInterner`](crate::TypeInterner) at construction. The constructor id
//! of a built-in is its position in [`BuiltinClass::ALL`].

use crate::types::{TypeConstructorId, TypeId, Variance};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Package holding all built-in classes.
pub const BUILTINS_PACKAGE: &str = "kotlin";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BuiltinClass {
    Any,
    Nothing,
    Unit,
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Float,
    Long,
    Double,
    String,
    Number,
    CharSequence,
    Annotation,
    Throwable,
    Cloneable,
    Comparable,
    Enum,
    Array,
    BooleanArray,
    CharArray,
    ByteArray,
    ShortArray,
    IntArray,
    FloatArray,
    LongArray,
    DoubleArray,
    Iterable,
    MutableIterable,
    Collection,
    MutableCollection,
    List,
    MutableList,
    Set,
    MutableSet,
    Map,
    MutableMap,
}

/// Type argument of a built-in supertype, relative to the subclass.
#[derive(Copy, Clone, Debug)]
pub(crate) enum ArgSpec {
    /// The subclass's own parameter at this index.
    Param(usize),
    /// The subclass itself (`Comparable<Int>`).
    SelfType,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct SuperSpec {
    pub class: BuiltinClass,
    pub arguments: &'static [ArgSpec],
}

const fn sup(class: BuiltinClass, arguments: &'static [ArgSpec]) -> SuperSpec {
    SuperSpec { class, arguments }
}

const NO_ARGS: &[ArgSpec] = &[];
const FIRST: &[ArgSpec] = &[ArgSpec::Param(0)];
const BOTH: &[ArgSpec] = &[ArgSpec::Param(0), ArgSpec::Param(1)];
const SELF: &[ArgSpec] = &[ArgSpec::SelfType];

static BY_FQ_NAME: Lazy<FxHashMap<&'static str, BuiltinClass>> = Lazy::new(|| {
    BuiltinClass::ALL
        .iter()
        .map(|&builtin| (builtin.fq_name(), builtin))
        .collect()
});

impl BuiltinClass {
    pub const ALL: [BuiltinClass; 38] = [
        BuiltinClass::Any,
        BuiltinClass::Nothing,
        BuiltinClass::Unit,
        BuiltinClass::Boolean,
        BuiltinClass::Char,
        BuiltinClass::Byte,
        BuiltinClass::Short,
        BuiltinClass::Int,
        BuiltinClass::Float,
        BuiltinClass::Long,
        BuiltinClass::Double,
        BuiltinClass::String,
        BuiltinClass::Number,
        BuiltinClass::CharSequence,
        BuiltinClass::Annotation,
        BuiltinClass::Throwable,
        BuiltinClass::Cloneable,
        BuiltinClass::Comparable,
        BuiltinClass::Enum,
        BuiltinClass::Array,
        BuiltinClass::BooleanArray,
        BuiltinClass::CharArray,
        BuiltinClass::ByteArray,
        BuiltinClass::ShortArray,
        BuiltinClass::IntArray,
        BuiltinClass::FloatArray,
        BuiltinClass::LongArray,
        BuiltinClass::DoubleArray,
        BuiltinClass::Iterable,
        BuiltinClass::MutableIterable,
        BuiltinClass::Collection,
        BuiltinClass::MutableCollection,
        BuiltinClass::List,
        BuiltinClass::MutableList,
        BuiltinClass::Set,
        BuiltinClass::MutableSet,
        BuiltinClass::Map,
        BuiltinClass::MutableMap,
    ];

    #[inline]
    pub fn constructor(self) -> TypeConstructorId {
        TypeConstructorId(self as u32)
    }

    pub fn from_constructor(ctor: TypeConstructorId) -> Option<Self> {
        Self::ALL.get(ctor.0 as usize).copied()
    }

    pub fn from_fq_name(fq_name: &str) -> Option<Self> {
        BY_FQ_NAME.get(fq_name).copied()
    }

    pub fn fq_name(self) -> &'static str {
        match self {
            BuiltinClass::Any => "kotlin.Any",
            BuiltinClass::Nothing => "kotlin.Nothing",
            BuiltinClass::Unit => "kotlin.Unit",
            BuiltinClass::Boolean => "kotlin.Boolean",
            BuiltinClass::Char => "kotlin.Char",
            BuiltinClass::Byte => "kotlin.Byte",
            BuiltinClass::Short => "kotlin.Short",
            BuiltinClass::Int => "kotlin.Int",
            BuiltinClass::Float => "kotlin.Float",
            BuiltinClass::Long => "kotlin.Long",
            BuiltinClass::Double => "kotlin.Double",
            BuiltinClass::String => "kotlin.String",
            BuiltinClass::Number => "kotlin.Number",
            BuiltinClass::CharSequence => "kotlin.CharSequence",
            BuiltinClass::Annotation => "kotlin.Annotation",
            BuiltinClass::Throwable => "kotlin.Throwable",
            BuiltinClass::Cloneable => "kotlin.Cloneable",
            BuiltinClass::Comparable => "kotlin.Comparable",
            BuiltinClass::Enum => "kotlin.Enum",
            BuiltinClass::Array => "kotlin.Array",
            BuiltinClass::BooleanArray => "kotlin.BooleanArray",
            BuiltinClass::CharArray => "kotlin.CharArray",
            BuiltinClass::ByteArray => "kotlin.ByteArray",
            BuiltinClass::ShortArray => "kotlin.ShortArray",
            BuiltinClass::IntArray => "kotlin.IntArray",
            BuiltinClass::FloatArray => "kotlin.FloatArray",
            BuiltinClass::LongArray => "kotlin.LongArray",
            BuiltinClass::DoubleArray => "kotlin.DoubleArray",
            BuiltinClass::Iterable => "kotlin.collections.Iterable",
            BuiltinClass::MutableIterable => "kotlin.collections.MutableIterable",
            BuiltinClass::Collection => "kotlin.collections.Collection",
            BuiltinClass::MutableCollection => "kotlin.collections.MutableCollection",
            BuiltinClass::List => "kotlin.collections.List",
            BuiltinClass::MutableList => "kotlin.collections.MutableList",
            BuiltinClass::Set => "kotlin.collections.Set",
            BuiltinClass::MutableSet => "kotlin.collections.MutableSet",
            BuiltinClass::Map => "kotlin.collections.Map",
            BuiltinClass::MutableMap => "kotlin.collections.MutableMap",
        }
    }

    /// Declared type parameters with their declaration-site variance.
    pub fn parameters(self) -> &'static [(&'static str, Variance)] {
        use Variance::{In, Invariant, Out};
        match self {
            BuiltinClass::Comparable => &[("T", In)],
            BuiltinClass::Enum => &[("E", Invariant)],
            BuiltinClass::Array => &[("T", Invariant)],
            BuiltinClass::Iterable => &[("T", Out)],
            BuiltinClass::MutableIterable => &[("T", Invariant)],
            BuiltinClass::Collection | BuiltinClass::List | BuiltinClass::Set => &[("E", Out)],
            BuiltinClass::MutableCollection | BuiltinClass::MutableList | BuiltinClass::MutableSet => {
                &[("E", Invariant)]
            }
            BuiltinClass::Map => &[("K", Invariant), ("V", Out)],
            BuiltinClass::MutableMap => &[("K", Invariant), ("V", Invariant)],
            _ => &[],
        }
    }

    pub fn arity(self) -> usize {
        self.parameters().len()
    }

    pub(crate) fn supertypes(self) -> &'static [SuperSpec] {
        use BuiltinClass as B;
        const ANY: &[SuperSpec] = &[sup(B::Any, NO_ARGS)];
        const COMPARABLE_SELF: &[SuperSpec] = &[sup(B::Comparable, SELF)];
        const NUMERIC: &[SuperSpec] = &[sup(B::Number, NO_ARGS), sup(B::Comparable, SELF)];
        const CLONEABLE: &[SuperSpec] = &[sup(B::Cloneable, NO_ARGS)];
        const STRING: &[SuperSpec] = &[sup(B::Comparable, SELF), sup(B::CharSequence, NO_ARGS)];
        const ENUM: &[SuperSpec] = &[sup(B::Comparable, FIRST)];
        const ITERABLE: &[SuperSpec] = &[sup(B::Iterable, FIRST)];
        const MUTABLE_COLLECTION: &[SuperSpec] =
            &[sup(B::Collection, FIRST), sup(B::MutableIterable, FIRST)];
        const COLLECTION: &[SuperSpec] = &[sup(B::Collection, FIRST)];
        const MUTABLE_LIST: &[SuperSpec] = &[sup(B::List, FIRST), sup(B::MutableCollection, FIRST)];
        const MUTABLE_SET: &[SuperSpec] = &[sup(B::Set, FIRST), sup(B::MutableCollection, FIRST)];
        const MUTABLE_MAP: &[SuperSpec] = &[sup(B::Map, BOTH)];
        match self {
            B::Any | B::Nothing => &[],
            B::Boolean | B::Char => COMPARABLE_SELF,
            B::Byte | B::Short | B::Int | B::Float | B::Long | B::Double => NUMERIC,
            B::String => STRING,
            B::Enum => ENUM,
            B::Array
            | B::BooleanArray
            | B::CharArray
            | B::ByteArray
            | B::ShortArray
            | B::IntArray
            | B::FloatArray
            | B::LongArray
            | B::DoubleArray => CLONEABLE,
            B::MutableIterable | B::Collection => ITERABLE,
            B::MutableCollection => MUTABLE_COLLECTION,
            B::List | B::Set => COLLECTION,
            B::MutableList => MUTABLE_LIST,
            B::MutableSet => MUTABLE_SET,
            B::MutableMap => MUTABLE_MAP,
            _ => ANY,
        }
    }

    pub fn is_final(self) -> bool {
        use BuiltinClass as B;
        matches!(
            self,
            B::Nothing
                | B::Unit
                | B::Boolean
                | B::Char
                | B::Byte
                | B::Short
                | B::Int
                | B::Float
                | B::Long
                | B::Double
                | B::String
                | B::Array
                | B::BooleanArray
                | B::CharArray
                | B::ByteArray
                | B::ShortArray
                | B::IntArray
                | B::FloatArray
                | B::LongArray
                | B::DoubleArray
        )
    }

    pub fn primitive(self) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .iter()
            .copied()
            .find(|primitive| primitive.class() == self)
    }

    pub fn primitive_array_element(self) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .iter()
            .copied()
            .find(|primitive| primitive.array_class() == self)
    }
}

// =============================================================================
// PrimitiveType
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveType {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Float,
    Long,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Char,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Float,
        PrimitiveType::Long,
        PrimitiveType::Double,
    ];

    pub fn class(self) -> BuiltinClass {
        match self {
            PrimitiveType::Boolean => BuiltinClass::Boolean,
            PrimitiveType::Char => BuiltinClass::Char,
            PrimitiveType::Byte => BuiltinClass::Byte,
            PrimitiveType::Short => BuiltinClass::Short,
            PrimitiveType::Int => BuiltinClass::Int,
            PrimitiveType::Float => BuiltinClass::Float,
            PrimitiveType::Long => BuiltinClass::Long,
            PrimitiveType::Double => BuiltinClass::Double,
        }
    }

    pub fn array_class(self) -> BuiltinClass {
        match self {
            PrimitiveType::Boolean => BuiltinClass::BooleanArray,
            PrimitiveType::Char => BuiltinClass::CharArray,
            PrimitiveType::Byte => BuiltinClass::ByteArray,
            PrimitiveType::Short => BuiltinClass::ShortArray,
            PrimitiveType::Int => BuiltinClass::IntArray,
            PrimitiveType::Float => BuiltinClass::FloatArray,
            PrimitiveType::Long => BuiltinClass::LongArray,
            PrimitiveType::Double => BuiltinClass::DoubleArray,
        }
    }

    pub fn type_id(self) -> TypeId {
        match self {
            PrimitiveType::Boolean => TypeId::BOOLEAN,
            PrimitiveType::Char => TypeId::CHAR,
            PrimitiveType::Byte => TypeId::BYTE,
            PrimitiveType::Short => TypeId::SHORT,
            PrimitiveType::Int => TypeId::INT,
            PrimitiveType::Float => TypeId::FLOAT,
            PrimitiveType::Long => TypeId::LONG,
            PrimitiveType::Double => TypeId::DOUBLE,
        }
    }

    pub fn array_type_id(self) -> TypeId {
        match self {
            PrimitiveType::Boolean => TypeId::BOOLEAN_ARRAY,
            PrimitiveType::Char => TypeId::CHAR_ARRAY,
            PrimitiveType::Byte => TypeId::BYTE_ARRAY,
            PrimitiveType::Short => TypeId::SHORT_ARRAY,
            PrimitiveType::Int => TypeId::INT_ARRAY,
            PrimitiveType::Float => TypeId::FLOAT_ARRAY,
            PrimitiveType::Long => TypeId::LONG_ARRAY,
            PrimitiveType::Double => TypeId::DOUBLE_ARRAY,
        }
    }

    pub fn from_type_id(ty: TypeId) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.type_id() == ty)
    }

    /// Host keyword (`int`, `boolean`, ...).
    pub fn host_keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Char => "char",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Long => "long",
            PrimitiveType::Double => "double",
        }
    }

    pub fn from_host_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.host_keyword() == keyword)
    }
}

#[cfg(test)]
#[path = "../tests/builtins_tests.rs"]
mod tests;
