//! Core type representation.
//!
//! Types are interned: a [`TypeId`] is a `u32` handle into the
//! [`TypeInterner`](crate::TypeInterner), so structural equality of two types
//! is an integer comparison. Type constructors, type parameters and captured
//! types have their own id spaces; each names an entry in the interner that
//! holds the shape information.

use crate::builtins::BuiltinClass;
use descry_common::{ClassId, DescriptorId, FqName, Name};
use serde::Serialize;
use std::sync::{Arc, OnceLock};

// =============================================================================
// TypeId
// =============================================================================

/// Interned type handle.
///
/// The low ids are fixed at interner construction so the canonical types can
/// be named without an interner at hand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Unresolvable type. Related to everything, so errors never cascade.
    pub const ERROR: TypeId = TypeId(0);
    pub const ANY: TypeId = TypeId(1);
    pub const NULLABLE_ANY: TypeId = TypeId(2);
    pub const NOTHING: TypeId = TypeId(3);
    pub const NULLABLE_NOTHING: TypeId = TypeId(4);
    pub const UNIT: TypeId = TypeId(5);
    pub const BOOLEAN: TypeId = TypeId(6);
    pub const CHAR: TypeId = TypeId(7);
    pub const BYTE: TypeId = TypeId(8);
    pub const SHORT: TypeId = TypeId(9);
    pub const INT: TypeId = TypeId(10);
    pub const FLOAT: TypeId = TypeId(11);
    pub const LONG: TypeId = TypeId(12);
    pub const DOUBLE: TypeId = TypeId(13);
    pub const STRING: TypeId = TypeId(14);
    pub const NUMBER: TypeId = TypeId(15);
    pub const CHAR_SEQUENCE: TypeId = TypeId(16);
    pub const ANNOTATION: TypeId = TypeId(17);
    pub const THROWABLE: TypeId = TypeId(18);
    pub const BOOLEAN_ARRAY: TypeId = TypeId(19);
    pub const CHAR_ARRAY: TypeId = TypeId(20);
    pub const BYTE_ARRAY: TypeId = TypeId(21);
    pub const SHORT_ARRAY: TypeId = TypeId(22);
    pub const INT_ARRAY: TypeId = TypeId(23);
    pub const FLOAT_ARRAY: TypeId = TypeId(24);
    pub const LONG_ARRAY: TypeId = TypeId(25);
    pub const DOUBLE_ARRAY: TypeId = TypeId(26);

    /// Number of ids reserved for the canonical types above.
    pub const FIRST_DYNAMIC: u32 = 27;

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    #[inline]
    pub const fn is_any_or_nullable_any(self) -> bool {
        self.0 == Self::ANY.0 || self.0 == Self::NULLABLE_ANY.0
    }
}

// =============================================================================
// Variance and projections
// =============================================================================

/// Declaration-site or use-site variance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variance {
    Invariant,
    /// Contravariant: consumes `T`.
    In,
    /// Covariant: produces `T`.
    Out,
}

impl Variance {
    pub fn opposite(self) -> Self {
        match self {
            Variance::Invariant => Variance::Invariant,
            Variance::In => Variance::Out,
            Variance::Out => Variance::In,
        }
    }

    /// Variance of a position nested inside a position of variance `self`.
    pub fn compose(self, inner: Variance) -> Self {
        match (self, inner) {
            (Variance::Invariant, _) | (_, Variance::Invariant) => Variance::Invariant,
            (Variance::Out, v) => v,
            (Variance::In, v) => v.opposite(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::In => "in",
            Variance::Out => "out",
        }
    }
}

/// A type argument: a projected type or the star projection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeProjection {
    /// `*`: any instantiation of the parameter.
    Star,
    Projected { variance: Variance, ty: TypeId },
}

impl TypeProjection {
    pub const fn invariant(ty: TypeId) -> Self {
        TypeProjection::Projected {
            variance: Variance::Invariant,
            ty,
        }
    }

    pub const fn covariant(ty: TypeId) -> Self {
        TypeProjection::Projected {
            variance: Variance::Out,
            ty,
        }
    }

    pub const fn contravariant(ty: TypeId) -> Self {
        TypeProjection::Projected {
            variance: Variance::In,
            ty,
        }
    }

    pub fn is_star(self) -> bool {
        matches!(self, TypeProjection::Star)
    }

    /// Use-site variance. A star projection behaves as `out` of the
    /// parameter's upper bound.
    pub fn projection_kind(self) -> Variance {
        match self {
            TypeProjection::Star => Variance::Out,
            TypeProjection::Projected { variance, .. } => variance,
        }
    }

    pub fn ty(self) -> Option<TypeId> {
        match self {
            TypeProjection::Star => None,
            TypeProjection::Projected { ty, .. } => Some(ty),
        }
    }
}

// =============================================================================
// Identities
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeConstructorId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeParamId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CapturedId(pub u32);

// =============================================================================
// TypeData
// =============================================================================

/// Structural type data, interned to a [`TypeId`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Class {
        constructor: TypeConstructorId,
        arguments: Arc<[TypeProjection]>,
        nullable: bool,
    },
    Parameter {
        param: TypeParamId,
        nullable: bool,
    },
    /// Synthetic, non-denotable stand-in for a variant type argument.
    Captured {
        captured: CapturedId,
        nullable: bool,
    },
    Error,
}

impl TypeData {
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeData::Class { nullable, .. }
            | TypeData::Parameter { nullable, .. }
            | TypeData::Captured { nullable, .. } => *nullable,
            TypeData::Error => false,
        }
    }
}

// =============================================================================
// Constructors, parameters, captured types
// =============================================================================

/// What declared a type constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Declaration {
    Builtin(BuiltinClass),
    /// A class descriptor in the resolver's arena.
    Class(DescriptorId),
    /// Placeholder for a class that could not be found.
    NotFound(ClassId),
}

/// Identity of a type shape.
#[derive(Debug)]
pub struct TypeConstructorInfo {
    pub name: FqName,
    pub declaration: Declaration,
    pub is_final: bool,
    pub is_denotable: bool,
    /// Known at registration for built-ins and not-found markers; class
    /// descriptors publish theirs once computed.
    pub(crate) parameters: OnceLock<Arc<[TypeParamId]>>,
    pub(crate) static_supertypes: OnceLock<Arc<[TypeId]>>,
}

impl TypeConstructorInfo {
    pub fn new(name: FqName, declaration: Declaration) -> Self {
        TypeConstructorInfo {
            name,
            declaration,
            is_final: false,
            is_denotable: true,
            parameters: OnceLock::new(),
            static_supertypes: OnceLock::new(),
        }
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn with_parameters(self, parameters: Arc<[TypeParamId]>) -> Self {
        let _ = self.parameters.set(parameters);
        self
    }

    /// Parameters, if registered or already published.
    pub fn parameters(&self) -> Option<Arc<[TypeParamId]>> {
        self.parameters.get().cloned()
    }

    /// Supertypes fixed at registration, if any.
    pub fn static_supertypes(&self) -> Option<Arc<[TypeId]>> {
        self.static_supertypes.get().cloned()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.declaration, Declaration::NotFound(_))
    }

    pub fn builtin(&self) -> Option<BuiltinClass> {
        match self.declaration {
            Declaration::Builtin(builtin) => Some(builtin),
            _ => None,
        }
    }

    pub fn declaring_descriptor(&self) -> Option<DescriptorId> {
        match self.declaration {
            Declaration::Class(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct TypeParamInfo {
    pub name: Name,
    pub index: u32,
    pub variance: Variance,
    pub owner: TypeConstructorId,
    pub(crate) upper_bound: OnceLock<TypeId>,
}

/// Payload of a captured type: the variant projection it stands in for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CapturedTypeInfo {
    pub projection: TypeProjection,
}
