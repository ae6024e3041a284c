//! Captured types.
//!
//! A captured type stands in for a variant type argument (`out T`, `in T`)
//! while constraints are solved. It is never denotable and carries no
//! members; the only thing subtyping asks of it is a pair of
//! representatives:
//!
//! | projection | upper (as subtype) | lower (as supertype) |
//! |------------|--------------------|----------------------|
//! | `out T`    | `T`                | `Nothing`            |
//! | `in T`     | `Any?`             | `T`                  |

use crate::intern::TypeInterner;
use crate::types::{CapturedTypeInfo, TypeData, TypeId, TypeParamId, TypeProjection, Variance};

/// Identity of the outermost shape of a type, used to compare the types two
/// captured types wrap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum TypeHead {
    Constructor(crate::types::TypeConstructorId),
    Parameter(TypeParamId),
    Captured(crate::types::CapturedId),
    Error,
}

fn head_of(interner: &TypeInterner, ty: TypeId) -> TypeHead {
    match interner.data(ty) {
        TypeData::Class { constructor, .. } => TypeHead::Constructor(constructor),
        TypeData::Parameter { param, .. } => TypeHead::Parameter(param),
        TypeData::Captured { captured, .. } => TypeHead::Captured(captured),
        TypeData::Error => TypeHead::Error,
    }
}

/// Capture a variant projection into a fresh captured type.
///
/// # Panics
///
/// Panics if `projection` is invariant: only nontrivial projections can be
/// captured.
pub fn capture(interner: &TypeInterner, projection: TypeProjection) -> TypeId {
    assert!(
        projection.projection_kind() != Variance::Invariant,
        "only nontrivial projections can be captured, not: {}",
        interner.render_projection(projection)
    );
    let projection = match projection {
        TypeProjection::Star => TypeProjection::covariant(TypeId::NULLABLE_ANY),
        projected => projected,
    };
    let captured = interner.register_captured(CapturedTypeInfo { projection });
    interner.intern(TypeData::Captured {
        captured,
        nullable: false,
    })
}

pub fn is_captured(interner: &TypeInterner, ty: TypeId) -> bool {
    matches!(interner.data(ty), TypeData::Captured { .. })
}

fn captured_projection(interner: &TypeInterner, ty: TypeId) -> Option<(TypeProjection, bool)> {
    match interner.data(ty) {
        TypeData::Captured { captured, nullable } => {
            Some((interner.captured(captured).projection, nullable))
        }
        _ => None,
    }
}

fn representative(
    interner: &TypeInterner,
    ty: TypeId,
    variance: Variance,
    default: TypeId,
) -> Option<TypeId> {
    let (projection, nullable) = captured_projection(interner, ty)?;
    let base = match projection {
        TypeProjection::Projected { variance: kind, ty } if kind == variance => ty,
        _ => default,
    };
    Some(if nullable {
        interner.with_nullability(base, true)
    } else {
        base
    })
}

/// Representative used when the captured type is the subtype: the wrapped
/// type for a covariant capture, `Any?` otherwise. `None` if `ty` is not
/// captured.
pub fn upper_representative(interner: &TypeInterner, ty: TypeId) -> Option<TypeId> {
    representative(interner, ty, Variance::Out, TypeId::NULLABLE_ANY)
}

/// Representative used when the captured type is the supertype: the wrapped
/// type for a contravariant capture, `Nothing` otherwise.
pub fn lower_representative(interner: &TypeInterner, ty: TypeId) -> Option<TypeId> {
    representative(interner, ty, Variance::In, TypeId::NOTHING)
}

/// Two captured types share a constructor only if the types they wrap have
/// the same outermost constructor.
pub fn same_type_constructor(interner: &TypeInterner, a: TypeId, b: TypeId) -> bool {
    let (Some((pa, _)), Some((pb, _))) = (
        captured_projection(interner, a),
        captured_projection(interner, b),
    ) else {
        return false;
    };
    match (pa.ty(), pb.ty()) {
        (Some(ta), Some(tb)) => head_of(interner, ta) == head_of(interner, tb),
        _ => false,
    }
}

/// Capture `projection` for `param` unless capturing would be noise.
///
/// - No parameter or an invariant projection: unchanged.
/// - A star projection: the parameter's upper bound, invariantly.
/// - The parameter's declared variance already matches the projection:
///   the projected type, invariantly.
/// - Otherwise: an invariant projection of a fresh captured type.
pub fn create_captured_if_needed(
    interner: &TypeInterner,
    projection: TypeProjection,
    param: Option<TypeParamId>,
) -> TypeProjection {
    let Some(param) = param else {
        return projection;
    };
    match projection {
        TypeProjection::Star => TypeProjection::invariant(interner.upper_bound(param)),
        TypeProjection::Projected {
            variance: Variance::Invariant,
            ..
        } => projection,
        TypeProjection::Projected { variance, ty } => {
            if interner.type_param(param).variance == variance {
                TypeProjection::invariant(ty)
            } else {
                TypeProjection::invariant(capture(interner, projection))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/captured_tests.rs"]
mod tests;
