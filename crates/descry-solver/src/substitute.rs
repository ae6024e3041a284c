//! Type substitution with optional capture conversion.
//!
//! A [`TypeSubstitution`] maps type parameters to projections and rewrites
//! types by replacing parameter occurrences. Projections combine with the
//! use-site variance of the position they land in:
//!
//! | position | replacement | result  |
//! |----------|-------------|---------|
//! | `T`      | `out X`     | `out X` |
//! | `out T`  | `X`         | `out X` |
//! | `out T`  | `in X`      | `*`     |
//!
//! [`TypeSubstitution::with_capturing`] wraps a substitution so each
//! replacement goes through capture conversion first. The
//! "approximate contravariant captured types" flag travels with the
//! substitution and survives [`TypeSubstitution::compose`].

use crate::captured::{create_captured_if_needed, is_captured, lower_representative};
use crate::intern::TypeInterner;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{TypeData, TypeId, TypeParamId, TypeProjection, Variance};
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: IndexMap<TypeParamId, TypeProjection>,
    approximate_contravariant_captured: bool,
}

impl TypeSubstitution {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pair `parameters` with `arguments` positionally. Extra entries on
    /// either side are ignored.
    pub fn from_arguments(parameters: &[TypeParamId], arguments: &[TypeProjection]) -> Self {
        TypeSubstitution {
            map: parameters
                .iter()
                .copied()
                .zip(arguments.iter().copied())
                .collect(),
            approximate_contravariant_captured: false,
        }
    }

    pub fn insert(&mut self, param: TypeParamId, projection: TypeProjection) {
        self.map.insert(param, projection);
    }

    pub fn get(&self, param: TypeParamId) -> Option<TypeProjection> {
        self.map.get(&param).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn with_approximate_contravariant_captured(mut self, approximate: bool) -> Self {
        self.approximate_contravariant_captured = approximate;
        self
    }

    pub fn approximates_contravariant_captured(&self) -> bool {
        self.approximate_contravariant_captured
    }

    /// Capture every replacement that needs it (see
    /// [`create_captured_if_needed`]); `need_approximation` becomes the
    /// wrapped substitution's approximation flag.
    pub fn with_capturing(&self, interner: &TypeInterner, need_approximation: bool) -> Self {
        TypeSubstitution {
            map: self
                .map
                .iter()
                .map(|(&param, &projection)| {
                    (
                        param,
                        create_captured_if_needed(interner, projection, Some(param)),
                    )
                })
                .collect(),
            approximate_contravariant_captured: need_approximation,
        }
    }

    /// `self` first, then `outer`. The approximation flag is set if either
    /// side sets it.
    pub fn compose(&self, interner: &TypeInterner, outer: &TypeSubstitution) -> Self {
        let mut map: IndexMap<TypeParamId, TypeProjection> = self
            .map
            .iter()
            .map(|(&param, &projection)| (param, outer.substitute_projection(interner, projection)))
            .collect();
        for (&param, &projection) in &outer.map {
            map.entry(param).or_insert(projection);
        }
        TypeSubstitution {
            map,
            approximate_contravariant_captured: self.approximate_contravariant_captured
                || outer.approximate_contravariant_captured,
        }
    }

    /// Substitute into a type in an invariant top-level position.
    pub fn substitute(&self, interner: &TypeInterner, ty: TypeId) -> TypeId {
        if self.map.is_empty() {
            return ty;
        }
        if let TypeData::Parameter { param, nullable } = interner.data(ty) {
            if let Some(TypeProjection::Star) = self.get(param) {
                let bound = interner.upper_bound(param);
                return if nullable {
                    interner.with_nullability(bound, true)
                } else {
                    bound
                };
            }
        }
        let mut depth = DepthCounter::with_profile(RecursionProfile::Substitution);
        match self.substitute_in(interner, ty, &mut depth) {
            TypeProjection::Projected { ty, .. } => ty,
            TypeProjection::Star => TypeId::NULLABLE_ANY,
        }
    }

    pub fn substitute_projection(
        &self,
        interner: &TypeInterner,
        projection: TypeProjection,
    ) -> TypeProjection {
        let TypeProjection::Projected { variance, ty } = projection else {
            return projection;
        };
        let mut depth = DepthCounter::with_profile(RecursionProfile::Substitution);
        combine(variance, self.substitute_in(interner, ty, &mut depth))
    }

    fn substitute_in(
        &self,
        interner: &TypeInterner,
        ty: TypeId,
        depth: &mut DepthCounter,
    ) -> TypeProjection {
        if !depth.enter() {
            trace!(ty = ty.0, "substitution depth exceeded");
            return TypeProjection::invariant(TypeId::ERROR);
        }
        let result = match interner.data(ty) {
            TypeData::Parameter { param, nullable } => match self.get(param) {
                Some(TypeProjection::Projected { variance, ty }) => TypeProjection::Projected {
                    variance,
                    ty: if nullable {
                        interner.with_nullability(ty, true)
                    } else {
                        ty
                    },
                },
                Some(TypeProjection::Star) => TypeProjection::Star,
                None => TypeProjection::invariant(ty),
            },
            TypeData::Class {
                constructor,
                arguments,
                nullable,
            } => {
                let parameters = interner.parameters_of(constructor);
                let substituted: SmallVec<[TypeProjection; 4]> = arguments
                    .iter()
                    .enumerate()
                    .map(|(index, &argument)| {
                        let TypeProjection::Projected { variance, ty } = argument else {
                            return argument;
                        };
                        let replaced = combine(variance, self.substitute_in(interner, ty, depth));
                        let position = match variance {
                            Variance::Invariant => parameters
                                .get(index)
                                .map(|&param| interner.type_param(param).variance)
                                .unwrap_or(Variance::Invariant),
                            explicit => explicit,
                        };
                        self.approximate(interner, replaced, position)
                    })
                    .collect();
                TypeProjection::invariant(interner.class_type(
                    constructor,
                    Arc::from(substituted.as_slice()),
                    nullable,
                ))
            }
            TypeData::Captured { .. } | TypeData::Error => TypeProjection::invariant(ty),
        };
        depth.leave();
        result
    }

    /// In a contravariant position, a captured `in X` is replaced by `in X`
    /// when approximation is on.
    fn approximate(
        &self,
        interner: &TypeInterner,
        projection: TypeProjection,
        position: Variance,
    ) -> TypeProjection {
        if !self.approximate_contravariant_captured || position != Variance::In {
            return projection;
        }
        let Some(ty) = projection.ty() else {
            return projection;
        };
        if !is_captured(interner, ty) {
            return projection;
        }
        match lower_representative(interner, ty) {
            Some(lower) if lower != TypeId::NOTHING => TypeProjection::contravariant(lower),
            _ => projection,
        }
    }
}

/// Combine the use-site variance of a position with a replacement
/// projection.
fn combine(position: Variance, replacement: TypeProjection) -> TypeProjection {
    match replacement {
        TypeProjection::Star => TypeProjection::Star,
        TypeProjection::Projected { variance, ty } => {
            if position == Variance::Invariant {
                TypeProjection::Projected { variance, ty }
            } else if variance == Variance::Invariant || variance == position {
                TypeProjection::Projected {
                    variance: position,
                    ty,
                }
            } else {
                TypeProjection::Star
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/substitute_tests.rs"]
mod tests;
