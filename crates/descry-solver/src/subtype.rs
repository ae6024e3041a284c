//! Nominal subtype checking over generic class hierarchies.
//!
//! The checker only knows interned types; anything about class declarations
//! (supertypes, parameters of classes loaded lazily) comes through the
//! [`TypeResolver`] seam. A resolver that cannot answer right now, because
//! the hierarchy is being computed further up the stack, returns `None`, and
//! the checker treats that branch as "no further information".

use crate::captured::{lower_representative, upper_representative};
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::substitute::TypeSubstitution;
use crate::types::{TypeConstructorId, TypeData, TypeId, TypeParamId, TypeProjection, Variance};
use std::sync::Arc;
use tracing::trace;

/// Access to class-level facts the interner does not own.
pub trait TypeResolver {
    /// Direct supertypes of `ctor`, or `None` if they are not available.
    fn supertypes(&self, ctor: TypeConstructorId) -> Option<Arc<[TypeId]>>;

    /// Type parameters of `ctor`, or `None` if they are not available.
    fn parameters(&self, ctor: TypeConstructorId) -> Option<Arc<[TypeParamId]>>;
}

/// Resolver over the statically registered constructors only (built-ins and
/// not-found markers).
#[derive(Clone, Copy)]
pub struct StaticTypeResolver<'a> {
    interner: &'a TypeInterner,
}

impl<'a> StaticTypeResolver<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        StaticTypeResolver { interner }
    }
}

impl TypeResolver for StaticTypeResolver<'_> {
    fn supertypes(&self, ctor: TypeConstructorId) -> Option<Arc<[TypeId]>> {
        self.interner.constructor(ctor).static_supertypes()
    }

    fn parameters(&self, ctor: TypeConstructorId) -> Option<Arc<[TypeParamId]>> {
        self.interner.constructor(ctor).parameters()
    }
}

pub struct SubtypeChecker<'a, R: TypeResolver + ?Sized> {
    interner: &'a TypeInterner,
    resolver: &'a R,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl<'a, R: TypeResolver + ?Sized> SubtypeChecker<'a, R> {
    pub fn new(interner: &'a TypeInterner, resolver: &'a R) -> Self {
        SubtypeChecker {
            interner,
            resolver,
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
        }
    }

    /// Whether `sub <: sup`.
    pub fn is_subtype_of(&mut self, sub: TypeId, sup: TypeId) -> bool {
        if sub == sup || sub.is_error() || sup.is_error() || sup == TypeId::NULLABLE_ANY {
            return true;
        }
        match self.guard.enter((sub, sup)) {
            RecursionResult::Entered => {
                let result = self.check(sub, sup);
                self.guard.leave((sub, sup));
                result
            }
            denied => {
                trace!(sub = sub.0, sup = sup.0, ?denied, "subtype check short-circuited");
                false
            }
        }
    }

    pub fn is_equal_type(&mut self, a: TypeId, b: TypeId) -> bool {
        a == b || (self.is_subtype_of(a, b) && self.is_subtype_of(b, a))
    }

    fn check(&mut self, sub: TypeId, sup: TypeId) -> bool {
        let interner = self.interner;
        let sub_data = interner.data(sub);
        let sup_data = interner.data(sup);

        if sub == TypeId::NOTHING {
            return true;
        }
        if sub == TypeId::NULLABLE_NOTHING {
            return sup_data.is_nullable();
        }

        if let Some(upper) = upper_representative(interner, sub) {
            return self.is_subtype_of(upper, sup);
        }
        if let Some(lower) = lower_representative(interner, sup) {
            return self.is_subtype_of(sub, lower);
        }

        if sub_data.is_nullable() && !sup_data.is_nullable() {
            return false;
        }

        match (sub_data, sup_data) {
            (TypeData::Parameter { param: a, .. }, TypeData::Parameter { param: b, .. })
                if a == b =>
            {
                true
            }
            (TypeData::Parameter { param, nullable }, _) => {
                let bound = interner.upper_bound(param);
                let bound = if nullable {
                    interner.with_nullability(bound, true)
                } else {
                    bound
                };
                self.is_subtype_of(bound, sup)
            }
            (_, TypeData::Parameter { .. }) => false,
            (
                TypeData::Class {
                    constructor: sub_ctor,
                    arguments: sub_args,
                    nullable,
                },
                TypeData::Class {
                    constructor: sup_ctor,
                    arguments: sup_args,
                    ..
                },
            ) => {
                if sup_ctor == crate::builtins::BuiltinClass::Any.constructor() {
                    return true;
                }
                if sub_ctor == sup_ctor {
                    return self.arguments_match(sub_ctor, &sub_args, &sup_args);
                }
                self.via_supertypes(sub_ctor, &sub_args, nullable, sup)
            }
            _ => false,
        }
    }

    fn via_supertypes(
        &mut self,
        ctor: TypeConstructorId,
        arguments: &[TypeProjection],
        nullable: bool,
        sup: TypeId,
    ) -> bool {
        let Some(supertypes) = self.resolver.supertypes(ctor) else {
            return false;
        };
        let parameters = self.resolver.parameters(ctor).unwrap_or_else(|| Arc::from([]));
        let substitution = TypeSubstitution::from_arguments(&parameters, arguments);
        supertypes.iter().any(|&supertype| {
            let substituted = substitution.substitute(self.interner, supertype);
            let substituted = if nullable {
                self.interner.with_nullability(substituted, true)
            } else {
                substituted
            };
            self.is_subtype_of(substituted, sup)
        })
    }

    fn arguments_match(
        &mut self,
        ctor: TypeConstructorId,
        sub_args: &[TypeProjection],
        sup_args: &[TypeProjection],
    ) -> bool {
        if sub_args.len() != sup_args.len() {
            // Raw or malformed usage; arity errors are reported elsewhere.
            return true;
        }
        let parameters = self.resolver.parameters(ctor).unwrap_or_else(|| Arc::from([]));
        for (index, (&sub_arg, &sup_arg)) in sub_args.iter().zip(sup_args).enumerate() {
            let param = parameters.get(index).copied();
            let declared = param
                .map(|p| self.interner.type_param(p).variance)
                .unwrap_or(Variance::Invariant);
            if !self.argument_matches(sub_arg, sup_arg, declared, param) {
                return false;
            }
        }
        true
    }

    fn argument_matches(
        &mut self,
        sub_arg: TypeProjection,
        sup_arg: TypeProjection,
        declared: Variance,
        param: Option<TypeParamId>,
    ) -> bool {
        let upper_bound = || param.map(|p| self.interner.upper_bound(p)).unwrap_or(TypeId::NULLABLE_ANY);
        let (sup_variance, sup_ty) = match sup_arg {
            TypeProjection::Star => return true,
            TypeProjection::Projected { variance, ty } => (effective(variance, declared), ty),
        };
        let (sub_variance, sub_ty) = match sub_arg {
            TypeProjection::Star => (Variance::Out, upper_bound()),
            TypeProjection::Projected { variance, ty } => (effective(variance, declared), ty),
        };
        match sup_variance {
            Variance::Out => sub_variance != Variance::In && self.is_subtype_of(sub_ty, sup_ty),
            Variance::In => sub_variance != Variance::Out && self.is_subtype_of(sup_ty, sub_ty),
            Variance::Invariant => {
                sub_variance == Variance::Invariant
                    && !sub_arg.is_star()
                    && self.is_equal_type(sub_ty, sup_ty)
            }
        }
    }
}

fn effective(use_site: Variance, declared: Variance) -> Variance {
    if use_site == Variance::Invariant {
        declared
    } else {
        use_site
    }
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
