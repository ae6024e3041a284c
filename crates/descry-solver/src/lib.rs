//! Lazy Storage and Nominal Type Solver
//!
//! This crate holds the pieces of descry that know nothing about class files
//! or metadata:
//!
//! - **Storage**: lazily computed, memoized values with recursion detection
//! - **Interned types**: `TypeId` handles over constructors, parameters and
//!   captured types, plus the built-in class catalog
//! - **Substitution**: variance-aware parameter replacement and capture
//!   conversion
//! - **Subtyping**: nominal checks over generic hierarchies, with class facts
//!   supplied through `TypeResolver`
//!
//! Key properties:
//! - O(1) type equality via interning (`TypeId` comparison)
//! - Each lazy cell runs its computation at most once on success
//! - Re-entrant computations surface as `RecursionDetected` instead of
//!   deadlocking
pub mod builtins;
pub mod captured;
mod intern;
pub mod recursion;
pub mod storage;
pub mod substitute;
pub mod subtype;
pub mod types;

pub use builtins::{BuiltinClass, PrimitiveType};
pub use intern::TypeInterner;
pub use storage::{LazyValue, MemoizedFunction, RecursionDetected, StorageManager};
pub use substitute::TypeSubstitution;
pub use subtype::{StaticTypeResolver, SubtypeChecker, TypeResolver};
pub use types::{
    CapturedId, Declaration, TypeConstructorId, TypeConstructorInfo, TypeData, TypeId,
    TypeParamId, TypeParamInfo, TypeProjection, Variance,
};
