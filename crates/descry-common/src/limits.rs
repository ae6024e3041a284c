//! Centralized limits and thresholds for the resolver.
//!
//! Recursion limits for subtype checking and substitution live in
//! `descry_solver::recursion::RecursionProfile`; the constants here cover the
//! resolver-side walks that do not go through a `RecursionGuard`.

/// Maximum number of classes visited by one supertype-closure walk.
///
/// Hierarchies are cycle-checked with a visited set, so this only guards
/// against pathological (generated) hierarchies with very large fan-out.
pub const MAX_HIERARCHY_CLOSURE: usize = 4_096;

/// Maximum nesting of annotation values inside annotation arguments.
///
/// Serialized annotations can nest annotations as arguments. Real metadata
/// never goes beyond a handful of levels; deeper nesting is malformed input.
pub const MAX_ANNOTATION_NESTING: u32 = 64;

/// Initial capacity for per-container member groupings.
pub const MEMBER_GROUP_CAPACITY: usize = 16;
