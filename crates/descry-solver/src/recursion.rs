//! Bounded walks over possibly cyclic type structure.
//!
//! Metadata from outside the resolver can describe hierarchies that loop
//! (`A : B`, `B : A`) or generic supertypes that grow under substitution
//! (`A<T> : B<A<A<T>>>`). Subtype checks therefore run under a
//! [`RecursionGuard`] keyed by the `(sub, sup)` pair being decided, and
//! substitution runs under a [`DepthCounter`].
//!
//! A denied entry is never an error. Callers read it as "no further
//! information" and answer conservatively.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Named limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// `(sub, sup)` pairs on the subtype-check stack.
    SubtypeCheck,
    /// Nested substitution into type arguments.
    Substitution,
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::SubtypeCheck => 100,
            Self::Substitution => 50,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    /// Total entries allowed over the guard's lifetime.
    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::SubtypeCheck | Self::Substitution => 100_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already on the stack.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    pub fn is_entered(self) -> bool {
        self == Self::Entered
    }

    pub fn is_cycle(self) -> bool {
        self == Self::Cycle
    }

    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

/// Stack of keys currently being decided, plus depth and work budgets.
///
/// Every [`RecursionResult::Entered`] must be paired with
/// [`leave`](Self::leave) for the same key.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    on_stack: FxHashSet<K>,
    profile: RecursionProfile,
    iterations: u32,
    /// Sticky once any budget ran out.
    exhausted: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self::with_profile(RecursionProfile::Custom {
            max_depth,
            max_iterations,
        })
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        RecursionGuard {
            on_stack: FxHashSet::default(),
            profile,
            iterations: 0,
            exhausted: false,
        }
    }

    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);
        let verdict = if self.iterations > self.profile.max_iterations() {
            RecursionResult::IterationExceeded
        } else if self.depth() >= self.profile.max_depth() {
            RecursionResult::DepthExceeded
        } else if !self.on_stack.insert(key) {
            RecursionResult::Cycle
        } else {
            RecursionResult::Entered
        };
        self.exhausted |= verdict.is_exceeded();
        verdict
    }

    pub fn leave(&mut self, key: K) {
        let removed = self.on_stack.remove(&key);
        debug_assert!(removed, "RecursionGuard::leave without a matching enter");
    }

    pub fn is_visiting(&self, key: &K) -> bool {
        self.on_stack.contains(key)
    }

    pub fn depth(&self) -> u32 {
        self.on_stack.len() as u32
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn is_exceeded(&self) -> bool {
        self.exhausted
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.on_stack.is_empty() {
            panic!(
                "RecursionGuard dropped with {} keys still on the stack",
                self.on_stack.len()
            );
        }
    }
}

/// Depth-only guard. Substitution revisits the same parameter at many
/// positions, so keys would report false cycles.
pub struct DepthCounter {
    depth: u32,
    limit: u32,
    exhausted: bool,
}

impl DepthCounter {
    pub fn with_profile(profile: RecursionProfile) -> Self {
        DepthCounter {
            depth: 0,
            limit: profile.max_depth(),
            exhausted: false,
        }
    }

    /// `false` once the limit is reached; the caller must not `leave`.
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.limit {
            self.exhausted = true;
            return false;
        }
        self.depth += 1;
        true
    }

    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "DepthCounter::leave at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_exceeded(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
