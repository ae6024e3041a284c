//! Common types and utilities for the descry resolver.
//!
//! This crate provides foundational types used across all descry crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Simple, qualified and class names (`Name`, `FqName`, `ClassId`)
//! - Descriptor identities shared between the type solver and the resolver
//! - The incomplete-hierarchy diagnostics sink
//! - Resolution limits and thresholds

// String interning for name deduplication
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Names - simple, special and qualified
pub mod names;
pub use names::{ClassId, FqName, Name};

// Arena identities
pub mod ids;
pub use ids::DescriptorId;

// Diagnostics collaborator
pub mod diagnostics;
pub use diagnostics::{
    CollectingErrorReporter, Diagnostic, DiagnosticCategory, ErrorReporter, TracingErrorReporter,
};

// Centralized limits and thresholds
pub mod limits;
