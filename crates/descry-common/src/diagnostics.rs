//! Diagnostics collaborator for soft resolution failures.
//!
//! The resolver never fails a query because a supertype cannot be found.
//! Instead it hands the problem to an [`ErrorReporter`] and carries on with
//! the data it has. Reporting is fire-and-forget.

use crate::ids::DescriptorId;
use crate::names::FqName;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCategory {
    /// A declared supertype could not be resolved.
    IncompleteHierarchy,
    /// A supertype was dropped because it closes a loop back to the class.
    CyclicHierarchy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub descriptor: DescriptorId,
    pub class_name: FqName,
    /// Presentable text of each offending supertype, in declaration order.
    pub supertypes: Vec<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn incomplete_hierarchy(
        descriptor: DescriptorId,
        class_name: FqName,
        unresolved: Vec<String>,
    ) -> Self {
        Self {
            category: DiagnosticCategory::IncompleteHierarchy,
            descriptor,
            class_name,
            supertypes: unresolved,
        }
    }

    #[must_use]
    pub fn cyclic_hierarchy(
        descriptor: DescriptorId,
        class_name: FqName,
        cyclic: Vec<String>,
    ) -> Self {
        Self {
            category: DiagnosticCategory::CyclicHierarchy,
            descriptor,
            class_name,
            supertypes: cyclic,
        }
    }

    /// One-line message for logs and tooling output.
    pub fn message(&self) -> String {
        match self.category {
            DiagnosticCategory::IncompleteHierarchy => format!(
                "supertypes of {} cannot be resolved: {}",
                self.class_name,
                self.supertypes.join(", ")
            ),
            DiagnosticCategory::CyclicHierarchy => format!(
                "{} has a cyclic supertype chain through {}",
                self.class_name,
                self.supertypes.join(", ")
            ),
        }
    }
}

/// Sink for soft resolution problems.
pub trait ErrorReporter: Send + Sync {
    fn report_incomplete_hierarchy(
        &self,
        descriptor: DescriptorId,
        class_name: &FqName,
        unresolved: &[String],
    );

    fn report_cyclic_hierarchy(
        &self,
        _descriptor: DescriptorId,
        _class_name: &FqName,
        _cyclic: &[String],
    ) {
    }
}

/// Reporter that forwards everything to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report_incomplete_hierarchy(
        &self,
        descriptor: DescriptorId,
        class_name: &FqName,
        unresolved: &[String],
    ) {
        warn!(
            descriptor = descriptor.0,
            class = %class_name,
            unresolved = ?unresolved,
            "incomplete hierarchy"
        );
    }

    fn report_cyclic_hierarchy(
        &self,
        descriptor: DescriptorId,
        class_name: &FqName,
        cyclic: &[String],
    ) {
        warn!(
            descriptor = descriptor.0,
            class = %class_name,
            cyclic = ?cyclic,
            "cyclic hierarchy"
        );
    }
}

/// Reporter that keeps every diagnostic for later inspection.
#[derive(Debug, Default)]
pub struct CollectingErrorReporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    /// Serialize the collected diagnostics as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&*self.diagnostics.lock())
    }
}

impl ErrorReporter for CollectingErrorReporter {
    fn report_incomplete_hierarchy(
        &self,
        descriptor: DescriptorId,
        class_name: &FqName,
        unresolved: &[String],
    ) {
        self.diagnostics.lock().push(Diagnostic::incomplete_hierarchy(
            descriptor,
            class_name.clone(),
            unresolved.to_vec(),
        ));
    }

    fn report_cyclic_hierarchy(
        &self,
        descriptor: DescriptorId,
        class_name: &FqName,
        cyclic: &[String],
    ) {
        self.diagnostics.lock().push(Diagnostic::cyclic_hierarchy(
            descriptor,
            class_name.clone(),
            cyclic.to_vec(),
        ));
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
