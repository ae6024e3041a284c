//! descry: lazy symbol and type descriptors for compiled class files.
//!
//! This package re-exports the workspace crates under one name and owns the
//! tracing subscriber setup used by embedders and the end-to-end tests.
//!
//! ```ignore
//! use descry::{ClassId, Resolver};
//!
//! descry::init_tracing();
//! let resolver = Resolver::new();
//! let module = resolver.create_module("<main>")?;
//! resolver.set_dependencies(module, &[module])?;
//! resolver.initialize(module, resolver.reflect_provider(module, lookup))?;
//! let class = resolver.find_class(module, &ClassId::from_binary_name("java.util.ArrayList"))?;
//! ```

// Names, ids, diagnostics and limits
pub use descry_common as common;
pub use descry_common::{
    ClassId, CollectingErrorReporter, DescriptorId, Diagnostic, DiagnosticCategory, ErrorReporter,
    FqName, Name, TracingErrorReporter,
};

// Lazy storage and the type model
pub use descry_solver as solver;
pub use descry_solver::{LazyValue, MemoizedFunction, PrimitiveType, RecursionDetected, TypeId};

// Descriptor resolution
pub use descry_resolver as resolver;
pub use descry_resolver::{
    AnnotationValue, ClassKind, Components, ConstantValue, DecodeError, Descriptor, Modality,
    ModuleError, ResolveError, Resolver, ResolverBuilder, ResolverOptions, SourceElement,
};

// Tracing subscriber setup (DESCRY_LOG / DESCRY_LOG_FORMAT)
pub mod tracing_config;
pub use tracing_config::{LogFormat, init_tracing};
