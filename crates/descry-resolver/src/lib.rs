//! Lazy Descriptor Resolver
//!
//! Builds a graph of modules, package fragments, classes and members on
//! demand, from two kinds of input:
//!
//! - **Reflection**: class handles found through a [`ClassLookup`], with
//!   their supertypes, members and annotations translated lazily
//! - **Serialized metadata**: package parts decoded by a [`MetadataReader`]
//!   into record-backed member scopes
//!
//! Every lazily computed field runs at most once per resolver and receives
//! the shared [`Components`] on access. Soft failures (unresolvable
//! supertypes, unknown enum entries, mistyped constants) degrade to marker
//! values; lifecycle violations and unrepresentable constants are
//! [`ResolveError`]s.

pub mod annotations;
pub mod arena;
pub mod builtin_members;
pub mod class;
pub mod constants;
pub mod descriptors;
pub mod error;
pub mod member_scope;
pub mod metadata;
pub mod module;
pub mod options;
pub mod providers;
pub mod resolver;
pub mod source;

// Shared fakes for unit and integration tests
#[cfg(any(test, feature = "test-fixtures"))]
#[path = "../tests/test_fixtures.rs"]
pub mod test_fixtures;

pub use annotations::AnnotationDecoder;
pub use arena::DescriptorStore;
pub use builtin_members::{BuiltinMemberCatalog, BuiltinMemberTables, DefaultValue, SpecialSignatureInfo};
pub use class::{ClassKind, DeclaredTypeParameters, LazyClassDescriptor, Modality};
pub use constants::{AnnotationValue, ConstantValue};
pub use descriptors::{
    ConstructorDescriptor, Descriptor, FunctionDescriptor, MemberOrigin, PackageFragmentDescriptor,
    PropertyDescriptor, PropertyKind, TypeParameterDescriptor, ValueParameter,
};
pub use error::{DecodeError, ModuleError, ResolveError};
pub use member_scope::{
    DeserializedMemberScope, DescriptorKindFilter, MemberDeserializer, PackageScopeExtension,
    ScopeExtension,
};
pub use metadata::{
    ClassHandle, ClassLookup, ContainerMetadata, MetadataReader, NameResolver, PackagePartProvider,
    StringTable,
};
pub use module::{ClassResolution, ModuleDescriptor};
pub use options::{ConfigError, ResolverOptions};
pub use providers::PackageFragmentProvider;
pub use resolver::{Components, Resolver, ResolverBuilder};
pub use source::SourceElement;
