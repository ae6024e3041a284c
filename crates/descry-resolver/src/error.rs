//! Fatal resolution errors.
//!
//! Soft problems (unresolved supertypes, unknown enum entries, argument type
//! mismatches) never show up here; they become sentinel values in the data
//! model. Everything in this module aborts the query that triggered it and
//! leaves previously memoized state alone.

use descry_solver::RecursionDetected;
use thiserror::Error;

/// Two-phase module lifecycle violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("module name must be special: {name}")]
    NameNotSpecial { name: String },

    #[error("dependencies of {module} were already set")]
    DependenciesAlreadySet { module: String },

    #[error("attempt to initialize module {module} twice")]
    AlreadyInitialized { module: String },

    #[error("dependencies of module {module} were not set before querying module content")]
    DependenciesNotSet { module: String },

    #[error("module {module} is not contained in its own dependencies")]
    NotInOwnDependencies { module: String },

    #[error(
        "dependency module {dependency} was not initialized by the time contents of dependent module {module} were queried"
    )]
    DependencyNotInitialized { dependency: String, module: String },

    #[error("no module with id {id}")]
    UnknownModule { id: u32 },
}

/// Constant values that have no representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("class literal annotation arguments are not supported yet ({class_id})")]
    ClassLiteral { class_id: String },

    #[error("arrays of class literals are not supported yet")]
    ArrayOfClassLiterals,

    #[error("array of arrays is impossible")]
    ArrayOfArrays,

    #[error("unknown annotation argument tag: {tag}")]
    UnknownTag { tag: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Recursion(#[from] RecursionDetected),

    #[error("class descriptor for {binary_name} was already created")]
    DuplicateClassDescriptor { binary_name: String },

    #[error("type parameter `{parameter}` surely belongs to class {class}, so it must be resolved")]
    UnresolvedTypeParameter { parameter: String, class: String },
}

impl ResolveError {
    pub fn is_recursion(&self) -> bool {
        matches!(self, ResolveError::Recursion(_))
    }
}
