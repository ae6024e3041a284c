//! Module descriptors.
//!
//! A module goes through a strict two-phase lifecycle:
//!
//! 1. `set_dependencies` exactly once (the list must contain the module
//!    itself);
//! 2. `initialize` with a content provider exactly once.
//!
//! Only then can its content be queried, and only if every dependency has
//! been initialized too. Violations are [`ModuleError`]s. A failed content
//! query is not cached: once the missing dependency is initialized the same
//! query succeeds.

use crate::class::LazyClassDescriptor;
use crate::error::{ModuleError, ResolveError};
use crate::providers::{CompositePackageFragmentProvider, PackageFragmentProvider};
use crate::resolver::Components;
use descry_common::{ClassId, DescriptorId, FqName, Name};
use descry_solver::{LazyValue, TypeConstructorId};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleDependencies {
    pub all: Vec<DescriptorId>,
    /// Modules whose internal declarations this module may see.
    pub internals_visible: Vec<DescriptorId>,
}

/// Result of a class lookup across a module's dependencies.
#[derive(Clone)]
pub enum ClassResolution {
    Found(Arc<LazyClassDescriptor>),
    /// Nothing resolved; a placeholder constructor stands in.
    NotFound(TypeConstructorId),
}

pub struct ModuleDescriptor {
    id: DescriptorId,
    name: Name,
    dependencies: OnceLock<ModuleDependencies>,
    content: OnceLock<Arc<dyn PackageFragmentProvider>>,
    composite: LazyValue<Arc<CompositePackageFragmentProvider>>,
}

impl ModuleDescriptor {
    pub(crate) fn new(cx: &Components, id: DescriptorId, name: Name) -> Self {
        ModuleDescriptor {
            id,
            name,
            dependencies: OnceLock::new(),
            content: OnceLock::new(),
            composite: cx.storage().lazy(),
        }
    }

    pub fn id(&self) -> DescriptorId {
        self.id
    }

    pub fn name(&self) -> Name {
        self.name
    }

    fn display_name(&self) -> String {
        self.name.to_string()
    }

    pub fn set_dependencies(
        &self,
        all: Vec<DescriptorId>,
        internals_visible: Vec<DescriptorId>,
    ) -> Result<(), ModuleError> {
        debug!(module = %self.name, dependencies = all.len(), "ModuleDescriptor::set_dependencies");
        self.dependencies
            .set(ModuleDependencies {
                all,
                internals_visible,
            })
            .map_err(|_| ModuleError::DependenciesAlreadySet {
                module: self.display_name(),
            })
    }

    pub fn dependencies(&self) -> Option<&ModuleDependencies> {
        self.dependencies.get()
    }

    pub fn initialize(&self, provider: Arc<dyn PackageFragmentProvider>) -> Result<(), ModuleError> {
        debug!(module = %self.name, "ModuleDescriptor::initialize");
        self.content
            .set(provider)
            .map_err(|_| ModuleError::AlreadyInitialized {
                module: self.display_name(),
            })
    }

    pub fn is_initialized(&self) -> bool {
        self.content.get().is_some()
    }

    pub fn should_see_internals_of(&self, other: DescriptorId) -> bool {
        other == self.id
            || self
                .dependencies
                .get()
                .is_some_and(|deps| deps.internals_visible.contains(&other))
    }

    /// The module's own provider followed by its dependencies', in
    /// dependency order.
    pub fn package_fragment_provider(
        &self,
        cx: &Components,
    ) -> Result<Arc<CompositePackageFragmentProvider>, ResolveError> {
        self.composite.try_get_or_compute(|| {
            let deps = self
                .dependencies
                .get()
                .ok_or_else(|| ModuleError::DependenciesNotSet {
                    module: self.display_name(),
                })?;
            if !deps.all.contains(&self.id) {
                return Err(ModuleError::NotInOwnDependencies {
                    module: self.display_name(),
                }
                .into());
            }
            let mut providers = Vec::with_capacity(deps.all.len());
            for &dependency in &deps.all {
                let module = cx.module(dependency)?;
                let content = module.content.get().ok_or_else(|| ModuleError::DependencyNotInitialized {
                    dependency: module.display_name(),
                    module: self.display_name(),
                })?;
                providers.push(Arc::clone(content));
            }
            trace!(module = %self.name, providers = providers.len(), "ModuleDescriptor: content ready");
            Ok(Arc::new(CompositePackageFragmentProvider::new(providers)))
        })
    }

    /// Fragments of `package` visible from this module.
    pub fn package(&self, cx: &Components, package: &FqName) -> Result<Vec<DescriptorId>, ResolveError> {
        self.package_fragment_provider(cx)?.package_fragments(cx, package)
    }

    pub fn sub_packages_of(
        &self,
        cx: &Components,
        package: &FqName,
        filter: &dyn Fn(Name) -> bool,
    ) -> Result<Vec<FqName>, ResolveError> {
        Ok(self
            .package_fragment_provider(cx)?
            .sub_packages_of(cx, package, filter))
    }

    pub fn find_class(
        &self,
        cx: &Components,
        class_id: &ClassId,
    ) -> Result<Option<Arc<LazyClassDescriptor>>, ResolveError> {
        let found = self.package_fragment_provider(cx)?.find_class(cx, class_id)?;
        Ok(found.and_then(|id| cx.class(id)))
    }

    /// Like [`find_class`](Self::find_class), but never empty-handed: an
    /// unresolvable class becomes a not-found placeholder with `arity`
    /// parameters.
    pub fn find_class_across_dependencies(
        &self,
        cx: &Components,
        class_id: &ClassId,
        arity: usize,
    ) -> Result<ClassResolution, ResolveError> {
        Ok(match self.find_class(cx, class_id)? {
            Some(class) => ClassResolution::Found(class),
            None => ClassResolution::NotFound(cx.not_found_constructor(class_id, arity)),
        })
    }
}

#[cfg(test)]
#[path = "../tests/module_tests.rs"]
mod tests;
