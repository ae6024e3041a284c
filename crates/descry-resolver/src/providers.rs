//! Package fragment providers.
//!
//! A provider maps a package name to the fragments that make it up and a
//! class id to its descriptor. Modules compose the providers of all their
//! dependencies into one [`CompositePackageFragmentProvider`].

use crate::class::LazyClassDescriptor;
use crate::descriptors::{Descriptor, PackageFragmentDescriptor};
use crate::error::ResolveError;
use crate::member_scope::{DeserializedMemberScope, PackageScopeExtension, RecordMemberDeserializer};
use crate::metadata::{ClassLookup, MetadataReader, PackagePartProvider};
use crate::resolver::Components;
use crate::source::SourceElement;
use descry_common::{ClassId, DescriptorId, FqName, Name};
use descry_solver::MemoizedFunction;
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::{debug, trace};

pub trait PackageFragmentProvider: Send + Sync {
    fn package_fragments(&self, cx: &Components, package: &FqName) -> Result<Vec<DescriptorId>, ResolveError>;

    fn sub_packages_of(&self, cx: &Components, package: &FqName, filter: &dyn Fn(Name) -> bool) -> Vec<FqName>;

    fn find_class(&self, cx: &Components, class_id: &ClassId) -> Result<Option<DescriptorId>, ResolveError>;
}

// =============================================================================
// Composite
// =============================================================================

pub struct CompositePackageFragmentProvider {
    providers: Vec<Arc<dyn PackageFragmentProvider>>,
}

impl CompositePackageFragmentProvider {
    pub fn new(providers: Vec<Arc<dyn PackageFragmentProvider>>) -> Self {
        CompositePackageFragmentProvider { providers }
    }
}

impl PackageFragmentProvider for CompositePackageFragmentProvider {
    fn package_fragments(&self, cx: &Components, package: &FqName) -> Result<Vec<DescriptorId>, ResolveError> {
        let mut fragments = Vec::new();
        for provider in &self.providers {
            fragments.extend(provider.package_fragments(cx, package)?);
        }
        Ok(fragments)
    }

    fn sub_packages_of(&self, cx: &Components, package: &FqName, filter: &dyn Fn(Name) -> bool) -> Vec<FqName> {
        let mut result: IndexSet<FqName> = IndexSet::new();
        for provider in &self.providers {
            result.extend(provider.sub_packages_of(cx, package, filter));
        }
        result.into_iter().collect()
    }

    fn find_class(&self, cx: &Components, class_id: &ClassId) -> Result<Option<DescriptorId>, ResolveError> {
        for provider in &self.providers {
            if let Some(found) = provider.find_class(cx, class_id)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

// =============================================================================
// Reflection
// =============================================================================

/// Classes resolved on demand through a [`ClassLookup`].
///
/// Reflection cannot enumerate packages, so a fragment exists for every
/// package anyone asks about, and it has no member scope of its own.
pub struct ReflectPackageFragmentProvider {
    module: DescriptorId,
    lookup: Arc<dyn ClassLookup>,
    fragments: MemoizedFunction<FqName, DescriptorId>,
    classes: MemoizedFunction<ClassId, Option<DescriptorId>>,
}

impl ReflectPackageFragmentProvider {
    pub fn new(cx: &Components, module: DescriptorId, lookup: Arc<dyn ClassLookup>) -> Self {
        ReflectPackageFragmentProvider {
            module,
            lookup,
            fragments: cx.storage().memoized(),
            classes: cx.storage().memoized(),
        }
    }

    fn fragment(&self, cx: &Components, package: &FqName) -> Result<DescriptorId, ResolveError> {
        let module = self.module;
        Ok(self.fragments.get_or_compute(package, |package| {
            cx.descriptors().register(|id| {
                Descriptor::PackageFragment(Arc::new(PackageFragmentDescriptor {
                    id,
                    fq_name: package.clone(),
                    module,
                    source: SourceElement::NoSource,
                    scope: None,
                }))
            })
        })?)
    }

    /// How many class lookups were started; used to observe memoization.
    pub fn class_computations(&self) -> u32 {
        self.classes.computations()
    }
}

impl PackageFragmentProvider for ReflectPackageFragmentProvider {
    fn package_fragments(&self, cx: &Components, package: &FqName) -> Result<Vec<DescriptorId>, ResolveError> {
        Ok(vec![self.fragment(cx, package)?])
    }

    fn sub_packages_of(&self, _cx: &Components, _package: &FqName, _filter: &dyn Fn(Name) -> bool) -> Vec<FqName> {
        Vec::new()
    }

    fn find_class(&self, cx: &Components, class_id: &ClassId) -> Result<Option<DescriptorId>, ResolveError> {
        self.classes.try_get_or_compute(class_id, |class_id| {
            let container = match class_id.outer_class_id() {
                Some(outer) => match self.find_class(cx, &outer)? {
                    Some(outer) => outer,
                    None => return Ok(None),
                },
                None => self.fragment(cx, class_id.package())?,
            };
            let binary_name = class_id.binary_name();
            let Some(handle) = self.lookup.find_class(&binary_name) else {
                trace!(class = %class_id, "ReflectPackageFragmentProvider: no such class");
                return Ok(None);
            };
            LazyClassDescriptor::create(cx, self.module, container, class_id.clone(), handle).map(Some)
        })
    }
}

// =============================================================================
// Serialized metadata
// =============================================================================

/// One fragment per compiled package part, each with a member scope over
/// the part's records.
pub struct DeserializedPackageFragmentProvider {
    module: DescriptorId,
    parts: Arc<dyn PackagePartProvider>,
    reader: Arc<dyn MetadataReader>,
    fragments: MemoizedFunction<FqName, Arc<[DescriptorId]>>,
}

impl DeserializedPackageFragmentProvider {
    pub fn new(
        cx: &Components,
        module: DescriptorId,
        parts: Arc<dyn PackagePartProvider>,
        reader: Arc<dyn MetadataReader>,
    ) -> Self {
        DeserializedPackageFragmentProvider {
            module,
            parts,
            reader,
            fragments: cx.storage().memoized(),
        }
    }

    fn compute_fragments(&self, cx: &Components, package: &FqName) -> Arc<[DescriptorId]> {
        let module = self.module;
        let mut fragments = Vec::new();
        for part in self.parts.find_package_parts(package) {
            let Some(metadata) = self.reader.read_package_part(package, &part) else {
                debug!(package = %package, part = %part, "DeserializedPackageFragmentProvider: unreadable part");
                continue;
            };
            let source = SourceElement::package_part(&part, metadata.facade.as_deref());
            let id = cx.descriptors().register(|id| {
                let scope = DeserializedMemberScope::new(
                    cx,
                    id,
                    module,
                    source.clone(),
                    metadata,
                    Box::new(PackageScopeExtension::new(package.clone())),
                    Box::new(RecordMemberDeserializer),
                );
                Descriptor::PackageFragment(Arc::new(PackageFragmentDescriptor {
                    id,
                    fq_name: package.clone(),
                    module,
                    source,
                    scope: Some(Arc::new(scope)),
                }))
            });
            fragments.push(id);
        }
        Arc::from(fragments)
    }
}

impl PackageFragmentProvider for DeserializedPackageFragmentProvider {
    fn package_fragments(&self, cx: &Components, package: &FqName) -> Result<Vec<DescriptorId>, ResolveError> {
        let fragments = self
            .fragments
            .get_or_compute(package, |package| self.compute_fragments(cx, package))?;
        Ok(fragments.to_vec())
    }

    fn sub_packages_of(&self, _cx: &Components, package: &FqName, filter: &dyn Fn(Name) -> bool) -> Vec<FqName> {
        self.parts
            .sub_package_names(package)
            .into_iter()
            .filter(|&name| filter(name))
            .map(|name| package.child(name))
            .collect()
    }

    fn find_class(&self, _cx: &Components, _class_id: &ClassId) -> Result<Option<DescriptorId>, ResolveError> {
        Ok(None)
    }
}
