//! Shared test fixtures: in-memory class handles, a class lookup over them,
//! and package parts served from prepared metadata.
//!
//! Used by the unit tests of this crate and by the workspace integration
//! tests.

use crate::metadata::{
    ClassHandle, ClassLookup, ConstructorRef, ContainerMetadata, FieldRef, MetadataReader,
    MethodRef, PackagePartProvider, ParameterRef, ReflectAnnotation, TypeParameterRef, TypeRef,
    Visibility,
};
use crate::class::LazyClassDescriptor;
use crate::error::ResolveError;
use crate::resolver::{Components, Resolver};
use dashmap::DashMap;
use descry_common::{ClassId, CollectingErrorReporter, DescriptorId, FqName, Name};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Name of the module every fixture resolver starts with.
pub const MAIN_MODULE: &str = "<main>";

// =============================================================================
// Class handles
// =============================================================================

#[derive(Clone, Copy, Debug, Default)]
struct Flags {
    interface: bool,
    enumeration: bool,
    abstract_: bool,
    final_: bool,
    annotation: bool,
    static_: bool,
    sealed: bool,
}

/// A class handle built in code.
#[derive(Default)]
pub struct FakeClass {
    binary_name: String,
    flags: Flags,
    visibility: Visibility,
    outer: Option<Arc<dyn ClassHandle>>,
    supertypes: Vec<TypeRef>,
    type_parameters: Vec<TypeParameterRef>,
    annotations: Vec<ReflectAnnotation>,
    constructors: Vec<ConstructorRef>,
    methods: Vec<MethodRef>,
    fields: Vec<FieldRef>,
    enum_entries: Vec<String>,
    inner_class_names: Vec<String>,
    /// Structural accessor calls, to observe memoization.
    structural_calls: AtomicU32,
}

impl FakeClass {
    /// A final class extending `java.lang.Object`.
    pub fn class(binary_name: &str) -> Self {
        FakeClass {
            binary_name: binary_name.to_string(),
            flags: Flags {
                final_: true,
                ..Flags::default()
            },
            supertypes: vec![TypeRef::class("java.lang.Object")],
            ..FakeClass::default()
        }
    }

    pub fn interface(binary_name: &str) -> Self {
        FakeClass {
            binary_name: binary_name.to_string(),
            flags: Flags {
                interface: true,
                abstract_: true,
                ..Flags::default()
            },
            ..FakeClass::default()
        }
    }

    pub fn enum_class(binary_name: &str, entries: &[&str]) -> Self {
        FakeClass {
            binary_name: binary_name.to_string(),
            flags: Flags {
                enumeration: true,
                final_: true,
                ..Flags::default()
            },
            supertypes: vec![TypeRef::generic(
                "java.lang.Enum",
                vec![crate::metadata::TypeArgRef::Type(TypeRef::class(binary_name))],
            )],
            enum_entries: entries.iter().map(|entry| entry.to_string()).collect(),
            fields: entries
                .iter()
                .map(|entry| FieldRef {
                    name: entry.to_string(),
                    ty: TypeRef::class(binary_name),
                    is_static: true,
                })
                .collect(),
            ..FakeClass::default()
        }
    }

    /// An annotation class with one element per `(name, type)`.
    pub fn annotation_class(binary_name: &str, elements: &[(&str, TypeRef)]) -> Self {
        FakeClass {
            binary_name: binary_name.to_string(),
            flags: Flags {
                interface: true,
                annotation: true,
                abstract_: true,
                ..Flags::default()
            },
            supertypes: vec![TypeRef::class("java.lang.annotation.Annotation")],
            methods: elements
                .iter()
                .map(|(name, ty)| method(name, &[], Some(ty.clone()), "()"))
                .collect(),
            ..FakeClass::default()
        }
    }

    pub fn open(mut self) -> Self {
        self.flags.final_ = false;
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.flags.final_ = false;
        self.flags.abstract_ = true;
        self
    }

    pub fn sealed(mut self) -> Self {
        self.flags.sealed = true;
        self
    }

    pub fn static_nested(mut self) -> Self {
        self.flags.static_ = true;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn nested_in(mut self, outer: Arc<dyn ClassHandle>) -> Self {
        self.outer = Some(outer);
        self
    }

    /// Replace the declared supertypes.
    pub fn supertypes(mut self, supertypes: Vec<TypeRef>) -> Self {
        self.supertypes = supertypes;
        self
    }

    pub fn type_parameter(mut self, name: &str, bounds: Vec<TypeRef>) -> Self {
        self.type_parameters.push(TypeParameterRef {
            name: name.to_string(),
            bounds,
        });
        self
    }

    pub fn annotated(mut self, annotation: ReflectAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn constructor(mut self, parameters: Vec<ParameterRef>) -> Self {
        self.constructors.push(ConstructorRef { parameters });
        self
    }

    pub fn method(mut self, method: MethodRef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn field(mut self, name: &str, ty: TypeRef, is_static: bool) -> Self {
        self.fields.push(FieldRef {
            name: name.to_string(),
            ty,
            is_static,
        });
        self
    }

    pub fn inner_class(mut self, name: &str) -> Self {
        self.inner_class_names.push(name.to_string());
        self
    }

    pub fn structural_calls(&self) -> u32 {
        self.structural_calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.structural_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Host method shorthand. `descriptor` is the host descriptor.
pub fn method(name: &str, parameters: &[(&str, TypeRef)], return_type: Option<TypeRef>, descriptor: &str) -> MethodRef {
    MethodRef {
        name: name.to_string(),
        parameters: parameters
            .iter()
            .map(|(name, ty)| ParameterRef {
                name: name.to_string(),
                ty: ty.clone(),
            })
            .collect(),
        return_type,
        descriptor: descriptor.to_string(),
        is_static: false,
    }
}

impl ClassHandle for FakeClass {
    fn binary_name(&self) -> String {
        self.binary_name.clone()
    }

    fn is_interface(&self) -> bool {
        self.flags.interface
    }

    fn is_enum(&self) -> bool {
        self.flags.enumeration
    }

    fn is_abstract(&self) -> bool {
        self.flags.abstract_
    }

    fn is_final(&self) -> bool {
        self.flags.final_
    }

    fn is_annotation_type(&self) -> bool {
        self.flags.annotation
    }

    fn is_static(&self) -> bool {
        self.flags.static_
    }

    fn is_sealed(&self) -> bool {
        self.flags.sealed
    }

    fn outer_class(&self) -> Option<Arc<dyn ClassHandle>> {
        self.outer.clone()
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn supertypes(&self) -> Vec<TypeRef> {
        self.touch();
        self.supertypes.clone()
    }

    fn type_parameters(&self) -> Vec<TypeParameterRef> {
        self.touch();
        self.type_parameters.clone()
    }

    fn annotations(&self) -> Vec<ReflectAnnotation> {
        self.touch();
        self.annotations.clone()
    }

    fn constructors(&self) -> Vec<ConstructorRef> {
        self.touch();
        self.constructors.clone()
    }

    fn methods(&self) -> Vec<MethodRef> {
        self.touch();
        self.methods.clone()
    }

    fn fields(&self) -> Vec<FieldRef> {
        self.touch();
        self.fields.clone()
    }

    fn enum_entries(&self) -> Vec<String> {
        self.enum_entries.clone()
    }

    fn inner_class_names(&self) -> Vec<String> {
        self.inner_class_names.clone()
    }
}

/// Class lookup over registered [`FakeClass`]es.
#[derive(Default)]
pub struct FakeClassLookup {
    classes: DashMap<String, Arc<FakeClass>>,
    lookups: AtomicU32,
}

impl FakeClassLookup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, class: FakeClass) -> Arc<FakeClass> {
        let class = Arc::new(class);
        self.classes.insert(class.binary_name.clone(), Arc::clone(&class));
        class
    }

    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ClassLookup for FakeClassLookup {
    fn find_class(&self, binary_name: &str) -> Option<Arc<dyn ClassHandle>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let class = self.classes.get(binary_name)?;
        let handle: Arc<dyn ClassHandle> = Arc::clone(class.value()) as Arc<dyn ClassHandle>;
        Some(handle)
    }
}

// =============================================================================
// Package parts
// =============================================================================

/// Package parts and their metadata, served from memory.
#[derive(Default)]
pub struct FakePackageParts {
    parts: RwLock<IndexMap<FqName, Vec<(String, ContainerMetadata)>>>,
    sub_packages: RwLock<IndexMap<FqName, Vec<Name>>>,
    reads: AtomicU32,
}

impl FakePackageParts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_part(&self, package: &str, part: &str, metadata: ContainerMetadata) {
        let package = FqName::parse(package);
        let mut parent = package.clone();
        while let (Some(short), Some(grand)) = (parent.short_name(), parent.parent()) {
            let mut sub_packages = self.sub_packages.write();
            let children = sub_packages.entry(grand.clone()).or_default();
            if !children.contains(&short) {
                children.push(short);
            }
            parent = grand;
        }
        self.parts
            .write()
            .entry(package)
            .or_default()
            .push((part.to_string(), metadata));
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl PackagePartProvider for FakePackageParts {
    fn find_package_parts(&self, package: &FqName) -> Vec<String> {
        self.parts
            .read()
            .get(package)
            .map(|parts| parts.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    fn sub_package_names(&self, package: &FqName) -> Vec<Name> {
        self.sub_packages
            .read()
            .get(package)
            .cloned()
            .unwrap_or_default()
    }
}

impl MetadataReader for FakePackageParts {
    fn read_package_part(&self, package: &FqName, part: &str) -> Option<ContainerMetadata> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.parts
            .read()
            .get(package)?
            .iter()
            .find(|(name, _)| name == part)
            .map(|(_, metadata)| metadata.clone())
    }
}

// =============================================================================
// Resolvers
// =============================================================================

/// One module that depends only on itself, with reflective content.
pub fn reflect_module(resolver: &Resolver, lookup: Arc<FakeClassLookup>) -> Result<DescriptorId, ResolveError> {
    let module = resolver.create_module(MAIN_MODULE)?;
    resolver.set_dependencies(module, &[module])?;
    resolver.initialize(module, resolver.reflect_provider(module, lookup))?;
    Ok(module)
}

/// One module that depends only on itself, with both reflective and
/// serialized content.
pub fn mixed_module(
    resolver: &Resolver,
    lookup: Arc<FakeClassLookup>,
    parts: Arc<FakePackageParts>,
) -> Result<DescriptorId, ResolveError> {
    let module = resolver.create_module(MAIN_MODULE)?;
    resolver.set_dependencies(module, &[module])?;
    let composite = crate::providers::CompositePackageFragmentProvider::new(vec![
        resolver.deserialized_provider(module, parts.clone(), parts),
        resolver.reflect_provider(module, lookup),
    ]);
    resolver.initialize(module, Arc::new(composite))?;
    Ok(module)
}

/// A resolver with one self-dependent module and a collecting reporter.
pub struct TestWorld {
    pub resolver: Resolver,
    pub module: DescriptorId,
    pub reporter: Arc<CollectingErrorReporter>,
    pub lookup: Arc<FakeClassLookup>,
}

impl TestWorld {
    pub fn new(classes: Vec<FakeClass>) -> Self {
        Self::build(classes, None)
    }

    /// Like [`TestWorld::new`], with serialized package parts ahead of the
    /// reflective classes.
    pub fn with_parts(classes: Vec<FakeClass>, parts: Arc<FakePackageParts>) -> Self {
        Self::build(classes, Some(parts))
    }

    fn build(classes: Vec<FakeClass>, parts: Option<Arc<FakePackageParts>>) -> Self {
        let reporter = Arc::new(CollectingErrorReporter::new());
        let resolver = Resolver::builder().error_reporter(reporter.clone()).build();
        let lookup = FakeClassLookup::new();
        for class in classes {
            lookup.add(class);
        }
        let module = match parts {
            Some(parts) => mixed_module(&resolver, lookup.clone(), parts),
            None => reflect_module(&resolver, lookup.clone()),
        }
        .expect("fixture module");
        TestWorld {
            resolver,
            module,
            reporter,
            lookup,
        }
    }

    pub fn cx(&self) -> &Components {
        self.resolver.components()
    }

    /// The descriptor for `binary_name`; panics if the class is unknown.
    pub fn class(&self, binary_name: &str) -> Arc<LazyClassDescriptor> {
        self.resolver
            .find_class(self.module, &ClassId::from_binary_name(binary_name))
            .expect("class lookup")
            .unwrap_or_else(|| panic!("no class {binary_name}"))
    }
}
