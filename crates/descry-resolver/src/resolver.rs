//! Resolver entry point and the shared component context.
//!
//! [`Components`] bundles everything a lazy computation may need: the
//! storage manager, the type interner, the descriptor arena, the remap
//! tables and the diagnostics sink. Lazy fields never store it; they receive
//! `cx: &Components` on access, which keeps descriptors free of reference
//! cycles.

use crate::annotations::AnnotationDecoder;
use crate::arena::DescriptorStore;
use crate::builtin_members::BuiltinMemberTables;
use crate::class::LazyClassDescriptor;
use crate::descriptors::Descriptor;
use crate::error::{ModuleError, ResolveError};
use crate::metadata::{ClassLookup, MetadataReader, PackagePartProvider};
use crate::module::{ClassResolution, ModuleDescriptor};
use crate::options::ResolverOptions;
use crate::providers::{
    DeserializedPackageFragmentProvider, PackageFragmentProvider, ReflectPackageFragmentProvider,
};
use dashmap::{DashMap, DashSet};
use descry_common::{ClassId, DescriptorId, ErrorReporter, FqName, Name, TracingErrorReporter};
use descry_solver::{
    BuiltinClass, StorageManager, SubtypeChecker, TypeConstructorId, TypeId, TypeInterner,
    TypeParamId, TypeProjection, TypeResolver, TypeSubstitution,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

pub struct Components {
    storage: Arc<StorageManager>,
    types: TypeInterner,
    descriptors: DescriptorStore,
    options: ResolverOptions,
    tables: Arc<BuiltinMemberTables>,
    reporter: Arc<dyn ErrorReporter>,
    host_classes: FxHashMap<String, BuiltinClass>,
    pure_implementations: FxHashMap<String, BuiltinClass>,
    not_found: DashMap<(ClassId, usize), TypeConstructorId>,
    created_classes: DashSet<(DescriptorId, String)>,
}

impl Components {
    fn new(options: ResolverOptions, reporter: Arc<dyn ErrorReporter>) -> Self {
        let tables = if options.builtin_members == ResolverOptions::default().builtin_members {
            BuiltinMemberTables::standard()
        } else {
            Arc::new(BuiltinMemberTables::compile(&options.builtin_members))
        };
        let host_classes = options
            .host_classes
            .keys()
            .filter_map(|host| Some((host.clone(), options.builtin_for_host_class(host)?)))
            .collect();
        let pure_implementations = options
            .pure_implementations
            .iter()
            .filter_map(|(builtin, hosts)| Some((BuiltinClass::from_fq_name(builtin)?, hosts)))
            .flat_map(|(builtin, hosts)| hosts.iter().map(move |host| (host.clone(), builtin)))
            .collect();
        Components {
            storage: StorageManager::new("descry-resolver"),
            types: TypeInterner::new(),
            descriptors: DescriptorStore::new(),
            options,
            tables,
            reporter,
            host_classes,
            pure_implementations,
            not_found: DashMap::new(),
            created_classes: DashSet::new(),
        }
    }

    pub fn storage(&self) -> &Arc<StorageManager> {
        &self.storage
    }

    pub fn types(&self) -> &TypeInterner {
        &self.types
    }

    pub fn descriptors(&self) -> &DescriptorStore {
        &self.descriptors
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn tables(&self) -> &BuiltinMemberTables {
        &self.tables
    }

    pub fn reporter(&self) -> &dyn ErrorReporter {
        self.reporter.as_ref()
    }

    pub fn module(&self, id: DescriptorId) -> Result<Arc<ModuleDescriptor>, ResolveError> {
        self.descriptors
            .module(id)
            .ok_or(ResolveError::Module(ModuleError::UnknownModule { id: id.0 }))
    }

    pub fn class(&self, id: DescriptorId) -> Option<Arc<LazyClassDescriptor>> {
        self.descriptors.class(id)
    }

    /// Built-in a host class (binary name) is loaded as.
    pub fn builtin_for_host_class(&self, binary_name: &str) -> Option<BuiltinClass> {
        self.host_classes.get(binary_name).copied()
    }

    /// Host class (binary name) a built-in is loaded from.
    pub fn host_class_for_builtin(&self, builtin: BuiltinClass) -> Option<&str> {
        self.options
            .host_classes
            .iter()
            .find(|(_, name)| name.as_str() == builtin.fq_name())
            .map(|(host, _)| host.as_str())
    }

    /// Built-in interface the fallback table says `binary_name` purely
    /// implements.
    pub fn pure_implementation_for(&self, binary_name: &str) -> Option<BuiltinClass> {
        self.pure_implementations.get(binary_name).copied()
    }

    /// Placeholder constructor for a class nothing resolves. One per
    /// `(class, arity)`.
    pub fn not_found_constructor(&self, class_id: &ClassId, arity: usize) -> TypeConstructorId {
        *self
            .not_found
            .entry((class_id.clone(), arity))
            .or_insert_with(|| {
                debug!(class = %class_id, arity, "Components::not_found_constructor");
                self.types.register_not_found(class_id.clone(), arity)
            })
    }

    /// Claim the right to create the class descriptor for `binary_name` in
    /// `module`.
    pub(crate) fn claim_class(&self, module: DescriptorId, binary_name: &str) -> Result<(), ResolveError> {
        if self.created_classes.insert((module, binary_name.to_string())) {
            Ok(())
        } else {
            Err(ResolveError::DuplicateClassDescriptor {
                binary_name: binary_name.to_string(),
            })
        }
    }

    /// `ctor<*, *, ...>`, one star per parameter.
    pub fn star_projected(&self, ctor: TypeConstructorId, params: &[TypeParamId]) -> TypeId {
        let arguments: SmallVec<[TypeProjection; 2]> =
            params.iter().map(|_| TypeProjection::Star).collect();
        self.types.class_type(ctor, Arc::from(arguments.as_slice()), false)
    }

    /// Type of the class `class_id` as seen from `module`, star-projected.
    /// Unresolvable classes become a not-found type rather than an error.
    pub fn class_type(&self, module: DescriptorId, class_id: &ClassId) -> Result<TypeId, ResolveError> {
        let fq_name = class_id.as_single_fq_name().as_string();
        if let Some(builtin) = BuiltinClass::from_fq_name(&fq_name) {
            let params = self.types.parameters_of(builtin.constructor());
            return Ok(self.star_projected(builtin.constructor(), &params));
        }
        let module = self.module(module)?;
        match module.find_class_across_dependencies(self, class_id, 0)? {
            ClassResolution::Found(class) => class.star_projected_type(self),
            ClassResolution::NotFound(ctor) => Ok(self.star_projected(ctor, &[])),
        }
    }

    pub fn is_subtype_of(&self, sub: TypeId, sup: TypeId) -> bool {
        SubtypeChecker::new(&self.types, self).is_subtype_of(sub, sup)
    }

    /// Substitute the receiver's type arguments into a member type, capturing
    /// variant arguments.
    pub fn substitute_member_type(&self, receiver: TypeId, member_type: TypeId) -> TypeId {
        let Some(ctor) = self.types.constructor_of(receiver) else {
            return member_type;
        };
        let Some(params) = TypeResolver::parameters(self, ctor) else {
            return member_type;
        };
        let arguments = self.types.arguments_of(receiver);
        TypeSubstitution::from_arguments(&params, &arguments)
            .with_capturing(&self.types, self.options.approximate_contravariant_captured)
            .substitute(&self.types, member_type)
    }
}

/// Supertypes and parameters of class descriptors are computed on demand.
/// A failed or reentrant computation means "no information".
impl TypeResolver for Components {
    fn supertypes(&self, ctor: TypeConstructorId) -> Option<Arc<[TypeId]>> {
        let info = self.types.constructor(ctor);
        if let Some(supertypes) = info.static_supertypes() {
            return Some(supertypes);
        }
        let class = self.descriptors.class(info.declaring_descriptor()?)?;
        class.supertypes(self).ok()
    }

    fn parameters(&self, ctor: TypeConstructorId) -> Option<Arc<[TypeParamId]>> {
        let info = self.types.constructor(ctor);
        if let Some(params) = info.parameters() {
            return Some(params);
        }
        let class = self.descriptors.class(info.declaring_descriptor()?)?;
        class.type_parameters(self).ok().map(|declared| declared.params)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Builder for [`Resolver`].
#[derive(Default)]
pub struct ResolverBuilder {
    options: ResolverOptions,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl ResolverBuilder {
    pub fn options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Resolver {
        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(TracingErrorReporter));
        Resolver {
            components: Components::new(self.options, reporter),
        }
    }
}

/// One descriptor graph: modules, their content and everything resolved
/// from it. Dropping the resolver drops the whole graph.
pub struct Resolver {
    components: Components,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::builder().build()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn types(&self) -> &TypeInterner {
        self.components.types()
    }

    pub fn descriptor(&self, id: DescriptorId) -> Option<Descriptor> {
        self.components.descriptors().get(id)
    }

    /// Create a module. `name` must be special (`<main>`).
    pub fn create_module(&self, name: &str) -> Result<DescriptorId, ResolveError> {
        let name = Name::special(name).ok_or_else(|| ModuleError::NameNotSpecial {
            name: name.to_string(),
        })?;
        let cx = &self.components;
        Ok(cx
            .descriptors()
            .register(|id| Descriptor::Module(Arc::new(ModuleDescriptor::new(cx, id, name)))))
    }

    /// Set the dependencies of `module`. The list must include `module`
    /// itself.
    pub fn set_dependencies(&self, module: DescriptorId, dependencies: &[DescriptorId]) -> Result<(), ResolveError> {
        self.set_dependencies_with_internals(module, dependencies, &[])
    }

    pub fn set_dependencies_with_internals(
        &self,
        module: DescriptorId,
        dependencies: &[DescriptorId],
        internals_visible: &[DescriptorId],
    ) -> Result<(), ResolveError> {
        let module = self.components.module(module)?;
        for &dependency in dependencies.iter().chain(internals_visible) {
            self.components.module(dependency)?;
        }
        module.set_dependencies(dependencies.to_vec(), internals_visible.to_vec())?;
        Ok(())
    }

    pub fn initialize(
        &self,
        module: DescriptorId,
        provider: Arc<dyn PackageFragmentProvider>,
    ) -> Result<(), ResolveError> {
        self.components.module(module)?.initialize(provider)?;
        Ok(())
    }

    /// Content provider backed by reflective class lookup.
    pub fn reflect_provider(
        &self,
        module: DescriptorId,
        lookup: Arc<dyn ClassLookup>,
    ) -> Arc<dyn PackageFragmentProvider> {
        Arc::new(ReflectPackageFragmentProvider::new(&self.components, module, lookup))
    }

    /// Content provider backed by serialized package parts.
    pub fn deserialized_provider(
        &self,
        module: DescriptorId,
        parts: Arc<dyn PackagePartProvider>,
        reader: Arc<dyn MetadataReader>,
    ) -> Arc<dyn PackageFragmentProvider> {
        Arc::new(DeserializedPackageFragmentProvider::new(
            &self.components,
            module,
            parts,
            reader,
        ))
    }

    pub fn package_fragments(&self, module: DescriptorId, package: &FqName) -> Result<Vec<DescriptorId>, ResolveError> {
        let cx = &self.components;
        cx.module(module)?.package(cx, package)
    }

    pub fn find_class(
        &self,
        module: DescriptorId,
        class_id: &ClassId,
    ) -> Result<Option<Arc<LazyClassDescriptor>>, ResolveError> {
        let cx = &self.components;
        cx.module(module)?.find_class(cx, class_id)
    }

    /// Decoder resolving annotation and enum classes from `module`.
    pub fn decoder(&self, module: DescriptorId) -> AnnotationDecoder<'_> {
        AnnotationDecoder::new(&self.components, module)
    }

    pub fn is_subtype_of(&self, sub: TypeId, sup: TypeId) -> bool {
        self.components.is_subtype_of(sub, sup)
    }

    /// Type of a member seen through `receiver`, see
    /// [`Components::substitute_member_type`].
    pub fn member_type(&self, receiver: TypeId, member_type: TypeId) -> TypeId {
        self.components.substitute_member_type(receiver, member_type)
    }

    pub fn render(&self, ty: TypeId) -> String {
        self.components.types().render(ty)
    }
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
