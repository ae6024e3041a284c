//! Class descriptors resolved through reflection.
//!
//! Flags are read eagerly when the descriptor is created. Everything
//! structural (type parameters, supertypes, members, annotations) is computed
//! on first access and memoized in the resolver's storage.
//!
//! Supertype computation is where most soft failures surface:
//! - declared supertypes that do not resolve are dropped and reported once
//!   as an incomplete hierarchy;
//! - supertypes whose own closure leads back to this class are dropped and
//!   reported as cyclic;
//! - a class left with nothing gets `Any`.

use crate::annotations::AnnotationDecoder;
use crate::builtin_members::signature;
use crate::constants::AnnotationValue;
use crate::descriptors::{
    ConstructorDescriptor, Descriptor, LazyAnnotations, PropertyDescriptor, PropertyKind,
    TypeParameterDescriptor, ValueParameter,
};
use crate::error::ResolveError;
use crate::member_scope::{ClassScopeExtension, DeserializedMemberScope, ReflectMemberDeserializer};
use crate::metadata::{
    ClassHandle, ContainerMetadata, FieldRef, FunctionRecord, MethodRef, PropertyRecord,
    ReflectAnnotation, ReflectValue, StringTable, TypeArgRef, TypeRef, Visibility,
};
use crate::module::ClassResolution;
use crate::resolver::Components;
use crate::source::SourceElement;
use descry_common::limits::MAX_HIERARCHY_CLOSURE;
use descry_common::names::is_valid_host_fq_name;
use descry_common::{ClassId, DescriptorId, FqName, Name};
use descry_solver::{
    BuiltinClass, Declaration, LazyValue, TypeConstructorId, TypeConstructorInfo, TypeId,
    TypeParamId, TypeProjection, TypeResolver, Variance,
};
use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};

const PURELY_IMPLEMENTS: &str = "kotlin.jvm.PurelyImplements";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    AnnotationClass,
}

impl ClassKind {
    fn of(handle: &dyn ClassHandle) -> Self {
        if handle.is_annotation_type() {
            ClassKind::AnnotationClass
        } else if handle.is_interface() {
            ClassKind::Interface
        } else if handle.is_enum() {
            ClassKind::Enum
        } else {
            ClassKind::Class
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Modality {
    Final,
    Open,
    Abstract,
    Sealed,
}

impl Modality {
    fn of(handle: &dyn ClassHandle) -> Self {
        if handle.is_annotation_type() {
            Modality::Final
        } else if handle.is_sealed() {
            Modality::Sealed
        } else if handle.is_abstract() || handle.is_interface() {
            Modality::Abstract
        } else if !handle.is_final() {
            Modality::Open
        } else {
            Modality::Final
        }
    }
}

/// Type parameters as declared: the arena descriptors and the solver
/// parameters they stand for, index for index.
#[derive(Clone, Debug)]
pub struct DeclaredTypeParameters {
    pub descriptors: Arc<[DescriptorId]>,
    pub params: Arc<[TypeParamId]>,
}

pub struct LazyClassDescriptor {
    id: DescriptorId,
    module: DescriptorId,
    container: DescriptorId,
    class_id: ClassId,
    fq_name: FqName,
    source: SourceElement,
    handle: Arc<dyn ClassHandle>,
    constructor: TypeConstructorId,
    kind: ClassKind,
    modality: Modality,
    visibility: Visibility,
    is_inner: bool,

    type_parameters: LazyValue<DeclaredTypeParameters>,
    supertypes: LazyValue<Arc<[TypeId]>>,
    declared_annotations: LazyValue<Arc<[ReflectAnnotation]>>,
    annotations: LazyValue<Arc<[AnnotationValue]>>,
    constructors: LazyValue<Arc<[DescriptorId]>>,
    methods: LazyValue<Arc<[MethodRef]>>,
    member_scope: LazyValue<Arc<DeserializedMemberScope>>,
    enum_entries: LazyValue<Arc<IndexSet<Name>>>,
    enum_entry_descriptors: LazyValue<Arc<[DescriptorId]>>,
}

impl LazyClassDescriptor {
    /// Register the descriptor for `handle`. At most one descriptor per
    /// binary name and module.
    pub(crate) fn create(
        cx: &Components,
        module: DescriptorId,
        container: DescriptorId,
        class_id: ClassId,
        handle: Arc<dyn ClassHandle>,
    ) -> Result<DescriptorId, ResolveError> {
        let binary_name = handle.binary_name();
        cx.claim_class(module, &binary_name)?;

        let kind = ClassKind::of(handle.as_ref());
        let modality = Modality::of(handle.as_ref());
        let is_inner = class_id.is_nested() && !handle.is_static();
        let visibility = match handle.visibility() {
            Visibility::Private if !class_id.is_nested() => Visibility::Package,
            visibility => visibility,
        };
        let fq_name = class_id.as_single_fq_name();
        let storage = cx.storage();

        let id = cx.descriptors().register(|id| {
            let constructor = cx.types().register_constructor(
                TypeConstructorInfo::new(fq_name.clone(), Declaration::Class(id))
                    .with_final(modality == Modality::Final),
            );
            Descriptor::Class(Arc::new(LazyClassDescriptor {
                id,
                module,
                container,
                class_id: class_id.clone(),
                fq_name,
                source: SourceElement::ReflectClass { binary_name },
                handle,
                constructor,
                kind,
                modality,
                visibility,
                is_inner,
                type_parameters: storage.lazy(),
                supertypes: storage.lazy(),
                declared_annotations: storage.lazy(),
                annotations: storage.lazy(),
                constructors: storage.lazy(),
                methods: storage.lazy(),
                member_scope: storage.lazy(),
                enum_entries: storage.lazy(),
                enum_entry_descriptors: storage.lazy(),
            }))
        });
        debug!(class = %class_id, kind = ?kind, "LazyClassDescriptor::create");
        Ok(id)
    }

    pub fn id(&self) -> DescriptorId {
        self.id
    }

    pub fn name(&self) -> Name {
        self.class_id.short_class_name()
    }

    pub fn fq_name(&self) -> &FqName {
        &self.fq_name
    }

    pub fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    /// Package fragment for top-level classes, outer class for nested ones.
    pub fn container(&self) -> DescriptorId {
        self.container
    }

    pub fn module(&self) -> DescriptorId {
        self.module
    }

    pub fn source(&self) -> &SourceElement {
        &self.source
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_inner(&self) -> bool {
        self.is_inner
    }

    pub fn type_constructor(&self) -> TypeConstructorId {
        self.constructor
    }

    pub fn handle(&self) -> &Arc<dyn ClassHandle> {
        &self.handle
    }

    fn internal_name(&self) -> String {
        self.class_id.binary_name().replace('.', "/")
    }

    // -------------------------------------------------------------------------
    // Type parameters
    // -------------------------------------------------------------------------

    pub fn type_parameters(&self, cx: &Components) -> Result<DeclaredTypeParameters, ResolveError> {
        self.type_parameters
            .try_get_or_compute(|| self.compute_type_parameters(cx))
    }

    fn compute_type_parameters(&self, cx: &Components) -> Result<DeclaredTypeParameters, ResolveError> {
        let declared = self.handle.type_parameters();
        let mut seen = FxHashSet::default();
        for param in &declared {
            if param.name.is_empty() || !seen.insert(param.name.as_str()) {
                return Err(ResolveError::UnresolvedTypeParameter {
                    parameter: param.name.clone(),
                    class: self.fq_name.as_string(),
                });
            }
        }

        let types = cx.types();
        let fresh: SmallVec<[TypeParamId; 2]> = declared
            .iter()
            .enumerate()
            .map(|(index, param)| {
                types.register_type_param(
                    Name::identifier(&param.name),
                    index as u32,
                    Variance::Invariant,
                    self.constructor,
                )
            })
            .collect();
        let fresh: Arc<[TypeParamId]> = Arc::from(fresh.as_slice());
        // A failed earlier attempt may already have published its parameters.
        let params = if types.publish_parameters(self.constructor, Arc::clone(&fresh)) {
            fresh
        } else {
            types.parameters_of(self.constructor)
        };

        // Bounds may mention any parameter of the list, so they are set only
        // after all parameters are published.
        let translator = TypeTranslator::strict(cx, self);
        for (param, &id) in declared.iter().zip(params.iter()) {
            let bound = match param.bounds.first() {
                Some(bound) => types.with_nullability(translator.translate(bound)?, true),
                None => TypeId::NULLABLE_ANY,
            };
            types.set_upper_bound(id, bound);
        }

        let descriptors: Vec<DescriptorId> = params
            .iter()
            .map(|&param| {
                let info = types.type_param(param);
                cx.descriptors().register(|id| {
                    Descriptor::TypeParameter(Arc::new(TypeParameterDescriptor {
                        id,
                        name: info.name,
                        index: info.index,
                        container: self.id,
                        param,
                    }))
                })
            })
            .collect();
        Ok(DeclaredTypeParameters {
            descriptors: Arc::from(descriptors),
            params,
        })
    }

    /// Published parameters, computing the declaration if needed.
    pub fn parameters(&self, cx: &Components) -> Result<Arc<[TypeParamId]>, ResolveError> {
        if let Some(params) = cx.types().constructor(self.constructor).parameters() {
            return Ok(params);
        }
        Ok(self.type_parameters(cx)?.params)
    }

    /// The class applied to its own parameters.
    pub fn default_type(&self, cx: &Components) -> Result<TypeId, ResolveError> {
        self.parameters(cx)?;
        Ok(cx.types().default_type(self.constructor))
    }

    pub fn star_projected_type(&self, cx: &Components) -> Result<TypeId, ResolveError> {
        let params = self.parameters(cx)?;
        Ok(cx.star_projected(self.constructor, &params))
    }

    // -------------------------------------------------------------------------
    // Supertypes
    // -------------------------------------------------------------------------

    pub fn supertypes(&self, cx: &Components) -> Result<Arc<[TypeId]>, ResolveError> {
        self.supertypes.try_get_or_compute(|| self.compute_supertypes(cx))
    }

    fn compute_supertypes(&self, cx: &Components) -> Result<Arc<[TypeId]>, ResolveError> {
        let types = cx.types();
        self.type_parameters(cx)?;
        let purely_implemented = self.purely_implemented_supertype(cx)?;
        let pure_ctor = purely_implemented.and_then(|ty| types.constructor_of(ty));
        let any = BuiltinClass::Any.constructor();

        let translator = TypeTranslator::strict(cx, self);
        let mut result: SmallVec<[TypeId; 4]> = SmallVec::new();
        let mut seen: FxHashSet<TypeConstructorId> = FxHashSet::default();
        let mut unresolved: Vec<String> = Vec::new();
        let mut cyclic: Vec<String> = Vec::new();

        for declared in self.handle.supertypes() {
            let ty = translator.translate(&declared)?;
            let Some(ctor) = types.constructor_of(ty) else {
                unresolved.push(declared.presentable_text());
                continue;
            };
            if types.constructor(ctor).is_not_found() {
                unresolved.push(declared.presentable_text());
                continue;
            }
            if ctor == any || Some(ctor) == pure_ctor || !seen.insert(ctor) {
                continue;
            }
            if ctor == self.constructor || hierarchy_closure(cx, [ctor]).contains(&self.constructor) {
                cyclic.push(types.render(ty));
                continue;
            }
            result.push(ty);
        }
        if let Some(purely_implemented) = purely_implemented {
            result.push(purely_implemented);
        }

        if !cyclic.is_empty() {
            cx.reporter().report_cyclic_hierarchy(self.id, &self.fq_name, &cyclic);
        }
        if !unresolved.is_empty() {
            debug!(class = %self.fq_name, unresolved = ?unresolved, "LazyClassDescriptor: incomplete hierarchy");
            cx.reporter()
                .report_incomplete_hierarchy(self.id, &self.fq_name, &unresolved);
        }
        if result.is_empty() {
            result.push(TypeId::ANY);
        }
        trace!(class = %self.fq_name, count = result.len(), "LazyClassDescriptor: supertypes computed");
        Ok(Arc::from(result.as_slice()))
    }

    /// Built-in interface this class implements without going through its
    /// declared supertypes, applied to the class's own parameters.
    fn purely_implemented_supertype(&self, cx: &Components) -> Result<Option<TypeId>, ResolveError> {
        let annotated = self
            .declared_annotations(cx)?
            .iter()
            .find(|annotation| annotation.class_name == PURELY_IMPLEMENTS)
            .and_then(|annotation| match annotation.arguments.as_slice() {
                [(_, ReflectValue::String(name))] if is_valid_host_fq_name(name) => {
                    Some(name.clone())
                }
                _ => None,
            });
        let builtin = match annotated {
            Some(name) => BuiltinClass::from_fq_name(&name),
            None => cx.pure_implementation_for(&self.class_id.binary_name()),
        };
        let Some(builtin) = builtin else {
            return Ok(None);
        };

        let types = cx.types();
        let own = self.parameters(cx)?;
        if builtin.arity() != own.len() {
            debug!(
                class = %self.fq_name,
                builtin = builtin.fq_name(),
                "LazyClassDescriptor: purely implemented arity mismatch"
            );
            return Ok(None);
        }
        let arguments: SmallVec<[TypeProjection; 2]> = own
            .iter()
            .map(|&param| TypeProjection::invariant(types.parameter_type(param, false)))
            .collect();
        Ok(Some(types.class_type(
            builtin.constructor(),
            Arc::from(arguments.as_slice()),
            false,
        )))
    }

    /// Every constructor reachable through supertypes, this class excluded.
    pub fn supertype_closure(&self, cx: &Components) -> Result<Vec<TypeConstructorId>, ResolveError> {
        let types = cx.types();
        let roots: SmallVec<[TypeConstructorId; 4]> = self
            .supertypes(cx)?
            .iter()
            .filter_map(|&ty| types.constructor_of(ty))
            .collect();
        Ok(hierarchy_closure(cx, roots).into_iter().collect())
    }

    pub fn inherits_builtin(&self, cx: &Components, builtin: BuiltinClass) -> Result<bool, ResolveError> {
        Ok(self.supertype_closure(cx)?.contains(&builtin.constructor()))
    }

    /// Inherited built-ins that have members renamed on the host.
    pub fn remapped_builtins(&self, cx: &Components) -> Result<Vec<BuiltinClass>, ResolveError> {
        let tables = cx.tables();
        Ok(self
            .supertype_closure(cx)?
            .into_iter()
            .filter_map(BuiltinClass::from_constructor)
            .filter(|builtin| tables.has_remapped_members(builtin.fq_name()))
            .collect())
    }

    /// Logical names a host member called `host_name` may stand for on this
    /// class. Empty unless a built-in with remapped members is inherited.
    pub fn logical_member_names(&self, cx: &Components, host_name: &str) -> Result<Vec<Name>, ResolveError> {
        let tables = cx.tables();
        let mut names: IndexSet<Name> = IndexSet::new();
        for builtin in self.remapped_builtins(cx)? {
            for renamed in tables.renamed_methods_of(builtin.fq_name()) {
                if renamed.host_name == host_name {
                    names.insert(Name::identifier(&renamed.name));
                }
            }
            for property in tables.special_properties_of(builtin.fq_name()) {
                if property.getter == host_name {
                    names.insert(Name::identifier(&property.name));
                }
            }
        }
        Ok(names.into_iter().collect())
    }

    /// Internal names of the host classes behind inherited built-ins
    /// (`java/util/Collection`).
    pub(crate) fn host_owners(&self, cx: &Components) -> Result<Vec<String>, ResolveError> {
        Ok(self
            .supertype_closure(cx)?
            .into_iter()
            .filter_map(BuiltinClass::from_constructor)
            .filter_map(|builtin| cx.host_class_for_builtin(builtin))
            .map(|host| host.replace('.', "/"))
            .collect())
    }

    // -------------------------------------------------------------------------
    // Annotations, constructors, members
    // -------------------------------------------------------------------------

    fn declared_annotations(&self, _cx: &Components) -> Result<Arc<[ReflectAnnotation]>, ResolveError> {
        Ok(self
            .declared_annotations
            .get_or_compute(|| Arc::from(self.handle.annotations()))?)
    }

    pub fn annotations(&self, cx: &Components) -> Result<Arc<[AnnotationValue]>, ResolveError> {
        self.annotations.try_get_or_compute(|| {
            let decoder = AnnotationDecoder::new(cx, self.module);
            let converted = self
                .declared_annotations(cx)?
                .iter()
                .map(|annotation| decoder.convert_reflect_annotation(annotation))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Arc::from(converted))
        })
    }

    pub(crate) fn host_methods(&self, _cx: &Components) -> Result<Arc<[MethodRef]>, ResolveError> {
        Ok(self.methods.get_or_compute(|| Arc::from(self.handle.methods()))?)
    }

    /// Constructors. Annotation classes declare none on the host; they get
    /// one parameter per annotation element.
    pub fn constructors(&self, cx: &Components) -> Result<Arc<[DescriptorId]>, ResolveError> {
        self.constructors.try_get_or_compute(|| {
            let translator = TypeTranslator::lenient(cx, self);
            let declared = self.handle.constructors();
            let mut signatures: Vec<Vec<ValueParameter>> = Vec::with_capacity(declared.len().max(1));
            if declared.is_empty() && self.kind == ClassKind::AnnotationClass {
                let elements = self
                    .host_methods(cx)?
                    .iter()
                    .filter(|method| !method.is_static && method.parameters.is_empty())
                    .map(|method| -> Result<ValueParameter, ResolveError> {
                        let ty = match &method.return_type {
                            Some(ty) => translator.translate(ty)?,
                            None => TypeId::UNIT,
                        };
                        Ok(ValueParameter {
                            name: Name::identifier(&method.name),
                            ty,
                        })
                    })
                    .collect::<Result<Vec<_>, ResolveError>>()?;
                signatures.push(elements);
            }
            for constructor in &declared {
                let parameters = constructor
                    .parameters
                    .iter()
                    .map(|param| -> Result<ValueParameter, ResolveError> {
                        Ok(ValueParameter {
                            name: Name::identifier(&param.name),
                            ty: translator.translate(&param.ty)?,
                        })
                    })
                    .collect::<Result<Vec<_>, ResolveError>>()?;
                signatures.push(parameters);
            }

            let ids: Vec<DescriptorId> = signatures
                .into_iter()
                .map(|value_parameters| {
                    cx.descriptors().register(|id| {
                        Descriptor::Constructor(Arc::new(ConstructorDescriptor {
                            id,
                            container: self.id,
                            value_parameters,
                            source: self.source.clone(),
                        }))
                    })
                })
                .collect();
            Ok(Arc::from(ids))
        })
    }

    /// Members declared by the host class, plus the scope's synthetic ones.
    pub fn member_scope(&self, cx: &Components) -> Result<Arc<DeserializedMemberScope>, ResolveError> {
        self.member_scope.try_get_or_compute(|| {
            let entries = self.enum_entries(cx)?;
            let methods = self.host_methods(cx)?;
            // The scope synthesizes these for enums.
            let methods: Arc<[MethodRef]> = if self.kind == ClassKind::Enum {
                methods
                    .iter()
                    .filter(|method| !(method.is_static && matches!(method.name.as_str(), "values" | "valueOf")))
                    .cloned()
                    .collect()
            } else {
                methods
            };
            // Enum constants surface as entries, not as fields.
            let fields: Vec<FieldRef> = self
                .handle
                .fields()
                .into_iter()
                .filter(|field| !(field.is_static && entries.contains(&Name::identifier(&field.name))))
                .collect();
            let fields: Arc<[FieldRef]> = Arc::from(fields);

            let table = Arc::new(StringTable::new());
            let owner = self.internal_name();
            let mut metadata = ContainerMetadata::new(table.clone());
            metadata.functions = methods
                .iter()
                .map(|method| FunctionRecord {
                    name: table.intern(&method.name),
                    host_signature: Some(table.intern(&signature(&owner, &method.name, &method.descriptor))),
                    ..Default::default()
                })
                .collect();
            metadata.properties = fields
                .iter()
                .map(|field| PropertyRecord {
                    name: table.intern(&field.name),
                    ..Default::default()
                })
                .collect();
            let inner = self.handle.inner_class_names();
            metadata.class_names = Arc::new(move || inner.iter().map(|name| Name::identifier(name)).collect());

            Ok(Arc::new(DeserializedMemberScope::new(
                cx,
                self.id,
                self.module,
                self.source.clone(),
                metadata,
                Box::new(ClassScopeExtension::new(self.id, self.class_id.clone())),
                Box::new(ReflectMemberDeserializer::new(self.id, owner, methods, fields)),
            )))
        })
    }

    /// Enum entry names in declaration order; empty for other kinds.
    pub fn enum_entries(&self, _cx: &Components) -> Result<Arc<IndexSet<Name>>, ResolveError> {
        Ok(self.enum_entries.get_or_compute(|| {
            if self.kind != ClassKind::Enum {
                return Arc::new(IndexSet::new());
            }
            Arc::new(
                self.handle
                    .enum_entries()
                    .iter()
                    .map(|entry| Name::identifier(entry))
                    .collect(),
            )
        })?)
    }

    pub fn has_enum_entry(&self, cx: &Components, entry: Name) -> Result<bool, ResolveError> {
        Ok(self.enum_entries(cx)?.contains(&entry))
    }

    pub fn enum_entry_descriptors(&self, cx: &Components) -> Result<Arc<[DescriptorId]>, ResolveError> {
        self.enum_entry_descriptors.try_get_or_compute(|| {
            let entries = self.enum_entries(cx)?;
            if entries.is_empty() {
                return Ok(Arc::from([]));
            }
            let ty = self.default_type(cx)?;
            let ids: Vec<DescriptorId> = entries
                .iter()
                .map(|&name| {
                    cx.descriptors().register(|id| {
                        Descriptor::Property(Arc::new(PropertyDescriptor {
                            id,
                            name,
                            getter: None,
                            container: self.id,
                            module: self.module,
                            extension_receiver: None,
                            ty,
                            kind: PropertyKind::EnumEntry,
                            is_static: true,
                            source: self.source.clone(),
                            annotations: LazyAnnotations::empty(cx),
                            constant: None,
                            constant_value: cx.storage().lazy(),
                        }))
                    })
                })
                .collect();
            Ok(Arc::from(ids))
        })
    }

    /// How many times supertypes were computed; used to observe memoization.
    pub fn supertype_computations(&self) -> u32 {
        self.supertypes.computations()
    }

    pub fn member_scope_computations(&self) -> u32 {
        self.member_scope.computations()
    }
}

impl std::fmt::Debug for LazyClassDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyClassDescriptor")
            .field("id", &self.id)
            .field("class_id", &self.class_id)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Breadth-first walk over supertypes starting at `roots`. Constructors
/// without supertype information end their branch.
fn hierarchy_closure(
    cx: &Components,
    roots: impl IntoIterator<Item = TypeConstructorId>,
) -> IndexSet<TypeConstructorId> {
    let types = cx.types();
    let mut visited: IndexSet<TypeConstructorId> = IndexSet::new();
    let mut queue: VecDeque<TypeConstructorId> = roots.into_iter().collect();
    while let Some(ctor) = queue.pop_front() {
        if !visited.insert(ctor) {
            continue;
        }
        if visited.len() >= MAX_HIERARCHY_CLOSURE {
            debug!(limit = MAX_HIERARCHY_CLOSURE, "hierarchy_closure: limit reached");
            break;
        }
        let Some(supertypes) = TypeResolver::supertypes(cx, ctor) else {
            continue;
        };
        queue.extend(supertypes.iter().filter_map(|&ty| types.constructor_of(ty)));
    }
    visited
}

// =============================================================================
// Type translation
// =============================================================================

/// Turns reflective type references into interned types, resolving class
/// names from the class's module and parameter names from the class and its
/// enclosing classes.
pub(crate) struct TypeTranslator<'a> {
    cx: &'a Components,
    class: &'a LazyClassDescriptor,
    /// Unknown parameter names are errors rather than error types.
    strict: bool,
}

impl<'a> TypeTranslator<'a> {
    pub(crate) fn strict(cx: &'a Components, class: &'a LazyClassDescriptor) -> Self {
        TypeTranslator {
            cx,
            class,
            strict: true,
        }
    }

    pub(crate) fn lenient(cx: &'a Components, class: &'a LazyClassDescriptor) -> Self {
        TypeTranslator {
            cx,
            class,
            strict: false,
        }
    }

    pub(crate) fn translate(&self, ty: &TypeRef) -> Result<TypeId, ResolveError> {
        let types = self.cx.types();
        Ok(match ty {
            TypeRef::Class { name, arguments } => self.translate_class(name, arguments)?,
            TypeRef::Parameter(name) => match self.lookup_parameter(name)? {
                Some(param) => types.parameter_type(param, false),
                None if self.strict => {
                    return Err(ResolveError::UnresolvedTypeParameter {
                        parameter: name.clone(),
                        class: self.class.fq_name.as_string(),
                    });
                }
                None => {
                    debug!(parameter = %name, class = %self.class.fq_name, "TypeTranslator: unknown parameter");
                    TypeId::ERROR
                }
            },
            TypeRef::Array(element) => types.array_of(self.translate(element)?),
            TypeRef::Primitive(primitive) => primitive.type_id(),
        })
    }

    fn translate_class(&self, name: &str, arguments: &[TypeArgRef]) -> Result<TypeId, ResolveError> {
        let cx = self.cx;
        let (ctor, params) = match cx.builtin_for_host_class(name) {
            Some(builtin) => (
                builtin.constructor(),
                cx.types().parameters_of(builtin.constructor()),
            ),
            None => {
                let class_id = ClassId::from_binary_name(name);
                let module = cx.module(self.class.module)?;
                match module.find_class_across_dependencies(cx, &class_id, arguments.len())? {
                    ClassResolution::Found(class) => (class.constructor, class.parameters(cx)?),
                    ClassResolution::NotFound(ctor) => (ctor, cx.types().parameters_of(ctor)),
                }
            }
        };
        // Raw use of a generic class.
        if arguments.is_empty() {
            return Ok(cx.star_projected(ctor, &params));
        }
        let projections = arguments
            .iter()
            .map(|argument| self.translate_argument(argument))
            .collect::<Result<SmallVec<[TypeProjection; 2]>, ResolveError>>()?;
        Ok(cx
            .types()
            .class_type(ctor, Arc::from(projections.as_slice()), false))
    }

    fn translate_argument(&self, argument: &TypeArgRef) -> Result<TypeProjection, ResolveError> {
        Ok(match argument {
            TypeArgRef::Type(ty) => TypeProjection::invariant(self.translate(ty)?),
            TypeArgRef::Extends(ty) => TypeProjection::covariant(self.translate(ty)?),
            TypeArgRef::Super(ty) => TypeProjection::contravariant(self.translate(ty)?),
            TypeArgRef::Wildcard => TypeProjection::Star,
        })
    }

    /// Own parameters first, then those of the enclosing classes.
    fn lookup_parameter(&self, name: &str) -> Result<Option<TypeParamId>, ResolveError> {
        if let Some(param) = self.find_in(self.class, name)? {
            return Ok(Some(param));
        }
        let mut container = self.class.container;
        while let Some(outer) = self.cx.class(container) {
            if let Some(param) = self.find_in(&outer, name)? {
                return Ok(Some(param));
            }
            container = outer.container;
        }
        Ok(None)
    }

    fn find_in(&self, class: &LazyClassDescriptor, name: &str) -> Result<Option<TypeParamId>, ResolveError> {
        let types = self.cx.types();
        Ok(class
            .parameters(self.cx)?
            .iter()
            .copied()
            .find(|&param| &*types.type_param(param).name.as_str() == name))
    }
}

#[cfg(test)]
#[path = "../tests/class_tests.rs"]
mod tests;
