//! Member scopes over serialized records.
//!
//! A scope groups its raw function and property records by
//! `(name, is_extension)` at construction and turns a group into
//! descriptors the first time that name is asked for. A name with both an
//! extension and a non-extension record yields two descriptors, never one.
//!
//! What a scope adds on top of its records (enum `values()`, renamed
//! built-in members, enum entries) comes from its [`ScopeExtension`]; how a
//! record becomes a descriptor is up to its [`MemberDeserializer`].

use crate::builtin_members::signature;
use crate::class::{ClassKind, TypeTranslator};
use crate::descriptors::{
    Descriptor, FunctionDescriptor, LazyAnnotations, MemberOrigin, PropertyDescriptor,
    PropertyKind, ValueParameter,
};
use crate::error::ResolveError;
use crate::metadata::{
    ClassNamesSupplier, ContainerMetadata, FieldRef, FunctionRecord, MethodRef, NameResolver,
    PropertyRecord, TypeRecord,
};
use crate::resolver::Components;
use crate::source::SourceElement;
use bitflags::bitflags;
use descry_common::limits::MEMBER_GROUP_CAPACITY;
use descry_common::{ClassId, DescriptorId, FqName, Name};
use descry_solver::{LazyValue, MemoizedFunction, TypeId};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

bitflags! {
    /// Kinds of descriptors a scope query asks for.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DescriptorKindFilter: u8 {
        const CLASSIFIERS = 1 << 0;
        /// Enum entries.
        const SINGLETON_CLASSIFIERS = 1 << 1;
        const FUNCTIONS = 1 << 2;
        const VARIABLES = 1 << 3;
        const ALL = Self::CLASSIFIERS.bits()
            | Self::SINGLETON_CLASSIFIERS.bits()
            | Self::FUNCTIONS.bits()
            | Self::VARIABLES.bits();
    }
}

impl DescriptorKindFilter {
    /// The kind bit `descriptor` falls under; empty for non-members.
    pub fn of(descriptor: &Descriptor) -> Self {
        match descriptor {
            Descriptor::Class(_) => DescriptorKindFilter::CLASSIFIERS,
            Descriptor::Property(property) if property.kind == PropertyKind::EnumEntry => {
                DescriptorKindFilter::SINGLETON_CLASSIFIERS
            }
            Descriptor::Property(_) => DescriptorKindFilter::VARIABLES,
            Descriptor::Function(_) => DescriptorKindFilter::FUNCTIONS,
            _ => DescriptorKindFilter::empty(),
        }
    }
}

/// Grouping key for records.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct ProtoKey {
    name: Name,
    is_extension: bool,
}

type Groups = IndexMap<ProtoKey, SmallVec<[usize; 2]>>;

fn group<T>(
    records: &[T],
    names: &dyn NameResolver,
    key: impl Fn(&T) -> (u32, bool),
) -> Groups {
    let mut groups: Groups = IndexMap::with_capacity(records.len().min(MEMBER_GROUP_CAPACITY));
    for (index, record) in records.iter().enumerate() {
        let (name, is_extension) = key(record);
        groups
            .entry(ProtoKey {
                name: names.name(name),
                is_extension,
            })
            .or_default()
            .push(index);
    }
    groups
}

fn is_extension_member(cx: &Components, id: DescriptorId) -> bool {
    match cx.descriptors().get(id) {
        Some(Descriptor::Function(function)) => function.is_extension(),
        Some(Descriptor::Property(property)) => property.is_extension(),
        _ => false,
    }
}

// =============================================================================
// Collaborators
// =============================================================================

/// What a deserializer needs to know about the scope it loads into.
pub struct MemberContext<'a> {
    pub owner: DescriptorId,
    pub module: DescriptorId,
    pub names: &'a Arc<dyn NameResolver>,
    pub source: &'a SourceElement,
}

/// Turns one record into a descriptor.
pub trait MemberDeserializer: Send + Sync {
    fn load_function(
        &self,
        cx: &Components,
        ctx: &MemberContext<'_>,
        index: usize,
        record: &FunctionRecord,
    ) -> Result<DescriptorId, ResolveError>;

    fn load_property(
        &self,
        cx: &Components,
        ctx: &MemberContext<'_>,
        index: usize,
        record: &PropertyRecord,
    ) -> Result<DescriptorId, ResolveError>;
}

/// Members a scope knows about without a record for them.
pub trait ScopeExtension: Send + Sync {
    fn compute_non_declared_functions(
        &self,
        _cx: &Components,
        _scope: &DeserializedMemberScope,
        _name: Name,
        _result: &mut Vec<DescriptorId>,
    ) -> Result<(), ResolveError> {
        Ok(())
    }

    fn compute_non_declared_properties(
        &self,
        _cx: &Components,
        _scope: &DeserializedMemberScope,
        _name: Name,
        _result: &mut Vec<DescriptorId>,
    ) -> Result<(), ResolveError> {
        Ok(())
    }

    /// Everything the two methods above could produce for the requested
    /// kinds and names, for enumeration.
    fn add_non_declared_descriptors(
        &self,
        _cx: &Components,
        _scope: &DeserializedMemberScope,
        _filter: DescriptorKindFilter,
        _name_filter: &dyn Fn(Name) -> bool,
        _result: &mut IndexSet<DescriptorId>,
    ) -> Result<(), ResolveError> {
        Ok(())
    }

    fn add_enum_entry_descriptors(
        &self,
        _cx: &Components,
        _name_filter: &dyn Fn(Name) -> bool,
        _result: &mut IndexSet<DescriptorId>,
    ) -> Result<(), ResolveError> {
        Ok(())
    }

    fn create_class_id(&self, name: Name) -> ClassId;

    /// Classifiers beyond the scope's own class-name set.
    fn has_class(&self, _cx: &Components, _name: Name) -> bool {
        false
    }
}

// =============================================================================
// Scope
// =============================================================================

pub struct DeserializedMemberScope {
    owner: DescriptorId,
    module: DescriptorId,
    source: SourceElement,
    names: Arc<dyn NameResolver>,
    functions: Vec<FunctionRecord>,
    properties: Vec<PropertyRecord>,
    function_groups: Groups,
    property_groups: Groups,
    class_names_supplier: ClassNamesSupplier,
    class_names: LazyValue<Arc<IndexSet<Name>>>,
    functions_by_name: MemoizedFunction<Name, Arc<[DescriptorId]>>,
    properties_by_name: MemoizedFunction<Name, Arc<[DescriptorId]>>,
    classifiers: MemoizedFunction<Name, Option<DescriptorId>>,
    all_descriptors: LazyValue<Arc<[DescriptorId]>>,
    extension: Box<dyn ScopeExtension>,
    deserializer: Box<dyn MemberDeserializer>,
}

impl DeserializedMemberScope {
    pub fn new(
        cx: &Components,
        owner: DescriptorId,
        module: DescriptorId,
        source: SourceElement,
        metadata: ContainerMetadata,
        extension: Box<dyn ScopeExtension>,
        deserializer: Box<dyn MemberDeserializer>,
    ) -> Self {
        let names = metadata.name_resolver;
        let function_groups = group(&metadata.functions, names.as_ref(), |record| {
            (record.name, record.receiver_type.is_some())
        });
        let property_groups = group(&metadata.properties, names.as_ref(), |record| {
            (record.name, record.receiver_type.is_some())
        });
        let storage = cx.storage();
        DeserializedMemberScope {
            owner,
            module,
            source,
            names,
            functions: metadata.functions,
            properties: metadata.properties,
            function_groups,
            property_groups,
            class_names_supplier: metadata.class_names,
            class_names: storage.lazy(),
            functions_by_name: storage.memoized(),
            properties_by_name: storage.memoized(),
            classifiers: storage.memoized(),
            all_descriptors: storage.lazy(),
            extension,
            deserializer,
        }
    }

    pub fn owner(&self) -> DescriptorId {
        self.owner
    }

    fn context(&self) -> MemberContext<'_> {
        MemberContext {
            owner: self.owner,
            module: self.module,
            names: &self.names,
            source: &self.source,
        }
    }

    /// Declared function names, in serialization order.
    pub fn function_names(&self) -> IndexSet<Name> {
        self.function_groups.keys().map(|key| key.name).collect()
    }

    pub fn property_names(&self) -> IndexSet<Name> {
        self.property_groups.keys().map(|key| key.name).collect()
    }

    /// Non-extension functions first, then extensions, then whatever the
    /// extension contributes.
    pub fn functions_named(&self, cx: &Components, name: Name) -> Result<Arc<[DescriptorId]>, ResolveError> {
        self.functions_by_name.try_get_or_compute(&name, |&name| {
            let ctx = self.context();
            let mut result = Vec::new();
            for is_extension in [false, true] {
                let Some(indices) = self.function_groups.get(&ProtoKey { name, is_extension }) else {
                    continue;
                };
                for &index in indices {
                    result.push(self.deserializer.load_function(cx, &ctx, index, &self.functions[index])?);
                }
            }
            self.extension
                .compute_non_declared_functions(cx, self, name, &mut result)?;
            trace!(name = %name, count = result.len(), "DeserializedMemberScope::functions_named");
            Ok(Arc::from(result))
        })
    }

    pub fn properties_named(&self, cx: &Components, name: Name) -> Result<Arc<[DescriptorId]>, ResolveError> {
        self.properties_by_name.try_get_or_compute(&name, |&name| {
            let ctx = self.context();
            let mut result = Vec::new();
            for is_extension in [false, true] {
                let Some(indices) = self.property_groups.get(&ProtoKey { name, is_extension }) else {
                    continue;
                };
                for &index in indices {
                    result.push(self.deserializer.load_property(cx, &ctx, index, &self.properties[index])?);
                }
            }
            self.extension
                .compute_non_declared_properties(cx, self, name, &mut result)?;
            trace!(name = %name, count = result.len(), "DeserializedMemberScope::properties_named");
            Ok(Arc::from(result))
        })
    }

    /// Nested class names; the supplier runs once.
    pub fn class_names(&self) -> Result<Arc<IndexSet<Name>>, ResolveError> {
        Ok(self
            .class_names
            .get_or_compute(|| Arc::new((self.class_names_supplier)().into_iter().collect()))?)
    }

    pub fn classifier_named(&self, cx: &Components, name: Name) -> Result<Option<DescriptorId>, ResolveError> {
        self.classifiers.try_get_or_compute(&name, |&name| {
            if !self.class_names()?.contains(&name) && !self.extension.has_class(cx, name) {
                return Ok(None);
            }
            let class_id = self.extension.create_class_id(name);
            let module = cx.module(self.module)?;
            Ok(module.find_class(cx, &class_id)?.map(|class| class.id()))
        })
    }

    /// Everything in the scope: enum entries, properties, functions,
    /// synthetic members, then classifiers. Non-extension members come
    /// before extensions; within each, serialization order.
    pub fn all_descriptors(&self, cx: &Components) -> Result<Arc<[DescriptorId]>, ResolveError> {
        self.all_descriptors.try_get_or_compute(|| {
            let result = self.compute_descriptors(cx, DescriptorKindFilter::ALL, &|_| true)?;
            Ok(result.into_iter().collect())
        })
    }

    /// Descriptors of the kinds in `filter` whose names pass `name_filter`.
    /// Only the requested kinds and names are loaded.
    pub fn contributed_descriptors(
        &self,
        cx: &Components,
        filter: DescriptorKindFilter,
        name_filter: &dyn Fn(Name) -> bool,
    ) -> Result<Vec<DescriptorId>, ResolveError> {
        let candidates: Vec<DescriptorId> = match self.all_descriptors.peek() {
            Some(all) => all.to_vec(),
            None => self.compute_descriptors(cx, filter, name_filter)?.into_iter().collect(),
        };
        Ok(candidates
            .into_iter()
            .filter(|&id| {
                cx.descriptors().get(id).is_some_and(|descriptor| {
                    filter.intersects(DescriptorKindFilter::of(&descriptor)) && name_filter(descriptor.name())
                })
            })
            .collect())
    }

    fn compute_descriptors(
        &self,
        cx: &Components,
        filter: DescriptorKindFilter,
        name_filter: &dyn Fn(Name) -> bool,
    ) -> Result<IndexSet<DescriptorId>, ResolveError> {
        let mut result: IndexSet<DescriptorId> = IndexSet::new();
        if filter.intersects(DescriptorKindFilter::SINGLETON_CLASSIFIERS) {
            self.extension.add_enum_entry_descriptors(cx, name_filter, &mut result)?;
        }
        if filter.intersects(DescriptorKindFilter::VARIABLES) {
            let load = |name| self.properties_named(cx, name);
            self.add_members(cx, &self.property_groups, name_filter, load, &mut result)?;
        }
        if filter.intersects(DescriptorKindFilter::FUNCTIONS) {
            let load = |name| self.functions_named(cx, name);
            self.add_members(cx, &self.function_groups, name_filter, load, &mut result)?;
        }
        self.extension
            .add_non_declared_descriptors(cx, self, filter, name_filter, &mut result)?;
        if filter.intersects(DescriptorKindFilter::CLASSIFIERS) {
            for &name in self.class_names()?.iter() {
                if !name_filter(name) {
                    continue;
                }
                if let Some(class) = self.classifier_named(cx, name)? {
                    result.insert(class);
                }
            }
        }
        Ok(result)
    }

    /// Non-extension groups first, then extension groups.
    fn add_members(
        &self,
        cx: &Components,
        groups: &Groups,
        name_filter: &dyn Fn(Name) -> bool,
        load: impl Fn(Name) -> Result<Arc<[DescriptorId]>, ResolveError>,
        result: &mut IndexSet<DescriptorId>,
    ) -> Result<(), ResolveError> {
        for is_extension in [false, true] {
            for key in groups.keys() {
                if key.is_extension != is_extension || !name_filter(key.name) {
                    continue;
                }
                result.extend(
                    load(key.name)?
                        .iter()
                        .copied()
                        .filter(|&id| is_extension_member(cx, id) == is_extension),
                );
            }
        }
        Ok(())
    }

    /// Name lookups started so far, functions and properties together.
    pub fn computations(&self) -> u32 {
        self.functions_by_name.computations() + self.properties_by_name.computations()
    }
}

// =============================================================================
// Package scopes
// =============================================================================

pub struct PackageScopeExtension {
    package: FqName,
}

impl PackageScopeExtension {
    pub fn new(package: FqName) -> Self {
        PackageScopeExtension { package }
    }
}

impl ScopeExtension for PackageScopeExtension {
    fn create_class_id(&self, name: Name) -> ClassId {
        ClassId::new(self.package.clone(), FqName::from_segments(&[name]))
    }
}

/// Descriptors straight from serialized records. Types are resolved from
/// the scope's module; host names go through the remap tables.
pub struct RecordMemberDeserializer;

impl RecordMemberDeserializer {
    fn record_type(cx: &Components, ctx: &MemberContext<'_>, record: TypeRecord) -> Result<TypeId, ResolveError> {
        let class_id = ctx.names.class_id(record.class_id);
        let ty = cx.class_type(ctx.module, &class_id)?;
        Ok(cx.types().with_nullability(ty, record.nullable))
    }

    fn optional_type(
        cx: &Components,
        ctx: &MemberContext<'_>,
        record: Option<TypeRecord>,
    ) -> Result<Option<TypeId>, ResolveError> {
        record
            .map(|record| Self::record_type(cx, ctx, record))
            .transpose()
    }
}

impl MemberDeserializer for RecordMemberDeserializer {
    fn load_function(
        &self,
        cx: &Components,
        ctx: &MemberContext<'_>,
        _index: usize,
        record: &FunctionRecord,
    ) -> Result<DescriptorId, ResolveError> {
        let name = ctx.names.name(record.name);
        let host_signature = record.host_signature.map(|slot| ctx.names.string(slot));
        let host_name = host_signature
            .as_deref()
            .and_then(|signature| cx.tables().host_name(signature))
            .map(|host| Name::identifier(&host))
            .unwrap_or(name);
        let default_value = host_signature
            .as_deref()
            .and_then(|signature| cx.tables().default_value(signature));

        let extension_receiver = Self::optional_type(cx, ctx, record.receiver_type)?;
        let value_parameters = record
            .value_parameters
            .iter()
            .map(|param| -> Result<ValueParameter, ResolveError> {
                Ok(ValueParameter {
                    name: ctx.names.name(param.name),
                    ty: Self::record_type(cx, ctx, param.ty)?,
                })
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;
        let return_type = Self::optional_type(cx, ctx, record.return_type)?.unwrap_or(TypeId::UNIT);
        let annotations = LazyAnnotations::serialized(cx, ctx.module, Arc::clone(ctx.names), record.annotations.clone());

        Ok(cx.descriptors().register(|id| {
            Descriptor::Function(Arc::new(FunctionDescriptor {
                id,
                name,
                host_name,
                container: ctx.owner,
                module: ctx.module,
                extension_receiver,
                value_parameters,
                return_type,
                origin: MemberOrigin::Declared,
                is_static: false,
                source: ctx.source.clone(),
                default_value,
                annotations,
            }))
        }))
    }

    fn load_property(
        &self,
        cx: &Components,
        ctx: &MemberContext<'_>,
        _index: usize,
        record: &PropertyRecord,
    ) -> Result<DescriptorId, ResolveError> {
        let name = ctx.names.name(record.name);
        let extension_receiver = Self::optional_type(cx, ctx, record.receiver_type)?;
        let ty = Self::optional_type(cx, ctx, record.return_type)?.unwrap_or(TypeId::ERROR);
        let annotations = LazyAnnotations::serialized(cx, ctx.module, Arc::clone(ctx.names), record.annotations.clone());
        let constant = record
            .constant
            .clone()
            .map(|value| (value, Arc::clone(ctx.names)));

        Ok(cx.descriptors().register(|id| {
            Descriptor::Property(Arc::new(PropertyDescriptor {
                id,
                name,
                getter: None,
                container: ctx.owner,
                module: ctx.module,
                extension_receiver,
                ty,
                kind: PropertyKind::Declared,
                is_static: false,
                source: ctx.source.clone(),
                annotations,
                constant,
                constant_value: cx.storage().lazy(),
            }))
        }))
    }
}

// =============================================================================
// Class scopes
// =============================================================================

/// Loads host methods and fields; record `i` stands for `methods[i]` or
/// `fields[i]`.
pub struct ReflectMemberDeserializer {
    class: DescriptorId,
    /// Internal name of the class, for host signatures.
    owner: String,
    methods: Arc<[MethodRef]>,
    fields: Arc<[FieldRef]>,
}

impl ReflectMemberDeserializer {
    pub fn new(
        class: DescriptorId,
        owner: String,
        methods: Arc<[MethodRef]>,
        fields: Arc<[FieldRef]>,
    ) -> Self {
        ReflectMemberDeserializer {
            class,
            owner,
            methods,
            fields,
        }
    }

    /// The method `record` stands for. Overloads are told apart by host
    /// signature; records without one fall back to their position.
    fn method_for(&self, ctx: &MemberContext<'_>, index: usize, record: &FunctionRecord) -> Option<&MethodRef> {
        if let Some(wanted) = record.host_signature.map(|slot| ctx.names.string(slot)) {
            let found = self
                .methods
                .iter()
                .find(|method| signature(&self.owner, &method.name, &method.descriptor) == *wanted);
            if found.is_some() {
                return found;
            }
        }
        self.methods.get(index)
    }
}

impl MemberDeserializer for ReflectMemberDeserializer {
    fn load_function(
        &self,
        cx: &Components,
        ctx: &MemberContext<'_>,
        index: usize,
        record: &FunctionRecord,
    ) -> Result<DescriptorId, ResolveError> {
        let (Some(method), Some(class)) = (self.method_for(ctx, index, record), cx.class(self.class)) else {
            return RecordMemberDeserializer.load_function(cx, ctx, index, record);
        };
        let translator = TypeTranslator::lenient(cx, &class);
        let value_parameters = method
            .parameters
            .iter()
            .map(|param| -> Result<ValueParameter, ResolveError> {
                Ok(ValueParameter {
                    name: Name::identifier(&param.name),
                    ty: translator.translate(&param.ty)?,
                })
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;
        let return_type = match &method.return_type {
            Some(ty) => translator.translate(ty)?,
            None => TypeId::UNIT,
        };
        // Erased built-in members are keyed by the host interface declaring
        // them, not by this class.
        let default_value = class.host_owners(cx)?.iter().find_map(|owner| {
            cx.tables()
                .default_value(&signature(owner, &method.name, &method.descriptor))
        });
        let name = ctx.names.name(record.name);

        Ok(cx.descriptors().register(|id| {
            Descriptor::Function(Arc::new(FunctionDescriptor {
                id,
                name,
                host_name: name,
                container: ctx.owner,
                module: ctx.module,
                extension_receiver: None,
                value_parameters,
                return_type,
                origin: MemberOrigin::Declared,
                is_static: method.is_static,
                source: ctx.source.clone(),
                default_value,
                annotations: LazyAnnotations::empty(cx),
            }))
        }))
    }

    fn load_property(
        &self,
        cx: &Components,
        ctx: &MemberContext<'_>,
        index: usize,
        record: &PropertyRecord,
    ) -> Result<DescriptorId, ResolveError> {
        let (Some(field), Some(class)) = (self.fields.get(index), cx.class(self.class)) else {
            return RecordMemberDeserializer.load_property(cx, ctx, index, record);
        };
        let ty = TypeTranslator::lenient(cx, &class).translate(&field.ty)?;
        let name = ctx.names.name(record.name);

        Ok(cx.descriptors().register(|id| {
            Descriptor::Property(Arc::new(PropertyDescriptor {
                id,
                name,
                getter: None,
                container: ctx.owner,
                module: ctx.module,
                extension_receiver: None,
                ty,
                kind: PropertyKind::Declared,
                is_static: field.is_static,
                source: ctx.source.clone(),
                annotations: LazyAnnotations::empty(cx),
                constant: None,
                constant_value: cx.storage().lazy(),
            }))
        }))
    }
}

/// Synthetic members of a reflected class: enum `values()`/`valueOf`,
/// built-in members the host knows under another name, built-in properties
/// read through host getters, and enum entries.
pub struct ClassScopeExtension {
    class: DescriptorId,
    class_id: ClassId,
}

impl ClassScopeExtension {
    pub fn new(class: DescriptorId, class_id: ClassId) -> Self {
        ClassScopeExtension { class, class_id }
    }

    fn enum_member(&self, cx: &Components, name: Name) -> Result<Option<(Vec<ValueParameter>, TypeId)>, ResolveError> {
        let Some(class) = cx.class(self.class) else {
            return Ok(None);
        };
        if class.kind() != ClassKind::Enum {
            return Ok(None);
        }
        let enum_type = class.default_type(cx)?;
        Ok(match &*name.as_str() {
            "values" => Some((Vec::new(), cx.types().array_of(enum_type))),
            "valueOf" => Some((
                vec![ValueParameter {
                    name: Name::identifier("value"),
                    ty: TypeId::STRING,
                }],
                enum_type,
            )),
            _ => None,
        })
    }
}

impl ScopeExtension for ClassScopeExtension {
    fn compute_non_declared_functions(
        &self,
        cx: &Components,
        _scope: &DeserializedMemberScope,
        name: Name,
        result: &mut Vec<DescriptorId>,
    ) -> Result<(), ResolveError> {
        let Some(class) = cx.class(self.class) else {
            return Ok(());
        };

        if let Some((value_parameters, return_type)) = self.enum_member(cx, name)? {
            result.push(cx.descriptors().register(|id| {
                Descriptor::Function(Arc::new(FunctionDescriptor {
                    id,
                    name,
                    host_name: name,
                    container: self.class,
                    module: class.module(),
                    extension_receiver: None,
                    value_parameters,
                    return_type,
                    origin: MemberOrigin::Synthetic,
                    is_static: true,
                    source: class.source().clone(),
                    default_value: None,
                    annotations: LazyAnnotations::empty(cx),
                }))
            }));
        }

        let text = name.as_str();
        let methods = class.host_methods(cx)?;
        let translator = TypeTranslator::lenient(cx, &class);
        let mut renamed_hosts: SmallVec<[&str; 2]> = SmallVec::new();
        for builtin in class.remapped_builtins(cx)? {
            for renamed in cx.tables().renamed_methods_of(builtin.fq_name()) {
                if renamed.name != *text || renamed_hosts.contains(&renamed.host_name.as_str()) {
                    continue;
                }
                let Some(method) = methods
                    .iter()
                    .find(|method| method.name == renamed.host_name && method.descriptor == renamed.descriptor)
                else {
                    continue;
                };
                let value_parameters = method
                    .parameters
                    .iter()
                    .map(|param| -> Result<ValueParameter, ResolveError> {
                        Ok(ValueParameter {
                            name: Name::identifier(&param.name),
                            ty: translator.translate(&param.ty)?,
                        })
                    })
                    .collect::<Result<Vec<_>, ResolveError>>()?;
                let return_type = match &method.return_type {
                    Some(ty) => translator.translate(ty)?,
                    None => TypeId::UNIT,
                };
                trace!(
                    class = %class.fq_name(),
                    name = %name,
                    host_name = %renamed.host_name,
                    "ClassScopeExtension: renamed built-in member"
                );
                result.push(cx.descriptors().register(|id| {
                    Descriptor::Function(Arc::new(FunctionDescriptor {
                        id,
                        name,
                        host_name: Name::identifier(&renamed.host_name),
                        container: self.class,
                        module: class.module(),
                        extension_receiver: None,
                        value_parameters,
                        return_type,
                        origin: MemberOrigin::RenamedBuiltin,
                        is_static: false,
                        source: class.source().clone(),
                        default_value: None,
                        annotations: LazyAnnotations::empty(cx),
                    }))
                }));
                renamed_hosts.push(renamed.host_name.as_str());
            }
        }
        Ok(())
    }

    fn compute_non_declared_properties(
        &self,
        cx: &Components,
        _scope: &DeserializedMemberScope,
        name: Name,
        result: &mut Vec<DescriptorId>,
    ) -> Result<(), ResolveError> {
        let Some(class) = cx.class(self.class) else {
            return Ok(());
        };
        let text = name.as_str();
        let methods = class.host_methods(cx)?;
        for builtin in class.remapped_builtins(cx)? {
            for special in cx.tables().special_properties_of(builtin.fq_name()) {
                if special.name != *text {
                    continue;
                }
                let Some(getter) = methods
                    .iter()
                    .find(|method| method.name == special.getter && method.parameters.is_empty() && !method.is_static)
                else {
                    continue;
                };
                let ty = match &getter.return_type {
                    Some(ty) => TypeTranslator::lenient(cx, &class).translate(ty)?,
                    None => TypeId::ERROR,
                };
                result.push(cx.descriptors().register(|id| {
                    Descriptor::Property(Arc::new(PropertyDescriptor {
                        id,
                        name,
                        getter: Some(Name::identifier(&special.getter)),
                        container: self.class,
                        module: class.module(),
                        extension_receiver: None,
                        ty,
                        kind: PropertyKind::SpecialGetter,
                        is_static: false,
                        source: class.source().clone(),
                        annotations: LazyAnnotations::empty(cx),
                        constant: None,
                        constant_value: cx.storage().lazy(),
                    }))
                }));
                return Ok(());
            }
        }
        Ok(())
    }

    fn add_non_declared_descriptors(
        &self,
        cx: &Components,
        scope: &DeserializedMemberScope,
        filter: DescriptorKindFilter,
        name_filter: &dyn Fn(Name) -> bool,
        result: &mut IndexSet<DescriptorId>,
    ) -> Result<(), ResolveError> {
        if !filter.intersects(DescriptorKindFilter::FUNCTIONS | DescriptorKindFilter::VARIABLES) {
            return Ok(());
        }
        let Some(class) = cx.class(self.class) else {
            return Ok(());
        };
        let mut function_names: IndexSet<Name> = IndexSet::new();
        let mut property_names: IndexSet<Name> = IndexSet::new();
        if class.kind() == ClassKind::Enum {
            function_names.insert(Name::identifier("values"));
            function_names.insert(Name::identifier("valueOf"));
        }
        for builtin in class.remapped_builtins(cx)? {
            let tables = cx.tables();
            function_names.extend(
                tables
                    .renamed_methods_of(builtin.fq_name())
                    .iter()
                    .map(|renamed| Name::identifier(&renamed.name)),
            );
            property_names.extend(
                tables
                    .special_properties_of(builtin.fq_name())
                    .iter()
                    .map(|special| Name::identifier(&special.name)),
            );
        }
        if filter.intersects(DescriptorKindFilter::FUNCTIONS) {
            for name in function_names.into_iter().filter(|&name| name_filter(name)) {
                result.extend(scope.functions_named(cx, name)?.iter().copied());
            }
        }
        if filter.intersects(DescriptorKindFilter::VARIABLES) {
            for name in property_names.into_iter().filter(|&name| name_filter(name)) {
                result.extend(scope.properties_named(cx, name)?.iter().copied());
            }
        }
        Ok(())
    }

    fn add_enum_entry_descriptors(
        &self,
        cx: &Components,
        name_filter: &dyn Fn(Name) -> bool,
        result: &mut IndexSet<DescriptorId>,
    ) -> Result<(), ResolveError> {
        let Some(class) = cx.class(self.class) else {
            return Ok(());
        };
        if !class.enum_entries(cx)?.iter().any(|&name| name_filter(name)) {
            return Ok(());
        }
        for &id in class.enum_entry_descriptors(cx)?.iter() {
            if cx.descriptors().get(id).is_some_and(|entry| name_filter(entry.name())) {
                result.insert(id);
            }
        }
        Ok(())
    }

    fn create_class_id(&self, name: Name) -> ClassId {
        self.class_id.nested(name)
    }
}

#[cfg(test)]
#[path = "../tests/member_scope_tests.rs"]
mod tests;
