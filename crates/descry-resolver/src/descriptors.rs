//! Descriptor variants.
//!
//! A [`Descriptor`] is a cheap, cloneable handle (every variant is an `Arc`)
//! stored in the [`DescriptorStore`](crate::arena::DescriptorStore). Cross
//! references between descriptors are [`DescriptorId`]s, never owning
//! pointers, so cyclic hierarchies are just cyclic id graphs.

use crate::annotations::AnnotationDecoder;
use crate::builtin_members::DefaultValue;
use crate::class::LazyClassDescriptor;
use crate::constants::{AnnotationValue, ConstantValue};
use crate::error::ResolveError;
use crate::member_scope::DeserializedMemberScope;
use crate::metadata::{AnnotationRecord, NameResolver, ValueRecord};
use crate::module::ModuleDescriptor;
use crate::resolver::Components;
use crate::source::SourceElement;
use descry_common::{DescriptorId, FqName, Name};
use descry_solver::{LazyValue, TypeId, TypeParamId};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub enum Descriptor {
    Module(Arc<ModuleDescriptor>),
    PackageFragment(Arc<PackageFragmentDescriptor>),
    Class(Arc<LazyClassDescriptor>),
    TypeParameter(Arc<TypeParameterDescriptor>),
    Function(Arc<FunctionDescriptor>),
    Property(Arc<PropertyDescriptor>),
    Constructor(Arc<ConstructorDescriptor>),
}

impl Descriptor {
    pub fn id(&self) -> DescriptorId {
        match self {
            Descriptor::Module(module) => module.id(),
            Descriptor::PackageFragment(fragment) => fragment.id,
            Descriptor::Class(class) => class.id(),
            Descriptor::TypeParameter(param) => param.id,
            Descriptor::Function(function) => function.id,
            Descriptor::Property(property) => property.id,
            Descriptor::Constructor(constructor) => constructor.id,
        }
    }

    pub fn name(&self) -> Name {
        match self {
            Descriptor::Module(module) => module.name(),
            Descriptor::PackageFragment(fragment) => fragment
                .fq_name
                .short_name()
                .unwrap_or_else(|| Name::guess("<root>")),
            Descriptor::Class(class) => class.name(),
            Descriptor::TypeParameter(param) => param.name,
            Descriptor::Function(function) => function.name,
            Descriptor::Property(property) => property.name,
            Descriptor::Constructor(_) => Name::init(),
        }
    }

    /// Owning container. Modules have none.
    pub fn container(&self) -> Option<DescriptorId> {
        match self {
            Descriptor::Module(_) => None,
            Descriptor::PackageFragment(fragment) => Some(fragment.module),
            Descriptor::Class(class) => Some(class.container()),
            Descriptor::TypeParameter(param) => Some(param.container),
            Descriptor::Function(function) => Some(function.container),
            Descriptor::Property(property) => Some(property.container),
            Descriptor::Constructor(constructor) => Some(constructor.container),
        }
    }

    pub fn source(&self) -> SourceElement {
        match self {
            Descriptor::Module(_) | Descriptor::TypeParameter(_) => SourceElement::NoSource,
            Descriptor::PackageFragment(fragment) => fragment.source.clone(),
            Descriptor::Class(class) => class.source().clone(),
            Descriptor::Function(function) => function.source.clone(),
            Descriptor::Property(property) => property.source.clone(),
            Descriptor::Constructor(constructor) => constructor.source.clone(),
        }
    }

    pub fn annotations(&self, cx: &Components) -> Result<Arc<[AnnotationValue]>, ResolveError> {
        match self {
            Descriptor::Class(class) => class.annotations(cx),
            Descriptor::Function(function) => function.annotations.get(cx),
            Descriptor::Property(property) => property.annotations.get(cx),
            _ => Ok(Arc::from([])),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Descriptor::Module(_) => "module",
            Descriptor::PackageFragment(_) => "package fragment",
            Descriptor::Class(_) => "class",
            Descriptor::TypeParameter(_) => "type parameter",
            Descriptor::Function(_) => "function",
            Descriptor::Property(_) => "property",
            Descriptor::Constructor(_) => "constructor",
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, #{})", self.kind_name(), self.name(), self.id().0)
    }
}

// =============================================================================
// Annotations
// =============================================================================

/// Serialized annotations, decoded on first access.
pub struct LazyAnnotations {
    records: Vec<AnnotationRecord>,
    names: Option<Arc<dyn NameResolver>>,
    module: DescriptorId,
    value: LazyValue<Arc<[AnnotationValue]>>,
}

impl LazyAnnotations {
    pub fn empty(cx: &Components) -> Self {
        LazyAnnotations {
            records: Vec::new(),
            names: None,
            module: DescriptorId::INVALID,
            value: cx.storage().lazy(),
        }
    }

    pub fn serialized(
        cx: &Components,
        module: DescriptorId,
        names: Arc<dyn NameResolver>,
        records: Vec<AnnotationRecord>,
    ) -> Self {
        LazyAnnotations {
            records,
            names: Some(names),
            module,
            value: cx.storage().lazy(),
        }
    }

    pub fn get(&self, cx: &Components) -> Result<Arc<[AnnotationValue]>, ResolveError> {
        self.value.try_get_or_compute(|| {
            let Some(names) = &self.names else {
                return Ok(Arc::from([]));
            };
            let decoder = AnnotationDecoder::new(cx, self.module);
            let decoded = self
                .records
                .iter()
                .map(|record| decoder.decode_annotation(record, names.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Arc::from(decoded))
        })
    }
}

// =============================================================================
// Containers
// =============================================================================

pub struct PackageFragmentDescriptor {
    pub id: DescriptorId,
    pub fq_name: FqName,
    pub module: DescriptorId,
    pub source: SourceElement,
    /// Declared members; reflective fragments have none.
    pub scope: Option<Arc<DeserializedMemberScope>>,
}

impl PackageFragmentDescriptor {
    pub fn member_scope(&self) -> Option<&Arc<DeserializedMemberScope>> {
        self.scope.as_ref()
    }
}

// =============================================================================
// Members
// =============================================================================

/// Where a member came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberOrigin {
    Declared,
    /// Produced by the scope itself (enum `values()`, `valueOf`).
    Synthetic,
    /// A built-in member visible on the host under another name.
    RenamedBuiltin,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    Declared,
    EnumEntry,
    /// A built-in property read through a host getter method.
    SpecialGetter,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValueParameter {
    pub name: Name,
    pub ty: TypeId,
}

pub struct TypeParameterDescriptor {
    pub id: DescriptorId,
    pub name: Name,
    pub index: u32,
    pub container: DescriptorId,
    pub param: TypeParamId,
}

impl TypeParameterDescriptor {
    pub fn upper_bound(&self, cx: &Components) -> TypeId {
        cx.types().upper_bound(self.param)
    }
}

pub struct FunctionDescriptor {
    pub id: DescriptorId,
    pub name: Name,
    /// Name the host runtime knows the function by.
    pub host_name: Name,
    pub container: DescriptorId,
    pub module: DescriptorId,
    pub extension_receiver: Option<TypeId>,
    pub value_parameters: Vec<ValueParameter>,
    pub return_type: TypeId,
    pub origin: MemberOrigin,
    pub is_static: bool,
    pub source: SourceElement,
    /// Fallback result for built-in members with erased parameters.
    pub default_value: Option<DefaultValue>,
    pub annotations: LazyAnnotations,
}

impl FunctionDescriptor {
    pub fn is_extension(&self) -> bool {
        self.extension_receiver.is_some()
    }

    pub fn is_renamed_on_host(&self) -> bool {
        self.host_name != self.name
    }
}

pub struct PropertyDescriptor {
    pub id: DescriptorId,
    pub name: Name,
    /// Host getter method, for properties read through one.
    pub getter: Option<Name>,
    pub container: DescriptorId,
    pub module: DescriptorId,
    pub extension_receiver: Option<TypeId>,
    pub ty: TypeId,
    pub kind: PropertyKind,
    pub is_static: bool,
    pub source: SourceElement,
    pub annotations: LazyAnnotations,
    pub(crate) constant: Option<(ValueRecord, Arc<dyn NameResolver>)>,
    pub(crate) constant_value: LazyValue<Option<ConstantValue>>,
}

impl PropertyDescriptor {
    pub fn is_extension(&self) -> bool {
        self.extension_receiver.is_some()
    }

    /// Compile-time constant initializer, decoded against the property type.
    pub fn compile_time_constant(
        &self,
        cx: &Components,
    ) -> Result<Option<ConstantValue>, ResolveError> {
        self.constant_value.try_get_or_compute(|| {
            let Some((record, names)) = &self.constant else {
                return Ok(None);
            };
            let decoder = AnnotationDecoder::new(cx, self.module);
            decoder
                .decode_value(self.ty, record, names.as_ref())
                .map(Some)
        })
    }
}

pub struct ConstructorDescriptor {
    pub id: DescriptorId,
    pub container: DescriptorId,
    pub value_parameters: Vec<ValueParameter>,
    pub source: SourceElement,
}
