//! Type interning.
//!
//! The interner owns every [`TypeData`], type constructor, type parameter and
//! captured-type payload created during resolution. All tables are
//! append-only, so ids handed out stay valid for the interner's lifetime and
//! concurrent readers never observe a removal.

use crate::builtins::{ArgSpec, BUILTINS_PACKAGE, BuiltinClass, PrimitiveType};
use crate::types::{
    CapturedId, CapturedTypeInfo, Declaration, TypeConstructorId, TypeConstructorInfo, TypeData,
    TypeId, TypeParamId, TypeParamInfo, TypeProjection, Variance,
};
use dashmap::DashMap;
use descry_common::{ClassId, FqName, Name};
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::sync::{Arc, OnceLock};
use tracing::trace;

pub struct TypeInterner {
    types: RwLock<Vec<TypeData>>,
    lookup: DashMap<TypeData, TypeId>,
    constructors: RwLock<Vec<Arc<TypeConstructorInfo>>>,
    params: RwLock<Vec<Arc<TypeParamInfo>>>,
    captured: RwLock<Vec<CapturedTypeInfo>>,
}

impl TypeInterner {
    /// Create an interner with every built-in class registered and the
    /// canonical [`TypeId`] constants in place.
    pub fn new() -> Self {
        let interner = TypeInterner {
            types: RwLock::new(Vec::with_capacity(256)),
            lookup: DashMap::new(),
            constructors: RwLock::new(Vec::with_capacity(BuiltinClass::ALL.len() + 64)),
            params: RwLock::new(Vec::new()),
            captured: RwLock::new(Vec::new()),
        };
        interner.register_builtins();
        interner
    }

    fn register_builtins(&self) {
        for builtin in BuiltinClass::ALL {
            let ctor = self.register_constructor_with(|ctor| {
                let params: SmallVec<[TypeParamId; 2]> = builtin
                    .parameters()
                    .iter()
                    .enumerate()
                    .map(|(index, &(name, variance))| {
                        let param = self.register_type_param(
                            Name::identifier(name),
                            index as u32,
                            variance,
                            ctor,
                        );
                        self.set_upper_bound(param, TypeId::NULLABLE_ANY);
                        param
                    })
                    .collect();
                TypeConstructorInfo::new(
                    FqName::parse(builtin.fq_name()),
                    Declaration::Builtin(builtin),
                )
                .with_final(builtin.is_final())
                .with_parameters(Arc::from(params.as_slice()))
            });
            debug_assert_eq!(ctor, builtin.constructor());
        }

        let error = self.intern(TypeData::Error);
        debug_assert_eq!(error, TypeId::ERROR);
        let canonical = [
            (BuiltinClass::Any, false, TypeId::ANY),
            (BuiltinClass::Any, true, TypeId::NULLABLE_ANY),
            (BuiltinClass::Nothing, false, TypeId::NOTHING),
            (BuiltinClass::Nothing, true, TypeId::NULLABLE_NOTHING),
            (BuiltinClass::Unit, false, TypeId::UNIT),
            (BuiltinClass::Boolean, false, TypeId::BOOLEAN),
            (BuiltinClass::Char, false, TypeId::CHAR),
            (BuiltinClass::Byte, false, TypeId::BYTE),
            (BuiltinClass::Short, false, TypeId::SHORT),
            (BuiltinClass::Int, false, TypeId::INT),
            (BuiltinClass::Float, false, TypeId::FLOAT),
            (BuiltinClass::Long, false, TypeId::LONG),
            (BuiltinClass::Double, false, TypeId::DOUBLE),
            (BuiltinClass::String, false, TypeId::STRING),
            (BuiltinClass::Number, false, TypeId::NUMBER),
            (BuiltinClass::CharSequence, false, TypeId::CHAR_SEQUENCE),
            (BuiltinClass::Annotation, false, TypeId::ANNOTATION),
            (BuiltinClass::Throwable, false, TypeId::THROWABLE),
            (BuiltinClass::BooleanArray, false, TypeId::BOOLEAN_ARRAY),
            (BuiltinClass::CharArray, false, TypeId::CHAR_ARRAY),
            (BuiltinClass::ByteArray, false, TypeId::BYTE_ARRAY),
            (BuiltinClass::ShortArray, false, TypeId::SHORT_ARRAY),
            (BuiltinClass::IntArray, false, TypeId::INT_ARRAY),
            (BuiltinClass::FloatArray, false, TypeId::FLOAT_ARRAY),
            (BuiltinClass::LongArray, false, TypeId::LONG_ARRAY),
            (BuiltinClass::DoubleArray, false, TypeId::DOUBLE_ARRAY),
        ];
        for (builtin, nullable, expected) in canonical {
            let id = self.class_type(builtin.constructor(), Arc::from([]), nullable);
            debug_assert_eq!(id, expected, "canonical id drift for {}", builtin.fq_name());
        }

        for builtin in BuiltinClass::ALL {
            let own_params = self.parameters_of(builtin.constructor());
            let self_type = self.default_type(builtin.constructor());
            let supertypes: Vec<TypeId> = builtin
                .supertypes()
                .iter()
                .map(|supertype| {
                    let arguments: SmallVec<[TypeProjection; 2]> = supertype
                        .arguments
                        .iter()
                        .map(|arg| match *arg {
                            ArgSpec::Param(index) => TypeProjection::invariant(
                                own_params
                                    .get(index)
                                    .map(|&param| self.parameter_type(param, false))
                                    .unwrap_or(TypeId::ERROR),
                            ),
                            ArgSpec::SelfType => TypeProjection::invariant(self_type),
                        })
                        .collect();
                    self.class_type(supertype.class.constructor(), Arc::from(arguments.as_slice()), false)
                })
                .collect();
            let info = self.constructor(builtin.constructor());
            let _ = info.static_supertypes.set(Arc::from(supertypes));
        }
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(id) = self.lookup.get(&data) {
            return *id;
        }
        let mut types = self.types.write();
        if let Some(id) = self.lookup.get(&data) {
            return *id;
        }
        let id = TypeId(types.len() as u32);
        types.push(data.clone());
        self.lookup.insert(data, id);
        id
    }

    /// Structural data of `id`. Unknown ids read as [`TypeData::Error`].
    pub fn data(&self, id: TypeId) -> TypeData {
        self.types
            .read()
            .get(id.0 as usize)
            .cloned()
            .unwrap_or(TypeData::Error)
    }

    pub fn class_type(
        &self,
        constructor: TypeConstructorId,
        arguments: Arc<[TypeProjection]>,
        nullable: bool,
    ) -> TypeId {
        self.intern(TypeData::Class {
            constructor,
            arguments,
            nullable,
        })
    }

    pub fn builtin_type(&self, builtin: BuiltinClass, arguments: &[TypeProjection]) -> TypeId {
        self.class_type(builtin.constructor(), Arc::from(arguments), false)
    }

    pub fn parameter_type(&self, param: TypeParamId, nullable: bool) -> TypeId {
        self.intern(TypeData::Parameter { param, nullable })
    }

    /// The constructor applied to its own parameters (`List<E>` for `List`).
    pub fn default_type(&self, constructor: TypeConstructorId) -> TypeId {
        let arguments: SmallVec<[TypeProjection; 2]> = self
            .parameters_of(constructor)
            .iter()
            .map(|&param| TypeProjection::invariant(self.parameter_type(param, false)))
            .collect();
        self.class_type(constructor, Arc::from(arguments.as_slice()), false)
    }

    pub fn constructor_of(&self, ty: TypeId) -> Option<TypeConstructorId> {
        match self.data(ty) {
            TypeData::Class { constructor, .. } => Some(constructor),
            _ => None,
        }
    }

    pub fn arguments_of(&self, ty: TypeId) -> Arc<[TypeProjection]> {
        match self.data(ty) {
            TypeData::Class { arguments, .. } => arguments,
            _ => Arc::from([]),
        }
    }

    pub fn is_nullable(&self, ty: TypeId) -> bool {
        self.data(ty).is_nullable()
    }

    pub fn with_nullability(&self, ty: TypeId, nullable: bool) -> TypeId {
        match self.data(ty) {
            TypeData::Class {
                constructor,
                arguments,
                ..
            } => self.class_type(constructor, arguments, nullable),
            TypeData::Parameter { param, .. } => self.parameter_type(param, nullable),
            TypeData::Captured { captured, .. } => {
                self.intern(TypeData::Captured { captured, nullable })
            }
            TypeData::Error => ty,
        }
    }

    pub fn is_builtin(&self, ty: TypeId, builtin: BuiltinClass) -> bool {
        self.constructor_of(ty) == Some(builtin.constructor())
    }

    pub fn is_array(&self, ty: TypeId) -> bool {
        self.constructor_of(ty)
            .and_then(BuiltinClass::from_constructor)
            .is_some_and(|b| b == BuiltinClass::Array || b.primitive_array_element().is_some())
    }

    /// `IntArray` for `Int`, `Array<T>` for everything else.
    pub fn array_of(&self, element: TypeId) -> TypeId {
        if let Some(primitive) = PrimitiveType::from_type_id(element) {
            return primitive.array_type_id();
        }
        self.builtin_type(BuiltinClass::Array, &[TypeProjection::invariant(element)])
    }

    pub fn array_element_type(&self, ty: TypeId) -> Option<TypeId> {
        let builtin = self.constructor_of(ty).and_then(BuiltinClass::from_constructor)?;
        if let Some(primitive) = builtin.primitive_array_element() {
            return Some(primitive.type_id());
        }
        if builtin != BuiltinClass::Array {
            return None;
        }
        Some(
            self.arguments_of(ty)
                .first()
                .and_then(|arg| arg.ty())
                .unwrap_or(TypeId::NULLABLE_ANY),
        )
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -------------------------------------------------------------------------
    // Constructors
    // -------------------------------------------------------------------------

    pub fn register_constructor(&self, info: TypeConstructorInfo) -> TypeConstructorId {
        self.register_constructor_with(|_| info)
    }

    /// Register a constructor whose payload needs its own id, such as one
    /// owning freshly registered type parameters.
    ///
    /// `build` must not read constructors back from this interner.
    pub fn register_constructor_with(
        &self,
        build: impl FnOnce(TypeConstructorId) -> TypeConstructorInfo,
    ) -> TypeConstructorId {
        let mut constructors = self.constructors.write();
        let id = TypeConstructorId(constructors.len() as u32);
        let info = build(id);
        trace!(ctor = id.0, name = %info.name, declaration = ?info.declaration, "TypeInterner::register_constructor");
        constructors.push(Arc::new(info));
        id
    }

    /// Panics on ids this interner never produced; those only arise from
    /// mixing interners, which is a programming error.
    pub fn constructor(&self, id: TypeConstructorId) -> Arc<TypeConstructorInfo> {
        Arc::clone(&self.constructors.read()[id.0 as usize])
    }

    /// Registered or published parameters; empty for a class descriptor
    /// whose parameters have not been computed yet.
    pub fn parameters_of(&self, id: TypeConstructorId) -> Arc<[TypeParamId]> {
        self.constructor(id)
            .parameters()
            .unwrap_or_else(|| Arc::from([]))
    }

    /// Write-once; returns `false` if parameters were already known.
    pub fn publish_parameters(&self, id: TypeConstructorId, parameters: Arc<[TypeParamId]>) -> bool {
        self.constructor(id).parameters.set(parameters).is_ok()
    }

    /// Register a not-found placeholder with `arity` fresh parameters.
    pub fn register_not_found(&self, class_id: ClassId, arity: usize) -> TypeConstructorId {
        let registered = self.register_constructor_with(|ctor| {
            let params: SmallVec<[TypeParamId; 2]> = (0..arity)
                .map(|index| {
                    let param = self.register_type_param(
                        Name::identifier(&format!("T{index}")),
                        index as u32,
                        Variance::Invariant,
                        ctor,
                    );
                    self.set_upper_bound(param, TypeId::NULLABLE_ANY);
                    param
                })
                .collect();
            TypeConstructorInfo::new(
                class_id.as_single_fq_name(),
                Declaration::NotFound(class_id),
            )
            .with_parameters(Arc::from(params.as_slice()))
        });
        let any: Arc<[TypeId]> = Arc::from([TypeId::ANY]);
        let _ = self.constructor(registered).static_supertypes.set(any);
        registered
    }

    // -------------------------------------------------------------------------
    // Type parameters
    // -------------------------------------------------------------------------

    pub fn register_type_param(
        &self,
        name: Name,
        index: u32,
        variance: Variance,
        owner: TypeConstructorId,
    ) -> TypeParamId {
        let mut params = self.params.write();
        let id = TypeParamId(params.len() as u32);
        params.push(Arc::new(TypeParamInfo {
            name,
            index,
            variance,
            owner,
            upper_bound: OnceLock::new(),
        }));
        id
    }

    pub fn type_param(&self, id: TypeParamId) -> Arc<TypeParamInfo> {
        Arc::clone(&self.params.read()[id.0 as usize])
    }

    /// Write-once; returns `false` if the bound was already set.
    pub fn set_upper_bound(&self, id: TypeParamId, bound: TypeId) -> bool {
        self.type_param(id).upper_bound.set(bound).is_ok()
    }

    /// Declared upper bound, `Any?` until one is set.
    pub fn upper_bound(&self, id: TypeParamId) -> TypeId {
        self.type_param(id)
            .upper_bound
            .get()
            .copied()
            .unwrap_or(TypeId::NULLABLE_ANY)
    }

    // -------------------------------------------------------------------------
    // Captured types
    // -------------------------------------------------------------------------

    /// Every call yields a fresh identity.
    pub(crate) fn register_captured(&self, info: CapturedTypeInfo) -> CapturedId {
        let mut captured = self.captured.write();
        let id = CapturedId(captured.len() as u32);
        captured.push(info);
        id
    }

    pub fn captured(&self, id: CapturedId) -> CapturedTypeInfo {
        self.captured.read()[id.0 as usize]
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Human-readable rendering with short class names (`List<out String>?`).
    pub fn render(&self, ty: TypeId) -> String {
        match self.data(ty) {
            TypeData::Error => "[ERROR]".to_string(),
            TypeData::Class {
                constructor,
                arguments,
                nullable,
            } => {
                let info = self.constructor(constructor);
                let mut out = info
                    .name
                    .short_name()
                    .map(|name| name.to_string())
                    .unwrap_or_default();
                if !arguments.is_empty() {
                    let rendered: Vec<String> = arguments
                        .iter()
                        .map(|arg| self.render_projection(*arg))
                        .collect();
                    out.push('<');
                    out.push_str(&rendered.join(", "));
                    out.push('>');
                }
                if nullable {
                    out.push('?');
                }
                out
            }
            TypeData::Parameter { param, nullable } => {
                let mut out = self.type_param(param).name.to_string();
                if nullable {
                    out.push('?');
                }
                out
            }
            TypeData::Captured { captured, nullable } => {
                let mut out = format!(
                    "Captured({})",
                    self.render_projection(self.captured(captured).projection)
                );
                if nullable {
                    out.push('?');
                }
                out
            }
        }
    }

    pub fn render_projection(&self, projection: TypeProjection) -> String {
        match projection {
            TypeProjection::Star => "*".to_string(),
            TypeProjection::Projected { variance, ty } => match variance {
                Variance::Invariant => self.render(ty),
                _ => format!("{} {}", variance.label(), self.render(ty)),
            },
        }
    }

    /// The built-ins package, as a qualified name.
    pub fn builtins_package(&self) -> FqName {
        FqName::parse(BUILTINS_PACKAGE)
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
