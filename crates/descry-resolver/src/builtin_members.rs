//! Built-in member remap tables.
//!
//! A handful of built-in members are visible on the host under a different
//! name or with erased parameter types:
//!
//! - **Renamed methods**: `Number.toInt()` is `intValue()` on the host,
//!   `MutableList.removeAt(Int)` is `remove(int)`.
//! - **Special properties**: `Collection.size` is the host method `size()`,
//!   `Map.keys` is `keySet()`.
//! - **Erased parameters**: `Collection.contains(E)` takes `Object` on the
//!   host. When no override with the precise signature exists, a call falls
//!   back to a fixed default result (`false`, `null` or `-1`).
//!
//! The catalogue is plain data ([`BuiltinMemberCatalog`]) so embedders
//! targeting a different host can swap it. [`BuiltinMemberTables`] compiles
//! it into hash maps once; every lookup afterwards is a single hash lookup.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// Catalogue
// =============================================================================

/// A built-in method exposed on the host under another name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedMethod {
    /// Qualified name of the built-in class (`kotlin.Number`).
    pub builtin: String,
    /// Internal name of the host class declaring it (`java/lang/Number`).
    pub host_owner: String,
    /// Logical name (`toInt`).
    pub name: String,
    /// Erased host descriptor (`()I`).
    pub descriptor: String,
    /// Name on the host (`intValue`).
    pub host_name: String,
}

/// A built-in property read through a host getter method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialProperty {
    pub builtin: String,
    pub name: String,
    pub getter: String,
}

/// Default result of an erased-parameter member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    False,
    Null,
    Index(i32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErasureKind {
    /// The single parameter is a collection whose element type is erased.
    OneCollectionParameter,
    /// The single parameter is erased to `Object`.
    ObjectParameter(DefaultValue),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasedMember {
    pub host_owner: String,
    pub name: String,
    pub descriptor: String,
    pub kind: ErasureKind,
}

/// How a member with erased parameter types must be treated by override
/// matching.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecialSignatureInfo {
    OneCollectionParameter,
    /// Erased generic parameter; the fallback result is `null`.
    ObjectParameterGeneric,
    ObjectParameterNonGeneric,
}

/// The full remap catalogue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuiltinMemberCatalog {
    pub renamed_methods: Vec<RenamedMethod>,
    pub special_properties: Vec<SpecialProperty>,
    pub erased_members: Vec<ErasedMember>,
}

const NUMBER: &str = "kotlin.Number";
const CHAR_SEQUENCE: &str = "kotlin.CharSequence";
const MUTABLE_LIST: &str = "kotlin.collections.MutableList";
const COLLECTION: &str = "kotlin.collections.Collection";
const MAP: &str = "kotlin.collections.Map";

fn renamed(builtin: &str, host_owner: &str, name: &str, descriptor: &str, host_name: &str) -> RenamedMethod {
    RenamedMethod {
        builtin: builtin.to_string(),
        host_owner: host_owner.to_string(),
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        host_name: host_name.to_string(),
    }
}

fn property(builtin: &str, name: &str, getter: &str) -> SpecialProperty {
    SpecialProperty {
        builtin: builtin.to_string(),
        name: name.to_string(),
        getter: getter.to_string(),
    }
}

fn erased(host_owner: &str, name: &str, descriptor: &str, kind: ErasureKind) -> ErasedMember {
    ErasedMember {
        host_owner: host_owner.to_string(),
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        kind,
    }
}

impl Default for BuiltinMemberCatalog {
    fn default() -> Self {
        use DefaultValue::{False, Index, Null};
        use ErasureKind::{ObjectParameter, OneCollectionParameter};

        const OBJECT_TO_BOOLEAN: &str = "(Ljava/lang/Object;)Z";
        const OBJECT_TO_OBJECT: &str = "(Ljava/lang/Object;)Ljava/lang/Object;";
        const OBJECT_TO_INT: &str = "(Ljava/lang/Object;)I";
        const COLLECTION_TO_BOOLEAN: &str = "(Ljava/util/Collection;)Z";

        let renamed_methods = vec![
            renamed(NUMBER, "java/lang/Number", "toByte", "()B", "byteValue"),
            renamed(NUMBER, "java/lang/Number", "toShort", "()S", "shortValue"),
            renamed(NUMBER, "java/lang/Number", "toInt", "()I", "intValue"),
            renamed(NUMBER, "java/lang/Number", "toLong", "()J", "longValue"),
            renamed(NUMBER, "java/lang/Number", "toFloat", "()F", "floatValue"),
            renamed(NUMBER, "java/lang/Number", "toDouble", "()D", "doubleValue"),
            renamed(MUTABLE_LIST, "java/util/List", "removeAt", "(I)Ljava/lang/Object;", "remove"),
            renamed(CHAR_SEQUENCE, "java/lang/CharSequence", "get", "(I)C", "charAt"),
        ];

        let special_properties = vec![
            property("kotlin.Enum", "name", "name"),
            property("kotlin.Enum", "ordinal", "ordinal"),
            property(COLLECTION, "size", "size"),
            property(MAP, "size", "size"),
            property(CHAR_SEQUENCE, "length", "length"),
            property(MAP, "keys", "keySet"),
            property(MAP, "values", "values"),
            property(MAP, "entries", "entrySet"),
        ];

        let erased_members = vec![
            erased("java/util/Collection", "containsAll", COLLECTION_TO_BOOLEAN, OneCollectionParameter),
            erased("java/util/Collection", "removeAll", COLLECTION_TO_BOOLEAN, OneCollectionParameter),
            erased("java/util/Collection", "retainAll", COLLECTION_TO_BOOLEAN, OneCollectionParameter),
            erased("java/util/Collection", "contains", OBJECT_TO_BOOLEAN, ObjectParameter(False)),
            erased("java/util/Collection", "remove", OBJECT_TO_BOOLEAN, ObjectParameter(False)),
            erased("java/util/Map", "containsKey", OBJECT_TO_BOOLEAN, ObjectParameter(False)),
            erased("java/util/Map", "containsValue", OBJECT_TO_BOOLEAN, ObjectParameter(False)),
            erased("java/util/Map", "get", OBJECT_TO_OBJECT, ObjectParameter(Null)),
            erased("java/util/Map", "remove", OBJECT_TO_OBJECT, ObjectParameter(Null)),
            erased("java/util/List", "indexOf", OBJECT_TO_INT, ObjectParameter(Index(-1))),
            erased("java/util/List", "lastIndexOf", OBJECT_TO_INT, ObjectParameter(Index(-1))),
        ];

        BuiltinMemberCatalog {
            renamed_methods,
            special_properties,
            erased_members,
        }
    }
}

// =============================================================================
// Compiled tables
// =============================================================================

/// Signature key shared by every table: `java/util/List.removeAt(I)Ljava/lang/Object;`.
pub fn signature(host_owner: &str, name: &str, descriptor: &str) -> String {
    format!("{host_owner}.{name}{descriptor}")
}

type Names = SmallVec<[Arc<str>; 2]>;

/// Lookup tables compiled from a [`BuiltinMemberCatalog`].
#[derive(Debug, Default)]
pub struct BuiltinMemberTables {
    host_names: FxHashMap<String, Arc<str>>,
    logical_names: FxHashMap<Arc<str>, Names>,
    renamed_by_builtin: FxHashMap<String, Vec<RenamedMethod>>,
    getters: FxHashMap<(String, String), Arc<str>>,
    properties_by_getter: FxHashMap<Arc<str>, Names>,
    properties_by_builtin: FxHashMap<String, Vec<SpecialProperty>>,
    erased: FxHashMap<String, ErasureKind>,
}

impl BuiltinMemberTables {
    pub fn compile(catalog: &BuiltinMemberCatalog) -> Self {
        let mut tables = BuiltinMemberTables::default();

        for method in &catalog.renamed_methods {
            let host_name: Arc<str> = Arc::from(method.host_name.as_str());
            tables.host_names.insert(
                signature(&method.host_owner, &method.name, &method.descriptor),
                Arc::clone(&host_name),
            );
            let candidates = tables.logical_names.entry(host_name).or_default();
            if !candidates.iter().any(|name| **name == *method.name) {
                candidates.push(Arc::from(method.name.as_str()));
            }
            tables
                .renamed_by_builtin
                .entry(method.builtin.clone())
                .or_default()
                .push(method.clone());
        }

        for property in &catalog.special_properties {
            let getter: Arc<str> = Arc::from(property.getter.as_str());
            tables.getters.insert(
                (property.builtin.clone(), property.name.clone()),
                Arc::clone(&getter),
            );
            let names = tables.properties_by_getter.entry(getter).or_default();
            if !names.iter().any(|name| **name == *property.name) {
                names.push(Arc::from(property.name.as_str()));
            }
            tables
                .properties_by_builtin
                .entry(property.builtin.clone())
                .or_default()
                .push(property.clone());
        }

        for member in &catalog.erased_members {
            tables.erased.insert(
                signature(&member.host_owner, &member.name, &member.descriptor),
                member.kind,
            );
        }

        debug!(
            renamed = catalog.renamed_methods.len(),
            properties = catalog.special_properties.len(),
            erased = catalog.erased_members.len(),
            "BuiltinMemberTables::compile"
        );
        tables
    }

    /// Tables for the default catalogue, built once per process.
    pub fn standard() -> Arc<BuiltinMemberTables> {
        Arc::clone(&STANDARD)
    }

    /// Host-visible name for a logical member signature, if it is renamed.
    pub fn host_name(&self, signature: &str) -> Option<Arc<str>> {
        self.host_names.get(signature).cloned()
    }

    /// Logical names that may be visible on the host as `host_name`.
    pub fn logical_names(&self, host_name: &str) -> &[Arc<str>] {
        self.logical_names
            .get(host_name)
            .map(|names| names.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_renamed_host_name(&self, host_name: &str) -> bool {
        self.logical_names.contains_key(host_name)
    }

    /// Renamed methods declared by one built-in class.
    pub fn renamed_methods_of(&self, builtin: &str) -> &[RenamedMethod] {
        self.renamed_by_builtin
            .get(builtin)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Host getter of a special property of `builtin`.
    pub fn property_getter(&self, builtin: &str, name: &str) -> Option<Arc<str>> {
        self.getters
            .get(&(builtin.to_string(), name.to_string()))
            .cloned()
    }

    /// Property names that may be read through the host method `getter`.
    pub fn property_names_for_getter(&self, getter: &str) -> &[Arc<str>] {
        self.properties_by_getter
            .get(getter)
            .map(|names| names.as_slice())
            .unwrap_or(&[])
    }

    pub fn special_properties_of(&self, builtin: &str) -> &[SpecialProperty] {
        self.properties_by_builtin
            .get(builtin)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `builtin` has members the host exposes differently.
    pub fn has_remapped_members(&self, builtin: &str) -> bool {
        self.renamed_by_builtin.contains_key(builtin) || self.properties_by_builtin.contains_key(builtin)
    }

    pub fn special_signature_info(&self, signature: &str) -> Option<SpecialSignatureInfo> {
        Some(match self.erased.get(signature)? {
            ErasureKind::OneCollectionParameter => SpecialSignatureInfo::OneCollectionParameter,
            ErasureKind::ObjectParameter(DefaultValue::Null) => SpecialSignatureInfo::ObjectParameterGeneric,
            ErasureKind::ObjectParameter(_) => SpecialSignatureInfo::ObjectParameterNonGeneric,
        })
    }

    /// Fallback result of an erased-parameter member.
    pub fn default_value(&self, signature: &str) -> Option<DefaultValue> {
        match self.erased.get(signature)? {
            ErasureKind::ObjectParameter(value) => Some(*value),
            ErasureKind::OneCollectionParameter => None,
        }
    }

    /// `removeAt(Int)` must not be confused with `remove(E)`: true only for
    /// the logical `removeAt` whose erased descriptor takes an index.
    pub fn is_remove_at_by_index(&self, name: &str, descriptor: &str) -> bool {
        name == "removeAt"
            && self
                .renamed_by_builtin
                .values()
                .flatten()
                .any(|method| method.name == name && method.descriptor == descriptor)
    }
}

static STANDARD: Lazy<Arc<BuiltinMemberTables>> =
    Lazy::new(|| Arc::new(BuiltinMemberTables::compile(&BuiltinMemberCatalog::default())));

#[cfg(test)]
#[path = "../tests/builtin_members_tests.rs"]
mod tests;
