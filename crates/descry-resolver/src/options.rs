//! Resolver configuration.
//!
//! Everything host-specific lives here as data: which host classes stand for
//! which built-ins, which host collections purely implement a mutable
//! built-in interface, and the member remap catalogue. The defaults describe
//! the JVM standard library.

use crate::builtin_members::BuiltinMemberCatalog;
use descry_solver::BuiltinClass;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid resolver options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown built-in class `{0}`")]
    UnknownBuiltin(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Approximate captured types produced for contravariant positions when
    /// substituting into member types.
    pub approximate_contravariant_captured: bool,

    /// Built-in interface (qualified name) to the host classes that purely
    /// implement it. Consulted when a class carries no `PurelyImplements`
    /// annotation.
    pub pure_implementations: IndexMap<String, Vec<String>>,

    /// Host class (binary name) to the built-in class it is loaded as.
    pub host_classes: IndexMap<String, String>,

    pub builtin_members: BuiltinMemberCatalog,
}

fn table(entries: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(key, values)| {
            (
                key.to_string(),
                values.iter().map(|value| value.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for ResolverOptions {
    fn default() -> Self {
        let pure_implementations = table(&[
            (
                "kotlin.collections.MutableList",
                &["java.util.ArrayList", "java.util.LinkedList"],
            ),
            (
                "kotlin.collections.MutableSet",
                &["java.util.HashSet", "java.util.TreeSet", "java.util.LinkedHashSet"],
            ),
            (
                "kotlin.collections.MutableMap",
                &[
                    "java.util.HashMap",
                    "java.util.TreeMap",
                    "java.util.LinkedHashMap",
                    "java.util.concurrent.ConcurrentHashMap",
                    "java.util.concurrent.ConcurrentSkipListMap",
                ],
            ),
        ]);

        let host_classes = [
            ("java.lang.Object", "kotlin.Any"),
            ("java.lang.String", "kotlin.String"),
            ("java.lang.CharSequence", "kotlin.CharSequence"),
            ("java.lang.Throwable", "kotlin.Throwable"),
            ("java.lang.Cloneable", "kotlin.Cloneable"),
            ("java.lang.Number", "kotlin.Number"),
            ("java.lang.Comparable", "kotlin.Comparable"),
            ("java.lang.Enum", "kotlin.Enum"),
            ("java.lang.annotation.Annotation", "kotlin.Annotation"),
            ("java.lang.Boolean", "kotlin.Boolean"),
            ("java.lang.Character", "kotlin.Char"),
            ("java.lang.Byte", "kotlin.Byte"),
            ("java.lang.Short", "kotlin.Short"),
            ("java.lang.Integer", "kotlin.Int"),
            ("java.lang.Float", "kotlin.Float"),
            ("java.lang.Long", "kotlin.Long"),
            ("java.lang.Double", "kotlin.Double"),
            ("java.lang.Iterable", "kotlin.collections.MutableIterable"),
            ("java.util.Collection", "kotlin.collections.MutableCollection"),
            ("java.util.List", "kotlin.collections.MutableList"),
            ("java.util.Set", "kotlin.collections.MutableSet"),
            ("java.util.Map", "kotlin.collections.MutableMap"),
        ]
        .into_iter()
        .map(|(host, builtin)| (host.to_string(), builtin.to_string()))
        .collect();

        ResolverOptions {
            approximate_contravariant_captured: false,
            pure_implementations,
            host_classes,
            builtin_members: BuiltinMemberCatalog::default(),
        }
    }
}

impl ResolverOptions {
    /// Parse options from JSON. Omitted fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let options: ResolverOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Every built-in named by the tables must exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = self
            .pure_implementations
            .keys()
            .chain(self.host_classes.values());
        for name in named {
            if BuiltinClass::from_fq_name(name).is_none() {
                return Err(ConfigError::UnknownBuiltin(name.clone()));
            }
        }
        Ok(())
    }

    /// Built-in that `host_class` is loaded as, if any.
    pub fn builtin_for_host_class(&self, host_class: &str) -> Option<BuiltinClass> {
        self.host_classes
            .get(host_class)
            .and_then(|name| BuiltinClass::from_fq_name(name))
    }

    /// Built-in interface purely implemented by `host_class`, from the
    /// fallback table.
    pub fn pure_implementation_of(&self, host_class: &str) -> Option<&str> {
        self.pure_implementations
            .iter()
            .find(|(_, classes)| classes.iter().any(|class| class == host_class))
            .map(|(builtin, _)| builtin.as_str())
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
