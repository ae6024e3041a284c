//! Provenance markers.

use serde::Serialize;

/// Which metadata unit a descriptor came from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceElement {
    #[default]
    NoSource,
    /// A class loaded through reflection, by binary name.
    ReflectClass { binary_name: String },
    /// A compiled package part (`org/sample/UtilsKt`), with the host-visible
    /// facade it was merged into, if any.
    PackagePart {
        class_name: String,
        facade: Option<String>,
    },
}

impl SourceElement {
    pub fn package_part(class_name: &str, facade: Option<&str>) -> Self {
        SourceElement::PackagePart {
            class_name: class_name.to_string(),
            facade: facade.map(str::to_string),
        }
    }

    /// Simple name of the compiled unit (`UtilsKt`).
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            SourceElement::NoSource => None,
            SourceElement::ReflectClass { binary_name } => Some(after_last(binary_name, '.')),
            SourceElement::PackagePart { class_name, .. } => Some(after_last(class_name, '/')),
        }
    }

    /// Simple name of the container the host sees: the facade if one exists,
    /// otherwise the unit itself.
    pub fn host_container_name(&self) -> Option<&str> {
        match self {
            SourceElement::PackagePart {
                facade: Some(facade),
                ..
            } => Some(after_last(facade, '/')),
            other => other.simple_name(),
        }
    }
}

fn after_last(text: &str, separator: char) -> &str {
    text.rsplit(separator).next().unwrap_or(text)
}
