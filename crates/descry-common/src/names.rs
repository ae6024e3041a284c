//! Simple names, qualified names and class identities.
//!
//! All names are interned in one process-wide [`ShardedInterner`], so a
//! [`Name`] is a `Copy` handle that compares in O(1) no matter which module or
//! worker thread produced it.

use crate::interner::{Atom, ShardedInterner};
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

static NAME_TABLE: Lazy<ShardedInterner> = Lazy::new(|| {
    let interner = ShardedInterner::new();
    interner.intern_common();
    interner
});

// =============================================================================
// Name
// =============================================================================

/// An interned simple name.
///
/// Special names are wrapped in angle brackets (`<root>`, `<init>`,
/// `<my-module>`) and can never collide with identifiers from user code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name(Atom);

impl Name {
    pub fn identifier(text: &str) -> Self {
        Name(NAME_TABLE.intern(text))
    }

    /// Intern a special name. `text` must already carry its angle brackets.
    pub fn special(text: &str) -> Option<Self> {
        (text.len() > 2 && text.starts_with('<') && text.ends_with('>'))
            .then(|| Name(NAME_TABLE.intern(text)))
    }

    /// Identifier or special name, decided by the text itself.
    pub fn guess(text: &str) -> Self {
        Name(NAME_TABLE.intern(text))
    }

    pub fn init() -> Self {
        Name(NAME_TABLE.intern("<init>"))
    }

    #[inline]
    pub fn atom(self) -> Atom {
        self.0
    }

    pub fn as_str(self) -> Arc<str> {
        NAME_TABLE.resolve(self.0)
    }

    pub fn is_special(self) -> bool {
        let text = self.as_str();
        text.starts_with('<') && text.ends_with('>')
    }

    pub fn is_empty(self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.as_str())
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

// =============================================================================
// FqName
// =============================================================================

/// A dot-separated qualified name (`kotlin.collections.List`).
///
/// The root package is the empty segment list.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FqName {
    segments: Arc<[Name]>,
}

impl FqName {
    pub fn root() -> Self {
        FqName::default()
    }

    /// Parse `a.b.C`. Empty segments are skipped, so `""` is the root.
    pub fn parse(text: &str) -> Self {
        let segments: SmallVec<[Name; 8]> = text
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(Name::guess)
            .collect();
        FqName {
            segments: Arc::from(segments.as_slice()),
        }
    }

    pub fn from_segments(segments: &[Name]) -> Self {
        FqName {
            segments: Arc::from(segments),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    pub fn child(&self, name: Name) -> Self {
        let mut segments: SmallVec<[Name; 8]> = SmallVec::from_slice(&self.segments);
        segments.push(name);
        FqName::from_segments(&segments)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(FqName::from_segments(rest))
    }

    /// Last segment; the root has none.
    pub fn short_name(&self) -> Option<Name> {
        self.segments.last().copied()
    }

    /// Segment-wise prefix test: `kotlin.collections` starts with `kotlin`,
    /// `kotlinx` does not.
    pub fn starts_with(&self, prefix: &FqName) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    pub fn as_string(&self) -> String {
        self.join('.')
    }

    /// Host internal form (`java/util/List`).
    pub fn internal_name(&self) -> String {
        self.join('/')
    }

    fn join(&self, separator: char) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(&segment.as_str());
        }
        out
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        f.write_str(&self.as_string())
    }
}

impl fmt::Debug for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FqName({self})")
    }
}

impl Serialize for FqName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

/// Whether `text` is a syntactically valid dot-separated host identifier path.
pub fn is_valid_host_fq_name(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    text.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
                chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            }
            _ => false,
        }
    })
}

// =============================================================================
// ClassId
// =============================================================================

/// Identity of a (possibly nested) class: its package plus the dotted path of
/// class names inside that package.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId {
    package: FqName,
    relative: FqName,
}

impl ClassId {
    pub fn new(package: FqName, relative: FqName) -> Self {
        ClassId { package, relative }
    }

    pub fn top_level(fq_name: &FqName) -> Self {
        let package = fq_name.parent().unwrap_or_default();
        let relative = fq_name
            .short_name()
            .map(|name| FqName::from_segments(&[name]))
            .unwrap_or_default();
        ClassId { package, relative }
    }

    /// Parse the serialized form `org/sample/Outer.Inner`.
    pub fn from_string(text: &str) -> Self {
        match text.rsplit_once('/') {
            Some((package, relative)) => ClassId {
                package: FqName::parse(&package.replace('/', ".")),
                relative: FqName::parse(relative),
            },
            None => ClassId {
                package: FqName::root(),
                relative: FqName::parse(text),
            },
        }
    }

    /// Parse a reflective binary name (`org.sample.Outer$Inner`).
    pub fn from_binary_name(text: &str) -> Self {
        let (package, relative) = match text.rsplit_once('.') {
            Some((package, relative)) => (FqName::parse(package), relative),
            None => (FqName::root(), text),
        };
        ClassId {
            package,
            relative: FqName::parse(&relative.replace('$', ".")),
        }
    }

    pub fn package(&self) -> &FqName {
        &self.package
    }

    pub fn relative_class_name(&self) -> &FqName {
        &self.relative
    }

    pub fn short_class_name(&self) -> Name {
        self.relative.short_name().unwrap_or_default()
    }

    pub fn is_nested(&self) -> bool {
        self.relative.segments().len() > 1
    }

    pub fn outer_class_id(&self) -> Option<ClassId> {
        if !self.is_nested() {
            return None;
        }
        Some(ClassId {
            package: self.package.clone(),
            relative: self.relative.parent()?,
        })
    }

    pub fn nested(&self, name: Name) -> ClassId {
        ClassId {
            package: self.package.clone(),
            relative: self.relative.child(name),
        }
    }

    pub fn as_single_fq_name(&self) -> FqName {
        let mut segments: SmallVec<[Name; 8]> = SmallVec::from_slice(self.package.segments());
        segments.extend_from_slice(self.relative.segments());
        FqName::from_segments(&segments)
    }

    /// Name as the reflective class loader knows it: nested classes are
    /// joined with `$` (`org.sample.Outer$Inner`).
    pub fn binary_name(&self) -> String {
        let mut out = self.package.as_string();
        if !out.is_empty() {
            out.push('.');
        }
        let relative: Vec<String> = self
            .relative
            .segments()
            .iter()
            .map(|segment| segment.as_str().to_string())
            .collect();
        out.push_str(&relative.join("$"));
        out
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.package.internal_name(),
            self.relative.as_string()
        )
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({self})")
    }
}

#[cfg(test)]
#[path = "../tests/names_tests.rs"]
mod tests;
