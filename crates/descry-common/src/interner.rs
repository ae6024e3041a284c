//! Sharded string interner for names.
//!
//! Simple names, package segments and member names are interned once and
//! handled as `u32` [`Atom`]s afterwards, so comparing two names is an
//! integer comparison. Workers resolving unrelated symbols hash to different
//! shards and rarely wait on each other.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Interned string handle. The low [`SHARD_BITS`] select the shard, the
/// remaining bits the slot inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

const SHARD_BITS: u32 = 6;
const SHARDS: usize = 1 << SHARD_BITS;
const MAX_SLOT: u32 = u32::MAX >> SHARD_BITS;

impl Atom {
    /// The empty string.
    pub const NONE: Atom = Atom(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn index(self) -> u32 {
        self.0
    }

    fn pack(shard: usize, slot: u32) -> Atom {
        Atom((slot << SHARD_BITS) | shard as u32)
    }

    fn shard(self) -> usize {
        (self.0 & (SHARDS as u32 - 1)) as usize
    }

    fn slot(self) -> usize {
        (self.0 >> SHARD_BITS) as usize
    }
}

/// Names nearly every session resolves: built-in packages and classes, and
/// the members the remap tables mention.
const COMMON_NAMES: &[&str] = &[
    "kotlin", "collections", "java", "lang", "util", "Any", "Nothing", "Unit", "String", "Object",
    "Enum", "Array", "List", "MutableList", "Collection", "Map", "Set", "size", "length", "name",
    "ordinal", "keys", "values", "entries", "keySet", "entrySet", "valueOf", "remove", "removeAt",
    "contains", "containsKey", "containsValue", "get", "indexOf", "lastIndexOf", "charAt", "value",
    "<init>", "<root>",
];

#[derive(Default)]
struct Shard {
    atoms: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

impl Shard {
    /// `None` once the shard has no slots left.
    fn insert(&mut self, index: usize, text: &str) -> Option<Atom> {
        let slot = u32::try_from(self.strings.len()).ok().filter(|&slot| slot <= MAX_SLOT)?;
        let atom = Atom::pack(index, slot);
        let text: Arc<str> = Arc::from(text);
        self.strings.push(Arc::clone(&text));
        self.atoms.insert(text, atom);
        Some(atom)
    }
}

pub struct ShardedInterner {
    shards: [RwLock<Shard>; SHARDS],
}

impl ShardedInterner {
    /// The empty string occupies slot 0 of shard 0, so it is [`Atom::NONE`].
    pub fn new() -> Self {
        let shards: [RwLock<Shard>; SHARDS] = std::array::from_fn(|_| RwLock::new(Shard::default()));
        shards[0].write().insert(0, "");
        ShardedInterner { shards }
    }

    pub fn intern(&self, text: &str) -> Atom {
        if text.is_empty() {
            return Atom::NONE;
        }
        let index = shard_of(text);
        if let Some(&atom) = self.shards[index].read().atoms.get(text) {
            return atom;
        }
        let mut shard = self.shards[index].write();
        if let Some(&atom) = shard.atoms.get(text) {
            return atom;
        }
        // A full shard degrades to the empty name.
        shard.insert(index, text).unwrap_or(Atom::NONE)
    }

    /// The text of `atom`, or `""` for atoms from another interner.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        self.shards
            .get(atom.shard())?
            .read()
            .strings
            .get(atom.slot())
            .cloned()
    }

    /// Interned strings, the empty string included.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().strings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    pub fn intern_common(&self) {
        for name in COMMON_NAMES {
            self.intern(name);
        }
    }
}

fn shard_of(text: &str) -> usize {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish() as usize % SHARDS
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
