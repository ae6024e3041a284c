//! Descriptor arena.
//!
//! Every descriptor produced by one resolver lives here, addressed by a
//! [`DescriptorId`]. The store is append-only: ids are allocated atomically
//! and stay valid for the resolver's lifetime, so concurrent readers never
//! see an entry disappear.

use crate::class::LazyClassDescriptor;
use crate::descriptors::{
    Descriptor, FunctionDescriptor, PackageFragmentDescriptor, PropertyDescriptor,
};
use crate::module::ModuleDescriptor;
use dashmap::DashMap;
use descry_common::DescriptorId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::trace;

/// Global counter for assigning unique instance IDs to `DescriptorStore`
/// instances. Shows up in trace output when several resolvers coexist.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Thread-safe storage for descriptors.
pub struct DescriptorStore {
    instance_id: u64,
    descriptors: DashMap<DescriptorId, Descriptor>,
    next_id: AtomicU32,
}

impl Default for DescriptorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorStore {
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DescriptorStore::new");
        Self {
            instance_id,
            descriptors: DashMap::new(),
            next_id: AtomicU32::new(DescriptorId::FIRST_VALID),
        }
    }

    fn allocate(&self) -> DescriptorId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        DescriptorId(id)
    }

    /// Allocate an id and store the descriptor `build` makes for it.
    ///
    /// `build` runs before the entry is visible; it must not look the new id
    /// up.
    pub fn register(&self, build: impl FnOnce(DescriptorId) -> Descriptor) -> DescriptorId {
        let id = self.allocate();
        let descriptor = build(id);
        trace!(
            instance_id = self.instance_id,
            descriptor_id = id.0,
            kind = descriptor.kind_name(),
            name = %descriptor.name(),
            "DescriptorStore::register"
        );
        self.descriptors.insert(id, descriptor);
        id
    }

    /// The descriptor for `id`. The shard guard is released before returning.
    pub fn get(&self, id: DescriptorId) -> Option<Descriptor> {
        self.descriptors.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: DescriptorId) -> bool {
        self.descriptors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn module(&self, id: DescriptorId) -> Option<Arc<ModuleDescriptor>> {
        match self.get(id)? {
            Descriptor::Module(module) => Some(module),
            _ => None,
        }
    }

    pub fn package_fragment(&self, id: DescriptorId) -> Option<Arc<PackageFragmentDescriptor>> {
        match self.get(id)? {
            Descriptor::PackageFragment(fragment) => Some(fragment),
            _ => None,
        }
    }

    pub fn class(&self, id: DescriptorId) -> Option<Arc<LazyClassDescriptor>> {
        match self.get(id)? {
            Descriptor::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn function(&self, id: DescriptorId) -> Option<Arc<FunctionDescriptor>> {
        match self.get(id)? {
            Descriptor::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn property(&self, id: DescriptorId) -> Option<Arc<PropertyDescriptor>> {
        match self.get(id)? {
            Descriptor::Property(property) => Some(property),
            _ => None,
        }
    }
}
