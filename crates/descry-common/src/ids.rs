//! Arena identities shared by the type solver and the resolver.

use serde::Serialize;

// =============================================================================
// DescriptorId - Arena-Owned Descriptor Identifier
// =============================================================================

/// Index of a descriptor in the resolver's descriptor arena.
///
/// Descriptors reference each other (container back-references, type
/// constructor declarations) through this id rather than through owning
/// pointers, so cyclic class hierarchies never form ownership cycles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DescriptorId(pub u32);

impl DescriptorId {
    /// Sentinel value for invalid `DescriptorId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DescriptorId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}
