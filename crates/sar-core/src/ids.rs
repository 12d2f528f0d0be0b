//! Strongly typed, zero-cost identifier wrappers.
//!
//! Agents and world entities never hold references to each other; every
//! cross-link (claim holder, designated target, current target) is one of
//! these ids resolved through a registry or port lookup.

use std::fmt;

/// Declares a `u32` id newtype.  `$label` prefixes the `Display` form
/// (`agent#7`).
macro_rules! typed_id {
    ($(#[$attr:meta])* $name:ident, $label:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Never handed out; `Default` yields it.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A search agent (drone) in the fleet.
    AgentId, "agent"
}

typed_id! {
    /// Any world entity an agent can perceive, claim or collide with.
    EntityId, "entity"
}

impl EntityId {
    /// Static scene geometry (walls, terrain).  Reported by raycasts that hit
    /// something that is not a spawned entity.
    pub const TERRAIN: EntityId = EntityId(u32::MAX - 1);
}
