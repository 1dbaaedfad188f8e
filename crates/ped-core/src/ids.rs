//! Handles for entities held by a scene.
//!
//! A handle is the slot number of its entity in the owning arena.  Arenas
//! only ever append slots, so a handle is never reused after its entity is
//! removed and a stale handle simply fails to resolve.

use std::fmt;

macro_rules! handle {
    ($(#[$attr:meta])* $name:ident, $label:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u32);

        impl $name {
            /// Not attached to any scene.
            pub const INVALID: $name = $name(u32::MAX);

            /// Handle for arena slot `slot`.
            ///
            /// # Panics
            /// If `slot` does not fit in 32 bits.
            #[inline]
            pub fn from_slot(slot: usize) -> Self {
                match u32::try_from(slot) {
                    Ok(n) if n != u32::MAX => $name(n),
                    _ => panic!(concat!($label, " arena overflow at slot {}"), slot),
                }
            }

            /// Arena slot this handle names.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if *self == Self::INVALID {
                    f.write_str(concat!($label, " (detached)"))
                } else {
                    write!(f, concat!($label, " #{}"), self.0)
                }
            }
        }
    };
}

handle!(
    /// Agent held by a scene.  Also the id streamed to viewers.
    AgentId,
    "agent"
);

handle!(
    /// Obstacle held by a scene.
    ObstacleId,
    "obstacle"
);
