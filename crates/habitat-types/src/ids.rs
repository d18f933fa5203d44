//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Workers, missions, and projects carry strongly-typed IDs so they cannot
//! be mixed up at compile time. IDs use UUID v7 (time-ordered), which keeps
//! `BTreeMap`s keyed by them in creation order -- iteration order over the
//! colony is therefore stable within a run and across a save/restore.
//!
//! Identifiers local to one owner (shift slots, project steps, pulse
//! listeners) are plain sequence numbers defined next to their owner.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a worker (person or robot) in the colony.
    WorkerId
}

define_id! {
    /// Unique identifier for a mission a worker can be a member of.
    MissionId
}

define_id! {
    /// Unique identifier for a staged project (construction, salvage, ...).
    ProjectId
}
