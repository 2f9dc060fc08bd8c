//! Typed identifiers.
//!
//! `AgentId(i)` is the index of agent `i` in every `AgentStore` array and in
//! the per-tick decision vector; prefer `.index()` over `.0 as usize`.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $name:ident($inner:ty)) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub $inner);

        impl $name {
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id!(
    /// Index of an agent in SoA storage.
    AgentId(u32)
);

typed_id!(
    /// Scenario group tag (e.g. the four arms of a scramble crossing).
    /// Carried through to output; never read by the controller.
    GroupId(u16)
);
