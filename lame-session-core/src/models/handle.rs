use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a live session in a [`SessionRegistry`].
///
/// Packs a slot index (low 32 bits) and the slot's generation (high 32
/// bits). Slots are recycled, generations are not, so a handle value is
/// issued at most once per registry.
///
/// [`SessionRegistry`]: crate::session::registry::SessionRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self((u64::from(generation) << 32) | u64::from(index))
    }

    /// Rebuild a handle from a value previously obtained via [`as_raw`](Self::as_raw).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub(crate) fn index(self) -> u32 {
        (self.0 & u64::from(u32::MAX)) as u32
    }

    pub(crate) fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index(), self.generation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_index_and_generation() {
        let handle = SessionHandle::new(7, 3);
        assert_eq!(handle.index(), 7);
        assert_eq!(handle.generation(), 3);
        assert_eq!(SessionHandle::from_raw(handle.as_raw()), handle);
        assert_eq!(handle.to_string(), "#7.3");
    }

    #[test]
    fn same_slot_different_generation_differs() {
        assert_ne!(SessionHandle::new(0, 1), SessionHandle::new(0, 2));
    }
}
