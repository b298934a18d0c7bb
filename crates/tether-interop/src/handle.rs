//! Generation-tagged callback handles.
//!
//! A handle pairs a slot index with the slot's generation counter at
//! registration time. Unregistering a slot bumps its generation, so a raw
//! handle kept around after its slot was reused no longer matches and is
//! rejected instead of silently hitting the new occupant.
//!
//! The raw form packs both fields into a non-negative `i32` so script code
//! can carry handles as plain numbers: the low [`CallbackHandle::INDEX_BITS`]
//! bits hold the index, the remaining bits the (wrapping) generation.

/// A generation-tagged index into the callback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle {
    index: u32,
    generation: u32,
}

impl CallbackHandle {
    /// Bits of the raw form used for the slot index.
    pub const INDEX_BITS: u32 = 12;

    /// Maximum number of addressable slots (4096 in the reference sizing).
    pub const MAX_SLOTS: usize = 1 << Self::INDEX_BITS;

    const INDEX_MASK: u32 = (1 << Self::INDEX_BITS) - 1;
    // The sign bit stays clear so raw handles are always non-negative.
    const GENERATION_MASK: u32 = (1 << (31 - Self::INDEX_BITS)) - 1;

    /// Build a handle; both fields are masked to their packed widths.
    pub fn new(index: u32, generation: u32) -> Self {
        Self {
            index: index & Self::INDEX_MASK,
            generation: generation & Self::GENERATION_MASK,
        }
    }

    /// The slot index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation the slot had when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack into the non-negative raw form carried by script code.
    pub fn to_raw(&self) -> i32 {
        ((self.generation << Self::INDEX_BITS) | self.index) as i32
    }

    /// Unpack a raw handle. Negative values are never valid handles.
    pub fn from_raw(raw: i32) -> Option<Self> {
        if raw < 0 {
            return None;
        }
        let raw = raw as u32;
        Some(Self {
            index: raw & Self::INDEX_MASK,
            generation: (raw >> Self::INDEX_BITS) & Self::GENERATION_MASK,
        })
    }

    /// The generation value following `generation`, wrapping at the packed
    /// width.
    pub fn next_generation(generation: u32) -> u32 {
        (generation + 1) & Self::GENERATION_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip() {
        let handle = CallbackHandle::new(37, 5);
        let raw = handle.to_raw();
        assert!(raw >= 0);
        assert_eq!(CallbackHandle::from_raw(raw), Some(handle));
    }

    #[test]
    fn zeroth_handle_is_raw_zero() {
        assert_eq!(CallbackHandle::new(0, 0).to_raw(), 0);
    }

    #[test]
    fn negative_raw_is_rejected() {
        assert_eq!(CallbackHandle::from_raw(-1), None);
        assert_eq!(CallbackHandle::from_raw(i32::MIN), None);
    }

    #[test]
    fn generation_wraps_at_packed_width() {
        let top = (1 << (31 - CallbackHandle::INDEX_BITS)) - 1;
        assert_eq!(CallbackHandle::next_generation(top), 0);
        assert_eq!(CallbackHandle::next_generation(0), 1);
    }

    #[test]
    fn distinct_generations_differ_in_raw_form() {
        let first = CallbackHandle::new(3, 0);
        let reused = CallbackHandle::new(3, 1);
        assert_ne!(first.to_raw(), reused.to_raw());
        assert_eq!(first.index(), reused.index());
    }
}
