//! Bounded callback registry.
//!
//! Script functions handed to the host cross the boundary as compact
//! integer handles. The registry pins each function for the handle's
//! lifetime and validates every lookup, so a stale or fabricated handle
//! can never reach a dangling function.

use tether_interop::{BridgeError, CallbackHandle};

use crate::value::ScriptFunction;

/// Default slot capacity, matching the handle encoding's index space.
pub const DEFAULT_CAPACITY: usize = CallbackHandle::MAX_SLOTS;

/// Storage for script functions exported to the host by handle.
pub trait CallbackRegistry {
    /// Pin `func` and mint a handle for it. Fails with
    /// [`BridgeError::TableFull`] when every slot is live.
    fn register(&mut self, func: ScriptFunction) -> Result<CallbackHandle, BridgeError>;

    /// Release the slot named by `handle`. Returns `false` if the handle
    /// is stale or was never issued; releasing twice is not an error.
    fn unregister(&mut self, handle: CallbackHandle) -> bool;

    /// Resolve a handle to its pinned function.
    fn lookup(&self, handle: CallbackHandle) -> Result<ScriptFunction, BridgeError>;

    /// Drop every pinned function. Outstanding handles become stale.
    fn teardown(&mut self);

    /// Number of currently occupied slots.
    fn live_count(&self) -> usize;

    /// Total slot capacity.
    fn capacity(&self) -> usize;
}

enum Slot {
    Vacant { generation: u32 },
    Occupied { generation: u32, func: ScriptFunction },
}

impl Slot {
    fn generation(&self) -> u32 {
        match self {
            Slot::Vacant { generation } | Slot::Occupied { generation, .. } => *generation,
        }
    }
}

/// Fixed-capacity slot table with index reuse.
///
/// Freed indices go on a stack and are handed out again before the table
/// grows toward its capacity. Each reuse bumps the slot's generation, so
/// handles minted for a previous occupant fail validation instead of
/// silently resolving to the new one.
pub struct SlotTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    capacity: usize,
    live: usize,
}

impl SlotTable {
    /// Create a table with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a table bounded at `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(CallbackHandle::MAX_SLOTS).max(1);
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            capacity,
            live: 0,
        }
    }

    fn slot(&self, handle: CallbackHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation() == handle.generation())
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry for SlotTable {
    fn register(&mut self, func: ScriptFunction) -> Result<CallbackHandle, BridgeError> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = slot.generation();
            *slot = Slot::Occupied { generation, func };
            self.live += 1;
            return Ok(CallbackHandle::new(index, generation));
        }
        if self.slots.len() >= self.capacity {
            return Err(BridgeError::TableFull {
                capacity: self.capacity,
            });
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied { generation: 0, func });
        self.live += 1;
        Ok(CallbackHandle::new(index, 0))
    }

    fn unregister(&mut self, handle: CallbackHandle) -> bool {
        let index = handle.index() as usize;
        match self.slots.get_mut(index) {
            Some(slot) => match slot {
                Slot::Occupied { generation, .. } if *generation == handle.generation() => {
                    let next = CallbackHandle::next_generation(handle.generation());
                    *slot = Slot::Vacant { generation: next };
                    self.free.push(index as u32);
                    self.live -= 1;
                    true
                }
                _ => false,
            },
            None => false,
        }
    }

    fn lookup(&self, handle: CallbackHandle) -> Result<ScriptFunction, BridgeError> {
        match self.slot(handle) {
            Some(Slot::Occupied { func, .. }) => Ok(func.clone()),
            // Current generation but vacant: the handle was valid once and
            // the slot has not been reissued, so the caller unregistered it.
            Some(Slot::Vacant { .. }) => Err(BridgeError::NotFunction),
            None => Err(BridgeError::InvalidHandle(handle.to_raw())),
        }
    }

    fn teardown(&mut self) {
        // Slots stay allocated with bumped generations so handles minted
        // before teardown can never alias ones minted after.
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Slot::Occupied { generation, .. } = slot {
                *slot = Slot::Vacant {
                    generation: CallbackHandle::next_generation(*generation),
                };
            }
            self.free.push(index as u32);
        }
        self.live = 0;
    }

    fn live_count(&self) -> usize {
        self.live
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
