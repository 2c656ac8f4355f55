//! Stable identifiers for simulation objects.
//!
//! Audio triggers that are limited per object need an identity that survives
//! for the lifetime of the object and is never confused with a later object
//! occupying the same storage slot. [`ObjectId`] pairs a slot index with a
//! generation counter that the [`ObjectIdAllocator`] bumps on every release.

use serde::{Deserialize, Serialize};

/// Identity of a simulation object (unit, building, vessel...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Creates an object ID from its raw parts.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this ID was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Packs the ID into a single `u64` (generation in the high half).
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Unpacks an ID produced by [`ObjectId::to_bits`].
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

/// Issues [`ObjectId`]s and recycles released slots with a new generation.
#[derive(Debug, Default)]
pub struct ObjectIdAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: Vec<u32>,
}

impl ObjectIdAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generations: Vec::new(),
            live: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Issues a fresh identity.
    pub fn allocate(&mut self) -> ObjectId {
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.live[slot] = true;
            return ObjectId::new(index, self.generations[slot]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        ObjectId::new(index, 0)
    }

    /// Releases an identity. Stale or unknown IDs are ignored.
    ///
    /// Returns `true` if the ID was live.
    pub fn release(&mut self, id: ObjectId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        let slot = id.index as usize;
        self.live[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(id.index);
        true
    }

    /// Checks whether an ID still refers to a live object.
    #[must_use]
    pub fn is_live(&self, id: ObjectId) -> bool {
        let slot = id.index as usize;
        slot < self.generations.len() && self.live[slot] && self.generations[slot] == id.generation
    }

    /// Number of live identities.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|live| **live).count()
    }
}
