//! # Skirmish Common
//!
//! Common types shared by every Skirmish audio crate.
//!
//! This crate provides the leaf types the rest of the workspace builds on:
//! - World and cell coordinate types
//! - Stable object identities (index + generation)
//! - The millisecond tick clock and wrap-tolerant cooldown arithmetic
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod time;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::time::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_to_cell_conversion() {
        let world = WorldPoint::new(100, 200);
        assert_eq!(world.to_cell(TILE_PIXEL_SIZE), CellCoord::new(4, 8));
    }

    #[test]
    fn test_object_ids_are_distinct() {
        let mut ids = ObjectIdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_manual_clock_drives_cooldowns() {
        let clock = ManualClock::new(0);
        let last = clock.now_ms();
        clock.advance(99);
        assert!(!cooldown_satisfied(clock.now_ms(), last, 100));
        clock.advance(1);
        assert!(cooldown_satisfied(clock.now_ms(), last, 100));
    }
}
