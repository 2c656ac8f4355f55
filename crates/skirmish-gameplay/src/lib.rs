//! # Skirmish Gameplay
//!
//! Audio arbitration for the Skirmish audio subsystem.
//!
//! This crate decides what gets played and when:
//! - Rate limiting of gameplay triggers (global, per cell, per object)
//! - Static catalogs for effects, music, announcer and unit voices
//! - The sound bank with concurrency caps and positional attenuation
//! - The music player state machine with fades and shuffle
//! - The voice arbiter with announcer preemption and queueing
//!
//! Every manager is a plain struct driven from the caller's frame loop. Calls
//! that touch audio take an [`AudioContext`](skirmish_kernel::AudioContext)
//! carrying the mixer, the asset source and the current tick.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod audio_events;
pub mod music;
pub mod rate_limiter;
pub mod sound_effects;
pub mod sound_manager;
pub mod voice;
pub mod voice_arbiter;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::audio_events::*;
    pub use crate::music::*;
    pub use crate::rate_limiter::*;
    pub use crate::sound_effects::*;
    pub use crate::sound_manager::*;
    pub use crate::voice::*;
    pub use crate::voice_arbiter::*;
}

pub use prelude::*;

use skirmish_common::ConfigResult;

/// Checks every static catalog. Run once at startup.
pub fn validate_catalogs() -> ConfigResult<()> {
    validate_effect_catalog()?;
    validate_track_catalog()?;
    validate_voice_catalogs()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_common::{CellCoord, ManualClock, Clock};

    #[test]
    fn test_catalogs_validate() {
        assert!(validate_catalogs().is_ok());
    }

    #[test]
    fn test_cells_do_not_block_each_other() {
        let clock = ManualClock::new(5_000);
        let mut limiter = default_rate_limiter();
        let now = clock.now_ms();
        assert!(limiter.can_fire_at_position(AudioEventType::ExplosionLarge, CellCoord::new(1, 1), now));
        assert!(limiter.can_fire_at_position(AudioEventType::ExplosionLarge, CellCoord::new(9, 9), now));
        assert!(!limiter.can_fire_at_position(AudioEventType::ExplosionLarge, CellCoord::new(1, 1), now));
    }
}
