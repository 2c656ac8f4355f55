//! # Skirmish Engine
//!
//! The audio facade the game talks to.
//!
//! This crate ties the lower layers together:
//! - Kernel: AUD decoding, mixers, asset sources
//! - Gameplay: rate limiting, sound bank, music, voices
//!
//! [`AudioSystem`] owns the collaborators and every manager and is driven by
//! one [`AudioSystem::update`] per frame. [`EventRouter`] sits on top and
//! turns gameplay triggers into rate-limited playback.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

/// Audio facade over the mixer, the managers and the volume channels
pub mod audio_system;
/// TOML configuration for the whole audio subsystem
pub mod config;
/// Gameplay trigger to sound mapping
pub mod event_router;

#[cfg(test)]
mod test_support;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::audio_system::*;
    pub use crate::config::*;
    pub use crate::event_router::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_gameplay::AudioEventType;

    #[test]
    fn test_router_over_default_config() {
        let rig = test_support::rig(AudioSystemConfig::default());
        let mut router = EventRouter::new(rig.system);
        router.ui_click();
        router.update();
        assert_eq!(router.stats().triggered, 1);
        assert_eq!(
            router.system().limiter().profile(AudioEventType::UiClick).global_ms,
            50
        );
    }
}
