//! Shared fixtures for the facade and router tests.

use skirmish_common::ManualClock;
use skirmish_gameplay::{EvaVoice, Faction, MusicTrack, SoundEffect, UnitVoice};
use skirmish_kernel::{encode_raw_pcm16, HeadlessMixer, MemoryAssets};

use crate::audio_system::AudioSystem;
use crate::config::AudioSystemConfig;

/// One-second mono clip.
pub(crate) fn clip() -> Vec<u8> {
    encode_raw_pcm16(22050, 1, &[200; 22050])
}

/// Every catalog file, each holding [`clip`].
pub(crate) fn full_assets() -> MemoryAssets {
    let mut assets = MemoryAssets::new();
    for effect in SoundEffect::ALL {
        assets.insert(effect.filename(), clip());
    }
    for track in MusicTrack::ALL {
        assets.insert(track.filename(), clip());
    }
    for voice in EvaVoice::ALL {
        assets.insert(voice.filename(), clip());
    }
    for voice in UnitVoice::ALL {
        for faction in [Faction::Neutral, Faction::Soviet] {
            assets.insert(voice.filename_for(faction), clip());
        }
    }
    assets
}

pub(crate) struct Rig {
    pub system: AudioSystem,
    pub mixer: HeadlessMixer,
    pub clock: ManualClock,
}

/// A system on a headless mixer and a manual clock starting at 10 s.
pub(crate) fn rig(config: AudioSystemConfig) -> Rig {
    let mixer = HeadlessMixer::new();
    let clock = ManualClock::new(10_000);
    let system = AudioSystem::new(
        config,
        Box::new(mixer.clone()),
        Box::new(full_assets()),
        Box::new(clock.clone()),
    )
    .unwrap();
    Rig {
        system,
        mixer,
        clock,
    }
}
