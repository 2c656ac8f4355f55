//! # Skirmish Kernel
//!
//! Low-level audio plumbing for the Skirmish audio subsystem.
//!
//! This crate provides:
//! - The AUD container parser and its three payload decoders
//!   (raw PCM, Westwood ADPCM, IMA ADPCM)
//! - The mixer contract every playback manager talks to
//! - A deterministic headless mixer for tests and deviceless runs
//! - A rodio-backed mixer for real output
//! - Asset sources that hand out raw file bytes by name
//!
//! ## Architecture
//!
//! Nothing in this crate makes policy decisions. Managers in the gameplay
//! crate decide what to play and when; the kernel only decodes bytes and
//! forwards commands to whichever [`Mixer`] it is given.
//!
//! ## Failure model
//!
//! Decode and asset failures are returned as values so callers can treat a
//! broken file like a missing one. Mixer failures surface as `None` handles.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod adpcm;
pub mod assets;
pub mod aud;
pub mod audio;
pub mod audio_backend;
pub mod audio_resource;
pub mod audio_spatial;
pub mod mixer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::audio::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_then_play_headless() {
        let samples: Vec<i16> = (0..2205).map(|i| (i % 100) as i16).collect();
        let assets = MemoryAssets::new().with_file("TONE.AUD", encode_raw_pcm16(22050, 1, &samples));

        let mut mixer = HeadlessMixer::new();
        let clip = load_aud(&assets, "tone.aud").unwrap();
        assert_eq!(clip.duration_ms(), 100);

        let id = mixer.create_from_buffer(&clip).unwrap();
        let handle = mixer.play(id, PlayParams::default()).unwrap();
        mixer.advance(100);
        assert!(!mixer.is_playing(handle));
    }

    #[test]
    fn test_header_size() {
        assert_eq!(AUD_HEADER_SIZE, 12);
        assert_eq!(std::mem::size_of::<[u8; AUD_HEADER_SIZE]>(), 12);
    }
}
