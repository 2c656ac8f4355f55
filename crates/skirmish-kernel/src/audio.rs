//! Audio System
//!
//! This module re-exports the kernel's audio types for convenience.
//!
//! # Modules
//!
//! - [`aud`](crate::aud): AUD container parsing and decoding
//! - [`adpcm`](crate::adpcm): Westwood and IMA ADPCM decoders
//! - [`audio_resource`](crate::audio_resource): Handles, clips, volumes
//! - [`audio_spatial`](crate::audio_spatial): Distance attenuation and panning
//! - [`mixer`](crate::mixer): Mixer contract and the headless mixer
//! - [`assets`](crate::assets): Asset sources
//! - [`audio_backend`](crate::audio_backend): rodio playback
//!
//! # Quick Start
//!
//! ```
//! use skirmish_kernel::audio::*;
//!
//! let assets = MemoryAssets::new().with_file("BEEP.AUD", encode_raw_pcm16(22050, 1, &[0; 441]));
//! let mut mixer = HeadlessMixer::new();
//!
//! let clip = load_aud(&assets, "BEEP.AUD").unwrap();
//! let id = mixer.create_from_buffer(&clip).unwrap();
//! let handle = mixer.play(id, PlayParams::default().with_volume(0.5)).unwrap();
//! assert!(mixer.is_playing(handle));
//! ```

pub use crate::adpcm::{decode_ima, decode_westwood, AdpcmState};
pub use crate::assets::{
    load_aud, AssetError, AssetResult, AssetSource, DirectoryAssets, LoadError, MemoryAssets,
};
pub use crate::aud::{
    decode, decode_aud, encode_raw_pcm16, probe, AudHeader, Compression, DecodeError,
    DecodeResult, AUD_HEADER_SIZE,
};
pub use crate::audio_backend::{AudioError, AudioResult, RodioMixer, MAX_SINKS};
pub use crate::audio_resource::{
    clamp_unit, AudioHandle, ClipId, DecodedClip, HandleGenerator, PlayParams, VolumeChannel,
    VolumeSettings,
};
pub use crate::audio_spatial::{
    distance_factor, pan_gains, stereo_pan, SpatialParams, DEFAULT_MAX_DISTANCE,
    MIN_AUDIBLE_VOLUME,
};
pub use crate::mixer::{AudioContext, HeadlessMixer, Mixer, MixerEvent};
