//! Audio Resource Types
//!
//! Provides the value types that cross the mixer boundary:
//! - `AudioHandle`: Opaque identifier for one playing instance
//! - `ClipId`: Identifier for an uploaded sample buffer
//! - `DecodedClip`: Immutable 16-bit PCM produced by the codec
//! - `PlayParams`: Per-instance volume, pan and looping
//! - `VolumeSettings`: Master and per-category volume composition
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐ upload ┌─────────────┐  play  ┌─────────────┐
//! │ DecodedClip │───────▶│   ClipId    │───────▶│ AudioHandle │
//! │  (codec)    │        │  (mixer)    │        │ (instance)  │
//! └─────────────┘        └─────────────┘        └─────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier for a playing instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AudioHandle {
    id: u64,
    generation: u32,
}

impl AudioHandle {
    /// Create a new handle with the given ID and generation.
    #[must_use]
    pub const fn new(id: u64, generation: u32) -> Self {
        Self { id, generation }
    }

    /// Get the raw ID.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Get the generation.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Audio handle generator for unique IDs.
#[derive(Debug)]
pub struct HandleGenerator {
    next_id: AtomicU64,
    generation: u32,
}

impl Default for HandleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleGenerator {
    /// Create a new handle generator.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_generation(0)
    }

    /// Create a generator whose handles carry `generation`.
    ///
    /// Backends pick distinct generations so handles from one mixer are
    /// never mistaken for another's.
    #[must_use]
    pub const fn with_generation(generation: u32) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            generation,
        }
    }

    /// Generate a new unique handle.
    pub fn next(&self) -> AudioHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        AudioHandle::new(id, self.generation)
    }
}

/// Identifier for a sample buffer uploaded to a mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(u32);

impl ClipId {
    /// Create a new clip ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

/// Decoded 16-bit PCM.
///
/// Cloning is cheap: the samples are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedClip {
    samples: Arc<[i16]>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedClip {
    /// Wraps decoded samples (interleaved when stereo).
    #[must_use]
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            channels: channels.max(1),
            sample_rate,
        }
    }

    /// Interleaved samples.
    #[must_use]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Shared handle to the samples.
    #[must_use]
    pub fn shared_samples(&self) -> Arc<[i16]> {
        Arc::clone(&self.samples)
    }

    /// Channel count (1 or 2).
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz.
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples per channel.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Size of the PCM in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.samples.len() * std::mem::size_of::<i16>()
    }

    /// Playback length in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / u64::from(self.sample_rate)
    }

    /// Whether the clip holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Per-instance playback parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayParams {
    /// Volume multiplier (0.0-1.0).
    pub volume: f32,
    /// Stereo pan (-1.0 = full left, 0.0 = center, 1.0 = full right).
    pub pan: f32,
    /// Whether to loop the audio.
    pub looping: bool,
}

impl Default for PlayParams {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pan: 0.0,
            looping: false,
        }
    }
}

impl PlayParams {
    /// Set volume.
    #[must_use]
    pub const fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Set pan.
    #[must_use]
    pub const fn with_pan(mut self, pan: f32) -> Self {
        self.pan = pan;
        self
    }

    /// Set looping.
    #[must_use]
    pub const fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Clamp values to valid ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.volume = clamp_unit(self.volume);
        self.pan = if self.pan.is_nan() {
            0.0
        } else {
            self.pan.clamp(-1.0, 1.0)
        };
        self
    }
}

/// Clamps to [0, 1], mapping NaN to 0.
#[must_use]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Volume channel for mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeChannel {
    /// Master volume (affects all audio).
    Master,
    /// Sound effects.
    Sfx,
    /// Background music.
    Music,
    /// Announcer and unit voices.
    Voice,
}

impl VolumeChannel {
    /// All channels.
    pub const ALL: [Self; 4] = [Self::Master, Self::Sfx, Self::Music, Self::Voice];

    const fn slot(self) -> usize {
        match self {
            Self::Master => 0,
            Self::Sfx => 1,
            Self::Music => 2,
            Self::Voice => 3,
        }
    }

    /// Default volume for this channel.
    #[must_use]
    pub const fn default_volume(self) -> f32 {
        match self {
            Self::Master | Self::Sfx | Self::Voice => 1.0,
            Self::Music => 0.8,
        }
    }
}

/// Master and category volumes with a master mute.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSettings {
    volumes: [f32; 4],
    muted: bool,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            volumes: VolumeChannel::ALL.map(VolumeChannel::default_volume),
            muted: false,
        }
    }
}

impl VolumeSettings {
    /// Get volume for a channel.
    #[must_use]
    pub const fn get(&self, channel: VolumeChannel) -> f32 {
        self.volumes[channel.slot()]
    }

    /// Set volume for a channel, clamped to [0, 1].
    pub fn set(&mut self, channel: VolumeChannel, volume: f32) {
        self.volumes[channel.slot()] = clamp_unit(volume);
    }

    /// Whether master mute is on.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Set master mute.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Effective volume for a channel: master × channel, or 0 when muted.
    #[must_use]
    pub fn effective(&self, channel: VolumeChannel) -> f32 {
        if self.muted {
            return 0.0;
        }
        let master = self.get(VolumeChannel::Master);
        match channel {
            VolumeChannel::Master => master,
            _ => master * self.get(channel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_generator() {
        let gen = HandleGenerator::with_generation(3);
        let a = gen.next();
        let b = gen.next();
        assert_ne!(a, b);
        assert_eq!(a.generation(), 3);
        assert_eq!(b.id(), a.id() + 1);
    }

    #[test]
    fn test_clip_metrics() {
        let clip = DecodedClip::new(vec![0; 44100], 2, 22050);
        assert_eq!(clip.frames(), 22050);
        assert_eq!(clip.byte_size(), 88200);
        assert_eq!(clip.duration_ms(), 1000);
        assert!(!clip.is_empty());
    }

    #[test]
    fn test_clip_shares_samples() {
        let clip = DecodedClip::new(vec![1, 2, 3], 1, 8000);
        let copy = clip.clone();
        assert!(Arc::ptr_eq(&clip.shared_samples(), &copy.shared_samples()));
    }

    #[test]
    fn test_play_params_normalized() {
        let p = PlayParams::default()
            .with_volume(1.5)
            .with_pan(-3.0)
            .with_looping(true)
            .normalized();
        assert_eq!(p.volume, 1.0);
        assert_eq!(p.pan, -1.0);
        assert!(p.looping);
        assert_eq!(PlayParams::default().with_volume(f32::NAN).normalized().volume, 0.0);
    }

    #[test]
    fn test_volume_settings_compose() {
        let mut v = VolumeSettings::default();
        assert!((v.effective(VolumeChannel::Music) - 0.8).abs() < 1e-6);

        v.set(VolumeChannel::Master, 0.5);
        v.set(VolumeChannel::Sfx, 2.0);
        assert_eq!(v.get(VolumeChannel::Sfx), 1.0);
        assert!((v.effective(VolumeChannel::Sfx) - 0.5).abs() < 1e-6);
        assert!((v.effective(VolumeChannel::Master) - 0.5).abs() < 1e-6);

        v.set_muted(true);
        assert_eq!(v.effective(VolumeChannel::Voice), 0.0);
        assert_eq!(v.get(VolumeChannel::Master), 0.5);
    }
}
