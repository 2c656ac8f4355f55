//! Audio Backend with Rodio Integration
//!
//! [`RodioMixer`] implements the [`Mixer`] contract on top of rodio:
//!
//! - Uploaded clips are kept as shared 16-bit PCM
//! - Each playing instance gets its own rodio `Sink`
//! - Pan is applied with equal-power channel gains
//! - Finished sinks are reaped lazily when a new instance starts
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     RodioMixer                        │
//! │  ┌───────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ OutputStream  │──│ Sink per     │──│ ClipId →   │  │
//! │  │ (device)      │  │ AudioHandle  │  │ DecodedClip│  │
//! │  └───────────────┘  └──────────────┘  └────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```

use ahash::AHashMap;
use rodio::buffer::SamplesBuffer;
use rodio::source::ChannelVolume;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audio_resource::{
    clamp_unit, AudioHandle, ClipId, DecodedClip, HandleGenerator, PlayParams,
};
use crate::audio_spatial::pan_gains;
use crate::mixer::Mixer;

/// Default maximum number of simultaneous sinks.
pub const MAX_SINKS: usize = 32;

/// Pans closer to center than this play without channel gains.
const PAN_EPSILON: f32 = 1e-3;

/// Audio backend error types.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to initialize audio device.
    #[error("Failed to initialize audio device: {0}")]
    DeviceInitFailed(String),

    /// Failed to create audio sink.
    #[error("Failed to create audio sink: {0}")]
    SinkCreationFailed(String),
}

/// Result type for audio backend operations.
pub type AudioResult<T> = Result<T, AudioError>;

struct ActiveSink {
    sink: Sink,
    clip: ClipId,
}

/// Mixer that renders through the default audio output device.
pub struct RodioMixer {
    /// The output stream (must be kept alive).
    _stream: OutputStream,
    handle: OutputStreamHandle,
    clips: AHashMap<ClipId, DecodedClip>,
    next_clip: u32,
    sinks: AHashMap<AudioHandle, ActiveSink>,
    handles: HandleGenerator,
    max_sinks: usize,
}

impl std::fmt::Debug for RodioMixer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioMixer")
            .field("clips", &self.clips.len())
            .field("sinks", &self.sinks.len())
            .field("max_sinks", &self.max_sinks)
            .finish_non_exhaustive()
    }
}

impl RodioMixer {
    /// Opens the default output device.
    pub fn new(max_sinks: usize) -> AudioResult<Self> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::DeviceInitFailed(e.to_string()))?;

        info!("Audio device initialized ({} sinks)", max_sinks);

        Ok(Self {
            _stream: stream,
            handle,
            clips: AHashMap::new(),
            next_clip: 0,
            sinks: AHashMap::new(),
            handles: HandleGenerator::with_generation(1),
            max_sinks: max_sinks.max(1),
        })
    }

    /// Opens the default output device with [`MAX_SINKS`] sinks.
    pub fn try_default() -> AudioResult<Self> {
        Self::new(MAX_SINKS)
    }

    /// Number of sinks still holding audio.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sinks.values().filter(|s| !s.sink.empty()).count()
    }

    /// Drops sinks that have run dry.
    pub fn reap(&mut self) {
        self.sinks.retain(|_, s| !s.sink.empty());
    }

    fn create_sink(&self) -> AudioResult<Sink> {
        Sink::try_new(&self.handle).map_err(|e| AudioError::SinkCreationFailed(e.to_string()))
    }
}

impl Mixer for RodioMixer {
    fn create_from_buffer(&mut self, clip: &DecodedClip) -> Option<ClipId> {
        if clip.is_empty() {
            return None;
        }
        let id = ClipId::new(self.next_clip);
        self.next_clip = self.next_clip.wrapping_add(1);
        self.clips.insert(id, clip.clone());
        debug!(
            "Uploaded clip {:?} ({} bytes, {} Hz, {} ch)",
            id,
            clip.byte_size(),
            clip.sample_rate(),
            clip.channels()
        );
        Some(id)
    }

    fn destroy(&mut self, clip: ClipId) {
        if self.clips.remove(&clip).is_none() {
            return;
        }
        self.sinks.retain(|_, s| {
            if s.clip == clip {
                s.sink.stop();
                false
            } else {
                true
            }
        });
    }

    fn play(&mut self, clip: ClipId, params: PlayParams) -> Option<AudioHandle> {
        let data = self.clips.get(&clip)?;
        let (channels, sample_rate) = (data.channels(), data.sample_rate());
        let samples = data.samples().to_vec();

        if self.sinks.len() >= self.max_sinks {
            self.reap();
            if self.sinks.len() >= self.max_sinks {
                debug!("No free sinks (max: {})", self.max_sinks);
                return None;
            }
        }

        let sink = match self.create_sink() {
            Ok(sink) => sink,
            Err(e) => {
                warn!("{}", e);
                return None;
            },
        };

        let params = params.normalized();
        sink.set_volume(params.volume);

        let source = SamplesBuffer::new(channels, sample_rate, samples);
        if params.pan.abs() < PAN_EPSILON {
            if params.looping {
                sink.append(source.repeat_infinite());
            } else {
                sink.append(source);
            }
        } else {
            let (left, right) = pan_gains(params.pan);
            let panned = ChannelVolume::new(source, vec![left, right]);
            if params.looping {
                sink.append(panned.repeat_infinite());
            } else {
                sink.append(panned);
            }
        }
        sink.play();

        let handle = self.handles.next();
        self.sinks.insert(handle, ActiveSink { sink, clip });
        Some(handle)
    }

    fn stop(&mut self, handle: AudioHandle) {
        if let Some(active) = self.sinks.remove(&handle) {
            active.sink.stop();
        }
    }

    fn pause(&mut self, handle: AudioHandle) {
        if let Some(active) = self.sinks.get(&handle) {
            active.sink.pause();
        }
    }

    fn resume(&mut self, handle: AudioHandle) {
        if let Some(active) = self.sinks.get(&handle) {
            active.sink.play();
        }
    }

    fn set_volume(&mut self, handle: AudioHandle, volume: f32) {
        if let Some(active) = self.sinks.get(&handle) {
            active.sink.set_volume(clamp_unit(volume));
        }
    }

    fn is_playing(&self, handle: AudioHandle) -> bool {
        self.sinks.get(&handle).is_some_and(|s| !s.sink.empty())
    }

    fn stop_all(&mut self) {
        for (_, active) in self.sinks.drain() {
            active.sink.stop();
        }
    }
}
