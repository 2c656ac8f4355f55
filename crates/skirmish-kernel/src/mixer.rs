//! Mixer contract and the headless mixer.
//!
//! # Overview
//!
//! Every playback decision in the audio subsystem ends in a small command
//! to a platform mixer: upload a buffer, play it, stop it, change its
//! volume, ask whether it is still going. [`Mixer`] is that command sink.
//! Commands on unknown or finished handles are silent no-ops, and failures
//! surface as `None` rather than errors.
//!
//! # Implementations
//!
//! ```text
//! ┌──────────────┐        ┌───────────────────────────────────┐
//! │  dyn Mixer   │◀───────│ RodioMixer   (audio device)       │
//! │              │◀───────│ HeadlessMixer (in-memory, tests)  │
//! └──────────────┘        └───────────────────────────────────┘
//! ```
//!
//! Managers receive the mixer through an [`AudioContext`] together with the
//! asset source and the current tick, so one frame sees one "now".

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use skirmish_common::Millis;
use tracing::debug;

use crate::assets::AssetSource;
use crate::audio_resource::{AudioHandle, ClipId, DecodedClip, HandleGenerator, PlayParams};

/// Platform mixer command sink.
pub trait Mixer {
    /// Uploads decoded PCM. Returns `None` if the upload fails.
    fn create_from_buffer(&mut self, clip: &DecodedClip) -> Option<ClipId>;

    /// Releases an uploaded buffer, stopping instances that use it.
    fn destroy(&mut self, clip: ClipId);

    /// Starts an instance. Returns `None` when no channel is free.
    fn play(&mut self, clip: ClipId, params: PlayParams) -> Option<AudioHandle>;

    /// Stops an instance.
    fn stop(&mut self, handle: AudioHandle);

    /// Pauses an instance.
    fn pause(&mut self, handle: AudioHandle);

    /// Resumes a paused instance.
    fn resume(&mut self, handle: AudioHandle);

    /// Sets an instance's volume (0.0-1.0).
    fn set_volume(&mut self, handle: AudioHandle, volume: f32);

    /// Whether an instance is still alive. Paused instances count as alive.
    fn is_playing(&self, handle: AudioHandle) -> bool;

    /// Stops every instance.
    fn stop_all(&mut self);
}

/// Per-call view of the collaborators a manager needs.
pub struct AudioContext<'a> {
    /// Mixer to issue commands to.
    pub mixer: &'a mut dyn Mixer,
    /// Source of raw asset bytes.
    pub assets: &'a dyn AssetSource,
    /// Current tick.
    pub now: Millis,
}

impl<'a> AudioContext<'a> {
    /// Bundles the collaborators for one call.
    pub fn new(mixer: &'a mut dyn Mixer, assets: &'a dyn AssetSource, now: Millis) -> Self {
        Self { mixer, assets, now }
    }
}

impl std::fmt::Debug for AudioContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioContext")
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Headless mixer
// ============================================================================

/// Command observed by a [`HeadlessMixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerEvent {
    /// An instance started.
    Played {
        /// New instance
        handle: AudioHandle,
        /// Clip it plays
        clip: ClipId,
    },
    /// A live instance was stopped by command.
    Stopped {
        /// Stopped instance
        handle: AudioHandle,
    },
    /// An instance ran to its end.
    Finished {
        /// Finished instance
        handle: AudioHandle,
    },
}

#[derive(Debug, Clone, Copy)]
struct HeadlessClip {
    duration_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct HeadlessInstance {
    clip: ClipId,
    params: PlayParams,
    paused: bool,
    elapsed_ms: u64,
    duration_ms: u64,
}

#[derive(Debug, Default)]
struct HeadlessState {
    clips: AHashMap<ClipId, HeadlessClip>,
    next_clip: u32,
    instances: AHashMap<AudioHandle, HeadlessInstance>,
    handles: HandleGenerator,
    channel_limit: Option<usize>,
    fail_uploads: bool,
    events: Vec<MixerEvent>,
}

impl HeadlessState {
    fn remove(&mut self, handle: AudioHandle, event: MixerEvent) {
        if self.instances.remove(&handle).is_some() {
            self.events.push(event);
        }
    }
}

/// Deterministic in-memory mixer.
///
/// Instances stay alive until stopped, finished by hand with
/// [`HeadlessMixer::finish`], or aged past their clip length with
/// [`HeadlessMixer::advance`]. Clones share state, so a test can keep a
/// handle for inspection while the system under test owns the mixer.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMixer {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessMixer {
    /// Creates a mixer with unlimited channels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the number of simultaneous instances.
    #[must_use]
    pub fn with_channel_limit(self, limit: usize) -> Self {
        self.state.lock().channel_limit = Some(limit);
        self
    }

    /// Makes every subsequent upload fail.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.state.lock().fail_uploads = fail;
    }

    /// Ends an instance as if its clip ran out.
    pub fn finish(&self, handle: AudioHandle) {
        self.state
            .lock()
            .remove(handle, MixerEvent::Finished { handle });
    }

    /// Ends every instance.
    pub fn finish_all(&self) {
        let mut state = self.state.lock();
        let mut handles: Vec<AudioHandle> = state.instances.keys().copied().collect();
        handles.sort_unstable();
        for handle in handles {
            state.remove(handle, MixerEvent::Finished { handle });
        }
    }

    /// Ages unpaused instances by `delta_ms` and finishes non-looping ones
    /// that reach the end of their clip.
    pub fn advance(&self, delta_ms: u64) {
        let mut state = self.state.lock();
        let mut done = Vec::new();
        for (&handle, instance) in &mut state.instances {
            if instance.paused {
                continue;
            }
            instance.elapsed_ms = instance.elapsed_ms.saturating_add(delta_ms);
            if !instance.params.looping && instance.elapsed_ms >= instance.duration_ms {
                done.push(handle);
            }
        }
        done.sort_unstable();
        for handle in done {
            state.remove(handle, MixerEvent::Finished { handle });
        }
    }

    /// Live instance handles, oldest first.
    #[must_use]
    pub fn active_handles(&self) -> Vec<AudioHandle> {
        let mut handles: Vec<AudioHandle> = self.state.lock().instances.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// Number of live instances.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state.lock().instances.len()
    }

    /// Number of uploaded clips.
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.state.lock().clips.len()
    }

    /// Current volume of a live instance.
    #[must_use]
    pub fn volume_of(&self, handle: AudioHandle) -> Option<f32> {
        self.state
            .lock()
            .instances
            .get(&handle)
            .map(|i| i.params.volume)
    }

    /// Pan of a live instance.
    #[must_use]
    pub fn pan_of(&self, handle: AudioHandle) -> Option<f32> {
        self.state.lock().instances.get(&handle).map(|i| i.params.pan)
    }

    /// Clip played by a live instance.
    #[must_use]
    pub fn clip_of(&self, handle: AudioHandle) -> Option<ClipId> {
        self.state.lock().instances.get(&handle).map(|i| i.clip)
    }

    /// Whether a live instance is paused.
    #[must_use]
    pub fn is_paused(&self, handle: AudioHandle) -> bool {
        self.state
            .lock()
            .instances
            .get(&handle)
            .is_some_and(|i| i.paused)
    }

    /// Commands observed so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<MixerEvent> {
        self.state.lock().events.clone()
    }

    /// Forgets the recorded commands.
    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }
}

impl Mixer for HeadlessMixer {
    fn create_from_buffer(&mut self, clip: &DecodedClip) -> Option<ClipId> {
        let mut state = self.state.lock();
        if state.fail_uploads || clip.is_empty() {
            return None;
        }
        let id = ClipId::new(state.next_clip);
        state.next_clip = state.next_clip.wrapping_add(1);
        state.clips.insert(
            id,
            HeadlessClip {
                duration_ms: clip.duration_ms(),
            },
        );
        Some(id)
    }

    fn destroy(&mut self, clip: ClipId) {
        let mut state = self.state.lock();
        if state.clips.remove(&clip).is_none() {
            return;
        }
        let mut users: Vec<AudioHandle> = state
            .instances
            .iter()
            .filter(|(_, i)| i.clip == clip)
            .map(|(h, _)| *h)
            .collect();
        users.sort_unstable();
        for handle in users {
            state.remove(handle, MixerEvent::Stopped { handle });
        }
    }

    fn play(&mut self, clip: ClipId, params: PlayParams) -> Option<AudioHandle> {
        let mut state = self.state.lock();
        let info = *state.clips.get(&clip)?;
        if state
            .channel_limit
            .is_some_and(|limit| state.instances.len() >= limit)
        {
            debug!("Headless mixer out of channels");
            return None;
        }

        let handle = state.handles.next();
        state.instances.insert(
            handle,
            HeadlessInstance {
                clip,
                params: params.normalized(),
                paused: false,
                elapsed_ms: 0,
                duration_ms: info.duration_ms,
            },
        );
        state.events.push(MixerEvent::Played { handle, clip });
        Some(handle)
    }

    fn stop(&mut self, handle: AudioHandle) {
        self.state
            .lock()
            .remove(handle, MixerEvent::Stopped { handle });
    }

    fn pause(&mut self, handle: AudioHandle) {
        if let Some(instance) = self.state.lock().instances.get_mut(&handle) {
            instance.paused = true;
        }
    }

    fn resume(&mut self, handle: AudioHandle) {
        if let Some(instance) = self.state.lock().instances.get_mut(&handle) {
            instance.paused = false;
        }
    }

    fn set_volume(&mut self, handle: AudioHandle, volume: f32) {
        if let Some(instance) = self.state.lock().instances.get_mut(&handle) {
            instance.params = instance.params.with_volume(volume).normalized();
        }
    }

    fn is_playing(&self, handle: AudioHandle) -> bool {
        self.state.lock().instances.contains_key(&handle)
    }

    fn stop_all(&mut self) {
        let mut state = self.state.lock();
        let mut handles: Vec<AudioHandle> = state.instances.keys().copied().collect();
        handles.sort_unstable();
        for handle in handles {
            state.remove(handle, MixerEvent::Stopped { handle });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_second_clip() -> DecodedClip {
        DecodedClip::new(vec![0; 1000], 1, 1000)
    }

    #[test]
    fn test_play_and_stop_are_logged_in_order() {
        let mut mixer = HeadlessMixer::new();
        let observer = mixer.clone();
        let clip = mixer.create_from_buffer(&one_second_clip()).unwrap();

        let a = mixer.play(clip, PlayParams::default()).unwrap();
        let b = mixer.play(clip, PlayParams::default().with_volume(0.5)).unwrap();
        mixer.stop(a);
        mixer.stop(a);

        assert_eq!(
            observer.events(),
            vec![
                MixerEvent::Played { handle: a, clip },
                MixerEvent::Played { handle: b, clip },
                MixerEvent::Stopped { handle: a },
            ]
        );
        assert!(!observer.is_playing(a));
        assert_eq!(observer.volume_of(b), Some(0.5));
    }

    #[test]
    fn test_channel_limit() {
        let mut mixer = HeadlessMixer::new().with_channel_limit(1);
        let clip = mixer.create_from_buffer(&one_second_clip()).unwrap();
        assert!(mixer.play(clip, PlayParams::default()).is_some());
        assert!(mixer.play(clip, PlayParams::default()).is_none());
    }

    #[test]
    fn test_advance_finishes_by_length() {
        let mut mixer = HeadlessMixer::new();
        let clip = mixer.create_from_buffer(&one_second_clip()).unwrap();
        let once = mixer.play(clip, PlayParams::default()).unwrap();
        let looped = mixer
            .play(clip, PlayParams::default().with_looping(true))
            .unwrap();
        let paused = mixer.play(clip, PlayParams::default()).unwrap();
        mixer.pause(paused);

        mixer.advance(999);
        assert!(mixer.is_playing(once));
        mixer.advance(1);
        assert!(!mixer.is_playing(once));
        assert!(mixer.is_playing(looped));
        assert!(mixer.is_playing(paused));
        assert!(mixer.is_paused(paused));
    }

    #[test]
    fn test_failed_upload_and_unknown_clip() {
        let mut mixer = HeadlessMixer::new();
        mixer.set_fail_uploads(true);
        assert!(mixer.create_from_buffer(&one_second_clip()).is_none());
        assert!(mixer.play(ClipId::new(42), PlayParams::default()).is_none());
    }

    #[test]
    fn test_destroy_stops_users() {
        let mut mixer = HeadlessMixer::new();
        let clip = mixer.create_from_buffer(&one_second_clip()).unwrap();
        let h = mixer.play(clip, PlayParams::default()).unwrap();
        mixer.destroy(clip);
        assert!(!mixer.is_playing(h));
        assert_eq!(mixer.clip_count(), 0);
    }

    #[test]
    fn test_invalid_handles_are_no_ops() {
        let mut mixer = HeadlessMixer::new();
        let ghost = AudioHandle::new(99, 0);
        mixer.stop(ghost);
        mixer.pause(ghost);
        mixer.set_volume(ghost, 0.3);
        assert!(!mixer.is_playing(ghost));
        assert!(mixer.events().is_empty());
    }
}
