//! Voice line arbitration.
//!
//! # Overview
//!
//! Two independent single-utterance lines:
//!
//! - **Announcer (EVA)**: a request on an idle line plays at once. On a busy
//!   line a strictly higher priority preempts the current utterance; anything
//!   else waits in a bounded priority queue (priority descending, then
//!   enqueue order). [`VoiceArbiter::update`] drains the queue whenever the
//!   line goes idle, discarding entries still inside their own cooldown.
//! - **Unit acknowledgement**: plays only on an idle line and only once the
//!   line's minimum interval has elapsed. Busy means dropped, never queued.
//!
//! ```text
//! play_eva ──▶ cooldown ok? ──no──▶ rejected
//!                  │yes
//!                  ▼
//!             line idle? ──yes──▶ play
//!                  │no
//!                  ▼
//!          higher priority? ──yes──▶ stop current, play
//!                  │no
//!                  ▼
//!               enqueue (dropped when full)
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use skirmish_common::{cooldown_satisfied, Millis};
use skirmish_kernel::{clamp_unit, load_aud, AudioContext, AudioHandle, ClipId, Mixer, PlayParams};
use tracing::debug;

use crate::voice::{EvaVoice, Faction, UnitVoice, EVA_COUNT, UNIT_VOICE_COUNT};

/// Default announcer queue capacity.
pub const DEFAULT_EVA_QUEUE_CAPACITY: usize = 8;

/// Voice arbiter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    /// Voice volume (0.0-1.0).
    pub volume: f32,
    /// Maximum waiting announcer lines.
    pub queue_capacity: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            queue_capacity: DEFAULT_EVA_QUEUE_CAPACITY,
        }
    }
}

impl VoiceConfig {
    /// Sets the queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// An announcer line waiting for the line to free up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedVoice {
    /// Line to play.
    pub voice: EvaVoice,
    /// Priority copied from the catalog.
    pub priority: u8,
    /// Tick at which it was queued.
    pub queued_at: Millis,
    sequence: u64,
}

impl Ord for QueuedVoice {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher priority first, then the earlier request.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedVoice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipSlot {
    Unloaded,
    Loaded(ClipId),
    Missing,
}

#[derive(Debug, Clone, Copy)]
struct ActiveLine<V> {
    voice: V,
    handle: AudioHandle,
}

/// Announcer and unit voice lines.
#[derive(Debug)]
pub struct VoiceArbiter {
    config: VoiceConfig,
    eva_clips: [ClipSlot; EVA_COUNT],
    unit_clips: AHashMap<(UnitVoice, Faction), ClipSlot>,
    eva_last: [Option<Millis>; EVA_COUNT],
    unit_last: [Option<Millis>; UNIT_VOICE_COUNT],
    eva_line: Option<ActiveLine<EvaVoice>>,
    unit_line: Option<ActiveLine<UnitVoice>>,
    queue: BinaryHeap<QueuedVoice>,
    next_sequence: u64,
    muted: bool,
}

impl Default for VoiceArbiter {
    fn default() -> Self {
        Self::new(VoiceConfig::default())
    }
}

impl VoiceArbiter {
    /// Creates idle lines.
    #[must_use]
    pub fn new(config: VoiceConfig) -> Self {
        let mut config = config;
        config.volume = clamp_unit(config.volume);
        Self {
            config,
            eva_clips: [ClipSlot::Unloaded; EVA_COUNT],
            unit_clips: AHashMap::new(),
            eva_last: [None; EVA_COUNT],
            unit_last: [None; UNIT_VOICE_COUNT],
            eva_line: None,
            unit_line: None,
            queue: BinaryHeap::with_capacity(config.queue_capacity),
            next_sequence: 0,
            muted: false,
        }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &VoiceConfig {
        &self.config
    }

    // ============================================
    // Loading
    // ============================================

    fn load_eva(&mut self, ctx: &mut AudioContext<'_>, voice: EvaVoice) -> Option<ClipId> {
        let slot = &mut self.eva_clips[voice.index()];
        resolve_slot(slot, ctx, voice.filename())
    }

    fn load_unit(
        &mut self,
        ctx: &mut AudioContext<'_>,
        voice: UnitVoice,
        faction: Faction,
    ) -> Option<ClipId> {
        let slot = self
            .unit_clips
            .entry((voice, faction))
            .or_insert(ClipSlot::Unloaded);
        resolve_slot(slot, ctx, voice.filename_for(faction))
    }

    /// Decodes the lines every match is likely to need. Returns how many
    /// are available.
    pub fn preload_common(&mut self, ctx: &mut AudioContext<'_>) -> usize {
        let mut loaded = 0;
        for voice in EvaVoice::COMMON {
            loaded += usize::from(self.load_eva(ctx, voice).is_some());
        }
        for voice in UnitVoice::COMMON {
            loaded += usize::from(self.load_unit(ctx, voice, Faction::Neutral).is_some());
        }
        debug!("Preloaded {} common voice lines", loaded);
        loaded
    }

    /// Silences both lines, empties the queue and releases every clip.
    pub fn unload_all(&mut self, mixer: &mut dyn Mixer) {
        self.stop_eva(mixer);
        self.stop_unit(mixer);
        self.clear_eva_queue();
        for slot in self.eva_clips.iter_mut().chain(self.unit_clips.values_mut()) {
            if let ClipSlot::Loaded(clip) = *slot {
                mixer.destroy(clip);
            }
        }
        self.eva_clips = [ClipSlot::Unloaded; EVA_COUNT];
        self.unit_clips.clear();
    }

    // ============================================
    // Announcer line
    // ============================================

    /// Requests an announcer line.
    ///
    /// Returns `true` when the line is playing or queued.
    pub fn play_eva(&mut self, ctx: &mut AudioContext<'_>, voice: EvaVoice) -> bool {
        if self.muted || !self.can_play_eva(voice, ctx.now) {
            return false;
        }
        self.refresh(ctx.mixer);

        let Some(current) = self.eva_line else {
            return self.start_eva(ctx, voice);
        };

        if voice.priority() > current.voice.priority() {
            debug!("{:?} preempts {:?}", voice, current.voice);
            self.stop_eva(ctx.mixer);
            return self.start_eva(ctx, voice);
        }

        self.queue_eva(voice, ctx.now)
    }

    /// Queues an announcer line without trying to play it.
    ///
    /// Returns `false` when the queue is full.
    pub fn queue_eva(&mut self, voice: EvaVoice, now: Millis) -> bool {
        if self.queue.len() >= self.config.queue_capacity {
            debug!("Announcer queue full, dropping {:?}", voice);
            return false;
        }
        self.queue.push(QueuedVoice {
            voice,
            priority: voice.priority(),
            queued_at: now,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        true
    }

    fn start_eva(&mut self, ctx: &mut AudioContext<'_>, voice: EvaVoice) -> bool {
        let Some(clip) = self.load_eva(ctx, voice) else {
            return false;
        };
        let Some(handle) = ctx.mixer.play(clip, self.params()) else {
            return false;
        };
        self.eva_line = Some(ActiveLine { voice, handle });
        self.eva_last[voice.index()] = Some(ctx.now);
        true
    }

    /// Whether `voice` is outside its minimum interval.
    #[must_use]
    pub fn can_play_eva(&self, voice: EvaVoice, now: Millis) -> bool {
        self.eva_last[voice.index()]
            .map_or(true, |last| cooldown_satisfied(now, last, voice.info().min_interval_ms))
    }

    /// Cuts off the announcer.
    pub fn stop_eva(&mut self, mixer: &mut dyn Mixer) {
        if let Some(line) = self.eva_line.take() {
            mixer.stop(line.handle);
        }
    }

    /// Drops every waiting announcer line.
    pub fn clear_eva_queue(&mut self) {
        self.queue.clear();
    }

    /// Whether the announcer is talking, as of the last refresh.
    #[must_use]
    pub fn is_eva_speaking(&self) -> bool {
        self.eva_line.is_some()
    }

    /// Line the announcer is saying.
    #[must_use]
    pub fn current_eva(&self) -> Option<EvaVoice> {
        self.eva_line.map(|l| l.voice)
    }

    /// Mixer handle of the announcer utterance.
    #[must_use]
    pub fn eva_handle(&self) -> Option<AudioHandle> {
        self.eva_line.map(|l| l.handle)
    }

    /// Waiting announcer lines.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Next line the queue would hand out.
    #[must_use]
    pub fn peek_queue(&self) -> Option<&QueuedVoice> {
        self.queue.peek()
    }

    // ============================================
    // Unit line
    // ============================================

    /// Plays a unit acknowledgement if the unit line is free.
    pub fn play_unit(
        &mut self,
        ctx: &mut AudioContext<'_>,
        voice: UnitVoice,
        faction: Faction,
    ) -> Option<AudioHandle> {
        if self.muted {
            return None;
        }
        self.refresh(ctx.mixer);
        if self.unit_line.is_some() || !self.can_play_unit(voice, ctx.now) {
            return None;
        }

        let clip = self.load_unit(ctx, voice, faction)?;
        let handle = ctx.mixer.play(clip, self.params())?;
        self.unit_line = Some(ActiveLine { voice, handle });
        self.unit_last[voice.index()] = Some(ctx.now);
        Some(handle)
    }

    /// Whether `voice` is outside its minimum interval.
    #[must_use]
    pub fn can_play_unit(&self, voice: UnitVoice, now: Millis) -> bool {
        self.unit_last[voice.index()]
            .map_or(true, |last| cooldown_satisfied(now, last, voice.min_interval_ms()))
    }

    /// Cuts off the unit line.
    pub fn stop_unit(&mut self, mixer: &mut dyn Mixer) {
        if let Some(line) = self.unit_line.take() {
            mixer.stop(line.handle);
        }
    }

    /// Whether a unit is talking, as of the last refresh.
    #[must_use]
    pub fn is_unit_speaking(&self) -> bool {
        self.unit_line.is_some()
    }

    /// Line the unit is saying.
    #[must_use]
    pub fn current_unit(&self) -> Option<UnitVoice> {
        self.unit_line.map(|l| l.voice)
    }

    // ============================================
    // Per-frame update
    // ============================================

    fn refresh(&mut self, mixer: &dyn Mixer) {
        if self.eva_line.is_some_and(|l| !mixer.is_playing(l.handle)) {
            self.eva_line = None;
        }
        if self.unit_line.is_some_and(|l| !mixer.is_playing(l.handle)) {
            self.unit_line = None;
        }
    }

    /// Clears finished lines and feeds the announcer from the queue.
    pub fn update(&mut self, ctx: &mut AudioContext<'_>) {
        self.refresh(ctx.mixer);
        if self.muted {
            return;
        }

        while self.eva_line.is_none() {
            let Some(next) = self.queue.pop() else {
                break;
            };
            if !self.can_play_eva(next.voice, ctx.now) {
                debug!("Discarding queued {:?}, still cooling down", next.voice);
                continue;
            }
            self.start_eva(ctx, next.voice);
        }
    }

    // ============================================
    // Volume
    // ============================================

    fn output_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.config.volume
        }
    }

    fn params(&self) -> PlayParams {
        PlayParams::default().with_volume(self.output_volume())
    }

    fn apply_volume(&self, mixer: &mut dyn Mixer) {
        let volume = self.output_volume();
        for handle in [self.eva_handle(), self.unit_line.map(|l| l.handle)]
            .into_iter()
            .flatten()
        {
            mixer.set_volume(handle, volume);
        }
    }

    /// Sets the voice volume, including lines already talking.
    pub fn set_volume(&mut self, mixer: &mut dyn Mixer, volume: f32) {
        self.config.volume = clamp_unit(volume);
        self.apply_volume(mixer);
    }

    /// Voice volume.
    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.config.volume
    }

    /// Mutes or unmutes. Muted lines reject new requests.
    pub fn set_muted(&mut self, mixer: &mut dyn Mixer, muted: bool) {
        self.muted = muted;
        self.apply_volume(mixer);
    }

    /// Whether muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Changes the queue bound. Excess waiting lines are kept until drained.
    pub fn set_queue_capacity(&mut self, capacity: usize) {
        self.config.queue_capacity = capacity;
    }
}

fn resolve_slot(
    slot: &mut ClipSlot,
    ctx: &mut AudioContext<'_>,
    filename: &str,
) -> Option<ClipId> {
    match *slot {
        ClipSlot::Loaded(clip) => return Some(clip),
        ClipSlot::Missing => return None,
        ClipSlot::Unloaded => {},
    }

    let clip = match load_aud(ctx.assets, filename) {
        Ok(decoded) => ctx.mixer.create_from_buffer(&decoded),
        Err(e) => {
            debug!("Voice {} unavailable: {}", filename, e);
            None
        },
    };
    *slot = clip.map_or(ClipSlot::Missing, ClipSlot::Loaded);
    clip
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_kernel::{encode_raw_pcm16, HeadlessMixer, MemoryAssets, MixerEvent};

    /// Whether the mixer log ends with `first` followed by `new` starting.
    fn ends_with_handover(events: &[MixerEvent], first: MixerEvent, new: AudioHandle) -> bool {
        matches!(
            events,
            [.., before, MixerEvent::Played { handle, .. }] if *before == first && *handle == new
        )
    }

    struct Rig {
        mixer: HeadlessMixer,
        assets: MemoryAssets,
        now: Millis,
    }

    impl Rig {
        fn new() -> Self {
            let mut assets = MemoryAssets::new();
            let clip = encode_raw_pcm16(22050, 1, &[0; 22050]);
            for voice in EvaVoice::ALL {
                assets.insert(voice.filename(), clip.clone());
            }
            for voice in UnitVoice::ALL {
                assets.insert(voice.filename_for(Faction::Neutral), clip.clone());
            }
            Self {
                mixer: HeadlessMixer::new(),
                assets,
                now: 100_000,
            }
        }

        fn ctx(&mut self) -> AudioContext<'_> {
            AudioContext::new(&mut self.mixer, &self.assets, self.now)
        }
    }

    #[test]
    fn test_idle_line_plays_immediately() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        assert!(voices.play_eva(&mut rig.ctx(), EvaVoice::UnitReady));
        assert_eq!(voices.current_eva(), Some(EvaVoice::UnitReady));
        assert_eq!(voices.queue_len(), 0);
    }

    #[test]
    fn test_higher_priority_preempts() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        voices.play_eva(&mut rig.ctx(), EvaVoice::Building);
        let old = voices.eva_handle().unwrap();

        assert!(voices.play_eva(&mut rig.ctx(), EvaVoice::BaseUnderAttack));
        let new = voices.eva_handle().unwrap();
        assert_ne!(old, new);
        assert!(!rig.mixer.is_playing(old));
        assert!(rig.mixer.is_playing(new));
        assert_eq!(rig.mixer.active_count(), 1);
        assert_eq!(voices.queue_len(), 0);
        assert!(ends_with_handover(
            &rig.mixer.events(),
            MixerEvent::Stopped { handle: old },
            new
        ));
    }

    #[test]
    fn test_queue_drains_only_after_line_ends() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        voices.play_eva(&mut rig.ctx(), EvaVoice::NukeAttack);
        let first = voices.eva_handle().unwrap();
        voices.queue_eva(EvaVoice::UnitLost, rig.now);
        voices.queue_eva(EvaVoice::RadarOnline, rig.now);

        let logged = rig.mixer.events().len();
        rig.now += 10;
        voices.update(&mut rig.ctx());
        assert_eq!(rig.mixer.events().len(), logged);
        assert_eq!(voices.eva_handle(), Some(first));

        rig.mixer.finish(first);
        rig.now += 10;
        voices.update(&mut rig.ctx());
        let second = voices.eva_handle().unwrap();
        assert_eq!(voices.current_eva(), Some(EvaVoice::UnitLost));
        assert!(ends_with_handover(
            &rig.mixer.events(),
            MixerEvent::Finished { handle: first },
            second
        ));

        voices.stop_eva(&mut rig.mixer);
        rig.now += 10;
        voices.update(&mut rig.ctx());
        let third = voices.eva_handle().unwrap();
        assert_eq!(voices.current_eva(), Some(EvaVoice::RadarOnline));
        assert!(ends_with_handover(
            &rig.mixer.events(),
            MixerEvent::Stopped { handle: second },
            third
        ));
        assert_eq!(rig.mixer.active_count(), 1);
    }

    #[test]
    fn test_equal_priority_queues() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        voices.play_eva(&mut rig.ctx(), EvaVoice::UnitReady);
        assert!(voices.play_eva(&mut rig.ctx(), EvaVoice::ConstructionComplete));
        assert_eq!(voices.current_eva(), Some(EvaVoice::UnitReady));
        assert_eq!(voices.queue_len(), 1);
    }

    #[test]
    fn test_queue_order_priority_then_fifo() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        voices.play_eva(&mut rig.ctx(), EvaVoice::NukeAttack);

        voices.queue_eva(EvaVoice::RadarOnline, rig.now);
        voices.queue_eva(EvaVoice::UnitLost, rig.now);
        voices.queue_eva(EvaVoice::NewOptions, rig.now);

        let mut order = Vec::new();
        for _ in 0..3 {
            rig.mixer.finish_all();
            rig.now += 10;
            voices.update(&mut rig.ctx());
            order.push(voices.current_eva().unwrap());
        }
        assert_eq!(
            order,
            vec![EvaVoice::UnitLost, EvaVoice::RadarOnline, EvaVoice::NewOptions]
        );
    }

    #[test]
    fn test_queue_discards_cooling_entries() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        voices.play_eva(&mut rig.ctx(), EvaVoice::LowPower);
        rig.mixer.finish_all();
        voices.update(&mut rig.ctx());

        voices.play_eva(&mut rig.ctx(), EvaVoice::NukeAttack);
        voices.queue_eva(EvaVoice::LowPower, rig.now);
        voices.queue_eva(EvaVoice::Training, rig.now);

        rig.mixer.finish_all();
        rig.now += 100;
        voices.update(&mut rig.ctx());
        assert_eq!(voices.current_eva(), Some(EvaVoice::Training));
        assert_eq!(voices.queue_len(), 0);
    }

    #[test]
    fn test_cooldown_rejects() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        assert!(voices.play_eva(&mut rig.ctx(), EvaVoice::Building));
        voices.stop_eva(&mut rig.mixer);
        rig.now += 1999;
        assert!(!voices.play_eva(&mut rig.ctx(), EvaVoice::Building));
        rig.now += 1;
        assert!(voices.play_eva(&mut rig.ctx(), EvaVoice::Building));
    }

    #[test]
    fn test_queue_capacity() {
        let mut voices = VoiceArbiter::new(VoiceConfig::default().with_queue_capacity(2));
        assert!(voices.queue_eva(EvaVoice::Training, 0));
        assert!(voices.queue_eva(EvaVoice::Building, 0));
        assert!(!voices.queue_eva(EvaVoice::OnHold, 0));
        assert_eq!(voices.queue_len(), 2);
        voices.clear_eva_queue();
        assert_eq!(voices.queue_len(), 0);
    }

    #[test]
    fn test_unit_line_drops_when_busy() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        let first = voices.play_unit(&mut rig.ctx(), UnitVoice::Reporting, Faction::Allied);
        assert!(first.is_some());

        rig.now += 1000;
        assert!(voices
            .play_unit(&mut rig.ctx(), UnitVoice::MovingOut, Faction::Allied)
            .is_none());
        assert_eq!(voices.current_unit(), Some(UnitVoice::Reporting));

        rig.mixer.finish_all();
        assert!(voices
            .play_unit(&mut rig.ctx(), UnitVoice::MovingOut, Faction::Allied)
            .is_some());
    }

    #[test]
    fn test_unit_interval() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        voices.play_unit(&mut rig.ctx(), UnitVoice::Attacking, Faction::Soviet);
        voices.stop_unit(&mut rig.mixer);
        rig.now += 499;
        assert!(voices
            .play_unit(&mut rig.ctx(), UnitVoice::Attacking, Faction::Soviet)
            .is_none());
        rig.now += 1;
        assert!(voices
            .play_unit(&mut rig.ctx(), UnitVoice::Attacking, Faction::Soviet)
            .is_some());
    }

    #[test]
    fn test_lines_are_independent() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        voices.play_eva(&mut rig.ctx(), EvaVoice::UnitReady);
        assert!(voices
            .play_unit(&mut rig.ctx(), UnitVoice::YesSir, Faction::Neutral)
            .is_some());
        assert!(voices.is_eva_speaking());
        assert!(voices.is_unit_speaking());
    }

    #[test]
    fn test_muted_rejects_and_silences() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        voices.play_eva(&mut rig.ctx(), EvaVoice::UnitReady);
        let handle = voices.eva_handle().unwrap();

        voices.set_muted(&mut rig.mixer, true);
        assert_eq!(rig.mixer.volume_of(handle), Some(0.0));
        assert!(!voices.play_eva(&mut rig.ctx(), EvaVoice::NukeAttack));

        voices.set_muted(&mut rig.mixer, false);
        voices.set_volume(&mut rig.mixer, 0.4);
        assert!((rig.mixer.volume_of(handle).unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_preload_common() {
        let mut rig = Rig::new();
        let mut voices = VoiceArbiter::default();
        assert_eq!(voices.preload_common(&mut rig.ctx()), 10);
        assert_eq!(rig.mixer.clip_count(), 10);

        voices.unload_all(&mut rig.mixer);
        assert_eq!(rig.mixer.clip_count(), 0);
    }

    #[test]
    fn test_missing_voice_rejected() {
        let mut rig = Rig::new();
        rig.assets.remove("ACCOM1.AUD");
        let mut voices = VoiceArbiter::default();
        assert!(!voices.play_eva(&mut rig.ctx(), EvaVoice::MissionAccomplished));
        assert!(!voices.is_eva_speaking());
    }
}
