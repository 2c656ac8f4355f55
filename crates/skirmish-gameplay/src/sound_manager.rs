//! Sound effect bank and playback arbitration.
//!
//! # Overview
//!
//! The [`SoundManager`] owns the decoded clip of every effect it has loaded
//! and every instance it has started. Each play request goes through the
//! same gate:
//!
//! ```text
//! request ──▶ muted? ──▶ loaded? ──▶ can_play? ──▶ audible? ──▶ mixer.play
//!               │           │            │             │
//!               └───────────┴────────────┴─────────────┴──▶ None
//! ```
//!
//! `can_play` enforces the per-effect overlap cap, the per-effect minimum
//! replay interval, and the global instance cap. Loading is lazy and a
//! missing or broken asset simply leaves the effect silent.

use skirmish_common::{cooldown_satisfied, CellCoord, Millis, WorldPoint, TILE_PIXEL_SIZE};
use skirmish_kernel::{
    clamp_unit, load_aud, AudioContext, AudioHandle, ClipId, Mixer, PlayParams, SpatialParams,
    DEFAULT_MAX_DISTANCE, MIN_AUDIBLE_VOLUME,
};
use tracing::{debug, info, warn};

use crate::sound_effects::{SoundCategory, SoundEffect, EFFECT_COUNT};

/// Default global cap on simultaneous effect instances.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Sound manager configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundManagerConfig {
    /// Global cap on simultaneous instances.
    pub max_concurrent: usize,
    /// Distance at which positional sounds become silent.
    pub max_distance: f32,
    /// Final volume below which a request is dropped.
    pub min_audible_volume: f32,
    /// Upper bound on overlapping instances of one effect, applied on top
    /// of the catalog cap. Zero leaves the catalog cap alone.
    pub max_same_sound: usize,
}

impl Default for SoundManagerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            max_distance: DEFAULT_MAX_DISTANCE,
            min_audible_volume: MIN_AUDIBLE_VOLUME,
            max_same_sound: 0,
        }
    }
}

impl SoundManagerConfig {
    /// Sets the global instance cap.
    #[must_use]
    pub const fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Sets the hearing distance.
    #[must_use]
    pub const fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance;
        self
    }

    /// Sets the audibility floor.
    #[must_use]
    pub const fn with_min_audible_volume(mut self, volume: f32) -> Self {
        self.min_audible_volume = volume;
        self
    }

    /// Sets the per-effect overlap bound.
    #[must_use]
    pub const fn with_max_same_sound(mut self, max: usize) -> Self {
        self.max_same_sound = max;
        self
    }
}

/// One instance started by the manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayingInstance {
    /// Mixer handle.
    pub handle: AudioHandle,
    /// Effect being played.
    pub effect: SoundEffect,
    /// Tick at which it started.
    pub started_at: Millis,
    /// World position, for positional plays.
    pub position: Option<WorldPoint>,
    /// Volume handed to the mixer.
    pub volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Unloaded,
    Loaded(ClipId),
    Failed,
}

/// Sound effect bank.
#[derive(Debug)]
pub struct SoundManager {
    config: SoundManagerConfig,
    clips: [LoadState; EFFECT_COUNT],
    counts: [usize; EFFECT_COUNT],
    last_played: [Option<Millis>; EFFECT_COUNT],
    playing: Vec<PlayingInstance>,
    category_volumes: [f32; SoundCategory::ALL.len()],
    volume: f32,
    muted: bool,
    listener: WorldPoint,
}

impl Default for SoundManager {
    fn default() -> Self {
        Self::new(SoundManagerConfig::default())
    }
}

impl SoundManager {
    /// Creates an empty bank.
    #[must_use]
    pub fn new(config: SoundManagerConfig) -> Self {
        let mut config = config;
        config.max_distance = config.max_distance.max(1.0);
        Self {
            config,
            clips: [LoadState::Unloaded; EFFECT_COUNT],
            counts: [0; EFFECT_COUNT],
            last_played: [None; EFFECT_COUNT],
            playing: Vec::new(),
            category_volumes: [1.0; SoundCategory::ALL.len()],
            volume: 1.0,
            muted: false,
            listener: WorldPoint::default(),
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &SoundManagerConfig {
        &self.config
    }

    // ============================================
    // Loading
    // ============================================

    /// Loads every effect. Returns how many are loaded afterwards.
    pub fn load_all(&mut self, ctx: &mut AudioContext<'_>) -> usize {
        for effect in SoundEffect::ALL {
            self.load(ctx, effect);
        }
        let loaded = self.loaded_count();
        info!("Sound bank loaded {}/{} effects", loaded, EFFECT_COUNT);
        loaded
    }

    /// Loads one effect if it is not loaded yet.
    ///
    /// An effect whose asset was missing or broken is not retried until
    /// [`SoundManager::unload_all`].
    pub fn load(&mut self, ctx: &mut AudioContext<'_>, effect: SoundEffect) -> Option<ClipId> {
        match self.clips[effect.index()] {
            LoadState::Loaded(clip) => return Some(clip),
            LoadState::Failed => return None,
            LoadState::Unloaded => {},
        }

        let filename = effect.filename();
        let state = match load_aud(ctx.assets, filename) {
            Ok(decoded) => match ctx.mixer.create_from_buffer(&decoded) {
                Some(clip) => LoadState::Loaded(clip),
                None => {
                    warn!("Mixer rejected clip {}", filename);
                    LoadState::Failed
                },
            },
            Err(e) if e.is_missing() => {
                debug!("Sound asset not present: {}", filename);
                LoadState::Failed
            },
            Err(e) => {
                warn!("{}", e);
                LoadState::Failed
            },
        };
        self.clips[effect.index()] = state;

        match state {
            LoadState::Loaded(clip) => Some(clip),
            _ => None,
        }
    }

    /// Stops everything and releases every clip.
    pub fn unload_all(&mut self, mixer: &mut dyn Mixer) {
        self.stop_all(mixer);
        for state in &mut self.clips {
            if let LoadState::Loaded(clip) = *state {
                mixer.destroy(clip);
            }
            *state = LoadState::Unloaded;
        }
        self.last_played = [None; EFFECT_COUNT];
    }

    /// Whether an effect's clip is uploaded.
    #[must_use]
    pub fn is_loaded(&self, effect: SoundEffect) -> bool {
        matches!(self.clips[effect.index()], LoadState::Loaded(_))
    }

    /// Number of uploaded clips.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.clips
            .iter()
            .filter(|s| matches!(s, LoadState::Loaded(_)))
            .count()
    }

    // ============================================
    // Playback
    // ============================================

    /// Plays an effect without positioning.
    pub fn play(
        &mut self,
        ctx: &mut AudioContext<'_>,
        effect: SoundEffect,
        volume: f32,
    ) -> Option<AudioHandle> {
        self.start(ctx, effect, clamp_unit(volume), 0.0, None)
    }

    /// Plays an effect at a world position, attenuated and panned relative
    /// to the listener.
    pub fn play_at(
        &mut self,
        ctx: &mut AudioContext<'_>,
        effect: SoundEffect,
        position: WorldPoint,
        volume: f32,
    ) -> Option<AudioHandle> {
        let spatial = SpatialParams::compute(self.listener, position, self.config.max_distance);
        if !spatial.in_range() {
            return None;
        }
        let volume = clamp_unit(volume) * spatial.attenuation;
        self.start(ctx, effect, volume, spatial.pan, Some(position))
    }

    /// Plays an effect at the center of a map cell.
    pub fn play_at_cell(
        &mut self,
        ctx: &mut AudioContext<'_>,
        effect: SoundEffect,
        cell: CellCoord,
        volume: f32,
    ) -> Option<AudioHandle> {
        self.play_at(ctx, effect, cell.center(TILE_PIXEL_SIZE), volume)
    }

    fn start(
        &mut self,
        ctx: &mut AudioContext<'_>,
        effect: SoundEffect,
        volume: f32,
        pan: f32,
        position: Option<WorldPoint>,
    ) -> Option<AudioHandle> {
        if self.muted {
            return None;
        }
        let clip = self.load(ctx, effect)?;
        if !self.can_play(effect, ctx.now) {
            debug!("Sound {:?} suppressed by playback limits", effect);
            return None;
        }

        let info = effect.info();
        let volume = volume
            * info.default_volume
            * self.category_volumes[info.category.index()]
            * self.volume;
        if volume < self.config.min_audible_volume {
            return None;
        }

        let params = PlayParams::default().with_volume(volume).with_pan(pan);
        let handle = ctx.mixer.play(clip, params)?;

        self.playing.push(PlayingInstance {
            handle,
            effect,
            started_at: ctx.now,
            position,
            volume,
        });
        self.counts[effect.index()] += 1;
        self.last_played[effect.index()] = Some(ctx.now);
        Some(handle)
    }

    /// Whether another instance of `effect` may start at `now`.
    #[must_use]
    pub fn can_play(&self, effect: SoundEffect, now: Millis) -> bool {
        let info = effect.info();
        if let Some(cap) = self.overlap_cap(usize::from(info.max_concurrent)) {
            if self.counts[effect.index()] >= cap {
                return false;
            }
        }
        if let Some(last) = self.last_played[effect.index()] {
            if !cooldown_satisfied(now, last, info.min_interval_ms) {
                return false;
            }
        }
        self.playing.len() < self.config.max_concurrent
    }

    fn overlap_cap(&self, catalog: usize) -> Option<usize> {
        match (catalog, self.config.max_same_sound) {
            (0, 0) => None,
            (0, bound) => Some(bound),
            (cap, 0) => Some(cap),
            (cap, bound) => Some(cap.min(bound)),
        }
    }

    /// Stops one instance started by this manager.
    pub fn stop(&mut self, mixer: &mut dyn Mixer, handle: AudioHandle) {
        if let Some(pos) = self.playing.iter().position(|p| p.handle == handle) {
            let instance = self.playing.swap_remove(pos);
            mixer.stop(handle);
            self.release(instance.effect);
        }
    }

    /// Stops every instance started by this manager.
    pub fn stop_all(&mut self, mixer: &mut dyn Mixer) {
        for instance in self.playing.drain(..) {
            mixer.stop(instance.handle);
        }
        self.counts = [0; EFFECT_COUNT];
    }

    /// Forgets instances the mixer reports as finished.
    pub fn update(&mut self, mixer: &dyn Mixer) {
        let mut finished = Vec::new();
        self.playing.retain(|p| {
            let alive = mixer.is_playing(p.handle);
            if !alive {
                finished.push(p.effect);
            }
            alive
        });
        for effect in finished {
            self.release(effect);
        }
    }

    fn release(&mut self, effect: SoundEffect) {
        let count = &mut self.counts[effect.index()];
        *count = count.saturating_sub(1);
    }

    /// Whether any instance of `effect` is live.
    #[must_use]
    pub fn is_playing(&self, effect: SoundEffect) -> bool {
        self.counts[effect.index()] > 0
    }

    /// Number of live instances.
    #[must_use]
    pub fn playing_count(&self) -> usize {
        self.playing.len()
    }

    /// Live instances.
    #[must_use]
    pub fn instances(&self) -> &[PlayingInstance] {
        &self.playing
    }

    // ============================================
    // Volume and listener
    // ============================================

    /// Sets the subsystem volume applied to every effect.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_unit(volume);
    }

    /// Subsystem volume.
    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Sets a category volume.
    pub fn set_category_volume(&mut self, category: SoundCategory, volume: f32) {
        self.category_volumes[category.index()] = clamp_unit(volume);
    }

    /// Category volume.
    #[must_use]
    pub const fn category_volume(&self, category: SoundCategory) -> f32 {
        self.category_volumes[category.index()]
    }

    /// Mutes or unmutes. Muting stops everything.
    pub fn set_muted(&mut self, mixer: &mut dyn Mixer, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_all(mixer);
        }
    }

    /// Whether muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Moves the listener.
    pub fn set_listener_position(&mut self, position: WorldPoint) {
        self.listener = position;
    }

    /// Listener position.
    #[must_use]
    pub const fn listener_position(&self) -> WorldPoint {
        self.listener
    }

    /// Sets the hearing distance (at least 1).
    pub fn set_max_distance(&mut self, distance: f32) {
        self.config.max_distance = distance.max(1.0);
    }

    /// Hearing distance.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.config.max_distance
    }
}
