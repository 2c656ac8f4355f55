//! Music playback.
//!
//! This module provides:
//! - The music track catalog (menu themes and the in-game rotation)
//! - A single-track player with linear fade-out/fade-in transitions
//! - Shuffle and sequential advance through the in-game tracks
//! - A bounded history for stepping back
//!
//! # State machine
//!
//! ```text
//!            play                    play (fade > 0)
//! Stopped ─────────▶ Playing ───────────────────────▶ FadingOut
//!    ▲                │  ▲                               │
//!    │          pause │  │ resume          fade complete │
//!    │                ▼  │                               ▼
//!    │              Paused            pending? ──yes──▶ FadingIn ──▶ Playing
//!    └──────────────────────────────────── no ◀──┘
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use skirmish_common::{elapsed_ms, ConfigError, ConfigResult, Millis};
use skirmish_kernel::{clamp_unit, load_aud, AudioContext, AudioHandle, ClipId, Mixer, PlayParams};
use tracing::{debug, info};

/// Number of music tracks.
pub const TRACK_COUNT: usize = 20;

/// Default bound on the play history.
pub const DEFAULT_HISTORY_LEN: usize = 10;

/// Music tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MusicTrack {
    /// Title screen theme.
    Title,
    /// Main menu.
    Menu,
    /// Map selection screen.
    MapSelect,
    /// End of mission score screen.
    ScoreScreen,
    /// Credits.
    Credits,
    /// Bigfoot.
    Bigfoot,
    /// Crush.
    Crush,
    /// Face the Enemy.
    Face,
    /// Hell March.
    HellMarch,
    /// Run for Your Life.
    Run,
    /// Smash.
    Smash,
    /// Twin Cannon Mix.
    TwinMix,
    /// Warfare.
    Warfare,
    /// Dense.
    Dense,
    /// Vector.
    Vector,
    /// Workmen.
    Workmen,
    /// Await.
    Await,
    /// Grinder.
    Grinder,
    /// Shut It.
    ShutIt,
    /// Snake.
    Snake,
}

impl MusicTrack {
    /// Every track, in catalog order.
    pub const ALL: [Self; TRACK_COUNT] = [
        Self::Title,
        Self::Menu,
        Self::MapSelect,
        Self::ScoreScreen,
        Self::Credits,
        Self::Bigfoot,
        Self::Crush,
        Self::Face,
        Self::HellMarch,
        Self::Run,
        Self::Smash,
        Self::TwinMix,
        Self::Warfare,
        Self::Dense,
        Self::Vector,
        Self::Workmen,
        Self::Await,
        Self::Grinder,
        Self::ShutIt,
        Self::Snake,
    ];

    /// First track of the in-game rotation.
    pub const FIRST_IN_GAME: Self = Self::Bigfoot;

    /// Last track of the in-game rotation.
    pub const LAST_IN_GAME: Self = Self::Snake;

    /// Slot in the catalog.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Catalog entry.
    #[must_use]
    pub fn info(self) -> &'static MusicTrackInfo {
        &TRACK_CATALOG[self.index()]
    }

    /// AUD filename.
    #[must_use]
    pub fn filename(self) -> &'static str {
        self.info().filename
    }

    /// Human-readable name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    /// Whether the track is part of the in-game rotation.
    #[must_use]
    pub const fn is_in_game(self) -> bool {
        self.index() >= Self::FIRST_IN_GAME.index() && self.index() <= Self::LAST_IN_GAME.index()
    }

    /// In-game tracks, in rotation order.
    #[must_use]
    pub fn in_game() -> &'static [Self] {
        &IN_GAME_TRACKS
    }

    /// Next track of the rotation, wrapping. Menu tracks lead to the first
    /// in-game track.
    #[must_use]
    pub const fn next_in_game(self) -> Self {
        if !self.is_in_game() || self.index() == Self::LAST_IN_GAME.index() {
            Self::FIRST_IN_GAME
        } else {
            Self::ALL[self.index() + 1]
        }
    }
}

static IN_GAME_TRACKS: [MusicTrack; 15] = [
    MusicTrack::Bigfoot,
    MusicTrack::Crush,
    MusicTrack::Face,
    MusicTrack::HellMarch,
    MusicTrack::Run,
    MusicTrack::Smash,
    MusicTrack::TwinMix,
    MusicTrack::Warfare,
    MusicTrack::Dense,
    MusicTrack::Vector,
    MusicTrack::Workmen,
    MusicTrack::Await,
    MusicTrack::Grinder,
    MusicTrack::ShutIt,
    MusicTrack::Snake,
];

/// Static data for one track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicTrackInfo {
    /// Track this entry describes.
    pub track: MusicTrack,
    /// AUD filename.
    pub filename: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Menu or special-screen track.
    pub is_menu_track: bool,
    /// Base volume multiplier.
    pub default_volume: f32,
}

const fn track(
    track: MusicTrack,
    filename: &'static str,
    display_name: &'static str,
    is_menu_track: bool,
    default_volume: f32,
) -> MusicTrackInfo {
    MusicTrackInfo {
        track,
        filename,
        display_name,
        is_menu_track,
        default_volume,
    }
}

/// Track catalog, indexed by [`MusicTrack::index`].
pub static TRACK_CATALOG: [MusicTrackInfo; TRACK_COUNT] = [
    track(MusicTrack::Title, "INTRO.AUD", "Title Theme", true, 1.0),
    track(MusicTrack::Menu, "MENU.AUD", "Main Menu", true, 1.0),
    track(MusicTrack::MapSelect, "MAP.AUD", "Map Selection", true, 0.9),
    track(MusicTrack::ScoreScreen, "SCORE.AUD", "Score Screen", true, 1.0),
    track(MusicTrack::Credits, "CREDITS.AUD", "Credits", true, 1.0),
    track(MusicTrack::Bigfoot, "BIGFOOT.AUD", "Bigfoot", false, 1.0),
    track(MusicTrack::Crush, "CRUSH.AUD", "Crush", false, 1.0),
    track(MusicTrack::Face, "FACE.AUD", "Face the Enemy", false, 1.0),
    track(MusicTrack::HellMarch, "HELLMRCH.AUD", "Hell March", false, 1.0),
    track(MusicTrack::Run, "RUN.AUD", "Run for Your Life", false, 1.0),
    track(MusicTrack::Smash, "SMASH.AUD", "Smash", false, 1.0),
    track(MusicTrack::TwinMix, "TWINMIX.AUD", "Twin Cannon Mix", false, 1.0),
    track(MusicTrack::Warfare, "WARFARE.AUD", "Warfare", false, 1.0),
    track(MusicTrack::Dense, "DENSE.AUD", "Dense", false, 1.0),
    track(MusicTrack::Vector, "VECTOR.AUD", "Vector", false, 1.0),
    track(MusicTrack::Workmen, "WORKMEN.AUD", "Workmen", false, 1.0),
    track(MusicTrack::Await, "AWAIT.AUD", "Await", false, 1.0),
    track(MusicTrack::Grinder, "GRINDER.AUD", "Grinder", false, 1.0),
    track(MusicTrack::ShutIt, "SHUTIT.AUD", "Shut It", false, 1.0),
    track(MusicTrack::Snake, "SNAKE.AUD", "Snake", false, 1.0),
];

/// Checks that every catalog slot describes its own track.
pub fn validate_track_catalog() -> ConfigResult<()> {
    for (index, (entry, expected)) in TRACK_CATALOG.iter().zip(MusicTrack::ALL).enumerate() {
        if entry.track != expected {
            return Err(ConfigError::CatalogMismatch {
                catalog: "music tracks",
                index,
                expected: format!("{expected:?}"),
                found: format!("{:?}", entry.track),
            });
        }
        if entry.filename.is_empty() || entry.is_menu_track == expected.is_in_game() {
            return Err(ConfigError::CatalogMismatch {
                catalog: "music tracks",
                index,
                expected: "a filename and a consistent menu flag".to_string(),
                found: format!("{:?} (menu: {})", entry.filename, entry.is_menu_track),
            });
        }
    }
    Ok(())
}

/// Player lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MusicState {
    /// Nothing playing.
    Stopped,
    /// Playing at full volume.
    Playing,
    /// Paused mid-track.
    Paused,
    /// Ramping the current track down.
    FadingOut,
    /// Ramping the new track up.
    FadingIn,
}

/// Music player configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    /// Target volume (0.0-1.0).
    pub volume: f32,
    /// Draw the next track at random.
    pub shuffle: bool,
    /// Loop the current track.
    pub loop_enabled: bool,
    /// Advance to the next in-game track when one ends.
    pub auto_advance: bool,
    /// Fade duration; 0 switches tracks instantly.
    pub fade_ms: Millis,
    /// Play history bound.
    pub history_len: usize,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            volume: 0.8,
            shuffle: false,
            loop_enabled: true,
            auto_advance: true,
            fade_ms: 0,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

impl MusicConfig {
    /// Sets the fade duration.
    #[must_use]
    pub const fn with_fade(mut self, fade_ms: Millis) -> Self {
        self.fade_ms = fade_ms;
        self
    }

    /// Enables or disables looping.
    #[must_use]
    pub const fn with_loop(mut self, enabled: bool) -> Self {
        self.loop_enabled = enabled;
        self
    }

    /// Enables or disables shuffle.
    #[must_use]
    pub const fn with_shuffle(mut self, enabled: bool) -> Self {
        self.shuffle = enabled;
        self
    }
}

/// Single-track music player.
#[derive(Debug)]
pub struct MusicPlayer {
    config: MusicConfig,
    state: MusicState,
    current: Option<MusicTrack>,
    pending: Option<MusicTrack>,
    clip: Option<ClipId>,
    handle: Option<AudioHandle>,
    current_volume: f32,
    fade_from: f32,
    fade_start: Millis,
    muted: bool,
    history: VecDeque<MusicTrack>,
    shuffle_pool: Vec<MusicTrack>,
    rng: fastrand::Rng,
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self::new(MusicConfig::default())
    }
}

impl MusicPlayer {
    /// Creates a stopped player.
    #[must_use]
    pub fn new(config: MusicConfig) -> Self {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Creates a stopped player with a seeded shuffle.
    #[must_use]
    pub fn with_seed(config: MusicConfig, seed: u64) -> Self {
        Self::with_rng(config, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(config: MusicConfig, rng: fastrand::Rng) -> Self {
        let mut config = config;
        config.volume = clamp_unit(config.volume);
        config.history_len = config.history_len.max(2);
        let mut player = Self {
            current_volume: config.volume,
            config,
            state: MusicState::Stopped,
            current: None,
            pending: None,
            clip: None,
            handle: None,
            fade_from: 0.0,
            fade_start: 0,
            muted: false,
            history: VecDeque::new(),
            shuffle_pool: Vec::new(),
            rng,
        };
        if player.config.shuffle {
            player.refill_shuffle_pool();
        }
        player
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &MusicConfig {
        &self.config
    }

    // ============================================
    // Playback control
    // ============================================

    /// Plays a track, fading out the current one first when a fade is
    /// configured.
    ///
    /// Returns `false` when the track could not be loaded or started.
    pub fn play(&mut self, ctx: &mut AudioContext<'_>, track: MusicTrack) -> bool {
        if self.current == Some(track)
            && matches!(self.state, MusicState::Playing | MusicState::FadingIn)
        {
            return true;
        }

        match self.state {
            MusicState::FadingOut => {
                debug!("Music retargeted to {}", track.display_name());
                self.pending = Some(track);
                return true;
            },
            MusicState::Playing | MusicState::FadingIn if self.config.fade_ms > 0 => {
                self.pending = Some(track);
                self.begin_fade_out(ctx.now);
                return true;
            },
            _ => {},
        }

        self.start_now(ctx, track)
    }

    fn start_now(&mut self, ctx: &mut AudioContext<'_>, track: MusicTrack) -> bool {
        self.halt(ctx.mixer);
        self.pending = None;
        self.current_volume = self.config.volume;
        if !self.start_track(ctx, track) {
            self.state = MusicState::Stopped;
            return false;
        }
        self.state = MusicState::Playing;
        info!("Now playing: {}", track.display_name());
        true
    }

    /// Loads `track`, starts it at the current volume and records it.
    fn start_track(&mut self, ctx: &mut AudioContext<'_>, track: MusicTrack) -> bool {
        self.unload(ctx.mixer);

        let clip = match load_aud(ctx.assets, track.filename()) {
            Ok(decoded) => ctx.mixer.create_from_buffer(&decoded),
            Err(e) => {
                debug!("Music track {} unavailable: {}", track.filename(), e);
                None
            },
        };
        let Some(clip) = clip else {
            self.current = None;
            return false;
        };

        let params = PlayParams::default()
            .with_volume(self.output_volume(track))
            .with_looping(self.config.loop_enabled);
        let Some(handle) = ctx.mixer.play(clip, params) else {
            ctx.mixer.destroy(clip);
            self.current = None;
            return false;
        };

        self.clip = Some(clip);
        self.handle = Some(handle);
        self.current = Some(track);
        self.history.push_back(track);
        while self.history.len() > self.config.history_len {
            self.history.pop_front();
        }
        true
    }

    /// Stops playback, fading out when asked and a fade is configured.
    pub fn stop(&mut self, ctx: &mut AudioContext<'_>, fade: bool) {
        if !self.is_active() {
            return;
        }
        self.pending = None;
        if fade && self.config.fade_ms > 0 {
            match self.state {
                MusicState::FadingOut => return,
                MusicState::Playing | MusicState::FadingIn => {
                    self.begin_fade_out(ctx.now);
                    return;
                },
                _ => {},
            }
        }
        self.halt(ctx.mixer);
    }

    /// Pauses a playing track.
    pub fn pause(&mut self, mixer: &mut dyn Mixer) {
        if self.state != MusicState::Playing {
            return;
        }
        if let Some(handle) = self.handle {
            mixer.pause(handle);
        }
        self.state = MusicState::Paused;
    }

    /// Resumes a paused track.
    pub fn resume(&mut self, mixer: &mut dyn Mixer) {
        if self.state != MusicState::Paused {
            return;
        }
        if let Some(handle) = self.handle {
            mixer.resume(handle);
        }
        self.state = MusicState::Playing;
    }

    /// Pauses when playing, resumes when paused.
    pub fn toggle_pause(&mut self, mixer: &mut dyn Mixer) {
        match self.state {
            MusicState::Playing => self.pause(mixer),
            MusicState::Paused => self.resume(mixer),
            _ => {},
        }
    }

    /// Plays the next track: a shuffle draw or the next in rotation.
    pub fn play_next(&mut self, ctx: &mut AudioContext<'_>) -> bool {
        match self.next_track() {
            Some(track) => self.play(ctx, track),
            None => false,
        }
    }

    /// Replays the track before the current one.
    pub fn play_previous(&mut self, ctx: &mut AudioContext<'_>) -> bool {
        if self.history.len() < 2 {
            return false;
        }
        self.history.pop_back();
        match self.history.pop_back() {
            Some(previous) => self.play(ctx, previous),
            None => false,
        }
    }

    /// Plays a uniformly random in-game track.
    pub fn play_random(&mut self, ctx: &mut AudioContext<'_>) -> bool {
        let pool = MusicTrack::in_game();
        let track = pool[self.rng.usize(..pool.len())];
        self.play(ctx, track)
    }

    /// Releases the current clip.
    pub fn unload(&mut self, mixer: &mut dyn Mixer) {
        if let Some(handle) = self.handle.take() {
            mixer.stop(handle);
        }
        if let Some(clip) = self.clip.take() {
            mixer.destroy(clip);
        }
    }

    fn halt(&mut self, mixer: &mut dyn Mixer) {
        self.unload(mixer);
        self.state = MusicState::Stopped;
    }

    // ============================================
    // Per-frame update
    // ============================================

    /// Advances fades and reacts to the end of the current track.
    pub fn update(&mut self, ctx: &mut AudioContext<'_>) {
        if matches!(self.state, MusicState::FadingOut | MusicState::FadingIn) {
            self.update_fade(ctx);
        }

        if self.state == MusicState::Playing
            && self.handle.is_some_and(|h| !ctx.mixer.is_playing(h))
        {
            self.on_track_complete(ctx);
        }
    }

    fn begin_fade_out(&mut self, now: Millis) {
        self.fade_from = self.current_volume;
        self.fade_start = now;
        self.state = MusicState::FadingOut;
        debug!("Music fading out from {:.2}", self.fade_from);
    }

    fn fade_progress(&self, now: Millis) -> f32 {
        if self.config.fade_ms == 0 {
            return 1.0;
        }
        let elapsed = elapsed_ms(now, self.fade_start);
        (elapsed as f32 / self.config.fade_ms as f32).clamp(0.0, 1.0)
    }

    fn update_fade(&mut self, ctx: &mut AudioContext<'_>) {
        let progress = self.fade_progress(ctx.now);

        match self.state {
            MusicState::FadingOut => {
                self.current_volume = self.fade_from * (1.0 - progress);
                self.apply_volume(ctx.mixer);
                if progress < 1.0 {
                    return;
                }

                self.halt(ctx.mixer);
                if let Some(next) = self.pending.take() {
                    self.current_volume = 0.0;
                    if self.start_track(ctx, next) {
                        self.state = MusicState::FadingIn;
                        self.fade_start = ctx.now;
                        debug!("Music fading in: {}", next.display_name());
                    }
                }
            },
            MusicState::FadingIn => {
                self.current_volume = self.config.volume * progress;
                self.apply_volume(ctx.mixer);
                if progress >= 1.0 {
                    self.current_volume = self.config.volume;
                    self.state = MusicState::Playing;
                }
            },
            _ => {},
        }
    }

    fn on_track_complete(&mut self, ctx: &mut AudioContext<'_>) {
        self.halt(ctx.mixer);
        let advance = self.config.auto_advance && self.current.is_some_and(MusicTrack::is_in_game);
        if advance {
            self.play_next(ctx);
        }
    }

    // ============================================
    // Shuffle
    // ============================================

    fn next_track(&mut self) -> Option<MusicTrack> {
        if self.config.shuffle {
            self.pop_shuffle()
        } else {
            Some(self.current.map_or(MusicTrack::FIRST_IN_GAME, MusicTrack::next_in_game))
        }
    }

    fn pop_shuffle(&mut self) -> Option<MusicTrack> {
        if self.shuffle_pool.is_empty() {
            self.refill_shuffle_pool();
        }
        if self.shuffle_pool.is_empty() {
            return None;
        }
        let index = self.rng.usize(..self.shuffle_pool.len());
        Some(self.shuffle_pool.swap_remove(index))
    }

    fn refill_shuffle_pool(&mut self) {
        let current = self.current;
        self.shuffle_pool = MusicTrack::in_game()
            .iter()
            .copied()
            .filter(|t| Some(*t) != current)
            .collect();
    }

    /// Turns shuffle on or off. Turning it on refills the pool.
    pub fn set_shuffle(&mut self, enabled: bool) {
        self.config.shuffle = enabled;
        if enabled {
            self.refill_shuffle_pool();
        }
    }

    /// Refills the shuffle pool.
    pub fn reset_shuffle(&mut self) {
        self.refill_shuffle_pool();
    }

    /// Tracks not yet drawn in this shuffle round.
    #[must_use]
    pub fn shuffle_remaining(&self) -> usize {
        self.shuffle_pool.len()
    }

    /// Sets looping for tracks started from now on.
    pub fn set_loop(&mut self, enabled: bool) {
        self.config.loop_enabled = enabled;
    }

    /// Enables or disables advancing when a track ends.
    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.config.auto_advance = enabled;
    }

    /// Sets the fade duration.
    pub fn set_fade_duration(&mut self, fade_ms: Millis) {
        self.config.fade_ms = fade_ms;
    }

    // ============================================
    // Volume
    // ============================================

    fn output_volume(&self, track: MusicTrack) -> f32 {
        if self.muted {
            0.0
        } else {
            self.current_volume * track.info().default_volume
        }
    }

    fn apply_volume(&self, mixer: &mut dyn Mixer) {
        if let (Some(handle), Some(track)) = (self.handle, self.current) {
            mixer.set_volume(handle, self.output_volume(track));
        }
    }

    /// Sets the target volume. Takes effect at once while playing.
    pub fn set_volume(&mut self, mixer: &mut dyn Mixer, volume: f32) {
        self.config.volume = clamp_unit(volume);
        if matches!(self.state, MusicState::Playing | MusicState::Paused) {
            self.current_volume = self.config.volume;
            self.apply_volume(mixer);
        }
    }

    /// Target volume.
    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.config.volume
    }

    /// Volume right now, including fade progress.
    #[must_use]
    pub const fn current_volume(&self) -> f32 {
        self.current_volume
    }

    /// Mutes or unmutes without stopping.
    pub fn set_muted(&mut self, mixer: &mut dyn Mixer, muted: bool) {
        self.muted = muted;
        self.apply_volume(mixer);
    }

    /// Whether muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    // ============================================
    // Queries
    // ============================================

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> MusicState {
        self.state
    }

    /// Last track started. Kept after stopping so the rotation can resume.
    #[must_use]
    pub const fn current_track(&self) -> Option<MusicTrack> {
        self.current
    }

    /// Display name of the current track, or "None".
    #[must_use]
    pub fn current_track_name(&self) -> &'static str {
        self.current.map_or("None", MusicTrack::display_name)
    }

    /// Track waiting for the fade-out to finish.
    #[must_use]
    pub const fn pending_track(&self) -> Option<MusicTrack> {
        self.pending
    }

    /// Anything other than stopped.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != MusicState::Stopped
    }

    /// Playing at full volume.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == MusicState::Playing
    }

    /// Paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == MusicState::Paused
    }

    /// Recently started tracks, oldest first.
    pub fn history(&self) -> impl Iterator<Item = MusicTrack> + '_ {
        self.history.iter().copied()
    }
}
