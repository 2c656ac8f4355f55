//! Audio facade.
//!
//! [`AudioSystem`] is the one object the game holds for audio. It owns the
//! mixer, the asset source and the clock, plus the three playback managers
//! and the trigger rate limiter. Master and category volumes are kept in a
//! [`VolumeSettings`] and pushed down into each manager as products
//! (`master × category`), so the managers never see the master directly.
//!
//! The facade is single-threaded and poll-based. Call [`AudioSystem::update`]
//! once per frame.

use skirmish_common::{CellCoord, Clock, ConfigResult, Millis, WorldPoint};
use skirmish_gameplay::{
    validate_catalogs, AudioEventType, EvaVoice, Faction, MusicPlayer, MusicState, MusicTrack,
    RateLimiter, SoundCategory, SoundEffect, SoundManager, UnitVoice, VoiceArbiter,
};
use skirmish_kernel::{
    AssetSource, AudioContext, AudioHandle, Mixer, VolumeChannel, VolumeSettings,
};
use tracing::{debug, info};

use crate::config::AudioSystemConfig;

/// Minimum time between rate limiter cleanups.
pub const CLEANUP_INTERVAL_MS: Millis = 1_000;

/// Highest legacy volume level.
pub const LEGACY_VOLUME_MAX: i32 = 255;

/// Snapshot of the audio system for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStats {
    /// Effects with an uploaded clip.
    pub loaded_sounds: usize,
    /// Live effect instances.
    pub playing_sounds: usize,
    /// Music lifecycle state.
    pub music_state: MusicState,
    /// Display name of the current track.
    pub current_track_name: &'static str,
    /// Whether the announcer line is busy.
    pub eva_speaking: bool,
    /// Whether the unit line is busy.
    pub unit_speaking: bool,
    /// Waiting announcer lines.
    pub voice_queue_len: usize,
    /// Master volume.
    pub master_volume: f32,
    /// Effects volume.
    pub sfx_volume: f32,
    /// Music volume.
    pub music_volume: f32,
    /// Voice volume.
    pub voice_volume: f32,
    /// Master mute.
    pub muted: bool,
    /// Timestamps held by the rate limiter.
    pub rate_limit_entries: usize,
}

impl AudioStats {
    /// Whether music is audible or about to be.
    #[must_use]
    pub fn music_playing(&self) -> bool {
        matches!(
            self.music_state,
            MusicState::Playing | MusicState::FadingIn | MusicState::FadingOut
        )
    }
}

impl std::fmt::Display for AudioStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Master: {:.0}%{}",
            self.master_volume * 100.0,
            if self.muted { " (MUTED)" } else { "" }
        )?;
        writeln!(
            f,
            "Volumes: SFX={:.0}% Music={:.0}% Voice={:.0}%",
            self.sfx_volume * 100.0,
            self.music_volume * 100.0,
            self.voice_volume * 100.0
        )?;
        writeln!(
            f,
            "Sounds: {} loaded, {} playing",
            self.loaded_sounds, self.playing_sounds
        )?;
        writeln!(f, "Music: {:?} - {}", self.music_state, self.current_track_name)?;
        write!(
            f,
            "Voice: EVA={} Unit={} Queue={}",
            if self.eva_speaking { "Speaking" } else { "Silent" },
            if self.unit_speaking { "Speaking" } else { "Silent" },
            self.voice_queue_len
        )
    }
}

/// The audio subsystem.
pub struct AudioSystem {
    config: AudioSystemConfig,
    mixer: Box<dyn Mixer>,
    assets: Box<dyn AssetSource>,
    clock: Box<dyn Clock>,
    sounds: SoundManager,
    music: MusicPlayer,
    voices: VoiceArbiter,
    limiter: RateLimiter<AudioEventType>,
    volumes: VolumeSettings,
    now: Millis,
    last_cleanup: Millis,
}

impl std::fmt::Debug for AudioSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSystem")
            .field("sounds", &self.sounds)
            .field("music", &self.music)
            .field("voices", &self.voices)
            .field("volumes", &self.volumes)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl AudioSystem {
    /// Builds the subsystem on the given collaborators.
    ///
    /// Validates the configuration and the static catalogs, then preloads
    /// every effect and the common announcer lines. Missing assets are not
    /// an error.
    pub fn new(
        config: AudioSystemConfig,
        mixer: Box<dyn Mixer>,
        assets: Box<dyn AssetSource>,
        clock: Box<dyn Clock>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        validate_catalogs()?;

        info!("AudioSystem: Initializing...");

        let now = clock.now_ms();
        let mut volumes = VolumeSettings::default();
        volumes.set(VolumeChannel::Master, config.master_volume);
        volumes.set(VolumeChannel::Sfx, config.sfx_volume);
        volumes.set(VolumeChannel::Music, config.music_volume);
        volumes.set(VolumeChannel::Voice, config.voice_volume);

        let mut system = Self {
            sounds: SoundManager::new(config.sound_config()),
            music: MusicPlayer::new(config.music_config()),
            voices: VoiceArbiter::new(config.voice_config()),
            limiter: config.rate_limiter(),
            config,
            mixer,
            assets,
            clock,
            volumes,
            now,
            last_cleanup: now,
        };
        system.apply_volumes();

        let mut ctx = AudioContext::new(system.mixer.as_mut(), system.assets.as_ref(), now);
        let sounds = system.sounds.load_all(&mut ctx);
        let voices = system.voices.preload_common(&mut ctx);

        info!(
            "AudioSystem: Initialized ({} effects, {} voice lines)",
            sounds, voices
        );
        info!("  SFX Volume: {:.0}%", system.config.sfx_volume * 100.0);
        info!("  Music Volume: {:.0}%", system.config.music_volume * 100.0);
        info!("  Voice Volume: {:.0}%", system.config.voice_volume * 100.0);
        Ok(system)
    }

    /// Stops everything and releases every clip.
    pub fn shutdown(&mut self) {
        info!("AudioSystem: Shutting down...");
        self.stop_all();
        self.voices.unload_all(self.mixer.as_mut());
        self.music.unload(self.mixer.as_mut());
        self.sounds.unload_all(self.mixer.as_mut());
        self.limiter.reset();
        info!("AudioSystem: Shutdown complete");
    }

    // ============================================
    // Frame update
    // ============================================

    /// Advances every component. Samples the clock once.
    pub fn update(&mut self) {
        self.now = self.clock.now_ms();
        let now = self.now;

        self.sounds.update(self.mixer.as_ref());
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.music.update(&mut ctx);
        self.voices.update(&mut ctx);

        if now.wrapping_sub(self.last_cleanup) >= CLEANUP_INTERVAL_MS {
            let removed = self.limiter.cleanup(now);
            if removed > 0 {
                debug!("Pruned {} idle cooldown entries", removed);
            }
            self.last_cleanup = now;
        }
    }

    /// Frame time: the clock sample taken by the last [`update`](Self::update).
    ///
    /// Every call made between two updates sees this same timestamp.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.now
    }

    // ============================================
    // Volumes
    // ============================================

    fn apply_volumes(&mut self) {
        self.sounds
            .set_volume(self.volumes.effective(VolumeChannel::Sfx));
        self.music
            .set_volume(self.mixer.as_mut(), self.volumes.effective(VolumeChannel::Music));
        self.voices
            .set_volume(self.mixer.as_mut(), self.volumes.effective(VolumeChannel::Voice));
    }

    /// Sets a channel volume, clamped to [0, 1].
    pub fn set_channel_volume(&mut self, channel: VolumeChannel, volume: f32) {
        self.volumes.set(channel, volume);
        self.apply_volumes();
    }

    /// Channel volume as set, before master composition.
    #[must_use]
    pub const fn channel_volume(&self, channel: VolumeChannel) -> f32 {
        self.volumes.get(channel)
    }

    /// Sets the master volume.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.set_channel_volume(VolumeChannel::Master, volume);
    }

    /// Master volume.
    #[must_use]
    pub const fn master_volume(&self) -> f32 {
        self.volumes.get(VolumeChannel::Master)
    }

    /// Sets the effects volume.
    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.set_channel_volume(VolumeChannel::Sfx, volume);
    }

    /// Effects volume.
    #[must_use]
    pub const fn sfx_volume(&self) -> f32 {
        self.volumes.get(VolumeChannel::Sfx)
    }

    /// Sets the music volume.
    pub fn set_music_volume(&mut self, volume: f32) {
        self.set_channel_volume(VolumeChannel::Music, volume);
    }

    /// Music volume.
    #[must_use]
    pub const fn music_volume(&self) -> f32 {
        self.volumes.get(VolumeChannel::Music)
    }

    /// Sets the voice volume.
    pub fn set_voice_volume(&mut self, volume: f32) {
        self.set_channel_volume(VolumeChannel::Voice, volume);
    }

    /// Voice volume.
    #[must_use]
    pub const fn voice_volume(&self) -> f32 {
        self.volumes.get(VolumeChannel::Voice)
    }

    /// Sets an effect category volume.
    pub fn set_category_volume(&mut self, category: SoundCategory, volume: f32) {
        self.sounds.set_category_volume(category, volume);
    }

    /// Effect category volume.
    #[must_use]
    pub const fn category_volume(&self, category: SoundCategory) -> f32 {
        self.sounds.category_volume(category)
    }

    /// Master mute. Live effects are stopped; music and voices go silent
    /// and pick up again on unmute.
    pub fn set_muted(&mut self, muted: bool) {
        self.volumes.set_muted(muted);
        let mixer = self.mixer.as_mut();
        self.sounds.set_muted(mixer, muted);
        self.music.set_muted(mixer, muted);
        self.voices.set_muted(mixer, muted);
        self.apply_volumes();
        info!("Audio {}", if muted { "muted" } else { "unmuted" });
    }

    /// Whether master mute is on.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.volumes.is_muted()
    }

    /// Flips master mute.
    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.is_muted());
    }

    /// Sets a channel volume on the 0..=255 scale. Out-of-range levels are
    /// clamped.
    pub fn set_volume_level(&mut self, channel: VolumeChannel, level: i32) {
        let level = level.clamp(0, LEGACY_VOLUME_MAX);
        self.set_channel_volume(channel, level as f32 / LEGACY_VOLUME_MAX as f32);
    }

    /// Channel volume on the 0..=255 scale.
    #[must_use]
    pub fn volume_level(&self, channel: VolumeChannel) -> i32 {
        (self.volumes.get(channel) * LEGACY_VOLUME_MAX as f32).round() as i32
    }

    // ============================================
    // Sound effects
    // ============================================

    /// Plays an effect without positioning.
    pub fn play_sound(&mut self, effect: SoundEffect) -> Option<AudioHandle> {
        if self.is_muted() {
            return None;
        }
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.sounds.play(&mut ctx, effect, 1.0)
    }

    /// Plays an effect at a world position.
    pub fn play_sound_at(&mut self, effect: SoundEffect, position: WorldPoint) -> Option<AudioHandle> {
        if self.is_muted() {
            return None;
        }
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.sounds.play_at(&mut ctx, effect, position, 1.0)
    }

    /// Plays an effect at the center of a map cell.
    pub fn play_sound_at_cell(&mut self, effect: SoundEffect, cell: CellCoord) -> Option<AudioHandle> {
        if self.is_muted() {
            return None;
        }
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.sounds.play_at_cell(&mut ctx, effect, cell, 1.0)
    }

    /// Stops one effect instance.
    pub fn stop_sound(&mut self, handle: AudioHandle) {
        self.sounds.stop(self.mixer.as_mut(), handle);
    }

    /// Stops every effect instance.
    pub fn stop_all_sounds(&mut self) {
        self.sounds.stop_all(self.mixer.as_mut());
    }

    /// Moves the listener, typically to the viewport center.
    pub fn set_listener_position(&mut self, position: WorldPoint) {
        self.sounds.set_listener_position(position);
    }

    // ============================================
    // Music
    // ============================================

    /// Plays a track.
    pub fn play_music(&mut self, track: MusicTrack) -> bool {
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.music.play(&mut ctx, track)
    }

    /// Stops music, fading out when a fade is configured.
    pub fn stop_music(&mut self) {
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.music.stop(&mut ctx, true);
    }

    /// Pauses music.
    pub fn pause_music(&mut self) {
        self.music.pause(self.mixer.as_mut());
    }

    /// Resumes music.
    pub fn resume_music(&mut self) {
        self.music.resume(self.mixer.as_mut());
    }

    /// Pauses or resumes music.
    pub fn toggle_music_pause(&mut self) {
        self.music.toggle_pause(self.mixer.as_mut());
    }

    /// Advances to the next track.
    pub fn next_track(&mut self) -> bool {
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.music.play_next(&mut ctx)
    }

    /// Goes back one track.
    pub fn previous_track(&mut self) -> bool {
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.music.play_previous(&mut ctx)
    }

    /// Enables or disables shuffle.
    pub fn set_music_shuffle(&mut self, enabled: bool) {
        self.music.set_shuffle(enabled);
    }

    /// Whether music is playing (not paused or stopped).
    #[must_use]
    pub fn is_music_playing(&self) -> bool {
        self.music.is_playing()
    }

    /// Display name of the current track, or `"None"`.
    #[must_use]
    pub fn current_track_name(&self) -> &'static str {
        self.music.current_track_name()
    }

    // ============================================
    // Voices
    // ============================================

    /// Speaks an announcer line now, preempting lower priority lines.
    pub fn play_eva(&mut self, voice: EvaVoice) -> bool {
        if self.is_muted() {
            return false;
        }
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.voices.play_eva(&mut ctx, voice)
    }

    /// Queues an announcer line behind the current one.
    pub fn queue_eva(&mut self, voice: EvaVoice) -> bool {
        let now = self.now;
        self.voices.queue_eva(voice, now)
    }

    /// Speaks a unit acknowledgement if the unit line is free.
    pub fn play_unit(&mut self, voice: UnitVoice, faction: Faction) -> Option<AudioHandle> {
        if self.is_muted() {
            return None;
        }
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.voices.play_unit(&mut ctx, voice, faction)
    }

    /// Silences both voice lines and drops waiting announcer lines.
    pub fn stop_all_voices(&mut self) {
        let mixer = self.mixer.as_mut();
        self.voices.stop_eva(mixer);
        self.voices.stop_unit(mixer);
        self.voices.clear_eva_queue();
    }

    /// Stops effects, music and voices.
    pub fn stop_all(&mut self) {
        self.stop_all_sounds();
        let now = self.now;
        let mut ctx = AudioContext::new(self.mixer.as_mut(), self.assets.as_ref(), now);
        self.music.stop(&mut ctx, false);
        self.stop_all_voices();
    }

    // ============================================
    // Configuration and diagnostics
    // ============================================

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &AudioSystemConfig {
        &self.config
    }

    /// Applies a new configuration without restarting playback.
    pub fn update_config(&mut self, config: AudioSystemConfig) -> ConfigResult<()> {
        config.validate()?;

        self.volumes.set(VolumeChannel::Master, config.master_volume);
        self.volumes.set(VolumeChannel::Sfx, config.sfx_volume);
        self.volumes.set(VolumeChannel::Music, config.music_volume);
        self.volumes.set(VolumeChannel::Voice, config.voice_volume);
        self.apply_volumes();

        self.music.set_shuffle(config.music_shuffle);
        self.music.set_loop(config.music_loop);
        self.music.set_auto_advance(config.music_auto_advance);
        self.music.set_fade_duration(config.music_fade_ms);

        self.sounds.set_max_distance(config.max_audible_distance);
        self.voices.set_queue_capacity(config.eva_queue_capacity);

        let profiles = config.rate_limiter();
        for event in AudioEventType::ALL {
            self.limiter.set_profile(event, profiles.profile(event));
        }

        self.config = config;
        debug!("Audio configuration updated");
        Ok(())
    }

    /// Diagnostic snapshot.
    #[must_use]
    pub fn stats(&self) -> AudioStats {
        AudioStats {
            loaded_sounds: self.sounds.loaded_count(),
            playing_sounds: self.sounds.playing_count(),
            music_state: self.music.state(),
            current_track_name: self.music.current_track_name(),
            eva_speaking: self.voices.is_eva_speaking(),
            unit_speaking: self.voices.is_unit_speaking(),
            voice_queue_len: self.voices.queue_len(),
            master_volume: self.master_volume(),
            sfx_volume: self.sfx_volume(),
            music_volume: self.music_volume(),
            voice_volume: self.voice_volume(),
            muted: self.is_muted(),
            rate_limit_entries: self.limiter.tracked_count(),
        }
    }

    // ============================================
    // Component access
    // ============================================

    /// Sound bank.
    #[must_use]
    pub const fn sounds(&self) -> &SoundManager {
        &self.sounds
    }

    /// Music player.
    #[must_use]
    pub const fn music(&self) -> &MusicPlayer {
        &self.music
    }

    /// Voice arbiter.
    #[must_use]
    pub const fn voices(&self) -> &VoiceArbiter {
        &self.voices
    }

    /// Trigger rate limiter.
    #[must_use]
    pub const fn limiter(&self) -> &RateLimiter<AudioEventType> {
        &self.limiter
    }

    /// Trigger rate limiter, for the event router.
    pub fn limiter_mut(&mut self) -> &mut RateLimiter<AudioEventType> {
        &mut self.limiter
    }

    /// Samples the clock and returns it along with the limiter.
    pub(crate) fn limiter_at_now(&mut self) -> (&mut RateLimiter<AudioEventType>, Millis) {
        let now = self.now;
        (&mut self.limiter, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_common::{ConfigError, ManualClock};
    use skirmish_kernel::{HeadlessMixer, MemoryAssets};

    use crate::test_support::rig;

    #[test]
    fn test_init_preloads() {
        let rig = rig(AudioSystemConfig::default());
        let stats = rig.system.stats();
        assert_eq!(stats.loaded_sounds, SoundEffect::ALL.len());
        assert_eq!(stats.music_state, MusicState::Stopped);
        assert_eq!(stats.current_track_name, "None");
        assert!(!stats.muted);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AudioSystemConfig {
            max_concurrent_sounds: 0,
            ..AudioSystemConfig::default()
        };
        let result = AudioSystem::new(
            config,
            Box::new(HeadlessMixer::new()),
            Box::new(MemoryAssets::new()),
            Box::new(ManualClock::new(0)),
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_assets_are_silent() {
        let mut system = AudioSystem::new(
            AudioSystemConfig::default(),
            Box::new(HeadlessMixer::new()),
            Box::new(MemoryAssets::new()),
            Box::new(ManualClock::new(0)),
        )
        .unwrap();
        assert_eq!(system.stats().loaded_sounds, 0);
        assert!(system.play_sound(SoundEffect::UiClick).is_none());
        assert!(!system.play_music(MusicTrack::Bigfoot));
        assert!(!system.play_eva(EvaVoice::LowPower));
    }

    #[test]
    fn test_master_composes_into_effects() {
        let mut rig = rig(AudioSystemConfig::default());
        rig.system.set_master_volume(0.5);
        rig.system.set_sfx_volume(0.5);
        assert!((rig.system.sounds().volume() - 0.25).abs() < 1e-6);

        let handle = rig.system.play_sound(SoundEffect::UiClick).unwrap();
        let expected = 0.25 * SoundEffect::UiClick.info().default_volume;
        assert!((rig.mixer.volume_of(handle).unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_volumes_clamped() {
        let mut rig = rig(AudioSystemConfig::default());
        rig.system.set_voice_volume(3.0);
        rig.system.set_music_volume(-1.0);
        assert_eq!(rig.system.voice_volume(), 1.0);
        assert_eq!(rig.system.music_volume(), 0.0);
    }

    #[test]
    fn test_music_volume_applies_to_live_track() {
        let mut rig = rig(AudioSystemConfig::default());
        assert!(rig.system.play_music(MusicTrack::Bigfoot));
        let handle = rig.mixer.active_handles()[0];

        rig.system.set_master_volume(0.5);
        let base = MusicTrack::Bigfoot.info().default_volume;
        let expected = 0.5 * 0.8 * base;
        assert!((rig.mixer.volume_of(handle).unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_mute_blocks_and_restores() {
        let mut rig = rig(AudioSystemConfig::default());
        let click = rig.system.play_sound(SoundEffect::UiClick).unwrap();
        assert!(rig.system.play_music(MusicTrack::Bigfoot));

        rig.system.set_muted(true);
        assert!(!rig.mixer.is_playing(click));
        assert!(rig.system.play_sound(SoundEffect::UiBeep).is_none());
        assert!(!rig.system.play_eva(EvaVoice::LowPower));
        assert!(rig.system.is_music_playing());

        rig.system.toggle_mute();
        assert!(!rig.system.is_muted());
        rig.clock.advance(500);
        rig.system.update();
        assert!(rig.system.play_sound(SoundEffect::UiBeep).is_some());
    }

    #[test]
    fn test_calls_between_frames_share_the_frame_time() {
        let mut rig = rig(AudioSystemConfig::default());
        assert_eq!(rig.system.now(), 10_000);
        assert!(rig.system.play_sound(SoundEffect::UiBeep).is_some());

        rig.clock.advance(500);
        assert_eq!(rig.system.now(), 10_000);
        assert!(rig.system.play_sound(SoundEffect::UiBeep).is_none());
        let (limiter, now) = rig.system.limiter_at_now();
        assert_eq!(now, 10_000);
        assert!(limiter.can_fire_global(AudioEventType::UiClick, now));
        assert!(!limiter.can_fire_global(AudioEventType::UiClick, now));

        rig.system.update();
        assert_eq!(rig.system.now(), 10_500);
        assert!(rig.system.play_sound(SoundEffect::UiBeep).is_some());
        let (limiter, now) = rig.system.limiter_at_now();
        assert!(limiter.can_fire_global(AudioEventType::UiClick, now));
    }

    #[test]
    fn test_legacy_volume_levels() {
        let mut rig = rig(AudioSystemConfig::default());
        rig.system.set_volume_level(VolumeChannel::Sfx, 300);
        assert_eq!(rig.system.volume_level(VolumeChannel::Sfx), 255);
        rig.system.set_volume_level(VolumeChannel::Sfx, -4);
        assert_eq!(rig.system.volume_level(VolumeChannel::Sfx), 0);
        rig.system.set_volume_level(VolumeChannel::Music, 128);
        assert_eq!(rig.system.volume_level(VolumeChannel::Music), 128);
    }

    #[test]
    fn test_update_reaps_and_drains() {
        let mut rig = rig(AudioSystemConfig::default());
        rig.system.play_sound(SoundEffect::UiClick).unwrap();
        assert!(rig.system.play_eva(EvaVoice::UnitReady));
        assert!(rig.system.queue_eva(EvaVoice::LowPower));
        assert_eq!(rig.system.stats().playing_sounds, 1);

        rig.mixer.finish_all();
        rig.clock.advance(16);
        rig.system.update();

        let stats = rig.system.stats();
        assert_eq!(stats.playing_sounds, 0);
        assert!(stats.eva_speaking);
        assert_eq!(stats.voice_queue_len, 0);
        assert_eq!(rig.system.voices().current_eva(), Some(EvaVoice::LowPower));
    }

    #[test]
    fn test_cleanup_runs_at_most_once_per_second() {
        let mut rig = rig(AudioSystemConfig::default());
        let cell = CellCoord::new(3, 3);
        let (limiter, now) = rig.system.limiter_at_now();
        assert!(limiter.can_fire_at_position(AudioEventType::WeaponFire, cell, now));
        assert_eq!(rig.system.limiter().tracked_count(), 1);

        rig.clock.advance(61_000);
        rig.system.update();
        assert_eq!(rig.system.limiter().tracked_count(), 0);
    }

    #[test]
    fn test_stop_all() {
        let mut rig = rig(AudioSystemConfig::default());
        rig.system.play_sound(SoundEffect::UiClick).unwrap();
        assert!(rig.system.play_music(MusicTrack::Bigfoot));
        assert!(rig.system.play_eva(EvaVoice::UnitReady));
        rig.system.play_unit(UnitVoice::Reporting, Faction::Allied).unwrap();

        rig.system.stop_all();
        assert_eq!(rig.mixer.active_count(), 0);
        let stats = rig.system.stats();
        assert!(!stats.music_playing());
        assert!(!stats.eva_speaking);
        assert!(!stats.unit_speaking);
    }

    #[test]
    fn test_update_config() {
        let mut rig = rig(AudioSystemConfig::default());
        let mut config = AudioSystemConfig {
            sfx_volume: 0.4,
            music_shuffle: true,
            ..AudioSystemConfig::default()
        };
        config
            .rate_limit_overrides
            .insert("ui_click".to_string(), skirmish_gameplay::CooldownProfile::global(900));

        rig.system.update_config(config).unwrap();
        assert_eq!(rig.system.sfx_volume(), 0.4);
        assert!(rig.system.music().config().shuffle);
        assert_eq!(rig.system.limiter().profile(AudioEventType::UiClick).global_ms, 900);

        let bad = AudioSystemConfig {
            voice_volume: f32::INFINITY,
            ..AudioSystemConfig::default()
        };
        assert!(rig.system.update_config(bad).is_err());
        assert_eq!(rig.system.sfx_volume(), 0.4);
    }

    #[test]
    fn test_stats_display() {
        let rig = rig(AudioSystemConfig::default());
        let text = rig.system.stats().to_string();
        assert!(text.contains("Master: 100%"));
        assert!(text.contains("Voice: EVA=Silent"));
    }

    #[test]
    fn test_shutdown_releases_clips() {
        let mut rig = rig(AudioSystemConfig::default());
        assert!(rig.mixer.clip_count() > 0);
        rig.system.shutdown();
        assert_eq!(rig.mixer.clip_count(), 0);
        assert_eq!(rig.system.stats().loaded_sounds, 0);
    }
}
