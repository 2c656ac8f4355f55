//! Audio system configuration.
//!
//! Provides the volumes, playback limits, output format and rate-limit
//! overrides for the audio facade. Configuration is read from and written
//! to TOML.

use serde::{Deserialize, Serialize};
use skirmish_common::{ConfigError, ConfigResult, Millis, SkirmishResult};
use skirmish_gameplay::{
    default_rate_limiter, AudioEventType, CooldownProfile, MusicConfig, RateLimiter,
    SoundManagerConfig, VoiceConfig, DEFAULT_EVA_QUEUE_CAPACITY, DEFAULT_HISTORY_LEN,
};
use skirmish_kernel::{DEFAULT_MAX_DISTANCE, MIN_AUDIBLE_VOLUME};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "skirmish-audio.toml";

/// Audio system configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSystemConfig {
    // === Volumes ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Announcer and unit voice volume (0.0 - 1.0)
    pub voice_volume: f32,

    // === Music ===
    /// Draw the next track at random
    pub music_shuffle: bool,
    /// Loop the current track
    pub music_loop: bool,
    /// Advance to the next in-game track when one ends
    pub music_auto_advance: bool,
    /// Crossfade duration in milliseconds (0 = cut)
    pub music_fade_ms: Millis,

    // === Playback limits ===
    /// Maximum simultaneous effect instances
    pub max_concurrent_sounds: usize,
    /// Maximum overlapping instances of one effect
    pub max_same_sound: usize,
    /// Distance in world pixels at which positional sounds fall silent
    pub max_audible_distance: f32,
    /// Final volume below which effects are dropped
    pub min_audible_volume: f32,
    /// Maximum waiting announcer lines
    pub eva_queue_capacity: usize,

    // === Output ===
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Output channel count
    pub channels: u16,
    /// Output buffer size in frames
    pub buffer_size: u32,

    // === Assets ===
    /// Directory searched for AUD files
    pub asset_dir: PathBuf,

    // === Rate limiting ===
    /// Cooldown overrides keyed by trigger name (e.g. `eva_low_power`)
    pub rate_limit_overrides: BTreeMap<String, CooldownProfile>,
}

impl Default for AudioSystemConfig {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            music_volume: 0.8,
            voice_volume: 1.0,

            music_shuffle: false,
            music_loop: true,
            music_auto_advance: true,
            music_fade_ms: 0,

            max_concurrent_sounds: 16,
            max_same_sound: 3,
            max_audible_distance: DEFAULT_MAX_DISTANCE,
            min_audible_volume: MIN_AUDIBLE_VOLUME,
            eva_queue_capacity: DEFAULT_EVA_QUEUE_CAPACITY,

            sample_rate: 22_050,
            channels: 2,
            buffer_size: 1024,

            asset_dir: PathBuf::from("assets/audio"),

            rate_limit_overrides: BTreeMap::new(),
        }
    }
}

impl AudioSystemConfig {
    /// Load configuration from a file, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration from a file, surfacing read and parse failures.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> SkirmishResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("master_volume", self.master_volume),
            ("sfx_volume", self.sfx_volume),
            ("music_volume", self.music_volume),
            ("voice_volume", self.voice_volume),
            ("min_audible_volume", self.min_audible_volume),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, "must be a finite number"));
            }
        }

        if !self.max_audible_distance.is_finite() || self.max_audible_distance <= 0.0 {
            return Err(invalid("max_audible_distance", "must be a positive number"));
        }

        for (field, value) in [
            ("max_concurrent_sounds", self.max_concurrent_sounds),
            ("max_same_sound", self.max_same_sound),
            ("eva_queue_capacity", self.eva_queue_capacity),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be at least 1"));
            }
        }

        if self.sample_rate == 0 || self.sample_rate > 48_000 {
            return Err(invalid("sample_rate", "must be in 1..=48000"));
        }
        if !matches!(self.channels, 1 | 2) {
            return Err(invalid("channels", "must be 1 or 2"));
        }
        if self.buffer_size == 0 {
            return Err(invalid("buffer_size", "must be at least 1"));
        }

        for name in self.rate_limit_overrides.keys() {
            if AudioEventType::from_name(name).is_none() {
                return Err(invalid(
                    &format!("rate_limit_overrides.{name}"),
                    "unknown trigger name",
                ));
            }
        }

        Ok(())
    }

    // ============================================
    // Component configurations
    // ============================================

    /// Sound bank limits.
    #[must_use]
    pub fn sound_config(&self) -> SoundManagerConfig {
        SoundManagerConfig::default()
            .with_max_concurrent(self.max_concurrent_sounds)
            .with_max_distance(self.max_audible_distance)
            .with_min_audible_volume(self.min_audible_volume)
            .with_max_same_sound(self.max_same_sound)
    }

    /// Music player settings. The volume is composed by the facade.
    #[must_use]
    pub fn music_config(&self) -> MusicConfig {
        MusicConfig {
            volume: self.music_volume,
            shuffle: self.music_shuffle,
            loop_enabled: self.music_loop,
            auto_advance: self.music_auto_advance,
            fade_ms: self.music_fade_ms,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }

    /// Voice arbiter settings.
    #[must_use]
    pub fn voice_config(&self) -> VoiceConfig {
        VoiceConfig {
            volume: self.voice_volume,
            queue_capacity: self.eva_queue_capacity,
        }
    }

    /// Built-in cooldowns with the configured overrides applied.
    ///
    /// Unknown trigger names are skipped with a warning.
    #[must_use]
    pub fn rate_limiter(&self) -> RateLimiter<AudioEventType> {
        let mut limiter = default_rate_limiter();
        for (name, profile) in &self.rate_limit_overrides {
            match AudioEventType::from_name(name) {
                Some(event) => limiter.set_profile(event, *profile),
                None => warn!("Ignoring cooldown override for unknown trigger '{name}'"),
            }
        }
        limiter
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_common::SkirmishError;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AudioSystemConfig::default();
        assert_eq!(config.music_volume, 0.8);
        assert_eq!(config.max_concurrent_sounds, 16);
        assert_eq!(config.max_same_sound, 3);
        assert_eq!(config.eva_queue_capacity, 8);
        assert_eq!(config.sample_rate, 22_050);
        assert_eq!(config.asset_dir, PathBuf::from("assets/audio"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AudioSystemConfig::default();
        config.sfx_volume = 0.25;
        config.music_fade_ms = 1500;
        config
            .rate_limit_overrides
            .insert("weapon_fire".to_string(), CooldownProfile::global(10).with_position(40));

        config.save_to(&path).unwrap();
        let loaded = AudioSystemConfig::load_from(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AudioSystemConfig::load_from("/nonexistent/path/skirmish-audio.toml");
        assert_eq!(config, AudioSystemConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "master_volume = 0.5\nmusic_shuffle = true\n").unwrap();

        let config = AudioSystemConfig::load_from(&path);
        assert_eq!(config.master_volume, 0.5);
        assert!(config.music_shuffle);
        assert_eq!(config.voice_volume, 1.0);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "master_volume = \"loud\"").unwrap();

        assert_eq!(AudioSystemConfig::load_from(&path), AudioSystemConfig::default());
        assert!(matches!(
            AudioSystemConfig::try_load_from(&path),
            Err(SkirmishError::Config(ConfigError::Parse(_)))
        ));
    }

    #[test]
    fn test_config_serialization_field_names() {
        let toml_str = toml::to_string_pretty(&AudioSystemConfig::default()).unwrap();
        assert!(toml_str.contains("master_volume"));
        assert!(toml_str.contains("eva_queue_capacity"));
        assert!(toml_str.contains("asset_dir"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AudioSystemConfig::default();
        config.sfx_volume = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "sfx_volume"
        ));

        let mut config = AudioSystemConfig::default();
        config.max_concurrent_sounds = 0;
        assert!(config.validate().is_err());

        let mut config = AudioSystemConfig::default();
        config.channels = 6;
        assert!(config.validate().is_err());

        let mut config = AudioSystemConfig::default();
        config
            .rate_limit_overrides
            .insert("laser_show".to_string(), CooldownProfile::global(1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_volume_is_not_an_error() {
        let mut config = AudioSystemConfig::default();
        config.master_volume = 1.7;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_reach_the_limiter() {
        let mut config = AudioSystemConfig::default();
        config
            .rate_limit_overrides
            .insert("eva_low_power".to_string(), CooldownProfile::global(250));

        let limiter = config.rate_limiter();
        assert_eq!(limiter.profile(AudioEventType::EvaLowPower).global_ms, 250);
        assert_eq!(limiter.profile(AudioEventType::EvaBaseAttack).global_ms, 30_000);
    }

    #[test]
    fn test_component_configs() {
        let config = AudioSystemConfig {
            music_fade_ms: 750,
            max_same_sound: 2,
            ..AudioSystemConfig::default()
        };
        assert_eq!(config.music_config().fade_ms, 750);
        assert_eq!(config.sound_config().max_same_sound, 2);
        assert_eq!(config.voice_config().queue_capacity, 8);
    }
}
