//! `skirmish-audio`: inspects AUD files and runs a scripted skirmish through
//! the audio system.
//!
//! ```text
//! skirmish-audio [--log-json] info <file.aud>
//! skirmish-audio [--log-json] demo [--config <path>] [--headless] [--frames <n>]
//! skirmish-audio [--log-json] write-config <path>
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use skirmish_common::{Clock, ManualClock, Millis, ObjectIdAllocator, SystemClock, WorldPoint};
use skirmish_engine::{AudioSystem, AudioSystemConfig, EventRouter, ExplosionSize, Owner, CONFIG_FILE};
use skirmish_gameplay::{EvaVoice, Faction, MusicTrack, SoundEffect, UnitVoice};
use skirmish_kernel::{
    decode_aud, encode_raw_pcm16, probe, AssetSource, DirectoryAssets, HeadlessMixer,
    MemoryAssets, Mixer, RodioMixer, MAX_SINKS,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Simulated frame length.
const FRAME_MS: Millis = 16;

/// Default demo length, about ten seconds.
const DEFAULT_FRAMES: u32 = 600;

/// Sample rate of synthesized placeholder clips.
const TONE_RATE: u16 = 22_050;

const USAGE: &str = "usage: skirmish-audio [--log-json] <command>

commands:
  info <file.aud>                 print the header and decoded size of an AUD file
  demo [--config <path>] [--headless] [--frames <n>]
                                  drive a scripted skirmish through the audio system
  write-config <path>             write the default configuration";

enum Command {
    Info(PathBuf),
    Demo(DemoArgs),
    WriteConfig(PathBuf),
    Help,
}

struct DemoArgs {
    config: PathBuf,
    headless: bool,
    frames: u32,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<(bool, Command)> {
    let mut log_json = false;
    let mut rest = Vec::new();
    for arg in args {
        if arg == "--log-json" {
            log_json = true;
        } else {
            rest.push(arg);
        }
    }

    let mut rest = rest.into_iter();
    let command = match rest.next().as_deref() {
        None | Some("help" | "--help" | "-h") => Command::Help,
        Some("info") => {
            let file = rest.next().ok_or_else(|| anyhow!("info needs a file"))?;
            Command::Info(file.into())
        },
        Some("write-config") => {
            let file = rest.next().unwrap_or_else(|| CONFIG_FILE.to_string());
            Command::WriteConfig(file.into())
        },
        Some("demo") => {
            let mut demo = DemoArgs {
                config: PathBuf::from(CONFIG_FILE),
                headless: false,
                frames: DEFAULT_FRAMES,
            };
            while let Some(flag) = rest.next() {
                match flag.as_str() {
                    "--headless" => demo.headless = true,
                    "--config" => {
                        let path = rest.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                        demo.config = path.into();
                    },
                    "--frames" => {
                        let n = rest.next().ok_or_else(|| anyhow!("--frames needs a count"))?;
                        demo.frames = n.parse().with_context(|| format!("bad frame count {n:?}"))?;
                    },
                    other => bail!("unknown demo option {other:?}"),
                }
            }
            Command::Demo(demo)
        },
        Some(other) => bail!("unknown command {other:?}\n\n{USAGE}"),
    };
    Ok((log_json, command))
}

fn main() -> Result<()> {
    let (log_json, command) = parse_args(std::env::args().skip(1))?;

    let plain = (!log_json).then(fmt::layer);
    let json = log_json.then(|| fmt::layer().json());
    tracing_subscriber::registry()
        .with(plain)
        .with(json)
        .with(EnvFilter::from_default_env().add_directive("skirmish=info".parse()?))
        .init();

    match command {
        Command::Help => println!("{USAGE}"),
        Command::Info(path) => info_command(&path)?,
        Command::WriteConfig(path) => {
            AudioSystemConfig::default()
                .save_to(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
        },
        Command::Demo(args) => demo_command(&args)?,
    }
    Ok(())
}

// ============================================
// info
// ============================================

fn info_command(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let header = probe(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    let compression = header
        .compression()
        .map_or("unknown", |c| c.name());

    println!("{}", path.display());
    println!("  sample rate:   {} Hz", header.sample_rate);
    println!("  channels:      {}", header.channels());
    println!("  bits:          {}", header.bits_per_sample());
    println!("  compression:   {} ({})", compression, header.compression);
    println!("  payload:       {} bytes", header.compressed_size);
    println!("  uncompressed:  {} bytes", header.uncompressed_size);

    let clip = decode_aud(&bytes).with_context(|| format!("decoding {}", path.display()))?;
    println!("  frames:        {}", clip.frames());
    println!("  decoded:       {} bytes", clip.byte_size());
    println!("  duration:      {} ms", clip.duration_ms());
    Ok(())
}

// ============================================
// demo
// ============================================

/// A short tone, so the demo is audible without game data.
fn tone(freq: f32, duration_ms: u32) -> Vec<u8> {
    let frames = u32::from(TONE_RATE) * duration_ms / 1000;
    let samples: Vec<i16> = (0..frames)
        .map(|i| {
            let t = i as f32 / f32::from(TONE_RATE);
            let fade = 1.0 - i as f32 / frames as f32;
            ((t * freq * std::f32::consts::TAU).sin() * fade * 8_000.0) as i16
        })
        .collect();
    encode_raw_pcm16(TONE_RATE, 1, &samples)
}

fn placeholder_assets() -> MemoryAssets {
    let mut assets = MemoryAssets::new();
    for (i, effect) in SoundEffect::ALL.into_iter().enumerate() {
        assets.insert(effect.filename(), tone(220.0 + 15.0 * i as f32, 200));
    }
    for (i, track) in MusicTrack::ALL.into_iter().enumerate() {
        assets.insert(track.filename(), tone(110.0 + 20.0 * i as f32, 3_000));
    }
    for (i, voice) in EvaVoice::ALL.into_iter().enumerate() {
        assets.insert(voice.filename(), tone(440.0 + 25.0 * i as f32, 800));
    }
    for (i, voice) in UnitVoice::ALL.into_iter().enumerate() {
        for faction in [Faction::Neutral, Faction::Allied, Faction::Soviet] {
            assets.insert(voice.filename_for(faction), tone(330.0 + 10.0 * i as f32, 400));
        }
    }
    assets
}

fn open_assets(config: &AudioSystemConfig) -> Box<dyn AssetSource> {
    let dir = DirectoryAssets::new(&config.asset_dir);
    if dir.is_empty() {
        warn!(
            "No audio assets under {:?}, using synthesized tones",
            config.asset_dir
        );
        Box::new(placeholder_assets())
    } else {
        Box::new(dir)
    }
}

/// Clock and mixer handles the frame loop needs to step a headless run.
struct Headless {
    mixer: HeadlessMixer,
    clock: ManualClock,
}

fn open_backend(
    config: &AudioSystemConfig,
    headless: bool,
) -> (Box<dyn Mixer>, Box<dyn Clock>, Option<Headless>) {
    if !headless {
        match RodioMixer::new(MAX_SINKS.max(config.max_concurrent_sounds + 3)) {
            Ok(mixer) => return (Box::new(mixer), Box::new(SystemClock::new()), None),
            Err(e) => warn!("{}, falling back to headless playback", e),
        }
    }
    let mixer = HeadlessMixer::new();
    let clock = ManualClock::new(0);
    (
        Box::new(mixer.clone()),
        Box::new(clock.clone()),
        Some(Headless { mixer, clock }),
    )
}

fn build_system(args: &DemoArgs) -> Result<(AudioSystem, Option<Headless>)> {
    let config = AudioSystemConfig::load_from(&args.config);
    let assets = open_assets(&config);
    let (mixer, clock, headless) = open_backend(&config, args.headless);
    let system = AudioSystem::new(config, mixer, assets, clock)
        .map_err(|e| anyhow!("invalid audio configuration: {e}"))?;
    Ok((system, headless))
}

/// One frame of the scripted skirmish.
fn script(router: &mut EventRouter, units: &mut ObjectIdAllocator, frame: u32, frames: u32) {
    let base = WorldPoint::new(480, 480);
    let front = WorldPoint::new(1_200 + (frame % 7) as i32 * 30, 900);

    match frame {
        0 => router.enter_main_menu(),
        30 => {
            router.mission_start();
            router.system_mut().set_listener_position(WorldPoint::new(900, 700));
        },
        40 => router.building_placed(),
        60 => {
            router.building_complete(Owner::Player);
            router.construction_complete(Owner::Player);
        },
        90 => {
            let tank = units.allocate();
            router.unit_created(Owner::Player);
            router.unit_ready(Owner::Player);
            router.unit_selected(tank);
            router.unit_move_order(tank);
            router.unit_movement(tank, true);
        },
        120 => router.low_power(Owner::Player),
        180 => router.base_under_attack(Owner::Player),
        240 => {
            router.explosion(base, ExplosionSize::Large);
            router.building_destroyed(Owner::Player);
        },
        _ => {},
    }

    if (150..300).contains(&frame) {
        router.weapon_fire(front);
        if frame % 4 == 0 {
            router.projectile_impact(front);
            router.damage(front, 25 + (frame % 3) as i32 * 20);
        }
        if frame % 20 == 0 {
            router.ui_click();
            router.ui_click();
        }
    }

    if frame + 1 == frames {
        router.victory();
    }
}

fn demo_command(args: &DemoArgs) -> Result<()> {
    let (system, headless) = build_system(args)?;
    let mut router = EventRouter::new(system);
    router.set_faction(Faction::Allied);
    let mut units = ObjectIdAllocator::new();

    info!("Running {} frames ({} ms each)", args.frames, FRAME_MS);
    for frame in 0..args.frames {
        script(&mut router, &mut units, frame, args.frames);
        router.update();

        match &headless {
            Some(h) => {
                h.clock.advance(FRAME_MS);
                h.mixer.advance(u64::from(FRAME_MS));
            },
            None => std::thread::sleep(Duration::from_millis(u64::from(FRAME_MS))),
        }

        if frame % 120 == 0 {
            info!("frame {}: {}", frame, router.system().stats());
        }
    }

    let stats = router.stats();
    println!("{}", router.system().stats());
    println!(
        "Triggers: {} received, {} suppressed ({:.1}%)",
        stats.triggered,
        stats.suppressed,
        stats.suppression_ratio()
    );

    let mut system = router.into_system();
    system.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| (*s).to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_demo_flags() {
        let (json, command) =
            parse_args(args(&["--log-json", "demo", "--headless", "--frames", "12"])).unwrap();
        assert!(json);
        let Command::Demo(demo) = command else {
            panic!("expected demo");
        };
        assert!(demo.headless);
        assert_eq!(demo.frames, 12);
        assert_eq!(demo.config, PathBuf::from(CONFIG_FILE));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_args(args(&["frobnicate"])).is_err());
        assert!(parse_args(args(&["demo", "--loud"])).is_err());
        assert!(parse_args(args(&["info"])).is_err());
        assert!(matches!(parse_args(args(&[])).unwrap().1, Command::Help));
    }

    #[test]
    fn test_placeholder_tones_decode() {
        let assets = placeholder_assets();
        let bytes = assets.read(SoundEffect::UiClick.filename()).unwrap();
        let clip = decode_aud(&bytes).unwrap();
        assert_eq!(clip.duration_ms(), 200);
    }

    #[test]
    fn test_headless_demo_runs() {
        let dir = tempfile::tempdir().unwrap();
        let demo = DemoArgs {
            config: dir.path().join("missing.toml"),
            headless: true,
            frames: 320,
        };
        let (system, headless) = build_system(&demo).unwrap();
        let headless = headless.unwrap();
        let mut router = EventRouter::new(system);
        let mut units = ObjectIdAllocator::new();
        for frame in 0..demo.frames {
            script(&mut router, &mut units, frame, demo.frames);
            router.update();
            headless.clock.advance(FRAME_MS);
            headless.mixer.advance(u64::from(FRAME_MS));
        }
        assert!(router.stats().triggered > 0);
        assert!(router.stats().suppressed > 0);
    }
}
