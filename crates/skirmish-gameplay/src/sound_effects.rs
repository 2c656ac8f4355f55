//! Sound effect identifiers and their static catalog.
//!
//! Every effect maps to one AUD file plus the playback policy the sound bank
//! enforces for it: category, priority, how many copies may overlap, the
//! minimum gap between two starts, and a default volume.

use serde::{Deserialize, Serialize};
use skirmish_common::{ConfigError, ConfigResult, Millis};

/// Number of sound effects.
pub const EFFECT_COUNT: usize = 65;

/// Volume category of a sound effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCategory {
    /// Interface feedback.
    Ui,
    /// Weapons, explosions and impacts.
    Combat,
    /// Unit movement and actions.
    Unit,
    /// Environmental loops.
    Ambient,
    /// Construction and superweapon cues.
    Special,
}

impl SoundCategory {
    /// All categories.
    pub const ALL: [Self; 5] = [Self::Ui, Self::Combat, Self::Unit, Self::Ambient, Self::Special];

    /// Slot in per-category tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A sound effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoundEffect {
    // UI
    /// Button or menu click.
    UiClick,
    /// Interface beep.
    UiBeep,
    /// Cancelled action.
    UiCancel,
    /// Error buzz.
    UiError,
    /// Target acquired.
    UiTarget,
    // Construction
    /// Building placed.
    BuildPlace,
    /// Building sold.
    BuildSold,
    /// Primary building set.
    BuildPrimary,
    /// Construction timer tick.
    BuildClock,
    /// Building crumbling.
    BuildCrumble,
    // Explosions
    /// Tiny explosion.
    ExplodeTiny,
    /// Small explosion.
    ExplodeSmall,
    /// Medium explosion.
    ExplodeMedium,
    /// Large explosion.
    ExplodeLarge,
    /// Huge explosion.
    ExplodeHuge,
    /// Fire explosion.
    ExplodeFire,
    /// Water splash.
    ExplodeWater,
    /// Nuclear explosion.
    ExplodeNuke,
    // Weapons
    /// Pistol shot.
    WeaponPistol,
    /// Rifle shot.
    WeaponRifle,
    /// Machine gun.
    WeaponMgun,
    /// Machine gun burst.
    WeaponMgunBurst,
    /// Tank cannon.
    WeaponCannon,
    /// Artillery.
    WeaponArtillery,
    /// Rocket launch.
    WeaponRocket,
    /// Missile launch.
    WeaponMissile,
    /// Grenade.
    WeaponGrenade,
    /// Flamethrower.
    WeaponFlame,
    /// Tesla coil.
    WeaponTesla,
    /// Tesla coil charging.
    WeaponTeslaCharge,
    /// Anti-aircraft gun.
    WeaponAa,
    /// Depth charge.
    WeaponDepthCharge,
    /// Torpedo.
    WeaponTorpedo,
    // Impacts
    /// Bullet ricochet.
    ImpactBullet,
    /// Shell impact.
    ImpactShell,
    /// Metal impact.
    ImpactMetal,
    /// Concrete impact.
    ImpactConcrete,
    /// Ground impact.
    ImpactGround,
    /// Water impact.
    ImpactWater,
    // Unit movement
    /// Vehicle start-up.
    MoveVehicleStart,
    /// Vehicle moving.
    MoveVehicle,
    /// Heavy vehicle moving.
    MoveVehicleHeavy,
    /// Turret rotation.
    MoveTankTurret,
    /// Infantry footsteps.
    MoveInfantry,
    /// Helicopter rotor.
    MoveHelicopter,
    /// Aircraft engine.
    MovePlane,
    /// Ship engine.
    MoveShip,
    /// Submarine.
    MoveSub,
    // Unit actions
    /// Repair.
    ActionRepair,
    /// Harvesting ore.
    ActionHarvest,
    /// Vehicle crushing.
    ActionCrush,
    /// Cloaking.
    ActionCloak,
    /// Uncloaking.
    ActionUncloak,
    /// Chronosphere.
    ActionChrono,
    /// Iron Curtain.
    ActionIronCurtain,
    /// Parabomb drop.
    ActionParabomb,
    // Environment
    /// Fire burning.
    AmbientFire,
    /// Electric hum.
    AmbientElectric,
    /// Base alarm.
    AmbientAlarm,
    /// Air raid siren.
    AmbientSiren,
    // Special
    /// Radar online.
    SpecialRadarOn,
    /// Radar offline.
    SpecialRadarOff,
    /// Power restored.
    SpecialPowerUp,
    /// Power down.
    SpecialPowerDown,
    /// GPS satellite.
    SpecialGps,
}

impl SoundEffect {
    /// Every effect, in catalog order.
    pub const ALL: [Self; EFFECT_COUNT] = [
        Self::UiClick,
        Self::UiBeep,
        Self::UiCancel,
        Self::UiError,
        Self::UiTarget,
        Self::BuildPlace,
        Self::BuildSold,
        Self::BuildPrimary,
        Self::BuildClock,
        Self::BuildCrumble,
        Self::ExplodeTiny,
        Self::ExplodeSmall,
        Self::ExplodeMedium,
        Self::ExplodeLarge,
        Self::ExplodeHuge,
        Self::ExplodeFire,
        Self::ExplodeWater,
        Self::ExplodeNuke,
        Self::WeaponPistol,
        Self::WeaponRifle,
        Self::WeaponMgun,
        Self::WeaponMgunBurst,
        Self::WeaponCannon,
        Self::WeaponArtillery,
        Self::WeaponRocket,
        Self::WeaponMissile,
        Self::WeaponGrenade,
        Self::WeaponFlame,
        Self::WeaponTesla,
        Self::WeaponTeslaCharge,
        Self::WeaponAa,
        Self::WeaponDepthCharge,
        Self::WeaponTorpedo,
        Self::ImpactBullet,
        Self::ImpactShell,
        Self::ImpactMetal,
        Self::ImpactConcrete,
        Self::ImpactGround,
        Self::ImpactWater,
        Self::MoveVehicleStart,
        Self::MoveVehicle,
        Self::MoveVehicleHeavy,
        Self::MoveTankTurret,
        Self::MoveInfantry,
        Self::MoveHelicopter,
        Self::MovePlane,
        Self::MoveShip,
        Self::MoveSub,
        Self::ActionRepair,
        Self::ActionHarvest,
        Self::ActionCrush,
        Self::ActionCloak,
        Self::ActionUncloak,
        Self::ActionChrono,
        Self::ActionIronCurtain,
        Self::ActionParabomb,
        Self::AmbientFire,
        Self::AmbientElectric,
        Self::AmbientAlarm,
        Self::AmbientSiren,
        Self::SpecialRadarOn,
        Self::SpecialRadarOff,
        Self::SpecialPowerUp,
        Self::SpecialPowerDown,
        Self::SpecialGps,
    ];

    /// Slot in the catalog.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Catalog entry.
    #[must_use]
    pub fn info(self) -> &'static SoundEffectInfo {
        &EFFECT_CATALOG[self.index()]
    }

    /// AUD filename.
    #[must_use]
    pub fn filename(self) -> &'static str {
        self.info().filename
    }

    /// Category.
    #[must_use]
    pub fn category(self) -> SoundCategory {
        self.info().category
    }
}

/// Static playback policy for one effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundEffectInfo {
    /// Effect this entry describes.
    pub effect: SoundEffect,
    /// AUD filename.
    pub filename: &'static str,
    /// Volume category.
    pub category: SoundCategory,
    /// Priority (higher = more important).
    pub priority: u8,
    /// Maximum overlapping instances (0 = unlimited).
    pub max_concurrent: u8,
    /// Minimum time between two starts.
    pub min_interval_ms: Millis,
    /// Default volume (0.0-1.0).
    pub default_volume: f32,
}

const fn effect(
    effect: SoundEffect,
    filename: &'static str,
    category: SoundCategory,
    priority: u8,
    max_concurrent: u8,
    min_interval_ms: Millis,
    default_volume: f32,
) -> SoundEffectInfo {
    SoundEffectInfo {
        effect,
        filename,
        category,
        priority,
        max_concurrent,
        min_interval_ms,
        default_volume,
    }
}

/// Effect catalog, indexed by [`SoundEffect::index`].
pub static EFFECT_CATALOG: [SoundEffectInfo; EFFECT_COUNT] = [
    // UI
    effect(SoundEffect::UiClick, "CLICK.AUD", SoundCategory::Ui, 200, 2, 50, 1.0),
    effect(SoundEffect::UiBeep, "BEEP1.AUD", SoundCategory::Ui, 180, 2, 100, 0.8),
    effect(SoundEffect::UiCancel, "CANCEL.AUD", SoundCategory::Ui, 180, 1, 100, 1.0),
    effect(SoundEffect::UiError, "BUZZY1.AUD", SoundCategory::Ui, 220, 1, 200, 0.9),
    effect(SoundEffect::UiTarget, "TARGET1.AUD", SoundCategory::Ui, 150, 2, 100, 0.7),

    // Construction
    effect(SoundEffect::BuildPlace, "PLACBLDG.AUD", SoundCategory::Special, 180, 1, 200, 1.0),
    effect(SoundEffect::BuildSold, "SOLD.AUD", SoundCategory::Special, 180, 1, 200, 1.0),
    effect(SoundEffect::BuildPrimary, "PRIMARY.AUD", SoundCategory::Special, 180, 1, 200, 0.9),
    effect(SoundEffect::BuildClock, "CLOCK.AUD", SoundCategory::Ui, 100, 1, 500, 0.5),
    effect(SoundEffect::BuildCrumble, "CRUMBLE.AUD", SoundCategory::Combat, 200, 2, 100, 1.0),

    // Explosions
    effect(SoundEffect::ExplodeTiny, "XPLOSML.AUD", SoundCategory::Combat, 150, 4, 30, 0.8),
    effect(SoundEffect::ExplodeSmall, "XPLOS.AUD", SoundCategory::Combat, 160, 4, 30, 0.9),
    effect(SoundEffect::ExplodeMedium, "XPLOMED.AUD", SoundCategory::Combat, 170, 3, 50, 1.0),
    effect(SoundEffect::ExplodeLarge, "XPLOBIG.AUD", SoundCategory::Combat, 180, 3, 50, 1.0),
    effect(SoundEffect::ExplodeHuge, "XPLOMGE.AUD", SoundCategory::Combat, 200, 2, 100, 1.0),
    effect(SoundEffect::ExplodeFire, "FIRE1.AUD", SoundCategory::Combat, 140, 4, 30, 0.7),
    effect(SoundEffect::ExplodeWater, "SPLASH1.AUD", SoundCategory::Combat, 130, 4, 30, 0.6),
    effect(SoundEffect::ExplodeNuke, "NUKEXPLO.AUD", SoundCategory::Combat, 255, 1, 500, 1.0),

    // Weapons
    effect(SoundEffect::WeaponPistol, "PISTOL.AUD", SoundCategory::Combat, 120, 4, 30, 0.6),
    effect(SoundEffect::WeaponRifle, "GUN1.AUD", SoundCategory::Combat, 130, 4, 30, 0.7),
    effect(SoundEffect::WeaponMgun, "MGUN1.AUD", SoundCategory::Combat, 140, 3, 50, 0.8),
    effect(SoundEffect::WeaponMgunBurst, "MGUN2.AUD", SoundCategory::Combat, 140, 3, 50, 0.8),
    effect(SoundEffect::WeaponCannon, "CANNON.AUD", SoundCategory::Combat, 160, 3, 50, 1.0),
    effect(SoundEffect::WeaponArtillery, "ARTIL.AUD", SoundCategory::Combat, 170, 2, 100, 1.0),
    effect(SoundEffect::WeaponRocket, "ROCKET1.AUD", SoundCategory::Combat, 150, 3, 50, 0.9),
    effect(SoundEffect::WeaponMissile, "ROCKET2.AUD", SoundCategory::Combat, 150, 3, 50, 0.9),
    effect(SoundEffect::WeaponGrenade, "GRENADE.AUD", SoundCategory::Combat, 140, 4, 30, 0.8),
    effect(SoundEffect::WeaponFlame, "FLAME.AUD", SoundCategory::Combat, 140, 2, 100, 0.8),
    effect(SoundEffect::WeaponTesla, "TESLA1.AUD", SoundCategory::Combat, 180, 2, 100, 1.0),
    effect(SoundEffect::WeaponTeslaCharge, "TELSCHG.AUD", SoundCategory::Combat, 170, 1, 200, 0.9),
    effect(SoundEffect::WeaponAa, "FLAK1.AUD", SoundCategory::Combat, 150, 3, 50, 0.9),
    effect(SoundEffect::WeaponDepthCharge, "DEPTHCH.AUD", SoundCategory::Combat, 160, 2, 100, 1.0),
    effect(SoundEffect::WeaponTorpedo, "TORPEDO.AUD", SoundCategory::Combat, 150, 2, 100, 0.9),

    // Impacts
    effect(SoundEffect::ImpactBullet, "RICOCHET.AUD", SoundCategory::Combat, 100, 6, 20, 0.5),
    effect(SoundEffect::ImpactShell, "SHELL.AUD", SoundCategory::Combat, 120, 4, 30, 0.6),
    effect(SoundEffect::ImpactMetal, "METAL1.AUD", SoundCategory::Combat, 110, 4, 30, 0.6),
    effect(SoundEffect::ImpactConcrete, "CONCRET1.AUD", SoundCategory::Combat, 110, 4, 30, 0.6),
    effect(SoundEffect::ImpactGround, "DIRT1.AUD", SoundCategory::Combat, 100, 4, 30, 0.5),
    effect(SoundEffect::ImpactWater, "WATERSPL.AUD", SoundCategory::Combat, 100, 4, 30, 0.5),

    // Unit movement
    effect(SoundEffect::MoveVehicleStart, "VSTART.AUD", SoundCategory::Unit, 100, 3, 100, 0.6),
    effect(SoundEffect::MoveVehicle, "VEHICLEA.AUD", SoundCategory::Unit, 80, 2, 200, 0.5),
    effect(SoundEffect::MoveVehicleHeavy, "VEHICLEB.AUD", SoundCategory::Unit, 80, 2, 200, 0.5),
    effect(SoundEffect::MoveTankTurret, "TURRET.AUD", SoundCategory::Unit, 90, 3, 100, 0.4),
    effect(SoundEffect::MoveInfantry, "INFANTRY.AUD", SoundCategory::Unit, 60, 4, 50, 0.3),
    effect(SoundEffect::MoveHelicopter, "COPTER.AUD", SoundCategory::Unit, 100, 2, 200, 0.6),
    effect(SoundEffect::MovePlane, "PLANE.AUD", SoundCategory::Unit, 100, 2, 200, 0.6),
    effect(SoundEffect::MoveShip, "SHIP.AUD", SoundCategory::Unit, 80, 2, 200, 0.5),
    effect(SoundEffect::MoveSub, "SUB.AUD", SoundCategory::Unit, 70, 2, 200, 0.4),

    // Unit actions
    effect(SoundEffect::ActionRepair, "REPAIR.AUD", SoundCategory::Unit, 120, 2, 200, 0.7),
    effect(SoundEffect::ActionHarvest, "HARVEST.AUD", SoundCategory::Unit, 100, 2, 200, 0.6),
    effect(SoundEffect::ActionCrush, "CRUSH.AUD", SoundCategory::Unit, 140, 3, 100, 0.8),
    effect(SoundEffect::ActionCloak, "CLOAK.AUD", SoundCategory::Special, 150, 2, 200, 0.8),
    effect(SoundEffect::ActionUncloak, "UNCLOAK.AUD", SoundCategory::Special, 150, 2, 200, 0.8),
    effect(SoundEffect::ActionChrono, "CHRONO.AUD", SoundCategory::Special, 200, 1, 500, 1.0),
    effect(SoundEffect::ActionIronCurtain, "IRON.AUD", SoundCategory::Special, 200, 1, 500, 1.0),
    effect(SoundEffect::ActionParabomb, "PARABOMB.AUD", SoundCategory::Special, 180, 1, 500, 1.0),

    // Environment
    effect(SoundEffect::AmbientFire, "BURN.AUD", SoundCategory::Ambient, 50, 4, 100, 0.4),
    effect(SoundEffect::AmbientElectric, "ELECTRIC.AUD", SoundCategory::Ambient, 60, 2, 200, 0.3),
    effect(SoundEffect::AmbientAlarm, "ALARM.AUD", SoundCategory::Ambient, 150, 1, 1000, 0.8),
    effect(SoundEffect::AmbientSiren, "SIREN.AUD", SoundCategory::Ambient, 160, 1, 2000, 0.9),

    // Special
    effect(SoundEffect::SpecialRadarOn, "RADARUP.AUD", SoundCategory::Special, 180, 1, 500, 1.0),
    effect(SoundEffect::SpecialRadarOff, "RADARDN.AUD", SoundCategory::Special, 180, 1, 500, 1.0),
    effect(SoundEffect::SpecialPowerUp, "POWRUP1.AUD", SoundCategory::Special, 180, 1, 500, 1.0),
    effect(SoundEffect::SpecialPowerDown, "POWDOWN1.AUD", SoundCategory::Special, 180, 1, 500, 1.0),
    effect(SoundEffect::SpecialGps, "GPS.AUD", SoundCategory::Special, 180, 1, 500, 0.9),
];

/// Checks that every catalog slot describes its own effect.
pub fn validate_effect_catalog() -> ConfigResult<()> {
    for (index, (entry, expected)) in EFFECT_CATALOG.iter().zip(SoundEffect::ALL).enumerate() {
        if entry.effect != expected || entry.effect.index() != index {
            return Err(ConfigError::CatalogMismatch {
                catalog: "sound effects",
                index,
                expected: format!("{expected:?}"),
                found: format!("{:?}", entry.effect),
            });
        }
        if entry.filename.is_empty() || !(0.0..=1.0).contains(&entry.default_volume) {
            return Err(ConfigError::CatalogMismatch {
                catalog: "sound effects",
                index,
                expected: "a filename and a volume in [0, 1]".to_string(),
                found: format!("{:?} at {}", entry.filename, entry.default_volume),
            });
        }
    }
    Ok(())
}
