//! Gameplay trigger types and their default cooldowns.
//!
//! Every named trigger the simulation can raise has one [`AudioEventType`].
//! The table below gives each one a [`CooldownProfile`]; the event router
//! installs it into a [`RateLimiter`] once at startup.
//!
//! | Group    | Keyed by        | Typical cooldown |
//! |----------|-----------------|------------------|
//! | Combat   | global + cell   | 30-300 ms        |
//! | Units    | global + object | 100-500 ms       |
//! | Building | global          | 200-1000 ms      |
//! | EVA      | global          | 1.5-30 s         |
//! | UI       | global          | 50-200 ms        |

use serde::{Deserialize, Serialize};

use crate::rate_limiter::{CooldownProfile, RateLimiter};

/// Number of trigger types.
pub const EVENT_TYPE_COUNT: usize = 37;

/// Named gameplay triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEventType {
    // Combat
    /// Light damage.
    DamageSmall,
    /// Heavy damage.
    DamageLarge,
    /// Small or medium explosion.
    ExplosionSmall,
    /// Large explosion.
    ExplosionLarge,
    /// Weapon discharge.
    WeaponFire,
    /// Projectile hit.
    ProjectileImpact,
    // Units
    /// Unit selected.
    UnitSelect,
    /// Move order.
    UnitMoveOrder,
    /// Attack order.
    UnitAttackOrder,
    /// Generic acknowledgement.
    UnitAcknowledge,
    /// Unit killed.
    UnitDeath,
    /// Unit produced.
    UnitCreated,
    // Buildings
    /// Placement started.
    BuildingPlaced,
    /// Construction finished.
    BuildingComplete,
    /// Building sold.
    BuildingSold,
    /// Building destroyed.
    BuildingDestroyed,
    /// Building captured.
    BuildingCaptured,
    // Announcer
    /// Base under attack.
    EvaBaseAttack,
    /// Unit lost.
    EvaUnitLost,
    /// Building lost.
    EvaBuildingLost,
    /// Low power.
    EvaLowPower,
    /// Insufficient funds.
    EvaInsufficientFunds,
    /// Silos needed.
    EvaSilosNeeded,
    /// Radar online.
    EvaRadarOnline,
    /// Radar offline.
    EvaRadarOffline,
    /// Unit ready.
    EvaUnitReady,
    /// Construction complete.
    EvaConstructionComplete,
    /// Mission accomplished.
    EvaMissionComplete,
    /// Mission failed.
    EvaMissionFailed,
    // Interface
    /// Generic click.
    UiClick,
    /// Build button click.
    UiBuildClick,
    /// Sidebar tab click.
    UiTabClick,
    /// Sidebar scroll up.
    UiSidebarUp,
    /// Sidebar scroll down.
    UiSidebarDown,
    /// Action refused.
    UiCannot,
    /// Primary building set.
    UiPrimarySet,
    // Ambient
    /// Unit starts moving.
    AmbientMovement,
}

impl AudioEventType {
    /// Every trigger type.
    pub const ALL: [Self; EVENT_TYPE_COUNT] = [
        Self::DamageSmall,
        Self::DamageLarge,
        Self::ExplosionSmall,
        Self::ExplosionLarge,
        Self::WeaponFire,
        Self::ProjectileImpact,
        Self::UnitSelect,
        Self::UnitMoveOrder,
        Self::UnitAttackOrder,
        Self::UnitAcknowledge,
        Self::UnitDeath,
        Self::UnitCreated,
        Self::BuildingPlaced,
        Self::BuildingComplete,
        Self::BuildingSold,
        Self::BuildingDestroyed,
        Self::BuildingCaptured,
        Self::EvaBaseAttack,
        Self::EvaUnitLost,
        Self::EvaBuildingLost,
        Self::EvaLowPower,
        Self::EvaInsufficientFunds,
        Self::EvaSilosNeeded,
        Self::EvaRadarOnline,
        Self::EvaRadarOffline,
        Self::EvaUnitReady,
        Self::EvaConstructionComplete,
        Self::EvaMissionComplete,
        Self::EvaMissionFailed,
        Self::UiClick,
        Self::UiBuildClick,
        Self::UiTabClick,
        Self::UiSidebarUp,
        Self::UiSidebarDown,
        Self::UiCannot,
        Self::UiPrimarySet,
        Self::AmbientMovement,
    ];

    /// Configuration name, e.g. `"eva_low_power"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DamageSmall => "damage_small",
            Self::DamageLarge => "damage_large",
            Self::ExplosionSmall => "explosion_small",
            Self::ExplosionLarge => "explosion_large",
            Self::WeaponFire => "weapon_fire",
            Self::ProjectileImpact => "projectile_impact",
            Self::UnitSelect => "unit_select",
            Self::UnitMoveOrder => "unit_move_order",
            Self::UnitAttackOrder => "unit_attack_order",
            Self::UnitAcknowledge => "unit_acknowledge",
            Self::UnitDeath => "unit_death",
            Self::UnitCreated => "unit_created",
            Self::BuildingPlaced => "building_placed",
            Self::BuildingComplete => "building_complete",
            Self::BuildingSold => "building_sold",
            Self::BuildingDestroyed => "building_destroyed",
            Self::BuildingCaptured => "building_captured",
            Self::EvaBaseAttack => "eva_base_attack",
            Self::EvaUnitLost => "eva_unit_lost",
            Self::EvaBuildingLost => "eva_building_lost",
            Self::EvaLowPower => "eva_low_power",
            Self::EvaInsufficientFunds => "eva_insufficient_funds",
            Self::EvaSilosNeeded => "eva_silos_needed",
            Self::EvaRadarOnline => "eva_radar_online",
            Self::EvaRadarOffline => "eva_radar_offline",
            Self::EvaUnitReady => "eva_unit_ready",
            Self::EvaConstructionComplete => "eva_construction_complete",
            Self::EvaMissionComplete => "eva_mission_complete",
            Self::EvaMissionFailed => "eva_mission_failed",
            Self::UiClick => "ui_click",
            Self::UiBuildClick => "ui_build_click",
            Self::UiTabClick => "ui_tab_click",
            Self::UiSidebarUp => "ui_sidebar_up",
            Self::UiSidebarDown => "ui_sidebar_down",
            Self::UiCannot => "ui_cannot",
            Self::UiPrimarySet => "ui_primary_set",
            Self::AmbientMovement => "ambient_movement",
        }
    }

    /// Looks a trigger up by configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Built-in cooldowns.
    #[must_use]
    pub const fn default_profile(self) -> CooldownProfile {
        match self {
            Self::DamageSmall => CooldownProfile::global(50).with_position(150),
            Self::DamageLarge => CooldownProfile::global(100).with_position(200),
            Self::ExplosionSmall => CooldownProfile::global(50).with_position(150),
            Self::ExplosionLarge => CooldownProfile::global(100).with_position(300),
            Self::WeaponFire => CooldownProfile::global(30).with_position(100),
            Self::ProjectileImpact => CooldownProfile::global(50).with_position(100),

            Self::UnitSelect => CooldownProfile::global(100).with_object(500),
            Self::UnitMoveOrder | Self::UnitAttackOrder => {
                CooldownProfile::global(150).with_object(400)
            },
            Self::UnitAcknowledge => CooldownProfile::global(200).with_object(500),
            Self::UnitDeath => CooldownProfile::global(100).with_position(200),
            Self::UnitCreated => CooldownProfile::global(500),

            Self::BuildingPlaced => CooldownProfile::global(200),
            Self::BuildingComplete => CooldownProfile::global(1000),
            Self::BuildingSold | Self::BuildingCaptured => CooldownProfile::global(500),
            Self::BuildingDestroyed => CooldownProfile::global(300),

            Self::EvaBaseAttack => CooldownProfile::global(30_000),
            Self::EvaUnitLost | Self::EvaBuildingLost | Self::EvaInsufficientFunds => {
                CooldownProfile::global(5_000)
            },
            Self::EvaLowPower => CooldownProfile::global(10_000),
            Self::EvaSilosNeeded => CooldownProfile::global(15_000),
            Self::EvaRadarOnline | Self::EvaRadarOffline => CooldownProfile::global(2_000),
            Self::EvaUnitReady | Self::EvaConstructionComplete => CooldownProfile::global(1_500),
            Self::EvaMissionComplete | Self::EvaMissionFailed => CooldownProfile::UNLIMITED,

            Self::UiClick => CooldownProfile::global(50),
            Self::UiBuildClick
            | Self::UiTabClick
            | Self::UiSidebarUp
            | Self::UiSidebarDown => CooldownProfile::global(100),
            Self::UiCannot | Self::UiPrimarySet => CooldownProfile::global(200),

            Self::AmbientMovement => CooldownProfile::UNLIMITED.with_object(2_000),
        }
    }
}

/// Builds a limiter with every built-in profile installed.
#[must_use]
pub fn default_rate_limiter() -> RateLimiter<AudioEventType> {
    let mut limiter = RateLimiter::new();
    for event in AudioEventType::ALL {
        let profile = event.default_profile();
        if !profile.is_unlimited() {
            limiter.set_profile(event, profile);
        }
    }
    limiter
}
