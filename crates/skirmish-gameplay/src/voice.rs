//! Announcer and unit voice catalogs.
//!
//! Announcer (EVA) lines carry a priority used for preemption and queue
//! ordering. Unit acknowledgements carry only a minimum replay interval and
//! may have a faction-specific recording.

use serde::{Deserialize, Serialize};
use skirmish_common::{ConfigError, ConfigResult, Millis};

/// Number of announcer lines.
pub const EVA_COUNT: usize = 36;

/// Number of unit voice lines.
pub const UNIT_VOICE_COUNT: usize = 27;

/// Announcer lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvaVoice {
    // Construction
    /// "Building"
    Building,
    /// "Construction complete"
    ConstructionComplete,
    /// "On hold"
    OnHold,
    /// "Cancelled"
    Cancelled,
    /// "New construction options"
    NewOptions,
    // Units
    /// "Training"
    Training,
    /// "Unit ready"
    UnitReady,
    /// "Unit lost"
    UnitLost,
    /// "Reinforcements have arrived"
    Reinforcements,
    // Base status
    /// "Our base is under attack"
    BaseUnderAttack,
    /// "Primary building selected"
    PrimaryBuilding,
    /// "Building captured"
    BuildingCaptured,
    /// "Building lost"
    BuildingLost,
    // Resources
    /// "Low power"
    LowPower,
    /// "Power restored"
    PowerRestored,
    /// "Insufficient funds"
    InsufficientFunds,
    /// "Ore depleted"
    OreDepleted,
    /// "Silos needed"
    SilosNeeded,
    // Radar
    /// "Radar online"
    RadarOnline,
    /// "Radar offline"
    RadarOffline,
    // Superweapons
    /// "Iron curtain ready"
    IronCurtainReady,
    /// "Iron curtain charging"
    IronCurtainCharging,
    /// "Chronosphere ready"
    ChronosphereReady,
    /// "Chronosphere charging"
    ChronosphereCharging,
    /// "Nuclear missile ready"
    NukeReady,
    /// "Nuclear missile launched"
    NukeLaunched,
    /// "Nuclear attack imminent"
    NukeAttack,
    /// "GPS satellite ready"
    GpsReady,
    /// "Parabombs ready"
    ParabombsReady,
    /// "Spy plane ready"
    SpyPlaneReady,
    // Mission
    /// "Mission accomplished"
    MissionAccomplished,
    /// "Mission failed"
    MissionFailed,
    /// "Battle control online"
    BattleControlOnline,
    /// "Battle control terminated"
    BattleControlTerminated,
    // Multiplayer
    /// "Player defeated"
    PlayerDefeated,
    /// "Our ally is under attack"
    AllyAttack,
}

impl EvaVoice {
    /// Every announcer line, in catalog order.
    pub const ALL: [Self; EVA_COUNT] = [
        Self::Building,
        Self::ConstructionComplete,
        Self::OnHold,
        Self::Cancelled,
        Self::NewOptions,
        Self::Training,
        Self::UnitReady,
        Self::UnitLost,
        Self::Reinforcements,
        Self::BaseUnderAttack,
        Self::PrimaryBuilding,
        Self::BuildingCaptured,
        Self::BuildingLost,
        Self::LowPower,
        Self::PowerRestored,
        Self::InsufficientFunds,
        Self::OreDepleted,
        Self::SilosNeeded,
        Self::RadarOnline,
        Self::RadarOffline,
        Self::IronCurtainReady,
        Self::IronCurtainCharging,
        Self::ChronosphereReady,
        Self::ChronosphereCharging,
        Self::NukeReady,
        Self::NukeLaunched,
        Self::NukeAttack,
        Self::GpsReady,
        Self::ParabombsReady,
        Self::SpyPlaneReady,
        Self::MissionAccomplished,
        Self::MissionFailed,
        Self::BattleControlOnline,
        Self::BattleControlTerminated,
        Self::PlayerDefeated,
        Self::AllyAttack,
    ];

    /// Lines worth decoding before the first match starts.
    pub const COMMON: [Self; 5] = [
        Self::ConstructionComplete,
        Self::UnitReady,
        Self::BaseUnderAttack,
        Self::LowPower,
        Self::InsufficientFunds,
    ];

    /// Slot in the catalog.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Catalog entry.
    #[must_use]
    pub fn info(self) -> &'static EvaVoiceInfo {
        &EVA_CATALOG[self.index()]
    }

    /// AUD filename.
    #[must_use]
    pub fn filename(self) -> &'static str {
        self.info().filename
    }

    /// Preemption priority.
    #[must_use]
    pub fn priority(self) -> u8 {
        self.info().priority
    }

    /// What the announcer says.
    #[must_use]
    pub fn description(self) -> &'static str {
        self.info().description
    }
}

/// Static data for one announcer line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaVoiceInfo {
    /// Line this entry describes.
    pub voice: EvaVoice,
    /// AUD filename.
    pub filename: &'static str,
    /// Higher preempts lower.
    pub priority: u8,
    /// Minimum time between two plays of this line.
    pub min_interval_ms: Millis,
    /// What the announcer says.
    pub description: &'static str,
}

const fn eva(
    voice: EvaVoice,
    filename: &'static str,
    priority: u8,
    min_interval_ms: Millis,
    description: &'static str,
) -> EvaVoiceInfo {
    EvaVoiceInfo {
        voice,
        filename,
        priority,
        min_interval_ms,
        description,
    }
}

/// Announcer catalog, indexed by [`EvaVoice::index`].
pub static EVA_CATALOG: [EvaVoiceInfo; EVA_COUNT] = [
    eva(EvaVoice::Building, "BLDG1.AUD", 50, 2000, "Building"),
    eva(EvaVoice::ConstructionComplete, "CONSTRU1.AUD", 100, 3000, "Construction complete"),
    eva(EvaVoice::OnHold, "ONHOLD1.AUD", 80, 3000, "On hold"),
    eva(EvaVoice::Cancelled, "CANCLD1.AUD", 80, 2000, "Cancelled"),
    eva(EvaVoice::NewOptions, "NEWOPT1.AUD", 100, 5000, "New construction options"),
    eva(EvaVoice::Training, "TRAIN1.AUD", 50, 2000, "Training"),
    eva(EvaVoice::UnitReady, "UNITREDY.AUD", 100, 2000, "Unit ready"),
    eva(EvaVoice::UnitLost, "UNITLOST.AUD", 200, 5000, "Unit lost"),
    eva(EvaVoice::Reinforcements, "REINFOR1.AUD", 150, 5000, "Reinforcements"),
    eva(EvaVoice::BaseUnderAttack, "BASEATK1.AUD", 250, 30000, "Base under attack"),
    eva(EvaVoice::PrimaryBuilding, "PRIBLDG1.AUD", 80, 3000, "Primary building"),
    eva(EvaVoice::BuildingCaptured, "BLDGCAP1.AUD", 180, 5000, "Building captured"),
    eva(EvaVoice::BuildingLost, "BLDGLST1.AUD", 180, 5000, "Building lost"),
    eva(EvaVoice::LowPower, "LOWPOWR1.AUD", 180, 10000, "Low power"),
    eva(EvaVoice::PowerRestored, "POWRRES1.AUD", 150, 5000, "Power restored"),
    eva(EvaVoice::InsufficientFunds, "INSUFUND.AUD", 150, 5000, "Insufficient funds"),
    eva(EvaVoice::OreDepleted, "ABORRONE.AUD", 120, 10000, "Ore depleted"),
    eva(EvaVoice::SilosNeeded, "NEEDSILO.AUD", 150, 10000, "Silos needed"),
    eva(EvaVoice::RadarOnline, "RADARON1.AUD", 100, 5000, "Radar online"),
    eva(EvaVoice::RadarOffline, "RADAROFF.AUD", 120, 5000, "Radar offline"),
    eva(EvaVoice::IronCurtainReady, "IRONRDY1.AUD", 200, 30000, "Iron curtain ready"),
    eva(EvaVoice::IronCurtainCharging, "IRONCHG1.AUD", 100, 10000, "Iron curtain charging"),
    eva(EvaVoice::ChronosphereReady, "CHRORDY1.AUD", 200, 30000, "Chronosphere ready"),
    eva(EvaVoice::ChronosphereCharging, "CHROCHG1.AUD", 100, 10000, "Chronosphere charging"),
    eva(EvaVoice::NukeReady, "NUKESRDY.AUD", 220, 30000, "Nuke ready"),
    eva(EvaVoice::NukeLaunched, "NUKLNCH1.AUD", 255, 5000, "Nuke launched"),
    eva(EvaVoice::NukeAttack, "NUKEATK1.AUD", 255, 5000, "Nuclear attack imminent"),
    eva(EvaVoice::GpsReady, "GPSRDY1.AUD", 180, 30000, "GPS ready"),
    eva(EvaVoice::ParabombsReady, "PARABRDY.AUD", 180, 30000, "Parabombs ready"),
    eva(EvaVoice::SpyPlaneReady, "SPYRDY1.AUD", 150, 30000, "Spy plane ready"),
    eva(EvaVoice::MissionAccomplished, "ACCOM1.AUD", 255, 0, "Mission accomplished"),
    eva(EvaVoice::MissionFailed, "FAIL1.AUD", 255, 0, "Mission failed"),
    eva(EvaVoice::BattleControlOnline, "BATCON1.AUD", 200, 0, "Battle control online"),
    eva(EvaVoice::BattleControlTerminated, "BATCONT1.AUD", 200, 0, "Battle control terminated"),
    eva(EvaVoice::PlayerDefeated, "PLYDEFT1.AUD", 200, 5000, "Player defeated"),
    eva(EvaVoice::AllyAttack, "ALLATK1.AUD", 220, 30000, "Ally under attack"),
];

/// Faction whose recordings a unit speaks with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Shared recordings.
    #[default]
    Neutral,
    /// Allied forces.
    Allied,
    /// Soviet forces.
    Soviet,
}

/// Unit acknowledgement lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitVoice {
    // Selection
    /// "Reporting"
    Reporting,
    /// "Yes sir"
    YesSir,
    /// "Ready and waiting"
    Ready,
    /// "Awaiting orders"
    AwaitingOrders,
    /// "At your service"
    AtYourService,
    /// "Acknowledged"
    Acknowledged,
    /// "Affirmative"
    Affirmative,
    // Movement
    /// "Moving out"
    MovingOut,
    /// "On my way"
    OnMyWay,
    /// "Double time"
    DoubleTime,
    /// "You got it"
    YouGotIt,
    /// "No problem"
    NoProblem,
    /// "Roger"
    Roger,
    // Attack
    /// "Attacking"
    Attacking,
    /// "Firing"
    Firing,
    /// "Let 'em have it"
    LetEmHaveIt,
    /// "For Mother Russia"
    ForMotherRussia,
    /// "For King and Country"
    ForKingAndCountry,
    // Specialists
    /// Engineer.
    EngineerReady,
    /// Medic.
    MedicReady,
    /// Spy.
    SpyReady,
    /// Tanya.
    TanyaReady,
    /// Thief.
    ThiefReady,
    // Vehicles
    /// Generic vehicle.
    VehicleMoving,
    /// Tank.
    TankReady,
    /// Helicopter.
    HelicopterReady,
    /// Naval unit.
    BoatReady,
}

impl UnitVoice {
    /// Every unit line, in catalog order.
    pub const ALL: [Self; UNIT_VOICE_COUNT] = [
        Self::Reporting,
        Self::YesSir,
        Self::Ready,
        Self::AwaitingOrders,
        Self::AtYourService,
        Self::Acknowledged,
        Self::Affirmative,
        Self::MovingOut,
        Self::OnMyWay,
        Self::DoubleTime,
        Self::YouGotIt,
        Self::NoProblem,
        Self::Roger,
        Self::Attacking,
        Self::Firing,
        Self::LetEmHaveIt,
        Self::ForMotherRussia,
        Self::ForKingAndCountry,
        Self::EngineerReady,
        Self::MedicReady,
        Self::SpyReady,
        Self::TanyaReady,
        Self::ThiefReady,
        Self::VehicleMoving,
        Self::TankReady,
        Self::HelicopterReady,
        Self::BoatReady,
    ];

    /// Lines worth decoding before the first match starts.
    pub const COMMON: [Self; 5] = [
        Self::Reporting,
        Self::Acknowledged,
        Self::Affirmative,
        Self::MovingOut,
        Self::Attacking,
    ];

    /// Slot in the catalog.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Catalog entry.
    #[must_use]
    pub fn info(self) -> &'static UnitVoiceInfo {
        &UNIT_VOICE_CATALOG[self.index()]
    }

    /// Recording for `faction`, falling back to the shared one.
    #[must_use]
    pub fn filename_for(self, faction: Faction) -> &'static str {
        let info = self.info();
        match (faction, info.soviet_filename) {
            (Faction::Soviet, Some(soviet)) => soviet,
            _ => info.filename,
        }
    }

    /// Minimum time between two plays of this line.
    #[must_use]
    pub fn min_interval_ms(self) -> Millis {
        self.info().min_interval_ms
    }
}

/// Static data for one unit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitVoiceInfo {
    /// Line this entry describes.
    pub voice: UnitVoice,
    /// Shared recording.
    pub filename: &'static str,
    /// Soviet-specific recording.
    pub soviet_filename: Option<&'static str>,
    /// Minimum time between two plays of this line.
    pub min_interval_ms: Millis,
}

const fn unit(voice: UnitVoice, filename: &'static str, min_interval_ms: Millis) -> UnitVoiceInfo {
    UnitVoiceInfo {
        voice,
        filename,
        soviet_filename: None,
        min_interval_ms,
    }
}

/// Unit voice catalog, indexed by [`UnitVoice::index`].
pub static UNIT_VOICE_CATALOG: [UnitVoiceInfo; UNIT_VOICE_COUNT] = [
    unit(UnitVoice::Reporting, "REPORTN1.AUD", 800),
    unit(UnitVoice::YesSir, "YESSIR1.AUD", 800),
    unit(UnitVoice::Ready, "READY1.AUD", 800),
    unit(UnitVoice::AwaitingOrders, "AWARONE1.AUD", 800),
    unit(UnitVoice::AtYourService, "ATSERV1.AUD", 800),
    unit(UnitVoice::Acknowledged, "ACKNO1.AUD", 800),
    unit(UnitVoice::Affirmative, "AFFIRM1.AUD", 800),
    unit(UnitVoice::MovingOut, "MOVOUT1.AUD", 600),
    unit(UnitVoice::OnMyWay, "ONWAY1.AUD", 600),
    unit(UnitVoice::DoubleTime, "DOUBLE1.AUD", 600),
    unit(UnitVoice::YouGotIt, "UGOTIT1.AUD", 600),
    unit(UnitVoice::NoProblem, "NODEST1.AUD", 600),
    unit(UnitVoice::Roger, "ROGER1.AUD", 600),
    unit(UnitVoice::Attacking, "ATACKNG1.AUD", 500),
    unit(UnitVoice::Firing, "FIREONE1.AUD", 500),
    unit(UnitVoice::LetEmHaveIt, "LETEM1.AUD", 500),
    UnitVoiceInfo {
        voice: UnitVoice::ForMotherRussia,
        filename: "FORMR1.AUD",
        soviet_filename: Some("FORMR1.AUD"),
        min_interval_ms: 500,
    },
    unit(UnitVoice::ForKingAndCountry, "FORKAC1.AUD", 500),
    unit(UnitVoice::EngineerReady, "ENGR1.AUD", 800),
    unit(UnitVoice::MedicReady, "MEDIC1.AUD", 800),
    unit(UnitVoice::SpyReady, "SPY1.AUD", 800),
    unit(UnitVoice::TanyaReady, "TANYA1.AUD", 800),
    unit(UnitVoice::ThiefReady, "THIEF1.AUD", 800),
    unit(UnitVoice::VehicleMoving, "VEHIC1.AUD", 600),
    unit(UnitVoice::TankReady, "TANK1.AUD", 600),
    unit(UnitVoice::HelicopterReady, "COPTER1.AUD", 600),
    unit(UnitVoice::BoatReady, "BOAT1.AUD", 600),
];

/// Checks both voice catalogs.
pub fn validate_voice_catalogs() -> ConfigResult<()> {
    for (index, (entry, expected)) in EVA_CATALOG.iter().zip(EvaVoice::ALL).enumerate() {
        if entry.voice != expected || entry.filename.is_empty() {
            return Err(ConfigError::CatalogMismatch {
                catalog: "announcer voices",
                index,
                expected: format!("{expected:?}"),
                found: format!("{:?} ({:?})", entry.voice, entry.filename),
            });
        }
    }
    for (index, (entry, expected)) in UNIT_VOICE_CATALOG.iter().zip(UnitVoice::ALL).enumerate() {
        if entry.voice != expected || entry.filename.is_empty() {
            return Err(ConfigError::CatalogMismatch {
                catalog: "unit voices",
                index,
                expected: format!("{expected:?}"),
                found: format!("{:?} ({:?})", entry.voice, entry.filename),
            });
        }
    }
    Ok(())
}
