//! Gameplay trigger routing.
//!
//! The simulation reports what happened; the [`EventRouter`] decides what
//! that sounds like. Every trigger is classified by key (global, map cell,
//! or object identity), checked against the rate limiter, and only then
//! dispatched to the sound bank, the music player or the voice lines.
//!
//! ```text
//! trigger ──▶ count ──▶ limiter ──┬─▶ dispatch
//!                                 └─▶ suppressed++
//! ```
//!
//! Announcer triggers only speak for the local player. Mission results and
//! music transitions are counted but never limited.

use skirmish_common::{ObjectId, WorldPoint, TILE_PIXEL_SIZE};
use skirmish_gameplay::{AudioEventType, EvaVoice, Faction, MusicTrack, SoundEffect, UnitVoice};
use tracing::debug;

use crate::audio_system::AudioSystem;

/// Damage above this plays the heavy hit.
pub const LARGE_DAMAGE: i32 = 50;

/// Damage above this plays the light hit. Anything lower is silent.
pub const SMALL_DAMAGE: i32 = 10;

/// Who a building, unit or base condition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Owner {
    /// The local player.
    #[default]
    Player,
    /// Anyone else.
    Other,
}

impl Owner {
    /// Whether this is the local player.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Self::Player)
    }
}

/// Explosion size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionSize {
    /// Grenades, small shells.
    Small,
    /// Vehicle kills, artillery.
    Medium,
    /// Buildings, barrels, superweapons.
    Large,
}

impl ExplosionSize {
    /// Maps a numeric size (0, 1, 2+) to a class.
    #[must_use]
    pub const fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=0 => Self::Small,
            1 => Self::Medium,
            _ => Self::Large,
        }
    }

    const fn effect(self) -> SoundEffect {
        match self {
            Self::Small => SoundEffect::ExplodeSmall,
            Self::Medium => SoundEffect::ExplodeMedium,
            Self::Large => SoundEffect::ExplodeLarge,
        }
    }

    const fn event(self) -> AudioEventType {
        match self {
            Self::Small | Self::Medium => AudioEventType::ExplosionSmall,
            Self::Large => AudioEventType::ExplosionLarge,
        }
    }
}

/// Trigger counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerStats {
    /// Triggers received, including suppressed ones.
    pub triggered: u64,
    /// Triggers dropped by the rate limiter.
    pub suppressed: u64,
}

impl TriggerStats {
    /// Share of triggers that were suppressed, in percent.
    #[must_use]
    pub fn suppression_ratio(&self) -> f32 {
        if self.triggered == 0 {
            0.0
        } else {
            self.suppressed as f32 / self.triggered as f32 * 100.0
        }
    }
}

/// Maps gameplay triggers onto the audio system.
#[derive(Debug)]
pub struct EventRouter {
    system: AudioSystem,
    faction: Faction,
    stats: TriggerStats,
}

impl EventRouter {
    /// Wraps an audio system.
    #[must_use]
    pub fn new(system: AudioSystem) -> Self {
        Self {
            system,
            faction: Faction::default(),
            stats: TriggerStats::default(),
        }
    }

    /// The wrapped audio system.
    #[must_use]
    pub const fn system(&self) -> &AudioSystem {
        &self.system
    }

    /// The wrapped audio system, for direct playback and volume control.
    pub fn system_mut(&mut self) -> &mut AudioSystem {
        &mut self.system
    }

    /// Unwraps the audio system.
    #[must_use]
    pub fn into_system(self) -> AudioSystem {
        self.system
    }

    /// Advances the audio system by one frame.
    pub fn update(&mut self) {
        self.system.update();
    }

    /// Side whose unit voices are used for acknowledgements.
    pub fn set_faction(&mut self, faction: Faction) {
        self.faction = faction;
    }

    /// Side whose unit voices are used.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Trigger counters.
    #[must_use]
    pub const fn stats(&self) -> TriggerStats {
        self.stats
    }

    /// Clears the counters and every cooldown timestamp.
    pub fn reset(&mut self) {
        self.stats = TriggerStats::default();
        self.system.limiter_mut().reset();
    }

    // ============================================
    // Gates
    // ============================================

    fn suppress(&mut self, event: AudioEventType) -> bool {
        self.stats.suppressed += 1;
        debug!("Audio trigger {} rate limited", event.name());
        false
    }

    fn gate_global(&mut self, event: AudioEventType) -> bool {
        self.stats.triggered += 1;
        let (limiter, now) = self.system.limiter_at_now();
        limiter.can_fire_global(event, now) || self.suppress(event)
    }

    fn gate_position(&mut self, event: AudioEventType, position: WorldPoint) -> bool {
        self.stats.triggered += 1;
        let cell = position.to_cell(TILE_PIXEL_SIZE);
        let (limiter, now) = self.system.limiter_at_now();
        limiter.can_fire_global_and_position(event, cell, now) || self.suppress(event)
    }

    fn gate_object(&mut self, event: AudioEventType, object: ObjectId) -> bool {
        self.stats.triggered += 1;
        let (limiter, now) = self.system.limiter_at_now();
        limiter.can_fire_global_and_object(event, object, now) || self.suppress(event)
    }

    fn count(&mut self) {
        self.stats.triggered += 1;
    }

    // ============================================
    // Combat
    // ============================================

    /// Something took `amount` damage from a source at `position`.
    pub fn damage(&mut self, position: WorldPoint, amount: i32) {
        let (event, effect) = if amount > LARGE_DAMAGE {
            (AudioEventType::DamageLarge, SoundEffect::ExplodeLarge)
        } else if amount > SMALL_DAMAGE {
            (AudioEventType::DamageSmall, SoundEffect::ExplodeSmall)
        } else {
            return;
        };
        if self.gate_position(event, position) {
            self.system.play_sound_at(effect, position);
        }
    }

    /// An explosion went off.
    pub fn explosion(&mut self, position: WorldPoint, size: ExplosionSize) {
        if self.gate_position(size.event(), position) {
            self.system.play_sound_at(size.effect(), position);
        }
    }

    /// A weapon fired.
    pub fn weapon_fire(&mut self, position: WorldPoint) {
        if self.gate_position(AudioEventType::WeaponFire, position) {
            self.system.play_sound_at(SoundEffect::WeaponMgun, position);
        }
    }

    /// A projectile hit.
    pub fn projectile_impact(&mut self, position: WorldPoint) {
        if self.gate_position(AudioEventType::ProjectileImpact, position) {
            self.system.play_sound_at(SoundEffect::ImpactShell, position);
        }
    }

    // ============================================
    // Units
    // ============================================

    fn acknowledge(&mut self, event: AudioEventType, unit: ObjectId, voice: UnitVoice) {
        if self.gate_object(event, unit) {
            self.system.play_unit(voice, self.faction);
        }
    }

    /// A unit was selected.
    pub fn unit_selected(&mut self, unit: ObjectId) {
        self.acknowledge(AudioEventType::UnitSelect, unit, UnitVoice::Reporting);
    }

    /// A unit was ordered to move.
    pub fn unit_move_order(&mut self, unit: ObjectId) {
        self.acknowledge(AudioEventType::UnitMoveOrder, unit, UnitVoice::MovingOut);
    }

    /// A unit was ordered to attack.
    pub fn unit_attack_order(&mut self, unit: ObjectId) {
        self.acknowledge(AudioEventType::UnitAttackOrder, unit, UnitVoice::Attacking);
    }

    /// A unit died at `position`.
    pub fn unit_death(&mut self, position: WorldPoint) {
        if self.gate_position(AudioEventType::UnitDeath, position) {
            self.system.play_sound_at(SoundEffect::ExplodeSmall, position);
        }
    }

    /// A unit left the factory. The announcer line is raised separately
    /// through [`EventRouter::unit_ready`].
    pub fn unit_created(&mut self, owner: Owner) {
        if owner.is_player() {
            self.gate_global(AudioEventType::UnitCreated);
        }
    }

    /// A unit started or stopped moving.
    ///
    /// Only starts make a sound, at most once per unit per cooldown.
    /// Suppressed starts are not counted.
    pub fn unit_movement(&mut self, unit: ObjectId, moving: bool) {
        if !moving {
            return;
        }
        let (limiter, now) = self.system.limiter_at_now();
        if !limiter.can_fire_for_object(AudioEventType::AmbientMovement, unit, now) {
            return;
        }
        self.count();
        self.system.play_sound(SoundEffect::MoveVehicle);
    }

    // ============================================
    // Buildings
    // ============================================

    /// A building was placed.
    pub fn building_placed(&mut self) {
        if self.gate_global(AudioEventType::BuildingPlaced) {
            self.system.play_sound(SoundEffect::BuildPlace);
        }
    }

    /// Construction finished.
    pub fn building_complete(&mut self, owner: Owner) {
        if !self.gate_global(AudioEventType::BuildingComplete) {
            return;
        }
        self.system.play_sound(SoundEffect::BuildClock);
        if owner.is_player() {
            self.system.queue_eva(EvaVoice::ConstructionComplete);
        }
    }

    /// A building was sold.
    pub fn building_sold(&mut self) {
        if self.gate_global(AudioEventType::BuildingSold) {
            self.system.play_sound(SoundEffect::BuildSold);
        }
    }

    /// A building was destroyed.
    pub fn building_destroyed(&mut self, owner: Owner) {
        if !self.gate_global(AudioEventType::BuildingDestroyed) {
            return;
        }
        self.system.play_sound(SoundEffect::ExplodeHuge);
        self.building_lost(owner);
    }

    /// A building changed hands.
    pub fn building_captured(&mut self) {
        if self.gate_global(AudioEventType::BuildingCaptured) {
            self.system.play_sound(SoundEffect::UiTarget);
        }
    }

    // ============================================
    // Announcer
    // ============================================

    fn announce(&mut self, owner: Owner, event: AudioEventType, voice: EvaVoice) {
        if owner.is_player() && self.gate_global(event) {
            self.system.play_eva(voice);
        }
    }

    fn announce_queued(&mut self, owner: Owner, event: AudioEventType, voice: EvaVoice) {
        if owner.is_player() && self.gate_global(event) {
            self.system.queue_eva(voice);
        }
    }

    /// The base is under attack.
    pub fn base_under_attack(&mut self, owner: Owner) {
        self.announce(owner, AudioEventType::EvaBaseAttack, EvaVoice::BaseUnderAttack);
    }

    /// A unit was lost.
    pub fn unit_lost(&mut self, owner: Owner) {
        self.announce_queued(owner, AudioEventType::EvaUnitLost, EvaVoice::UnitLost);
    }

    /// A building was lost.
    pub fn building_lost(&mut self, owner: Owner) {
        self.announce_queued(owner, AudioEventType::EvaBuildingLost, EvaVoice::BuildingLost);
    }

    /// Power demand exceeds supply.
    pub fn low_power(&mut self, owner: Owner) {
        self.announce(owner, AudioEventType::EvaLowPower, EvaVoice::LowPower);
    }

    /// Not enough credits.
    pub fn insufficient_funds(&mut self, owner: Owner) {
        self.announce(
            owner,
            AudioEventType::EvaInsufficientFunds,
            EvaVoice::InsufficientFunds,
        );
    }

    /// Storage is full.
    pub fn silos_needed(&mut self, owner: Owner) {
        self.announce(owner, AudioEventType::EvaSilosNeeded, EvaVoice::SilosNeeded);
    }

    /// Radar came up.
    pub fn radar_online(&mut self, owner: Owner) {
        self.announce(owner, AudioEventType::EvaRadarOnline, EvaVoice::RadarOnline);
    }

    /// Radar went down.
    pub fn radar_offline(&mut self, owner: Owner) {
        self.announce(owner, AudioEventType::EvaRadarOffline, EvaVoice::RadarOffline);
    }

    /// A unit is ready.
    pub fn unit_ready(&mut self, owner: Owner) {
        self.announce_queued(owner, AudioEventType::EvaUnitReady, EvaVoice::UnitReady);
    }

    /// Construction is complete.
    pub fn construction_complete(&mut self, owner: Owner) {
        self.announce(
            owner,
            AudioEventType::EvaConstructionComplete,
            EvaVoice::ConstructionComplete,
        );
    }

    /// Mission won. Never rate limited.
    pub fn mission_accomplished(&mut self) {
        self.count();
        self.system.play_eva(EvaVoice::MissionAccomplished);
    }

    /// Mission lost. Never rate limited.
    pub fn mission_failed(&mut self) {
        self.count();
        self.system.play_eva(EvaVoice::MissionFailed);
    }

    // ============================================
    // Interface
    // ============================================

    fn ui(&mut self, event: AudioEventType, effect: SoundEffect) {
        if self.gate_global(event) {
            self.system.play_sound(effect);
        }
    }

    /// Generic click.
    pub fn ui_click(&mut self) {
        self.ui(AudioEventType::UiClick, SoundEffect::UiClick);
    }

    /// Build button click.
    pub fn ui_build_click(&mut self) {
        self.ui(AudioEventType::UiBuildClick, SoundEffect::UiClick);
    }

    /// Sidebar tab click.
    pub fn ui_tab_click(&mut self) {
        self.ui(AudioEventType::UiTabClick, SoundEffect::UiBeep);
    }

    /// Sidebar scrolled up.
    pub fn ui_sidebar_up(&mut self) {
        self.ui(AudioEventType::UiSidebarUp, SoundEffect::UiBeep);
    }

    /// Sidebar scrolled down.
    pub fn ui_sidebar_down(&mut self) {
        self.ui(AudioEventType::UiSidebarDown, SoundEffect::UiBeep);
    }

    /// Action refused.
    pub fn ui_cannot(&mut self) {
        self.ui(AudioEventType::UiCannot, SoundEffect::UiError);
    }

    /// Primary building set.
    pub fn ui_primary_set(&mut self) {
        self.ui(AudioEventType::UiPrimarySet, SoundEffect::BuildPrimary);
    }

    // ============================================
    // Game flow
    // ============================================

    /// Entered the main menu.
    pub fn enter_main_menu(&mut self) {
        self.count();
        self.system.play_music(MusicTrack::Menu);
    }

    /// Entered a mission briefing.
    pub fn enter_briefing(&mut self) {
        self.count();
        self.system.play_music(MusicTrack::ScoreScreen);
    }

    /// A mission started: in-game music on shuffle.
    pub fn mission_start(&mut self) {
        self.count();
        self.system.play_music(MusicTrack::Bigfoot);
        self.system.set_music_shuffle(true);
    }

    /// Fighting started. Music carries on unchanged.
    pub fn combat_start(&mut self) {
        self.count();
    }

    /// Fighting stopped. Music carries on unchanged.
    pub fn combat_end(&mut self) {
        self.count();
    }

    /// The player won.
    pub fn victory(&mut self) {
        self.count();
        self.system.stop_music();
        self.system.play_eva(EvaVoice::MissionAccomplished);
        self.system.play_music(MusicTrack::ScoreScreen);
    }

    /// The player lost.
    pub fn defeat(&mut self) {
        self.count();
        self.system.stop_music();
        self.system.play_eva(EvaVoice::MissionFailed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_common::{ManualClock, ObjectIdAllocator};
    use skirmish_gameplay::MusicState;

    use crate::config::AudioSystemConfig;
    use crate::test_support::{rig, Rig};

    fn router() -> (EventRouter, ManualClock) {
        let Rig { system, clock, .. } = rig(AudioSystemConfig::default());
        (EventRouter::new(system), clock)
    }

    #[test]
    fn test_explosion_size_levels() {
        assert_eq!(ExplosionSize::from_level(-3), ExplosionSize::Small);
        assert_eq!(ExplosionSize::from_level(0), ExplosionSize::Small);
        assert_eq!(ExplosionSize::from_level(1), ExplosionSize::Medium);
        assert_eq!(ExplosionSize::from_level(7), ExplosionSize::Large);
    }

    #[test]
    fn test_position_triggers_keyed_by_cell() {
        let (mut router, clock) = router();
        let a = WorldPoint::new(100, 100);
        let a_same_cell = WorldPoint::new(110, 115);
        let b = WorldPoint::new(500, 500);

        router.weapon_fire(a);
        router.weapon_fire(a_same_cell);
        assert_eq!(router.stats(), TriggerStats { triggered: 2, suppressed: 1 });

        clock.advance(30);
        router.update();
        router.weapon_fire(b);
        assert_eq!(router.stats().suppressed, 1);

        clock.advance(30);
        router.update();
        router.weapon_fire(a);
        assert_eq!(router.stats().suppressed, 2);
    }

    #[test]
    fn test_damage_thresholds() {
        let (mut router, clock) = router();
        router.damage(WorldPoint::new(0, 0), 5);
        assert_eq!(router.stats().triggered, 0);

        router.damage(WorldPoint::new(0, 0), 20);
        assert!(router.system().sounds().is_playing(SoundEffect::ExplodeSmall));

        clock.advance(100);
        router.update();
        router.damage(WorldPoint::new(48, 0), 80);
        assert!(router.system().sounds().is_playing(SoundEffect::ExplodeLarge));
        assert_eq!(router.stats().suppressed, 0);
    }

    #[test]
    fn test_explosion_effects() {
        let (mut router, clock) = router();
        router.explosion(WorldPoint::new(0, 0), ExplosionSize::Medium);
        assert!(router.system().sounds().is_playing(SoundEffect::ExplodeMedium));

        clock.advance(100);
        router.update();
        router.explosion(WorldPoint::new(0, 0), ExplosionSize::Large);
        assert!(router.system().sounds().is_playing(SoundEffect::ExplodeLarge));
    }

    #[test]
    fn test_selection_limited_per_unit() {
        let (mut router, clock) = router();
        let mut ids = ObjectIdAllocator::new();
        let first = ids.allocate();
        let second = ids.allocate();

        router.unit_selected(first);
        assert_eq!(
            router.system().voices().current_unit(),
            Some(UnitVoice::Reporting)
        );

        clock.advance(100);
        router.update();
        router.unit_selected(first);
        assert_eq!(router.stats().suppressed, 1);

        clock.advance(100);
        router.update();
        router.unit_selected(second);
        assert_eq!(router.stats(), TriggerStats { triggered: 3, suppressed: 1 });
    }

    #[test]
    fn test_recycled_slot_is_a_new_unit() {
        let (mut router, clock) = router();
        let mut ids = ObjectIdAllocator::new();
        let old = ids.allocate();
        router.unit_move_order(old);

        ids.release(old);
        let recycled = ids.allocate();
        assert_eq!(recycled.index(), old.index());

        clock.advance(150);
        router.update();
        router.unit_move_order(recycled);
        assert_eq!(router.stats().suppressed, 0);
    }

    #[test]
    fn test_announcer_only_for_player() {
        let (mut router, _clock) = router();
        router.low_power(Owner::Other);
        assert_eq!(router.stats().triggered, 0);
        assert!(!router.system().voices().is_eva_speaking());

        router.low_power(Owner::Player);
        assert_eq!(router.system().voices().current_eva(), Some(EvaVoice::LowPower));

        router.low_power(Owner::Player);
        assert_eq!(router.stats(), TriggerStats { triggered: 2, suppressed: 1 });
    }

    #[test]
    fn test_queued_announcements_wait_for_update() {
        let (mut router, clock) = router();
        router.unit_lost(Owner::Player);
        assert!(!router.system().voices().is_eva_speaking());
        assert_eq!(router.system().voices().queue_len(), 1);

        clock.advance(16);
        router.update();
        assert_eq!(router.system().voices().current_eva(), Some(EvaVoice::UnitLost));
    }

    #[test]
    fn test_mission_results_never_limited() {
        let (mut router, _clock) = router();
        router.mission_accomplished();
        router.mission_accomplished();
        router.mission_failed();
        assert_eq!(router.stats(), TriggerStats { triggered: 3, suppressed: 0 });
        assert_eq!(
            router.system().voices().current_eva(),
            Some(EvaVoice::MissionAccomplished)
        );
    }

    #[test]
    fn test_ui_triggers() {
        let (mut router, _clock) = router();
        router.ui_click();
        router.ui_click();
        assert_eq!(router.stats().suppressed, 1);

        router.ui_cannot();
        assert!(router.system().sounds().is_playing(SoundEffect::UiError));
        router.ui_primary_set();
        assert!(router.system().sounds().is_playing(SoundEffect::BuildPrimary));
    }

    #[test]
    fn test_building_destroyed_raises_building_lost() {
        let (mut router, _clock) = router();
        router.building_destroyed(Owner::Player);
        assert!(router.system().sounds().is_playing(SoundEffect::ExplodeHuge));
        assert_eq!(router.system().voices().queue_len(), 1);
        assert_eq!(router.stats().triggered, 2);

        let peek = router.system().voices().peek_queue().map(|q| q.voice);
        assert_eq!(peek, Some(EvaVoice::BuildingLost));
    }

    #[test]
    fn test_building_complete_queues_announcement() {
        let (mut router, _clock) = router();
        router.building_complete(Owner::Other);
        assert!(router.system().sounds().is_playing(SoundEffect::BuildClock));
        assert_eq!(router.system().voices().queue_len(), 0);
    }

    #[test]
    fn test_movement_counts_only_passing_starts() {
        let (mut router, clock) = router();
        let mut ids = ObjectIdAllocator::new();
        let tank = ids.allocate();

        router.unit_movement(tank, true);
        router.unit_movement(tank, true);
        router.unit_movement(tank, false);
        assert_eq!(router.stats(), TriggerStats { triggered: 1, suppressed: 0 });
        assert!(router.system().sounds().is_playing(SoundEffect::MoveVehicle));

        clock.advance(2_000);
        router.update();
        router.unit_movement(tank, true);
        assert_eq!(router.stats().triggered, 2);
    }

    #[test]
    fn test_music_flow() {
        let (mut router, _clock) = router();
        router.enter_main_menu();
        assert_eq!(router.system().music().current_track(), Some(MusicTrack::Menu));

        router.mission_start();
        assert_eq!(router.system().music().current_track(), Some(MusicTrack::Bigfoot));
        assert!(router.system().music().config().shuffle);

        router.combat_start();
        router.combat_end();
        assert_eq!(router.system().music().current_track(), Some(MusicTrack::Bigfoot));

        router.victory();
        assert_eq!(router.system().music().current_track(), Some(MusicTrack::ScoreScreen));
        assert_eq!(router.system().music().state(), MusicState::Playing);
        assert_eq!(
            router.system().voices().current_eva(),
            Some(EvaVoice::MissionAccomplished)
        );
        assert_eq!(router.stats(), TriggerStats { triggered: 5, suppressed: 0 });
    }

    #[test]
    fn test_defeat_stops_music() {
        let (mut router, _clock) = router();
        router.mission_start();
        router.defeat();
        assert_eq!(router.system().music().state(), MusicState::Stopped);
        assert_eq!(router.system().voices().current_eva(), Some(EvaVoice::MissionFailed));
    }

    #[test]
    fn test_soviet_faction_voice() {
        let (mut router, _clock) = router();
        router.set_faction(Faction::Soviet);
        let mut ids = ObjectIdAllocator::new();
        router.unit_attack_order(ids.allocate());
        assert_eq!(router.system().voices().current_unit(), Some(UnitVoice::Attacking));
    }

    #[test]
    fn test_cooldowns_measured_in_frame_time() {
        let (mut router, clock) = router();
        router.ui_click();
        clock.advance(100);
        router.ui_click();
        assert_eq!(router.stats().suppressed, 1);

        router.update();
        router.ui_click();
        assert_eq!(router.stats(), TriggerStats { triggered: 3, suppressed: 1 });
    }

    #[test]
    fn test_reset_clears_counters_and_cooldowns() {
        let (mut router, _clock) = router();
        router.ui_click();
        router.ui_click();
        router.reset();
        assert_eq!(router.stats(), TriggerStats::default());

        router.ui_click();
        assert_eq!(router.stats().suppressed, 0);
        assert!((TriggerStats { triggered: 4, suppressed: 1 }.suppression_ratio() - 25.0).abs() < 1e-4);
    }
}
