//! Trigger rate limiting.
//!
//! Gameplay can fire the same audio trigger dozens of times per frame (a
//! squad of riflemen shooting, a building hit by every shell of a volley).
//! The [`RateLimiter`] suppresses repeats within a cooldown window, keyed
//! along three independent dimensions:
//!
//! - **global**: one timestamp per event type
//! - **position**: one timestamp per (event type, map cell)
//! - **object**: one timestamp per (event type, object identity)
//!
//! The first occurrence of any key always passes and records the current
//! time. A cooldown of zero means the dimension is unlimited.

use std::hash::Hash;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use skirmish_common::{cooldown_satisfied, elapsed_ms, CellCoord, Millis, ObjectId};

/// Idle time after which position and object entries are pruned.
pub const RETENTION_MS: Millis = 60_000;

/// Cooldowns for one event type, in milliseconds. Zero means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownProfile {
    /// Cooldown shared by every occurrence of the event.
    pub global_ms: Millis,
    /// Cooldown per map cell.
    pub position_ms: Millis,
    /// Cooldown per object.
    pub object_ms: Millis,
}

impl CooldownProfile {
    /// Profile with no limits.
    pub const UNLIMITED: Self = Self {
        global_ms: 0,
        position_ms: 0,
        object_ms: 0,
    };

    /// Profile with only a global cooldown.
    #[must_use]
    pub const fn global(ms: Millis) -> Self {
        Self {
            global_ms: ms,
            position_ms: 0,
            object_ms: 0,
        }
    }

    /// Sets the per-cell cooldown.
    #[must_use]
    pub const fn with_position(mut self, ms: Millis) -> Self {
        self.position_ms = ms;
        self
    }

    /// Sets the per-object cooldown.
    #[must_use]
    pub const fn with_object(mut self, ms: Millis) -> Self {
        self.object_ms = ms;
        self
    }

    /// Whether every dimension is unlimited.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.global_ms == 0 && self.position_ms == 0 && self.object_ms == 0
    }
}

/// Cooldown tracker keyed by event type `E`.
#[derive(Debug, Clone)]
pub struct RateLimiter<E> {
    profiles: AHashMap<E, CooldownProfile>,
    global: AHashMap<E, Millis>,
    position: AHashMap<(E, CellCoord), Millis>,
    object: AHashMap<(E, ObjectId), Millis>,
}

impl<E> Default for RateLimiter<E> {
    fn default() -> Self {
        Self {
            profiles: AHashMap::default(),
            global: AHashMap::default(),
            position: AHashMap::default(),
            object: AHashMap::default(),
        }
    }
}

/// Checks one key and records `now` when it passes.
fn check_and_record<K: Eq + Hash>(
    map: &mut AHashMap<K, Millis>,
    key: K,
    cooldown: Millis,
    now: Millis,
) -> bool {
    if cooldown == 0 {
        return true;
    }
    if let Some(&last) = map.get(&key) {
        if !cooldown_satisfied(now, last, cooldown) {
            return false;
        }
    }
    map.insert(key, now);
    true
}

impl<E: Copy + Eq + Hash> RateLimiter<E> {
    /// Creates a limiter with no profiles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the profile for an event type.
    pub fn set_profile(&mut self, event: E, profile: CooldownProfile) {
        self.profiles.insert(event, profile);
    }

    /// Profile for an event type (unlimited if none was set).
    #[must_use]
    pub fn profile(&self, event: E) -> CooldownProfile {
        self.profiles
            .get(&event)
            .copied()
            .unwrap_or(CooldownProfile::UNLIMITED)
    }

    /// Sets the global cooldown for an event type.
    pub fn set_global_cooldown(&mut self, event: E, ms: Millis) {
        self.profiles.entry(event).or_default().global_ms = ms;
    }

    /// Sets the per-cell cooldown for an event type.
    pub fn set_position_cooldown(&mut self, event: E, ms: Millis) {
        self.profiles.entry(event).or_default().position_ms = ms;
    }

    /// Sets the per-object cooldown for an event type.
    pub fn set_object_cooldown(&mut self, event: E, ms: Millis) {
        self.profiles.entry(event).or_default().object_ms = ms;
    }

    /// Global check. Records `now` on success.
    pub fn can_fire_global(&mut self, event: E, now: Millis) -> bool {
        let cooldown = self.profile(event).global_ms;
        check_and_record(&mut self.global, event, cooldown, now)
    }

    /// Per-cell check. Records `now` for this cell on success.
    pub fn can_fire_at_position(&mut self, event: E, cell: CellCoord, now: Millis) -> bool {
        let cooldown = self.profile(event).position_ms;
        check_and_record(&mut self.position, (event, cell), cooldown, now)
    }

    /// Per-object check. Records `now` for this object on success.
    pub fn can_fire_for_object(&mut self, event: E, object: ObjectId, now: Millis) -> bool {
        let cooldown = self.profile(event).object_ms;
        check_and_record(&mut self.object, (event, object), cooldown, now)
    }

    /// Global and per-cell checks must both pass.
    ///
    /// The global timestamp is only recorded when both pass, so a blocked
    /// cell never consumes the global window.
    pub fn can_fire_global_and_position(
        &mut self,
        event: E,
        cell: CellCoord,
        now: Millis,
    ) -> bool {
        if !self.global_ready(event, now) {
            return false;
        }
        if !self.can_fire_at_position(event, cell, now) {
            return false;
        }
        self.record_global(event, now);
        true
    }

    /// Global and per-object checks must both pass.
    pub fn can_fire_global_and_object(&mut self, event: E, object: ObjectId, now: Millis) -> bool {
        if !self.global_ready(event, now) {
            return false;
        }
        if !self.can_fire_for_object(event, object, now) {
            return false;
        }
        self.record_global(event, now);
        true
    }

    fn global_ready(&self, event: E, now: Millis) -> bool {
        let cooldown = self.profile(event).global_ms;
        cooldown == 0
            || self
                .global
                .get(&event)
                .map_or(true, |&last| cooldown_satisfied(now, last, cooldown))
    }

    fn record_global(&mut self, event: E, now: Millis) {
        if self.profile(event).global_ms > 0 {
            self.global.insert(event, now);
        }
    }

    /// Drops position and object entries idle for longer than
    /// [`RETENTION_MS`]. Returns how many were removed.
    pub fn cleanup(&mut self, now: Millis) -> usize {
        let before = self.position.len() + self.object.len();
        self.position
            .retain(|_, last| elapsed_ms(now, *last) <= RETENTION_MS);
        self.object
            .retain(|_, last| elapsed_ms(now, *last) <= RETENTION_MS);
        before - (self.position.len() + self.object.len())
    }

    /// Forgets every recorded timestamp. Profiles are kept.
    pub fn reset(&mut self) {
        self.global.clear();
        self.position.clear();
        self.object.clear();
    }

    /// Number of recorded timestamps across all dimensions.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.global.len() + self.position.len() + self.object.len()
    }
}
