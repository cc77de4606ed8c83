//! Session state and core types
//!
//! Counters, phase and the seed a session replays from.

use std::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_TARGETS;

/// Coarse lifecycle stage of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Scene created, start event not yet received
    #[default]
    NotStarted,
    /// Spawning and shooting
    Running,
    /// Quota spawned and every target destroyed (terminal)
    Complete,
}

/// Identifier of a spawned target, assigned from 1 upward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Seed the session RNG is rebuilt from
#[derive(Debug, Clone)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Game-progress counters for one session
///
/// Invariants:
/// - `remaining_count <= spawned_count <= MAX_TARGETS`
/// - `live.len() == remaining_count`
/// - `phase == Complete` iff quota spawned and nothing remains
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Targets created so far
    pub(crate) spawned_count: u32,
    /// Targets currently alive
    pub(crate) remaining_count: u32,
    /// Seconds timestamp captured by the start event
    pub(crate) started_at: Option<f64>,
    pub(crate) phase: SessionPhase,
    /// Live target ids, oldest first
    pub(crate) live: Vec<TargetId>,
    next_id: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            spawned_count: 0,
            remaining_count: 0,
            started_at: None,
            phase: SessionPhase::NotStarted,
            live: Vec::with_capacity(MAX_TARGETS as usize),
            next_id: 1,
        }
    }
}

impl SessionState {
    pub fn spawned_count(&self) -> u32 {
        self.spawned_count
    }

    pub fn remaining_count(&self) -> u32 {
        self.remaining_count
    }

    pub fn started_at(&self) -> Option<f64> {
        self.started_at
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Ids of targets still standing, oldest first
    pub fn live_targets(&self) -> &[TargetId] {
        &self.live
    }

    pub fn is_alive(&self, id: TargetId) -> bool {
        self.live.contains(&id)
    }

    /// True once no more targets may be spawned
    #[inline]
    pub fn quota_reached(&self) -> bool {
        self.spawned_count >= MAX_TARGETS
    }

    /// Allocate a new target ID
    pub(crate) fn next_target_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }
}
