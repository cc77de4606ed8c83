//! Session lifecycle
//!
//! Owns the session counters and reacts to host events. Each handler returns
//! the commands the host must carry out; the core never touches timers,
//! anchors or labels itself.

use glam::Mat4;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::error::{SessionError, SessionResult};
use super::placement::{self, SpawnTransform};
use super::state::{RngState, SessionPhase, SessionState, TargetId};
use crate::consts::*;

/// Commands issued to the AR/UI host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Add an anchor to the AR session. `target` is `None` for tap-placed
    /// anchors that are not part of the gallery.
    RegisterAnchor {
        target: Option<TargetId>,
        transform: SpawnTransform,
    },
    /// Stop the periodic spawn trigger
    CancelSpawnTimer,
    /// Refresh the "remaining" label
    UpdateRemainingDisplay { remaining: u32 },
    /// Play the hit animation and drop the target's node
    RemoveTargetVisual {
        target: TargetId,
        fade_secs: f32,
        scale_to: f32,
    },
    /// Show the completion screen
    SessionComplete { elapsed_secs: f64 },
}

/// A single play session
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    rng_state: RngState,
    rng: Pcg32,
    /// Player reference frame that automatic spawns are placed around
    player_frame: Mat4,
}

impl Session {
    /// Create a new session with the given seed
    pub fn new(seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        Self {
            state: SessionState::default(),
            rng: rng_state.to_rng(),
            rng_state,
            player_frame: Mat4::IDENTITY,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Update the frame automatic spawns are placed around
    pub fn set_player_frame(&mut self, frame: Mat4) {
        self.player_frame = frame;
    }

    /// Scene is ready: capture the start time and begin running
    pub fn on_scene_start(&mut self, now: f64) -> SessionResult<Vec<SessionCommand>> {
        match self.state.phase {
            SessionPhase::NotStarted => {}
            SessionPhase::Running => return Err(self.reject(SessionError::AlreadyStarted)),
            SessionPhase::Complete => return Err(self.reject(SessionError::SessionComplete)),
        }

        self.state.started_at = Some(now);
        self.state.phase = SessionPhase::Running;
        log::info!("Session started (seed {})", self.rng_state.seed);

        Ok(vec![SessionCommand::UpdateRemainingDisplay {
            remaining: self.state.remaining_count,
        }])
    }

    /// Periodic spawn trigger
    ///
    /// Requires `on_scene_start` first; earlier ticks fail with `NotStarted`.
    /// Once the quota is spawned every further tick only repeats
    /// `CancelSpawnTimer`, so late ticks from a host timer are harmless.
    pub fn on_spawn_tick(&mut self) -> SessionResult<Vec<SessionCommand>> {
        if self.state.phase == SessionPhase::NotStarted {
            return Err(self.reject(SessionError::NotStarted));
        }

        if self.state.quota_reached() {
            log::debug!("Spawn quota reached, cancelling spawn timer");
            return Ok(vec![SessionCommand::CancelSpawnTimer]);
        }

        let id = self.state.next_target_id();
        self.state.spawned_count += 1;
        self.state.remaining_count += 1;
        self.state.live.push(id);

        let transform =
            placement::auto_spawn_in_frame(self.player_frame, &mut self.rng, AUTO_SPAWN_DISTANCE);
        log::debug!(
            "Spawned {} ({}/{}) at {:?}",
            id,
            self.state.spawned_count,
            MAX_TARGETS,
            transform.translation()
        );
        if self.state.quota_reached() {
            log::info!("All {} targets spawned", MAX_TARGETS);
        }

        Ok(vec![
            SessionCommand::RegisterAnchor {
                target: Some(id),
                transform,
            },
            SessionCommand::UpdateRemainingDisplay {
                remaining: self.state.remaining_count,
            },
        ])
    }

    /// User touch, already hit-tested by the host
    ///
    /// A touch on empty space produces no commands.
    pub fn on_touch(
        &mut self,
        hit: Option<TargetId>,
        now: f64,
    ) -> SessionResult<Vec<SessionCommand>> {
        self.ensure_running()?;

        let Some(id) = hit else {
            return Ok(Vec::new());
        };
        let Some(index) = self.state.live.iter().position(|t| *t == id) else {
            return Err(self.reject(SessionError::UnknownTarget(id)));
        };
        self.state.live.remove(index);

        let mut commands = vec![SessionCommand::RemoveTargetVisual {
            target: id,
            fade_secs: HIT_FADE_SECS,
            scale_to: HIT_SCALE_TO,
        }];
        commands.extend(self.retire_target(id, now));
        Ok(commands)
    }

    /// A target was destroyed by some means the host tracks without ids
    ///
    /// Retires the oldest live target.
    pub fn on_target_destroyed(&mut self, now: f64) -> SessionResult<Vec<SessionCommand>> {
        self.ensure_running()?;

        if self.state.remaining_count == 0 {
            return Err(self.reject(SessionError::NoTargetsRemaining));
        }
        let id = self.state.live.remove(0);
        Ok(self.retire_target(id, now))
    }

    /// Direct tap-to-place: a decorative anchor just in front of the camera
    ///
    /// Does not count as a target.
    pub fn on_place_tap(&mut self, camera: Mat4) -> SessionResult<Vec<SessionCommand>> {
        self.ensure_running()?;

        let transform = placement::tap_spawn(camera, TAP_SPAWN_DISTANCE);
        log::debug!("Tap-placed anchor at {:?}", transform.translation());
        Ok(vec![SessionCommand::RegisterAnchor {
            target: None,
            transform,
        }])
    }

    /// Seconds since start, if started
    pub fn elapsed(&self, now: f64) -> Option<f64> {
        self.state.started_at.map(|start| (now - start).max(0.0))
    }

    fn ensure_running(&self) -> SessionResult<()> {
        match self.state.phase {
            SessionPhase::Running => Ok(()),
            SessionPhase::NotStarted => Err(self.reject(SessionError::NotStarted)),
            SessionPhase::Complete => Err(self.reject(SessionError::SessionComplete)),
        }
    }

    /// Decrement the live count (caller has already checked it is non-zero
    /// and removed `id` from the live list)
    fn retire_target(&mut self, id: TargetId, now: f64) -> Vec<SessionCommand> {
        self.state.remaining_count -= 1;
        log::debug!("Destroyed {} ({} remaining)", id, self.state.remaining_count);

        let mut commands = vec![SessionCommand::UpdateRemainingDisplay {
            remaining: self.state.remaining_count,
        }];

        if self.state.quota_reached() && self.state.remaining_count == 0 {
            self.state.phase = SessionPhase::Complete;
            let elapsed_secs = self.elapsed(now).unwrap_or(0.0);
            log::info!("Session complete in {:.1}s", elapsed_secs);
            commands.push(SessionCommand::SessionComplete { elapsed_secs });
        }
        commands
    }

    fn reject(&self, err: SessionError) -> SessionError {
        log::warn!("Rejected event in {:?}: {}", self.state.phase, err);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use proptest::prelude::*;

    fn running(seed: u64) -> Session {
        let mut session = Session::new(seed);
        session.on_scene_start(0.0).unwrap();
        session
    }

    fn spawn_all(session: &mut Session) -> Vec<TargetId> {
        (0..MAX_TARGETS)
            .map(|_| {
                let commands = session.on_spawn_tick().unwrap();
                match commands[0] {
                    SessionCommand::RegisterAnchor {
                        target: Some(id), ..
                    } => id,
                    ref other => panic!("expected anchor registration, got {:?}", other),
                }
            })
            .collect()
    }

    fn count_completions(commands: &[SessionCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, SessionCommand::SessionComplete { .. }))
            .count()
    }

    #[test]
    fn test_start_enters_running() {
        let mut session = Session::new(1);
        assert_eq!(session.phase(), SessionPhase::NotStarted);

        let commands = session.on_scene_start(5.0).unwrap();
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.state().started_at(), Some(5.0));
        assert_eq!(
            commands,
            vec![SessionCommand::UpdateRemainingDisplay { remaining: 0 }]
        );
    }

    #[test]
    fn test_start_twice_rejected() {
        let mut session = running(1);
        assert_eq!(session.on_scene_start(1.0), Err(SessionError::AlreadyStarted));
        assert_eq!(session.state().started_at(), Some(0.0));
    }

    #[test]
    fn test_tick_before_start_leaves_state_untouched() {
        let mut session = Session::new(1);
        assert_eq!(session.on_spawn_tick(), Err(SessionError::NotStarted));
        assert_eq!(session.phase(), SessionPhase::NotStarted);
        assert!(session.state().live_targets().is_empty());

        session.on_scene_start(0.0).unwrap();
        let commands = session.on_spawn_tick().unwrap();
        assert!(matches!(
            commands[0],
            SessionCommand::RegisterAnchor {
                target: Some(TargetId(1)),
                ..
            }
        ));
    }

    #[test]
    fn test_events_before_start_rejected() {
        let mut session = Session::new(1);
        assert_eq!(session.on_spawn_tick(), Err(SessionError::NotStarted));
        assert_eq!(session.on_target_destroyed(0.0), Err(SessionError::NotStarted));
        assert_eq!(session.on_touch(None, 0.0), Err(SessionError::NotStarted));
        assert_eq!(session.state().spawned_count(), 0);
    }

    #[test]
    fn test_spawn_tick_registers_anchor() {
        let mut session = running(1);
        let commands = session.on_spawn_tick().unwrap();

        assert_eq!(commands.len(), 2);
        match &commands[0] {
            SessionCommand::RegisterAnchor {
                target: Some(id),
                transform,
            } => {
                assert_eq!(*id, TargetId(1));
                assert!((transform.translation().length() - AUTO_SPAWN_DISTANCE).abs() < 1e-5);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(
            commands[1],
            SessionCommand::UpdateRemainingDisplay { remaining: 1 }
        );
        assert_eq!(session.state().spawned_count(), 1);
        assert_eq!(session.state().remaining_count(), 1);
    }

    #[test]
    fn test_spawn_stops_at_quota() {
        let mut session = running(1);
        spawn_all(&mut session);
        assert_eq!(session.state().spawned_count(), MAX_TARGETS);

        for _ in 0..3 {
            let commands = session.on_spawn_tick().unwrap();
            assert_eq!(commands, vec![SessionCommand::CancelSpawnTimer]);
        }
        assert_eq!(session.state().spawned_count(), MAX_TARGETS);
        assert_eq!(session.state().remaining_count(), MAX_TARGETS);
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_full_session_completes_once() {
        let mut session = Session::new(7);
        session.on_scene_start(10.0).unwrap();
        spawn_all(&mut session);

        let mut completions = Vec::new();
        for i in 0..MAX_TARGETS {
            let commands = session.on_target_destroyed(11.0 + i as f64).unwrap();
            for command in commands {
                if let SessionCommand::SessionComplete { elapsed_secs } = command {
                    completions.push(elapsed_secs);
                }
            }
        }

        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(session.state().remaining_count(), 0);
        assert_eq!(completions.len(), 1);
        assert!((completions[0] - 20.0).abs() < 1e-9);
        assert!(completions[0] >= 0.0);
    }

    #[test]
    fn test_destroy_with_none_remaining_rejected() {
        let mut session = running(1);
        session.on_spawn_tick().unwrap();
        session.on_target_destroyed(1.0).unwrap();

        let before = session.state().clone();
        assert_eq!(
            session.on_target_destroyed(2.0),
            Err(SessionError::NoTargetsRemaining)
        );
        assert_eq!(session.state().spawned_count(), before.spawned_count());
        assert_eq!(session.state().remaining_count(), 0);
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_clearing_early_does_not_complete() {
        let mut session = running(1);
        for _ in 0..5 {
            session.on_spawn_tick().unwrap();
        }
        for _ in 0..5 {
            let commands = session.on_target_destroyed(1.0).unwrap();
            assert_eq!(count_completions(&commands), 0);
        }
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_tick_after_complete_is_noop() {
        let mut session = running(3);
        spawn_all(&mut session);
        for _ in 0..MAX_TARGETS {
            session.on_target_destroyed(1.0).unwrap();
        }
        assert_eq!(session.phase(), SessionPhase::Complete);

        let commands = session.on_spawn_tick().unwrap();
        assert_eq!(commands, vec![SessionCommand::CancelSpawnTimer]);
        assert_eq!(session.state().spawned_count(), MAX_TARGETS);
    }

    #[test]
    fn test_events_after_complete_rejected() {
        let mut session = running(3);
        let ids = spawn_all(&mut session);
        for id in &ids {
            session.on_touch(Some(*id), 4.0).unwrap();
        }
        assert_eq!(session.phase(), SessionPhase::Complete);

        assert_eq!(
            session.on_target_destroyed(5.0),
            Err(SessionError::SessionComplete)
        );
        assert_eq!(
            session.on_touch(Some(ids[0]), 5.0),
            Err(SessionError::SessionComplete)
        );
        assert_eq!(
            session.on_place_tap(Mat4::IDENTITY),
            Err(SessionError::SessionComplete)
        );
        assert_eq!(session.on_scene_start(5.0), Err(SessionError::SessionComplete));
    }

    #[test]
    fn test_touch_hit_removes_visual() {
        let mut session = running(1);
        session.on_spawn_tick().unwrap();
        session.on_spawn_tick().unwrap();

        let commands = session.on_touch(Some(TargetId(2)), 1.0).unwrap();
        assert_eq!(
            commands,
            vec![
                SessionCommand::RemoveTargetVisual {
                    target: TargetId(2),
                    fade_secs: HIT_FADE_SECS,
                    scale_to: HIT_SCALE_TO,
                },
                SessionCommand::UpdateRemainingDisplay { remaining: 1 },
            ]
        );
        assert_eq!(session.state().live_targets(), &[TargetId(1)]);
    }

    #[test]
    fn test_touch_miss_is_noop() {
        let mut session = running(1);
        session.on_spawn_tick().unwrap();
        assert!(session.on_touch(None, 1.0).unwrap().is_empty());
        assert_eq!(session.state().remaining_count(), 1);
    }

    #[test]
    fn test_touch_unknown_target_rejected() {
        let mut session = running(1);
        session.on_spawn_tick().unwrap();
        session.on_touch(Some(TargetId(1)), 1.0).unwrap();

        let err = session.on_touch(Some(TargetId(1)), 1.0).unwrap_err();
        assert_eq!(err, SessionError::UnknownTarget(TargetId(1)));
        assert_eq!(
            session.on_touch(Some(TargetId(99)), 1.0),
            Err(SessionError::UnknownTarget(TargetId(99)))
        );
        assert_eq!(session.state().remaining_count(), 0);
    }

    #[test]
    fn test_destroy_without_id_retires_oldest() {
        let mut session = running(1);
        for _ in 0..3 {
            session.on_spawn_tick().unwrap();
        }
        session.on_target_destroyed(1.0).unwrap();
        assert_eq!(session.state().live_targets(), &[TargetId(2), TargetId(3)]);
    }

    #[test]
    fn test_place_tap_does_not_count() {
        let mut session = running(1);
        let commands = session.on_place_tap(Mat4::IDENTITY).unwrap();
        match &commands[..] {
            [SessionCommand::RegisterAnchor {
                target: None,
                transform,
            }] => {
                assert!(
                    transform
                        .translation()
                        .abs_diff_eq(Vec3::new(0.0, 0.0, -TAP_SPAWN_DISTANCE), 1e-6)
                );
            }
            other => panic!("unexpected commands {:?}", other),
        }
        assert_eq!(session.state().spawned_count(), 0);
        assert_eq!(session.state().remaining_count(), 0);
    }

    #[test]
    fn test_player_frame_moves_spawns() {
        let offset = Vec3::new(2.0, 0.0, -1.0);
        let mut session = running(5);
        session.set_player_frame(Mat4::from_translation(offset));
        let commands = session.on_spawn_tick().unwrap();
        let SessionCommand::RegisterAnchor { transform, .. } = &commands[0] else {
            panic!("expected anchor registration");
        };
        let radius = (transform.translation() - offset).length();
        assert!((radius - AUTO_SPAWN_DISTANCE).abs() < 1e-5);
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = running(12345);
        let mut b = running(12345);
        for _ in 0..MAX_TARGETS {
            assert_eq!(a.on_spawn_tick().unwrap(), b.on_spawn_tick().unwrap());
        }
    }

    #[test]
    fn test_clock_skew_clamps_elapsed() {
        let mut session = Session::new(1);
        session.on_scene_start(100.0).unwrap();
        assert_eq!(session.elapsed(50.0), Some(0.0));
    }

    #[test]
    fn test_command_json_shape() {
        let json = serde_json::to_value(SessionCommand::UpdateRemainingDisplay { remaining: 3 })
            .unwrap();
        assert_eq!(json["command"], "update_remaining_display");
        assert_eq!(json["remaining"], 3);
    }

    proptest! {
        #[test]
        fn prop_counters_hold_invariants(events in proptest::collection::vec(any::<bool>(), 0..80)) {
            let mut session = running(9);
            let mut completions = 0;
            for (i, spawn) in events.into_iter().enumerate() {
                let before = session.state().spawned_count();
                let result = if spawn {
                    session.on_spawn_tick()
                } else {
                    session.on_target_destroyed(i as f64)
                };
                if let Ok(commands) = &result {
                    completions += count_completions(commands);
                }

                let state = session.state();
                if spawn && before < MAX_TARGETS {
                    prop_assert_eq!(state.spawned_count(), before + 1);
                } else {
                    prop_assert_eq!(state.spawned_count(), before);
                }
                prop_assert!(state.remaining_count() <= state.spawned_count());
                prop_assert!(state.spawned_count() <= MAX_TARGETS);
                prop_assert_eq!(state.live_targets().len() as u32, state.remaining_count());
                prop_assert_eq!(
                    session.phase() == SessionPhase::Complete,
                    state.spawned_count() == MAX_TARGETS && state.remaining_count() == 0
                );
            }
            prop_assert!(completions <= 1);
        }
    }
}
