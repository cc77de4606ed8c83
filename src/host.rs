//! Host seam
//!
//! The AR/rendering framework implements [`Collaborator`] to carry out
//! session commands and [`HitResolver`] to turn a touch location into a
//! target. It also owns the [`SpawnTimer`] and feeds its ticks back into
//! the session.

use glam::Vec2;

use crate::sim::{SessionCommand, SpawnTransform, TargetId};

/// Upper bound on ticks released by one `advance` (prevents catch-up bursts
/// after the app was suspended)
pub const MAX_CATCHUP_TICKS: u32 = 4;

/// Outbound capabilities the session relies on
pub trait Collaborator {
    /// Add an anchor to the AR session. A host without a live view should
    /// treat this as a no-op.
    fn register_anchor(&mut self, target: Option<TargetId>, transform: &SpawnTransform);
    fn cancel_spawn_timer(&mut self);
    fn update_remaining_display(&mut self, remaining: u32);
    fn remove_target_visual(&mut self, target: TargetId, fade_secs: f32, scale_to: f32);
    fn session_complete(&mut self, elapsed_secs: f64);
}

/// Hit testing in view coordinates
pub trait HitResolver {
    fn resolve_hit(&self, location: Vec2) -> Option<TargetId>;
}

/// Route commands to the host, in order
pub fn dispatch<C, I>(commands: I, host: &mut C)
where
    C: Collaborator + ?Sized,
    I: IntoIterator<Item = SessionCommand>,
{
    for command in commands {
        match command {
            SessionCommand::RegisterAnchor { target, transform } => {
                host.register_anchor(target, &transform)
            }
            SessionCommand::CancelSpawnTimer => host.cancel_spawn_timer(),
            SessionCommand::UpdateRemainingDisplay { remaining } => {
                host.update_remaining_display(remaining)
            }
            SessionCommand::RemoveTargetVisual {
                target,
                fade_secs,
                scale_to,
            } => host.remove_target_visual(target, fade_secs, scale_to),
            SessionCommand::SessionComplete { elapsed_secs } => host.session_complete(elapsed_secs),
        }
    }
}

/// Fixed-interval repeating timer driven by frame deltas
///
/// Once cancelled it never fires again.
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    interval: f64,
    accumulator: f64,
    active: bool,
}

impl SpawnTimer {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval: interval_secs,
            accumulator: 0.0,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance by `dt` seconds and return how many ticks are due
    pub fn advance(&mut self, dt: f64) -> u32 {
        // A non-finite delta would poison the accumulator for good
        if !self.active || self.interval <= 0.0 || !dt.is_finite() {
            return 0;
        }
        self.accumulator += dt.max(0.0);

        let mut due = 0;
        while self.accumulator >= self.interval && due < MAX_CATCHUP_TICKS {
            self.accumulator -= self.interval;
            due += 1;
        }
        // Drop whole intervals that could not be released this frame
        if due == MAX_CATCHUP_TICKS {
            self.accumulator %= self.interval;
        }
        due
    }

    /// Stop the timer; repeated calls are harmless
    pub fn cancel(&mut self) {
        if self.active {
            log::debug!("Spawn timer cancelled");
        }
        self.active = false;
        self.accumulator = 0.0;
    }
}
