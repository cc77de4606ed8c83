//! AR Target Range entry point
//!
//! The browser build is driven from JavaScript through `web::TargetRange`.
//! Natively this runs one headless session against a simulated AR host and
//! a simulated player, logging every command.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::collections::BTreeMap;

    use ar_target_range::consts::*;
    use ar_target_range::host::{Collaborator, HitResolver, SpawnTimer, dispatch};
    use ar_target_range::hud;
    use ar_target_range::sim::{Session, SessionError, SpawnTransform, TargetId};
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Simulated frame length (60 Hz)
    const FRAME_DT: f64 = 1.0 / 60.0;
    /// Give up if the player never clears the range
    const TIME_LIMIT_SECS: f64 = 300.0;
    /// Seconds between the player's shots
    const SHOT_INTERVAL_SECS: f64 = 1.5;
    /// Angular slack of the simulated hit test (radians)
    const HIT_TOLERANCE: f32 = 0.15;

    /// Stand-in for the AR view: remembers where each target is on screen
    struct DemoHost {
        timer: SpawnTimer,
        /// Target id -> (azimuth, elevation) as seen from the player
        targets: BTreeMap<TargetId, Vec2>,
        remaining_label: String,
        completed: Option<f64>,
    }

    impl DemoHost {
        fn new() -> Self {
            Self {
                timer: SpawnTimer::new(SPAWN_INTERVAL_SECS),
                targets: BTreeMap::new(),
                remaining_label: hud::remaining_text(0),
                completed: None,
            }
        }
    }

    /// Direction of an anchor as view coordinates
    fn view_direction(transform: &SpawnTransform) -> Vec2 {
        let p = transform.translation();
        let azimuth = p.x.atan2(-p.z);
        let elevation = (p.y / p.length().max(f32::EPSILON)).clamp(-1.0, 1.0).asin();
        Vec2::new(azimuth, elevation)
    }

    impl Collaborator for DemoHost {
        fn register_anchor(&mut self, target: Option<TargetId>, transform: &SpawnTransform) {
            let location = view_direction(transform);
            match target {
                Some(id) => {
                    log::info!("Anchor for {} at {:?}", id, transform.translation());
                    self.targets.insert(id, location);
                }
                None => log::info!("Decorative anchor at {:?}", transform.translation()),
            }
        }

        fn cancel_spawn_timer(&mut self) {
            self.timer.cancel();
        }

        fn update_remaining_display(&mut self, remaining: u32) {
            self.remaining_label = hud::remaining_text(remaining);
            log::info!("{}", self.remaining_label);
        }

        fn remove_target_visual(&mut self, target: TargetId, fade_secs: f32, scale_to: f32) {
            log::info!(
                "Removing {} (scale to {}x, fade {}s)",
                target,
                scale_to,
                fade_secs
            );
            self.targets.remove(&target);
        }

        fn session_complete(&mut self, elapsed_secs: f64) {
            log::info!("{}", hud::time_taken_text(elapsed_secs));
            self.completed = Some(elapsed_secs);
        }
    }

    impl HitResolver for DemoHost {
        fn resolve_hit(&self, location: Vec2) -> Option<TargetId> {
            self.targets
                .iter()
                .map(|(id, pos)| (*id, pos.distance(location)))
                .filter(|(_, d)| *d <= HIT_TOLERANCE)
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(id, _)| id)
        }
    }

    /// Play one session to completion; returns elapsed seconds if cleared
    pub fn run(seed: u64) -> Result<Option<f64>, SessionError> {
        let mut session = Session::new(seed);
        let mut host = DemoHost::new();
        let mut player = Pcg32::seed_from_u64(seed.wrapping_add(1));
        let mut clock = 0.0;
        let mut next_shot = SHOT_INTERVAL_SECS;

        dispatch(session.on_scene_start(clock)?, &mut host);

        while host.completed.is_none() && clock < TIME_LIMIT_SECS {
            clock += FRAME_DT;

            for _ in 0..host.timer.advance(FRAME_DT) {
                dispatch(session.on_spawn_tick()?, &mut host);
            }

            if clock < next_shot {
                continue;
            }
            next_shot = clock + SHOT_INTERVAL_SECS;

            // Aim at the oldest visible target with a little wobble
            let Some(aim) = host.targets.values().next().copied() else {
                continue;
            };
            let jitter = Vec2::new(
                player.random_range(-0.12..0.12),
                player.random_range(-0.12..0.12),
            );
            let hit = host.resolve_hit(aim + jitter);
            if hit.is_none() {
                log::info!("Missed at {:.1}s", clock);
            }
            dispatch(session.on_touch(hit, clock)?, &mut host);
        }

        if host.completed.is_none() {
            log::warn!(
                "Gave up after {:.0}s with {} targets left",
                clock,
                session.state().remaining_count()
            );
        }
        Ok(host.completed)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("AR Target Range (headless) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(12345);
    log::info!("Using seed: {}", seed);

    match headless::run(seed) {
        Ok(Some(elapsed)) => println!("Cleared the range in {:.1} seconds", elapsed),
        Ok(None) => println!("Range not cleared"),
        Err(e) => {
            log::error!("Session aborted: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::init, this is just to satisfy the compiler
}
