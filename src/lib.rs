//! AR Target Range - an augmented-reality shooting gallery core
//!
//! Core modules:
//! - `sim`: Deterministic session logic (anchor placement, target counters)
//! - `host`: Seam to the AR/rendering framework (commands, spawn timer)
//! - `hud`: Label text shown by the host
//! - `web`: Browser bindings (wasm32 only)

pub mod host;
pub mod hud;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use host::{Collaborator, SpawnTimer, dispatch};
pub use sim::{Session, SessionCommand, SessionError, SessionPhase, SpawnTransform, TargetId};

/// Game configuration constants
pub mod consts {
    /// Targets spawned per session
    pub const MAX_TARGETS: u32 = 20;
    /// Seconds between automatic spawns
    pub const SPAWN_INTERVAL_SECS: f64 = 2.0;

    /// Distance (meters) of automatically spawned targets from the player
    pub const AUTO_SPAWN_DISTANCE: f32 = 1.5;
    /// Distance (meters) in front of the camera for tap-placed anchors
    pub const TAP_SPAWN_DISTANCE: f32 = 0.2;

    /// HUD label styling
    pub const HUD_FONT_NAME: &str = "AmericanTypewriter";
    pub const HUD_FONT_SIZE: f32 = 36.0;
    /// Offset of HUD labels from the top/bottom edge of the view
    pub const HUD_EDGE_MARGIN: f32 = 50.0;

    /// Hit animation: scale-out and fade run together for this long
    pub const HIT_FADE_SECS: f32 = 0.2;
    pub const HIT_SCALE_TO: f32 = 2.0;
}
