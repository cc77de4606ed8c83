//! Deterministic session core
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Timestamps and events come from the host
//! - Seeded RNG only
//! - No rendering, AR or platform dependencies

pub mod error;
pub mod lifecycle;
pub mod placement;
pub mod state;

pub use error::{SessionError, SessionResult};
pub use lifecycle::{Session, SessionCommand};
pub use placement::{
    SpawnTransform, auto_spawn, auto_spawn_from_samples, auto_spawn_in_frame, tap_spawn,
};
pub use state::{RngState, SessionPhase, SessionState, TargetId};
