//! Rejected session events
//!
//! Every variant is an invalid-state error: an event arrived that the
//! current session state cannot accept. These point at bugs in the host's
//! event wiring, so they are reported rather than clamped away.

use super::state::TargetId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session has not started")]
    NotStarted,

    #[error("Session already started")]
    AlreadyStarted,

    #[error("Session is complete")]
    SessionComplete,

    #[error("No targets remaining to destroy")]
    NoTargetsRemaining,

    #[error("Unknown target: {0}")]
    UnknownTarget(TargetId),
}

pub type SessionResult<T> = Result<T, SessionError>;
