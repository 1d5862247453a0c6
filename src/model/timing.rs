use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// Sentinel expiration meaning the voting window has never been opened.
pub const UNSET: Timestamp = 0;

/// The voting window of an election.
///
/// Only the expiration instant is stored; the phase is derived from it and
/// the current time on every access. Nothing here is mutated by the passage
/// of time, so the phase cannot drift out of sync with the window.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingWindow {
    /// Instant the window closes; [`UNSET`] until the election starts.
    expiration: Timestamp,
}

impl TimingWindow {
    /// The phase at time `now`.
    ///
    /// Pure: two calls with different readings may observe different phases
    /// without any transition event having fired.
    pub fn phase(&self, now: Timestamp) -> Phase {
        if self.expiration == UNSET {
            Phase::NotStarted
        } else if now < self.expiration {
            Phase::Open
        } else {
            Phase::Closed
        }
    }

    /// Whether the window has ever been opened, regardless of `now`.
    pub fn started(&self) -> bool {
        self.expiration != UNSET
    }

    /// The instant the window closes, or [`UNSET`].
    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }

    /// Open the window until `expiration`. Must be called at most once.
    pub(crate) fn open_until(&mut self, expiration: Timestamp) {
        debug_assert!(!self.started());
        self.expiration = expiration;
    }
}

/// Phases of the election lifecycle. Always derived, never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Created; the voting window has not been opened.
    NotStarted,
    /// The voting window is open.
    Open,
    /// The voting window has expired. Terminal.
    Closed,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not started"),
            Phase::Open => write!(f, "open"),
            Phase::Closed => write!(f, "closed"),
        }
    }
}
