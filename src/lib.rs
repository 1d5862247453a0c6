//! Lifecycle core for a single time-boxed election: candidate enrolment,
//! an owner-started voting window, one vote per identity, and tallies that
//! stay hidden until the window closes.
//!
//! The crate is deliberately small. Callers supply an opaque [`Identity`]
//! token (authentication happens upstream) and a [`Clock`] reading;
//! persistence and transport are the host's business. Phase is never stored:
//! it is derived from the expiration instant and the current time on every
//! operation, so there is no transition event to miss and no flag to drift.
//!
//! ```
//! use ballot_box::{ElectionStore, Identity, ManualClock};
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::at(0));
//! let store = ElectionStore::with_clock(clock.clone());
//!
//! let owner = Identity::new("alice");
//! let key = store.create_election(owner.clone(), "council").unwrap();
//! let id = store.add_candidate(&owner, &key, "Morgan", "Shorter queues").unwrap();
//! store.start_election(&owner, &key, 1000).unwrap();
//!
//! store.cast_vote(&Identity::new("bob"), &key, id).unwrap();
//!
//! clock.set(1000); // The window has now expired.
//! assert_eq!(store.check_votes(&key, id).unwrap(), 1);
//! ```

pub use crate::clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use crate::error::{Error, Result};
pub use crate::model::{Candidate, CandidateId, ElectionCore, Identity, Phase};
pub use crate::store::{ElectionKey, ElectionStore};

pub mod clock;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;
