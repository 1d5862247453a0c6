use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::model::{CandidateId, ElectionCore, Identity, Phase};

/// The key under which an election lives in the store.
///
/// Exactly one election ever exists per (owner, name) pair; creation is a
/// one-time act, never idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElectionKey {
    pub owner: Identity,
    pub name: String,
}

impl ElectionKey {
    pub fn new(owner: Identity, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

impl Display for ElectionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Keyed registry of elections, and the operations layer over them.
///
/// Every mutation takes the per-election write lock, so two concurrent
/// votes cannot both pass the duplicate-voter check and candidate ID
/// allocation never races. Queries share the read lock and see a consistent
/// snapshot. Locks are only ever held across in-memory validation, never
/// across I/O.
pub struct ElectionStore<C = SystemClock> {
    elections: RwLock<HashMap<ElectionKey, Arc<RwLock<ElectionCore>>>>,
    clock: C,
}

impl ElectionStore<SystemClock> {
    /// A store driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ElectionStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ElectionStore<C> {
    /// A store reading time from the given clock.
    pub fn with_clock(clock: C) -> Self {
        Self {
            elections: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Create a new election owned by `owner` under `name`.
    ///
    /// The caller becomes the owner. Fails if an election already exists for
    /// this key; a second create is an error, not a no-op.
    pub fn create_election(
        &self,
        owner: Identity,
        name: impl Into<String>,
    ) -> Result<ElectionKey> {
        let key = ElectionKey::new(owner.clone(), name);
        let mut elections = self.elections.write().expect("election registry poisoned");
        match elections.entry(key.clone()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists(format!(
                "Election {key} already exists"
            ))),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(RwLock::new(ElectionCore::new(owner))));
                info!("Created election {key}");
                Ok(key)
            }
        }
    }

    /// Enrol a candidate, returning its newly-assigned ID.
    pub fn add_candidate(
        &self,
        caller: &Identity,
        key: &ElectionKey,
        name: impl Into<String>,
        proposal: impl Into<String>,
    ) -> Result<CandidateId> {
        let now = self.clock.now();
        let election = self.locate(key)?;
        let mut election = election.write().expect("election lock poisoned");
        let id = election.add_candidate(caller, name.into(), proposal.into(), now)?;
        info!("Enrolled candidate {id} in election {key}");
        Ok(id)
    }

    /// Open the voting window for `duration` clock units from now.
    pub fn start_election(
        &self,
        caller: &Identity,
        key: &ElectionKey,
        duration: i64,
    ) -> Result<()> {
        let now = self.clock.now();
        let election = self.locate(key)?;
        let mut election = election.write().expect("election lock poisoned");
        let expiration = election.start(caller, duration, now).map_err(|err| {
            warn!("Refused to start election {key}: {err}");
            err
        })?;
        info!("Election {key} open until {expiration}");
        Ok(())
    }

    /// Cast `caller`'s vote for `candidate_id`.
    pub fn cast_vote(
        &self,
        caller: &Identity,
        key: &ElectionKey,
        candidate_id: CandidateId,
    ) -> Result<()> {
        let now = self.clock.now();
        let election = self.locate(key)?;
        let mut election = election.write().expect("election lock poisoned");
        election.cast_vote(caller, candidate_id, now).map_err(|err| {
            warn!("Rejected vote in election {key}: {err}");
            err
        })?;
        debug!("Vote recorded for candidate {candidate_id} in election {key}");
        Ok(())
    }

    /// A candidate's name and proposal. Available in every phase.
    pub fn check_candidates(
        &self,
        key: &ElectionKey,
        id: CandidateId,
    ) -> Result<(String, String)> {
        let election = self.locate(key)?;
        let election = election.read().expect("election lock poisoned");
        let candidate = election.candidate(id)?;
        Ok((candidate.name.clone(), candidate.proposal.clone()))
    }

    /// A candidate's tally. Hidden until the voting window has closed.
    pub fn check_votes(&self, key: &ElectionKey, id: CandidateId) -> Result<u64> {
        let now = self.clock.now();
        let election = self.locate(key)?;
        let election = election.read().expect("election lock poisoned");
        election.tally(id, now)
    }

    /// The current phase of an election.
    pub fn phase(&self, key: &ElectionKey) -> Result<Phase> {
        let now = self.clock.now();
        let election = self.locate(key)?;
        let election = election.read().expect("election lock poisoned");
        Ok(election.phase(now))
    }

    fn locate(&self, key: &ElectionKey) -> Result<Arc<RwLock<ElectionCore>>> {
        let elections = self.elections.read().expect("election registry poisoned");
        elections
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("No election {key}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Once;
    use std::thread;

    use log::LevelFilter;

    use crate::clock::ManualClock;

    use super::*;

    fn init_logging() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            crate::logging::init_logging(LevelFilter::Debug);
        });
    }

    fn store_at_zero() -> (Arc<ManualClock>, ElectionStore<Arc<ManualClock>>) {
        init_logging();
        let clock = Arc::new(ManualClock::at(0));
        let store = ElectionStore::with_clock(clock.clone());
        (clock, store)
    }

    #[test]
    fn creation_is_not_repeatable_for_the_same_key() {
        let (_clock, store) = store_at_zero();
        let owner = Identity::example();
        store.create_election(owner.clone(), "council").unwrap();
        let err = store
            .create_election(owner.clone(), "council")
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        // A different name or a different owner is a different key.
        store.create_election(owner, "budget").unwrap();
        store
            .create_election(Identity::other_example(), "council")
            .unwrap();
    }

    #[test]
    fn operations_on_an_unknown_election_fail() {
        let (_clock, store) = store_at_zero();
        let owner = Identity::example();
        let key = ElectionKey::new(owner.clone(), "nowhere");
        assert!(matches!(
            store.add_candidate(&owner, &key, "A", "p"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.start_election(&owner, &key, 10),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.cast_vote(&owner, &key, 1),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.check_candidates(&key, 1),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(store.check_votes(&key, 1), Err(Error::NotFound(_))));
    }

    #[test]
    fn full_election_lifecycle() {
        let (clock, store) = store_at_zero();
        let owner = Identity::example();
        let key = store.create_election(owner.clone(), "council").unwrap();

        let a = store
            .add_candidate(&owner, &key, "A", "Apples for all")
            .unwrap();
        let b = store
            .add_candidate(&owner, &key, "B", "Bread for all")
            .unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(store.phase(&key).unwrap(), Phase::NotStarted);

        store.start_election(&owner, &key, 1000).unwrap();
        assert_eq!(store.phase(&key).unwrap(), Phase::Open);

        for (voter, candidate) in [("v1", a), ("v2", a), ("v3", a), ("v4", b)] {
            clock.advance(100);
            store.cast_vote(&Identity::new(voter), &key, candidate).unwrap();
        }

        // Tallies stay hidden while the window is open.
        assert!(matches!(
            store.check_votes(&key, a),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            store.check_votes(&key, b),
            Err(Error::PermissionDenied(_))
        ));

        clock.set(1000);
        assert_eq!(store.phase(&key).unwrap(), Phase::Closed);
        assert_eq!(store.check_votes(&key, a).unwrap(), 3);
        assert_eq!(store.check_votes(&key, b).unwrap(), 1);

        // Enrolment data was never affected by voting.
        let (name, proposal) = store.check_candidates(&key, a).unwrap();
        assert_eq!((name.as_str(), proposal.as_str()), ("A", "Apples for all"));

        // Closed is terminal.
        assert!(matches!(
            store.start_election(&owner, &key, 1000),
            Err(Error::AlreadyExists(_))
        ));
        assert!(matches!(
            store.cast_vote(&Identity::new("v5"), &key, a),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn concurrent_distinct_voters_all_count() {
        let (clock, store) = store_at_zero();
        let store = Arc::new(store);
        let owner = Identity::example();
        let key = store.create_election(owner.clone(), "council").unwrap();
        let id = store.add_candidate(&owner, &key, "A", "p").unwrap();
        store.start_election(&owner, &key, 1000).unwrap();

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = store.clone();
                let key = key.clone();
                thread::spawn(move || {
                    store.cast_vote(&Identity::new(format!("voter{n}")), &key, id)
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        clock.set(1000);
        assert_eq!(store.check_votes(&key, id).unwrap(), 16);
    }

    #[test]
    fn concurrent_duplicate_votes_count_once() {
        let (clock, store) = store_at_zero();
        let store = Arc::new(store);
        let owner = Identity::example();
        let key = store.create_election(owner.clone(), "council").unwrap();
        let id = store.add_candidate(&owner, &key, "A", "p").unwrap();
        store.start_election(&owner, &key, 1000).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let key = key.clone();
                thread::spawn(move || store.cast_vote(&Identity::new("carol"), &key, id))
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        let accepted = results.iter().filter(|result| result.is_ok()).count();
        assert_eq!(accepted, 1);
        for result in results.iter().filter(|result| result.is_err()) {
            assert!(matches!(result, Err(Error::AlreadyExists(_))));
        }

        clock.set(1000);
        assert_eq!(store.check_votes(&key, id).unwrap(), 1);
    }
}
