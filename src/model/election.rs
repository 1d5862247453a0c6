use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::error::{Error, Result};

use super::candidate::{Candidate, CandidateId};
use super::identity::Identity;
use super::timing::{Phase, TimingWindow, UNSET};

/// Core election data, as stored in the election record.
///
/// Every lifecycle invariant is enforced here; the store above only provides
/// keyed lookup and locking. All mutating methods validate every
/// precondition before touching any field, so a failed call leaves the
/// election exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCore {
    /// The identity allowed to enrol candidates and start the election.
    owner: Identity,
    /// Enrolled candidates by ID, in ID order.
    candidates: BTreeMap<CandidateId, Candidate>,
    /// The next candidate ID to assign; starts at 1, IDs are never reused.
    next_id: CandidateId,
    /// Identities that have successfully voted.
    voters: HashSet<Identity>,
    /// The voting window.
    timing: TimingWindow,
}

impl ElectionCore {
    /// Create a new election owned by `owner`, with no candidates and an
    /// unopened voting window.
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            candidates: BTreeMap::new(),
            next_id: 1,
            voters: HashSet::new(),
            timing: TimingWindow::default(),
        }
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// The phase at time `now`, derived from the voting window.
    pub fn phase(&self, now: Timestamp) -> Phase {
        self.timing.phase(now)
    }

    /// The enrolled candidates, in ID order.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.values()
    }

    /// Whether `identity` has already cast a vote.
    pub fn has_voted(&self, identity: &Identity) -> bool {
        self.voters.contains(identity)
    }

    /// Enrol a candidate, returning its newly-assigned ID.
    ///
    /// Owner-only, and only while the election has not started.
    pub fn add_candidate(
        &mut self,
        caller: &Identity,
        name: String,
        proposal: String,
        now: Timestamp,
    ) -> Result<CandidateId> {
        self.check_owner(caller)?;
        let phase = self.phase(now);
        if phase != Phase::NotStarted {
            return Err(Error::InvalidState(format!(
                "Cannot add candidates while the election is {phase}"
            )));
        }
        let id = self.next_id;
        self.candidates.insert(id, Candidate::new(id, name, proposal));
        self.next_id += 1;
        Ok(id)
    }

    /// Open the voting window for `duration` clock units from `now`.
    ///
    /// Owner-only, one-shot. Returns the expiration instant. The
    /// already-started check comes before everything else, so a closed
    /// election can never be restarted. A duration that overflows the clock,
    /// or an expiration landing on the unset-window sentinel, is rejected as
    /// an invalid argument.
    pub fn start(
        &mut self,
        caller: &Identity,
        duration: i64,
        now: Timestamp,
    ) -> Result<Timestamp> {
        self.check_owner(caller)?;
        if self.timing.started() {
            return Err(Error::AlreadyExists(
                "The election has already been started".to_string(),
            ));
        }
        if duration <= 0 {
            return Err(Error::InvalidArgument(format!(
                "Duration must be positive, got {duration}"
            )));
        }
        let expiration = now.checked_add(duration).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "Duration {duration} overflows the clock from {now}"
            ))
        })?;
        if expiration == UNSET {
            return Err(Error::InvalidArgument(format!(
                "Expiration {expiration} is reserved to mean an unopened window"
            )));
        }
        self.timing.open_until(expiration);
        Ok(expiration)
    }

    /// Cast `caller`'s vote for `candidate_id`.
    ///
    /// The check order (duplicate voter, then unknown candidate, then phase)
    /// decides which error a caller sees when several preconditions fail at
    /// once, and is part of the API contract. The voter record and the vote
    /// count are committed together or not at all.
    pub fn cast_vote(
        &mut self,
        caller: &Identity,
        candidate_id: CandidateId,
        now: Timestamp,
    ) -> Result<()> {
        if self.voters.contains(caller) {
            return Err(Error::AlreadyExists(format!("{caller} has already voted")));
        }
        let phase = self.phase(now);
        let candidate = self
            .candidates
            .get_mut(&candidate_id)
            .ok_or_else(|| Error::NotFound(format!("No candidate with ID {candidate_id}")))?;
        if phase != Phase::Open {
            return Err(Error::InvalidState(format!(
                "Cannot vote while the election is {phase}"
            )));
        }
        self.voters.insert(caller.clone());
        candidate.vote_count += 1;
        Ok(())
    }

    /// Look up a candidate. Available in every phase.
    pub fn candidate(&self, id: CandidateId) -> Result<&Candidate> {
        self.candidates
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("No candidate with ID {id}")))
    }

    /// A candidate's tally. Hidden until the voting window has closed.
    pub fn tally(&self, id: CandidateId, now: Timestamp) -> Result<u64> {
        let phase = self.phase(now);
        if phase != Phase::Closed {
            return Err(Error::PermissionDenied(format!(
                "Tallies are hidden while the election is {phase}"
            )));
        }
        Ok(self.candidate(id)?.vote_count)
    }

    fn check_owner(&self, caller: &Identity) -> Result<()> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(Error::PermissionDenied(format!(
                "{caller} is not the election owner"
            )))
        }
    }
}
