use serde::{Deserialize, Serialize};

/// Candidate unique ID within one election.
/// Assigned sequentially from 1; never reused.
pub type CandidateId = u32;

/// A contestant in an election, as stored in the election record.
///
/// Immutable after enrolment except for `vote_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate unique ID.
    pub id: CandidateId,
    /// Candidate name.
    pub name: String,
    /// The candidate's proposal text.
    pub proposal: String,
    /// Number of votes successfully cast for this candidate.
    pub vote_count: u64,
}

impl Candidate {
    /// Create a new candidate with no votes.
    pub fn new(id: CandidateId, name: String, proposal: String) -> Self {
        Self {
            id,
            name,
            proposal,
            vote_count: 0,
        }
    }
}
