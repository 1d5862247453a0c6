pub use candidate::{Candidate, CandidateId};
pub use election::ElectionCore;
pub use identity::Identity;
pub use timing::{Phase, TimingWindow};

mod candidate;
mod election;
mod identity;
mod timing;
