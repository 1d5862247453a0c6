use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong when operating on an election.
///
/// Every failure is terminal for its operation: the core never retries, and
/// a failed call leaves the election unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Caller is not the owner, or tallies were requested before close.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Operation attempted in the wrong phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// Duplicate creation, duplicate start, or duplicate vote.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Unknown election or unknown candidate.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Malformed input, e.g. a non-positive duration.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
