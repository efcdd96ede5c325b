use thiserror::Error;

use crate::core::CommitId;

/// Errors surfaced by graph traversals and queries.
///
/// Storage failures (`ObjectMissing`, `ObjectCorrupt`) propagate unchanged
/// from the commit source and are never retried here. `Cancelled` is always
/// surfaced, never swallowed; a query aborted by cancellation returns no
/// partial result.
#[derive(Debug, Error)]
pub enum Error {
    /// The commit store has no object with this id.
    #[error("object {id} not found in commit store")]
    ObjectMissing { id: CommitId },

    /// The object exists but its commit data could not be decoded.
    #[error("object {id} is corrupt: {reason}")]
    ObjectCorrupt { id: CommitId, reason: String },

    /// The caller signalled cancellation and the operation aborted.
    #[error("operation cancelled")]
    Cancelled,

    /// The graph is not the acyclic structure it must be (e.g. a commit
    /// listing itself as a parent). Fatal; the store is corrupt.
    #[error("commit graph invariant violated: {detail}")]
    InvariantViolation { detail: String },

    /// Underlying libgit2 failure from the git-backed source.
    #[error(transparent)]
    Git(#[from] git2::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
