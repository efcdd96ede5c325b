pub mod git_backend;
pub mod memory;

#[cfg(test)]
pub(crate) mod test_support;

use crate::core::{CommitId, ParentIds, Peeled, RefEntry};
use crate::error::Result;

/// Read-only access to the commit store.
///
/// The engine holds only commit ids and expands nodes on demand through
/// this trait; implementations may perform I/O and may fail with
/// `ObjectMissing` / `ObjectCorrupt`. Implementations must be safe for
/// concurrent reads for concurrent queries to be safe.
pub trait CommitGraphSource {
    /// Parent ids of a commit, in commit order. Empty for a root.
    fn parents_of(&self, id: &CommitId) -> Result<ParentIds>;

    /// Committer timestamp in seconds. Used only as an ordering heuristic.
    fn timestamp_of(&self, id: &CommitId) -> Result<i64>;

    /// Resolve a reference down to the commit it denotes, following one
    /// level of tag indirection. Non-commit targets yield `NotACommit`.
    fn peel(&self, entry: &RefEntry) -> Result<Peeled>;
}

pub use git_backend::GitSource;
pub use memory::MemorySource;
