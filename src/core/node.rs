use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Parent lists are inline up to two entries; only octopus merges spill.
pub type ParentIds = SmallVec<[CommitId; 2]>;

/// Opaque commit identifier (hex object id). Equality is by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for CommitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A commit node in the history DAG.
///
/// Immutable once created. Edges point from child to parent (toward the
/// past); the timestamp is a traversal-ordering heuristic only, never a
/// source of truth about ancestry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitNode {
    /// Unique commit ID (SHA)
    pub id: CommitId,
    /// Parent commit IDs, in commit order
    pub parents: ParentIds,
    /// Committer timestamp, seconds since epoch
    pub timestamp: i64,
}

impl CommitNode {
    pub fn new(id: CommitId, parents: ParentIds, timestamp: i64) -> Self {
        Self {
            id,
            parents,
            timestamp,
        }
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
