use std::collections::{HashMap, HashSet};

use crate::core::{CommitId, CommitNode, ParentIds, Peeled, RefEntry, RefKind};
use crate::error::{Error, Result};

use super::CommitGraphSource;

/// In-memory commit store.
///
/// Holds fully materialized nodes; the seam the engine treats as external
/// storage. Used as the test substrate and for callers that already have
/// the graph in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    nodes: HashMap<CommitId, CommitNode>,
    /// Non-commit objects (trees, blobs, tag blobs) known to the store,
    /// so `peel` can distinguish "not a commit" from "missing".
    non_commits: HashSet<CommitId>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit. Parents are given as raw id strings for test brevity.
    pub fn insert(&mut self, id: &str, parents: &[&str], timestamp: i64) {
        let id = CommitId::from(id);
        let parents: ParentIds = parents.iter().map(|p| CommitId::from(*p)).collect();
        self.nodes
            .insert(id.clone(), CommitNode::new(id, parents, timestamp));
    }

    /// Register a non-commit object id (e.g. a blob a tag points at).
    pub fn insert_non_commit(&mut self, id: &str) {
        self.non_commits.insert(CommitId::from(id));
    }

    pub fn contains(&self, id: &CommitId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: &CommitId) -> Result<&CommitNode> {
        self.nodes.get(id).ok_or_else(|| Error::ObjectMissing {
            id: id.clone(),
        })
    }
}

impl CommitGraphSource for MemorySource {
    fn parents_of(&self, id: &CommitId) -> Result<ParentIds> {
        Ok(self.node(id)?.parents.clone())
    }

    fn timestamp_of(&self, id: &CommitId) -> Result<i64> {
        Ok(self.node(id)?.timestamp)
    }

    fn peel(&self, entry: &RefEntry) -> Result<Peeled> {
        let target = match &entry.kind {
            RefKind::Tag { peeled: Some(id) } => id,
            _ => &entry.target,
        };
        if self.nodes.contains_key(target) {
            Ok(Peeled::Commit(target.clone()))
        } else if self.non_commits.contains(target) {
            Ok(Peeled::NotACommit)
        } else {
            Err(Error::ObjectMissing {
                id: target.clone(),
            })
        }
    }
}
