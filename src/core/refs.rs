use serde::{Deserialize, Serialize};

use super::CommitId;

/// What a named reference is, and how to reach the commit it denotes.
///
/// An annotated tag points at a tag object; `peeled` carries the commit id
/// that object resolves to when the enumerating layer already knows it.
/// Lightweight tags and branches point at their target directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefKind {
    Branch,
    Tag { peeled: Option<CommitId> },
}

/// A named reference: branch or tag, with its target commit id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefEntry {
    pub name: String,
    pub target: CommitId,
    pub kind: RefKind,
}

impl RefEntry {
    pub fn branch(name: impl Into<String>, target: CommitId) -> Self {
        Self {
            name: name.into(),
            target,
            kind: RefKind::Branch,
        }
    }

    pub fn tag(name: impl Into<String>, target: CommitId, peeled: Option<CommitId>) -> Self {
        Self {
            name: name.into(),
            target,
            kind: RefKind::Tag { peeled },
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self.kind, RefKind::Tag { .. })
    }

    pub fn is_branch(&self) -> bool {
        self.kind == RefKind::Branch
    }
}

/// Result of resolving a reference down to the object it ultimately denotes.
///
/// Tags may point at trees or blobs; those are not proximity candidates and
/// are reported as `NotACommit` rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peeled {
    Commit(CommitId),
    NotACommit,
}
