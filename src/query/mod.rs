pub mod flags;
pub mod proximity;
pub mod reachability;

pub use flags::branches_containing;
pub use proximity::{nearest_tag, resolve_tag_tips, Direction};
pub use reachability::is_ancestor;

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{CommitId, RefEntry};
use crate::error::Result;
use crate::source::CommitGraphSource;
use crate::walk::CancelToken;

/// One commit source plus one cancellation token, bundled for callers that
/// run several queries per inspection (the usual shape: branches containing
/// a commit, then the tag before and after it).
pub struct HistoryQuery<'a, S> {
    source: &'a S,
    cancel: CancelToken,
}

impl<'a, S: CommitGraphSource> HistoryQuery<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            cancel: CancelToken::new(),
        }
    }

    /// Use an externally held token so the caller can abort from another
    /// thread.
    pub fn with_cancel(source: &'a S, cancel: CancelToken) -> Self {
        Self { source, cancel }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_ancestor(&self, candidate: &CommitId, of: &CommitId) -> Result<bool> {
        is_ancestor(self.source, candidate, of, &self.cancel)
    }

    pub fn branches_containing(
        &self,
        target: &CommitId,
        branch_tips: &BTreeMap<String, CommitId>,
    ) -> Result<BTreeSet<String>> {
        branches_containing(self.source, target, branch_tips, &self.cancel)
    }

    pub fn nearest_tag(
        &self,
        target: &CommitId,
        direction: Direction,
        tag_tips: &BTreeMap<String, CommitId>,
    ) -> Result<Option<String>> {
        nearest_tag(self.source, target, direction, tag_tips, &self.cancel)
    }

    /// `nearest_tag` over raw ref entries: peels tags, drops non-commit
    /// targets and tags on the target itself, then resolves.
    pub fn nearest_tag_from_refs(
        &self,
        target: &CommitId,
        direction: Direction,
        entries: &[RefEntry],
    ) -> Result<Option<String>> {
        let tips = resolve_tag_tips(self.source, target, entries)?;
        nearest_tag(self.source, target, direction, &tips, &self.cancel)
    }
}
