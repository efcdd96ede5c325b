//! Sources used only by tests, mainly to exercise cancellation mid-walk.

use std::cell::Cell;

use crate::core::{CommitId, ParentIds, Peeled, RefEntry};
use crate::error::Result;
use crate::walk::CancelToken;

use super::CommitGraphSource;

/// Wraps a source and trips the cancellation token after a fixed number of
/// `parents_of` expansions, simulating a caller aborting mid-traversal.
pub(crate) struct CancelAfter<'a, S> {
    inner: &'a S,
    token: CancelToken,
    remaining: Cell<u32>,
}

impl<'a, S> CancelAfter<'a, S> {
    pub(crate) fn new(inner: &'a S, token: CancelToken, expansions: u32) -> Self {
        Self {
            inner,
            token,
            remaining: Cell::new(expansions),
        }
    }
}

impl<S: CommitGraphSource> CommitGraphSource for CancelAfter<'_, S> {
    fn parents_of(&self, id: &CommitId) -> Result<ParentIds> {
        let left = self.remaining.get();
        if left <= 1 {
            self.token.cancel();
        }
        self.remaining.set(left.saturating_sub(1));
        self.inner.parents_of(id)
    }

    fn timestamp_of(&self, id: &CommitId) -> Result<i64> {
        self.inner.timestamp_of(id)
    }

    fn peel(&self, entry: &RefEntry) -> Result<Peeled> {
        self.inner.peel(entry)
    }
}
