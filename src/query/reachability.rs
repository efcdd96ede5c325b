use crate::core::CommitId;
use crate::error::Result;
use crate::source::CommitGraphSource;
use crate::walk::{CancelToken, GraphWalker, Visit};

/// True iff `candidate` lies on some parent-chain from `tip`.
///
/// A commit reaches itself, so `is_ancestor(a, a)` is true. One backward
/// walk from `tip`, stopping as soon as `candidate` is seen; O(V+E) worst
/// case with no cross-call memoization. Callers testing one target against
/// many tips should use the flag-propagation query instead.
pub fn is_ancestor<S: CommitGraphSource>(
    source: &S,
    candidate: &CommitId,
    tip: &CommitId,
    cancel: &CancelToken,
) -> Result<bool> {
    if candidate == tip {
        return Ok(true);
    }

    let walker = GraphWalker::new(source, cancel);
    let mut found = false;
    walker.walk(std::slice::from_ref(tip), |id| {
        if id == candidate {
            found = true;
            Visit::Stop
        } else {
            Visit::Continue
        }
    })?;
    Ok(found)
}
