use std::collections::{HashSet, VecDeque};

use crate::core::CommitId;
use crate::error::{Error, Result};
use crate::source::CommitGraphSource;

use super::CancelToken;

/// Verdict returned by a walk callback for each newly reached commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Stop,
}

/// Frontier-based backward traversal over parent edges.
///
/// Each commit is visited at most once per walk even when reachable over
/// several paths (diamond merges). Frontier order is unspecified; callers
/// must not depend on it. All state is local to one `walk` call, so one
/// walker can run many walks and walkers on different threads never share
/// anything beyond the read-only source.
pub struct GraphWalker<'a, S> {
    source: &'a S,
    cancel: &'a CancelToken,
}

impl<'a, S: CommitGraphSource> GraphWalker<'a, S> {
    pub fn new(source: &'a S, cancel: &'a CancelToken) -> Self {
        Self { source, cancel }
    }

    /// Walk backward from `starts`, invoking `visit` for each commit the
    /// first time it is reached. `Visit::Stop` ends the walk immediately;
    /// otherwise the walk ends when the frontier is exhausted.
    ///
    /// The cancellation token is checked before every expansion; a
    /// signalled token aborts with `Error::Cancelled`.
    pub fn walk<F>(&self, starts: &[CommitId], mut visit: F) -> Result<()>
    where
        F: FnMut(&CommitId) -> Visit,
    {
        let mut visited: HashSet<CommitId> = HashSet::new();
        let mut frontier: VecDeque<CommitId> = VecDeque::new();

        for start in starts {
            if visited.insert(start.clone()) {
                frontier.push_back(start.clone());
            }
        }

        while let Some(id) = frontier.pop_front() {
            self.cancel.check()?;

            if visit(&id) == Visit::Stop {
                return Ok(());
            }

            for parent in self.source.parents_of(&id)? {
                if parent == id {
                    return Err(Error::InvariantViolation {
                        detail: format!("commit {id} is its own parent"),
                    });
                }
                if visited.insert(parent.clone()) {
                    frontier.push_back(parent);
                }
            }
        }

        Ok(())
    }
}
