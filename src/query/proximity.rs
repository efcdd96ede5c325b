use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{CommitId, Peeled, RefEntry};
use crate::error::Result;
use crate::source::CommitGraphSource;
use crate::walk::CancelToken;

use super::reachability::is_ancestor;

/// Which side of the target to search for a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Search ancestors: the newest tag the target builds on.
    Preceding,
    /// Search descendants: the oldest tag that contains the target.
    Following,
}

/// Closest tagged commit strictly before or after `target` along ancestry
/// edges.
///
/// Candidates are scanned in label order (a deterministic tie-break);
/// a candidate displaces the incumbent only when ancestry strictly orders
/// it closer to the target. Among equally extreme candidates on diverged
/// history the first qualifying label wins. O(candidates) pairwise ancestry
/// tests; tag sets are small next to history size, so this stays cheap
/// relative to the walks themselves.
pub fn nearest_tag<S: CommitGraphSource>(
    source: &S,
    target: &CommitId,
    direction: Direction,
    tag_tips: &BTreeMap<String, CommitId>,
    cancel: &CancelToken,
) -> Result<Option<String>> {
    let mut best: Option<(&String, &CommitId)> = None;

    for (label, tip) in tag_tips {
        cancel.check()?;
        // A tag on the target itself is neither before nor after it.
        if tip == target {
            continue;
        }

        let qualifies = match direction {
            Direction::Preceding => is_ancestor(source, tip, target, cancel)?,
            Direction::Following => is_ancestor(source, target, tip, cancel)?,
        };
        if !qualifies {
            continue;
        }

        match best {
            None => best = Some((label, tip)),
            Some((_, incumbent)) => {
                if incumbent == tip {
                    // Same commit under two names; keep the first label.
                    continue;
                }
                let closer = match direction {
                    // The incumbent being an ancestor of the candidate
                    // means the candidate sits between it and the target.
                    Direction::Preceding => is_ancestor(source, incumbent, tip, cancel)?,
                    Direction::Following => is_ancestor(source, tip, incumbent, cancel)?,
                };
                if closer {
                    best = Some((label, tip));
                }
            }
        }
    }

    Ok(best.map(|(label, _)| label.clone()))
}

/// Peel raw tag refs into proximity candidates for `target`.
///
/// Tags resolving to non-commit objects are skipped with a debug log, as
/// are tags denoting the target itself. Branch entries are ignored.
pub fn resolve_tag_tips<S: CommitGraphSource>(
    source: &S,
    target: &CommitId,
    entries: &[RefEntry],
) -> Result<BTreeMap<String, CommitId>> {
    let mut tips = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_tag()) {
        match source.peel(entry)? {
            Peeled::Commit(id) => {
                if &id != target {
                    tips.insert(entry.name.clone(), id);
                }
            }
            Peeled::NotACommit => {
                debug!(tag = %entry.name, "skipping tag that does not point at a commit");
            }
        }
    }
    Ok(tips)
}
