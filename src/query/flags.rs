use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet};

use tracing::debug;

use crate::core::CommitId;
use crate::error::{Error, Result};
use crate::source::CommitGraphSource;
use crate::walk::CancelToken;

/// Bits available per propagation batch. Larger tip sets are processed in
/// successive batches and the results unioned.
const BATCH_WIDTH: usize = 64;

/// Labels of all branch tips that descend from `target`, i.e. every branch
/// whose history contains it.
///
/// One combined traversal per batch of up to 64 tips instead of one walk
/// per tip: each tip gets a bit, bitsets merge as the frontier moves toward
/// the past, and the bits that reach `target` identify the containing
/// branches. Total work is bounded by distinct (commit, new-flag)
/// expansions, which is small when tips share long common histories.
///
/// The frontier is ordered by commit timestamp, most recent first. That is
/// a heuristic stand-in for topological order; with badly skewed clocks the
/// early-out below `target`'s timestamp can cut a path short. Accepted
/// trade-off, since the alternative is a per-tip walk per branch.
pub fn branches_containing<S: CommitGraphSource>(
    source: &S,
    target: &CommitId,
    branch_tips: &BTreeMap<String, CommitId>,
    cancel: &CancelToken,
) -> Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    if branch_tips.is_empty() {
        return Ok(out);
    }

    let tips: Vec<(&String, &CommitId)> = branch_tips.iter().collect();
    if tips.len() > BATCH_WIDTH {
        debug!(
            tips = tips.len(),
            batches = tips.len().div_ceil(BATCH_WIDTH),
            "splitting containment query into flag batches"
        );
    }

    for chunk in tips.chunks(BATCH_WIDTH) {
        let hits = propagate_batch(source, target, chunk, cancel)?;
        for (bit, (label, _)) in chunk.iter().enumerate() {
            if hits & (1u64 << bit) != 0 {
                out.insert((*label).clone());
            }
        }
    }
    Ok(out)
}

/// Heap entry: most recent timestamp first, insertion order breaking ties
/// so repeated runs dequeue identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    ts: i64,
    seq: u64,
    idx: u32,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ts
            .cmp(&other.ts)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-query arena mapping commit ids to dense indices, with timestamps
/// memoized on first sight so hot loops index vectors instead of hashing.
#[derive(Default)]
struct Arena {
    index: HashMap<CommitId, u32>,
    ids: Vec<CommitId>,
    timestamps: Vec<i64>,
}

impl Arena {
    fn intern<S: CommitGraphSource>(&mut self, source: &S, id: &CommitId) -> Result<u32> {
        if let Some(&i) = self.index.get(id) {
            return Ok(i);
        }
        let ts = source.timestamp_of(id)?;
        let i = self.ids.len() as u32;
        self.index.insert(id.clone(), i);
        self.ids.push(id.clone());
        self.timestamps.push(ts);
        Ok(i)
    }
}

fn bits_at(v: &[u64], idx: u32) -> u64 {
    v.get(idx as usize).copied().unwrap_or(0)
}

fn or_into(v: &mut Vec<u64>, idx: u32, bits: u64) {
    let idx = idx as usize;
    if v.len() <= idx {
        v.resize(idx + 1, 0);
    }
    v[idx] |= bits;
}

/// One batch of up to 64 tips; returns the bitset of chunk positions whose
/// tip descends from `target`.
fn propagate_batch<S: CommitGraphSource>(
    source: &S,
    target: &CommitId,
    chunk: &[(&String, &CommitId)],
    cancel: &CancelToken,
) -> Result<u64> {
    debug_assert!(chunk.len() <= BATCH_WIDTH);

    let mut arena = Arena::default();
    let target_idx = arena.intern(source, target)?;
    let target_ts = arena.timestamps[target_idx as usize];

    // Accumulated flags per commit, and the subset already pushed onward.
    let mut flags: Vec<u64> = Vec::new();
    let mut expanded: Vec<u64> = Vec::new();

    let mut heap: BinaryHeap<QueueEntry> = BinaryHeap::new();
    let mut seq = 0u64;

    // Tips sharing a commit are merged before seeding.
    let mut seeded: HashSet<u32> = HashSet::new();
    for (bit, (_, tip)) in chunk.iter().enumerate() {
        let idx = arena.intern(source, tip)?;
        or_into(&mut flags, idx, 1u64 << bit);
        if seeded.insert(idx) {
            heap.push(QueueEntry {
                ts: arena.timestamps[idx as usize],
                seq,
                idx,
            });
            seq += 1;
        }
    }

    let mut result = 0u64;
    let mut target_seen = false;

    while let Some(top) = heap.peek().copied() {
        // Once the target has been dequeued and every queued entry is
        // strictly older, nothing left can carry a new flag to it: older
        // commits can only be further ancestors of the target.
        if target_seen && top.ts < target_ts {
            break;
        }
        cancel.check()?;

        let entry = match heap.pop() {
            Some(e) => e,
            None => break,
        };

        let have = bits_at(&flags, entry.idx);
        let new_bits = have & !bits_at(&expanded, entry.idx);
        if new_bits == 0 {
            // Stale duplicate; a richer entry for this commit already ran.
            continue;
        }
        or_into(&mut expanded, entry.idx, new_bits);

        if entry.idx == target_idx {
            // Flags that reached the target mark containing branches. Its
            // own parents are plain ancestors, irrelevant to containment.
            result |= have;
            target_seen = true;
            continue;
        }

        let id = arena.ids[entry.idx as usize].clone();
        for parent in source.parents_of(&id)? {
            if parent == id {
                return Err(Error::InvariantViolation {
                    detail: format!("commit {id} is its own parent"),
                });
            }
            let pidx = arena.intern(source, &parent)?;
            if bits_at(&flags, pidx) | new_bits != bits_at(&flags, pidx) {
                or_into(&mut flags, pidx, new_bits);
                heap.push(QueueEntry {
                    ts: arena.timestamps[pidx as usize],
                    seq,
                    idx: pidx,
                });
                seq += 1;
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::reachability::is_ancestor;
    use crate::source::test_support::CancelAfter;
    use crate::source::MemorySource;

    fn tips(pairs: &[(&str, &str)]) -> BTreeMap<String, CommitId> {
        pairs
            .iter()
            .map(|(l, c)| ((*l).to_owned(), CommitId::from(*c)))
            .collect()
    }

    fn labels(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_stale_branch_does_not_contain() {
        // a <- b <- c; main at c, feature still at a.
        let mut src = MemorySource::new();
        src.insert("a", &[], 100);
        src.insert("b", &["a"], 200);
        src.insert("c", &["b"], 300);
        let cancel = CancelToken::new();

        let got = branches_containing(
            &src,
            &"b".into(),
            &tips(&[("main", "c"), ("feature", "a")]),
            &cancel,
        )
        .unwrap();
        assert_eq!(labels(&got), ["main"]);
    }

    #[test]
    fn test_merge_contains_both_sides() {
        let mut src = MemorySource::new();
        src.insert("x", &[], 100);
        src.insert("y", &[], 110);
        src.insert("m", &["x", "y"], 200);
        let cancel = CancelToken::new();

        let got =
            branches_containing(&src, &"x".into(), &tips(&[("br", "m")]), &cancel).unwrap();
        assert_eq!(labels(&got), ["br"]);
    }

    #[test]
    fn test_tip_equal_to_target() {
        let mut src = MemorySource::new();
        src.insert("a", &[], 100);
        src.insert("b", &["a"], 200);
        let cancel = CancelToken::new();

        let got =
            branches_containing(&src, &"b".into(), &tips(&[("here", "b")]), &cancel).unwrap();
        assert_eq!(labels(&got), ["here"]);
    }

    #[test]
    fn test_two_tips_same_commit_merge_before_seeding() {
        let mut src = MemorySource::new();
        src.insert("a", &[], 100);
        src.insert("b", &["a"], 200);
        let cancel = CancelToken::new();

        let got = branches_containing(
            &src,
            &"a".into(),
            &tips(&[("one", "b"), ("two", "b")]),
            &cancel,
        )
        .unwrap();
        assert_eq!(labels(&got), ["one", "two"]);
    }

    #[test]
    fn test_empty_tip_set() {
        let mut src = MemorySource::new();
        src.insert("a", &[], 100);
        let cancel = CancelToken::new();

        let got = branches_containing(&src, &"a".into(), &BTreeMap::new(), &cancel).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn test_matches_pairwise_ancestry_on_branchy_graph() {
        // Two forks off a shared trunk plus a merge back.
        //   r <- t1 <- t2 <- m        (trunk, then merge)
        //   t1 <- f1 <- f2            (fork one, unmerged)
        //   t2 <- g1                  (fork two, merged via m)
        let mut src = MemorySource::new();
        src.insert("r", &[], 10);
        src.insert("t1", &["r"], 20);
        src.insert("t2", &["t1"], 30);
        src.insert("f1", &["t1"], 25);
        src.insert("f2", &["f1"], 35);
        src.insert("g1", &["t2"], 40);
        src.insert("m", &["t2", "g1"], 50);
        let cancel = CancelToken::new();

        let tip_set = tips(&[("trunk", "m"), ("fork1", "f2"), ("fork2", "g1")]);
        for target in ["r", "t1", "t2", "f1", "f2", "g1", "m"] {
            let target = CommitId::from(target);
            let got = branches_containing(&src, &target, &tip_set, &cancel).unwrap();
            let expected: BTreeSet<String> = tip_set
                .iter()
                .filter(|(_, tip)| is_ancestor(&src, &target, tip, &cancel).unwrap())
                .map(|(l, _)| l.clone())
                .collect();
            assert_eq!(got, expected, "target {target}");
        }
    }

    #[test]
    fn test_batching_beyond_flag_width() {
        // Chain c0 <- c1 <- ... <- c99 with a branch tip at every commit;
        // exactly the tips at or after the target contain it.
        let mut src = MemorySource::new();
        src.insert("c0", &[], 0);
        for i in 1..100 {
            let id = format!("c{i}");
            let parent = format!("c{}", i - 1);
            src.insert(&id, &[parent.as_str()], i as i64 * 10);
        }
        let tip_set: BTreeMap<String, CommitId> = (0..100)
            .map(|i| (format!("b{i:03}"), CommitId::from(format!("c{i}").as_str())))
            .collect();
        let cancel = CancelToken::new();

        let got = branches_containing(&src, &"c40".into(), &tip_set, &cancel).unwrap();
        assert_eq!(got.len(), 60);
        assert!(got.contains("b040"));
        assert!(got.contains("b099"));
        assert!(!got.contains("b039"));
    }

    #[test]
    fn test_matches_pairwise_ancestry_on_random_dags() {
        // Generated DAGs with merges and extra roots, enough tips to force
        // two flag batches, every commit as target; the engine must agree
        // with per-tip ancestry walks on all of them.
        let cancel = CancelToken::new();
        for seed in 0..6u64 {
            let mut state = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15).wrapping_add(1);
            let mut next = move |bound: usize| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 33) as usize) % bound
            };

            let n = 40 + next(41);
            let mut src = MemorySource::new();
            src.insert("c0", &[], 0);
            for i in 1..n {
                let id = format!("c{i}");
                let roll = next(10);
                if roll == 0 {
                    // Occasional extra root.
                    src.insert(&id, &[], i as i64 * 10);
                } else if roll <= 2 && i >= 2 {
                    let p1 = format!("c{}", next(i));
                    let mut p2 = format!("c{}", next(i));
                    if p2 == p1 {
                        p2 = format!("c{}", (next(i - 1) + 1) % i);
                    }
                    src.insert(&id, &[p1.as_str(), p2.as_str()], i as i64 * 10);
                } else {
                    let p = format!("c{}", next(i));
                    src.insert(&id, &[p.as_str()], i as i64 * 10);
                }
            }

            let tip_set: BTreeMap<String, CommitId> = (0..70)
                .map(|t| {
                    let commit = format!("c{}", next(n));
                    (format!("b{t:03}"), CommitId::from(commit))
                })
                .collect();

            for i in 0..n {
                let target = CommitId::from(format!("c{i}"));
                let got = branches_containing(&src, &target, &tip_set, &cancel).unwrap();
                let expected: BTreeSet<String> = tip_set
                    .iter()
                    .filter(|(_, tip)| is_ancestor(&src, &target, tip, &cancel).unwrap())
                    .map(|(l, _)| l.clone())
                    .collect();
                assert_eq!(got, expected, "seed {seed} target {target}");
            }
        }
    }

    #[test]
    fn test_idempotent_across_runs() {
        let mut src = MemorySource::new();
        src.insert("a", &[], 100);
        src.insert("b", &["a"], 200);
        src.insert("c", &["a"], 200);
        src.insert("m", &["b", "c"], 300);
        let cancel = CancelToken::new();
        let tip_set = tips(&[("p", "b"), ("q", "c"), ("r", "m")]);

        let first = branches_containing(&src, &"a".into(), &tip_set, &cancel).unwrap();
        for _ in 0..5 {
            let again = branches_containing(&src, &"a".into(), &tip_set, &cancel).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_cancellation_surfaces() {
        let mut src = MemorySource::new();
        src.insert("a", &[], 100);
        src.insert("b", &["a"], 200);
        src.insert("c", &["b"], 300);
        let cancel = CancelToken::new();
        let tripping = CancelAfter::new(&src, cancel.clone(), 1);

        let err = branches_containing(&tripping, &"a".into(), &tips(&[("main", "c")]), &cancel)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_missing_target_propagates() {
        let mut src = MemorySource::new();
        src.insert("a", &[], 100);
        let cancel = CancelToken::new();

        let err = branches_containing(&src, &"gone".into(), &tips(&[("main", "a")]), &cancel)
            .unwrap_err();
        assert!(matches!(err, Error::ObjectMissing { .. }));
    }
}
