//! Reachability and tag-proximity queries over a commit DAG.
//!
//! Given one commit: which branches contain it in their history, and what
//! is the closest tagged commit strictly before or after it along ancestry
//! edges. Traversals are single-pass, visit each commit at most once, and
//! are cooperatively cancellable; branch containment against many tips runs
//! as one flag-propagation walk instead of one walk per tip.

pub mod core;
pub mod error;
pub mod query;
pub mod source;
pub mod walk;

pub use crate::core::{CommitId, CommitNode, Peeled, RefEntry, RefKind};
pub use error::{Error, Result};
pub use query::{
    branches_containing, is_ancestor, nearest_tag, resolve_tag_tips, Direction, HistoryQuery,
};
pub use source::{CommitGraphSource, GitSource, MemorySource};
pub use walk::{CancelToken, GraphWalker, Visit};
