pub mod node;
pub mod refs;

pub use node::{CommitId, CommitNode, ParentIds};
pub use refs::{Peeled, RefEntry, RefKind};
