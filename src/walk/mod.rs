pub mod cancel;
pub mod walker;

pub use cancel::CancelToken;
pub use walker::{GraphWalker, Visit};
