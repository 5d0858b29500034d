//! Deep patching of state trees.
//!
//! A patch is a partial state object. Merging it walks both trees together,
//! recursing where both sides hold objects and overwriting everywhere else.
//! See [`merge`] for the exact rules.

mod merge;
mod path;

pub use merge::{check_depth, depth, merge, merge_tracked};
pub use path::KeyPath;
