//! Filesystem utilities for lessonbook.
//!
//! Atomic writes for rendered output, deterministic traversal for evaluation
//! files, and tree copies for sandbox snapshots.

pub mod atomic;
mod tree;

pub use atomic::atomic_write_file;
pub use tree::{copy_tree, walk_files};
