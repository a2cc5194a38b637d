//! A bottom-up splay tree whose nodes live in a chunked typed arena.
//!
//! Nodes hold arena handles to their children and a non-owning handle to their parent, so
//! splaying walks upward from the accessed node instead of recursing down from the root.

pub mod arena;
mod error;
pub mod splay_tree;

pub use crate::error::{Error, Result};
pub use crate::splay_tree::{NodeRef, SplayTree};
