use std::result;
use thiserror::Error;

/// Errors returned by `SplayTree` operations.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// The requested key is not stored in the tree.
    #[error("key not found")]
    KeyNotFound,
    /// A tree was requested from a collection with no keys.
    #[error("cannot build a splay tree from an empty collection of keys")]
    EmptyKeys,
}

/// Reasons a key sequence cannot be rebuilt into a tree shape.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum PreOrderError {
    #[error("duplicate key in splay tree sequence")]
    DuplicateKey,
    #[error("splay tree keys are not in pre-order")]
    NotPreOrder,
}

pub type Result<T> = result::Result<T, Error>;
