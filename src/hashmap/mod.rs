use std::collections::TryReserveError;

use thiserror::Error;

pub mod hash_table;

pub use hash_table::{Cursor, DEFAULT_BUCKET_SIZE, HashTable, Iter, MAX_BUCKET_COUNT, hash};

pub type Result<T> = std::result::Result<T, TableError>;

#[derive(Error, Debug)]
pub enum TableError {
    /// The table could not be built from the given arguments,
    /// like a bucket count of zero
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Insert never overwrites, the old entry has to be deleted first
    #[error("Key {key:?} already exists")]
    KeyAlreadyExists { key: String },

    #[error("Key {key:?} not found")]
    KeyNotFound { key: String },

    /// Derived from a failed fallible reservation
    #[error("Allocation failure: {0}")]
    AllocationFailure(#[from] TryReserveError),
}

/// The small record stored by the table, wrapping a single integer
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Value(pub i32);

impl Value {
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
