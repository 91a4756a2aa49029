use crate::{
    identity::{IndexLabel, ValueId},
    key::Key,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// IndexError
///
/// Closed taxonomy of index maintenance failures. Every variant names the
/// index and key involved; none of them leave partial state behind.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IndexError {
    /// A unique index already maps `key` to another value.
    #[error("unique index '{index}' already maps key {key} to {existing} (incoming {incoming})")]
    KeyCollision {
        index: IndexLabel,
        key: Key,
        existing: ValueId,
        incoming: ValueId,
    },

    /// Delete preparation found no entry for the value's key.
    #[error("index '{index}' has no entry for key {key} (value {value})")]
    MissingKey {
        index: IndexLabel,
        key: Key,
        value: ValueId,
    },

    /// Delete preparation found the key, but not the value under it.
    #[error("index '{index}' does not hold value {value} under key {key}")]
    ValueNotInBucket {
        index: IndexLabel,
        key: Key,
        value: ValueId,
    },
}

impl IndexError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::KeyCollision { .. } => ErrorClass::Conflict,
            Self::MissingKey { .. } | Self::ValueNotInBucket { .. } => {
                ErrorClass::InvariantViolation
            }
        }
    }

    #[must_use]
    pub const fn index(&self) -> &IndexLabel {
        match self {
            Self::KeyCollision { index, .. }
            | Self::MissingKey { index, .. }
            | Self::ValueNotInBucket { index, .. } => index,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &Key {
        match self {
            Self::KeyCollision { key, .. }
            | Self::MissingKey { key, .. }
            | Self::ValueNotInBucket { key, .. } => key,
        }
    }
}

///
/// AddError
///
/// Rejected insertion. Hands the value back to the caller untouched.
///

#[derive(Debug, ThisError)]
#[error("value rejected: {source}")]
pub struct AddError<T> {
    pub value: T,
    pub source: IndexError,
}

impl<T> AddError<T> {
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }

    #[must_use]
    pub fn into_parts(self) -> (T, IndexError) {
        (self.value, self.source)
    }
}

///
/// VerifyError
///
/// Divergence found by a full consistency pass.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum VerifyError {
    #[error(transparent)]
    Entry(#[from] IndexError),

    #[error("index '{index}' holds {found} entries for {expected} values")]
    EntryCount {
        index: IndexLabel,
        expected: usize,
        found: usize,
    },
}

///
/// ErrorClass
/// Coarse classification separating expected conflicts from programmer error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
