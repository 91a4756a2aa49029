//! Module: identity
//! Responsibility: value handles and validated index naming.
//! Does not own: index storage or key extraction.
//!
//! Invariants:
//! - A `ValueId` is issued once by one container and never reused.
//! - Handles from different containers never compare equal.
//! - Index names are ASCII, non-empty, and bounded by MAX_INDEX_NAME_LEN.

#[cfg(test)]
mod tests;

use crate::MAX_INDEX_NAME_LEN;
use derive_more::{Deref, Display};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error as ThisError;

static NEXT_CONTAINER_TAG: AtomicU64 = AtomicU64::new(1);

///
/// ContainerTag
///
/// Process-unique tag stamped into every handle a container issues.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("c{_0}")]
pub struct ContainerTag(u64);

impl ContainerTag {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONTAINER_TAG.fetch_add(1, Ordering::Relaxed))
    }
}

///
/// ValueId
///
/// Identity of one stored value. Equality is handle equality, never the
/// value's own `PartialEq`. Ordering within one container follows insertion.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{container}:{seq}")]
pub struct ValueId {
    container: ContainerTag,
    seq: u64,
}

impl ValueId {
    pub(crate) const fn new(container: ContainerTag, seq: u64) -> Self {
        Self { container, seq }
    }

    #[must_use]
    pub const fn container(&self) -> ContainerTag {
        self.container
    }

    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

///
/// IndexNameError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IndexNameError {
    #[error("index name is empty")]
    Empty,

    #[error("index name length {len} exceeds max {max}")]
    TooLong { len: usize, max: usize },

    #[error("index name must be ASCII")]
    NonAscii,
}

///
/// IndexName
///

#[derive(Clone, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IndexName(String);

impl IndexName {
    pub fn try_from_str(name: &str) -> Result<Self, IndexNameError> {
        if name.is_empty() {
            return Err(IndexNameError::Empty);
        }
        if name.len() > MAX_INDEX_NAME_LEN {
            return Err(IndexNameError::TooLong {
                len: name.len(),
                max: MAX_INDEX_NAME_LEN,
            });
        }
        if !name.is_ascii() {
            return Err(IndexNameError::NonAscii);
        }

        Ok(Self(name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for IndexName {
    type Error = IndexNameError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::try_from_str(name)
    }
}

///
/// IndexLabel
///
/// Diagnostic identity of an index as carried in errors and metrics.
///

#[derive(Clone, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IndexLabel {
    #[display("{_0}")]
    Named(IndexName),

    #[default]
    #[display("<unnamed>")]
    Unnamed,
}

impl IndexLabel {
    #[must_use]
    pub const fn name(&self) -> Option<&IndexName> {
        match self {
            Self::Named(name) => Some(name),
            Self::Unnamed => None,
        }
    }
}

impl From<Option<IndexName>> for IndexLabel {
    fn from(name: Option<IndexName>) -> Self {
        name.map_or(Self::Unnamed, Self::Named)
    }
}
