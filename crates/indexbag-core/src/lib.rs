//! Core runtime for indexbag: an in-memory value container that keeps any
//! number of unique and non-unique lookup indices in lockstep with its
//! contents.
//!
//! Every mutation runs as validate-all-then-commit-all across the attached
//! indices, so a rejected `add` or `attach` leaves the container exactly as
//! it was.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod container;
pub mod error;
pub mod identity;
pub mod index;
pub mod key;
pub mod obs;

///
/// CONSTANTS
///

/// Maximum length (in bytes) of a diagnostic index name.
///
/// Names are carried inside every index error and metrics key, so they are
/// kept short and ASCII.
pub const MAX_INDEX_NAME_LEN: usize = 64;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        container::Container,
        identity::{IndexName, ValueId},
        index::{IndexMaintenance, NonUniqueIndex, NonUniqueView, UniqueIndex, UniqueView},
        key::{Key, KeyKind, ScalarKey},
    };
}
