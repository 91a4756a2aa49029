//! Module: index
//! Responsibility: key→value(s) maps kept in lockstep with a container.
//! Does not own: value storage, mutation ordering across indices, or attach.
//! Boundary: the container drives every index through `IndexMaintenance`.
//!
//! Invariants:
//! - `prepare_*` never mutates; `add`/`delete` never fail.
//! - A non-unique bucket is never empty.
//! - Views share state with their index and observe every committed write.

mod non_unique;
mod unique;


use crate::{
    error::IndexError,
    identity::{IndexLabel, ValueId},
    key::Key,
};

pub use non_unique::{NonUniqueIndex, NonUniqueView};
pub use unique::{UniqueIndex, UniqueView};

///
/// IndexMaintenance
///
/// Two-phase maintenance contract shared by the unique and non-unique
/// variants. The container calls `prepare_*` for every index before it
/// calls any `add`/`delete`, so a failed preparation leaves no trace.
///

pub trait IndexMaintenance<T> {
    /// Diagnostic identity carried in errors and metrics.
    fn label(&self) -> &IndexLabel;

    fn is_unique(&self) -> bool;

    /// Pure key extraction. Panics from the caller's function propagate.
    fn compute_key(&self, value: &T) -> Key;

    /// Check that `id` may be recorded under `key`. Must not mutate.
    fn prepare_add(&self, key: &Key, id: ValueId) -> Result<(), IndexError>;

    /// Record `id` under `key`. Callers run `prepare_add` first.
    fn add(&mut self, key: Key, id: ValueId);

    /// Check that `id` is recorded under `key`. Must not mutate.
    fn prepare_delete(&self, key: &Key, id: ValueId) -> Result<(), IndexError>;

    /// Remove `id` from under `key`.
    fn delete(&mut self, key: &Key, id: ValueId);

    /// Drop every entry.
    fn clear(&mut self);

    /// Number of distinct keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of (key, value) pairs held.
    fn entry_count(&self) -> usize;
}
