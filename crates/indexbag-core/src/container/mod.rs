//! Module: container
//! Responsibility: master value set and the cross-index mutation protocol.
//! Does not own: key extraction or per-index storage layout.
//! Boundary: the only caller of `IndexMaintenance` write methods.
//!
//! Invariants:
//! - Every member is recorded under its key in every attached index.
//! - Mutations compute all keys, then validate all indices, then commit.
//! - Nothing is written before the last validation succeeds.


use crate::{
    error::{AddError, IndexError, VerifyError},
    identity::{ContainerTag, IndexLabel, ValueId},
    index::IndexMaintenance,
    key::Key,
    obs::sink::{self, ExecKind, ExecOutcome, MetricsEvent, Span},
};
use std::{collections::BTreeMap, fmt, marker::PhantomData};

///
/// Container
///
/// Owns values of type `T` and the ordered list of attached indices.
/// Values are addressed by the `ValueId` issued at insertion.
///

pub struct Container<T> {
    tag: ContainerTag,
    next_seq: u64,
    values: BTreeMap<ValueId, T>,
    indexes: Vec<Box<dyn IndexMaintenance<T>>>,
}

impl<T> Container<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag: ContainerTag::next(),
            next_seq: 0,
            values: BTreeMap::new(),
            indexes: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[must_use]
    pub fn get(&self, id: ValueId) -> Option<&T> {
        self.values.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ValueId) -> bool {
        self.values.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ValueId, &T)> {
        self.values.iter().map(|(id, value)| (*id, value))
    }

    pub fn ids(&self) -> impl Iterator<Item = ValueId> {
        self.values.keys().copied()
    }

    /// Resolve handles from a view lookup, skipping any that are not members.
    #[must_use]
    pub fn resolve(&self, ids: &[ValueId]) -> Vec<&T> {
        ids.iter().filter_map(|id| self.values.get(id)).collect()
    }

    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }

    /// Labels of attached indices, in attachment order.
    #[must_use]
    pub fn index_labels(&self) -> Vec<&IndexLabel> {
        self.indexes.iter().map(|index| index.label()).collect()
    }

    // ------------------------------------------------------------------
    // Attach
    // ------------------------------------------------------------------

    /// Attach `index`, replaying every current member into it first.
    ///
    /// The replay runs against the index alone; attached indices and the
    /// value set are never touched. The index joins the container only once
    /// every member has been recorded, otherwise it is dropped.
    pub fn attach<I>(&mut self, mut index: I) -> Result<(), IndexError>
    where
        I: IndexMaintenance<T> + 'static,
    {
        let span = Span::new(ExecKind::Attach);
        index.clear();

        // a view handed out before attach must not see a partial replay,
        // including one cut short by a panicking key function
        let mut replay = ReplayGuard::new(&mut index);
        for (&id, value) in &self.values {
            let key = replay.index.compute_key(value);

            if let Err(err) = replay.index.prepare_add(&key, id) {
                drop(replay);
                if index.is_unique() {
                    sink::record(MetricsEvent::UniqueViolation {
                        index: index.label().clone(),
                    });
                }
                span.finish(ExecOutcome::Rejected);

                return Err(err);
            }

            replay.index.add(key, id);
        }
        replay.disarm();

        sink::record(MetricsEvent::Backfill {
            index: index.label().clone(),
            values: self.values.len() as u64,
        });
        sink::record(MetricsEvent::IndexDelta {
            inserts: self.values.len() as u64,
            removes: 0,
        });

        self.indexes.push(Box::new(index));
        span.finish(ExecOutcome::Applied);

        Ok(())
    }

    // ------------------------------------------------------------------
    // Add
    // ------------------------------------------------------------------

    /// Insert `value` into the container and every attached index.
    ///
    /// On rejection the value is handed back inside the error and no index
    /// has been touched.
    pub fn add(&mut self, value: T) -> Result<ValueId, AddError<T>> {
        let span = Span::new(ExecKind::Add);
        let id = self.issue_id();

        // ------------------------------------------------------------------
        // Phase 1: compute keys (pure)
        // ------------------------------------------------------------------
        let keys = self.compute_keys(&value);

        // ------------------------------------------------------------------
        // Phase 2: validate every index
        // ------------------------------------------------------------------
        for (index, key) in self.indexes.iter().zip(&keys) {
            if let Err(source) = index.prepare_add(key, id) {
                if index.is_unique() {
                    sink::record(MetricsEvent::UniqueViolation {
                        index: index.label().clone(),
                    });
                }
                span.finish(ExecOutcome::Rejected);

                return Err(AddError { value, source });
            }
        }

        // ------------------------------------------------------------------
        // Phase 3: commit
        // ------------------------------------------------------------------
        for (index, key) in self.indexes.iter_mut().zip(keys) {
            index.add(key, id);
        }
        self.values.insert(id, value);

        #[cfg(debug_assertions)]
        self.debug_verify_member(id);

        sink::record(MetricsEvent::IndexDelta {
            inserts: self.indexes.len() as u64,
            removes: 0,
        });
        span.finish(ExecOutcome::Applied);

        Ok(id)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Remove the value identified by `id`. Returns whether it was a member.
    pub fn delete(&mut self, id: ValueId) -> Result<bool, IndexError> {
        self.take(id).map(|value| value.is_some())
    }

    /// Remove and return the value identified by `id`.
    ///
    /// A handle that is not a member (already deleted, or issued by another
    /// container) yields `Ok(None)` and changes nothing.
    pub fn take(&mut self, id: ValueId) -> Result<Option<T>, IndexError> {
        let span = Span::new(ExecKind::Delete);

        let Some(value) = self.values.get(&id) else {
            span.finish(ExecOutcome::NotFound);
            return Ok(None);
        };

        let keys = self.compute_keys(value);

        // Diagnostic only: surfaces a value/index mismatch before any index
        // is written.
        for (index, key) in self.indexes.iter().zip(&keys) {
            if let Err(err) = index.prepare_delete(key, id) {
                span.finish(ExecOutcome::Rejected);
                return Err(err);
            }
        }

        for (index, key) in self.indexes.iter_mut().zip(&keys) {
            index.delete(key, id);
        }
        let removed = self.values.remove(&id);

        #[cfg(debug_assertions)]
        self.debug_verify_removed(id, &keys);

        sink::record(MetricsEvent::IndexDelta {
            inserts: 0,
            removes: self.indexes.len() as u64,
        });
        span.finish(ExecOutcome::Applied);

        Ok(removed)
    }

    /// Remove every member while keeping all indices attached.
    pub fn clear(&mut self) {
        let span = Span::new(ExecKind::Clear);
        let removes = (self.values.len() * self.indexes.len()) as u64;

        for index in &mut self.indexes {
            index.clear();
        }
        self.values.clear();

        sink::record(MetricsEvent::IndexDelta {
            inserts: 0,
            removes,
        });
        span.finish(ExecOutcome::Applied);
    }

    // ------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------

    /// Full consistency pass over every member and every attached index.
    ///
    /// Checks coverage (each member under its key in each index) and that no
    /// index holds entries beyond the members.
    pub fn verify(&self) -> Result<(), VerifyError> {
        for (&id, value) in &self.values {
            for index in &self.indexes {
                let key = index.compute_key(value);
                index.prepare_delete(&key, id)?;
            }
        }

        for index in &self.indexes {
            let found = index.entry_count();
            if found != self.values.len() {
                return Err(VerifyError::EntryCount {
                    index: index.label().clone(),
                    expected: self.values.len(),
                    found,
                });
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn issue_id(&mut self) -> ValueId {
        let id = ValueId::new(self.tag, self.next_seq);
        self.next_seq += 1;

        id
    }

    fn compute_keys(&self, value: &T) -> Vec<Key> {
        self.indexes
            .iter()
            .map(|index| index.compute_key(value))
            .collect()
    }

    // Debug-only verification: checks the touched keys only, and panics on
    // divergence to surface it during development.
    #[cfg(debug_assertions)]
    fn debug_verify_member(&self, id: ValueId) {
        let Some(value) = self.values.get(&id) else {
            panic!("value {id} missing after add (debug-only)");
        };

        for index in &self.indexes {
            let key = index.compute_key(value);
            if let Err(err) = index.prepare_delete(&key, id) {
                panic!("index divergence after add: {err} (debug-only)");
            }
        }
    }

    #[cfg(debug_assertions)]
    fn debug_verify_removed(&self, id: ValueId, keys: &[Key]) {
        for (index, key) in self.indexes.iter().zip(keys) {
            if index.prepare_delete(key, id).is_ok() {
                panic!(
                    "index '{}' still holds {id} under {key} after delete (debug-only)",
                    index.label()
                );
            }
        }
    }
}

///
/// ReplayGuard
///
/// Empties the index being backfilled unless the replay completes.
///

struct ReplayGuard<'a, T, I: IndexMaintenance<T>> {
    index: &'a mut I,
    armed: bool,
    _value: PhantomData<fn(&T)>,
}

impl<'a, T, I: IndexMaintenance<T>> ReplayGuard<'a, T, I> {
    const fn new(index: &'a mut I) -> Self {
        Self {
            index,
            armed: true,
            _value: PhantomData,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T, I: IndexMaintenance<T>> Drop for ReplayGuard<'_, T, I> {
    fn drop(&mut self) {
        if self.armed {
            self.index.clear();
        }
    }
}

impl<T> Default for Container<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Container<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("tag", &self.tag)
            .field("values", &self.values)
            .field("indexes", &self.index_labels())
            .finish()
    }
}
