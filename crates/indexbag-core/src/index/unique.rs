use crate::{
    container::Container,
    error::IndexError,
    identity::{IndexLabel, IndexName, IndexNameError, ValueId},
    index::IndexMaintenance,
    key::{Key, ScalarKey},
};
use std::{cell::RefCell, collections::BTreeMap, fmt, marker::PhantomData, rc::Rc};

type UniqueEntries = Rc<RefCell<BTreeMap<Key, ValueId>>>;

///
/// UniqueIndex
///
/// Maps each key to exactly one value. A second value with an occupied key
/// is rejected at preparation time.
///

pub struct UniqueIndex<T, K> {
    label: IndexLabel,
    key_fn: Box<dyn Fn(&T) -> K>,
    entries: UniqueEntries,
}

impl<T, K: ScalarKey> UniqueIndex<T, K> {
    #[must_use]
    pub fn new(key_fn: impl Fn(&T) -> K + 'static) -> Self {
        Self::with_label(IndexLabel::Unnamed, key_fn)
    }

    pub fn named(name: &str, key_fn: impl Fn(&T) -> K + 'static) -> Result<Self, IndexNameError> {
        let name = IndexName::try_from_str(name)?;

        Ok(Self::with_label(IndexLabel::Named(name), key_fn))
    }

    fn with_label(label: IndexLabel, key_fn: impl Fn(&T) -> K + 'static) -> Self {
        Self {
            label,
            key_fn: Box::new(key_fn),
            entries: Rc::default(),
        }
    }

    /// Live read-only view over this index's entries.
    #[must_use]
    pub fn access(&self) -> UniqueView<K> {
        UniqueView {
            label: self.label.clone(),
            entries: Rc::clone(&self.entries),
            _marker: PhantomData,
        }
    }

    /// Attach to `container`, backfilling its current values, and return the
    /// live view. On failure the index is dropped.
    pub fn on(self, container: &mut Container<T>) -> Result<UniqueView<K>, IndexError>
    where
        T: 'static,
    {
        let view = self.access();
        container.attach(self)?;

        Ok(view)
    }
}

impl<T, K> fmt::Debug for UniqueIndex<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueIndex")
            .field("label", &self.label)
            .field("len", &self.entries.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<T, K: ScalarKey> IndexMaintenance<T> for UniqueIndex<T, K> {
    fn label(&self) -> &IndexLabel {
        &self.label
    }

    fn is_unique(&self) -> bool {
        true
    }

    fn compute_key(&self, value: &T) -> Key {
        (self.key_fn)(value).into_key()
    }

    fn prepare_add(&self, key: &Key, id: ValueId) -> Result<(), IndexError> {
        match self.entries.borrow().get(key) {
            Some(&existing) => Err(IndexError::KeyCollision {
                index: self.label.clone(),
                key: key.clone(),
                existing,
                incoming: id,
            }),
            None => Ok(()),
        }
    }

    fn add(&mut self, key: Key, id: ValueId) {
        self.entries.borrow_mut().insert(key, id);
    }

    fn prepare_delete(&self, key: &Key, id: ValueId) -> Result<(), IndexError> {
        match self.entries.borrow().get(key) {
            None => Err(IndexError::MissingKey {
                index: self.label.clone(),
                key: key.clone(),
                value: id,
            }),
            Some(&owner) if owner != id => Err(IndexError::ValueNotInBucket {
                index: self.label.clone(),
                key: key.clone(),
                value: id,
            }),
            Some(_) => Ok(()),
        }
    }

    fn delete(&mut self, key: &Key, id: ValueId) {
        let mut entries = self.entries.borrow_mut();

        // never evict an entry owned by another value
        if entries.get(key) == Some(&id) {
            entries.remove(key);
        }
    }

    fn clear(&mut self) {
        self.entries.borrow_mut().clear();
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

///
/// UniqueView
///
/// Read-only point lookup over a unique index. Shares state with the index,
/// so it reflects every later add and delete.
///

pub struct UniqueView<K> {
    label: IndexLabel,
    entries: UniqueEntries,
    _marker: PhantomData<fn() -> K>,
}

impl<K: ScalarKey> UniqueView<K> {
    #[must_use]
    pub fn get(&self, key: &K) -> Option<ValueId> {
        self.entries.borrow().get(&key.to_key()).copied()
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.borrow().contains_key(&key.to_key())
    }

    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.entries.borrow().keys().filter_map(K::from_key).collect()
    }
}

impl<K> UniqueView<K> {
    #[must_use]
    pub const fn label(&self) -> &IndexLabel {
        &self.label
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<K> Clone for UniqueView<K> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            entries: Rc::clone(&self.entries),
            _marker: PhantomData,
        }
    }
}

impl<K> fmt::Debug for UniqueView<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueView")
            .field("label", &self.label)
            .field("entries", &*self.entries.borrow())
            .finish()
    }
}
