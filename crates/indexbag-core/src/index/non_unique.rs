use crate::{
    container::Container,
    error::IndexError,
    identity::{IndexLabel, IndexName, IndexNameError, ValueId},
    index::IndexMaintenance,
    key::{Key, ScalarKey},
};
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    fmt,
    marker::PhantomData,
    rc::Rc,
};

type Buckets = Rc<RefCell<BTreeMap<Key, BTreeSet<ValueId>>>>;

///
/// NonUniqueIndex
///
/// Maps each key to the set of values sharing it. Buckets are created on
/// first insert and dropped when their last value leaves.
///

pub struct NonUniqueIndex<T, K> {
    label: IndexLabel,
    key_fn: Box<dyn Fn(&T) -> K>,
    buckets: Buckets,
}

impl<T, K: ScalarKey> NonUniqueIndex<T, K> {
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
            buckets: Rc::default(),
        }
    }

    /// Live read-only view over this index's buckets.
    #[must_use]
    pub fn access(&self) -> NonUniqueView<K> {
        NonUniqueView {
            label: self.label.clone(),
            buckets: Rc::clone(&self.buckets),
            _marker: PhantomData,
        }
    }

    /// Attach to `container`, backfilling its current values, and return the
    /// live view.
    pub fn on(self, container: &mut Container<T>) -> Result<NonUniqueView<K>, IndexError>
    where
        T: 'static,
    {
        let view = self.access();
        container.attach(self)?;

        Ok(view)
    }
}

impl<T, K> fmt::Debug for NonUniqueIndex<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonUniqueIndex")
            .field("label", &self.label)
            .field("len", &self.buckets.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<T, K: ScalarKey> IndexMaintenance<T> for NonUniqueIndex<T, K> {
    fn label(&self) -> &IndexLabel {
        &self.label
    }

    fn is_unique(&self) -> bool {
        false
    }

    fn compute_key(&self, value: &T) -> Key {
        (self.key_fn)(value).into_key()
    }

    fn prepare_add(&self, _key: &Key, _id: ValueId) -> Result<(), IndexError> {
        Ok(())
    }

    fn add(&mut self, key: Key, id: ValueId) {
        self.buckets.borrow_mut().entry(key).or_default().insert(id);
    }

    fn prepare_delete(&self, key: &Key, id: ValueId) -> Result<(), IndexError> {
        let buckets = self.buckets.borrow();
        let Some(bucket) = buckets.get(key) else {
            return Err(IndexError::MissingKey {
                index: self.label.clone(),
                key: key.clone(),
                value: id,
            });
        };

        if !bucket.contains(&id) {
            return Err(IndexError::ValueNotInBucket {
                index: self.label.clone(),
                key: key.clone(),
                value: id,
            });
        }

        Ok(())
    }

    fn delete(&mut self, key: &Key, id: ValueId) {
        let mut buckets = self.buckets.borrow_mut();
        let Some(bucket) = buckets.get_mut(key) else {
            return;
        };

        bucket.remove(&id);
        if bucket.is_empty() {
            buckets.remove(key);
        }
    }

    fn clear(&mut self) {
        self.buckets.borrow_mut().clear();
    }

    fn len(&self) -> usize {
        self.buckets.borrow().len()
    }

    fn entry_count(&self) -> usize {
        self.buckets.borrow().values().map(BTreeSet::len).sum()
    }
}

///
/// NonUniqueView
///
/// Read-only lookup from a key to the values sharing it.
///

pub struct NonUniqueView<K> {
    label: IndexLabel,
    buckets: Buckets,
    _marker: PhantomData<fn() -> K>,
}

impl<K: ScalarKey> NonUniqueView<K> {
    /// Values under `key`, in insertion order. Empty when the key is absent.
    #[must_use]
    pub fn get(&self, key: &K) -> Vec<ValueId> {
        self.buckets
            .borrow()
            .get(&key.to_key())
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn count(&self, key: &K) -> usize {
        self.buckets
            .borrow()
            .get(&key.to_key())
            .map_or(0, BTreeSet::len)
    }

    #[must_use]
    pub fn contains(&self, key: &K, id: ValueId) -> bool {
        self.buckets
            .borrow()
            .get(&key.to_key())
            .is_some_and(|bucket| bucket.contains(&id))
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.buckets.borrow().contains_key(&key.to_key())
    }

    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.buckets.borrow().keys().filter_map(K::from_key).collect()
    }
}

impl<K> NonUniqueView<K> {
    #[must_use]
    pub const fn label(&self) -> &IndexLabel {
        &self.label
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.borrow().is_empty()
    }
}

impl<K> Clone for NonUniqueView<K> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            buckets: Rc::clone(&self.buckets),
            _marker: PhantomData,
        }
    }
}

impl<K> fmt::Debug for NonUniqueView<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonUniqueView")
            .field("label", &self.label)
            .field("buckets", &*self.buckets.borrow())
            .finish()
    }
}
