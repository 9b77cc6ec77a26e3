//! In-memory key-value store.
//!
//! Transactions work on an `im` snapshot of the whole store, so opening one
//! is cheap and readers never see a half-applied update. Writers are
//! serialized; a successful update swaps its snapshot in.

use im::OrdMap;
use parking_lot::{Mutex, RwLock};

use cinder_foundation::{Error, Result};

use crate::kv::{Bucket, KvStore, Transaction};

/// One bucket's entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryBucket {
    entries: OrdMap<Vec<u8>, Vec<u8>>,
}

impl MemoryBucket {
    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the bucket has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Bucket for MemoryBucket {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn for_each(&self, f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>) -> Result<()> {
        for (key, value) in &self.entries {
            f(key, value)?;
        }
        Ok(())
    }
}

type Buckets = OrdMap<String, MemoryBucket>;

/// A transaction over a snapshot of a [`MemoryStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryTransaction {
    buckets: Buckets,
}

impl MemoryTransaction {
    /// Returns the bucket names in order.
    #[must_use]
    pub fn bucket_names(&self) -> Vec<String> {
        self.buckets.keys().cloned().collect()
    }
}

impl Transaction for MemoryTransaction {
    fn create_bucket_if_not_exists(&mut self, name: &str) -> Result<&mut dyn Bucket> {
        if !self.buckets.contains_key(name) {
            self.buckets.insert(name.to_owned(), MemoryBucket::default());
        }
        self.buckets
            .get_mut(name)
            .map(|bucket| bucket as &mut dyn Bucket)
            .ok_or_else(|| Error::storage(format!("bucket {name} vanished")))
    }

    fn bucket(&self, name: &str) -> Option<&dyn Bucket> {
        self.buckets.get(name).map(|bucket| bucket as &dyn Bucket)
    }
}

/// A transactional key-value store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Buckets>,
    writer: Mutex<()>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a read-only transaction over the current contents.
    #[must_use]
    pub fn snapshot(&self) -> MemoryTransaction {
        MemoryTransaction {
            buckets: self.data.read().clone(),
        }
    }

    /// Returns the number of entries in a bucket, or zero if it is absent.
    #[must_use]
    pub fn bucket_len(&self, name: &str) -> usize {
        self.data.read().get(name).map_or(0, MemoryBucket::len)
    }
}

impl KvStore for MemoryStore {
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<()>,
    {
        let _writer = self.writer.lock();
        let mut tx = self.snapshot();
        f(&mut tx)?;
        *self.data.write() = tx.buckets;
        Ok(())
    }

    fn view<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&dyn Transaction) -> Result<()>,
    {
        let tx = self.snapshot();
        f(&tx)
    }
}
