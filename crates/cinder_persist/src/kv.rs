//! The key-value contract used by persistence.
//!
//! A store hands out transactions; a transaction holds named buckets of
//! byte keys and values. Writes made inside [`KvStore::update`] become
//! visible only if the closure returns `Ok`.

use cinder_foundation::Result;

/// A named keyspace inside a transaction.
pub trait Bucket {
    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend rejects the write.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Reads a value.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Removes a key. Absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend rejects the delete.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Visits every entry in key order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    fn for_each(&self, f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>) -> Result<()>;
}

/// A unit of work against a [`KvStore`].
pub trait Transaction {
    /// Returns the named bucket, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the bucket cannot be created.
    fn create_bucket_if_not_exists(&mut self, name: &str) -> Result<&mut dyn Bucket>;

    /// Returns the named bucket, if it exists.
    fn bucket(&self, name: &str) -> Option<&dyn Bucket>;
}

/// A transactional key-value store.
pub trait KvStore {
    /// Runs `f` in a read-write transaction, committing only if it returns
    /// `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or `Storage` if the commit fails.
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<()>;

    /// Runs `f` in a read-only transaction.
    ///
    /// # Errors
    ///
    /// Returns the closure's error.
    fn view<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&dyn Transaction) -> Result<()>;
}
