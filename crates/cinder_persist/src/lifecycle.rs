//! Buffered persistence of component events.
//!
//! A [`Lifecycle`] subscribes to a world's bus for the persistent variants
//! and keeps, per variant, the latest value of every changed component and
//! the last value of every deleted one. [`Lifecycle::save`] flushes both in
//! one transaction; [`Lifecycle::load`] reads every bucket back into a world.
//!
//! Events published while a load is running are not buffered.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use cinder_bus::SubscriptionId;
use cinder_foundation::{ComponentId, Error, ErrorKind, Result};
use cinder_storage::Component;
use cinder_world::{
    AnyComponent, ComponentEvent, ComponentKind, Controllable, KindMatcher, Position, Skeleton,
    Variant, Velocity, World,
};

use crate::codec;
use crate::config::PersistConfig;
use crate::kv::{KvStore, Transaction};

/// Pending writes for one variant.
#[derive(Debug, Default)]
struct Buffer {
    changed: BTreeMap<ComponentId, AnyComponent>,
    deleted: BTreeMap<ComponentId, AnyComponent>,
}

impl Buffer {
    fn len(&self) -> usize {
        self.changed.len() + self.deleted.len()
    }

    fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }

    fn record(&mut self, event: &ComponentEvent) -> Result<()> {
        let id = event.id();
        if event.is_deleted() {
            self.changed.remove(&id);
            self.deleted.insert(id, event.component().clone());
            return Ok(());
        }
        if self.deleted.contains_key(&id) {
            return Err(Error::new(ErrorKind::ChangeAfterDelete {
                variant: event.kind().tag(),
                id,
            }));
        }
        self.changed.insert(id, event.component().clone());
        Ok(())
    }
}

type Buffers = HashMap<ComponentKind, Buffer>;

/// Sets the loading flag for its lifetime.
struct LoadGuard<'a>(&'a AtomicBool);

impl<'a> LoadGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Buffers component events and commits them to a key-value store.
#[derive(Debug)]
pub struct Lifecycle {
    config: PersistConfig,
    buffers: Arc<Mutex<Buffers>>,
    loading: Arc<AtomicBool>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl Lifecycle {
    /// Creates a lifecycle and subscribes it to `world` for the configured
    /// variants.
    #[must_use]
    pub fn attach(world: &World, config: PersistConfig) -> Self {
        let lifecycle = Self {
            config,
            buffers: Arc::new(Mutex::new(HashMap::new())),
            loading: Arc::new(AtomicBool::new(false)),
            subscription: Mutex::new(None),
        };

        let buffers = Arc::clone(&lifecycle.buffers);
        let loading = Arc::clone(&lifecycle.loading);
        let matcher = KindMatcher::new(lifecycle.config.variants.iter().copied());
        let id = world.subscribe(matcher, move |event: &ComponentEvent| {
            if loading.load(Ordering::Acquire) {
                return Ok(());
            }
            buffers
                .lock()
                .entry(event.kind())
                .or_default()
                .record(event)
        });

        tracing::debug!(%id, variants = lifecycle.config.variants.len(), "persistence attached");
        *lifecycle.subscription.lock() = Some(id);
        lifecycle
    }

    /// Stops buffering events from `world`. Pending changes are kept.
    pub fn detach(&self, world: &World) {
        if let Some(id) = self.subscription.lock().take() {
            world.unsubscribe(id);
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    /// Returns the number of buffered changes and deletions.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffers.lock().values().map(Buffer::len).sum()
    }

    /// Returns true if anything awaits a commit.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.pending() > 0
    }

    /// Writes every buffer into `tx`, then empties the buffers.
    ///
    /// Returns the number of keys written or deleted.
    ///
    /// # Errors
    ///
    /// `Encode` or `Storage`. On error the buffers are left untouched so the
    /// commit can be retried.
    pub fn commit(&self, tx: &mut dyn Transaction) -> Result<usize> {
        let mut buffers = self.buffers.lock();
        let written = self.write(&buffers, tx)?;
        buffers.clear();
        Ok(written)
    }

    /// Commits every buffer in one transaction of `store`.
    ///
    /// The buffers are emptied only after the store reports success.
    ///
    /// # Errors
    ///
    /// `Encode` or `Storage`; the buffers are left untouched.
    pub fn save<S: KvStore>(&self, store: &S) -> Result<usize> {
        let mut buffers = self.buffers.lock();
        let mut written = 0;
        let result = store.update(|tx| {
            written = self.write(&buffers, tx)?;
            Ok(())
        });
        if let Err(err) = result {
            let pending: usize = buffers.values().map(Buffer::len).sum();
            tracing::warn!(error = %err, pending, "commit aborted");
            return Err(err);
        }
        buffers.clear();
        tracing::info!(written, "saved");
        Ok(written)
    }

    /// Reads every persistent variant from `tx` into `world`, in configured
    /// order, and returns the number of components restored.
    ///
    /// Created events published by the load are not buffered.
    ///
    /// # Errors
    ///
    /// `Decode` for unreadable records or a key that disagrees with the
    /// record's id, or any error from [`World::restore`]. After an error the
    /// world holds a partial load and should be discarded.
    pub fn load(&self, world: &World, tx: &dyn Transaction) -> Result<usize> {
        let _guard = LoadGuard::new(&self.loading);
        let mut total = 0;
        for kind in &self.config.variants {
            total += match kind {
                ComponentKind::Position => load_variant::<Position>(world, tx)?,
                ComponentKind::Controllable => load_variant::<Controllable>(world, tx)?,
                ComponentKind::Skeleton => load_variant::<Skeleton>(world, tx)?,
                ComponentKind::Velocity => load_variant::<Velocity>(world, tx)?,
            };
        }
        tracing::info!(components = total, "loaded");
        Ok(total)
    }

    /// Loads from a read-only transaction of `store`.
    ///
    /// # Errors
    ///
    /// See [`Lifecycle::load`].
    pub fn load_from<S: KvStore>(&self, world: &World, store: &S) -> Result<usize> {
        let mut total = 0;
        store.view(|tx| {
            total = self.load(world, tx)?;
            Ok(())
        })?;
        Ok(total)
    }

    fn write(&self, buffers: &Buffers, tx: &mut dyn Transaction) -> Result<usize> {
        let mut written = 0;
        for kind in &self.config.variants {
            let Some(buffer) = buffers.get(kind) else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }

            let tag = kind.tag();
            let bucket = tx
                .create_bucket_if_not_exists(tag)
                .map_err(|e| e.during("commit", tag))?;
            for (id, component) in &buffer.changed {
                let ctx = |e: Error| e.during("commit", tag).for_component(*id);
                let bytes = codec::encode_any(component).map_err(ctx)?;
                bucket.put(&id.to_key(), &bytes).map_err(ctx)?;
                written += 1;
            }
            for id in buffer.deleted.keys() {
                bucket
                    .delete(&id.to_key())
                    .map_err(|e| e.during("commit", tag).for_component(*id))?;
                written += 1;
            }
            tracing::trace!(
                variant = tag,
                changed = buffer.changed.len(),
                deleted = buffer.deleted.len(),
                "staged"
            );
        }
        Ok(written)
    }
}

fn load_variant<V: Variant>(world: &World, tx: &dyn Transaction) -> Result<usize> {
    let Some(bucket) = tx.bucket(V::KIND.tag()) else {
        return Ok(0);
    };

    let mut items: Vec<V> = Vec::new();
    bucket
        .for_each(&mut |key: &[u8], value: &[u8]| {
            let id = ComponentId::from_key(key)
                .ok_or_else(|| Error::decode(format!("key of {} bytes", key.len())))?;
            let item: V = codec::decode(value).map_err(|e| e.for_component(id))?;
            if item.id() != id {
                return Err(Error::decode(format!("key {id} holds component {}", item.id()))
                    .for_component(id));
            }
            items.push(item);
            Ok(())
        })
        .map_err(|e| e.during("load", V::NAME))?;

    let count = items.len();
    world.restore(items)?;
    Ok(count)
}
