//! ## tracestat-core::flow::table
//! **Bidirectional flow identity ↔ slot mapping**
//!
//! A [`FlowTable`] binds each tracked flow key to a slot of an
//! [`IndexChain`]. The binding is created on first insertion and destroyed
//! exactly when the slot is released, either by TTL expiration or by an
//! explicit [`FlowTable::remove`].
//!
//! The table never refreshes a flow on its own: expiration is measured from
//! the time a flow was inserted. Callers wanting an inactivity timeout use
//! [`FlowTable::observe`] with [`FlowExpiration::Activity`], or call
//! [`FlowTable::touch`] themselves.
//!
//! Eviction order relies on `now` never decreasing between calls. Callers
//! reading timestamps from a capture clamp them to the latest one seen.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::trace;

use crate::alloc::IndexChain;
use crate::error::{ChainError, FlowTableError};
use crate::flow::expiration::FlowExpiration;
use crate::flow::stats::FlowTableStats;
use crate::time::TimeNs;

/// Outcome of [`FlowTable::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The key was already tracked; nothing changed.
    Existing(usize),
    /// The key was bound to a freshly allocated slot.
    Inserted(usize),
}

impl Insertion {
    pub fn slot(self) -> usize {
        match self {
            Insertion::Existing(slot) | Insertion::Inserted(slot) => slot,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Insertion::Inserted(_))
    }
}

/// Fixed-capacity table of flow keys with time-based eviction.
#[derive(Debug, Clone)]
pub struct FlowTable<K> {
    chain: IndexChain,
    slots: HashMap<K, usize>,
    keys: Vec<Option<K>>,
    stats: FlowTableStats,
}

impl<K> FlowTable<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates a table able to track `capacity` flows at once.
    pub fn with_capacity(capacity: usize) -> Result<Self, FlowTableError> {
        let chain = IndexChain::with_capacity(capacity)?;
        Ok(Self {
            chain,
            slots: HashMap::with_capacity(capacity),
            keys: vec![None; capacity],
            stats: FlowTableStats::new(),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.chain.capacity()
    }

    /// Number of flows currently tracked.
    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    pub fn slot_of(&self, key: &K) -> Option<usize> {
        self.slots.get(key).copied()
    }

    pub fn key_at(&self, slot: usize) -> Option<&K> {
        self.keys.get(slot).and_then(Option::as_ref)
    }

    /// Key of the flow that would be expired first.
    pub fn oldest(&self) -> Option<&K> {
        self.chain.oldest().and_then(|slot| self.key_at(slot))
    }

    pub fn stats(&self) -> &FlowTableStats {
        &self.stats
    }

    /// Starts tracking `key` at time `now`. Inserting a key that is already
    /// tracked is a no-op.
    pub fn insert(&mut self, key: K, now: TimeNs) -> Result<Insertion, FlowTableError> {
        if let Some(&slot) = self.slots.get(&key) {
            return Ok(Insertion::Existing(slot));
        }

        let slot = self.chain.allocate(now).map_err(|err| match err {
            ChainError::CapacityExhausted { capacity } => {
                FlowTableError::CapacityExceeded { capacity }
            }
            other => FlowTableError::Chain(other),
        })?;

        self.keys[slot] = Some(key);
        self.slots.insert(key, slot);
        self.stats.record_inserted(self.chain.len());
        trace!(slot = slot, now = now, "flow inserted");
        Ok(Insertion::Inserted(slot))
    }

    /// Refreshes a tracked flow so that its TTL counts from `now`.
    /// Returns `false` if the key is not tracked.
    pub fn touch(&mut self, key: &K, now: TimeNs) -> bool {
        match self.slots.get(key) {
            Some(&slot) => self.chain.rejuvenate(slot, now).is_ok(),
            None => false,
        }
    }

    /// Records an observation of `key` at `now`: inserts unknown keys and,
    /// under [`FlowExpiration::Activity`], refreshes known ones.
    pub fn observe(
        &mut self,
        key: K,
        now: TimeNs,
        policy: FlowExpiration,
    ) -> Result<Insertion, FlowTableError> {
        let insertion = self.insert(key, now)?;
        if let (Insertion::Existing(slot), FlowExpiration::Activity) = (insertion, policy) {
            self.chain.rejuvenate(slot, now)?;
        }
        Ok(insertion)
    }

    /// Stops tracking `key`. Returns `false` if it was not tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(slot) = self.slots.remove(key) else {
            return false;
        };
        self.keys[slot] = None;
        let released = self.chain.release(slot).is_ok();
        if released {
            self.stats.record_removed();
        }
        released
    }

    /// Evicts every flow whose timestamp is older than `now - ttl` and
    /// returns how many were evicted.
    pub fn expire_all(&mut self, now: TimeNs, ttl: TimeNs) -> usize {
        self.expire_all_with(now, ttl, |_, _| {})
    }

    /// Same as [`FlowTable::expire_all`], calling `on_evict` with the key and
    /// former slot of each evicted flow, oldest first.
    pub fn expire_all_with<F>(&mut self, now: TimeNs, ttl: TimeNs, mut on_evict: F) -> usize
    where
        F: FnMut(K, usize),
    {
        let mut expired = 0;
        while let Some(slot) = self.chain.expire_one(now, ttl) {
            if let Some(key) = self.keys[slot].take() {
                self.slots.remove(&key);
                on_evict(key, slot);
            }
            expired += 1;
        }
        if expired > 0 {
            self.stats.record_expired(expired);
            trace!(expired = expired, now = now, "flows expired");
        }
        expired
    }
}
