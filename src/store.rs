//! Process-lifetime ephemeral store with per-entry TTL expiry.
//!
//! One store instance owns every piece of short-lived bot state: rate
//! counters, block-list membership, pending download choices and support
//! tickets. Expiry is passive (an entry is simply gone once its TTL has
//! elapsed) and all access is atomic per key, so handlers suspended on
//! network calls cannot corrupt each other's records.

use crate::identity::Identity;
use crate::interaction::PendingInteraction;
use crate::notify::SupportTicket;
use crate::transport::ConversationId;
use moka::future::Cache;
use moka::Expiry;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound on stored entries, far above anything a single bot
/// instance accumulates in practice.
const MAX_ENTRIES: u64 = 100_000;

/// Composite key space for everything the store holds.
///
/// Replaces ad hoc string concatenation (`reply_<chat>_<user>`) with a
/// typed key, so rate counters, block entries and pending choices can
/// never collide.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum StoreKey {
    /// Rate-limit counter for one identity
    Rate(Identity),
    /// Block-list membership for one identity
    Block(Identity),
    /// Pending format choice for one (conversation, identity) pair
    Pending(ConversationId, Identity),
    /// Support ticket by id
    Ticket(u64),
}

/// Values the store can hold.
#[derive(Clone, Debug)]
pub enum StoreValue {
    /// Shared counter; incremented in place, never re-inserted, so the
    /// entry's TTL keeps running from creation
    Counter(Arc<AtomicU32>),
    /// Bare membership marker
    Flag,
    /// Open two-step download interaction
    Pending(Arc<PendingInteraction>),
    /// Filed support ticket
    Ticket(Arc<SupportTicket>),
}

#[derive(Clone, Debug)]
struct StoreEntry {
    value: StoreValue,
    ttl: Option<Duration>,
}

/// Reads the TTL recorded next to each value. `None` means the entry
/// lives until explicit removal or process end.
struct PerEntryExpiry;

impl Expiry<StoreKey, StoreEntry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &StoreKey,
        entry: &StoreEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// Shared TTL key-value store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct EphemeralStore {
    entries: Cache<StoreKey, StoreEntry>,
}

impl EphemeralStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .expire_after(PerEntryExpiry)
            .build();
        Self { entries }
    }

    /// Inserts `value` under `key`. A `ttl` of `None` keeps the entry
    /// until explicit removal or process end.
    pub async fn insert(&self, key: StoreKey, value: StoreValue, ttl: Option<Duration>) {
        self.entries.insert(key, StoreEntry { value, ttl }).await;
    }

    /// Returns the live value under `key`, if any. Expired entries are
    /// indistinguishable from absent ones.
    pub async fn get(&self, key: &StoreKey) -> Option<StoreValue> {
        self.entries.get(key).await.map(|entry| entry.value)
    }

    /// Removes and returns the value under `key`. The take is atomic:
    /// of two concurrent removers, exactly one receives the value.
    pub async fn remove(&self, key: &StoreKey) -> Option<StoreValue> {
        self.entries.remove(key).await.map(|entry| entry.value)
    }

    /// Whether a live entry exists under `key`.
    pub async fn contains(&self, key: &StoreKey) -> bool {
        self.get(key).await.is_some()
    }

    /// Returns the shared counter under `key`, creating it with `ttl` on
    /// first use. Creation is atomic per key: two racing callers observe
    /// the same counter, so no increment can be lost. The TTL runs from
    /// creation; later increments do not extend the window.
    pub async fn counter(&self, key: StoreKey, ttl: Duration) -> Arc<AtomicU32> {
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(async {
                StoreEntry {
                    value: StoreValue::Counter(Arc::new(AtomicU32::new(0))),
                    ttl: Some(ttl),
                }
            })
            .await;

        match entry.into_value().value {
            StoreValue::Counter(counter) => counter,
            // A non-counter under a Rate key cannot happen through the
            // public API; fall back to a detached counter.
            _ => Arc::new(AtomicU32::new(0)),
        }
    }

    /// Current number of live entries (approximate until pending
    /// maintenance runs).
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Runs pending cache maintenance. Test helper.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }
}

impl Default for EphemeralStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    fn identity(raw: &str) -> Identity {
        Identity::canonicalize(raw)
    }

    #[tokio::test]
    async fn insert_then_get_roundtrip() {
        let store = EphemeralStore::new();
        let key = StoreKey::Block(identity("100"));

        store.insert(key.clone(), StoreValue::Flag, None).await;

        assert!(store.contains(&key).await);
    }

    #[tokio::test]
    async fn entry_without_ttl_survives() {
        let store = EphemeralStore::new();
        let key = StoreKey::Block(identity("100"));

        store.insert(key.clone(), StoreValue::Flag, None).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.contains(&key).await);
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let store = EphemeralStore::new();
        let key = StoreKey::Block(identity("100"));

        store
            .insert(key.clone(), StoreValue::Flag, Some(Duration::from_millis(40)))
            .await;

        assert!(store.contains(&key).await);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!store.contains(&key).await);
    }

    #[tokio::test]
    async fn remove_takes_at_most_once() {
        let store = EphemeralStore::new();
        let key = StoreKey::Block(identity("100"));

        store.insert(key.clone(), StoreValue::Flag, None).await;

        assert!(store.remove(&key).await.is_some());
        assert!(store.remove(&key).await.is_none());
    }

    #[tokio::test]
    async fn counter_is_shared_across_callers() {
        let store = EphemeralStore::new();
        let key = StoreKey::Rate(identity("100"));

        let first = store.counter(key.clone(), Duration::from_secs(60)).await;
        first.fetch_add(3, Ordering::SeqCst);

        let second = store.counter(key, Duration::from_secs(60)).await;
        assert_eq!(second.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn counter_window_runs_from_creation() {
        let store = EphemeralStore::new();
        let key = StoreKey::Rate(identity("100"));

        let counter = store.counter(key.clone(), Duration::from_millis(50)).await;
        counter.fetch_add(1, Ordering::SeqCst);

        // Incrementing must not extend the window.
        tokio::time::sleep(Duration::from_millis(30)).await;
        store
            .counter(key.clone(), Duration::from_millis(50))
            .await
            .fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(!store.contains(&key).await);
    }

    #[tokio::test]
    async fn keys_do_not_collide_across_kinds() {
        let store = EphemeralStore::new();
        let id = identity("100");

        store
            .insert(StoreKey::Block(id.clone()), StoreValue::Flag, None)
            .await;

        assert!(!store.contains(&StoreKey::Rate(id)).await);
    }
}
