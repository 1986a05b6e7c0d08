//! Sender identity: canonicalization, owner check, block list.
//!
//! A raw transport identifier may carry a domain suffix
//! (`12345@s.whatsapp.net`); the canonical form is everything before the
//! first `@`. Malformed input degrades to "not owner / not blocked"
//! rather than failing.

use crate::store::{EphemeralStore, StoreKey, StoreValue};
use std::fmt;

/// Canonical handle for a message sender, independent of
/// transport-specific suffixes. Two identities are equal iff their
/// canonical forms match.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    /// Strips the transport suffix from a raw identifier. Idempotent:
    /// canonicalizing an already-canonical identity is a no-op.
    #[must_use]
    pub fn canonicalize(raw: &str) -> Self {
        let canonical = raw.split('@').next().unwrap_or(raw);
        Self(canonical.to_owned())
    }

    /// Canonical form as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner and block-list decisions, backed by the shared store.
#[derive(Clone)]
pub struct Auth {
    store: EphemeralStore,
    owner: Identity,
}

impl Auth {
    /// Creates the authorization facade. `owner_raw` may carry a
    /// transport suffix; it is canonicalized here once.
    #[must_use]
    pub fn new(store: EphemeralStore, owner_raw: &str) -> Self {
        Self {
            store,
            owner: Identity::canonicalize(owner_raw),
        }
    }

    /// The configured owner identity.
    #[must_use]
    pub const fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Whether `identity` is the configured owner.
    #[must_use]
    pub fn is_owner(&self, identity: &Identity) -> bool {
        *identity == self.owner
    }

    /// Whether a block entry exists for `identity`.
    pub async fn is_blocked(&self, identity: &Identity) -> bool {
        self.store
            .contains(&StoreKey::Block(identity.clone()))
            .await
    }

    /// Adds a block entry. Lives until [`Auth::unblock`] or process end.
    pub async fn block(&self, identity: Identity) {
        self.store
            .insert(StoreKey::Block(identity), StoreValue::Flag, None)
            .await;
    }

    /// Removes the block entry for `identity`, if present.
    pub async fn unblock(&self, identity: &Identity) {
        self.store.remove(&StoreKey::Block(identity.clone())).await;
    }
}
