//! Fixed-window rate limiter.
//!
//! One counter per identity, created on the first command in a window
//! and deleted wholesale by TTL expiry; there is no explicit reset
//! logic. Bursts at window boundaries can momentarily reach twice the
//! configured rate; that is a documented characteristic of the fixed
//! window, not a defect.

use crate::identity::Identity;
use crate::store::{EphemeralStore, StoreKey};
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Admission decisions for non-owner traffic.
#[derive(Clone)]
pub struct RateLimiter {
    store: EphemeralStore,
    owner: Identity,
    max: u32,
    window: Duration,
    enabled: bool,
}

impl RateLimiter {
    /// Creates a limiter admitting `max` commands per `window` for each
    /// non-owner identity. With `enabled = false` every call is admitted
    /// without touching the store.
    #[must_use]
    pub fn new(
        store: EphemeralStore,
        owner: Identity,
        max: u32,
        window: Duration,
        enabled: bool,
    ) -> Self {
        Self {
            store,
            owner,
            max,
            window,
            enabled,
        }
    }

    /// Admits or denies one command for `identity`.
    ///
    /// The owner is always admitted and never counted. For everyone else
    /// this is an atomic compare-and-increment on the window counter:
    /// denial does not increment, so a throttled user's window still
    /// expires on schedule.
    pub async fn admit(&self, identity: &Identity) -> bool {
        if !self.enabled || *identity == self.owner {
            return true;
        }

        let counter = self
            .store
            .counter(StoreKey::Rate(identity.clone()), self.window)
            .await;

        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                (count < self.max).then_some(count + 1)
            })
            .is_ok()
    }
}
