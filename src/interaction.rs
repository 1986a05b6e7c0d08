//! Pending-interaction state machine.
//!
//! A successful single-result media search opens a pending choice for
//! the (conversation, identity) pair that issued it: the next
//! non-prefixed message from that pair which is exactly `1` or `2`
//! consumes the record and selects the delivery format. Anything else
//! leaves the record untouched; expiry is passive via the store TTL and
//! sends no notification.

use crate::identity::Identity;
use crate::store::{EphemeralStore, StoreKey, StoreValue};
use crate::transport::ConversationId;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// How long a pending choice stays open.
pub const PENDING_CHOICE_TTL: Duration = Duration::from_secs(300);

/// What kind of media the pending download refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingKind {
    /// Audio track; inline delivery sends audio, document delivery an `.mp3`
    Song,
    /// Video; inline delivery sends video, document delivery an `.mp4`
    Video,
}

/// Delivery format chosen by the follow-up reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryFormat {
    /// Reply `1`: inline media message
    Inline,
    /// Reply `2`: document attachment with a derived filename
    Document,
}

/// Ephemeral record of an open two-step download command.
#[derive(Clone, Debug)]
pub struct PendingInteraction {
    /// Conversation the search was issued in
    pub conversation: ConversationId,
    /// Identity that issued the search
    pub identity: Identity,
    /// Canonical URL of the single search result
    pub subject_url: String,
    /// Result title, used for captions and filenames
    pub title: String,
    /// Song or video
    pub kind: PendingKind,
    /// When the choice was offered
    pub created_at: DateTime<Utc>,
}

/// Tracks open pending choices in the shared store.
#[derive(Clone)]
pub struct InteractionTracker {
    store: EphemeralStore,
    ttl: Duration,
}

impl InteractionTracker {
    /// Creates a tracker with the standard five-minute window.
    #[must_use]
    pub fn new(store: EphemeralStore) -> Self {
        Self::with_ttl(store, PENDING_CHOICE_TTL)
    }

    /// Creates a tracker with a custom window. Test hook.
    #[must_use]
    pub const fn with_ttl(store: EphemeralStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Opens a pending choice, replacing any previous one for the same
    /// (conversation, identity) pair.
    pub async fn open(&self, pending: PendingInteraction) {
        let key = StoreKey::Pending(pending.conversation.clone(), pending.identity.clone());
        self.store
            .insert(key, StoreValue::Pending(Arc::new(pending)), Some(self.ttl))
            .await;
    }

    /// Resolves a non-prefixed reply against the open choice, if any.
    ///
    /// Consumes the record only when `text` is exactly one of the two
    /// accepted tokens; the take is atomic, so a choice is honored at
    /// most once. Any other text returns `None` and leaves the record
    /// in place for the remainder of its TTL.
    pub async fn resolve(
        &self,
        conversation: &ConversationId,
        identity: &Identity,
        text: &str,
    ) -> Option<(PendingInteraction, DeliveryFormat)> {
        let format = match text.trim() {
            "1" => DeliveryFormat::Inline,
            "2" => DeliveryFormat::Document,
            _ => return None,
        };

        let key = StoreKey::Pending(conversation.clone(), identity.clone());
        match self.store.remove(&key).await {
            Some(StoreValue::Pending(pending)) => Some(((*pending).clone(), format)),
            _ => None,
        }
    }

    /// Whether a choice is currently open for the pair.
    pub async fn is_open(&self, conversation: &ConversationId, identity: &Identity) -> bool {
        self.store
            .contains(&StoreKey::Pending(conversation.clone(), identity.clone()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(conversation: &str, identity: &str, kind: PendingKind) -> PendingInteraction {
        PendingInteraction {
            conversation: ConversationId::new(conversation),
            identity: Identity::canonicalize(identity),
            subject_url: "https://example.com/watch?v=abc".to_owned(),
            title: "Test Track".to_owned(),
            kind,
            created_at: Utc::now(),
        }
    }

    fn tracker() -> InteractionTracker {
        InteractionTracker::new(EphemeralStore::new())
    }

    #[tokio::test]
    async fn reply_one_selects_inline() {
        let tracker = tracker();
        tracker.open(pending("chat", "100", PendingKind::Song)).await;

        let resolved = tracker
            .resolve(&ConversationId::new("chat"), &Identity::canonicalize("100"), "1")
            .await;

        let (interaction, format) = resolved.expect("choice should resolve");
        assert_eq!(format, DeliveryFormat::Inline);
        assert_eq!(interaction.kind, PendingKind::Song);
    }

    #[tokio::test]
    async fn reply_two_selects_document() {
        let tracker = tracker();
        tracker.open(pending("chat", "100", PendingKind::Video)).await;

        let resolved = tracker
            .resolve(&ConversationId::new("chat"), &Identity::canonicalize("100"), " 2 ")
            .await;

        assert_eq!(
            resolved.expect("choice should resolve").1,
            DeliveryFormat::Document
        );
    }

    #[tokio::test]
    async fn other_text_leaves_choice_open() {
        let tracker = tracker();
        let conversation = ConversationId::new("chat");
        let identity = Identity::canonicalize("100");
        tracker.open(pending("chat", "100", PendingKind::Song)).await;

        assert!(tracker.resolve(&conversation, &identity, "3").await.is_none());
        assert!(tracker.resolve(&conversation, &identity, "yes please").await.is_none());
        assert!(tracker.is_open(&conversation, &identity).await);
    }

    #[tokio::test]
    async fn choice_is_consumed_exactly_once() {
        let tracker = tracker();
        let conversation = ConversationId::new("chat");
        let identity = Identity::canonicalize("100");
        tracker.open(pending("chat", "100", PendingKind::Song)).await;

        assert!(tracker.resolve(&conversation, &identity, "1").await.is_some());
        assert!(tracker.resolve(&conversation, &identity, "1").await.is_none());
    }

    #[tokio::test]
    async fn pairs_are_tracked_independently() {
        let tracker = tracker();
        tracker.open(pending("chat", "100", PendingKind::Song)).await;

        assert!(tracker
            .resolve(&ConversationId::new("chat"), &Identity::canonicalize("200"), "1")
            .await
            .is_none());
        assert!(tracker
            .resolve(&ConversationId::new("other"), &Identity::canonicalize("100"), "1")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn choice_expires_after_ttl() {
        let tracker =
            InteractionTracker::with_ttl(EphemeralStore::new(), Duration::from_millis(40));
        let conversation = ConversationId::new("chat");
        let identity = Identity::canonicalize("100");
        tracker.open(pending("chat", "100", PendingKind::Song)).await;

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(!tracker.is_open(&conversation, &identity).await);
        assert!(tracker.resolve(&conversation, &identity, "1").await.is_none());
    }

    #[tokio::test]
    async fn choice_is_consumable_just_before_ttl() {
        let tracker =
            InteractionTracker::with_ttl(EphemeralStore::new(), Duration::from_millis(100));
        let conversation = ConversationId::new("chat");
        let identity = Identity::canonicalize("100");
        tracker.open(pending("chat", "100", PendingKind::Song)).await;

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(tracker.resolve(&conversation, &identity, "1").await.is_some());
    }
}
