//! Owner notification and support-ticket escalation.
//!
//! Specific events (support requests, startup, alerts) are formatted
//! and routed to the configured owner conversation. Delivery failures
//! are logged and swallowed; a broken owner channel must never take
//! down message processing for everyone else.

use crate::config::Settings;
use crate::identity::Identity;
use crate::store::{EphemeralStore, StoreKey, StoreValue};
use crate::transport::{ConversationId, Transport};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// A filed customer-care request. Never expires within the process
/// lifetime; the id is echoed back to the requester for correlation.
#[derive(Clone, Debug)]
pub struct SupportTicket {
    /// Time-based id (epoch milliseconds at creation)
    pub id: u64,
    /// Canonical identity of the requester
    pub identity: Identity,
    /// Display name of the requester
    pub display_name: String,
    /// Free-text problem description
    pub problem: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Routes escalations to the owner conversation.
#[derive(Clone)]
pub struct OwnerNotifier {
    transport: Arc<dyn Transport>,
    owner_chat: ConversationId,
    store: EphemeralStore,
}

impl OwnerNotifier {
    /// Creates a notifier targeting the owner's direct conversation.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        owner_chat: ConversationId,
        store: EphemeralStore,
    ) -> Self {
        Self {
            transport,
            owner_chat,
            store,
        }
    }

    /// Sends an alert to the owner. Failures are logged and swallowed.
    pub async fn alert(&self, text: &str) {
        let message = format!("🔔 Aria Mini Alert:\n{text}");
        if let Err(error) = self.transport.send_text(&self.owner_chat, &message).await {
            warn!(%error, "failed to notify owner");
        }
    }

    /// Sends the startup summary with the effective feature switches.
    pub async fn startup(&self, settings: &Settings) {
        let on_off = |enabled: bool| if enabled { "✅ Enabled" } else { "❌ Disabled" };
        let features = &settings.features;
        let summary = format!(
            "🤖 <b>Aria Mini started successfully!</b>\n\n\
             🧠 AI Engine: {engine}\n\n\
             <b>Configuration:</b>\n\
             • AI Features: {ai}\n\
             • Downloads: {downloads}\n\
             • APK Downloads: {apk}\n\
             • Customer Care: {care}\n\
             • Rate Limiting: {rate}",
            engine = settings.ai.engine,
            ai = on_off(features.enable_ai),
            downloads = on_off(features.enable_downloads),
            apk = on_off(features.enable_apk_downloads),
            care = on_off(features.enable_customer_care),
            rate = on_off(features.enable_rate_limiting),
        );
        self.alert(&summary).await;
    }

    /// Files a support ticket, forwards it to the owner and returns it.
    ///
    /// Exactly one ticket is stored and exactly one owner notification
    /// is sent per call; the caller acknowledges the requester.
    pub async fn file_ticket(
        &self,
        identity: Identity,
        display_name: &str,
        problem: &str,
    ) -> SupportTicket {
        let created_at = Utc::now();
        let id = u64::try_from(created_at.timestamp_millis()).unwrap_or_default();

        let ticket = SupportTicket {
            id,
            identity,
            display_name: display_name.to_owned(),
            problem: problem.to_owned(),
            created_at,
        };

        self.store
            .insert(
                StoreKey::Ticket(id),
                StoreValue::Ticket(Arc::new(ticket.clone())),
                None,
            )
            .await;

        info!(ticket_id = id, user = %ticket.identity, "support ticket filed");

        let forward = format!(
            "🆘 <b>Customer Care Request #{id}</b>\n\n\
             👤 User: {name}\n\
             📱 Identity: {identity}\n\
             ❓ Problem: {problem}\n\
             🕐 Time: {time}\n\n\
             Please respond to help this user!",
            name = html_escape::encode_text(&ticket.display_name),
            identity = ticket.identity,
            problem = html_escape::encode_text(&ticket.problem),
            time = created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
        self.alert(&forward).await;

        ticket
    }
}
