//! Shared test harness: a recording transport and scripted collaborators.
#![allow(dead_code)] // not every helper is used by every test binary

use anyhow::Result;
use aria_mini::commands::CommandContext;
use aria_mini::config::{MediaSettings, Settings};
use aria_mini::engine::{Engine, InboundMessage};
use aria_mini::identity::Auth;
use aria_mini::interaction::InteractionTracker;
use aria_mini::notify::OwnerNotifier;
use aria_mini::providers::ai::AiCompletion;
use aria_mini::providers::apps::{AppLookup, AppPackage};
use aria_mini::providers::media::{FetchKind, MediaFetch, MediaHit, MediaSearch, ResolvedMedia};
use aria_mini::providers::{create_http_client, ProviderError};
use aria_mini::store::EphemeralStore;
use aria_mini::transport::{
    ContactCard, ConversationId, MediaKind, MessageRef, OutboundMedia, Presence, Transport,
};
use async_trait::async_trait;
use axum::routing::get;
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Owner identity used across tests.
pub const OWNER: &str = "999";

/// Everything the bot sent, in order.
#[derive(Clone, Debug)]
pub enum Outbound {
    Text {
        conversation: String,
        text: String,
    },
    Media {
        conversation: String,
        kind: MediaKind,
        mime_type: String,
        file_name: Option<String>,
        caption: Option<String>,
    },
    Reaction {
        emoji: String,
    },
    Presence,
    Contact {
        display_name: String,
    },
}

/// Transport that records every send and always succeeds.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    events: Arc<Mutex<Vec<Outbound>>>,
}

impl RecordingTransport {
    pub fn events(&self) -> Vec<Outbound> {
        self.events.lock().expect("events lock").clone()
    }

    /// All text sends, as (conversation, text) pairs.
    pub fn texts(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Outbound::Text { conversation, text } => Some((conversation, text)),
                _ => None,
            })
            .collect()
    }

    /// Text sends addressed to one conversation.
    pub fn texts_to(&self, conversation: &str) -> Vec<String> {
        self.texts()
            .into_iter()
            .filter(|(to, _)| to == conversation)
            .map(|(_, text)| text)
            .collect()
    }

    /// All media sends.
    pub fn media(&self) -> Vec<Outbound> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, Outbound::Media { .. }))
            .collect()
    }

    fn record(&self, event: Outbound) {
        self.events.lock().expect("events lock").push(event);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, conversation: &ConversationId, text: &str) -> Result<()> {
        self.record(Outbound::Text {
            conversation: conversation.as_str().to_owned(),
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn send_media(&self, conversation: &ConversationId, media: OutboundMedia) -> Result<()> {
        self.record(Outbound::Media {
            conversation: conversation.as_str().to_owned(),
            kind: media.kind,
            mime_type: media.mime_type,
            file_name: media.file_name,
            caption: media.caption,
        });
        Ok(())
    }

    async fn send_reaction(
        &self,
        _conversation: &ConversationId,
        _message: &MessageRef,
        emoji: &str,
    ) -> Result<()> {
        self.record(Outbound::Reaction {
            emoji: emoji.to_owned(),
        });
        Ok(())
    }

    async fn send_presence(
        &self,
        _state: Presence,
        _conversation: Option<&ConversationId>,
    ) -> Result<()> {
        self.record(Outbound::Presence);
        Ok(())
    }

    async fn send_contact(&self, _conversation: &ConversationId, card: ContactCard) -> Result<()> {
        self.record(Outbound::Contact {
            display_name: card.display_name,
        });
        Ok(())
    }
}

/// Search collaborator scripted with a fixed outcome.
pub struct ScriptedSearch {
    hit: Option<MediaHit>,
    calls: AtomicUsize,
}

impl ScriptedSearch {
    pub fn hit(title: &str, url: &str) -> Self {
        Self {
            hit: Some(MediaHit {
                title: title.to_owned(),
                url: url.to_owned(),
                duration: "3:45".to_owned(),
                thumbnail: None,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn miss() -> Self {
        Self {
            hit: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSearch for ScriptedSearch {
    async fn search(&self, _query: &str) -> Result<Option<MediaHit>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hit.clone())
    }
}

/// Fetch collaborator scripted to resolve or time out.
pub enum ScriptedFetch {
    Resolves(ResolvedMedia),
    TimesOut,
}

impl ScriptedFetch {
    pub fn resolves(title: &str, download_url: &str) -> Self {
        Self::Resolves(ResolvedMedia {
            title: title.to_owned(),
            download_url: download_url.to_owned(),
            duration: "3:45".to_owned(),
        })
    }
}

#[async_trait]
impl MediaFetch for ScriptedFetch {
    async fn fetch(
        &self,
        _canonical_url: &str,
        _kind: FetchKind,
    ) -> Result<ResolvedMedia, ProviderError> {
        match self {
            Self::Resolves(resolved) => Ok(resolved.clone()),
            Self::TimesOut => Err(ProviderError::Timeout),
        }
    }
}

/// Lookup collaborator scripted with a fixed outcome.
pub enum ScriptedLookup {
    Finds(AppPackage),
    Missing,
}

impl ScriptedLookup {
    pub fn finds(name: &str, download_url: &str) -> Self {
        Self::Finds(AppPackage {
            name: name.to_owned(),
            version: Some("1.2.3".to_owned()),
            size: Some("42 MB".to_owned()),
            download_url: download_url.to_owned(),
        })
    }
}

#[async_trait]
impl AppLookup for ScriptedLookup {
    async fn lookup(&self, _app_name: &str) -> Result<AppPackage, ProviderError> {
        match self {
            Self::Finds(package) => Ok(package.clone()),
            Self::Missing => Err(ProviderError::NotFound),
        }
    }
}

/// AI collaborator scripted to answer or time out.
pub enum ScriptedAi {
    Answers(String),
    TimesOut,
}

#[async_trait]
impl AiCompletion for ScriptedAi {
    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ProviderError> {
        match self {
            Self::Answers(answer) => Ok(answer.clone()),
            Self::TimesOut => Err(ProviderError::Timeout),
        }
    }
}

/// Collaborator set with inert defaults.
pub struct Mocks {
    pub search: Arc<dyn MediaSearch>,
    pub fetch: Arc<dyn MediaFetch>,
    pub lookup: Arc<dyn AppLookup>,
    pub ai: Arc<dyn AiCompletion>,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            search: Arc::new(ScriptedSearch::miss()),
            fetch: Arc::new(ScriptedFetch::TimesOut),
            lookup: Arc::new(ScriptedLookup::Missing),
            ai: Arc::new(ScriptedAi::Answers("scripted answer".to_owned())),
        }
    }
}

/// Engine plus probes into its shared state.
pub struct Harness {
    pub engine: Engine,
    pub transport: RecordingTransport,
    pub store: EphemeralStore,
}

/// Settings tuned for fast tests: no delays, no flourishes.
pub fn test_settings() -> Settings {
    Settings {
        telegram_token: String::new(),
        owner: OWNER.to_owned(),
        prefix: ".".to_owned(),
        response_delay_ms: 0,
        rate_limit_max: 20,
        rate_limit_window_secs: 60,
        health_port: 0,
        features: Default::default(),
        apis: Default::default(),
        ai: Default::default(),
        downloads: Default::default(),
        contact: Default::default(),
        media: MediaSettings {
            menu_image_url: None,
            auto_recording: false,
            presence_interval_secs: 30,
        },
        messages: Default::default(),
    }
}

/// Builds an engine over the recording transport with the default
/// five-minute pending window.
pub fn harness(settings: Settings, mocks: Mocks) -> Harness {
    harness_with_pending_ttl(settings, mocks, Duration::from_secs(300))
}

/// Builds an engine with a custom pending-choice TTL.
pub fn harness_with_pending_ttl(settings: Settings, mocks: Mocks, ttl: Duration) -> Harness {
    let settings = Arc::new(settings);
    let transport = RecordingTransport::default();
    let store = EphemeralStore::new();
    let auth = Auth::new(store.clone(), &settings.owner);
    let transport_dyn: Arc<dyn Transport> = Arc::new(transport.clone());
    let notifier = OwnerNotifier::new(
        transport_dyn.clone(),
        ConversationId::new(OWNER),
        store.clone(),
    );

    let ctx = CommandContext {
        settings,
        transport: transport_dyn,
        store: store.clone(),
        auth,
        interactions: InteractionTracker::with_ttl(store.clone(), ttl),
        notifier,
        media_search: mocks.search,
        media_fetch: mocks.fetch,
        app_lookup: mocks.lookup,
        ai: mocks.ai,
        http: create_http_client(Duration::from_secs(5)),
        started_at: Instant::now(),
    };

    Harness {
        engine: Engine::new(ctx),
        transport,
        store,
    }
}

/// Inbound message without a reaction reference.
pub fn inbound(conversation: &str, sender: &str, text: &str) -> InboundMessage {
    InboundMessage {
        conversation: ConversationId::new(conversation),
        sender: sender.to_owned(),
        display_name: Some("Tester".to_owned()),
        text: text.to_owned(),
        message_ref: None,
    }
}

/// Serves a fixed payload over local HTTP and returns its URL.
pub async fn serve_payload(payload: &'static [u8]) -> String {
    let app = Router::new().route("/file", get(move || async move { payload }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("test server addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/file")
}
