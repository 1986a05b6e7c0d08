use aria_mini::commands::CommandContext;
use aria_mini::config::Settings;
use aria_mini::engine::{Engine, InboundMessage};
use aria_mini::health::{self, HealthState};
use aria_mini::identity::Auth;
use aria_mini::interaction::InteractionTracker;
use aria_mini::notify::OwnerNotifier;
use aria_mini::providers::ai::HttpAiCompletion;
use aria_mini::providers::apps::HttpAppLookup;
use aria_mini::providers::create_http_client;
use aria_mini::providers::media::{HttpMediaFetch, HttpMediaSearch};
use aria_mini::store::EphemeralStore;
use aria_mini::telegram::TelegramTransport;
use aria_mini::transport::{ConversationId, MessageRef, Presence, Transport};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::{Duration, Instant};
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{debug, error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Default timeout for collaborator HTTP calls that do not set their own.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    init_logging();

    info!("🤖 Starting Aria Mini...");

    let settings = init_settings();
    info!(
        owner = %settings.owner,
        prefix = %settings.prefix,
        engine = %settings.ai.engine,
        "configuration loaded"
    );

    let bot = Bot::new(settings.telegram_token.clone());
    let started_at = Instant::now();
    let engine = Arc::new(build_engine(&settings, &bot, started_at));

    spawn_health_server(&settings, started_at);
    spawn_presence_loop(
        engine.context().transport.clone(),
        Duration::from_secs(settings.media.presence_interval_secs),
    );

    // Startup summary for the owner; best effort.
    engine.context().notifier.startup(&settings).await;

    info!("🚀 Aria Mini is online and ready to serve");

    Dispatcher::builder(bot, setup_handler())
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    }
}

fn build_engine(settings: &Arc<Settings>, bot: &Bot, started_at: Instant) -> Engine {
    let store = EphemeralStore::new();
    let auth = Auth::new(store.clone(), &settings.owner);
    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot.clone()));
    let http = create_http_client(HTTP_TIMEOUT);

    let apis = &settings.apis;
    let media_search = Arc::new(HttpMediaSearch::new(
        http.clone(),
        apis.search_url.clone(),
        apis.api_key.clone(),
    ));
    let media_fetch = Arc::new(HttpMediaFetch::new(
        http.clone(),
        apis.audio_url.clone(),
        apis.video_url.clone(),
        apis.api_key.clone(),
        settings.download_timeout(),
    ));
    let app_lookup = Arc::new(HttpAppLookup::new(
        http.clone(),
        apis.apk_url.clone(),
        apis.api_key.clone(),
        settings.download_timeout(),
    ));
    let ai = Arc::new(HttpAiCompletion::new(
        http.clone(),
        apis.ai_url.clone(),
        apis.api_key.clone(),
    ));

    let notifier = OwnerNotifier::new(
        transport.clone(),
        ConversationId::new(auth.owner().as_str()),
        store.clone(),
    );
    let interactions = InteractionTracker::new(store.clone());

    Engine::new(CommandContext {
        settings: settings.clone(),
        transport,
        store,
        auth,
        interactions,
        notifier,
        media_search,
        media_fetch,
        app_lookup,
        ai,
        http,
        started_at,
    })
}

fn spawn_health_server(settings: &Arc<Settings>, started_at: Instant) {
    let state = Arc::new(HealthState {
        started_at,
        features: settings.features.clone(),
    });
    let port = settings.health_port;
    tokio::spawn(async move {
        if let Err(error) = health::serve(port, state).await {
            error!(%error, "health server terminated");
        }
    });
}

/// Fire-and-forget presence refresh, independent of message processing.
fn spawn_presence_loop(transport: Arc<dyn Transport>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(error) = transport.send_presence(Presence::Available, None).await {
                debug!(%error, "presence refresh failed");
            }
        }
    });
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message().endpoint(on_message)
}

async fn on_message(msg: Message, engine: Arc<Engine>) -> ResponseResult<()> {
    if let Some(inbound) = inbound_from_message(&msg) {
        engine.handle_inbound(inbound).await;
    }
    Ok(())
}

fn inbound_from_message(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text()?.to_owned();
    let sender = msg.from.as_ref()?;
    Some(InboundMessage {
        conversation: ConversationId::new(msg.chat.id.0.to_string()),
        sender: sender.id.0.to_string(),
        display_name: Some(sender.full_name()),
        text,
        message_ref: Some(MessageRef(msg.id.0.to_string())),
    })
}
