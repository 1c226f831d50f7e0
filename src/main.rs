//! Prizebot - chat-triggered prize dispensing

use clap::Parser;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prizebot::{
    config::Args,
    dispatch::Dispatcher,
    gateway::{ChatGateway, NatsGateway},
    store::SledClaimStore,
    verifier::HttpVerifier,
    TriggerEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("prizebot={},info", log_level).into());
    if args.json_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let admins = args.admin_set();

    info!("======================================");
    info!("  Prizebot");
    info!("======================================");
    info!("Bot username: {}", args.nats.bot_username);
    info!("Claim store: {}", args.db_path);
    info!("Showcase team: {}", args.showcase_team);
    info!("Currency: {}", args.rewards.currency);
    info!("Admins: {}", admins.len());
    info!("NATS: {} (prefix {})", args.nats.nats_url, args.nats.subject_prefix);
    info!("Max concurrent handlers: {}", args.max_concurrent_handlers);
    info!("======================================");

    let store = Arc::new(SledClaimStore::open(&args.db_path)?);
    info!(claims = store.len(), "Claim store opened");

    let verifier = Arc::new(HttpVerifier::new(args.verifier_config())?);
    let gateway = Arc::new(NatsGateway::connect(args.gateway_config()).await?);

    let engine = Arc::new(TriggerEngine::new(
        args.engine_config(),
        store.clone(),
        verifier,
        gateway.clone(),
    ));

    if let Err(e) = engine.advertise().await {
        error!(error = %e, "Unable to advertise commands");
        return Err(e.into());
    }

    // Stop reading on ctrl-c; in-flight handlers still finish.
    let messages = gateway
        .listen()
        .await?
        .take_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Unable to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .boxed();

    let stats = Dispatcher::new(engine, args.max_concurrent_handlers)
        .run(messages)
        .await;
    info!(
        received = stats.received,
        read_errors = stats.read_errors,
        panicked = stats.panicked,
        "Dispatch loop stopped"
    );

    store.flush().await?;
    info!("Prizebot stopped");
    Ok(())
}
