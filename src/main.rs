use scoreboard::{
    api::Seed, http, AppState, EventBus, EventSubscription, InMemoryScoreboardApi,
    LeaderboardService, LeaderboardSubscriber, ScoreboardConfig,
};
use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scoreboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ScoreBoard leaderboard server");

    let config = ScoreboardConfig::from_env()?;

    let seed = match &config.seed_path {
        Some(path) => {
            info!(path = %path.display(), "Loading seed data");
            let raw = tokio::fs::read_to_string(path).await?;
            serde_json::from_str::<Seed>(&raw)?
        }
        None => Seed::default(),
    };

    let event_bus = EventBus::new(config.event_capacity);
    let api = Arc::new(InMemoryScoreboardApi::from_seed(seed).with_event_bus(event_bus.clone()));

    let leaderboard_service = Arc::new(
        LeaderboardService::builder(api.clone())
            .with_cache_ttl(config.cache_ttl)
            .with_aggregation_options(config.aggregation_options())
            .build(),
    );

    // Backend changes drive recomputation from here on
    let subscriber = Arc::new(LeaderboardSubscriber::new(
        leaderboard_service.clone(),
        event_bus.clone(),
    ));
    let _subscription = EventSubscription::new(subscriber, event_bus).start();

    if let Err(err) = leaderboard_service.refresh().await {
        warn!(error = %err, "Initial leaderboard load failed");
    }

    // Writes through the backend routes publish the events the subscriber consumes
    let app = http::router(AppState::new(leaderboard_service)).merge(http::backend_router(api));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(bind_addr = %config.bind_addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
