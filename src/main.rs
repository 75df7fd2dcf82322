// Main entry point - Dependency injection and server setup
use std::net::SocketAddr;
use std::sync::Arc;

use flight_relay::application::beacon_service::BeaconService;
use flight_relay::application::broadcaster::Broadcaster;
use flight_relay::application::change_feed::FeedFilter;
use flight_relay::application::relay_service::RelayService;
use flight_relay::infrastructure::config::load_relay_config;
use flight_relay::infrastructure::http_change_feed::HttpChangeFeed;
use flight_relay::presentation::app_state::AppState;
use flight_relay::presentation::router::create_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_relay_config()?;

    // Shared fan-out for both channels
    let broadcaster = Broadcaster::new(config.broadcast.capacity);

    // Change feed relay (infrastructure adapter behind the application trait)
    let feed = Arc::new(HttpChangeFeed::new(
        config.feed.url.clone(),
        config.feed.database.clone(),
        config.feed.table.clone(),
    ));
    let relay = RelayService::new(
        feed,
        FeedFilter::new(config.feed.filter_field.clone(), config.feed.filter_value.clone()),
        broadcaster.clone(),
    );
    tokio::spawn(async move {
        match relay.run().await {
            Ok(()) => tracing::warn!("relay stopped: change feed ended"),
            Err(e) => tracing::error!("relay stopped: {}", e),
        }
    });

    // Synthetic beacon, unrelated to the feed
    if config.beacon.enabled {
        let beacon = BeaconService::new(broadcaster.clone(), config.beacon.period());
        tokio::spawn(beacon.run());
    }

    // Build router (presentation layer)
    let state = Arc::new(AppState { broadcaster });
    let router = create_router(state, &config.server.static_dir);

    // Start server
    let addr: SocketAddr = config.server.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
