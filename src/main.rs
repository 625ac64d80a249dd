use office_ladder::{
    player::models::demo_roster, router, AppConfig, AppError, AppState, InMemoryPlayerStore,
    PlayerStore, PostgresPlayerStore,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "office_ladder=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting office leaderboard server");

    let config = AppConfig::from_env();

    let player_store: Arc<dyn PlayerStore> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_db_connections)
                .connect(database_url)
                .await?;
            info!(max_connections = config.max_db_connections, "Connected to PostgreSQL");
            Arc::new(PostgresPlayerStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory store");
            Arc::new(InMemoryPlayerStore::new())
        }
    };

    if config.seed_demo_roster {
        seed_demo_roster(player_store.as_ref()).await?;
    }

    if config.admin_secret.is_none() {
        warn!("ADMIN_SECRET not set, roster admin routes are disabled");
    }

    let app_state = AppState::new(player_store, config.admin_secret.clone());
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Adds the demo players, leaving any that already exist untouched
async fn seed_demo_roster(store: &dyn PlayerStore) -> Result<(), AppError> {
    let mut seeded = 0;
    for player in demo_roster() {
        match store.create_player(&player).await {
            Ok(_) => seeded += 1,
            Err(AppError::Conflict(_)) => {
                debug!(name = %player.name, "Demo player already exists")
            }
            Err(e) => return Err(e),
        }
    }

    info!(seeded, "Demo roster seeded");
    Ok(())
}
