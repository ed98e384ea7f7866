//! Livescore - Live Football Match Simulation & Distribution Engine
//!
//! Simulates live match state from seeded fixtures and serves it to
//! concurrent observers over REST (pull) and WebSocket (push).

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use livescore_backend::api::{create_router, AppState};
use livescore_backend::clock::{Clock, SystemClock};
use livescore_backend::models::{Config, StorageMode};
use livescore_backend::seed;
use livescore_backend::sim::{SimConfig, Simulation, TickScheduler};
use livescore_backend::store::{db::MatchDb, MatchStore};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::from_env()?;
    info!("⚽ Livescore engine starting");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let store = match &config.storage {
        StorageMode::Memory => {
            let matches = seed::fixture_matches(clock.now());
            info!("📊 In-memory store seeded with {} fixtures", matches.len());
            Arc::new(MatchStore::in_memory(matches))
        }
        StorageMode::Sqlite(path) => {
            let db = MatchDb::open(path)?;
            if db.is_empty()? {
                let matches = seed::fixture_matches(clock.now());
                for m in &matches {
                    db.insert_match(m)?;
                }
                info!("📊 Database seeded with {} fixtures", matches.len());
            }
            Arc::new(MatchStore::with_sqlite(db)?)
        }
    };

    let sim_config = SimConfig {
        seed: config.sim_seed,
        ..SimConfig::new(config.tick_interval)
    };
    let sim = Arc::new(Simulation::new(store.clone(), clock.clone(), sim_config));

    let scheduler = TickScheduler::new(sim.clone(), config.tick_interval).start();

    let state = AppState {
        sim,
        store,
        clock,
        push_interval: config.push_interval,
    };

    let app = create_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;

    scheduler.stop().await;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "livescore_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    let _ = dotenv();
}
