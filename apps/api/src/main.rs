use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use storefront_api::api::build_router;
use storefront_api::config::{AppConfig, PaymentProvider, StoreBackend};
use storefront_api::domain::payments::PaymentGateway;
use storefront_api::infrastructure::db;
use storefront_api::infrastructure::memory::MemoryStore;
use storefront_api::infrastructure::payments::{SimulatedGateway, StripeGateway};
use storefront_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(production = config.production, payments = ?config.payments, "Configuration loaded");

    let payments: Arc<dyn PaymentGateway> = match &config.payments {
        PaymentProvider::Simulated => {
            tracing::warn!("Using the simulated payment gateway");
            Arc::new(SimulatedGateway::new())
        }
        PaymentProvider::Stripe { secret_key } => Arc::new(StripeGateway::new(secret_key.clone())),
    };

    let state = match &config.store {
        StoreBackend::Postgres {
            url,
            max_connections,
        } => {
            let pool = db::create_pool(url, *max_connections).await?;
            db::run_migrations(&pool).await?;
            AppState::postgres(pool, payments, config.auth.clone())
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            AppState::in_memory(MemoryStore::new(), payments, config.auth.clone())
        }
    };

    // Configure CORS
    let origins = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        .allow_credentials(true);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
