//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-path errors go through
//! `auth::AuthError` / `kernel::error::AppError`.

use auth::{AuthConfig, PgAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Auth configuration
    let auth_config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        // In production every secret comes from the environment
        AuthConfig {
            access_secret: load_secret("AUTH_ACCESS_SECRET")?,
            refresh_secret: load_secret("AUTH_REFRESH_SECRET")?,
            api_key_secret: load_secret("AUTH_API_KEY_SECRET")?,
            admin_secret: env::var("AUTH_ADMIN_SECRET")
                .expect("AUTH_ADMIN_SECRET must be set in production"),
            ..AuthConfig::default()
        }
    };

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    let repo = PgAuthRepository::with_timeout(pool.clone(), auth_config.query_timeout);
    match repo.cleanup_expired().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session cleanup failed, continuing anyway");
        }
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::HeaderName::from_static("x-api-key"),
            header::HeaderName::from_static("x-admin-key"),
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", auth_router(repo, auth_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Decode a base64-encoded 32-byte signing secret from the environment
fn load_secret(name: &str) -> anyhow::Result<[u8; 32]> {
    let encoded =
        env::var(name).unwrap_or_else(|_| panic!("{name} must be set in production"));
    let bytes = general_purpose::STANDARD.decode(&encoded)?;

    let mut secret = [0u8; 32];
    if bytes.len() != secret.len() {
        anyhow::bail!("{name} must decode to exactly {} bytes", secret.len());
    }
    secret.copy_from_slice(&bytes);

    Ok(secret)
}
