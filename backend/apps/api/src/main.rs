//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use identity::config::{GoogleOAuthConfig, IdentityConfig};
use identity::{GoogleOAuthClient, PgIdentityRepository, identity_router};
use platform::email_domain::DnsDomainChecker;
use platform::mailer::{self, MailerConfig};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

/// Deadline for draining enqueued confirmation mails on shutdown
const MAIL_DRAIN_DEADLINE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,identity=info,platform=info,tower_http=info".into()),
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

    // Startup cleanup: drop stale confirmation tokens past expiry
    // Errors here should not prevent server startup
    let store_for_cleanup = PgIdentityRepository::new(pool.clone());
    match store_for_cleanup.cleanup_expired_tokens().await {
        Ok(deleted) => {
            tracing::info!(tokens_deleted = deleted, "Confirmation token cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Confirmation token cleanup failed, continuing anyway");
        }
    }

    // Identity configuration
    let config = if cfg!(debug_assertions) {
        IdentityConfig {
            google: google_config_from_env(),
            confirm_link_base: confirm_link_base_from_env(),
            ..IdentityConfig::with_random_secret()
        }
    } else {
        // In production, load secrets from environment
        let secret_b64 = env::var("IDENTITY_STATE_SECRET")
            .expect("IDENTITY_STATE_SECRET must be set in production");
        let secret_bytes = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;
        let mut state_secret = [0u8; 32];
        state_secret.copy_from_slice(&secret_bytes);

        let password_pepper = env::var("PASSWORD_PEPPER")
            .ok()
            .map(|p| Engine::decode(&general_purpose::STANDARD, &p))
            .transpose()?;

        IdentityConfig {
            state_secret,
            password_pepper,
            google: google_config_from_env(),
            confirm_link_base: confirm_link_base_from_env(),
            ..IdentityConfig::default()
        }
    };

    // Outbound mail worker (no-op mode when SMTP_HOST is unset)
    let mailer_config = MailerConfig {
        host: env::var("SMTP_HOST").unwrap_or_default(),
        port: env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587),
        from: env::var("SMTP_FROM").unwrap_or_else(|_| "noreply@localhost".to_string()),
        username: env::var("SMTP_USER").ok(),
        password: env::var("SMTP_PASS").ok(),
    };
    let (mail_queue, mail_worker) = mailer::spawn_mailer(mailer_config, mailer::DEFAULT_QUEUE_CAPACITY)?;

    let repo = PgIdentityRepository::new(pool.clone());
    let domains = DnsDomainChecker::default();
    let google = GoogleOAuthClient::new(config.google.clone());

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
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/identity",
            identity_router(
                repo,
                domains,
                std::sync::Arc::new(mail_queue),
                google,
                config,
            ),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain enqueued-but-unsent confirmation mails, bounded
    tracing::info!("Draining mail queue");
    mail_worker.shutdown(MAIL_DRAIN_DEADLINE).await;

    Ok(())
}

fn google_config_from_env() -> GoogleOAuthConfig {
    GoogleOAuthConfig {
        client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
        client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
        redirect_url: env::var("GOOGLE_REDIRECT_URL").unwrap_or_default(),
    }
}

fn confirm_link_base_from_env() -> String {
    env::var("CONFIRM_LINK_BASE")
        .unwrap_or_else(|_| "http://localhost:8080/api/identity/confirm-email".to_string())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
