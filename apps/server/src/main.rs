mod alert_layer;
mod auth;
mod db;
mod handlers;
mod models;
mod notify;
mod rate_limit;
mod rules;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use chrono::FixedOffset;
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use notify::{Notifier, SmsConfig};
use rate_limit::{
    rate_limit_admin, rate_limit_booking, rate_limit_contact, rate_limit_public, RateLimiter,
    TierConfig,
};

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub admin_secret: String,
    /// Fixed business-local offset; all window rules evaluate in it.
    pub business_offset: FixedOffset,
    pub notifier: Notifier,
    pub started_at: Instant,
}

/// Rate limit cleanup interval (seconds).
const RATE_LIMIT_CLEANUP_SECS: u64 = 300;

fn business_offset_from_env() -> FixedOffset {
    let hours: i32 = std::env::var("BUSINESS_UTC_OFFSET_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(-6);
    FixedOffset::east_opt(hours * 3600).expect("BUSINESS_UTC_OFFSET_HOURS out of range")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // ── Required env vars ──
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:millies.db?mode=rwc".into());
    let admin_secret = std::env::var("ADMIN_SECRET").expect("ADMIN_SECRET must be set");

    // ── Tracing: console + optional SMS alerts on errors ──
    let env_filter = EnvFilter::from_default_env().add_directive("info".parse()?);
    let fmt_layer = tracing_subscriber::fmt::layer();
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    let alert_sms = match (
        std::env::var("TWILIO_ACCOUNT_SID"),
        std::env::var("TWILIO_AUTH_TOKEN"),
        std::env::var("TWILIO_FROM_NUMBER"),
        std::env::var("ALERT_SMS_TO"),
    ) {
        (Ok(account_sid), Ok(auth_token), Ok(from), Ok(to)) => Some(SmsConfig {
            account_sid,
            auth_token,
            from,
            to,
        }),
        _ => None,
    };
    if let Some(sms) = alert_sms {
        registry.with(alert_layer::SmsAlertLayer::new(sms)).init();
    } else {
        registry.init();
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let business_offset = business_offset_from_env();
    let webapp_url =
        std::env::var("WEBAPP_URL").unwrap_or_else(|_| "https://example.com".into());

    // ── Database ──
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    db::run_migrations(&pool).await?;

    let state = Arc::new(AppState {
        db: pool,
        admin_secret,
        business_offset,
        notifier: Notifier::from_env(),
        started_at: Instant::now(),
    });

    // ── Rate limiter ──
    let rate_limiter = RateLimiter::new();
    rate_limiter.add_tier(
        "public",
        TierConfig {
            max_requests: 60,
            window: Duration::from_secs(60),
        },
    );
    rate_limiter.add_tier(
        "booking",
        TierConfig {
            max_requests: 5,
            window: Duration::from_secs(300),
        },
    );
    rate_limiter.add_tier(
        "contact",
        TierConfig {
            max_requests: 3,
            window: Duration::from_secs(600),
        },
    );
    rate_limiter.add_tier(
        "admin",
        TierConfig {
            max_requests: 120,
            window: Duration::from_secs(60),
        },
    );

    // ── Background task: cleanup stale rate limit entries ──
    let cleanup_limiter = rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(RATE_LIMIT_CLEANUP_SECS));
        loop {
            interval.tick().await;
            cleanup_limiter.cleanup();
        }
    });

    // ── CORS: whitelist WEBAPP_URL when configured, otherwise allow any ──
    let cors = if webapp_url != "https://example.com" {
        let origins: Vec<axum::http::HeaderValue> = vec![
            webapp_url.parse().expect("WEBAPP_URL must be a valid URL"),
            "http://localhost:5173".parse().unwrap(), // Vite dev server
        ];
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // ── Router (5 groups with per-group rate limits) ──

    // 1. No-limit: health checks
    let no_limit_routes = Router::new().route("/api/health", get(handlers::health::health));

    // 2. Public: read-only endpoints (60 req/min)
    let public_routes = Router::new()
        .route("/api/services", get(handlers::public::list_services))
        .route("/api/bookings", get(handlers::public::list_booked_slots))
        .route("/api/availability", get(handlers::public::availability))
        .route("/api/reviews", get(handlers::reviews::list_reviews))
        .layer(from_fn_with_state(rate_limiter.clone(), rate_limit_public));

    // 3. Booking creation: strictest limit (5 req/5min)
    let booking_routes = Router::new()
        .route("/api/book", post(handlers::booking::create_booking))
        .layer(from_fn_with_state(rate_limiter.clone(), rate_limit_booking));

    // 4. Contact-like submissions (3 req/10min)
    let contact_routes = Router::new()
        .route("/api/contact", post(handlers::contact::submit_contact))
        .route("/api/reviews", post(handlers::reviews::create_review))
        .layer(from_fn_with_state(rate_limiter.clone(), rate_limit_contact));

    // 5. Admin: session endpoints + dashboard (120 req/min)
    let admin_routes = Router::new()
        .route("/api/admin/login", post(handlers::admin::login))
        .route("/api/admin/logout", post(handlers::admin::logout))
        .route("/api/admin/me", get(handlers::admin::me))
        .route(
            "/api/admin/bookings",
            get(handlers::admin::list_bookings)
                .patch(handlers::admin::update_booking)
                .delete(handlers::admin::delete_booking),
        )
        .layer(from_fn_with_state(rate_limiter.clone(), rate_limit_admin));

    let app = Router::new()
        .merge(no_limit_routes)
        .merge(public_routes)
        .merge(booking_routes)
        .merge(contact_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    tracing::info!("Millie's Pet Service server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
