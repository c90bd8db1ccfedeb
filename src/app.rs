/*
 * Responsibility
 * - Config読み込み → 依存生成 (RequestGate) → Router 組み立て
 * - Middleware の適用順: http (request-id/trace/limit/timeout) → security headers → gate → routes
 * - axum::serve() で起動
 */
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::{panic, process};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{
    self,
    v1::handlers::{fallback::not_found, health::health},
};
use crate::config::{Config, HttpConfig};
use crate::middleware;
use crate::services::auth::build_request_gate;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,footstars_resource_server=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost".
        tracing::error!(?info, "panic");

        // In development, fail fast. In production, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting resource server in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config.http);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    // Keys and rules are loaded once here and are read-only afterwards.
    let gate = build_request_gate(config).context("failed to build request gate")?;
    Ok(AppState::new(gate))
}

pub fn build_router(state: AppState, http: &HttpConfig) -> Router {
    let router = Router::new()
        .route("/public/health", get(health))
        .nest("/api/v1", api::v1::routes())
        // Set before the gate so unknown paths are gated too.
        .fallback(not_found);

    let router = middleware::auth::access::apply(router, state.clone()).with_state(state);
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, http)
}
