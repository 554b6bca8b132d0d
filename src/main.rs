// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Candidate Intake Service
//!
//! Receives candidate registration submissions on `POST /submit`,
//! validates them, and emails each one to a fixed intake mailbox:
//!
//! - 5 submissions per IP per 15 minutes (default)
//! - Honeypot spam filtering with a silent success response
//! - Markup stripped from every value before it reaches the email body
//! - Resend HTTP API preferred, direct SMTP fallback
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honored):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `FORM_TO_EMAIL` / `FORM_FROM_EMAIL`: recipient and sender
//! - `RESEND_API_KEY`: cloud API transport credential
//! - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USER` / `SMTP_PASS`: SMTP transport
//! - `RATE_MAX`: Max submissions per window per IP (default: 5)
//! - `RATE_WINDOW_SECS`: Window duration in seconds (default: 900)

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use candidate_intake::{
    config::Config,
    handlers::{health, submit, AppState},
    limiter::RateLimiter,
    mailer::select_mailer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        to = %config.mail.to,
        "Starting candidate intake service"
    );

    // Select the email transport once; a misconfigured deployment still
    // serves, answering dispatch attempts with a fixed 500.
    let mailer = match select_mailer(&config.mail) {
        Ok(mailer) => {
            info!(transport = mailer.name(), "email transport selected");
            Some(mailer)
        }
        Err(e) => {
            warn!(error = %e, "no usable email transport, submissions will be rejected");
            None
        }
    };

    // Create application state
    let limiter = RateLimiter::new(config.rate_limit.clone());
    let state = Arc::new(AppState {
        limiter,
        mailer,
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/submit", post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    let mut config = Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        ..Default::default()
    };

    if let Some(max) = std::env::var("RATE_MAX").ok().and_then(|v| v.parse().ok()) {
        config.rate_limit.max_requests = max;
    }
    if let Some(secs) = std::env::var("RATE_WINDOW_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.rate_limit.window_secs = secs;
    }

    if let Ok(to) = std::env::var("FORM_TO_EMAIL") {
        config.mail.to = to;
    }
    if let Ok(from) = std::env::var("FORM_FROM_EMAIL") {
        config.mail.from = from;
    }
    config.mail.resend_api_key = std::env::var("RESEND_API_KEY").ok();
    config.mail.smtp_host = std::env::var("SMTP_HOST").ok();
    config.mail.smtp_port = std::env::var("SMTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(587);
    config.mail.smtp_user = std::env::var("SMTP_USER").ok();
    config.mail.smtp_password = std::env::var("SMTP_PASS").ok();

    config
}
