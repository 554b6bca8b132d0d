// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the candidate intake service.
//!
//! One request moves through rate check, validation, honeypot check,
//! rendering, and dispatch, with an early exit at each stage. Every
//! failure becomes an HTTP response here; nothing propagates as a
//! fault.

use crate::config::Config;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::mailer::{Email, Mailer};
use crate::render::render_email;
use crate::validator::{honeypot_filled, validate_submission, ValidationErrors};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Fixed rejection text for rate-limited callers.
pub const RATE_LIMIT_MESSAGE: &str = "Limite de envios atingido. Tente novamente mais tarde.";

/// Fixed text when no transport is configured. Deliberately generic so
/// configuration details never reach the caller.
pub const NOT_CONFIGURED_MESSAGE: &str = "Provedor de e-mail não configurado";

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub config: Config,
}

/// Success acknowledgment body.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
}

/// Validation failure body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ValidationErrors,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "candidate-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Extract the caller identity from the forwarding header chain.
///
/// First entry of `x-forwarded-for`, then `x-real-ip`, then the
/// literal `"unknown"`. The value is only trustworthy behind a proxy
/// that normalizes these headers; it is used solely as the rate key.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real = real.trim();
        if !real.is_empty() {
            return real.to_string();
        }
    }

    "unknown".to_string()
}

/// Accept a candidate registration and email it to the intake mailbox.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let ip = client_ip(&headers);
    debug!(ip = %ip, bytes = body.len(), "processing submission");

    // Rate check runs before body parsing so malformed floods are
    // counted too.
    if let RateLimitResult::Limited { retry_after } = state.limiter.check(&ip).await {
        info!(ip = %ip, retry_after_secs = retry_after.as_secs(), "submission rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", retry_after.as_secs().to_string())],
            RATE_LIMIT_MESSAGE,
        )
            .into_response();
    }

    // An unparseable body validates like any other malformed shape.
    let payload = serde_json::from_str::<Value>(&body).unwrap_or(Value::Null);

    let validation = validate_submission(&payload);

    // A filled honeypot wins over every later outcome: the bot gets the
    // same success as a genuine submission, whatever else is wrong with
    // its payload, and nothing downstream runs.
    if honeypot_filled(&payload) {
        info!(ip = %ip, "honeypot filled, silently accepting");
        return (StatusCode::OK, Json(SubmitResponse { ok: true })).into_response();
    }

    let submission = match validation {
        Ok(submission) => submission,
        Err(errors) => {
            info!(ip = %ip, fields = ?errors.field_names(), "validation failed");
            return (StatusCode::BAD_REQUEST, Json(ErrorBody { error: errors })).into_response();
        }
    };

    let Some(mailer) = state.mailer.as_ref() else {
        warn!(ip = %ip, "submission received but no transport is configured");
        return (StatusCode::INTERNAL_SERVER_ERROR, NOT_CONFIGURED_MESSAGE).into_response();
    };

    let email = Email {
        to: state.config.mail.to.clone(),
        from: state.config.mail.from.clone(),
        subject: format!("Cadastro — {} — {}", submission.name, submission.role_title),
        html: render_email(&submission),
    };

    match mailer.send(&email).await {
        Ok(()) => {
            info!(ip = %ip, transport = mailer.name(), "submission dispatched");
            (StatusCode::OK, Json(SubmitResponse { ok: true })).into_response()
        }
        Err(e) => {
            error!(ip = %ip, transport = mailer.name(), error = %e, "dispatch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
