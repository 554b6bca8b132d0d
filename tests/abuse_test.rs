// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse-pattern tests for the candidate intake endpoint.
//!
//! These simulate the two abuse surfaces this service has: request
//! floods against the rate window, and bot runs that fill the hidden
//! honeypot field.

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use candidate_intake::{
    config::{Config, RateLimitConfig},
    handlers::{submit, AppState},
    limiter::RateLimiter,
    mailer::{Email, MailError, Mailer},
};
use serde_json::{json, Value};

#[derive(Default)]
struct CountingMailer {
    sent: Mutex<usize>,
}

impl CountingMailer {
    fn count(&self) -> usize {
        *self.sent.lock().unwrap()
    }
}

#[async_trait]
impl Mailer for CountingMailer {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn send(&self, _email: &Email) -> Result<(), MailError> {
        *self.sent.lock().unwrap() += 1;
        Ok(())
    }
}

fn state_with(max_requests: u32) -> (Arc<AppState>, Arc<CountingMailer>) {
    let mailer = Arc::new(CountingMailer::default());
    let state = Arc::new(AppState {
        limiter: RateLimiter::new(RateLimitConfig {
            max_requests,
            ..Default::default()
        }),
        mailer: Some(mailer.clone() as Arc<dyn Mailer>),
        config: Config::default(),
    });
    (state, mailer)
}

fn payload() -> Value {
    json!({
        "name": "Ana Silva",
        "city": "Recife",
        "phone": "81999998888",
        "startDate": "2024-01-10",
        "contractType": "CLT",
        "roleTitle": "Auxiliar",
        "shift": "Manhã",
        "transitAllowance": "12,00",
        "pixKey": "ana@x.com",
        "bank": "Nubank",
        "supervisorName": "Carlos",
        "honeypot": ""
    })
}

async fn fire(state: &Arc<AppState>, ip: &str, body: String) -> StatusCode {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_str(ip).unwrap());
    submit(State(state.clone()), headers, body).await.status()
}

#[tokio::test]
async fn test_single_ip_flood_is_capped_at_the_window_max() {
    let (state, mailer) = state_with(5);

    let mut admitted = 0;
    let mut limited = 0;
    for _ in 0..50 {
        match fire(&state, "203.0.113.50", payload().to_string()).await {
            StatusCode::OK => admitted += 1,
            StatusCode::TOO_MANY_REQUESTS => limited += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(admitted, 5);
    assert_eq!(limited, 45);
    assert_eq!(mailer.count(), 5);
}

#[tokio::test]
async fn test_distributed_bot_run_never_dispatches() {
    let (state, mailer) = state_with(5);

    // Each bot comes from its own IP, so the rate window never trips;
    // the filled honeypot still filters every one of them silently.
    for i in 0..30 {
        let mut body = payload();
        body["honeypot"] = json!("https://spam.example/offer");

        let ip = format!("10.0.{}.{}", i / 256, i % 256);
        let status = fire(&state, &ip, body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(mailer.count(), 0);
}

#[tokio::test]
async fn test_malformed_flood_consumes_the_window() {
    let (state, mailer) = state_with(5);

    for _ in 0..5 {
        let status = fire(&state, "203.0.113.51", "garbage".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // The window is spent on garbage; a valid submission from the same
    // caller is now rejected before parsing.
    let status = fire(&state, "203.0.113.51", payload().to_string()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(mailer.count(), 0);
}

#[tokio::test]
async fn test_spoofed_forwarding_headers_split_the_window() {
    let (state, mailer) = state_with(2);

    // Spoofable header values land in separate windows; the fronting
    // proxy is expected to normalize them. This pins the documented
    // behavior rather than wishing it away.
    for ip in ["1.1.1.1", "2.2.2.2", "3.3.3.3"] {
        let status = fire(&state, ip, payload().to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(mailer.count(), 3);
}

#[tokio::test]
async fn test_headerless_callers_share_one_window() {
    let (state, mailer) = state_with(2);

    // No forwarding headers at all: everyone is "unknown" and shares a
    // single window.
    let mut admitted = 0;
    for _ in 0..5 {
        let status = submit(
            State(state.clone()),
            HeaderMap::new(),
            payload().to_string(),
        )
        .await
        .status();
        if status == StatusCode::OK {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 2);
    assert_eq!(mailer.count(), 2);
}
