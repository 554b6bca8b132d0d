// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Candidate Intake Service
//!
//! This crate receives candidate registration submissions and forwards
//! them by email to a fixed recipient:
//!
//! - Per-IP fixed-window rate limiting (5 per 15 minutes default)
//! - Field validation with a structured per-field error map
//! - Honeypot spam filtering (silent success, no dispatch)
//! - Markup stripping before the values reach the email body
//! - Pluggable transports: Resend HTTP API preferred, SMTP fallback

pub mod config;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod render;
pub mod validator;

pub use config::Config;
pub use limiter::{RateLimitResult, RateLimiter};
pub use mailer::{Email, MailError, Mailer};
pub use validator::{Submission, ValidationErrors};
