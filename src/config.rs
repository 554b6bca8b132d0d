// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the candidate intake service.
//!
//! Defaults match the production deployment: 5 submissions per IP per
//! 15-minute window, mail delivered to the fixed intake mailbox.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the candidate intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Mail delivery configuration
    #[serde(default)]
    pub mail: MailConfig,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window per caller (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window duration in seconds (default: 900)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Mail delivery configuration.
///
/// At least one transport's full credential set must be present for
/// dispatch to succeed: `resend_api_key` alone, or `smtp_host` +
/// `smtp_user` + `smtp_password` together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Recipient address for every submission
    #[serde(default = "default_to")]
    pub to: String,

    /// Sender address
    #[serde(default = "default_from")]
    pub from: String,

    /// Resend API key; when set, the HTTP API transport is used
    #[serde(default)]
    pub resend_api_key: Option<String>,

    /// SMTP server hostname
    #[serde(default)]
    pub smtp_host: Option<String>,

    /// SMTP server port (default: 587; 465 selects implicit TLS)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username
    #[serde(default)]
    pub smtp_user: Option<String>,

    /// SMTP password
    #[serde(default)]
    pub smtp_password: Option<String>,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    900 // 15 minutes
}

fn default_to() -> String {
    "contato@klfacilities.com.br".to_string()
}

fn default_from() -> String {
    "nao-responder@klfacilities.com.br".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            to: default_to(),
            from: default_from(),
            resend_api_key: None,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_password: None,
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}
