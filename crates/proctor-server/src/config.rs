//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};
use proctor_shared::constants::DEFAULT_HTTP_PORT;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:4000`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `None` (platform data directory).
    pub database_path: Option<PathBuf>,

    /// Shared secret the identity gateway sends in `x-gateway-secret`.
    /// Env: `GATEWAY_SECRET`
    /// Default: `None` (identity headers trusted as-is).
    pub gateway_secret: Option<String>,

    /// Emails that receive the ADMIN role when first seen.
    /// Env: `BOOTSTRAP_ADMIN_EMAILS` (comma separated)
    pub bootstrap_admin_emails: Vec<String>,

    /// Zone used for calendar days and the reschedule slot grid.
    /// Env: `SCHEDULE_UTC_OFFSET` (`+02:00`, `-05:30`, `Z`)
    /// Default: UTC
    pub schedule_offset: FixedOffset,

    /// Seed demo courses, rooms, exams and resources on startup.
    /// Env: `SEED_DEMO_DATA` (true/false)
    /// Default: `false`
    pub seed_demo_data: bool,

    /// Single allowed CORS origin.
    /// Env: `CORS_ORIGIN`
    /// Default: `None` (any origin).
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            gateway_secret: None,
            bootstrap_admin_emails: Vec::new(),
            schedule_offset: utc(),
            seed_demo_data: false,
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            if !path.is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }

        if let Some(secret) = lookup("GATEWAY_SECRET") {
            if !secret.is_empty() {
                config.gateway_secret = Some(secret);
            }
        }

        if let Some(emails) = lookup("BOOTSTRAP_ADMIN_EMAILS") {
            config.bootstrap_admin_emails = parse_email_list(&emails);
        }

        if let Some(offset) = lookup("SCHEDULE_UTC_OFFSET") {
            match parse_utc_offset(&offset) {
                Ok(parsed) => config.schedule_offset = parsed,
                Err(e) => {
                    tracing::warn!(value = %offset, error = %e, "Invalid SCHEDULE_UTC_OFFSET, using UTC");
                }
            }
        }

        if let Some(val) = lookup("SEED_DEMO_DATA") {
            config.seed_demo_data = val == "true" || val == "1";
        }

        if let Some(origin) = lookup("CORS_ORIGIN") {
            if !origin.is_empty() && origin != "*" {
                config.cors_origin = Some(origin);
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn is_bootstrap_admin(&self, email: &str) -> bool {
        self.bootstrap_admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Parse `Z`, `+HH:MM` or `-HH:MM` into a fixed offset.
fn parse_utc_offset(raw: &str) -> Result<FixedOffset, String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => return Err(format!("expected a leading + or -, got {raw:?}")),
    };
    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got {rest:?}"))?;
    let hours: i32 = hours.parse().map_err(|_| format!("invalid hours: {hours:?}"))?;
    let minutes: i32 = minutes.parse().map_err(|_| format!("invalid minutes: {minutes:?}"))?;
    if hours > 14 || minutes > 59 {
        return Err(format!("offset out of range: {raw}"));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(|| format!("offset out of range: {raw}"))
}
