use crate::{
    code::DEFAULT_CODE_LENGTH,
    link::{DEFAULT_QR_ENDPOINT, DEFAULT_QR_SIZE, DEFAULT_SHORT_BASE},
    session::ResetPolicy,
};
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Prefix of every short URL, e.g. "https://short.ly".
    /// Stored without a trailing slash.
    pub short_base_url: String,

    /// QR image service the generated references point at
    pub qr_endpoint: String,

    /// Edge length of the QR image in pixels
    pub qr_size: u32,

    /// Length of randomly generated codes
    pub code_length: usize,

    /// Simulated network latency of a submission
    pub submit_delay: Duration,

    /// Upper bound on a whole submission; exceeding it fails the submission
    pub submit_timeout: Duration,

    /// How long the "copied" confirmation stays visible
    pub copied_reset: Duration,

    /// What `reset` clears besides the derived result
    pub reset_policy: ResetPolicy,

    /// Sessions untouched for this long are dropped
    pub session_idle_hours: u64,

    /// When set, all randomness comes from a seeded generator
    pub rng_seed: Option<u64>,

    /// When false every copy attempt fails, as with a browser that denies
    /// clipboard access
    pub clipboard_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            short_base_url: DEFAULT_SHORT_BASE.into(),
            qr_endpoint: DEFAULT_QR_ENDPOINT.into(),
            qr_size: DEFAULT_QR_SIZE,
            code_length: DEFAULT_CODE_LENGTH,
            submit_delay: Duration::from_millis(1000),
            submit_timeout: Duration::from_millis(5000),
            copied_reset: Duration::from_millis(2000),
            reset_policy: ResetPolicy::default(),
            session_idle_hours: 24,
            rng_seed: None,
            clipboard_enabled: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build a config from any key → value lookup. Unset keys keep their
    /// defaults.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number (1–65535)")?,
            None => defaults.port,
        };

        let code_length = match get("CODE_LENGTH") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .context("CODE_LENGTH must be a positive integer")?,
            None => defaults.code_length,
        };
        if code_length == 0 {
            anyhow::bail!("CODE_LENGTH must be at least 1");
        }

        let short_base_url = get("SHORT_BASE_URL")
            .unwrap_or(defaults.short_base_url)
            .trim_end_matches('/')
            .to_owned();

        let millis = |key: &str, fallback: Duration| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };

        let flag = |key: &str| get(key).and_then(|v| parse_bool(&v)).unwrap_or(false);

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            short_base_url,
            qr_endpoint: get("QR_ENDPOINT").unwrap_or(defaults.qr_endpoint),
            qr_size: get("QR_SIZE_PX")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(defaults.qr_size),
            code_length,
            submit_delay: millis("SUBMIT_DELAY_MS", defaults.submit_delay),
            submit_timeout: millis("SUBMIT_TIMEOUT_MS", defaults.submit_timeout),
            copied_reset: millis("COPIED_RESET_MS", defaults.copied_reset),
            reset_policy: ResetPolicy {
                clear_inputs: flag("RESET_CLEARS_INPUTS"),
                clear_premium: flag("RESET_CLEARS_PREMIUM"),
            },
            session_idle_hours: get("SESSION_IDLE_HOURS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(defaults.session_idle_hours),
            rng_seed: get("RNG_SEED").and_then(|v| v.trim().parse::<u64>().ok()),
            clipboard_enabled: get("CLIPBOARD_ENABLED")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.clipboard_enabled),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
