//! # Runtime Configuration Module
//!
//! Environment-driven configuration for the listener and the coroutine
//! runtime.
//!
//! ## Environment Variables
//!
//! ### `SWITCHYARD_ADDR`
//!
//! Address to bind. Default: `0.0.0.0:8080`.
//!
//! ### `SWITCHYARD_STACK_SIZE`
//!
//! Stack size for connection coroutines. Accepts decimal (`65536`) or
//! hexadecimal (`0x10000`). Default: `0x10000` (64 KB).
//!
//! Every open connection holds one coroutine, so total stack memory is
//! roughly `stack_size × open_connections`.
//!
//! ### `SWITCHYARD_MAX_HEAD_BYTES`
//!
//! Largest request line plus headers accepted before the connection is
//! answered with `400` and closed. Default: `8192`.
//!
//! ### `SWITCHYARD_MAX_BODY_BYTES`
//!
//! Largest `Content-Length` the listener will read. Larger bodies are
//! answered with `400` and the connection is closed. Default: `1048576`.
//!
//! ### `SWITCHYARD_READ_TIMEOUT_MS`
//!
//! Idle read timeout per connection in milliseconds; `0` disables it.
//! Default: `30000`.
//!
//! ## Usage
//!
//! ```rust
//! use switchyard::runtime_config::ServerConfig;
//!
//! let config = ServerConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```
//!
//! Invalid values fall back to the default and are reported with a warning.

use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_STACK_SIZE: usize = 0x10000;
pub const DEFAULT_MAX_HEAD_BYTES: usize = 8192;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;

/// Listener and runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind
    pub addr: String,
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Maximum size of a request head in bytes
    pub max_head_bytes: usize,
    /// Maximum request body the listener will read
    pub max_body_bytes: usize,
    /// Idle read timeout; `None` waits forever
    pub read_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            stack_size: DEFAULT_STACK_SIZE,
            max_head_bytes: DEFAULT_MAX_HEAD_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            read_timeout: Some(Duration::from_millis(DEFAULT_READ_TIMEOUT_MS)),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `SWITCHYARD_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read_timeout_ms = parse_or(
            &lookup,
            "SWITCHYARD_READ_TIMEOUT_MS",
            DEFAULT_READ_TIMEOUT_MS,
            |v| v.parse().ok(),
        );

        Self {
            addr: lookup("SWITCHYARD_ADDR")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.addr),
            stack_size: parse_or(&lookup, "SWITCHYARD_STACK_SIZE", defaults.stack_size, parse_size),
            max_head_bytes: parse_or(
                &lookup,
                "SWITCHYARD_MAX_HEAD_BYTES",
                defaults.max_head_bytes,
                parse_size,
            ),
            max_body_bytes: parse_or(
                &lookup,
                "SWITCHYARD_MAX_BODY_BYTES",
                defaults.max_body_bytes,
                parse_size,
            ),
            read_timeout: (read_timeout_ms > 0).then(|| Duration::from_millis(read_timeout_ms)),
        }
    }

    /// Apply the coroutine settings to the global `may` runtime.
    pub fn apply_to_runtime(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

/// Parse a byte size written in decimal or `0x` hexadecimal.
#[must_use]
pub fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn parse_or<F, T, P>(lookup: &F, key: &str, default: T, parse: P) -> T
where
    F: Fn(&str) -> Option<String>,
    T: Copy + std::fmt::Debug,
    P: Fn(&str) -> Option<T>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    parse(&raw).unwrap_or_else(|| {
        warn!(
            variable = key,
            value = %raw,
            default = ?default,
            "Invalid configuration value, using default"
        );
        default
    })
}
