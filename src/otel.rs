//! Structured logging setup
//!
//! Configures `tracing` output for the listener and the dispatcher:
//! - JSON or pretty formatting
//! - Sampling strategies (all, error-only, sampled)
//! - Async buffered output through `tracing-appender`
//!
//! Every setting is read from `SWITCHYARD_LOG_*` variables; `RUST_LOG`
//! overrides the level when present.

use anyhow::{Context, Result};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::Level;
use tracing::subscriber::Interest;
use tracing::{Event, Metadata, Subscriber};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json, // Default to JSON
        }
    }
}

/// Sampling mode: how to decide which logs to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Log everything (high volume)
    All,
    /// Log only WARN and ERROR levels
    ErrorOnly,
    /// Sample successful requests, log all errors
    Sampled,
}

impl SamplingMode {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "all" => SamplingMode::All,
            "error-only" | "error_only" => SamplingMode::ErrorOnly,
            _ => SamplingMode::Sampled, // Default to sampled
        }
    }
}

/// Comprehensive logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Sampling mode: all/error-only/sampled
    pub sampling_mode: SamplingMode,
    /// Sampling rate (0.0-1.0) for Sampled mode
    pub sampling_rate: f64,
    /// Enable async buffered logging
    pub async_logging: bool,
    /// Buffer size for async logging
    pub buffer_size: usize,
    /// Module filter (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location (dev only)
    pub include_location: bool,
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("SWITCHYARD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("SWITCHYARD_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            ),
            sampling_mode: SamplingMode::parse(
                &env::var("SWITCHYARD_LOG_SAMPLING_MODE").unwrap_or_else(|_| "sampled".to_string()),
            ),
            sampling_rate: env::var("SWITCHYARD_LOG_SAMPLING_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.1), // 10% default
            async_logging: env::var("SWITCHYARD_LOG_ASYNC")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
            buffer_size: env::var("SWITCHYARD_LOG_BUFFER_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8192),
            target_filter: env::var("SWITCHYARD_LOG_TARGET_FILTER").ok(),
            include_location: env::var("SWITCHYARD_LOG_INCLUDE_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Create a default configuration for testing
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            sampling_mode: SamplingMode::All,
            sampling_rate: 1.0,
            async_logging: false,
            buffer_size: 1024,
            target_filter: None,
            include_location: true,
        }
    }

    /// Create a default production configuration
    pub fn default_prod() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            sampling_mode: SamplingMode::Sampled,
            sampling_rate: 0.1,
            async_logging: true,
            buffer_size: 8192,
            target_filter: None,
            include_location: false,
        }
    }
}

/// Sampling layer: decides whether to emit a log based on sampling rules
pub struct SamplingLayer {
    mode: SamplingMode,
    sampling_rate: f64,
    counter: AtomicU64,
}

impl SamplingLayer {
    pub fn new(mode: SamplingMode, sampling_rate: f64) -> Self {
        Self {
            mode,
            sampling_rate: sampling_rate.clamp(0.0, 1.0),
            counter: AtomicU64::new(0),
        }
    }

    /// Static part of the decision, fixed per callsite.
    fn passes_level(&self, metadata: &Metadata<'_>) -> bool {
        match self.mode {
            SamplingMode::All | SamplingMode::Sampled => true,
            SamplingMode::ErrorOnly => is_warn_or_error(metadata),
        }
    }

    /// Events below WARN in sampled mode are decided one by one.
    fn is_sampled(&self, metadata: &Metadata<'_>) -> bool {
        self.mode == SamplingMode::Sampled && metadata.is_event() && !is_warn_or_error(metadata)
    }

    /// Take the next ticket from the shared counter.
    fn take_sample(&self) -> bool {
        if self.sampling_rate <= 0.0 {
            return false;
        }
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        let sample_interval = (1.0 / self.sampling_rate) as u64;
        sample_interval > 0 && count.is_multiple_of(sample_interval)
    }

    /// Check if this event should be logged based on sampling rules
    #[cfg(test)]
    fn should_sample(&self, metadata: &Metadata<'_>) -> bool {
        self.passes_level(metadata) && (!self.is_sampled(metadata) || self.take_sample())
    }
}

fn is_warn_or_error(metadata: &Metadata<'_>) -> bool {
    matches!(metadata.level(), &Level::WARN | &Level::ERROR)
}

impl<S> Layer<S> for SamplingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    // The subscriber caches this per callsite, so sampled callsites must
    // stay `sometimes` for `event_enabled` to see every event.
    fn register_callsite(&self, metadata: &'static Metadata<'static>) -> Interest {
        if self.is_sampled(metadata) {
            Interest::sometimes()
        } else if self.passes_level(metadata) {
            Interest::always()
        } else {
            Interest::never()
        }
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: LayerContext<'_, S>) -> bool {
        self.passes_level(metadata)
    }

    fn event_enabled(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) -> bool {
        !self.is_sampled(event.metadata()) || self.take_sample()
    }
}

/// Initialize logging from the environment with an explicit level.
///
/// # Example
///
/// ```no_run
/// use switchyard::otel;
///
/// let _guard = otel::init_logging("info").expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: &str) -> Result<Option<WorkerGuard>> {
    let mut config = LogConfig::from_env();
    config.log_level = log_level.to_string();
    init_logging_with_config(&config)
}

/// Initialize logging with comprehensive configuration
///
/// This function sets up tracing with:
/// - JSON or pretty-print formatting
/// - Configurable sampling
/// - Async buffered output (optional)
///
/// With async logging the returned guard owns the writer thread; dropping it
/// flushes pending lines, so keep it alive for the life of the process.
///
/// # Arguments
///
/// * `config` - Complete logging configuration
///
/// # Example
///
/// ```no_run
/// use switchyard::otel::{LogConfig, init_logging_with_config};
///
/// let config = LogConfig::from_env();
/// let _guard = init_logging_with_config(&config)
///     .expect("Failed to initialize logging");
/// ```
pub fn init_logging_with_config(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    // Parse log level
    let level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    // may logs every coroutine spawn at debug
    if let Ok(directive) = "may=warn".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    // Apply custom target filters if provided
    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',') {
            let filter = filter.trim();
            if !filter.is_empty() {
                if let Ok(directive) = filter.parse() {
                    env_filter = env_filter.add_directive(directive);
                } else {
                    eprintln!("Warning: Invalid log filter directive: {}", filter);
                }
            }
        }
    }

    // Create sampling layer
    let sampling_layer = SamplingLayer::new(config.sampling_mode, config.sampling_rate);

    // Create fmt layer based on format preference
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sampling_layer);

    if config.async_logging {
        // Async logging with buffering
        let (non_blocking, guard) = NonBlockingBuilder::default()
            .buffered_lines_limit(config.buffer_size)
            .finish(std::io::stdout());

        let fmt_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_span_list(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(non_blocking)
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(non_blocking)
                .boxed(),
        };

        registry
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize async logging")?;

        Ok(Some(guard))
    } else {
        // Synchronous logging
        let fmt_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_span_list(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .boxed(),
        };

        registry
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize sync logging")?;

        Ok(None)
    }
}
