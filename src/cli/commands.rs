use crate::demo::{self, DemoService};
use crate::dispatcher::Dispatcher;
use crate::otel::{self, LogConfig, LogFormat};
use crate::runtime_config::{parse_size, ServerConfig};
use crate::server::{ConnectionLimits, HttpServer, ServerHandle};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use std::time::Duration;

/// Command-line interface for the switchyard demo server
#[derive(Parser, Debug)]
#[command(name = "switchyard", version)]
#[command(about = "First-match HTTP routing on may coroutines", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the demo route table
    Serve {
        /// Address to bind (overrides SWITCHYARD_ADDR)
        #[arg(long)]
        addr: Option<String>,

        /// Log output format (overrides SWITCHYARD_LOG_FORMAT)
        #[arg(long, value_enum)]
        log_format: Option<LogFormatArg>,

        /// Log level: trace, debug, info, warn, error (overrides SWITCHYARD_LOG_LEVEL)
        #[arg(long)]
        log_level: Option<String>,

        /// Coroutine stack size, decimal or 0x hex (overrides SWITCHYARD_STACK_SIZE)
        #[arg(long, value_parser = parse_size_arg)]
        stack_size: Option<usize>,

        /// Largest request body read from a connection (overrides SWITCHYARD_MAX_BODY_BYTES)
        #[arg(long, value_parser = parse_size_arg)]
        max_body_bytes: Option<usize>,

        /// Idle read timeout in milliseconds, 0 to disable (overrides SWITCHYARD_READ_TIMEOUT_MS)
        #[arg(long)]
        read_timeout_ms: Option<u64>,
    },
    /// Print the demo route table in priority order
    Routes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Pretty => LogFormat::Pretty,
        }
    }
}

fn parse_size_arg(value: &str) -> Result<usize, String> {
    parse_size(value).ok_or_else(|| format!("`{value}` is not a decimal or 0x-prefixed size"))
}

/// Parse the process arguments and run the selected command.
///
/// # Errors
///
/// Returns an error if logging cannot be initialised, the demo route table
/// fails to compile, or the listener cannot bind.
pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

/// Run an already parsed command line.
///
/// # Errors
///
/// See [`run_cli`].
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            addr,
            log_format,
            log_level,
            stack_size,
            max_body_bytes,
            read_timeout_ms,
        } => {
            let mut log_config = LogConfig::from_env();
            if let Some(format) = log_format {
                log_config.format = format.into();
            }
            if let Some(level) = log_level {
                log_config.log_level = level;
            }
            let _log_guard = otel::init_logging_with_config(&log_config)?;

            let mut config = ServerConfig::from_env();
            if let Some(addr) = addr {
                config.addr = addr;
            }
            if let Some(size) = stack_size {
                config.stack_size = size;
            }
            if let Some(max) = max_body_bytes {
                config.max_body_bytes = max;
            }
            if let Some(ms) = read_timeout_ms {
                config.read_timeout = (ms > 0).then(|| Duration::from_millis(ms));
            }
            serve(&config)
        }
        Commands::Routes => {
            let service = DemoService::new();
            demo::route_table(&service)
                .context("demo route table failed to compile")?
                .dump_routes();
            Ok(())
        }
    }
}

fn serve(config: &ServerConfig) -> Result<()> {
    config.apply_to_runtime();

    let service = Arc::new(DemoService::new());
    let table = demo::route_table(&service).context("demo route table failed to compile")?;
    let dispatcher = Dispatcher::new(Arc::new(table), service);

    let handle = HttpServer::new(dispatcher)
        .with_limits(ConnectionLimits::from(config))
        .with_stack_size(config.stack_size)
        .start(config.addr.as_str())
        .with_context(|| format!("failed to bind {}", config.addr))?;

    wait_for_shutdown(handle)
}

#[cfg(unix)]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use tracing::info;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal = signal, addr = %handle.addr(), "Shutdown signal received");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("accept loop panicked: {e:?}"))
}
