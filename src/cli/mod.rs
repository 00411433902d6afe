//! # CLI Module
//!
//! Command-line entry point for the `switchyard` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve the demo route table until SIGINT or SIGTERM:
//!
//! ```bash
//! switchyard serve --addr 127.0.0.1:8080 --log-format pretty
//! ```
//!
//! Every flag is optional and overrides the matching `SWITCHYARD_*`
//! environment variable:
//! - `--addr <ADDR>`
//! - `--log-format <json|pretty>`
//! - `--log-level <LEVEL>`
//! - `--stack-size <SIZE>` (decimal or `0x` hex)
//! - `--max-body-bytes <SIZE>`
//! - `--read-timeout-ms <MS>` (`0` disables the timeout)
//!
//! ### `routes`
//!
//! Print the demo routes in the order they are matched:
//!
//! ```bash
//! switchyard routes
//! ```

mod commands;


pub use commands::{run, run_cli, Cli, Commands, LogFormatArg};
