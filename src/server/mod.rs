//! # Server Module
//!
//! Reference listener for the dispatcher: a `may` TCP accept loop that serves
//! every connection on its own coroutine.
//!
//! ## Overview
//!
//! - Request heads are parsed with `httparse`; bodies are read by
//!   `Content-Length`
//! - Connections are kept alive per HTTP/1.1 rules (`Connection: close`,
//!   HTTP/1.0 opt-in)
//! - Every request goes through [`Dispatcher::respond`](crate::dispatcher::Dispatcher::respond)
//! - Oversized or unparseable heads, bad `Content-Length` values and chunked
//!   bodies are answered with `400` and the connection is closed
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use switchyard::dispatcher::Dispatcher;
//! use switchyard::router::RouteTable;
//! use switchyard::server::HttpServer;
//!
//! let table = Arc::new(RouteTable::<()>::builder().build());
//! let handle = HttpServer::new(Dispatcher::new(table, Arc::new(())))
//!     .start("127.0.0.1:8080")
//!     .unwrap();
//! handle.wait_ready().unwrap();
//! handle.stop();
//! ```

mod connection;
mod http_server;

pub use connection::{ConnectionLimits, MAX_HEADERS};
pub use http_server::{HttpServer, ServerHandle};
