//! # switchyard
//!
//! **switchyard** is a lightweight HTTP routing layer for the `may` coroutine
//! runtime: an allocation-free request-target parser, packed-word token
//! decoders, a template route compiler and a first-match dispatcher.
//!
//! ## Architecture
//!
//! The library is organized leaves first:
//!
//! - **[`token`]** - HTTP method and content-coding recognition by packed `u64` comparison
//! - **[`url`]** - Request-target parsing into path segments and query pairs
//! - **[`router`]** - Route template compilation, the ordered route table and matching
//! - **[`dispatcher`]** - Request decoding, route lookup and handler binding
//! - **[`http`]** - Request/response model, standard header ids, status reasons, body codecs
//! - **[`server`]** - Reference HTTP/1.1 listener, one coroutine per connection
//! - **[`runtime_config`]** - `SWITCHYARD_*` environment configuration
//! - **[`otel`]** - Structured logging setup
//! - **[`ids`]** - ULID request ids
//! - **[`demo`]** - The route table served by the `switchyard` binary
//!
//! ### Request Flow
//!
//! ```text
//! TCP stream ─► server::connection  (httparse head, Content-Length body)
//!            ─► Dispatcher::dispatch
//!                 token::Method::decode      unknown      ─► 400
//!                 UrlArguments::parse        fails        ─► 400
//!                 RouteTable::find           no match     ─► 400
//!                 factory(server, context, accept_time)
//!            ─► Handler::try_process         Err          ─► 400
//!                                            panic        ─► 500, close
//!            ─► HttpResponse::write_to
//! ```
//!
//! The route table is built once before the listener starts and is shared
//! read-only by every connection. The only state touched by concurrent
//! requests is each route's optional hit counter.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use switchyard::dispatcher::{Dispatcher, Handler, HandlerOutcome};
//! use switchyard::http::HttpResponse;
//! use switchyard::router::RouteTable;
//! use switchyard::server::HttpServer;
//! use switchyard::token::Method;
//!
//! struct App;
//!
//! let mut builder = RouteTable::<App>::builder();
//! builder
//!     .route(Method::Get, "/hello/{name}", 0, "hello", |_app, ctx, _accepted| {
//!         Box::new(move || -> HandlerOutcome {
//!             let name = ctx.variable("name").unwrap_or("world");
//!             Ok(HttpResponse::content(format!("hello {name}"), "text/plain"))
//!         }) as Box<dyn Handler>
//!     })
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(Arc::new(builder.build()), Arc::new(App));
//! let handle = HttpServer::new(dispatcher).start("127.0.0.1:8080").unwrap();
//! handle.join().unwrap();
//! ```
//!
//! ## Environment Variables
//!
//! - `SWITCHYARD_ADDR`, `SWITCHYARD_STACK_SIZE`, `SWITCHYARD_MAX_HEAD_BYTES`,
//!   `SWITCHYARD_MAX_BODY_BYTES`, `SWITCHYARD_READ_TIMEOUT_MS` - see [`runtime_config`]
//! - `SWITCHYARD_LOG_*` - see [`otel`]
//!
//! ## Non-goals
//!
//! Percent-decoding, URI normalisation, TLS, HTTP/2 and chunked request
//! bodies are out of scope. Query values reach handlers exactly as sent.

pub mod cli;
pub mod demo;
pub mod dispatcher;
pub mod http;
pub mod ids;
pub mod otel;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod token;
pub mod url;

pub use dispatcher::{Dispatcher, Handler, HandlerError, RawRequest, RequestContext};
pub use router::{RouteTable, RouteTableBuilder};
pub use token::{ContentCoding, ContentCodings, Method};
pub use url::UrlArguments;
