//! # Dispatcher Module
//!
//! The dispatcher turns an accepted request into a bound handler. It decodes
//! the method and target, classifies headers, asks the [`RouteTable`] for the
//! first matching route and invokes that route's factory.
//!
//! ## Overview
//!
//! The dispatcher:
//! - Rejects unknown methods, unparseable targets and unreadable bodies as
//!   [`MalformedRequest`]
//! - Reports [`DispatchError::NoRouteMatched`] when no route accepts the request
//! - Hands the winning factory the server handle, a [`RequestContext`] and the
//!   connection's accept time
//! - Runs handlers with panic recovery through [`Dispatcher::respond`]
//!
//! ## Request Flow
//!
//! 1. Listener reads a request and builds a [`RawRequest`]
//! 2. Method and target are decoded; failures stop here
//! 3. Headers are split into standard and custom fields
//! 4. The route table is scanned in registration order
//! 5. The winning factory builds a [`Handler`] that owns the request context
//! 6. `try_process` produces the response; the context is dropped with it
//!
//! ## Error Handling
//!
//! [`Dispatcher::respond`] answers malformed requests, unmatched requests and
//! [`HandlerError`]s with an empty `400 Bad Request`. A panicking handler is
//! answered with `500` and its connection is closed.
//!
//! [`RouteTable`]: crate::router::RouteTable

mod core;
mod handler;

pub use core::{run_handler, DispatchError, Dispatcher, MalformedRequest, RawRequest};
pub use handler::{Handler, HandlerError, HandlerFactory, HandlerOutcome, RequestContext};
